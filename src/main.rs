mod config;
mod mqtt;
mod yandex;

use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::mqtt::MqttMessage;
use crate::yandex::ActionBatch;
use crate::yandex::client::{DispatchError, YandexClient};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = match config::Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        "Starting yandex-iot-bridge (mqtt={}:{}, device={}, api={})",
        config.mqtt.broker_host,
        config.mqtt.broker_port,
        config.yandex.device_id,
        config.yandex.api_url,
    );

    let client = match YandexClient::new(&config.yandex) {
        Ok(c) => c,
        Err(e) => {
            error!("HTTP client error: {}", e);
            std::process::exit(1);
        }
    };

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to register SIGTERM handler: {}", e);
            std::process::exit(1);
        }
    };

    let (message_tx, mut message_rx) = mpsc::channel::<MqttMessage>(100);

    let mqtt_client = mqtt::client::MqttClient::new(&config.mqtt);
    let mut mqtt_handle = tokio::spawn(mqtt_client.run(message_tx));

    // Messages are handled one at a time, in delivery order.
    loop {
        tokio::select! {
            Some(msg) = message_rx.recv() => {
                handle_message(&client, &msg).await;
            }
            result = &mut mqtt_handle => {
                match result {
                    Ok(Ok(())) => info!("MQTT loop stopped"),
                    Ok(Err(e)) => {
                        error!("{}", e);
                        std::process::exit(1);
                    }
                    Err(e) => {
                        error!("MQTT task failed: {}", e);
                        std::process::exit(1);
                    }
                }
                break;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Received SIGINT, shutting down");
                break;
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down");
                break;
            }
        }
    }

    mqtt_handle.abort();
    info!("yandex-iot-bridge stopped");
}

/// Decode one inbound message and, if it maps to an action, send it.
async fn handle_message(client: &YandexClient, msg: &MqttMessage) {
    let decoded = match yandex::decode::decode(&msg.topic, &msg.payload) {
        Ok(decoded) => decoded,
        Err(e) => {
            warn!("Ignoring {}: {}", msg.topic, e);
            return;
        }
    };
    let Some(batch) = ActionBatch::new(decoded.into_iter().collect()) else {
        return;
    };

    info!(
        "Sending {} action(s) to device {}: {:?}",
        batch.actions().len(),
        client.target().device_id,
        batch.actions(),
    );

    match client.dispatch(&batch).await {
        Ok(report) => {
            info!(
                "Yandex accepted actions: {} (request_id={})",
                report.status,
                report.request_id.as_deref().unwrap_or("-"),
            );
            debug!("Yandex response: {}", report.body);
            for failure in &report.failures {
                warn!(
                    "Device {} failed {} ({}): {} {}",
                    failure.device_id,
                    failure.capability_type,
                    failure.instance,
                    failure.error_code.as_deref().unwrap_or("UNKNOWN"),
                    failure.error_message.as_deref().unwrap_or(""),
                );
            }
        }
        Err(e @ DispatchError::Rejected { .. }) => {
            warn!("Yandex rejected actions: {}. Check token, device ID and command", e);
        }
        Err(e) => {
            error!("Failed to send actions to Yandex: {}", e);
        }
    }
}
