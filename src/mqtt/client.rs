use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, Incoming, MqttOptions, QoS};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::MqttMessage;
use super::topics::SUBSCRIPTIONS;
use crate::config::MqttConfig;

const RECONNECT_DELAY: Duration = Duration::from_secs(5);

pub struct MqttClient {
    client: AsyncClient,
    eventloop: EventLoop,
}

impl MqttClient {
    pub fn new(config: &MqttConfig) -> Self {
        let mut mqttopts =
            MqttOptions::new(&config.client_id, &config.broker_host, config.broker_port);
        mqttopts.set_keep_alive(Duration::from_secs(config.keep_alive_secs));

        if let (Some(user), Some(pass)) = (&config.username, &config.password) {
            mqttopts.set_credentials(user, pass);
        }

        let (client, eventloop) = AsyncClient::new(mqttopts, 100);

        Self { client, eventloop }
    }

    /// Run the MQTT event loop. Subscribes to the climate-control topics on
    /// every connect and forwards incoming publishes through `message_tx`.
    ///
    /// Returns an error if the broker cannot be reached before the first
    /// CONNACK. Later connection errors are logged and retried.
    pub async fn run(mut self, message_tx: mpsc::Sender<MqttMessage>) -> Result<(), String> {
        let mut connected_once = false;

        loop {
            match self.eventloop.poll().await {
                Ok(Event::Incoming(Incoming::ConnAck(_))) => {
                    info!("Connected to MQTT broker");
                    connected_once = true;

                    for topic in SUBSCRIPTIONS {
                        if let Err(e) = self.client.subscribe(*topic, QoS::AtMostOnce).await {
                            error!("Failed to subscribe to {}: {}", topic, e);
                        }
                    }
                }
                Ok(Event::Incoming(Incoming::Publish(publish))) => {
                    let payload = String::from_utf8_lossy(&publish.payload).to_string();
                    debug!("Received {}: {}", publish.topic, payload);
                    let msg = MqttMessage {
                        topic: publish.topic.clone(),
                        payload,
                    };
                    if message_tx.send(msg).await.is_err() {
                        warn!("Message channel closed, stopping MQTT loop");
                        return Ok(());
                    }
                }
                Ok(_) => {}
                Err(e) if !connected_once => {
                    return Err(format!("Failed to connect to MQTT broker: {e}"));
                }
                Err(e) => {
                    error!("MQTT connection error: {}. Reconnecting...", e);
                    tokio::time::sleep(RECONNECT_DELAY).await;
                }
            }
        }
    }
}
