use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use thiserror::Error;
use tracing::debug;

use super::{ActionBatch, ActionsRequest, ActionsResponse, DeviceTarget};
use crate::config::YandexConfig;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("rejected with HTTP {status}: {body}")]
    Rejected { status: StatusCode, body: String },
}

/// A capability the API accepted but the device failed to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityFailure {
    pub device_id: String,
    pub capability_type: String,
    pub instance: String,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
}

/// Outcome of an accepted (2xx) dispatch.
#[derive(Debug, Clone)]
pub struct DispatchReport {
    pub status: StatusCode,
    pub request_id: Option<String>,
    pub body: String,
    pub failures: Vec<CapabilityFailure>,
}

pub struct YandexClient {
    http: reqwest::Client,
    api_url: String,
    target: DeviceTarget,
}

impl YandexClient {
    pub fn new(config: &YandexConfig) -> Result<Self, DispatchError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(DispatchError::Client)?;

        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            target: config.target(),
        })
    }

    pub fn target(&self) -> &DeviceTarget {
        &self.target
    }

    /// Send one batch to the device in a single POST. Never retries.
    pub async fn dispatch(&self, batch: &ActionBatch) -> Result<DispatchReport, DispatchError> {
        let request = ActionsRequest::single(&self.target.device_id, batch);
        let payload = serde_json::to_string(&request).map_err(DispatchError::Encode)?;
        debug!("POST {}: {}", self.api_url, payload);

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.target.auth_token)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(DispatchError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            // Keep the status even if the error body cannot be read.
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<unreadable body: {e}>"));
            return Err(DispatchError::Rejected { status, body });
        }

        let body = response.text().await.map_err(DispatchError::Transport)?;

        let parsed: ActionsResponse = serde_json::from_str(&body).unwrap_or_default();
        let failures = collect_failures(&parsed);

        Ok(DispatchReport {
            status,
            request_id: parsed.request_id,
            body,
            failures,
        })
    }
}

fn collect_failures(response: &ActionsResponse) -> Vec<CapabilityFailure> {
    response
        .devices
        .iter()
        .flat_map(|device| {
            device.capabilities.iter().filter_map(move |cap| {
                let result = &cap.state.action_result;
                if result.status != "ERROR" {
                    return None;
                }
                Some(CapabilityFailure {
                    device_id: device.id.clone(),
                    capability_type: cap.capability_type.clone(),
                    instance: cap.state.instance.clone(),
                    error_code: result.error_code.clone(),
                    error_message: result.error_message.clone(),
                })
            })
        })
        .collect()
}
