pub mod client;
pub mod topics;

/// An inbound publish, payload decoded as UTF-8.
#[derive(Debug, Clone)]
pub struct MqttMessage {
    pub topic: String,
    pub payload: String,
}
