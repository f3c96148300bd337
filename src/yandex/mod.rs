//! Yandex Smart Home device-action model.
//!
//! Types here mirror the wire shape of `POST /v1.0/devices/actions`.

pub mod client;
pub mod decode;

use serde::{Deserialize, Serialize, Serializer};

/// Capability family of a device action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Range,
    Mode,
    OnOff,
}

impl Capability {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Range => "range",
            Self::Mode => "mode",
            Self::OnOff => "on_off",
        }
    }

    /// Namespaced capability identifier used by the API.
    pub fn type_id(self) -> String {
        format!("devices.capabilities.{}", self.as_str())
    }
}

impl Serialize for Capability {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.type_id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ActionValue {
    Integer(i64),
    Text(String),
    Bool(bool),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionState {
    pub instance: String,
    pub value: ActionValue,
}

/// One device command, serialised as
/// `{"type": "devices.capabilities.<kind>", "state": {"instance", "value"}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub capability: Capability,
    pub state: ActionState,
}

impl Action {
    pub(crate) fn new(capability: Capability, instance: &str, value: ActionValue) -> Self {
        Self {
            capability,
            state: ActionState {
                instance: instance.to_string(),
                value,
            },
        }
    }

    #[cfg(test)]
    pub fn range(instance: &str, value: i64) -> Self {
        Self::new(Capability::Range, instance, ActionValue::Integer(value))
    }

    #[cfg(test)]
    pub fn mode(instance: &str, value: &str) -> Self {
        Self::new(Capability::Mode, instance, ActionValue::Text(value.to_string()))
    }

    #[cfg(test)]
    pub fn on_off(instance: &str, on: bool) -> Self {
        Self::new(Capability::OnOff, instance, ActionValue::Bool(on))
    }
}

/// Non-empty, ordered list of actions for a single device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ActionBatch(Vec<Action>);

impl ActionBatch {
    pub fn new(actions: Vec<Action>) -> Option<Self> {
        if actions.is_empty() {
            None
        } else {
            Some(Self(actions))
        }
    }

    pub fn actions(&self) -> &[Action] {
        &self.0
    }
}

impl From<Action> for ActionBatch {
    fn from(action: Action) -> Self {
        Self(vec![action])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceTarget {
    pub device_id: String,
    pub auth_token: String,
}

// Request body

#[derive(Debug, Serialize)]
pub struct ActionsRequest<'a> {
    pub devices: Vec<DeviceActions<'a>>,
}

#[derive(Debug, Serialize)]
pub struct DeviceActions<'a> {
    pub id: &'a str,
    pub actions: &'a ActionBatch,
}

impl<'a> ActionsRequest<'a> {
    pub fn single(device_id: &'a str, batch: &'a ActionBatch) -> Self {
        Self {
            devices: vec![DeviceActions {
                id: device_id,
                actions: batch,
            }],
        }
    }
}

// Response body. Every field is optional; the API omits parts of it on errors.

#[derive(Debug, Default, Deserialize)]
pub struct ActionsResponse {
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub devices: Vec<DeviceResult>,
}

#[derive(Debug, Deserialize)]
pub struct DeviceResult {
    pub id: String,
    #[serde(default)]
    pub capabilities: Vec<CapabilityResult>,
}

#[derive(Debug, Deserialize)]
pub struct CapabilityResult {
    #[serde(rename = "type")]
    pub capability_type: String,
    pub state: CapabilityResultState,
}

#[derive(Debug, Deserialize)]
pub struct CapabilityResultState {
    pub instance: String,
    pub action_result: ActionResult,
}

#[derive(Debug, Deserialize)]
pub struct ActionResult {
    pub status: String,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}
