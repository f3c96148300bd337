//! Translation of raw climate-control topic payloads into device actions.
//!
//! Each subscribed topic has one [`TopicBinding`] in [`BINDINGS`]; the
//! binding's [`Rule`] validates the payload and produces the action value.

use thiserror::Error;

use super::{Action, ActionValue, Capability};
use crate::mqtt::topics;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("{instance} value '{payload}' is not an integer")]
    NotAnInteger {
        instance: &'static str,
        payload: String,
    },

    #[error("{instance} value {value} is outside {min}..={max}")]
    OutOfRange {
        instance: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("{instance} value '{payload}' is not one of {accepted:?}")]
    UnknownValue {
        instance: &'static str,
        payload: String,
        accepted: Vec<&'static str>,
    },
}

#[derive(Debug)]
pub enum Rule {
    /// Decimal integer within an inclusive range.
    IntegerRange { min: i64, max: i64 },
    /// Exact payload match against a code table.
    Lookup(&'static [(&'static str, &'static str)]),
    /// Exact payload match for the two switch positions.
    Switch {
        on: &'static str,
        off: &'static str,
    },
}

#[derive(Debug)]
pub struct TopicBinding {
    pub topic: &'static str,
    pub capability: Capability,
    pub instance: &'static str,
    pub rule: Rule,
}

pub const FAN_SPEEDS: &[(&str, &str)] = &[
    ("1", "low"),
    ("2", "medium"),
    ("3", "high"),
    ("4", "auto"),
];

pub const THERMOSTAT_MODES: &[(&str, &str)] = &[
    ("1", "cool"),
    ("2", "heat"),
    ("3", "fan_only"),
    ("4", "dry"),
    ("5", "auto"),
];

// The controller publishes "2" for on and "1" for off.
pub const BINDINGS: &[TopicBinding] = &[
    TopicBinding {
        topic: topics::TOPIC_SET_TEMP,
        capability: Capability::Range,
        instance: "temperature",
        rule: Rule::IntegerRange { min: 16, max: 30 },
    },
    TopicBinding {
        topic: topics::TOPIC_FAN_SPEED,
        capability: Capability::Mode,
        instance: "fan_speed",
        rule: Rule::Lookup(FAN_SPEEDS),
    },
    TopicBinding {
        topic: topics::TOPIC_POWER,
        capability: Capability::OnOff,
        instance: "on",
        rule: Rule::Switch { on: "2", off: "1" },
    },
    TopicBinding {
        topic: topics::TOPIC_MODE,
        capability: Capability::Mode,
        instance: "thermostat",
        rule: Rule::Lookup(THERMOSTAT_MODES),
    },
];

pub fn binding_for(topic: &str) -> Option<&'static TopicBinding> {
    BINDINGS.iter().find(|b| b.topic == topic)
}

/// Decode one inbound message.
///
/// Topics without a binding yield `Ok(None)`. Malformed payloads yield a
/// [`DecodeError`] and no action.
pub fn decode(topic: &str, payload: &str) -> Result<Option<Action>, DecodeError> {
    match binding_for(topic) {
        Some(binding) => binding.decode(payload).map(Some),
        None => Ok(None),
    }
}

impl TopicBinding {
    pub fn decode(&self, payload: &str) -> Result<Action, DecodeError> {
        let value = match &self.rule {
            Rule::IntegerRange { min, max } => {
                let value: i64 = payload.trim().parse().map_err(|_| DecodeError::NotAnInteger {
                    instance: self.instance,
                    payload: payload.to_string(),
                })?;
                if !(*min..=*max).contains(&value) {
                    return Err(DecodeError::OutOfRange {
                        instance: self.instance,
                        value,
                        min: *min,
                        max: *max,
                    });
                }
                ActionValue::Integer(value)
            }
            Rule::Lookup(table) => match table.iter().find(|(code, _)| *code == payload) {
                Some((_, name)) => ActionValue::Text(name.to_string()),
                None => {
                    let accepted = table.iter().map(|(code, _)| *code).collect();
                    return Err(self.unknown(payload, accepted));
                }
            },
            Rule::Switch { on, off } => {
                if payload == *on {
                    ActionValue::Bool(true)
                } else if payload == *off {
                    ActionValue::Bool(false)
                } else {
                    return Err(self.unknown(payload, vec![*off, *on]));
                }
            }
        };

        Ok(Action::new(self.capability, self.instance, value))
    }

    fn unknown(&self, payload: &str, accepted: Vec<&'static str>) -> DecodeError {
        DecodeError::UnknownValue {
            instance: self.instance,
            payload: payload.to_string(),
            accepted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mqtt::topics::{TOPIC_FAN_SPEED, TOPIC_MODE, TOPIC_POWER, TOPIC_SET_TEMP};

    #[test]
    fn every_temperature_in_range_maps_to_range_action() {
        for v in 16..=30 {
            let action = decode(TOPIC_SET_TEMP, &v.to_string()).unwrap();
            assert_eq!(action, Some(Action::range("temperature", v)));
        }
    }

    #[test]
    fn temperature_outside_range_is_rejected() {
        for v in [-5, 0, 15, 31, 100] {
            let err = decode(TOPIC_SET_TEMP, &v.to_string()).unwrap_err();
            assert!(matches!(err, DecodeError::OutOfRange { value, .. } if value == v));
        }
    }

    #[test]
    fn non_numeric_temperature_is_rejected() {
        for payload in ["", "abc", "22.5", "2 2", "22c", "2_2", "\u{662}\u{662}"] {
            assert!(matches!(
                decode(TOPIC_SET_TEMP, payload),
                Err(DecodeError::NotAnInteger { .. })
            ));
        }
    }

    #[test]
    fn temperature_tolerates_surrounding_whitespace() {
        assert_eq!(
            decode(TOPIC_SET_TEMP, " 22\n").unwrap(),
            Some(Action::range("temperature", 22))
        );
    }

    #[test]
    fn fan_speed_codes_map_to_names() {
        let expected = [("1", "low"), ("2", "medium"), ("3", "high"), ("4", "auto")];
        for (payload, name) in expected {
            assert_eq!(
                decode(TOPIC_FAN_SPEED, payload).unwrap(),
                Some(Action::mode("fan_speed", name))
            );
        }
    }

    #[test]
    fn unknown_fan_speed_is_rejected() {
        for payload in ["0", "5", "high", "01", ""] {
            assert!(matches!(
                decode(TOPIC_FAN_SPEED, payload),
                Err(DecodeError::UnknownValue { instance: "fan_speed", .. })
            ));
        }
    }

    #[test]
    fn power_switch_is_inverted() {
        assert_eq!(
            decode(TOPIC_POWER, "2").unwrap(),
            Some(Action::on_off("on", true))
        );
        assert_eq!(
            decode(TOPIC_POWER, "1").unwrap(),
            Some(Action::on_off("on", false))
        );
    }

    #[test]
    fn unknown_power_value_is_rejected() {
        for payload in ["0", "3", "on", "true"] {
            assert!(decode(TOPIC_POWER, payload).is_err());
        }
    }

    #[test]
    fn thermostat_modes_map_to_names() {
        assert_eq!(
            decode(TOPIC_MODE, "4").unwrap(),
            Some(Action::mode("thermostat", "dry"))
        );
        assert_eq!(
            decode(TOPIC_MODE, "3").unwrap(),
            Some(Action::mode("thermostat", "fan_only"))
        );
        assert!(decode(TOPIC_MODE, "6").is_err());
    }

    #[test]
    fn unknown_topic_is_ignored() {
        assert_eq!(decode("/devices/climate_control/controls/other", "1"), Ok(None));
        assert_eq!(decode("", ""), Ok(None));
        assert_eq!(decode("devices/climate_control/controls/setTemp", "22"), Ok(None));
    }

    #[test]
    fn bindings_cover_each_topic_once() {
        for topic in topics::SUBSCRIPTIONS {
            assert_eq!(BINDINGS.iter().filter(|b| b.topic == *topic).count(), 1);
        }
        assert_eq!(BINDINGS.len(), topics::SUBSCRIPTIONS.len());
    }

    #[test]
    fn error_message_names_instance_and_payload() {
        let err = decode(TOPIC_MODE, "9").unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"thermostat value '9' is not one of ["1", "2", "3", "4", "5"]"#
        );
    }
}
