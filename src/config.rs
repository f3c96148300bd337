use std::env;
use std::fmt;
use std::time::Duration;

use crate::yandex::DeviceTarget;

pub const DEFAULT_API_URL: &str = "https://api.iot.yandex.net/v1.0/devices/actions";

#[derive(Debug, Clone)]
pub struct Config {
    pub mqtt: MqttConfig,
    pub yandex: YandexConfig,
}

#[derive(Debug, Clone)]
pub struct MqttConfig {
    pub broker_host: String,
    pub broker_port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub client_id: String,
    pub keep_alive_secs: u64,
}

#[derive(Clone)]
pub struct YandexConfig {
    pub api_url: String,
    pub device_id: String,
    pub token: String,
    pub timeout_secs: u64,
}

impl fmt::Debug for YandexConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("YandexConfig")
            .field("api_url", &self.api_url)
            .field("device_id", &self.device_id)
            .field("token", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl YandexConfig {
    pub fn target(&self) -> DeviceTarget {
        DeviceTarget {
            device_id: self.device_id.clone(),
            auth_token: self.token.clone(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Environment-style key lookup. Empty values are treated as unset.
struct Vars<F> {
    lookup: F,
}

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.is_empty())
    }

    fn required(&self, key: &str) -> Result<String, String> {
        self.get(key)
            .ok_or_else(|| format!("{key} environment variable is required"))
    }

    fn optional(&self, key: &str) -> Option<String> {
        self.get(key)
    }

    fn or_default<T: std::str::FromStr>(&self, key: &str, default: T) -> Result<T, String> {
        match self.get(key) {
            Some(v) => v
                .parse()
                .map_err(|_| format!("{key} has an invalid value: {v}")),
            None => Ok(default),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars { lookup };

        let config = Self {
            mqtt: MqttConfig {
                broker_host: vars.required("MQTT_BROKER_HOST")?,
                broker_port: vars.or_default("MQTT_BROKER_PORT", 1883)?,
                username: vars.optional("MQTT_USERNAME"),
                password: vars.optional("MQTT_PASSWORD"),
                client_id: vars.or_default("MQTT_CLIENT_ID", "yandex-iot-bridge".to_string())?,
                keep_alive_secs: vars.or_default("MQTT_KEEP_ALIVE_SECS", 60)?,
            },
            yandex: YandexConfig {
                api_url: vars.or_default("YANDEX_API_URL", DEFAULT_API_URL.to_string())?,
                device_id: vars.required("YANDEX_DEVICE_ID")?,
                token: vars.required("YANDEX_TOKEN")?,
                timeout_secs: vars.or_default("YANDEX_TIMEOUT_SECS", 10)?,
            },
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), String> {
        if self.mqtt.broker_host.trim().is_empty() {
            return Err("MQTT_BROKER_HOST must not be empty".into());
        }
        if self.mqtt.keep_alive_secs == 0 {
            return Err("MQTT_KEEP_ALIVE_SECS must be > 0".into());
        }
        if self.yandex.device_id.trim().is_empty() {
            return Err("YANDEX_DEVICE_ID must not be empty".into());
        }
        if self.yandex.token.trim().is_empty() {
            return Err("YANDEX_TOKEN must not be empty".into());
        }
        if self.yandex.timeout_secs == 0 {
            return Err("YANDEX_TIMEOUT_SECS must be > 0".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    const MINIMAL: &[(&str, &str)] = &[
        ("MQTT_BROKER_HOST", "10.200.200.1"),
        ("YANDEX_DEVICE_ID", "eac57bfa"),
        ("YANDEX_TOKEN", "secret-token"),
    ];

    #[test]
    fn minimal_env_uses_defaults() {
        let config = load(MINIMAL).unwrap();
        assert_eq!(config.mqtt.broker_host, "10.200.200.1");
        assert_eq!(config.mqtt.broker_port, 1883);
        assert_eq!(config.mqtt.client_id, "yandex-iot-bridge");
        assert_eq!(config.mqtt.keep_alive_secs, 60);
        assert!(config.mqtt.username.is_none());
        assert_eq!(config.yandex.api_url, DEFAULT_API_URL);
        assert_eq!(config.yandex.timeout(), Duration::from_secs(10));

        let target = config.yandex.target();
        assert_eq!(target.device_id, "eac57bfa");
        assert_eq!(target.auth_token, "secret-token");
    }

    #[test]
    fn missing_token_is_rejected() {
        let err = load(&[("MQTT_BROKER_HOST", "broker"), ("YANDEX_DEVICE_ID", "dev")])
            .unwrap_err();
        assert!(err.contains("YANDEX_TOKEN"), "{err}");
    }

    #[test]
    fn empty_values_count_as_unset() {
        let mut pairs = MINIMAL.to_vec();
        pairs.push(("MQTT_BROKER_PORT", ""));
        pairs.push(("MQTT_USERNAME", ""));
        let config = load(&pairs).unwrap();
        assert_eq!(config.mqtt.broker_port, 1883);
        assert!(config.mqtt.username.is_none());
    }

    #[test]
    fn invalid_port_is_rejected() {
        let mut pairs = MINIMAL.to_vec();
        pairs.push(("MQTT_BROKER_PORT", "not-a-port"));
        let err = load(&pairs).unwrap_err();
        assert!(err.contains("MQTT_BROKER_PORT"), "{err}");
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut pairs = MINIMAL.to_vec();
        pairs.push(("YANDEX_TIMEOUT_SECS", "0"));
        assert!(load(&pairs).is_err());
    }

    #[test]
    fn debug_output_hides_token() {
        let config = load(MINIMAL).unwrap();
        let printed = format!("{config:?}");
        assert!(!printed.contains("secret-token"));
        assert!(printed.contains("<redacted>"));
    }
}
