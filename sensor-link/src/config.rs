// Copyright 2025 The Drasi Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Broker connection settings shared by the publisher and subscriber.

use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_BROKER_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 1883;
pub const DEFAULT_TOPIC: &str = "sensors/temperature";

const DEFAULT_KEEP_ALIVE: Duration = Duration::from_secs(60);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(60);

/// Where and how to reach the MQTT broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerConfig {
    /// MQTT broker hostname or IP (default: `"localhost"`).
    pub host: String,
    /// MQTT broker port (default: 1883).
    pub port: u16,
    /// MQTT client ID, unique per process.
    pub client_id: String,
    /// Optional MQTT username. Only used together with `password`.
    pub username: Option<String>,
    /// Optional MQTT password. Only used together with `username`.
    pub password: Option<String>,
    /// Keep-alive interval sent in CONNECT (default: 60s).
    pub keep_alive: Duration,
    /// How long the client waits for TCP connect plus CONNACK (default: 60s).
    /// Whole seconds only, at least one.
    pub connect_timeout: Duration,
}

impl BrokerConfig {
    /// Start building a config for the given broker host and client ID.
    pub fn builder(host: impl Into<String>, client_id: impl Into<String>) -> BrokerConfigBuilder {
        BrokerConfigBuilder {
            host: host.into(),
            client_id: client_id.into(),
            port: DEFAULT_PORT,
            username: None,
            password: None,
            keep_alive: DEFAULT_KEEP_ALIVE,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Read broker settings from the process environment.
    ///
    /// `client_prefix` names the tool; a random suffix is appended unless
    /// `MQTT_CLIENT_ID` is set.
    pub fn from_env(client_prefix: &str) -> Result<Self, ConfigError> {
        Self::from_lookup(client_prefix, |key| std::env::var(key).ok())
    }

    /// Same as [`BrokerConfig::from_env`] with a custom variable source.
    pub fn from_lookup<F>(client_prefix: &str, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("MQTT_BROKER_HOST").unwrap_or_else(|| DEFAULT_BROKER_HOST.to_string());
        let port = match lookup("MQTT_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| ConfigError::invalid("MQTT_PORT", raw.clone(), e))?,
            None => DEFAULT_PORT,
        };
        let client_id = lookup("MQTT_CLIENT_ID")
            .unwrap_or_else(|| format!("{client_prefix}-{}", uuid::Uuid::new_v4()));

        let mut builder = BrokerConfig::builder(host, client_id).port(port);
        if let Some(user) = lookup("MQTT_USERNAME") {
            builder = builder.username(user);
        }
        if let Some(pass) = lookup("MQTT_PASSWORD") {
            builder = builder.password(pass);
        }
        Ok(builder.build())
    }

    /// Username and password, when both are present.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some((user.as_str(), pass.as_str())),
            _ => None,
        }
    }
}

/// Builder for [`BrokerConfig`].
pub struct BrokerConfigBuilder {
    host: String,
    client_id: String,
    port: u16,
    username: Option<String>,
    password: Option<String>,
    keep_alive: Duration,
    connect_timeout: Duration,
}

impl BrokerConfigBuilder {
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn keep_alive(mut self, keep_alive: Duration) -> Self {
        self.keep_alive = keep_alive;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Build the config.
    pub fn build(self) -> BrokerConfig {
        BrokerConfig {
            host: self.host,
            port: self.port,
            client_id: self.client_id,
            username: self.username,
            password: self.password,
            keep_alive: self.keep_alive,
            connect_timeout: self.connect_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_match_reference_broker() {
        let config = BrokerConfig::from_lookup("sensor-publisher", lookup_from(&[])).unwrap();

        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 1883);
        assert_eq!(config.keep_alive, Duration::from_secs(60));
        assert_eq!(config.connect_timeout, Duration::from_secs(60));
        assert!(config.client_id.starts_with("sensor-publisher-"));
        assert!(config.credentials().is_none());
    }

    #[test]
    fn test_generated_client_ids_are_unique() {
        let a = BrokerConfig::from_lookup("tool", lookup_from(&[])).unwrap();
        let b = BrokerConfig::from_lookup("tool", lookup_from(&[])).unwrap();
        assert_ne!(a.client_id, b.client_id);
    }

    #[test]
    fn test_environment_overrides() {
        let config = BrokerConfig::from_lookup(
            "tool",
            lookup_from(&[
                ("MQTT_BROKER_HOST", "broker.local"),
                ("MQTT_PORT", "8883"),
                ("MQTT_CLIENT_ID", "fixed-id"),
                ("MQTT_USERNAME", "user"),
                ("MQTT_PASSWORD", "secret"),
            ]),
        )
        .unwrap();

        assert_eq!(config.host, "broker.local");
        assert_eq!(config.port, 8883);
        assert_eq!(config.client_id, "fixed-id");
        assert_eq!(config.credentials(), Some(("user", "secret")));
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let err = BrokerConfig::from_lookup("tool", lookup_from(&[("MQTT_PORT", "not-a-port")]))
            .unwrap_err();

        match err {
            ConfigError::InvalidValue { key, value, .. } => {
                assert_eq!(key, "MQTT_PORT");
                assert_eq!(value, "not-a-port");
            }
        }
    }

    #[test]
    fn test_username_without_password_is_ignored() {
        let config = BrokerConfig::builder("localhost", "id").username("user").build();
        assert!(config.credentials().is_none());
    }
}
