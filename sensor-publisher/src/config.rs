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

//! Configuration types for the sensor publisher.

use std::time::Duration;

use sensor_link::{BrokerConfig, ConfigError, DEFAULT_TOPIC};

const CLIENT_PREFIX: &str = "sensor-publisher";
const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// Configuration for the simulated sensor.
#[derive(Debug, Clone)]
pub struct PublisherConfig {
    pub broker: BrokerConfig,
    /// Topic readings are published to (default: `"sensors/temperature"`).
    pub topic: String,
    /// Pause after each publish (default: 1s).
    pub interval: Duration,
}

impl PublisherConfig {
    /// Start building a new config against the given broker.
    pub fn builder(broker: BrokerConfig) -> PublisherConfigBuilder {
        PublisherConfigBuilder {
            broker,
            topic: DEFAULT_TOPIC.to_string(),
            interval: DEFAULT_INTERVAL,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let broker = BrokerConfig::from_lookup(CLIENT_PREFIX, &lookup)?;
        let mut builder = PublisherConfig::builder(broker);

        if let Some(topic) = lookup("MQTT_TOPIC") {
            builder = builder.topic(topic);
        }
        if let Some(raw) = lookup("SENSOR_INTERVAL_MS") {
            let millis = raw
                .trim()
                .parse::<u64>()
                .map_err(|e| ConfigError::invalid("SENSOR_INTERVAL_MS", raw.clone(), e))?;
            if millis == 0 {
                return Err(ConfigError::invalid("SENSOR_INTERVAL_MS", raw, "must be positive"));
            }
            builder = builder.interval(Duration::from_millis(millis));
        }
        Ok(builder.build())
    }
}

/// Builder for [`PublisherConfig`].
pub struct PublisherConfigBuilder {
    broker: BrokerConfig,
    topic: String,
    interval: Duration,
}

impl PublisherConfigBuilder {
    pub fn topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Build the config.
    pub fn build(self) -> PublisherConfig {
        PublisherConfig {
            broker: self.broker,
            topic: self.topic,
            interval: self.interval,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PublisherConfig::from_lookup(|_| None).unwrap();

        assert_eq!(config.topic, "sensors/temperature");
        assert_eq!(config.interval, Duration::from_secs(1));
        assert!(config.broker.client_id.starts_with("sensor-publisher-"));
    }

    #[test]
    fn test_interval_override() {
        let config = PublisherConfig::from_lookup(|key| match key {
            "SENSOR_INTERVAL_MS" => Some("250".to_string()),
            "MQTT_TOPIC" => Some("lab/temp".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.interval, Duration::from_millis(250));
        assert_eq!(config.topic, "lab/temp");
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let result = PublisherConfig::from_lookup(|key| {
            (key == "SENSOR_INTERVAL_MS").then(|| "0".to_string())
        });
        assert!(result.is_err());
    }
}
