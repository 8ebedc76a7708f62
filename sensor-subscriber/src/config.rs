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

//! Configuration types for the sensor subscriber.

use sensor_link::{BrokerConfig, ConfigError, DEFAULT_TOPIC};

const CLIENT_PREFIX: &str = "sensor-subscriber";

/// Configuration for the subscriber.
#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    pub broker: BrokerConfig,
    /// MQTT topic filter to subscribe to (default: `"sensors/temperature"`).
    pub topic: String,
}

impl SubscriberConfig {
    /// Start building a new config against the given broker.
    pub fn builder(broker: BrokerConfig) -> SubscriberConfigBuilder {
        SubscriberConfigBuilder {
            broker,
            topic: DEFAULT_TOPIC.to_string(),
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
        let mut builder = SubscriberConfig::builder(broker);
        if let Some(topic) = lookup("MQTT_TOPIC") {
            builder = builder.topic(topic);
        }
        Ok(builder.build())
    }
}

/// Builder for [`SubscriberConfig`].
pub struct SubscriberConfigBuilder {
    broker: BrokerConfig,
    topic: String,
}

impl SubscriberConfigBuilder {
    pub fn topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    /// Build the config.
    pub fn build(self) -> SubscriberConfig {
        SubscriberConfig {
            broker: self.broker,
            topic: self.topic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SubscriberConfig::from_lookup(|_| None).unwrap();

        assert_eq!(config.topic, "sensors/temperature");
        assert_eq!(config.broker.port, 1883);
        assert!(config.broker.client_id.starts_with("sensor-subscriber-"));
    }

    #[test]
    fn test_wildcard_topic_override() {
        let config = SubscriberConfig::from_lookup(|key| {
            (key == "MQTT_TOPIC").then(|| "sensors/#".to_string())
        })
        .unwrap();
        assert_eq!(config.topic, "sensors/#");
    }
}
