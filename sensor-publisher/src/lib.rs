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

//! Simulated temperature sensor.
//!
//! Draws a random temperature once per interval and publishes it as JSON to
//! an MQTT topic, until asked to stop.
//!
//! # Example
//!
//! ```ignore
//! use sensor_link::{BrokerConfig, MqttSession};
//! use sensor_publisher::{PublisherConfig, SensorPublisher};
//!
//! let broker = BrokerConfig::builder("localhost", "sensor-1").build();
//! let config = PublisherConfig::builder(broker).topic("sensors/temperature").build();
//!
//! let (session, events) = MqttSession::open(&config.broker);
//! let publisher = SensorPublisher::new(config);
//! publisher.run(session, events, async { let _ = tokio::signal::ctrl_c().await; }).await?;
//! ```

pub mod config;
pub mod publisher;
pub mod reading;

pub use config::{PublisherConfig, PublisherConfigBuilder};
pub use publisher::SensorPublisher;
pub use reading::Reading;
