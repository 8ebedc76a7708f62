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

//! Shared MQTT connection lifecycle for the sensor publisher and subscriber.
//!
//! Opens a single broker connection, drives the `rumqttc` event loop on a
//! background task and turns broker callbacks into [`ConnectionEvent`]s
//! delivered over a channel.
//!
//! # Example
//!
//! ```ignore
//! use sensor_link::{BrokerConfig, ConnectionEvent, MqttSession, Session};
//!
//! let config = BrokerConfig::builder("localhost", "sensor-demo").port(1883).build();
//! let (session, mut events) = MqttSession::open(&config);
//!
//! if let Some(ConnectionEvent::Connected(status)) = events.recv().await {
//!     println!("connect status: {}", status.code());
//! }
//! session.close().await;
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod session;

pub use config::{BrokerConfig, BrokerConfigBuilder, DEFAULT_BROKER_HOST, DEFAULT_PORT, DEFAULT_TOPIC};
pub use error::{ConfigError, LinkError};
pub use event::{ConnectStatus, ConnectionEvent, ConnectionState, EventStream};
pub use session::{MqttSession, Session};
