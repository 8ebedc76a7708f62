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

//! Subscriber for the simulated temperature sensor.
//!
//! Connects to the broker, subscribes to the sensor topic and prints every
//! message it receives as `topic: payload`.
//!
//! # Example
//!
//! ```ignore
//! use sensor_link::{BrokerConfig, MqttSession};
//! use sensor_subscriber::{ConsolePrinter, SensorSubscriber, SubscriberConfig};
//!
//! let broker = BrokerConfig::builder("localhost", "monitor-1").build();
//! let config = SubscriberConfig::builder(broker).build();
//!
//! let (session, events) = MqttSession::open(&config.broker);
//! let mut printer = ConsolePrinter::stdout();
//! SensorSubscriber::new(config)
//!     .run(session, events, &mut printer, async { let _ = tokio::signal::ctrl_c().await; })
//!     .await?;
//! ```

pub mod config;
pub mod handler;
pub mod subscriber;

pub use config::{SubscriberConfig, SubscriberConfigBuilder};
pub use handler::{ConsolePrinter, MessageHandler};
pub use subscriber::SensorSubscriber;
