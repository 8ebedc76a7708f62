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

use anyhow::{Context, Result};
use log::{info, warn};
use sensor_link::MqttSession;
use sensor_publisher::{PublisherConfig, SensorPublisher};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = PublisherConfig::from_env().context("invalid publisher configuration")?;
    info!(
        "Temperature sensor simulation: publishing to '{}' every {:?}. Press Ctrl+C to stop",
        config.topic, config.interval
    );

    let (session, events) = MqttSession::open(&config.broker);
    let publisher = SensorPublisher::new(config);

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    let published = publisher.run(session, events, shutdown).await?;
    info!("Published {published} readings");
    Ok(())
}
