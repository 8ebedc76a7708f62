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
use sensor_subscriber::{ConsolePrinter, SensorSubscriber, SubscriberConfig};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = SubscriberConfig::from_env().context("invalid subscriber configuration")?;
    info!(
        "Listening to '{}' on {}:{}. Press Ctrl+C to stop",
        config.topic, config.broker.host, config.broker.port
    );

    let (session, events) = MqttSession::open(&config.broker);
    let subscriber = SensorSubscriber::new(config);
    let mut printer = ConsolePrinter::stdout();

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    let received = subscriber.run(session, events, &mut printer, shutdown).await?;
    info!("Received {received} messages");
    Ok(())
}
