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

//! Long-lived subscription loop.

use std::future::Future;

use anyhow::Result;
use log::{info, warn};

use sensor_link::{ConnectionEvent, EventStream, Session};

use crate::config::SubscriberConfig;
use crate::handler::MessageHandler;

/// Subscribes to the sensor topic and hands every message to a
/// [`MessageHandler`].
pub struct SensorSubscriber {
    config: SubscriberConfig,
}

impl SensorSubscriber {
    pub fn new(config: SubscriberConfig) -> Self {
        Self { config }
    }

    /// Process session events until `shutdown` resolves, then close the
    /// session. Returns the number of messages handed to `handler`.
    ///
    /// If the connection drops, no further messages arrive but the loop still
    /// waits for `shutdown`; there is no reconnect.
    pub async fn run<S, H, F>(
        &self,
        session: S,
        mut events: EventStream,
        handler: &mut H,
        shutdown: F,
    ) -> Result<u64>
    where
        S: Session,
        H: MessageHandler,
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let id = self.config.broker.client_id.as_str();
        let mut received = 0u64;
        let mut stream_ended = false;

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("[{id}] Shutdown signal received");
                    break;
                }
                event = events.recv() => match event {
                    Some(ConnectionEvent::Connected(status)) => {
                        info!("[{id}] Connected to MQTT broker ({status})");
                        // Subscribes whatever the status; a failed session rejects it.
                        match session.subscribe(&self.config.topic).await {
                            Ok(()) => info!("[{id}] Listening to '{}'", self.config.topic),
                            Err(e) => warn!("[{id}] {e}"),
                        }
                    }
                    Some(ConnectionEvent::MessageReceived { topic, payload }) => {
                        match std::str::from_utf8(&payload) {
                            Ok(text) => {
                                handler.handle(&topic, text);
                                received += 1;
                            }
                            Err(e) => {
                                warn!("[{id}] Skipping non-UTF-8 payload on '{topic}': {e}");
                            }
                        }
                    }
                    None => {
                        stream_ended = true;
                        break;
                    }
                },
            }
        }

        if stream_ended {
            warn!("[{id}] Connection closed, no more messages will arrive");
            shutdown.await;
            info!("[{id}] Shutdown signal received");
        }

        session.close().await;
        Ok(received)
    }
}
