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

//! The sensor's timer loop.

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use sensor_link::{ConnectStatus, ConnectionEvent, EventStream, Session};

use crate::config::PublisherConfig;
use crate::reading::Reading;

/// Simulated temperature sensor.
///
/// Publishes one [`Reading`] per interval until the shutdown future
/// resolves, then releases the session.
pub struct SensorPublisher {
    config: PublisherConfig,
}

impl SensorPublisher {
    pub fn new(config: PublisherConfig) -> Self {
        Self { config }
    }

    /// Run until `shutdown` resolves and return the number of readings sent.
    ///
    /// `session` is closed exactly once when the loop ends, whether it ended
    /// on shutdown or on an error.
    pub async fn run<S, F>(&self, session: S, events: EventStream, shutdown: F) -> Result<u64>
    where
        S: Session,
        F: Future<Output = ()>,
    {
        let mut rng = StdRng::from_entropy();
        let outcome = self.publish_until(&session, events, shutdown, &mut rng).await;
        session.close().await;
        outcome
    }

    async fn publish_until<S, F>(
        &self,
        session: &S,
        mut events: EventStream,
        shutdown: F,
        rng: &mut StdRng,
    ) -> Result<u64>
    where
        S: Session,
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let id = self.config.broker.client_id.as_str();

        let status = tokio::select! {
            _ = &mut shutdown => {
                info!("[{id}] Stopping sensor simulation...");
                return Ok(0);
            }
            status = wait_for_connect(&mut events, self.config.broker.connect_timeout) => status,
        };
        match &status {
            ConnectStatus::Accepted => info!("[{id}] Connected to MQTT broker"),
            // Keeps publishing anyway; the transport drops what it cannot send.
            failed => warn!("[{id}] Connection failed with {failed}"),
        }
        drop(events);

        let mut published = 0u64;
        loop {
            let reading = Reading::sample(&mut *rng, Utc::now());
            let payload = reading.to_payload()?;
            let text = String::from_utf8_lossy(&payload).into_owned();

            if let Err(e) = session.publish(&self.config.topic, payload).await {
                debug!("[{id}] {e}");
            }
            info!("[{id}] Published: {text}");
            published += 1;

            tokio::select! {
                _ = &mut shutdown => {
                    info!("[{id}] Stopping sensor simulation...");
                    break;
                }
                _ = tokio::time::sleep(self.config.interval) => {}
            }
        }
        Ok(published)
    }
}

/// Wait for the broker's answer to CONNECT.
async fn wait_for_connect(events: &mut EventStream, limit: Duration) -> ConnectStatus {
    let first_status = async {
        while let Some(event) = events.recv().await {
            if let ConnectionEvent::Connected(status) = event {
                return status;
            }
        }
        ConnectStatus::Unreachable("event loop stopped".to_string())
    };

    match tokio::time::timeout(limit, first_status).await {
        Ok(status) => status,
        Err(_) => ConnectStatus::Unreachable(format!("no CONNACK within {limit:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use sensor_link::{BrokerConfig, LinkError};
    use tokio::sync::mpsc;
    use tokio::time::Instant;

    #[derive(Default)]
    struct Recorded {
        published: Vec<(String, Vec<u8>, Instant)>,
        closes: usize,
        published_after_close: usize,
    }

    #[derive(Clone, Default)]
    struct RecordingSession {
        recorded: Arc<Mutex<Recorded>>,
    }

    #[async_trait]
    impl Session for RecordingSession {
        async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), LinkError> {
            let mut recorded = self.recorded.lock().unwrap();
            if recorded.closes > 0 {
                recorded.published_after_close += 1;
            }
            recorded.published.push((topic.to_string(), payload, Instant::now()));
            Ok(())
        }

        async fn subscribe(&self, _topic: &str) -> Result<(), LinkError> {
            Ok(())
        }

        async fn close(self) {
            self.recorded.lock().unwrap().closes += 1;
        }
    }

    fn publisher() -> SensorPublisher {
        let broker = BrokerConfig::builder("localhost", "publisher-test").build();
        SensorPublisher::new(PublisherConfig::builder(broker).build())
    }

    fn events_with(status: ConnectStatus) -> EventStream {
        let (tx, rx) = mpsc::channel(4);
        tx.try_send(ConnectionEvent::Connected(status)).unwrap();
        rx
    }

    #[tokio::test(start_paused = true)]
    async fn test_publishes_once_per_interval_until_shutdown() {
        let session = RecordingSession::default();
        let recorded = session.recorded.clone();
        let shutdown = tokio::time::sleep(Duration::from_millis(3500));

        let count = publisher()
            .run(session, events_with(ConnectStatus::Accepted), shutdown)
            .await
            .unwrap();

        assert_eq!(count, 4);
        let recorded = recorded.lock().unwrap();
        assert_eq!(recorded.published.len(), 4);
        for pair in recorded.published.windows(2) {
            assert_eq!(pair[1].2 - pair[0].2, Duration::from_secs(1));
        }
        for (topic, payload, _) in &recorded.published {
            assert_eq!(topic, "sensors/temperature");
            let reading = Reading::from_payload(payload).unwrap();
            assert!((20.0..=30.0).contains(&reading.temperature));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_release_runs_exactly_once_and_nothing_follows() {
        let session = RecordingSession::default();
        let recorded = session.recorded.clone();
        let shutdown = tokio::time::sleep(Duration::from_millis(1500));

        publisher()
            .run(session, events_with(ConnectStatus::Accepted), shutdown)
            .await
            .unwrap();
        // Let any stray timers fire.
        tokio::time::sleep(Duration::from_secs(5)).await;

        let recorded = recorded.lock().unwrap();
        assert_eq!(recorded.closes, 1);
        assert_eq!(recorded.published_after_close, 0);
        assert_eq!(recorded.published.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refused_connection_still_enters_loop() {
        let session = RecordingSession::default();
        let recorded = session.recorded.clone();
        let shutdown = tokio::time::sleep(Duration::from_millis(2500));

        let count = publisher()
            .run(session, events_with(ConnectStatus::Refused(5)), shutdown)
            .await
            .unwrap();

        assert_eq!(count, 3);
        assert_eq!(recorded.lock().unwrap().closes, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stopped_event_loop_still_enters_loop() {
        let (tx, rx) = mpsc::channel(1);
        drop(tx);
        let session = RecordingSession::default();
        let shutdown = tokio::time::sleep(Duration::from_millis(500));

        let count = publisher().run(session, rx, shutdown).await.unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_timeout_then_publishes() {
        let (_tx, rx) = mpsc::channel(1);
        let session = RecordingSession::default();
        let recorded = session.recorded.clone();
        let shutdown = tokio::time::sleep(Duration::from_millis(61_500));
        let start = Instant::now();

        let count = publisher().run(session, rx, shutdown).await.unwrap();

        assert_eq!(count, 2);
        let first_publish = recorded.lock().unwrap().published[0].2;
        assert_eq!(first_publish - start, Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_while_connecting_publishes_nothing() {
        let (_tx, rx) = mpsc::channel(1);
        let session = RecordingSession::default();
        let recorded = session.recorded.clone();

        let count = publisher().run(session, rx, async {}).await.unwrap();

        assert_eq!(count, 0);
        let recorded = recorded.lock().unwrap();
        assert!(recorded.published.is_empty());
        assert_eq!(recorded.closes, 1);
    }

    #[tokio::test]
    async fn test_wait_for_connect_skips_early_messages() {
        let (tx, mut rx) = mpsc::channel(4);
        tx.try_send(ConnectionEvent::MessageReceived {
            topic: "x".into(),
            payload: vec![],
        })
        .unwrap();
        tx.try_send(ConnectionEvent::Connected(ConnectStatus::Accepted)).unwrap();

        let status = wait_for_connect(&mut rx, Duration::from_secs(1)).await;
        assert_eq!(status, ConnectStatus::Accepted);
    }
}
