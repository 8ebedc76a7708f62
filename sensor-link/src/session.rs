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

//! Broker session: the [`Session`] seam and its `rumqttc` implementation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error, info};
use rumqttc::{AsyncClient, Event, EventLoop, Incoming, MqttOptions, Outgoing, QoS};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::config::BrokerConfig;
use crate::error::LinkError;
use crate::event::{ConnectStatus, ConnectionEvent, ConnectionState, EventStream};

const REQUEST_CAPACITY: usize = 100;
const EVENT_CAPACITY: usize = 100;
/// Time the driver gets to flush DISCONNECT before it is aborted.
const DISCONNECT_GRACE: Duration = Duration::from_secs(1);

/// One open broker connection, as seen by the publish/subscribe loops.
///
/// Everything goes out at QoS 0 (at-most-once).
#[async_trait]
pub trait Session: Send + Sync {
    /// Queue a PUBLISH. Returns once the client accepted it, not once the
    /// broker did.
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), LinkError>;

    async fn subscribe(&self, topic: &str) -> Result<(), LinkError>;

    /// Disconnect and stop background processing. Consumes the session.
    async fn close(self);
}

/// [`Session`] backed by a `rumqttc` client and a spawned event-loop driver.
pub struct MqttSession {
    client: AsyncClient,
    client_id: String,
    state: Arc<watch::Sender<ConnectionState>>,
    driver: Option<JoinHandle<()>>,
}

impl MqttSession {
    /// Start connecting to the broker.
    ///
    /// The connection itself is made by the driver task; the first event on
    /// the returned stream is always [`ConnectionEvent::Connected`] unless the
    /// session is closed first.
    pub fn open(config: &BrokerConfig) -> (Self, EventStream) {
        info!(
            "[{}] Connecting to MQTT broker at {}:{}",
            config.client_id, config.host, config.port
        );

        let mut mqtt_opts = MqttOptions::new(&config.client_id, &config.host, config.port);
        mqtt_opts.set_keep_alive(config.keep_alive);
        if let Some((user, pass)) = config.credentials() {
            mqtt_opts.set_credentials(user, pass);
        }

        let (client, mut eventloop) = AsyncClient::new(mqtt_opts, REQUEST_CAPACITY);
        // Covers both the TCP connect and the wait for CONNACK.
        eventloop
            .network_options
            .set_connection_timeout(config.connect_timeout.as_secs().max(1));
        let (events_tx, events_rx) = mpsc::channel(EVENT_CAPACITY);
        let (state, _) = watch::channel(ConnectionState::Connecting);
        let state = Arc::new(state);

        let driver = tokio::spawn(drive(
            eventloop,
            events_tx,
            state.clone(),
            config.client_id.clone(),
        ));

        let session = Self {
            client,
            client_id: config.client_id.clone(),
            state,
            driver: Some(driver),
        };
        (session, events_rx)
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Watch state transitions.
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }
}

#[async_trait]
impl Session for MqttSession {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), LinkError> {
        self.client
            .publish(topic, QoS::AtMostOnce, false, payload)
            .await
            .map_err(|e| LinkError::Publish {
                topic: topic.to_string(),
                reason: e.to_string(),
            })
    }

    async fn subscribe(&self, topic: &str) -> Result<(), LinkError> {
        self.client
            .subscribe(topic, QoS::AtMostOnce)
            .await
            .map_err(|e| LinkError::Subscribe {
                topic: topic.to_string(),
                reason: e.to_string(),
            })
    }

    async fn close(mut self) {
        self.state.send_replace(ConnectionState::Disconnecting);

        // try_disconnect never waits on a stalled request queue.
        if let Err(e) = self.client.try_disconnect() {
            debug!("[{}] DISCONNECT not queued: {e}", self.client_id);
        }

        if let Some(mut driver) = self.driver.take() {
            if tokio::time::timeout(DISCONNECT_GRACE, &mut driver).await.is_err() {
                debug!("[{}] Event loop still running, aborting", self.client_id);
                driver.abort();
                let _ = driver.await;
            }
        }

        self.state.send_replace(ConnectionState::Disconnected);
        info!("[{}] Disconnected from MQTT broker", self.client_id);
    }
}

impl Drop for MqttSession {
    fn drop(&mut self) {
        if let Some(driver) = self.driver.take() {
            driver.abort();
            self.state.send_replace(ConnectionState::Disconnected);
        }
    }
}

/// Poll the event loop until the connection ends, forwarding broker events.
///
/// There is no reconnect: the first connection error stops the driver.
async fn drive(
    mut eventloop: EventLoop,
    events: mpsc::Sender<ConnectionEvent>,
    state: Arc<watch::Sender<ConnectionState>>,
    client_id: String,
) {
    debug!("[{client_id}] MQTT event loop started");
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Incoming::ConnAck(ack))) => {
                let status = ConnectStatus::from(ack.code);
                if status.is_accepted() {
                    state.send_replace(ConnectionState::Connected);
                }
                forward(&events, ConnectionEvent::Connected(status)).await;
            }
            Ok(Event::Incoming(Incoming::Publish(publish))) => {
                let event = ConnectionEvent::MessageReceived {
                    topic: publish.topic,
                    payload: publish.payload.to_vec(),
                };
                forward(&events, event).await;
            }
            Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                debug!("[{client_id}] DISCONNECT sent");
                break;
            }
            Ok(_) => {} // PingResp, SubAck, outgoing publishes
            Err(e) => {
                let connecting = *state.borrow() == ConnectionState::Connecting;
                if connecting {
                    forward(&events, ConnectionEvent::Connected(ConnectStatus::from_error(&e))).await;
                } else {
                    error!("[{client_id}] MQTT connection error: {e}");
                }
                break;
            }
        }
    }
    state.send_if_modified(|current| {
        if *current == ConnectionState::Disconnecting {
            return false;
        }
        *current = ConnectionState::Disconnected;
        true
    });
    debug!("[{client_id}] MQTT event loop stopped");
}

async fn forward(events: &mpsc::Sender<ConnectionEvent>, event: ConnectionEvent) {
    // Nobody listening is fine: the publisher stops reading after CONNACK.
    let _ = events.send(event).await;
}
