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

//! Events delivered from the broker driver to application code.

use std::fmt;

use rumqttc::{ConnectReturnCode, ConnectionError};
use tokio::sync::mpsc;

/// Receiving end of a session's event channel.
pub type EventStream = mpsc::Receiver<ConnectionEvent>;

/// Something the broker told us.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionEvent {
    /// The broker answered (or failed to answer) our CONNECT.
    Connected(ConnectStatus),
    /// A PUBLISH arrived on a subscribed topic.
    MessageReceived { topic: String, payload: Vec<u8> },
}

/// Outcome of the initial connection attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectStatus {
    /// CONNACK with return code 0.
    Accepted,
    /// CONNACK with a non-zero MQTT 3.1.1 return code (1-5).
    Refused(u8),
    /// No CONNACK at all: DNS, TCP or protocol failure.
    Unreachable(String),
}

impl ConnectStatus {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ConnectStatus::Accepted)
    }

    /// MQTT return code, if the broker sent one.
    pub fn code(&self) -> Option<u8> {
        match self {
            ConnectStatus::Accepted => Some(0),
            ConnectStatus::Refused(code) => Some(*code),
            ConnectStatus::Unreachable(_) => None,
        }
    }

    pub(crate) fn from_error(err: &ConnectionError) -> Self {
        match err {
            ConnectionError::ConnectionRefused(code) => ConnectStatus::from(*code),
            other => ConnectStatus::Unreachable(other.to_string()),
        }
    }
}

impl From<ConnectReturnCode> for ConnectStatus {
    fn from(code: ConnectReturnCode) -> Self {
        match code {
            ConnectReturnCode::Success => ConnectStatus::Accepted,
            ConnectReturnCode::RefusedProtocolVersion => ConnectStatus::Refused(1),
            ConnectReturnCode::BadClientId => ConnectStatus::Refused(2),
            ConnectReturnCode::ServiceUnavailable => ConnectStatus::Refused(3),
            ConnectReturnCode::BadUserNamePassword => ConnectStatus::Refused(4),
            ConnectReturnCode::NotAuthorized => ConnectStatus::Refused(5),
        }
    }
}

impl fmt::Display for ConnectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectStatus::Accepted => write!(f, "code 0"),
            ConnectStatus::Refused(code) => write!(f, "code {code}"),
            ConnectStatus::Unreachable(reason) => write!(f, "no answer ({reason})"),
        }
    }
}

/// Lifecycle of one broker session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Disconnecting,
}
