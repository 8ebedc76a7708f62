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

//! The temperature reading and its wire encoding.

use std::io;

use chrono::{DateTime, SubsecRound, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const MIN_TEMPERATURE: f64 = 20.0;
pub const MAX_TEMPERATURE: f64 = 30.0;

/// Wall-clock layout of `timestamp`: UTC, second precision, no zone suffix.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One simulated sensor sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Degrees Celsius, two decimal places.
    pub temperature: f64,
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl Reading {
    /// Draw a temperature uniformly from [20.0, 30.0] and stamp it with `now`.
    pub fn sample<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> Self {
        let raw = rng.gen_range(MIN_TEMPERATURE..=MAX_TEMPERATURE);
        Self {
            temperature: round_to_hundredths(raw),
            timestamp: now.trunc_subsecs(0),
        }
    }

    /// Encode as the JSON text published on the wire:
    /// `{"temperature": 24.37, "timestamp": "2024-03-11 14:22:05"}`.
    pub fn to_payload(&self) -> serde_json::Result<Vec<u8>> {
        let mut ser = serde_json::Serializer::with_formatter(Vec::with_capacity(64), SpacedFormatter);
        self.serialize(&mut ser)?;
        Ok(ser.into_inner())
    }

    pub fn from_payload(payload: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(payload)
    }
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Compact JSON with a space after `:` and `,`.
struct SpacedFormatter;

impl serde_json::ser::Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

mod timestamp {
    use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    use super::TIMESTAMP_FORMAT;

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(TIMESTAMP_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let naive = NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(de::Error::custom)?;
        Ok(Utc.from_utc_datetime(&naive))
    }
}
