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

//! Where received messages go.

use std::io::{self, Write};

use log::warn;

/// Receives every decoded message, in arrival order.
pub trait MessageHandler: Send {
    fn handle(&mut self, topic: &str, payload: &str);
}

/// Writes `topic: payload` lines, flushing after each one.
pub struct ConsolePrinter<W = io::Stdout> {
    out: W,
}

impl ConsolePrinter {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> ConsolePrinter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> MessageHandler for ConsolePrinter<W> {
    fn handle(&mut self, topic: &str, payload: &str) {
        let written = writeln!(self.out, "{topic}: {payload}").and_then(|_| self.out.flush());
        if let Err(e) = written {
            warn!("Failed to print message from '{topic}': {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prints_topic_and_payload() {
        let mut printer = ConsolePrinter::new(Vec::new());
        printer.handle("sensors/temperature", r#"{"temperature": 24.37}"#);
        printer.handle("sensors/temperature", "second");

        let text = String::from_utf8(printer.into_inner()).unwrap();
        assert_eq!(
            text,
            "sensors/temperature: {\"temperature\": 24.37}\nsensors/temperature: second\n"
        );
    }
}
