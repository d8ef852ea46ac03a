// Copyright 2024 FastLabs Developers
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

//! Log events as seen by the renderer.

use std::collections::BTreeMap;
use std::thread;

use jiff::Timestamp;
use log::Level;

use crate::diagnostic::CRID_MARK_KEY;
use crate::diagnostic::ThreadLocalDiagnostic;

/// A log event: timestamp, severity, logger name, thread, diagnostics and message.
///
/// Events are captured eagerly so that rendering never depends on the thread that happens to
/// call the renderer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Event {
    // the observed time
    timestamp: Timestamp,

    // the metadata
    level: Level,
    logger: String,
    thread: String,

    // the payload
    message: String,

    // mapped diagnostic context at capture time
    diagnostics: BTreeMap<String, String>,
}

impl Event {
    /// Capture an event from a [`log::Record`] on the current thread.
    ///
    /// The target of the record is used as the logger name.
    pub fn from_record(record: &log::Record) -> Self {
        Event::builder()
            .level(record.level())
            .logger(record.target())
            .message(record.args().to_string())
            .build()
    }

    /// Returns a new builder.
    pub fn builder() -> EventBuilder {
        EventBuilder::default()
    }

    /// The observed time.
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// The verbosity level of the message.
    pub fn level(&self) -> Level {
        self.level
    }

    /// The name of the logger that produced the event.
    pub fn logger(&self) -> &str {
        &self.logger
    }

    /// The name of the thread that produced the event.
    pub fn thread(&self) -> &str {
        &self.thread
    }

    /// The message body.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Look up a diagnostic value captured with the event.
    pub fn diagnostic(&self, key: &str) -> Option<&str> {
        self.diagnostics.get(key).map(String::as_str)
    }

    /// The correlation marker of the event, if any.
    pub fn correlation_marker(&self) -> Option<&str> {
        self.diagnostic(CRID_MARK_KEY)
    }
}

/// Builder for [`Event`].
///
/// Defaults to the current time, [`Level::Info`], the current thread and a snapshot of the
/// [`ThreadLocalDiagnostic`] map.
#[derive(Debug)]
pub struct EventBuilder {
    event: Event,
}

impl Default for EventBuilder {
    fn default() -> Self {
        EventBuilder {
            event: Event {
                timestamp: Timestamp::now(),
                level: Level::Info,
                logger: String::new(),
                thread: current_thread_name(),
                message: String::new(),
                diagnostics: ThreadLocalDiagnostic::snapshot(),
            },
        }
    }
}

impl EventBuilder {
    /// Set [`timestamp`](Event::timestamp).
    pub fn timestamp(mut self, timestamp: Timestamp) -> Self {
        self.event.timestamp = timestamp;
        self
    }

    /// Set [`level`](Event::level).
    pub fn level(mut self, level: Level) -> Self {
        self.event.level = level;
        self
    }

    /// Set [`logger`](Event::logger).
    pub fn logger(mut self, logger: impl Into<String>) -> Self {
        self.event.logger = logger.into();
        self
    }

    /// Set [`thread`](Event::thread).
    pub fn thread(mut self, thread: impl Into<String>) -> Self {
        self.event.thread = thread.into();
        self
    }

    /// Set [`message`](Event::message).
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.event.message = message.into();
        self
    }

    /// Add a diagnostic key-value pair, overriding the captured one if present.
    pub fn diagnostic(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.event.diagnostics.insert(key.into(), value.into());
        self
    }

    /// Invoke the builder and return an [`Event`].
    pub fn build(self) -> Event {
        self.event
    }
}

fn current_thread_name() -> String {
    let current = thread::current();
    match current.name() {
        Some(name) => name.to_owned(),
        None => format!("{:?}", current.id()),
    }
}
