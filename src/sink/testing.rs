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

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::Error;
use crate::sink::Route;
use crate::sink::Sink;

/// A line captured by the [`Testing`] sink together with its route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedLine {
    /// The project the line was routed with.
    pub project: Option<String>,
    /// The topic the line was routed with.
    pub topic: Option<String>,
    /// The environment the line was routed with.
    pub env: Option<String>,
    /// The rendered line.
    pub line: String,
}

/// A sink that keeps rendered lines in memory and also writes them to stderr, where a test
/// harness (like `cargo test`) captures them.
///
/// Clones share the same buffer, so a test can keep one clone and hand the other to the
/// appender.
///
/// # Examples
///
/// ```
/// use logforth_xlog::XLogAppender;
/// use logforth_xlog::sink::Testing;
///
/// let sink = Testing::default();
/// let appender = XLogAppender::builder(sink.clone()).build();
/// appender.start();
///
/// let event = logforth_xlog::Event::builder().message("hello").build();
/// appender.append(&event).unwrap();
/// assert!(sink.lines()[0].ends_with("hello\n"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Testing {
    captured: Arc<Mutex<Vec<CapturedLine>>>,
}

impl Testing {
    fn captured(&self) -> MutexGuard<'_, Vec<CapturedLine>> {
        self.captured.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// The captured lines with their routes, oldest first.
    pub fn records(&self) -> Vec<CapturedLine> {
        self.captured().clone()
    }

    /// The captured lines, oldest first.
    pub fn lines(&self) -> Vec<String> {
        self.captured().iter().map(|c| c.line.clone()).collect()
    }

    /// Drop every captured line.
    pub fn clear(&self) {
        self.captured().clear();
    }
}

impl Sink for Testing {
    fn emit(&self, route: &Route<'_>, line: &str) -> Result<(), Error> {
        eprint!("{line}");
        self.captured().push(CapturedLine {
            project: route.project.map(str::to_owned),
            topic: route.topic.map(str::to_owned),
            env: route.env.map(str::to_owned),
            line: line.to_owned(),
        });
        Ok(())
    }
}
