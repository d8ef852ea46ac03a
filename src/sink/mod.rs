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

//! Destinations for rendered lines.

use std::fmt;

use crate::Error;

mod stdio;
mod testing;

pub use self::stdio::Stderr;
pub use self::stdio::Stdout;
pub use self::testing::CapturedLine;
pub use self::testing::Testing;

/// Where a rendered line belongs: the project, effective topic and environment of the appender
/// that rendered it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Route<'a> {
    /// The project name.
    pub project: Option<&'a str>,
    /// The effective topic; `_json_` for json mode appenders.
    pub topic: Option<&'a str>,
    /// The environment name.
    pub env: Option<&'a str>,
}

/// A sink consumes lines rendered by an appender.
///
/// Sinks are chosen when the appender is built. A sink is called once per accepted event while
/// the appender is started, with a non-empty line that already carries its trailing newline.
pub trait Sink: fmt::Debug + Send + Sync + 'static {
    /// Consume a rendered line.
    fn emit(&self, route: &Route<'_>, line: &str) -> Result<(), Error>;

    /// Flush any buffered lines.
    ///
    /// Default to a no-op.
    fn flush(&self) -> Result<(), Error> {
        Ok(())
    }
}

impl<T: Sink> From<T> for Box<dyn Sink> {
    fn from(value: T) -> Self {
        Box::new(value)
    }
}
