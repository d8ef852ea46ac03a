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

use std::io::Write;

use crate::Error;
use crate::sink::Route;
use crate::sink::Sink;

/// A sink that prints rendered lines to stdout.
///
/// # Examples
///
/// ```
/// use logforth_xlog::XLogAppender;
/// use logforth_xlog::sink::Stdout;
///
/// let appender = XLogAppender::builder(Stdout::default()).build();
/// ```
#[derive(Debug, Default)]
#[non_exhaustive]
pub struct Stdout {}

impl Sink for Stdout {
    fn emit(&self, _: &Route<'_>, line: &str) -> Result<(), Error> {
        std::io::stdout()
            .lock()
            .write_all(line.as_bytes())
            .map_err(Error::from_io_error)
    }

    fn flush(&self) -> Result<(), Error> {
        std::io::stdout().flush().map_err(Error::from_io_error)
    }
}

/// A sink that prints rendered lines to stderr.
///
/// # Examples
///
/// ```
/// use logforth_xlog::XLogAppender;
/// use logforth_xlog::sink::Stderr;
///
/// let appender = XLogAppender::builder(Stderr::default()).build();
/// ```
#[derive(Debug, Default)]
#[non_exhaustive]
pub struct Stderr {}

impl Sink for Stderr {
    fn emit(&self, _: &Route<'_>, line: &str) -> Result<(), Error> {
        std::io::stderr()
            .lock()
            .write_all(line.as_bytes())
            .map_err(Error::from_io_error)
    }

    fn flush(&self) -> Result<(), Error> {
        std::io::stderr().flush().map_err(Error::from_io_error)
    }
}
