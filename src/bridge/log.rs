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

//! Serve [`log`] records through an [`XLogAppender`].

use std::sync::Arc;

use log::LevelFilter;

use crate::Error;
use crate::ErrorKind;
use crate::append::XLogAppender;
use crate::event::Event;
use crate::filter::FilterResult;

impl log::Log for XLogAppender {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.is_started() && self.decide(metadata.level()) != FilterResult::Deny
    }

    fn log(&self, record: &log::Record) {
        if !log::Log::enabled(self, record.metadata()) {
            return;
        }
        let event = Event::from_record(record);
        if let Err(err) = self.append_filtered(&event) {
            self.report(&err);
        }
    }

    fn flush(&self) {
        if let Err(err) = XLogAppender::flush(self) {
            self.report(&err);
        }
    }
}

#[derive(Debug)]
struct GlobalAppender(Arc<XLogAppender>);

impl log::Log for GlobalAppender {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        log::Log::enabled(&*self.0, metadata)
    }

    fn log(&self, record: &log::Record) {
        log::Log::log(&*self.0, record);
    }

    fn flush(&self) {
        log::Log::flush(&*self.0);
    }
}

/// Install the appender as the global [`log`] logger.
///
/// The caller keeps its handle and stays in charge of the lifecycle: records logged while the
/// appender is stopped are dropped.
///
/// # Errors
///
/// Return an error if a global logger has already been set.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use logforth_xlog::XLogAppender;
/// use logforth_xlog::sink::Stderr;
///
/// let appender = Arc::new(XLogAppender::builder(Stderr::default()).build());
/// appender.start();
/// if logforth_xlog::bridge::log::try_apply(appender.clone()).is_err() {
///     eprintln!("failed to set logger");
/// }
/// ```
pub fn try_apply(appender: Arc<XLogAppender>) -> Result<(), Error> {
    log::set_boxed_logger(Box::new(GlobalAppender(appender))).map_err(|err| {
        Error::new(ErrorKind::Unexpected, "failed to set global logger").with_source(err)
    })?;
    log::set_max_level(LevelFilter::Trace);
    Ok(())
}

/// Install the appender as the global [`log`] logger.
///
/// # Panics
///
/// Panic if the global logger has already been set.
pub fn apply(appender: Arc<XLogAppender>) {
    try_apply(appender).expect("apply must be called before the global logger initialized");
}

#[cfg(test)]
mod tests {
    use log::Level;
    use log::Log;

    use super::*;
    use crate::sink::Testing;

    #[test]
    fn records_pass_through_filters() {
        let sink = Testing::default();
        let appender = XLogAppender::builder(sink.clone())
            .easy_filter("info+")
            .build();

        let record = |level: Level| {
            appender.log(
                &log::Record::builder()
                    .level(level)
                    .target("com.x.Y")
                    .args(format_args!("at {level}"))
                    .build(),
            );
        };

        record(Level::Info);
        assert!(sink.lines().is_empty());

        appender.start();
        assert!(appender.enabled(&log::Metadata::builder().level(Level::Warn).build()));
        assert!(!appender.enabled(&log::Metadata::builder().level(Level::Debug).build()));
        record(Level::Debug);
        record(Level::Warn);

        let lines = sink.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with("WARN  com.x.Y - at WARN\n"));
    }
}
