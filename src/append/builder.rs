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

use jiff::tz::TimeZone;

use crate::append::XLogAppender;
use crate::config::AppenderConfig;
use crate::config::Mode;
use crate::context::Context;
use crate::filter::Filter;
use crate::filter::FilterChain;
use crate::filter::compile;
use crate::sink::Sink;
use crate::trap::Trap;

/// A builder to configure and create an [`XLogAppender`].
///
/// The built appender is stopped; call [`XLogAppender::start`] before appending.
///
/// # Examples
///
/// ```
/// use logforth_xlog::Mode;
/// use logforth_xlog::XLogAppender;
/// use logforth_xlog::sink::Stdout;
///
/// let appender = XLogAppender::builder(Stdout::default())
///     .mode(Mode::Json)
///     .project("svc")
///     .env("prod")
///     .easy_filter("info+")
///     .build();
/// assert_eq!(appender.effective_topic().as_deref(), Some("_json_"));
/// ```
#[must_use = "call `build` to construct the appender"]
#[derive(Debug)]
pub struct XLogAppenderBuilder {
    sink: Box<dyn Sink>,
    context: Context,
    config: AppenderConfig,
    filters: FilterChain,
}

impl XLogAppenderBuilder {
    pub(crate) fn new(sink: Box<dyn Sink>) -> Self {
        Self {
            sink,
            context: Context::default(),
            config: AppenderConfig::default(),
            filters: FilterChain::default(),
        }
    }

    /// Replace the whole configuration.
    ///
    /// The config's shorthand filter tokens are compiled and attached after any filters
    /// already added to this builder; blank tokens attach nothing.
    pub fn config(mut self, config: AppenderConfig) -> Self {
        for token in config.filters() {
            if let Some(spec) = compile(Some(token.as_str())) {
                self.filters.push(spec);
            }
        }
        self.config = config;
        self
    }

    /// Set the output mode.
    ///
    /// Default to [`Mode::Plain`].
    pub fn mode(mut self, mode: impl Into<Mode>) -> Self {
        self.config.set_mode(mode);
        self
    }

    /// Set the project name.
    pub fn project(mut self, project: &str) -> Self {
        self.config.set_project(Some(project));
        self
    }

    /// Set the topic.
    pub fn topic(mut self, topic: &str) -> Self {
        self.config.set_topic(Some(topic));
        self
    }

    /// Set the environment name.
    pub fn env(mut self, env: &str) -> Self {
        self.config.set_env(Some(env));
        self
    }

    /// Attach a filter in shorthand syntax; blank tokens attach nothing.
    pub fn easy_filter(mut self, token: &str) -> Self {
        if let Some(spec) = compile(Some(token)) {
            self.filters.push(spec);
        }
        self
    }

    /// Attach a filter.
    pub fn filter(mut self, filter: impl Into<Filter>) -> Self {
        self.filters.push(filter);
        self
    }

    /// Set the time zone timestamps are rendered in.
    ///
    /// Default to the system time zone.
    pub fn timezone(mut self, timezone: TimeZone) -> Self {
        self.context = self.context.timezone(timezone);
        self
    }

    /// Set the trap for errors such as a renderer that fails to start.
    ///
    /// Default to [`DefaultTrap`](crate::trap::DefaultTrap).
    pub fn trap(mut self, trap: impl Into<Box<dyn Trap>>) -> Self {
        self.context = self.context.trap(trap);
        self
    }

    /// Build the stopped [`XLogAppender`].
    pub fn build(self) -> XLogAppender {
        let XLogAppenderBuilder {
            sink,
            context,
            config,
            filters,
        } = self;
        XLogAppender::new(context, sink, config, filters)
    }
}
