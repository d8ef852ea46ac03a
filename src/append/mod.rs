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

//! The xlog appender: mode-dependent layout selection, renderer lifecycle and filter chain in
//! front of a [`Sink`].

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use log::Level;

use crate::Error;
use crate::ErrorKind;
use crate::config::AppenderConfig;
use crate::config::Mode;
use crate::context::Context;
use crate::event::Event;
use crate::filter::Filter;
use crate::filter::FilterChain;
use crate::filter::FilterResult;
use crate::filter::FilterSpec;
use crate::filter::compile;
use crate::layout::PatternLayout;
use crate::sink::Sink;

mod builder;

pub use self::builder::XLogAppenderBuilder;

/// The lifecycle state of an [`XLogAppender`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// No renderer; events are not accepted. Initial and terminal state.
    Stopped,
    /// A renderer is being built; only observable from inside [`XLogAppender::start`].
    Initializing,
    /// A started renderer is in place; events are rendered and emitted.
    Started,
}

#[derive(Debug)]
struct Inner {
    config: AppenderConfig,
    filters: FilterChain,
    renderer: Option<PatternLayout>,
    state: State,
    #[cfg(test)]
    pattern_override: Option<String>,
}

impl Inner {
    fn pattern(&self) -> &str {
        #[cfg(test)]
        if let Some(pattern) = &self.pattern_override {
            return pattern;
        }
        self.config.pattern()
    }

    fn close_renderer(&mut self) {
        if let Some(mut renderer) = self.renderer.take() {
            renderer.stop();
        }
    }
}

/// An appender that renders events in plain or json mode and hands the text to a [`Sink`].
///
/// Configuration setters are legal in any state. Mode changes are picked up by the next
/// [`start`](Self::start); the effective topic reflects the mode immediately.
///
/// One mutex guards the configuration, the filter chain, the renderer and the lifecycle state,
/// so start, stop and append serialize with each other. Sinks are called while the lock is
/// held and must not log through the same appender.
///
/// # Examples
///
/// ```
/// use logforth_xlog::Event;
/// use logforth_xlog::XLogAppender;
/// use logforth_xlog::sink::Testing;
///
/// let sink = Testing::default();
/// let appender = XLogAppender::builder(sink.clone())
///     .project("svc")
///     .topic("app")
///     .easy_filter("info+")
///     .build();
/// appender.start();
/// assert!(appender.is_started());
///
/// appender.append(&Event::builder().message("hello").build()).unwrap();
/// assert_eq!(sink.lines().len(), 1);
///
/// appender.stop();
/// assert!(appender.append(&Event::builder().build()).is_err());
/// ```
#[derive(Debug)]
pub struct XLogAppender {
    context: Arc<Context>,
    sink: Box<dyn Sink>,
    inner: Mutex<Inner>,
}

impl XLogAppender {
    /// Create a builder that emits to `sink`.
    pub fn builder(sink: impl Into<Box<dyn Sink>>) -> XLogAppenderBuilder {
        XLogAppenderBuilder::new(sink.into())
    }

    fn new(
        context: Context,
        sink: Box<dyn Sink>,
        config: AppenderConfig,
        filters: FilterChain,
    ) -> Self {
        let inner = Inner {
            config,
            filters,
            renderer: None,
            state: State::Stopped,
            #[cfg(test)]
            pattern_override: None,
        };
        Self {
            context: Arc::new(context),
            sink,
            inner: Mutex::new(inner),
        }
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// The current lifecycle state.
    pub fn state(&self) -> State {
        self.inner().state
    }

    /// Whether the appender accepts events.
    pub fn is_started(&self) -> bool {
        self.state() == State::Started
    }

    /// A copy of the current configuration.
    pub fn config(&self) -> AppenderConfig {
        self.inner().config.clone()
    }

    /// The output mode.
    pub fn mode(&self) -> Mode {
        self.inner().config.mode()
    }

    /// Set the output mode. The layout follows on the next start.
    pub fn set_mode(&self, mode: impl Into<Mode>) {
        self.inner().config.set_mode(mode);
    }

    /// Whether the output mode is json.
    pub fn is_json_mode(&self) -> bool {
        self.inner().config.is_json_mode()
    }

    /// The project name.
    pub fn project(&self) -> Option<String> {
        self.inner().config.project().map(str::to_owned)
    }

    /// Set the project name; blank names are stored as absent.
    pub fn set_project(&self, project: Option<&str>) {
        self.inner().config.set_project(project);
    }

    /// The topic lines are routed to: `_json_` in json mode, the configured topic otherwise.
    pub fn effective_topic(&self) -> Option<String> {
        self.inner().config.effective_topic().map(str::to_owned)
    }

    /// Set the topic; blank topics are stored as absent.
    pub fn set_topic(&self, topic: Option<&str>) {
        self.inner().config.set_topic(topic);
    }

    /// The environment name.
    pub fn env(&self) -> Option<String> {
        self.inner().config.env().map(str::to_owned)
    }

    /// Set the environment name; blank names are stored as absent.
    pub fn set_env(&self, env: Option<&str>) {
        self.inner().config.set_env(env);
    }

    /// Attach a filter written in shorthand syntax to the end of the filter chain.
    ///
    /// Blank tokens attach nothing. Returns the attached filter, if any. See
    /// [`filter::compile`](crate::filter::compile) for the syntax.
    pub fn add_easy_filter(&self, token: &str) -> Option<FilterSpec> {
        let spec = compile(Some(token))?;
        self.add_filter(spec);
        Some(spec)
    }

    /// Attach a filter to the end of the filter chain.
    pub fn add_filter(&self, filter: impl Into<Filter>) {
        self.inner().filters.push(filter);
    }

    /// The attached filters in attachment order.
    pub fn filters(&self) -> Vec<Filter> {
        self.inner().filters.filters().to_vec()
    }

    /// Run the filter chain for an event of the given level.
    pub fn decide(&self, level: Level) -> FilterResult {
        self.inner().filters.decide(level)
    }

    /// (Re)initialize the renderer and start the appender.
    ///
    /// An existing renderer is stopped and discarded first, so starting twice is the same as
    /// starting once. If the new renderer fails to start it is discarded, the failure is
    /// reported to the context's trap, and the appender stays stopped.
    pub fn start(&self) {
        let mut inner = self.inner();
        inner.state = State::Initializing;
        inner.close_renderer();

        let mut renderer = PatternLayout::new(inner.pattern());
        renderer.set_context(self.context.clone());
        let result = renderer.start();
        if renderer.is_started() {
            inner.renderer = Some(renderer);
            inner.state = State::Started;
            return;
        }

        inner.state = State::Stopped;
        drop(inner);

        let mut err = Error::new(ErrorKind::RendererFailedToStart, "renderer failed to start")
            .with_context("pattern", renderer.pattern());
        if let Err(cause) = result {
            err = err.with_source(cause);
        }
        self.context.report(&err);
    }

    /// Discard the renderer and stop the appender. Safe to call in any state, any number of
    /// times.
    pub fn stop(&self) {
        let mut inner = self.inner();
        inner.close_renderer();
        inner.state = State::Stopped;
    }

    /// Render an event and emit it to the sink.
    ///
    /// The filter chain is not consulted; see [`decide`](Self::decide).
    ///
    /// # Errors
    ///
    /// Return an error if the appender is not started or the sink fails.
    pub fn append(&self, event: &Event) -> Result<(), Error> {
        let inner = self.inner();
        self.emit(&inner, event)
    }

    /// Emit an event if the appender is started and the filter chain accepts it.
    pub(crate) fn append_filtered(&self, event: &Event) -> Result<(), Error> {
        let inner = self.inner();
        if inner.state != State::Started || !inner.filters.accepts(event.level()) {
            return Ok(());
        }
        self.emit(&inner, event)
    }

    fn emit(&self, inner: &Inner, event: &Event) -> Result<(), Error> {
        let renderer = match (&inner.renderer, inner.state) {
            (Some(renderer), State::Started) => renderer,
            _ => return Err(Error::not_started()),
        };
        let line = renderer.format(event)?;
        self.sink.emit(&inner.config.route(), &line)
    }

    /// Flush the sink.
    ///
    /// # Errors
    ///
    /// Return an error if the sink fails to flush.
    pub fn flush(&self) -> Result<(), Error> {
        self.sink.flush()
    }

    /// Report a non-fatal error to the context's trap.
    pub fn report(&self, err: &Error) {
        self.context.report(err);
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use jiff::Timestamp;
    use jiff::tz::TimeZone;

    use super::*;
    use crate::config::TOPIC_JSON;
    use crate::filter::FilterKind;
    use crate::filter::LevelFilter;
    use crate::filter::Reply;
    use crate::filter::ThresholdFilter;
    use crate::sink::Testing;
    use crate::trap::Trap;

    #[derive(Debug, Clone, Default)]
    struct RecordingTrap(Arc<Mutex<Vec<String>>>);

    impl Trap for RecordingTrap {
        fn trap(&self, err: &Error) {
            self.0.lock().unwrap().push(err.message().to_owned());
        }
    }

    impl RecordingTrap {
        fn messages(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    fn appender(sink: &Testing) -> XLogAppender {
        XLogAppender::builder(sink.clone())
            .timezone(TimeZone::UTC)
            .build()
    }

    fn event(level: Level, message: &str) -> Event {
        Event::builder()
            .timestamp(Timestamp::from_millisecond(1_700_000_000_123).unwrap())
            .level(level)
            .logger("com.x.Y")
            .thread("main")
            .message(message)
            .diagnostic("cridMark", "CRID[1]")
            .build()
    }

    #[test]
    fn starts_stopped() {
        let appender = appender(&Testing::default());
        assert_eq!(appender.state(), State::Stopped);
        assert_eq!(appender.mode(), Mode::Plain);
    }

    #[test]
    fn start_twice_recreates_the_renderer() {
        let sink = Testing::default();
        let appender = appender(&sink);
        appender.start();
        appender.start();
        assert_eq!(appender.state(), State::Started);

        let inner = appender.inner();
        assert!(inner.renderer.as_ref().is_some_and(PatternLayout::is_started));
        drop(inner);

        appender.append(&event(Level::Info, "once")).unwrap();
        assert_eq!(sink.lines().len(), 1);
    }

    #[test]
    fn stop_twice_is_a_no_op() {
        let trap = RecordingTrap::default();
        let appender = XLogAppender::builder(Testing::default())
            .trap(trap.clone())
            .build();
        appender.stop();
        appender.start();
        appender.stop();
        appender.stop();
        assert_eq!(appender.state(), State::Stopped);
        assert!(appender.inner().renderer.is_none());
        assert!(trap.messages().is_empty());
    }

    #[test]
    fn failed_start_stays_stopped_and_reports() {
        let sink = Testing::default();
        let trap = RecordingTrap::default();
        let appender = XLogAppender::builder(sink.clone())
            .trap(trap.clone())
            .build();
        appender.inner().pattern_override = Some("%d{yyyy} %bogus".to_owned());

        appender.start();
        assert_eq!(appender.state(), State::Stopped);
        assert!(appender.inner().renderer.is_none());
        assert_eq!(trap.messages(), vec!["renderer failed to start".to_owned()]);

        let err = appender.append(&event(Level::Error, "lost")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotStarted);
        assert!(sink.lines().is_empty());

        // a good pattern makes the next start succeed
        appender.inner().pattern_override = None;
        appender.start();
        assert!(appender.is_started());
    }

    #[test]
    fn failed_restart_discards_the_previous_renderer() {
        let appender = XLogAppender::builder(Testing::default())
            .trap(RecordingTrap::default())
            .build();
        appender.start();
        assert!(appender.is_started());

        appender.inner().pattern_override = Some("%".to_owned());
        appender.start();
        assert_eq!(appender.state(), State::Stopped);
        assert!(appender.inner().renderer.is_none());
    }

    #[test]
    fn append_while_stopped_is_an_error() {
        let sink = Testing::default();
        let appender = appender(&sink);
        let err = appender.append(&event(Level::Info, "early")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotStarted);

        appender.start();
        appender.stop();
        assert!(appender.append(&event(Level::Info, "late")).is_err());
        assert!(sink.lines().is_empty());
    }

    #[test]
    fn plain_line_end_to_end() {
        let sink = Testing::default();
        let appender = XLogAppender::builder(sink.clone())
            .timezone(TimeZone::UTC)
            .mode(Mode::Plain)
            .project("svc")
            .topic("app")
            .env("prod")
            .build();
        appender.start();
        appender.append(&event(Level::Info, "hello")).unwrap();

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].line,
            "[2023/11/14 22:13:20.123] CRID[1] [main] INFO  com.x.Y - hello\n"
        );
        assert_eq!(records[0].project.as_deref(), Some("svc"));
        assert_eq!(records[0].topic.as_deref(), Some("app"));
        assert_eq!(records[0].env.as_deref(), Some("prod"));
    }

    #[test]
    fn json_mode_end_to_end() {
        let sink = Testing::default();
        let appender = appender(&sink);
        appender.set_topic(Some("app"));
        appender.set_mode(Mode::Json);
        appender.start();
        assert_eq!(appender.effective_topic().as_deref(), Some(TOPIC_JSON));

        appender.append(&event(Level::Info, r#"{"k":1}"#)).unwrap();
        let records = sink.records();
        assert_eq!(records[0].line, "[2023/11/14 22:13:20.123] {\"k\":1}\n");
        assert_eq!(records[0].topic.as_deref(), Some(TOPIC_JSON));
    }

    #[test]
    fn mode_change_applies_on_restart_but_topic_at_once() {
        let sink = Testing::default();
        let appender = appender(&sink);
        appender.set_topic(Some("app"));
        appender.start();

        appender.set_mode("json");
        assert!(appender.is_json_mode());
        assert_eq!(appender.effective_topic().as_deref(), Some(TOPIC_JSON));
        appender.append(&event(Level::Info, "still plain")).unwrap();

        appender.start();
        appender.append(&event(Level::Info, "now json")).unwrap();

        appender.set_mode(Mode::Plain);
        assert_eq!(appender.effective_topic().as_deref(), Some("app"));

        let lines = sink.lines();
        assert!(lines[0].contains("INFO  com.x.Y - still plain"));
        assert_eq!(lines[1], "[2023/11/14 22:13:20.123] now json\n");
    }

    #[test]
    fn setters_normalize() {
        let appender = appender(&Testing::default());
        appender.set_project(Some("  svc  "));
        appender.set_topic(Some(" "));
        appender.set_env(None);
        assert_eq!(appender.project().as_deref(), Some("svc"));
        assert_eq!(appender.effective_topic(), None);
        assert_eq!(appender.env(), None);
    }

    #[test]
    fn easy_filters_keep_attachment_order() {
        let appender = appender(&Testing::default());
        appender.add_filter(LevelFilter::new(log::LevelFilter::Trace, Reply::Deny, Reply::Accept));

        let warn = appender.add_easy_filter("warn+").unwrap();
        assert_eq!(warn.kind(), FilterKind::Threshold);
        let error = appender.add_easy_filter("-error").unwrap();
        assert_eq!(error.kind(), FilterKind::Exact);
        assert_eq!(appender.add_easy_filter("   "), None);

        assert_eq!(
            appender.filters(),
            vec![
                Filter::from(LevelFilter::new(log::LevelFilter::Trace, Reply::Deny, Reply::Accept)),
                Filter::from(ThresholdFilter::new(log::LevelFilter::Warn)),
                Filter::from(LevelFilter::new(log::LevelFilter::Error, Reply::Deny, Reply::Accept)),
            ]
        );
    }

    #[test]
    fn append_filtered_consults_the_chain() {
        let sink = Testing::default();
        let appender = appender(&sink);
        appender.add_easy_filter("warn+");
        appender.add_easy_filter("-error");

        // stopped appenders drop events silently on this path
        appender.append_filtered(&event(Level::Warn, "dropped")).unwrap();

        appender.start();
        for level in [Level::Trace, Level::Debug, Level::Info, Level::Warn, Level::Error] {
            appender.append_filtered(&event(level, level.as_str())).unwrap();
        }
        let lines = sink.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with("WARN  com.x.Y - WARN\n"));
    }

    #[test]
    fn concurrent_appends_and_restarts() {
        let sink = Testing::default();
        let appender = Arc::new(appender(&sink));
        appender.start();

        let writers = (0..4)
            .map(|i| {
                let appender = appender.clone();
                thread::spawn(move || {
                    for n in 0..50 {
                        appender
                            .append(&event(Level::Info, &format!("writer {i} event {n}")))
                            .unwrap();
                    }
                })
            })
            .collect::<Vec<_>>();
        for _ in 0..20 {
            appender.start();
        }
        for writer in writers {
            writer.join().unwrap();
        }

        let lines = sink.lines();
        assert_eq!(lines.len(), 200);
        assert!(lines.iter().all(|line| line.ends_with('\n')));
    }
}
