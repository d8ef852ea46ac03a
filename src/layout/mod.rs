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

//! Render log events into text.

use std::sync::Arc;

use crate::Error;
use crate::ErrorKind;
use crate::context::Context;
use crate::event::Event;

use self::pattern::CompiledPattern;

mod date;
mod pattern;

/// A renderer that turns events into text following a conversion pattern.
///
/// The pattern uses `%` conversions such as `%d{yyyy/MM/dd HH:mm:ss.SSS}`, `%X{cridMark}`,
/// `%thread`, `%-5level`, `%logger{35}`, `%msg` and `%n`.
///
/// A layout has to be bound to a [`Context`] and started before it renders anything. Starting
/// compiles the pattern; a layout whose pattern does not compile stays stopped.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use logforth_xlog::Context;
/// use logforth_xlog::Event;
/// use logforth_xlog::layout::PatternLayout;
///
/// let mut layout = PatternLayout::new("%-5level %msg%n");
/// layout.set_context(Arc::new(Context::default()));
/// layout.start().unwrap();
///
/// let event = Event::builder().message("hello").build();
/// assert_eq!(layout.format(&event).unwrap(), "INFO  hello\n");
/// ```
#[derive(Debug)]
pub struct PatternLayout {
    pattern: String,
    context: Option<Arc<Context>>,
    compiled: Option<CompiledPattern>,
}

impl PatternLayout {
    /// Create a stopped layout for `pattern`.
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            context: None,
            compiled: None,
        }
    }

    /// The conversion pattern.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Bind the layout to an output context.
    pub fn set_context(&mut self, context: Arc<Context>) {
        self.context = Some(context);
    }

    /// Compile the pattern and start the layout.
    ///
    /// # Errors
    ///
    /// Return an error, leaving the layout stopped, if no context is bound or the pattern does
    /// not compile.
    pub fn start(&mut self) -> Result<(), Error> {
        if self.context.is_none() {
            return Err(Error::new(ErrorKind::Unexpected, "no context bound to layout"));
        }
        let compiled = CompiledPattern::compile(&self.pattern)?;
        self.compiled = Some(compiled);
        Ok(())
    }

    /// Stop the layout. Stopping a stopped layout does nothing.
    pub fn stop(&mut self) {
        self.compiled = None;
    }

    /// Whether the layout is started.
    pub fn is_started(&self) -> bool {
        self.compiled.is_some()
    }

    /// Render an event.
    ///
    /// Rendering is synchronous and does not touch any state outside the layout.
    ///
    /// # Errors
    ///
    /// Return an error if the layout is not started.
    pub fn format(&self, event: &Event) -> Result<String, Error> {
        match (&self.compiled, &self.context) {
            (Some(compiled), Some(context)) => Ok(compiled.render(event, context.tz())),
            _ => Err(Error::not_started()),
        }
    }
}
