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

use crate::Error;
use crate::trap::DefaultTrap;
use crate::trap::Trap;

/// The output context a renderer is bound to.
///
/// It carries the time zone timestamps are rendered in and the [`Trap`] that receives non-fatal
/// errors. Each appender owns one context and shares it with every renderer it creates.
#[derive(Debug)]
pub struct Context {
    timezone: TimeZone,
    trap: Box<dyn Trap>,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            timezone: TimeZone::system(),
            trap: Box::new(DefaultTrap::default()),
        }
    }
}

impl Context {
    /// Set the time zone used to render timestamps.
    ///
    /// Default to the system time zone.
    pub fn timezone(mut self, timezone: TimeZone) -> Self {
        self.timezone = timezone;
        self
    }

    /// Set the trap that receives non-fatal errors.
    ///
    /// Default to [`DefaultTrap`].
    pub fn trap(mut self, trap: impl Into<Box<dyn Trap>>) -> Self {
        self.trap = trap.into();
        self
    }

    pub(crate) fn tz(&self) -> &TimeZone {
        &self.timezone
    }

    /// Report a non-fatal error to the configured trap.
    pub fn report(&self, err: &Error) {
        self.trap.trap(err);
    }
}
