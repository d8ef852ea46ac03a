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

use log::Level;

use crate::filter::Filter;
use crate::filter::FilterResult;
use crate::filter::Reply;

/// A filter that matches events of exactly one level.
///
/// Events at the configured level get the `on_match` verdict; every other event gets the
/// `on_mismatch` verdict. A filter for [`log::LevelFilter::Off`] matches no event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelFilter {
    level: log::LevelFilter,
    on_match: Reply,
    on_mismatch: Reply,
}

impl LevelFilter {
    /// Create a filter for `level` with the given verdicts.
    pub fn new(level: log::LevelFilter, on_match: Reply, on_mismatch: Reply) -> Self {
        Self {
            level,
            on_match,
            on_mismatch,
        }
    }

    /// The level this filter matches.
    pub fn level(&self) -> log::LevelFilter {
        self.level
    }

    /// The verdict for events at [`level`](Self::level).
    pub fn on_match(&self) -> Reply {
        self.on_match
    }

    /// The verdict for events at any other level.
    pub fn on_mismatch(&self) -> Reply {
        self.on_mismatch
    }

    pub(crate) fn decide(&self, level: Level) -> FilterResult {
        if level == self.level {
            self.on_match.into()
        } else {
            self.on_mismatch.into()
        }
    }
}

impl From<LevelFilter> for Filter {
    fn from(filter: LevelFilter) -> Self {
        Filter::Level(filter)
    }
}
