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
use log::LevelFilter;

use crate::filter::Filter;
use crate::filter::FilterResult;

/// A filter that denies events less severe than the specified level.
///
/// From most to least severe, the levels are:
///
/// - `Error`
/// - `Warn`
/// - `Info`
/// - `Debug`
/// - `Trace`
///
/// If the threshold is `Warn`, `Error` and `Warn` events are left to later filters and
/// everything else is denied. A threshold of [`LevelFilter::Off`] denies every event and
/// one of [`LevelFilter::Trace`] denies none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThresholdFilter {
    level: LevelFilter,
}

impl ThresholdFilter {
    /// Create a threshold filter.
    pub fn new(level: LevelFilter) -> Self {
        Self { level }
    }

    /// The least severe level that passes.
    pub fn level(&self) -> LevelFilter {
        self.level
    }

    pub(crate) fn decide(&self, level: Level) -> FilterResult {
        // log orders levels from most severe (Error) to least severe (Trace)
        if level <= self.level {
            FilterResult::Neutral
        } else {
            FilterResult::Deny
        }
    }
}

impl From<ThresholdFilter> for Filter {
    fn from(filter: ThresholdFilter) -> Self {
        Filter::Threshold(filter)
    }
}
