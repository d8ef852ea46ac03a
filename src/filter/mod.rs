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

//! Filters for log events.
//!
//! Filters attached to an appender form a [`FilterChain`]. The chain asks each filter in
//! attachment order; the first one returning [`FilterResult::Accept`] or
//! [`FilterResult::Deny`] decides, and an event no filter decides on is accepted.

use std::fmt;

use log::Level;

pub use self::easy::FALLBACK_LEVEL;
pub use self::easy::FilterKind;
pub use self::easy::FilterSpec;
pub use self::easy::compile;
pub use self::easy::parse_level;
pub use self::level::LevelFilter;
pub use self::threshold::ThresholdFilter;

mod easy;
mod level;
mod threshold;

/// The result of a filter check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterResult {
    /// The event will be processed without further filtering.
    Accept,
    /// The event should not be processed.
    Deny,
    /// No decision could be made, further filtering should occur.
    Neutral,
}

/// A deciding verdict, used as the on-match and on-mismatch outcome of a [`LevelFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// Accept the event.
    Accept,
    /// Deny the event.
    Deny,
}

impl From<Reply> for FilterResult {
    fn from(reply: Reply) -> Self {
        match reply {
            Reply::Accept => FilterResult::Accept,
            Reply::Deny => FilterResult::Deny,
        }
    }
}

/// Represents a filter that can be applied to log events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Decide on events of exactly one level.
    Level(LevelFilter),
    /// Deny events less severe than a threshold.
    Threshold(ThresholdFilter),
}

impl Filter {
    /// Check an event of the given level against this filter.
    pub fn decide(&self, level: Level) -> FilterResult {
        match self {
            Filter::Level(filter) => filter.decide(level),
            Filter::Threshold(filter) => filter.decide(level),
        }
    }
}

impl From<FilterSpec> for Filter {
    fn from(spec: FilterSpec) -> Self {
        match spec {
            FilterSpec::Exact {
                level,
                on_match,
                on_mismatch,
            } => LevelFilter::new(level, on_match, on_mismatch).into(),
            FilterSpec::Threshold { level } => ThresholdFilter::new(level).into(),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Level(filter) => write!(
                f,
                "level({}, on_match={:?}, on_mismatch={:?})",
                filter.level(),
                filter.on_match(),
                filter.on_mismatch()
            ),
            Filter::Threshold(filter) => write!(f, "threshold({})", filter.level()),
        }
    }
}

/// An ordered list of filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterChain {
    filters: Vec<Filter>,
}

impl FilterChain {
    /// Append a filter to the end of the chain.
    pub fn push(&mut self, filter: impl Into<Filter>) {
        self.filters.push(filter.into());
    }

    /// Ask the filters in order; return the first deciding result, or
    /// [`FilterResult::Neutral`] if none decides.
    pub fn decide(&self, level: Level) -> FilterResult {
        self.filters
            .iter()
            .map(|filter| filter.decide(level))
            .find(|result| *result != FilterResult::Neutral)
            .unwrap_or(FilterResult::Neutral)
    }

    /// Whether an event of the given level passes the chain.
    pub fn accepts(&self, level: Level) -> bool {
        self.decide(level) != FilterResult::Deny
    }

    /// The filters in attachment order.
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// The number of attached filters.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Whether no filter is attached.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_chain_accepts_everything() {
        let chain = FilterChain::default();
        assert!(chain.is_empty());
        assert_eq!(chain.len(), 0);
        assert_eq!(chain.decide(Level::Trace), FilterResult::Neutral);
        assert!(chain.accepts(Level::Trace));
    }

    #[test]
    fn first_deciding_filter_wins() {
        let mut chain = FilterChain::default();
        chain.push(ThresholdFilter::new(log::LevelFilter::Warn));
        chain.push(LevelFilter::new(log::LevelFilter::Error, Reply::Deny, Reply::Accept));

        // threshold is neutral for WARN and ERROR, so the exact filter decides
        assert_eq!(chain.decide(Level::Warn), FilterResult::Accept);
        assert_eq!(chain.decide(Level::Error), FilterResult::Deny);
        // threshold denies INFO before the exact filter is asked
        assert_eq!(chain.decide(Level::Info), FilterResult::Deny);
    }

    #[test]
    fn accept_short_circuits_later_filters() {
        let mut chain = FilterChain::default();
        chain.push(LevelFilter::new(log::LevelFilter::Debug, Reply::Accept, Reply::Deny));
        chain.push(LevelFilter::new(log::LevelFilter::Debug, Reply::Deny, Reply::Accept));
        assert!(chain.accepts(Level::Debug));
        assert!(!chain.accepts(Level::Info));
    }

    #[test]
    fn display_filters() {
        let mut chain = FilterChain::default();
        chain.push(compile(Some("warn+")).unwrap());
        chain.push(compile(Some("-error")).unwrap());
        assert_eq!(chain.len(), 2);
        assert!(!chain.is_empty());
        let rendered = chain
            .filters()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        insta::assert_snapshot!(rendered, @"threshold(WARN); level(ERROR, on_match=Deny, on_mismatch=Accept)");
    }

    #[test]
    fn off_threshold_denies_what_all_threshold_passes() {
        let mut off = FilterChain::default();
        off.push(compile(Some("off+")).unwrap());
        let mut all = FilterChain::default();
        all.push(compile(Some("all+")).unwrap());
        for level in [Level::Error, Level::Warn, Level::Info, Level::Debug, Level::Trace] {
            assert_eq!(off.decide(level), FilterResult::Deny, "{level}");
            assert!(all.accepts(level), "{level}");
        }
        assert_eq!(off.filters()[0].to_string(), "threshold(OFF)");
        assert_eq!(all.filters()[0].to_string(), "threshold(TRACE)");
    }
}
