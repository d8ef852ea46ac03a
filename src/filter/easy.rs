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

//! Shorthand filter syntax.
//!
//! | token    | filter                                                 |
//! |----------|--------------------------------------------------------|
//! | `info`   | exact level INFO, accept on match, deny on mismatch    |
//! | `-info`  | exact level INFO, deny on match, accept on mismatch    |
//! | `info+`  | threshold at INFO: INFO and more severe levels pass    |

use std::str::FromStr;

use log::LevelFilter;

use crate::filter::Reply;

/// The level an unrecognized level name resolves to.
///
/// Compiling a shorthand filter never fails: `"verbose+"` silently becomes a threshold at this
/// level. This mirrors the level parser of the logging frameworks the shorthand syntax comes
/// from, which fall back to `DEBUG` for unknown names. `OFF` and `ALL` are known names; see
/// [`parse_level`].
pub const FALLBACK_LEVEL: LevelFilter = LevelFilter::Debug;

/// Whether a [`FilterSpec`] matches one level or a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Matches exactly one level.
    Exact,
    /// Matches a level and everything more severe.
    Threshold,
}

/// A filter compiled from shorthand syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterSpec {
    /// An exact-level filter with its verdicts.
    Exact {
        /// The level to match. [`LevelFilter::Off`] matches no event.
        level: LevelFilter,
        /// Verdict for events at `level`.
        on_match: Reply,
        /// Verdict for all other events.
        on_mismatch: Reply,
    },
    /// A threshold filter; severity comparison is its only rule.
    Threshold {
        /// The least severe level that passes. [`LevelFilter::Off`] passes nothing.
        level: LevelFilter,
    },
}

impl FilterSpec {
    /// The kind of this filter.
    pub fn kind(&self) -> FilterKind {
        match self {
            FilterSpec::Exact { .. } => FilterKind::Exact,
            FilterSpec::Threshold { .. } => FilterKind::Threshold,
        }
    }

    /// The level of this filter.
    pub fn level(&self) -> LevelFilter {
        match *self {
            FilterSpec::Exact { level, .. } | FilterSpec::Threshold { level } => level,
        }
    }
}

/// Parse a level name case-insensitively for a filter of the given kind.
///
/// `trace` through `error` are the [`log::Level`] names and `off` is [`LevelFilter::Off`].
/// `all` is [`LevelFilter::Trace`] for a threshold, so every event passes, and
/// [`LevelFilter::Off`] for an exact filter, since no event is at level `ALL`. Anything else,
/// including names with surrounding whitespace, resolves to [`FALLBACK_LEVEL`].
pub fn parse_level(name: &str, kind: FilterKind) -> LevelFilter {
    if name.eq_ignore_ascii_case("ALL") {
        return match kind {
            FilterKind::Exact => LevelFilter::Off,
            FilterKind::Threshold => LevelFilter::Trace,
        };
    }
    LevelFilter::from_str(name).unwrap_or(FALLBACK_LEVEL)
}

/// Compile a shorthand filter token.
///
/// Returns `None` for an absent, empty or all-whitespace token: no filter is wanted, which is
/// not an error. Every other token compiles; see [`FALLBACK_LEVEL`] for unknown level names.
///
/// Only the token as a whole is trimmed. The level text left after stripping `+` or `-` is
/// taken as is, so `"info +"` names the unknown level `"INFO "`.
///
/// # Examples
///
/// ```
/// use log::LevelFilter;
/// use logforth_xlog::filter::FilterSpec;
/// use logforth_xlog::filter::compile;
///
/// assert_eq!(
///     compile(Some(" Warn+ ")),
///     Some(FilterSpec::Threshold {
///         level: LevelFilter::Warn
///     })
/// );
/// assert_eq!(compile(Some("   ")), None);
/// ```
pub fn compile(token: Option<&str>) -> Option<FilterSpec> {
    let token = token.map(str::trim).filter(|token| !token.is_empty())?;
    let token = token.to_uppercase();

    let spec = if let Some(level) = token.strip_suffix('+') {
        FilterSpec::Threshold {
            level: parse_level(level, FilterKind::Threshold),
        }
    } else if let Some(level) = token.strip_prefix('-') {
        FilterSpec::Exact {
            level: parse_level(level, FilterKind::Exact),
            on_match: Reply::Deny,
            on_mismatch: Reply::Accept,
        }
    } else {
        FilterSpec::Exact {
            level: parse_level(&token, FilterKind::Exact),
            on_match: Reply::Accept,
            on_mismatch: Reply::Deny,
        }
    };
    Some(spec)
}
