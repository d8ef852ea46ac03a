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

use std::fmt::Write;

use jiff::Timestamp;
use jiff::tz::TimeZone;

use crate::Error;
use crate::ErrorKind;

/// The date format used by `%d` without an option.
pub(crate) const ISO8601_FORMAT: &str = "yyyy-MM-dd HH:mm:ss,SSS";

/// A compiled date format such as `yyyy/MM/dd HH:mm:ss.SSS`.
///
/// Supported fields are `yyyy`, `yy`, `MM`, `dd`, `HH`, `mm`, `ss` and `SSS`. Text in
/// single quotes and any non-letter character is copied as is. The format compiles to a
/// [`strftime`](jiff::fmt::strtime) string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DateFormat {
    strftime: String,
}

impl DateFormat {
    pub(crate) fn compile(format: &str) -> Result<Self, Error> {
        let mut strftime = String::new();
        let mut chars = format.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '\'' {
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == '\'' {
                        closed = true;
                        break;
                    }
                    push_literal(&mut strftime, c);
                }
                if !closed {
                    return Err(invalid_date_format(format, "unterminated quote"));
                }
                continue;
            }

            if !c.is_ascii_alphabetic() {
                push_literal(&mut strftime, c);
                continue;
            }

            let mut width = 1;
            while chars.next_if_eq(&c).is_some() {
                width += 1;
            }
            let directive = match (c, width) {
                ('y', 4) => "%Y",
                ('y', 2) => "%y",
                ('M', 2) => "%m",
                ('d', 2) => "%d",
                ('H', 2) => "%H",
                ('m', 2) => "%M",
                ('s', 2) => "%S",
                ('S', 3) => "%3f",
                _ => {
                    let field = c.to_string().repeat(width);
                    return Err(invalid_date_format(format, "unsupported field")
                        .with_context("field", field));
                }
            };
            strftime.push_str(directive);
        }

        Ok(DateFormat { strftime })
    }

    pub(crate) fn format(&self, timestamp: Timestamp, tz: &TimeZone, text: &mut String) {
        let zoned = timestamp.to_zoned(tz.clone());
        // SAFETY: compile only emits directives jiff can render for any zoned datetime
        write!(text, "{}", zoned.strftime(&self.strftime)).unwrap();
    }
}

fn push_literal(strftime: &mut String, c: char) {
    if c == '%' {
        strftime.push_str("%%");
    } else {
        strftime.push(c);
    }
}

fn invalid_date_format(format: &str, reason: &str) -> Error {
    Error::new(ErrorKind::InvalidPattern, format!("invalid date format: {reason}"))
        .with_context("format", format)
}
