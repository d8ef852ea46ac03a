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

use std::borrow::Cow;
use std::iter::Peekable;
use std::str::CharIndices;

use jiff::tz::TimeZone;

use crate::Error;
use crate::ErrorKind;
use crate::event::Event;
use crate::layout::date::DateFormat;
use crate::layout::date::ISO8601_FORMAT;

/// Width constraints of a conversion, as in `%-5level` or `%.10logger`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct FormatSpec {
    left_align: bool,
    min: usize,
    max: Option<usize>,
}

impl FormatSpec {
    fn apply(&self, value: &str, text: &mut String) {
        let mut value = Cow::Borrowed(value);
        let mut len = value.chars().count();
        if let Some(max) = self.max {
            if len > max {
                // keep the rightmost characters
                value = Cow::Owned(value.chars().skip(len - max).collect());
                len = max;
            }
        }

        let padding = self.min.saturating_sub(len);
        if self.left_align {
            text.push_str(&value);
            text.extend(std::iter::repeat_n(' ', padding));
        } else {
            text.extend(std::iter::repeat_n(' ', padding));
            text.push_str(&value);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Converter {
    Date(DateFormat),
    Mdc(String),
    Thread,
    Level,
    Logger(Option<usize>),
    Message,
    Newline,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Convert(FormatSpec, Converter),
}

/// A pattern compiled into literal text and conversions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CompiledPattern {
    segments: Vec<Segment>,
}

impl CompiledPattern {
    pub(crate) fn compile(pattern: &str) -> Result<Self, Error> {
        Parser::new(pattern).parse()
    }

    pub(crate) fn render(&self, event: &Event, tz: &TimeZone) -> String {
        let mut text = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(literal) => text.push_str(literal),
                Segment::Convert(spec, converter) => match converter {
                    Converter::Date(format) => {
                        let mut date = String::new();
                        format.format(event.timestamp(), tz, &mut date);
                        spec.apply(&date, &mut text);
                    }
                    Converter::Mdc(key) => spec.apply(event.diagnostic(key).unwrap_or(""), &mut text),
                    Converter::Thread => spec.apply(event.thread(), &mut text),
                    Converter::Level => spec.apply(event.level().as_str(), &mut text),
                    Converter::Logger(target) => {
                        let logger = match target {
                            Some(target) => abbreviate(event.logger(), *target),
                            None => Cow::Borrowed(event.logger()),
                        };
                        spec.apply(&logger, &mut text);
                    }
                    Converter::Message => spec.apply(event.message(), &mut text),
                    Converter::Newline => text.push('\n'),
                },
            }
        }
        text
    }
}

struct Parser<'a> {
    pattern: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Parser<'a> {
    fn new(pattern: &'a str) -> Self {
        Self {
            pattern,
            chars: pattern.char_indices().peekable(),
        }
    }

    fn parse(mut self) -> Result<CompiledPattern, Error> {
        let mut segments = vec![];
        let mut literal = String::new();

        while let Some((_, c)) = self.chars.next() {
            if c != '%' {
                literal.push(c);
                continue;
            }
            if self.chars.next_if(|(_, c)| *c == '%').is_some() {
                literal.push('%');
                continue;
            }

            let segment = self.parse_conversion()?;
            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(segment);
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(CompiledPattern { segments })
    }

    fn parse_conversion(&mut self) -> Result<Segment, Error> {
        let mut spec = FormatSpec {
            left_align: self.chars.next_if(|(_, c)| *c == '-').is_some(),
            ..FormatSpec::default()
        };
        if let Some(min) = self.parse_number()? {
            spec.min = min;
        }
        if self.chars.next_if(|(_, c)| *c == '.').is_some() {
            match self.parse_number()? {
                Some(max) => spec.max = Some(max),
                None => return Err(self.error("expected a maximum width after '.'")),
            }
        }

        let word = self.take_while(|c| c.is_ascii_alphabetic());
        if word.is_empty() {
            return Err(self.error("expected a conversion word after '%'"));
        }
        let option = self.parse_option()?;

        let converter = match word {
            "d" | "date" => {
                let format = option.unwrap_or(ISO8601_FORMAT);
                Converter::Date(DateFormat::compile(format)?)
            }
            "X" | "mdc" => match option {
                Some(key) => Converter::Mdc(key.trim().to_owned()),
                None => return Err(self.error("conversion '%X' requires a key")),
            },
            "t" | "thread" => Converter::Thread,
            "p" | "le" | "level" => Converter::Level,
            "c" | "lo" | "logger" => match option {
                Some(target) => match target.trim().parse::<usize>() {
                    Ok(target) => Converter::Logger(Some(target)),
                    Err(err) => {
                        return Err(self
                            .error("invalid logger length")
                            .with_context("length", target)
                            .with_source(err));
                    }
                },
                None => Converter::Logger(None),
            },
            "m" | "msg" | "message" => Converter::Message,
            "n" => Converter::Newline,
            word => {
                return Err(self
                    .error("unknown conversion word")
                    .with_context("word", word));
            }
        };
        Ok(Segment::Convert(spec, converter))
    }

    fn parse_number(&mut self) -> Result<Option<usize>, Error> {
        let digits = self.take_while(|c| c.is_ascii_digit());
        if digits.is_empty() {
            return Ok(None);
        }
        digits.parse::<usize>().map(Some).map_err(|err| {
            self.error("invalid width")
                .with_context("width", digits)
                .with_source(err)
        })
    }

    fn parse_option(&mut self) -> Result<Option<&'a str>, Error> {
        let pattern = self.pattern;
        let Some((start, _)) = self.chars.next_if(|(_, c)| *c == '{') else {
            return Ok(None);
        };
        for (end, c) in self.chars.by_ref() {
            if c == '}' {
                return Ok(Some(&pattern[start + 1..end]));
            }
        }
        Err(self.error("unterminated option, expected '}'"))
    }

    fn take_while(&mut self, predicate: impl Fn(char) -> bool) -> &'a str {
        let pattern = self.pattern;
        let start = self.position();
        while self.chars.next_if(|(_, c)| predicate(*c)).is_some() {}
        &pattern[start..self.position()]
    }

    fn position(&mut self) -> usize {
        self.chars
            .peek()
            .map_or(self.pattern.len(), |(index, _)| *index)
    }

    fn error(&self, reason: &str) -> Error {
        Error::new(ErrorKind::InvalidPattern, format!("invalid pattern: {reason}"))
            .with_context("pattern", self.pattern)
    }
}

/// Shorten a dotted logger name to at most `target` characters where possible.
///
/// Leading segments are cut to their first character, left to right, until the name fits. The
/// last segment is never shortened, so the result may still exceed `target`. A target of
/// zero keeps only the last segment.
pub(crate) fn abbreviate(name: &str, target: usize) -> Cow<'_, str> {
    let mut remaining = name.chars().count();
    if remaining <= target {
        return Cow::Borrowed(name);
    }

    let segments = name.split('.').collect::<Vec<_>>();
    let Some((last, leading)) = segments.split_last() else {
        return Cow::Borrowed(name);
    };
    if target == 0 {
        return Cow::Owned((*last).to_owned());
    }

    let mut abbreviated = String::with_capacity(target.max(last.len()));
    for segment in leading {
        let len = segment.chars().count();
        match segment.chars().next() {
            Some(first) if remaining > target && len > 1 => {
                abbreviated.push(first);
                remaining -= len - 1;
            }
            _ => abbreviated.push_str(segment),
        }
        abbreviated.push('.');
    }
    abbreviated.push_str(last);
    Cow::Owned(abbreviated)
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use log::Level;

    use super::*;

    fn event() -> Event {
        Event::builder()
            .timestamp(Timestamp::from_millisecond(1_700_000_000_123).unwrap())
            .level(Level::Warn)
            .logger("net.landzero.xlog.sample.OrderService")
            .thread("main")
            .message("order accepted")
            .diagnostic("cridMark", "CRID[abc]")
            .build()
    }

    fn render(pattern: &str) -> String {
        CompiledPattern::compile(pattern)
            .unwrap()
            .render(&event(), &TimeZone::UTC)
    }

    #[test]
    fn renders_conversions() {
        insta::assert_snapshot!(
            render("[%d{yyyy/MM/dd HH:mm:ss.SSS}] %X{cridMark} [%thread] %-5level %logger{35} - %msg"),
            @"[2023/11/14 22:13:20.123] CRID[abc] [main] WARN  n.landzero.xlog.sample.OrderService - order accepted"
        );
        assert_eq!(render("%d"), "2023-11-14 22:13:20,123");
        assert_eq!(render("%p|%le|%c|%m%n"), "WARN|WARN|net.landzero.xlog.sample.OrderService|order accepted\n");
    }

    #[test]
    fn applies_width_modifiers() {
        assert_eq!(render("[%8t]"), "[    main]");
        assert_eq!(render("[%-8t]"), "[main    ]");
        assert_eq!(render("[%.5msg]"), "[epted]");
        assert_eq!(render("[%-3.3level]"), "[ARN]");
    }

    #[test]
    fn missing_diagnostics_render_empty() {
        assert_eq!(render("<%X{requestId}>"), "<>");
    }

    #[test]
    fn literal_percent() {
        assert_eq!(render("100%% %msg"), "100% order accepted");
    }

    #[test]
    fn rejects_malformed_patterns() {
        for pattern in [
            "%",
            "%-",
            "%5",
            "%bogus",
            "%X",
            "%X{cridMark",
            "%logger{many}",
            "%.msg",
            "%d{yyyy-MMM}",
        ] {
            let err = CompiledPattern::compile(pattern).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidPattern, "{pattern}");
        }
    }

    #[test]
    fn abbreviates_leading_segments() {
        assert_eq!(abbreviate("com.x.Y", 35), "com.x.Y");
        assert_eq!(
            abbreviate("mainPackage.sub.sample.Bar", 20),
            "m.sub.sample.Bar"
        );
        assert_eq!(
            abbreviate("mainPackage.sub.sample.Bar", 16),
            "m.sub.sample.Bar"
        );
        assert_eq!(abbreviate("mainPackage.sub.sample.Bar", 15), "m.s.sample.Bar");
        assert_eq!(abbreviate("mainPackage.sub.sample.Bar", 5), "m.s.s.Bar");
        assert_eq!(abbreviate("mainPackage.sub.sample.Bar", 0), "Bar");
        assert_eq!(abbreviate("AVeryLongLoggerNameWithoutDots", 10), "AVeryLongLoggerNameWithoutDots");
    }
}
