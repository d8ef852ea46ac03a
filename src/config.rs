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

//! Per-appender configuration: output mode and the project, topic and environment an
//! appender writes for.

use std::fmt;

use crate::sink::Route;

/// The topic every json mode appender reports, regardless of the configured topic.
pub const TOPIC_JSON: &str = "_json_";

/// The textual name of [`Mode::Plain`].
pub const MODE_PLAIN: &str = "plain";

/// The textual name of [`Mode::Json`].
pub const MODE_JSON: &str = "json";

/// The pattern rendered in [`Mode::Plain`].
pub const PLAIN_PATTERN: &str =
    "[%d{yyyy/MM/dd HH:mm:ss.SSS}] %X{cridMark} [%thread] %-5level %logger{35} - %msg%n";

/// The pattern rendered in [`Mode::Json`]. The message is expected to be a JSON payload
/// already.
pub const JSON_PATTERN: &str = "[%d{yyyy/MM/dd HH:mm:ss.SSS}] %msg%n";

/// The output mode of an appender.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "String"))]
pub enum Mode {
    /// Human readable lines.
    #[default]
    Plain,
    /// Lines carrying a JSON message, all routed to [`TOPIC_JSON`].
    Json,
}

impl Mode {
    /// Parse a mode name.
    ///
    /// The name is trimmed and compared case-insensitively with [`MODE_JSON`]; anything else,
    /// including an absent name, is [`Mode::Plain`].
    pub fn parse(name: Option<&str>) -> Mode {
        match name {
            Some(name) if name.trim().eq_ignore_ascii_case(MODE_JSON) => Mode::Json,
            _ => Mode::Plain,
        }
    }

    /// Whether this is [`Mode::Json`].
    pub fn is_json(&self) -> bool {
        matches!(self, Mode::Json)
    }

    /// The layout pattern rendered in this mode.
    pub fn pattern(&self) -> &'static str {
        match self {
            Mode::Plain => PLAIN_PATTERN,
            Mode::Json => JSON_PATTERN,
        }
    }

    /// The textual name of this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Plain => MODE_PLAIN,
            Mode::Json => MODE_JSON,
        }
    }
}

impl From<&str> for Mode {
    fn from(name: &str) -> Self {
        Mode::parse(Some(name))
    }
}

impl From<String> for Mode {
    fn from(name: String) -> Self {
        Mode::parse(Some(&name))
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trim a value and turn a blank result into `None`.
pub fn normalize(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

/// The configuration of one appender.
///
/// String setters normalize their input with [`normalize`]. Changes take effect the next time
/// the renderer is (re)initialized, except for the topic which is always read through
/// [`effective_topic`](Self::effective_topic).
///
/// With the `serde` feature, the config deserializes from any serde format:
///
/// ```json
/// {
///     "mode": "json",
///     "project": "svc",
///     "topic": "app",
///     "env": "prod",
///     "filters": ["warn+", "-error"]
/// }
/// ```
///
/// `filters` lists shorthand filter tokens (see [`compile`](crate::filter::compile)). They
/// are attached in order when the config is handed to
/// [`XLogAppenderBuilder::config`](crate::append::XLogAppenderBuilder::config).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct AppenderConfig {
    mode: Mode,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "deserialize_normalized"))]
    project: Option<String>,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "deserialize_normalized"))]
    topic: Option<String>,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "deserialize_normalized"))]
    env: Option<String>,
    filters: Vec<String>,
}

impl AppenderConfig {
    /// The output mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Set the output mode.
    pub fn set_mode(&mut self, mode: impl Into<Mode>) {
        self.mode = mode.into();
    }

    /// Whether the output mode is json.
    pub fn is_json_mode(&self) -> bool {
        self.mode.is_json()
    }

    /// The project name.
    pub fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }

    /// Set the project name.
    pub fn set_project(&mut self, project: Option<&str>) {
        self.project = normalize(project);
    }

    /// The configured topic, ignoring the mode.
    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    /// Set the topic.
    pub fn set_topic(&mut self, topic: Option<&str>) {
        self.topic = normalize(topic);
    }

    /// The topic output is routed to: [`TOPIC_JSON`] in json mode, the configured topic
    /// otherwise.
    pub fn effective_topic(&self) -> Option<&str> {
        if self.is_json_mode() {
            Some(TOPIC_JSON)
        } else {
            self.topic()
        }
    }

    /// The environment name.
    pub fn env(&self) -> Option<&str> {
        self.env.as_deref()
    }

    /// Set the environment name.
    pub fn set_env(&mut self, env: Option<&str>) {
        self.env = normalize(env);
    }

    /// The shorthand filter tokens, in attachment order.
    pub fn filters(&self) -> &[String] {
        &self.filters
    }

    /// Append a shorthand filter token.
    pub fn add_filter(&mut self, token: &str) {
        self.filters.push(token.to_owned());
    }

    /// The layout pattern selected by the mode.
    pub fn pattern(&self) -> &'static str {
        self.mode.pattern()
    }

    /// Where rendered lines of this appender go.
    pub fn route(&self) -> Route<'_> {
        Route {
            project: self.project(),
            topic: self.effective_topic(),
            env: self.env(),
        }
    }
}

#[cfg(feature = "serde")]
fn deserialize_normalized<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = <Option<String> as serde::Deserialize>::deserialize(deserializer)?;
    Ok(normalize(value.as_deref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_parsing_is_lenient() {
        assert_eq!(Mode::parse(Some("json")), Mode::Json);
        assert_eq!(Mode::parse(Some("  JSON ")), Mode::Json);
        assert_eq!(Mode::parse(Some("Json")), Mode::Json);
        assert_eq!(Mode::parse(Some("plain")), Mode::Plain);
        assert_eq!(Mode::parse(Some("yaml")), Mode::Plain);
        assert_eq!(Mode::parse(None), Mode::Plain);
        assert_eq!(Mode::default(), Mode::Plain);
    }

    #[test]
    fn setters_normalize() {
        let mut config = AppenderConfig::default();
        config.set_project(Some("  svc "));
        config.set_topic(Some("   "));
        config.set_env(None);
        assert_eq!(config.project(), Some("svc"));
        assert_eq!(config.topic(), None);
        assert_eq!(config.env(), None);

        config.add_filter("warn+");
        config.add_filter("-error");
        assert_eq!(config.filters(), ["warn+", "-error"]);
    }

    #[test]
    fn effective_topic_follows_mode() {
        let mut config = AppenderConfig::default();
        config.set_topic(Some("app"));
        assert_eq!(config.effective_topic(), Some("app"));
        assert_eq!(config.pattern(), PLAIN_PATTERN);

        config.set_mode(Mode::Json);
        assert_eq!(config.effective_topic(), Some(TOPIC_JSON));
        assert_eq!(config.topic(), Some("app"));
        assert_eq!(config.pattern(), JSON_PATTERN);

        config.set_mode("plain");
        assert_eq!(config.effective_topic(), Some("app"));

        config.set_topic(None);
        config.set_mode("json");
        assert_eq!(config.effective_topic(), Some(TOPIC_JSON));
    }

    #[test]
    fn route_uses_effective_topic() {
        let mut config = AppenderConfig::default();
        config.set_project(Some("svc"));
        config.set_topic(Some("app"));
        config.set_env(Some("prod"));
        config.set_mode(Mode::Json);
        assert_eq!(
            config.route(),
            Route {
                project: Some("svc"),
                topic: Some(TOPIC_JSON),
                env: Some("prod"),
            }
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialize_from_json() {
        let config: AppenderConfig = serde_json::from_str(
            r#"{ "mode": " JSON ", "project": " svc ", "topic": "", "env": "prod" }"#,
        )
        .unwrap();
        assert_eq!(config.mode(), Mode::Json);
        assert_eq!(config.project(), Some("svc"));
        assert_eq!(config.topic(), None);
        assert_eq!(config.env(), Some("prod"));

        let config: AppenderConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, AppenderConfig::default());
        assert!(config.filters().is_empty());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialize_filter_tokens() {
        let config: AppenderConfig =
            serde_json::from_str(r#"{ "mode": "json", "filters": ["warn+", "-error"] }"#)
                .unwrap();
        assert_eq!(config.mode(), Mode::Json);
        assert_eq!(config.filters(), ["warn+", "-error"]);

        let err = serde_json::from_str::<AppenderConfig>(r#"{ "level": "info" }"#).unwrap_err();
        assert!(err.to_string().contains("unknown field `level`"), "{err}");
    }
}
