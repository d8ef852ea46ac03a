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

//! An appender core for xlog-style output: events are rendered in a human readable "plain" or a
//! json-carrying layout, tagged with project, topic and environment, filtered with a compact
//! shorthand syntax, and handed to a pluggable [`Sink`].
//!
//! # Overview
//!
//! An [`XLogAppender`] owns its configuration, a filter chain and a renderer with an explicit
//! start/stop lifecycle. Sinks decide where rendered lines go; [`sink::Stdout`],
//! [`sink::Stderr`] and [`sink::Testing`] are built in.
//!
//! Filters can be attached in shorthand syntax:
//!
//! - `info` accepts exactly INFO and denies everything else;
//! - `-info` denies exactly INFO and accepts everything else;
//! - `info+` lets INFO and more severe levels through.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use logforth_xlog::XLogAppender;
//! use logforth_xlog::sink::Stdout;
//!
//! let appender = Arc::new(
//!     XLogAppender::builder(Stdout::default())
//!         .project("svc")
//!         .topic("app")
//!         .env("prod")
//!         .easy_filter("info+")
//!         .build(),
//! );
//! appender.start();
//! logforth_xlog::bridge::log::apply(appender.clone());
//!
//! log::info!("This is an info message.");
//! log::debug!("This one is filtered out.");
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![deny(missing_docs)]

pub mod append;
pub mod bridge;
pub mod config;
pub mod diagnostic;
pub mod filter;
pub mod layout;
pub mod sink;
pub mod trap;

mod context;
mod error;
mod event;

pub use self::append::XLogAppender;
pub use self::config::AppenderConfig;
pub use self::config::Mode;
pub use self::context::Context;
pub use self::error::Error;
pub use self::error::ErrorKind;
pub use self::event::Event;
pub use self::event::EventBuilder;
pub use self::filter::Filter;
pub use self::filter::FilterResult;
pub use self::sink::Sink;
pub use self::trap::Trap;
