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

//! Mapped Diagnostic Context (MDC). Correlation markers travel with log events this way.

pub use self::thread_local::ThreadLocalDiagnostic;

mod thread_local;

/// The diagnostic key holding the correlation marker rendered by the plain layout.
pub const CRID_MARK_KEY: &str = "cridMark";
