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

use std::cell::RefCell;
use std::collections::BTreeMap;

thread_local! {
    static THREAD_LOCAL_MAP: RefCell<BTreeMap<String, String>> = const { RefCell::new(BTreeMap::new()) };
}

/// A diagnostic that stores key-value pairs in a thread-local map.
///
/// Events capture a snapshot of the map when they are created, so values inserted here show up
/// in `%X{key}` conversions of the layout.
///
/// ## Example
///
/// ```
/// use logforth_xlog::diagnostic::CRID_MARK_KEY;
/// use logforth_xlog::diagnostic::ThreadLocalDiagnostic;
///
/// ThreadLocalDiagnostic::insert(CRID_MARK_KEY, "CRID[7f3a]");
/// assert_eq!(
///     ThreadLocalDiagnostic::get(CRID_MARK_KEY).as_deref(),
///     Some("CRID[7f3a]")
/// );
/// ```
#[derive(Default, Debug, Clone, Copy)]
#[non_exhaustive]
pub struct ThreadLocalDiagnostic {}

impl ThreadLocalDiagnostic {
    /// Insert a key-value pair into the thread local diagnostic.
    pub fn insert<K, V>(key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        THREAD_LOCAL_MAP.with(|map| {
            map.borrow_mut().insert(key.into(), value.into());
        });
    }

    /// Remove a key-value pair from the thread local diagnostic.
    pub fn remove(key: &str) {
        THREAD_LOCAL_MAP.with(|map| {
            map.borrow_mut().remove(key);
        });
    }

    /// Look up the value of a key on the current thread.
    pub fn get(key: &str) -> Option<String> {
        THREAD_LOCAL_MAP.with(|map| map.borrow().get(key).cloned())
    }

    /// Remove every key-value pair of the current thread.
    pub fn clear() {
        THREAD_LOCAL_MAP.with(|map| map.borrow_mut().clear());
    }

    /// Copy the key-value pairs of the current thread.
    pub fn snapshot() -> BTreeMap<String, String> {
        THREAD_LOCAL_MAP.with(|map| map.borrow().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_are_scoped_to_the_thread() {
        ThreadLocalDiagnostic::insert("cridMark", "CRID[main]");

        let other = std::thread::spawn(|| ThreadLocalDiagnostic::get("cridMark"))
            .join()
            .unwrap();
        assert_eq!(other, None);
        assert_eq!(
            ThreadLocalDiagnostic::get("cridMark").as_deref(),
            Some("CRID[main]")
        );

        ThreadLocalDiagnostic::remove("cridMark");
        assert!(ThreadLocalDiagnostic::snapshot().is_empty());
    }

    #[test]
    fn clear_drops_every_key_of_the_thread() {
        ThreadLocalDiagnostic::insert("cridMark", "CRID[clear]");
        ThreadLocalDiagnostic::insert("user", "alice");
        assert_eq!(ThreadLocalDiagnostic::snapshot().len(), 2);

        ThreadLocalDiagnostic::clear();
        assert!(ThreadLocalDiagnostic::snapshot().is_empty());
        assert_eq!(ThreadLocalDiagnostic::get("user"), None);
    }
}
