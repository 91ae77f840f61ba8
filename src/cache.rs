//! Key-addressed query cache.
//!
//! DESIGN
//! ======
//! Keys are ordered path segments so whole families can be invalidated by
//! prefix (`["missions"]` drops every mission list, feed and history entry).
//! Values are stored as JSON; typed access goes through serde. The cache is
//! not synchronized itself: owners wrap it in the lock that matches their
//! consistency needs.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

// =============================================================================
// QUERY KEY
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }

    #[must_use]
    pub fn me() -> Self {
        Self::new(["auth", "me"])
    }

    #[must_use]
    pub fn profile() -> Self {
        Self::new(["auth", "profile"])
    }

    #[must_use]
    pub fn missions_root() -> Self {
        Self::new(["missions"])
    }

    #[must_use]
    pub fn missions(tag: Option<&str>) -> Self {
        Self::new(["missions", "list", tag.unwrap_or("*")])
    }

    #[must_use]
    pub fn feed() -> Self {
        Self::new(["missions", "feed"])
    }

    #[must_use]
    pub fn history(history_id: i64) -> Self {
        Self::new(["missions".to_owned(), "history".to_owned(), history_id.to_string()])
    }

    #[must_use]
    pub fn my_histories() -> Self {
        Self::new(["missions", "mine"])
    }

    #[must_use]
    pub fn badges_root() -> Self {
        Self::new(["badges"])
    }

    #[must_use]
    pub fn all_badges() -> Self {
        Self::new(["badges", "all"])
    }

    #[must_use]
    pub fn user_badges(user_id: i64) -> Self {
        Self::new(["badges".to_owned(), "user".to_owned(), user_id.to_string()])
    }

    #[must_use]
    pub fn xy_to_address(x: f64, y: f64) -> Self {
        Self::new(["kakaoMap".to_owned(), "xyToAddress".to_owned(), x.to_string(), y.to_string()])
    }
}

// =============================================================================
// CACHE
// =============================================================================

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    stored_at: Instant,
}

#[derive(Debug, Default)]
pub struct QueryCache {
    entries: HashMap<QueryKey, Entry>,
}

impl QueryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, key: &QueryKey) -> Option<&Value> {
        self.entries.get(key).map(|entry| &entry.value)
    }

    /// Entry younger than `max_age` at `now`.
    #[must_use]
    pub fn get_fresh(&self, key: &QueryKey, max_age: Duration, now: Instant) -> Option<&Value> {
        let entry = self.entries.get(key)?;
        (now.saturating_duration_since(entry.stored_at) < max_age).then_some(&entry.value)
    }

    #[must_use]
    pub fn get_as<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let value = self.get(key)?;
        match serde_json::from_value(value.clone()) {
            Ok(typed) => Some(typed),
            Err(e) => {
                tracing::debug!(key = ?key.segments(), error = %e, "cached value has unexpected shape");
                None
            }
        }
    }

    #[must_use]
    pub fn contains(&self, key: &QueryKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn set(&mut self, key: QueryKey, value: Value) {
        self.set_at(key, value, Instant::now());
    }

    pub fn set_at(&mut self, key: QueryKey, value: Value, stored_at: Instant) {
        self.entries.insert(key, Entry { value, stored_at });
    }

    /// Store a typed value. Values that fail to serialize are skipped.
    pub fn set_as<T: Serialize>(&mut self, key: QueryKey, value: &T) {
        match serde_json::to_value(value) {
            Ok(json) => self.set(key, json),
            Err(e) => tracing::debug!(key = ?key.segments(), error = %e, "value not cacheable"),
        }
    }

    pub fn invalidate(&mut self, key: &QueryKey) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Drop every entry under `prefix`, returning how many were removed.
    pub fn invalidate_prefix(&mut self, prefix: &QueryKey) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.starts_with(prefix));
        before - self.entries.len()
    }

    /// Drop everything but `keep`, returning how many were removed.
    pub fn invalidate_all_except(&mut self, keep: &QueryKey) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| key == keep);
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "cache_test.rs"]
mod tests;
