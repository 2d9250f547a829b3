use std::time::Duration;

use log::*;
use moka::sync::Cache;
use regex::Regex;
use serde_json::Value;

use crate::traits::{CacheError, ObjectCache};

const DEFAULT_MAX_ENTRIES: u64 = 10_000;

/// An in-process cache over [`moka`]. Entries share one TTL, fixed at construction; pattern invalidation
/// walks the live entries and evicts the ones whose key matches the glob.
#[derive(Clone)]
pub struct MemoryCache {
    entries: Cache<String, Value>,
}

impl MemoryCache {
    pub fn new(ttl: Duration) -> Self {
        let entries = Cache::builder().max_capacity(DEFAULT_MAX_ENTRIES).time_to_live(ttl).build();
        Self { entries }
    }
}

impl ObjectCache for MemoryCache {
    async fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key)
    }

    async fn put(&self, key: &str, value: Value) {
        self.entries.insert(key.to_string(), value);
    }

    async fn delete(&self, key: &str) {
        self.entries.invalidate(key);
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<usize, CacheError> {
        let matcher = glob_to_regex(pattern)?;
        let doomed = self
            .entries
            .iter()
            .filter(|(key, _)| matcher.is_match(key))
            .map(|(key, _)| key.as_ref().clone())
            .collect::<Vec<_>>();
        let count = doomed.len();
        for key in doomed {
            self.entries.invalidate(&key);
        }
        trace!("🧹️ Invalidated {count} cache entries matching '{pattern}'");
        Ok(count)
    }
}

/// Compiles a glob-style pattern (`*` is the only wildcard) into an anchored regex, so that a pattern can
/// never partially match a longer, unrelated key.
fn glob_to_regex(pattern: &str) -> Result<Regex, CacheError> {
    let escaped = regex::escape(pattern).replace(r"\*", ".*");
    Regex::new(&format!("^{escaped}$")).map_err(|_| CacheError::InvalidPattern(pattern.to_string()))
}
