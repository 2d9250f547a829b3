use serde_json::Value;
use thiserror::Error;

/// A non-authoritative key/value cache in front of the store. Entries are always safe to evict; correctness
/// only requires that mutations are followed by pattern invalidation of the affected namespaces.
///
/// Key namespaces in use: `orders:user:*` and `orders:oneuser:<userId>`. Prefix discipline is load-bearing;
/// patterns must never partially match a foreign namespace.
#[allow(async_fn_in_trait)]
pub trait ObjectCache {
    async fn get(&self, key: &str) -> Option<Value>;

    async fn put(&self, key: &str, value: Value);

    async fn delete(&self, key: &str);

    /// Deletes every entry whose key matches the glob-style pattern (`*` is the only wildcard). Returns the
    /// number of entries evicted.
    async fn delete_pattern(&self, pattern: &str) -> Result<usize, CacheError>;
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Invalid cache key pattern '{0}'")]
    InvalidPattern(String),
}
