use std::{
    future::Future,
    sync::RwLock,
};

use chrono::{DateTime, Duration, Utc};
use log::*;
use tokio::sync::Mutex;

use crate::{data_objects::AccessToken, error::PayPalApiError};

/// Fraction of the advertised token lifetime we are willing to serve a cached token for. Serving right up to the
/// advertised expiry risks handing out a token that dies mid-flight.
const TTL_NUMERATOR: i64 = 8;
const TTL_DENOMINATOR: i64 = 10;

struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        Utc::now() < self.expires_at
    }
}

/// Process-scoped cache for the gateway bearer credential.
///
/// All concurrent verification and intent calls share one instance. Refreshes are single-flight: the first caller
/// to find the cache stale performs the exchange while holding the refresh lock, and callers that were queued
/// behind it pick up the cached result instead of issuing their own exchange.
#[derive(Default)]
pub struct CredentialCache {
    token: RwLock<Option<CachedToken>>,
    refresh_lock: Mutex<()>,
}

impl CredentialCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached token if it is still fresh, otherwise runs `exchange` to obtain a new one and caches the
    /// result for 80% of its advertised lifetime. A failed exchange caches nothing.
    pub async fn get_or_refresh<F, Fut>(&self, exchange: F) -> Result<String, PayPalApiError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<AccessToken, PayPalApiError>>,
    {
        if let Some(token) = self.cached() {
            return Ok(token);
        }
        let _guard = self.refresh_lock.lock().await;
        // Another task may have completed the exchange while we waited for the lock.
        if let Some(token) = self.cached() {
            return Ok(token);
        }
        let fresh = exchange().await?;
        let ttl = cache_ttl(fresh.expires_in);
        debug!("🔑️ New gateway credential obtained. Caching it for {}s", ttl.num_seconds());
        let cached = CachedToken { value: fresh.access_token.clone(), expires_at: Utc::now() + ttl };
        match self.token.write() {
            Ok(mut lock) => *lock = Some(cached),
            Err(e) => warn!("🔑️ Credential cache lock is poisoned, not caching. {e}"),
        }
        Ok(fresh.access_token)
    }

    /// Evicts the cached credential immediately. The next caller pays for a fresh exchange.
    pub fn invalidate(&self) {
        if let Ok(mut lock) = self.token.write() {
            *lock = None;
        }
        debug!("🔑️ Gateway credential evicted from the cache");
    }

    fn cached(&self) -> Option<String> {
        self.token
            .read()
            .ok()
            .and_then(|lock| lock.as_ref().filter(|t| t.is_fresh()).map(|t| t.value.clone()))
    }
}

fn cache_ttl(expires_in: i64) -> Duration {
    Duration::seconds(expires_in.max(0) * TTL_NUMERATOR / TTL_DENOMINATOR)
}
