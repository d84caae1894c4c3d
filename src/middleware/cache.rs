//! Response caching stage with per-entry TTL.
//!
//! Successful responses are captured under a key derived from the request
//! method, path, and query string, and replayed for identical requests until
//! the entry expires. Expiry is checked on lookup; there is no other
//! eviction, so the store is unbounded in entry count.

use std::collections::HashMap;
use std::time::Duration;
use std::{future::Future, pin::Pin, sync::Arc};

use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

use crate::context::Context;
use crate::error::HandlerResult;
use crate::http::{Headers, Response, StatusCode};
use crate::middleware::{Middleware, Next};

/// Entry lifetime used when the store is built without an explicit TTL.
pub const DEFAULT_TTL: Duration = Duration::from_secs(30);

// A captured successful response plus the instant it was stored.
#[derive(Debug, Clone)]
struct CacheEntry {
    status: StatusCode,
    headers: Headers,
    body: Vec<u8>,
    stored_at: Instant,
}

impl CacheEntry {
    fn capture(response: &Response) -> Self {
        Self {
            status: response.status(),
            headers: response.headers().clone(),
            body: response.payload().to_vec(),
            stored_at: Instant::now(),
        }
    }

    // Expired once the full TTL has elapsed, boundary inclusive.
    fn is_expired(&self, ttl: Duration) -> bool {
        self.stored_at.elapsed() >= ttl
    }

    fn replay(&self) -> Response {
        Response::from_parts(self.status, self.headers.clone(), self.body.clone())
    }
}

/// Shared response cache keyed by method + path + query string.
///
/// One store instance is constructed at startup and shared by every
/// [`ResponseCache`] stage attached to a route. Concurrent readers and
/// writers are safe; entries for the same key resolve last-write-wins.
pub struct CacheStore {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl CacheStore {
    /// Creates a store whose entries live for `ttl` after being stored.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a store with the default 30-second TTL.
    pub fn with_default_ttl() -> Self {
        Self::new(DEFAULT_TTL)
    }

    /// Returns the configured entry lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the number of entries currently held, expired or not.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    // Returns a replay of the live entry for `key`, removing it instead if
    // it has expired.
    pub(crate) async fn lookup(&self, key: &str) -> Option<Response> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if !entry.is_expired(self.ttl) => return Some(entry.replay()),
                Some(_) => {} // expired; fall through to remove under the write lock
                None => return None,
            }
        }

        let mut entries = self.entries.write().await;
        // Re-check: another task may have refreshed the entry between locks.
        match entries.get(key) {
            Some(entry) if entry.is_expired(self.ttl) => {
                entries.remove(key);
                None
            }
            Some(entry) => Some(entry.replay()),
            None => None,
        }
    }

    pub(crate) async fn store(&self, key: String, response: &Response) {
        self.entries
            .write()
            .await
            .insert(key, CacheEntry::capture(response));
    }
}

/// Pipeline stage that serves cached responses and captures fresh ones.
///
/// On a live hit the downstream chain is not invoked at all. On a miss the
/// downstream outcome is stored only when it is a successful (2xx) response;
/// errors and client/server failures are never cached.
pub struct ResponseCache {
    store: Arc<CacheStore>,
}

impl ResponseCache {
    pub fn new(store: Arc<CacheStore>) -> Self {
        Self { store }
    }

    fn cache_key(ctx: &Context) -> String {
        let request = ctx.request();
        match request.query_string() {
            Some(query) => format!("{}:{}?{}", request.method(), request.path(), query),
            None => format!("{}:{}", request.method(), request.path()),
        }
    }
}

impl Middleware for ResponseCache {
    fn handle(
        &self,
        ctx: Context,
        next: Next,
    ) -> Pin<Box<dyn Future<Output = HandlerResult> + Send>> {
        let store = Arc::clone(&self.store);
        Box::pin(async move {
            let key = Self::cache_key(&ctx);

            if let Some(hit) = store.lookup(&key).await {
                debug!(%key, "cache hit");
                return Ok(hit);
            }

            let outcome = next.run(ctx).await;

            if let Ok(response) = &outcome {
                if response.status().is_success() {
                    debug!(%key, "caching response");
                    store.store(key, response).await;
                }
            }

            outcome
        })
    }
}
