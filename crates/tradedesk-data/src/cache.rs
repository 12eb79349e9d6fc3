//! Quote caching.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use tradedesk_core::traits::QuoteFetcher;
use tradedesk_core::types::{FetchOutcome, Symbol};
use tracing::trace;

struct CacheEntry {
    outcome: FetchOutcome,
    stored_at: Instant,
}

/// In-memory cache of successful fetches.
///
/// Failures are never cached, so a symbol that failed is fetched again on
/// the next cycle. A zero TTL disables caching altogether.
pub struct CachedFetcher<F> {
    inner: F,
    ttl: Duration,
    entries: Mutex<HashMap<Symbol, CacheEntry>>,
}

impl<F> CachedFetcher<F> {
    /// Create a cache in front of `inner`.
    pub fn new(inner: F, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Drop the cached entry for a symbol.
    pub fn invalidate(&self, symbol: &str) -> bool {
        self.entries().remove(symbol).is_some()
    }

    /// Drop all cached entries.
    pub fn clear(&self) {
        self.entries().clear();
    }

    /// Number of cached entries. Expired entries linger until the next
    /// lookup of their symbol or the next insert.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<Symbol, CacheEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn lookup(&self, symbol: &Symbol) -> Option<FetchOutcome> {
        let mut entries = self.entries();
        let entry = entries.get(symbol)?;
        if entry.stored_at.elapsed() < self.ttl {
            return Some(entry.outcome.clone());
        }
        entries.remove(symbol);
        None
    }
}

#[async_trait]
impl<F: QuoteFetcher> QuoteFetcher for CachedFetcher<F> {
    async fn fetch(&self, symbol: &Symbol) -> FetchOutcome {
        if self.ttl.is_zero() {
            return self.inner.fetch(symbol).await;
        }

        if let Some(outcome) = self.lookup(symbol) {
            trace!(%symbol, "cache hit");
            return outcome;
        }

        let outcome = self.inner.fetch(symbol).await;
        if outcome.is_success() {
            let ttl = self.ttl;
            let mut entries = self.entries();
            // Symbols dropped from the watchlist are never looked up again
            entries.retain(|_, entry| entry.stored_at.elapsed() < ttl);
            entries.insert(
                symbol.clone(),
                CacheEntry {
                    outcome: outcome.clone(),
                    stored_at: Instant::now(),
                },
            );
        }
        outcome
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
