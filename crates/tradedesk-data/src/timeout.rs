//! Per-fetch deadline.

use async_trait::async_trait;
use std::time::Duration;
use tradedesk_core::traits::QuoteFetcher;
use tradedesk_core::types::{FetchOutcome, Symbol};

/// Wraps a fetcher so that no single fetch can stall a refresh cycle.
pub struct TimeoutFetcher<F> {
    inner: F,
    timeout: Duration,
}

impl<F> TimeoutFetcher<F> {
    pub fn new(inner: F, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }
}

#[async_trait]
impl<F: QuoteFetcher> QuoteFetcher for TimeoutFetcher<F> {
    async fn fetch(&self, symbol: &Symbol) -> FetchOutcome {
        match tokio::time::timeout(self.timeout, self.inner.fetch(symbol)).await {
            Ok(outcome) => outcome,
            Err(_) => FetchOutcome::failure(format!(
                "timed out after {}ms",
                self.timeout.as_millis()
            )),
        }
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
