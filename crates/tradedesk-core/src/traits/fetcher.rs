//! Quote fetcher trait definition.

use async_trait::async_trait;
use std::sync::Arc;

use crate::types::{FetchOutcome, Symbol};

/// Source of quotes and indicator snapshots, one call per symbol.
///
/// Implementations must not let errors escape: transport errors, timeouts
/// and bad payloads are all reported as [`FetchOutcome::Failure`].
#[async_trait]
pub trait QuoteFetcher: Send + Sync {
    /// Fetch the latest quote and indicators for a symbol.
    async fn fetch(&self, symbol: &Symbol) -> FetchOutcome;

    /// Get the fetcher name.
    fn name(&self) -> &str;
}

#[async_trait]
impl<F: QuoteFetcher + ?Sized> QuoteFetcher for Arc<F> {
    async fn fetch(&self, symbol: &Symbol) -> FetchOutcome {
        (**self).fetch(symbol).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

