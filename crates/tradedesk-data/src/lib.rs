//! Quote refresh orchestration and quote fetchers.
//!
//! [`RefreshOrchestrator`] fans a watchlist out to a [`QuoteFetcher`] with
//! bounded concurrency and publishes one [`RefreshResult`] per cycle. The
//! fetcher adapters in this crate add timeouts, TTL caching and an in-memory
//! CSV snapshot source.
//!
//! [`QuoteFetcher`]: tradedesk_core::traits::QuoteFetcher
//! [`RefreshResult`]: tradedesk_core::types::RefreshResult

mod auto_refresh;
mod cache;
mod csv_source;
mod orchestrator;
mod timeout;

pub use auto_refresh::AutoRefresh;
pub use cache::CachedFetcher;
pub use csv_source::CsvSnapshotFetcher;
pub use orchestrator::{
    RefreshEvent, RefreshHandle, RefreshOrchestrator, RefreshOutcome, DEFAULT_CONCURRENCY,
};
pub use timeout::TimeoutFetcher;
