//! Core traits for the trading desk.

mod broker;
mod fetcher;

pub use broker::Broker;
pub use fetcher::QuoteFetcher;
