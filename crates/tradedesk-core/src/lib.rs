//! Core data contracts and traits for the trading desk.
//!
//! This crate provides the foundational building blocks including:
//! - Watchlist symbols, quotes and indicator snapshots
//! - Per-symbol fetch outcomes and the aggregate refresh result
//! - Composite signals
//! - Paper order and account types
//! - Traits for quote fetchers and brokers

pub mod error;
pub mod traits;
pub mod types;

pub use error::{BrokerError, DataError, DeskError, DeskResult, RefreshError, ValidationError};
pub use traits::*;
pub use types::*;
