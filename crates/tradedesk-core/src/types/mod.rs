//! Core data types for the trading desk.

mod account;
mod indicators;
mod order;
mod quote;
mod refresh;
mod signal;
mod symbol;

pub use account::{Account, Holding};
pub use indicators::IndicatorSet;
pub use order::{Fill, Order, OrderStatus, OrderTicket, OrderType, Side, TimeInForce};
pub use quote::Quote;
pub use refresh::{CycleId, FetchOutcome, RefreshResult};
pub use signal::Signal;
pub use symbol::{normalize_watchlist, Symbol};
