//! Order entry.
//!
//! Only paper trading is provided: orders are recorded against an in-memory
//! account and filled when the caller supplies a market price.

mod paper;

pub use paper::PaperBroker;
