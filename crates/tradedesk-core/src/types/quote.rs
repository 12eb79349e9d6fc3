//! Quote snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Symbol;

/// The latest quote for one symbol, as produced by a quote fetcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Symbol
    pub symbol: Symbol,
    /// Last traded price
    pub price: f64,
    /// Absolute change since the previous close
    pub change_abs: f64,
    /// Change since the previous close, in percent
    pub change_percent: f64,
    /// Session volume
    pub volume: u64,
    /// Session high
    pub high: f64,
    /// Session low
    pub low: f64,
    /// When the quote was fetched
    pub fetched_at: DateTime<Utc>,
}

impl Quote {
    /// Create a quote with only a price; the session fields start at the price.
    pub fn new(symbol: Symbol, price: f64, fetched_at: DateTime<Utc>) -> Self {
        Self {
            symbol,
            price,
            change_abs: 0.0,
            change_percent: 0.0,
            volume: 0,
            high: price,
            low: price,
            fetched_at,
        }
    }

    /// Set the change since the previous close.
    pub fn with_change(mut self, change_abs: f64, change_percent: f64) -> Self {
        self.change_abs = change_abs;
        self.change_percent = change_percent;
        self
    }

    /// Set the session volume.
    pub fn with_volume(mut self, volume: u64) -> Self {
        self.volume = volume;
        self
    }

    /// Set the session range.
    pub fn with_range(mut self, high: f64, low: f64) -> Self {
        self.high = high;
        self.low = low;
        self
    }

    /// A usable quote has a finite, strictly positive price.
    pub fn has_valid_price(&self) -> bool {
        self.price.is_finite() && self.price > 0.0
    }

    /// Previous close implied by the price and absolute change.
    pub fn previous_close(&self) -> f64 {
        self.price - self.change_abs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_builders() {
        let quote = Quote::new(Symbol::parse("AAPL").unwrap(), 150.0, Utc::now())
            .with_change(2.5, 1.69)
            .with_volume(1_000_000)
            .with_range(151.0, 147.5);

        assert!(quote.has_valid_price());
        assert!((quote.previous_close() - 147.5).abs() < 1e-9);
        assert_eq!(quote.volume, 1_000_000);
        assert_eq!(quote.high, 151.0);
    }

    #[test]
    fn test_invalid_prices() {
        let symbol = Symbol::parse("AAPL").unwrap();
        assert!(!Quote::new(symbol.clone(), 0.0, Utc::now()).has_valid_price());
        assert!(!Quote::new(symbol.clone(), -3.0, Utc::now()).has_valid_price());
        assert!(!Quote::new(symbol, f64::NAN, Utc::now()).has_valid_price());
    }
}
