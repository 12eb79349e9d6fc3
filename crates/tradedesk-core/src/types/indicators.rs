//! Indicator snapshots.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Latest indicator values for one symbol.
///
/// A name that is missing, or whose value is not finite, reads as absent:
/// the indicator could not be computed yet (for example, not enough history).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndicatorSet {
    values: BTreeMap<String, f64>,
}

impl IndicatorSet {
    /// 14-period relative strength index.
    pub const RSI14: &'static str = "rsi14";
    /// MACD line.
    pub const MACD: &'static str = "macd";
    /// MACD signal line.
    pub const MACD_SIGNAL: &'static str = "macdSignal";
    /// 20-period simple moving average.
    pub const SMA20: &'static str = "sma20";
    /// 50-period simple moving average.
    pub const SMA50: &'static str = "sma50";
    /// Latest close used as price context.
    pub const PRICE: &'static str = "price";

    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a value.
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    /// Add a value only if it is present.
    pub fn with_optional(self, name: impl Into<String>, value: Option<f64>) -> Self {
        match value {
            Some(value) => self.with(name, value),
            None => self,
        }
    }

    /// Get a value, treating non-finite values as absent.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied().filter(|v| v.is_finite())
    }

    pub fn rsi14(&self) -> Option<f64> {
        self.get(Self::RSI14)
    }

    pub fn macd(&self) -> Option<f64> {
        self.get(Self::MACD)
    }

    pub fn macd_signal(&self) -> Option<f64> {
        self.get(Self::MACD_SIGNAL)
    }

    pub fn sma20(&self) -> Option<f64> {
        self.get(Self::SMA20)
    }

    pub fn price(&self) -> Option<f64> {
        self.get(Self::PRICE)
    }

    /// Copy of this set with `price` filled in from a quote when the set
    /// does not carry a usable price of its own.
    pub fn with_price_context(&self, price: f64) -> Self {
        if self.price().is_some() {
            self.clone()
        } else {
            self.clone().with(Self::PRICE, price)
        }
    }

    /// Number of present (finite) values.
    pub fn len(&self) -> usize {
        self.values.values().filter(|v| v.is_finite()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Present values in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values
            .iter()
            .filter(|(_, v)| v.is_finite())
            .map(|(k, v)| (k.as_str(), *v))
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for IndicatorSet {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
