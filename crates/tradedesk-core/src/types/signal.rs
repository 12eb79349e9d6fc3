//! Composite trading signals.

use serde::{Deserialize, Serialize};

/// Buy/sell/hold classification of one symbol.
///
/// Always derived from an indicator snapshot on demand, never stored apart
/// from the snapshot that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl Signal {
    /// Check if this signal calls for a trade.
    pub fn is_actionable(&self) -> bool {
        !matches!(self, Signal::Hold)
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Signal::Buy => write!(f, "BUY"),
            Signal::Sell => write!(f, "SELL"),
            Signal::Hold => write!(f, "HOLD"),
        }
    }
}
