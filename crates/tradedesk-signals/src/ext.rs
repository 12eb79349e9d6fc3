//! On-demand signals for fetch outcomes and refresh results.

use tradedesk_core::types::{FetchOutcome, RefreshResult, Signal, Symbol};

use crate::engine::classify;

/// Derive signals from fetched data without storing them.
pub trait SignalExt {
    /// Signal for one symbol, `None` if it failed or was not requested.
    fn signal(&self, symbol: &str) -> Option<Signal>;

    /// Signals for every successful symbol, in request order.
    fn signals(&self) -> Vec<(&Symbol, Signal)>;
}

impl SignalExt for RefreshResult {
    fn signal(&self, symbol: &str) -> Option<Signal> {
        self.get(symbol)
            .and_then(FetchOutcome::classification_input)
            .map(|indicators| classify(&indicators))
    }

    fn signals(&self) -> Vec<(&Symbol, Signal)> {
        self.iter()
            .filter_map(|(symbol, outcome)| {
                outcome
                    .classification_input()
                    .map(|indicators| (symbol, classify(&indicators)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;
    use tradedesk_core::types::{CycleId, IndicatorSet, Quote};

    #[test]
    fn test_signals_use_quote_price_as_context() {
        let aapl = Symbol::parse("AAPL").unwrap();
        let tsla = Symbol::parse("TSLA").unwrap();

        // No price indicator: the trend voter reads the quote price
        let indicators = IndicatorSet::new()
            .with(IndicatorSet::RSI14, 25.0)
            .with(IndicatorSet::SMA20, 100.0);
        let mut resolved = HashMap::new();
        resolved.insert(
            aapl.clone(),
            FetchOutcome::success(Quote::new(aapl.clone(), 110.0, Utc::now()), indicators),
        );
        resolved.insert(tsla.clone(), FetchOutcome::failure("timeout"));

        let result = RefreshResult::new(CycleId(1), vec![aapl.clone(), tsla], resolved);

        assert_eq!(result.signal("AAPL"), Some(Signal::Buy));
        assert_eq!(result.signal("TSLA"), None);
        assert_eq!(result.signal("MSFT"), None);
        assert_eq!(result.signals(), vec![(&aapl, Signal::Buy)]);
    }
}
