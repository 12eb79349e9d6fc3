//! Property tests for the composite signal.
//!
//! Uses proptest to verify:
//! 1. Determinism: the same snapshot always classifies the same way
//! 2. Symmetry: mirroring every input mirrors the signal
//! 3. A lone neutral RSI never produces a trade

use proptest::prelude::*;
use tradedesk_core::types::{IndicatorSet, Signal};
use tradedesk_signals::{classify, explain};

fn arb_optional(range: std::ops::Range<f64>) -> impl Strategy<Value = Option<f64>> {
    prop::option::of(range)
}

fn arb_indicators() -> impl Strategy<Value = IndicatorSet> {
    (
        arb_optional(0.0..100.0),
        arb_optional(-5.0..5.0),
        arb_optional(-5.0..5.0),
        arb_optional(10.0..500.0),
        arb_optional(10.0..500.0),
    )
        .prop_map(|(rsi, macd, macd_signal, price, sma20)| {
            IndicatorSet::new()
                .with_optional(IndicatorSet::RSI14, rsi)
                .with_optional(IndicatorSet::MACD, macd)
                .with_optional(IndicatorSet::MACD_SIGNAL, macd_signal)
                .with_optional(IndicatorSet::PRICE, price)
                .with_optional(IndicatorSet::SMA20, sma20)
        })
}

proptest! {
    #[test]
    fn classify_is_deterministic(indicators in arb_indicators()) {
        let first = classify(&indicators);
        for _ in 0..5 {
            prop_assert_eq!(classify(&indicators.clone()), first);
        }
    }

    #[test]
    fn average_stays_in_unit_range(indicators in arb_indicators()) {
        let breakdown = explain(&indicators);
        match breakdown.average {
            Some(avg) => prop_assert!((-1.0..=1.0).contains(&avg)),
            None => prop_assert_eq!(breakdown.signal, Signal::Hold),
        }
    }

    /// Mirroring RSI around 50 and swapping the MACD/trend comparisons flips
    /// BUY and SELL, as long as no comparison sits exactly on a tie.
    #[test]
    fn mirrored_inputs_flip_signal(
        rsi in 0.0..100.0f64,
        macd in -5.0..5.0f64,
        macd_signal in -5.0..5.0f64,
        price in 10.0..500.0f64,
        sma20 in 10.0..500.0f64,
    ) {
        prop_assume!(macd != macd_signal && price != sma20);
        prop_assume!((rsi - 30.0).abs() > 1e-9 && (rsi - 70.0).abs() > 1e-9);

        let original = IndicatorSet::new()
            .with(IndicatorSet::RSI14, rsi)
            .with(IndicatorSet::MACD, macd)
            .with(IndicatorSet::MACD_SIGNAL, macd_signal)
            .with(IndicatorSet::PRICE, price)
            .with(IndicatorSet::SMA20, sma20);
        let mirrored = IndicatorSet::new()
            .with(IndicatorSet::RSI14, 100.0 - rsi)
            .with(IndicatorSet::MACD, macd_signal)
            .with(IndicatorSet::MACD_SIGNAL, macd)
            .with(IndicatorSet::PRICE, sma20)
            .with(IndicatorSet::SMA20, price);

        let expected = match classify(&original) {
            Signal::Buy => Signal::Sell,
            Signal::Sell => Signal::Buy,
            Signal::Hold => Signal::Hold,
        };
        prop_assert_eq!(classify(&mirrored), expected);
    }

    #[test]
    fn lone_neutral_rsi_holds(rsi in 30.0..=70.0f64) {
        let indicators = IndicatorSet::new().with(IndicatorSet::RSI14, rsi);
        prop_assert_eq!(classify(&indicators), Signal::Hold);
    }
}
