//! Property tests for position sizing.
//!
//! Uses proptest to verify:
//! 1. The realized risk never exceeds the budget
//! 2. Adding one more share would exceed the budget
//! 3. A larger risk percent never sizes smaller

use proptest::prelude::*;
use tradedesk_risk::{size_position, PositionSizeRequest, PositionSizeResult};

fn arb_capital() -> impl Strategy<Value = f64> {
    (1_000.0..1_000_000.0_f64).prop_map(|c| c.round())
}

fn arb_price() -> impl Strategy<Value = f64> {
    (1.0..500.0_f64).prop_map(|p| (p * 100.0).round() / 100.0)
}

fn arb_risk_percent() -> impl Strategy<Value = f64> {
    (0.1..10.0_f64).prop_map(|r| (r * 10.0).round() / 10.0)
}

proptest! {
    #[test]
    fn risk_stays_within_budget(
        capital in arb_capital(),
        risk in arb_risk_percent(),
        entry in arb_price(),
        stop in arb_price(),
    ) {
        let req = PositionSizeRequest::new(capital, risk, entry, stop);
        match size_position(&req).unwrap() {
            PositionSizeResult::Invalid => prop_assert_eq!(entry, stop),
            PositionSizeResult::Sized(size) => {
                let per_share = (entry - stop).abs();
                let realized = size.shares as f64 * per_share;
                prop_assert!(realized <= size.risk_amount + 1e-6);
                prop_assert!((size.shares + 1) as f64 * per_share > size.risk_amount - 1e-6);
            }
        }
    }

    #[test]
    fn more_risk_never_sizes_smaller(
        capital in arb_capital(),
        risk in arb_risk_percent(),
        entry in arb_price(),
        stop in arb_price(),
    ) {
        prop_assume!(entry != stop);
        let low = size_position(&PositionSizeRequest::new(capital, risk, entry, stop)).unwrap();
        let high = size_position(&PositionSizeRequest::new(capital, risk * 2.0, entry, stop)).unwrap();
        prop_assert!(high.shares().unwrap() >= low.shares().unwrap());
    }
}
