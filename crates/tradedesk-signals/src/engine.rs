//! Voters and the composite classification.

use serde::Serialize;
use tradedesk_core::types::{IndicatorSet, Signal};

/// RSI below this is oversold (bullish vote).
pub const RSI_OVERSOLD: f64 = 30.0;
/// RSI above this is overbought (bearish vote).
pub const RSI_OVERBOUGHT: f64 = 70.0;
/// Average vote must be strictly beyond this to leave HOLD.
pub const SIGNAL_THRESHOLD: f64 = 0.3;

/// One indicator-based sub-rule of the composite signal.
pub trait Voter: Send + Sync {
    /// Short name shown next to the vote.
    fn name(&self) -> &'static str;

    /// -1, 0 or +1; `None` to abstain.
    fn vote(&self, indicators: &IndicatorSet) -> Option<i8>;
}

/// Mean-reversion read of the 14-period RSI.
#[derive(Debug, Clone, Copy, Default)]
pub struct RsiVoter;

impl Voter for RsiVoter {
    fn name(&self) -> &'static str {
        "RSI"
    }

    fn vote(&self, indicators: &IndicatorSet) -> Option<i8> {
        let rsi = indicators.rsi14()?;
        Some(if rsi < RSI_OVERSOLD {
            1
        } else if rsi > RSI_OVERBOUGHT {
            -1
        } else {
            0
        })
    }
}

/// MACD line relative to its signal line.
#[derive(Debug, Clone, Copy, Default)]
pub struct MacdVoter;

impl Voter for MacdVoter {
    fn name(&self) -> &'static str {
        "MACD"
    }

    fn vote(&self, indicators: &IndicatorSet) -> Option<i8> {
        let macd = indicators.macd()?;
        let signal = indicators.macd_signal()?;
        Some(if macd > signal { 1 } else { -1 })
    }
}

/// Price relative to the 20-period SMA.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrendVoter;

impl Voter for TrendVoter {
    fn name(&self) -> &'static str {
        "MA"
    }

    fn vote(&self, indicators: &IndicatorSet) -> Option<i8> {
        let price = indicators.price()?;
        let sma20 = indicators.sma20()?;
        Some(if price > sma20 { 1 } else { -1 })
    }
}

const VOTERS: [&dyn Voter; 3] = [&RsiVoter, &MacdVoter, &TrendVoter];

/// A single voter's opinion; `value` is `None` when it abstained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Vote {
    pub voter: &'static str,
    pub value: Option<i8>,
}

impl Vote {
    /// Per-voter badge: the signal this voter alone would give.
    pub fn as_signal(&self) -> Option<Signal> {
        self.value.map(|v| match v {
            v if v > 0 => Signal::Buy,
            v if v < 0 => Signal::Sell,
            _ => Signal::Hold,
        })
    }
}

/// Every vote plus the composite result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalBreakdown {
    pub votes: Vec<Vote>,
    /// Mean of the non-abstaining votes, `None` when all abstained
    pub average: Option<f64>,
    pub signal: Signal,
}

impl SignalBreakdown {
    /// Number of voters that did not abstain.
    pub fn participating(&self) -> usize {
        self.votes.iter().filter(|v| v.value.is_some()).count()
    }
}

/// Map an average vote to a signal. Boundaries stay HOLD.
pub fn signal_for_average(average: f64) -> Signal {
    if average > SIGNAL_THRESHOLD {
        Signal::Buy
    } else if average < -SIGNAL_THRESHOLD {
        Signal::Sell
    } else {
        Signal::Hold
    }
}

/// Run all voters and show how the signal was reached.
pub fn explain(indicators: &IndicatorSet) -> SignalBreakdown {
    let votes: Vec<Vote> = VOTERS
        .iter()
        .map(|voter| Vote {
            voter: voter.name(),
            value: voter.vote(indicators),
        })
        .collect();

    let cast: Vec<i8> = votes.iter().filter_map(|v| v.value).collect();
    let average = if cast.is_empty() {
        None
    } else {
        let sum: i32 = cast.iter().map(|&v| i32::from(v)).sum();
        Some(f64::from(sum) / cast.len() as f64)
    };

    let signal = average.map(signal_for_average).unwrap_or(Signal::Hold);

    SignalBreakdown {
        votes,
        average,
        signal,
    }
}

/// Classify one symbol's indicator snapshot.
pub fn classify(indicators: &IndicatorSet) -> Signal {
    explain(indicators).signal
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(pairs: &[(&str, f64)]) -> IndicatorSet {
        pairs.iter().map(|&(k, v)| (k, v)).collect()
    }

    #[test]
    fn test_all_absent_is_hold() {
        let breakdown = explain(&IndicatorSet::new());
        assert_eq!(breakdown.signal, Signal::Hold);
        assert_eq!(breakdown.average, None);
        assert_eq!(breakdown.participating(), 0);
    }

    #[test]
    fn test_unanimous_bullish() {
        let indicators = set(&[
            ("rsi14", 25.0),
            ("macd", 1.0),
            ("macdSignal", 0.5),
            ("price", 110.0),
            ("sma20", 100.0),
        ]);
        let breakdown = explain(&indicators);
        assert_eq!(breakdown.signal, Signal::Buy);
        assert_eq!(breakdown.average, Some(1.0));
    }

    #[test]
    fn test_unanimous_bearish() {
        let indicators = set(&[
            ("rsi14", 75.0),
            ("macd", -1.0),
            ("macdSignal", 0.5),
            ("price", 90.0),
            ("sma20", 100.0),
        ]);
        assert_eq!(classify(&indicators), Signal::Sell);
    }

    #[test]
    fn test_single_neutral_voter_is_hold() {
        assert_eq!(classify(&set(&[("rsi14", 50.0)])), Signal::Hold);
    }

    #[test]
    fn test_two_of_three_agreement() {
        // MACD and trend bullish, RSI overbought: (1 + 1 - 1) / 3
        let indicators = set(&[
            ("rsi14", 80.0),
            ("macd", 2.0),
            ("macdSignal", 1.0),
            ("price", 105.0),
            ("sma20", 100.0),
        ]);
        let breakdown = explain(&indicators);
        assert!((breakdown.average.unwrap() - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(breakdown.signal, Signal::Buy);
    }

    #[test]
    fn test_split_two_voters_is_hold() {
        // RSI abstains, MACD bullish, trend bearish
        let indicators = set(&[
            ("macd", 2.0),
            ("macdSignal", 1.0),
            ("price", 95.0),
            ("sma20", 100.0),
        ]);
        let breakdown = explain(&indicators);
        assert_eq!(breakdown.participating(), 2);
        assert_eq!(breakdown.average, Some(0.0));
        assert_eq!(breakdown.signal, Signal::Hold);
    }

    #[test]
    fn test_threshold_is_strict() {
        assert_eq!(signal_for_average(0.3), Signal::Hold);
        assert_eq!(signal_for_average(-0.3), Signal::Hold);
        assert_eq!(signal_for_average(0.300_000_1), Signal::Buy);
        assert_eq!(signal_for_average(-0.300_000_1), Signal::Sell);
        assert_eq!(signal_for_average(0.0), Signal::Hold);
    }

    #[test]
    fn test_rsi_boundaries_are_neutral() {
        assert_eq!(RsiVoter.vote(&set(&[("rsi14", 30.0)])), Some(0));
        assert_eq!(RsiVoter.vote(&set(&[("rsi14", 70.0)])), Some(0));
        assert_eq!(RsiVoter.vote(&set(&[("rsi14", 29.99)])), Some(1));
        assert_eq!(RsiVoter.vote(&set(&[("rsi14", 70.01)])), Some(-1));
    }

    #[test]
    fn test_ties_vote_bearish() {
        let equal_macd = set(&[("macd", 0.5), ("macdSignal", 0.5)]);
        assert_eq!(MacdVoter.vote(&equal_macd), Some(-1));

        let on_average = set(&[("price", 100.0), ("sma20", 100.0)]);
        assert_eq!(TrendVoter.vote(&on_average), Some(-1));
    }

    #[test]
    fn test_partial_inputs_abstain() {
        assert_eq!(MacdVoter.vote(&set(&[("macd", 1.0)])), None);
        assert_eq!(TrendVoter.vote(&set(&[("sma20", 100.0)])), None);
        assert_eq!(RsiVoter.vote(&set(&[("rsi14", f64::NAN)])), None);
    }

    #[test]
    fn test_vote_badges() {
        let breakdown = explain(&set(&[("rsi14", 20.0), ("macd", 0.0), ("macdSignal", 1.0)]));
        let badges: Vec<(&str, Option<Signal>)> = breakdown
            .votes
            .iter()
            .map(|v| (v.voter, v.as_signal()))
            .collect();
        assert_eq!(
            badges,
            vec![
                ("RSI", Some(Signal::Buy)),
                ("MACD", Some(Signal::Sell)),
                ("MA", None),
            ]
        );
        assert_eq!(breakdown.signal, Signal::Hold);
    }
}
