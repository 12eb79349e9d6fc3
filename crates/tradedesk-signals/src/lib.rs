//! Composite buy/sell/hold signal engine.
//!
//! Three independent voters (RSI, MACD crossover, price vs. SMA20) each cast
//! -1, 0 or +1, or abstain when their inputs are missing. The average vote of
//! the non-abstaining voters decides the signal.

mod engine;
mod ext;

pub use engine::{
    classify, explain, signal_for_average, MacdVoter, RsiVoter, SignalBreakdown, TrendVoter,
    Vote, Voter, RSI_OVERBOUGHT, RSI_OVERSOLD, SIGNAL_THRESHOLD,
};
pub use ext::SignalExt;
