//! Per-symbol fetch outcomes and the aggregate result of a refresh cycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

use super::{IndicatorSet, Quote, Symbol};

/// Identifier of one refresh cycle, unique per orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CycleId(pub u64);

impl fmt::Display for CycleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Outcome of fetching one symbol.
///
/// A failure never carries a quote or indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FetchOutcome {
    Success {
        quote: Quote,
        indicators: IndicatorSet,
    },
    Failure {
        reason: String,
    },
}

impl FetchOutcome {
    pub fn success(quote: Quote, indicators: IndicatorSet) -> Self {
        FetchOutcome::Success { quote, indicators }
    }

    pub fn failure(reason: impl Into<String>) -> Self {
        FetchOutcome::Failure {
            reason: reason.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success { .. })
    }

    pub fn quote(&self) -> Option<&Quote> {
        match self {
            FetchOutcome::Success { quote, .. } => Some(quote),
            FetchOutcome::Failure { .. } => None,
        }
    }

    pub fn indicators(&self) -> Option<&IndicatorSet> {
        match self {
            FetchOutcome::Success { indicators, .. } => Some(indicators),
            FetchOutcome::Failure { .. } => None,
        }
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            FetchOutcome::Failure { reason } => Some(reason),
            FetchOutcome::Success { .. } => None,
        }
    }

    /// Indicator snapshot to classify, with the quote price as context.
    pub fn classification_input(&self) -> Option<IndicatorSet> {
        match self {
            FetchOutcome::Success { quote, indicators } => {
                Some(indicators.with_price_context(quote.price))
            }
            FetchOutcome::Failure { .. } => None,
        }
    }
}

/// Final result of one refresh cycle.
///
/// Every requested symbol has exactly one outcome, so `total` always equals
/// the number of (de-duplicated) requested symbols. Deserialized results are
/// rebuilt through [`RefreshResult::new`], so stored counts are not trusted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "StoredResult")]
pub struct RefreshResult {
    cycle: CycleId,
    order: Vec<Symbol>,
    outcomes: HashMap<Symbol, FetchOutcome>,
    succeeded: usize,
    failed: usize,
    completed_at: DateTime<Utc>,
}

/// Serialized form of a result, before its counts are recomputed.
#[derive(Deserialize)]
struct StoredResult {
    cycle: CycleId,
    order: Vec<Symbol>,
    #[serde(default)]
    outcomes: HashMap<Symbol, FetchOutcome>,
    completed_at: DateTime<Utc>,
}

impl From<StoredResult> for RefreshResult {
    fn from(stored: StoredResult) -> Self {
        let mut seen = HashSet::with_capacity(stored.order.len());
        let order = stored
            .order
            .into_iter()
            .filter(|symbol| seen.insert(symbol.clone()))
            .collect();

        let mut result = Self::new(stored.cycle, order, stored.outcomes);
        result.completed_at = stored.completed_at;
        result
    }
}

impl RefreshResult {
    /// Assemble a result from the requested symbols and their outcomes.
    ///
    /// A requested symbol without an outcome is recorded as a failure rather
    /// than dropped; outcomes for symbols that were not requested are ignored.
    pub fn new(
        cycle: CycleId,
        order: Vec<Symbol>,
        mut resolved: HashMap<Symbol, FetchOutcome>,
    ) -> Self {
        let mut outcomes = HashMap::with_capacity(order.len());
        for symbol in &order {
            let outcome = resolved
                .remove(symbol)
                .unwrap_or_else(|| FetchOutcome::failure("no outcome recorded"));
            outcomes.insert(symbol.clone(), outcome);
        }

        let succeeded = outcomes.values().filter(|o| o.is_success()).count();
        let failed = outcomes.len() - succeeded;

        Self {
            cycle,
            order,
            outcomes,
            succeeded,
            failed,
            completed_at: Utc::now(),
        }
    }

    /// Result of a cycle that requested no symbols.
    pub fn empty(cycle: CycleId) -> Self {
        Self::new(cycle, Vec::new(), HashMap::new())
    }

    pub fn cycle(&self) -> CycleId {
        self.cycle
    }

    pub fn total(&self) -> usize {
        self.order.len()
    }

    pub fn succeeded(&self) -> usize {
        self.succeeded
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Requested symbols in request order.
    pub fn symbols(&self) -> &[Symbol] {
        &self.order
    }

    pub fn get(&self, symbol: &str) -> Option<&FetchOutcome> {
        self.outcomes.get(symbol)
    }

    /// Outcomes in request order.
    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, &FetchOutcome)> {
        self.order
            .iter()
            .filter_map(move |s| self.outcomes.get(s).map(|o| (s, o)))
    }

    /// Failure reason per failed symbol, in request order.
    pub fn errors(&self) -> impl Iterator<Item = (&Symbol, &str)> {
        self.iter()
            .filter_map(|(s, o)| o.failure_reason().map(|reason| (s, reason)))
    }

    /// Successful quotes in request order.
    pub fn quotes(&self) -> impl Iterator<Item = &Quote> {
        self.iter().filter_map(|(_, o)| o.quote())
    }
}
