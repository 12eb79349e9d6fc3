//! Property-based tests for refresh cycles.

use async_trait::async_trait;
use chrono::Utc;
use proptest::prelude::*;
use std::collections::HashSet;
use tradedesk_core::traits::QuoteFetcher;
use tradedesk_core::types::{FetchOutcome, IndicatorSet, Quote, Symbol};
use tradedesk_data::{RefreshEvent, RefreshOrchestrator};

struct ScriptedFetcher {
    failing: HashSet<String>,
}

#[async_trait]
impl QuoteFetcher for ScriptedFetcher {
    async fn fetch(&self, symbol: &Symbol) -> FetchOutcome {
        tokio::task::yield_now().await;
        if self.failing.contains(symbol.as_str()) {
            FetchOutcome::failure("scripted failure")
        } else {
            FetchOutcome::success(Quote::new(symbol.clone(), 50.0, Utc::now()), IndicatorSet::new())
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

/// Distinct symbols, each flagged as failing or not.
fn watchlist() -> impl Strategy<Value = Vec<(String, bool)>> {
    prop::collection::hash_set("[A-Z]{1,5}", 1..25).prop_flat_map(|symbols| {
        let symbols: Vec<String> = symbols.into_iter().collect();
        let len = symbols.len();
        (Just(symbols), prop::collection::vec(any::<bool>(), len))
            .prop_map(|(symbols, flags)| symbols.into_iter().zip(flags).collect())
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn failures_only_affect_their_own_symbol(
        entries in watchlist(),
        concurrency in 1usize..8,
    ) {
        let failing: HashSet<String> = entries
            .iter()
            .filter(|(_, fails)| *fails)
            .map(|(s, _)| s.clone())
            .collect();
        let symbols: Vec<String> = entries.iter().map(|(s, _)| s.clone()).collect();

        let result = runtime().block_on(async {
            let fetcher = ScriptedFetcher { failing: failing.clone() };
            let orchestrator = RefreshOrchestrator::new(fetcher).with_concurrency(concurrency);
            orchestrator.refresh(&symbols, |_, _| {}).await.unwrap()
        });
        let result = result.result().cloned().unwrap();

        prop_assert_eq!(result.total(), symbols.len());
        prop_assert_eq!(result.failed(), failing.len());
        prop_assert_eq!(result.succeeded() + result.failed(), result.total());
        for (symbol, outcome) in result.iter() {
            prop_assert_eq!(outcome.is_success(), !failing.contains(symbol.as_str()));
        }
    }

    #[test]
    fn progress_counts_up_to_total_then_completes(
        entries in watchlist(),
        concurrency in 1usize..8,
    ) {
        let symbols: Vec<String> = entries.into_iter().map(|(s, _)| s).collect();
        let total = symbols.len();

        let events = runtime().block_on(async {
            let fetcher = ScriptedFetcher { failing: HashSet::new() };
            let orchestrator = RefreshOrchestrator::new(fetcher).with_concurrency(concurrency);
            let mut handle = orchestrator.request_refresh(&symbols).unwrap();
            let mut events = Vec::new();
            while let Some(event) = handle.next_event().await {
                events.push(event);
            }
            events
        });

        prop_assert_eq!(events.len(), total + 1);
        for (i, event) in events[..total].iter().enumerate() {
            match event {
                RefreshEvent::Progress { completed, total: t } => {
                    prop_assert_eq!(*completed, i + 1);
                    prop_assert_eq!(*t, total);
                }
                other => prop_assert!(false, "unexpected event {:?}", other),
            }
        }
        prop_assert!(matches!(events[total], RefreshEvent::Completed(_)));
    }
}
