//! Periodic watchlist refresh.

use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use tradedesk_core::error::RefreshError;
use tradedesk_core::traits::QuoteFetcher;

use crate::orchestrator::RefreshOrchestrator;

/// Background task that requests a refresh on a fixed interval.
///
/// A tick that lands while a cycle is still in flight is skipped; the
/// in-flight cycle is never cancelled by the timer. Results reach callers
/// through [`RefreshOrchestrator::subscribe`].
pub struct AutoRefresh {
    watchlist: watch::Sender<Vec<String>>,
    task: JoinHandle<()>,
}

impl AutoRefresh {
    /// Start refreshing `watchlist` every `period`, beginning immediately.
    ///
    /// # Panics
    /// Must be called from within a Tokio runtime.
    pub fn spawn<F>(
        orchestrator: RefreshOrchestrator<F>,
        watchlist: Vec<String>,
        period: Duration,
    ) -> Self
    where
        F: QuoteFetcher + 'static,
    {
        let (tx, rx) = watch::channel(watchlist);
        let task = tokio::spawn(run(orchestrator, rx, period));
        info!(period_secs = period.as_secs(), "auto-refresh started");
        Self { watchlist: tx, task }
    }

    /// Replace the watchlist used from the next tick on.
    pub fn set_watchlist(&self, watchlist: Vec<String>) {
        self.watchlist.send_replace(watchlist);
    }

    pub fn watchlist(&self) -> Vec<String> {
        self.watchlist.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stop the timer. A cycle already in flight runs to completion.
    pub fn stop(self) {
        self.task.abort();
        info!("auto-refresh stopped");
    }
}

impl Drop for AutoRefresh {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run<F: QuoteFetcher + 'static>(
    orchestrator: RefreshOrchestrator<F>,
    watchlist: watch::Receiver<Vec<String>>,
    period: Duration,
) {
    let mut ticker = tokio::time::interval(period.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        let symbols = watchlist.borrow().clone();

        match orchestrator.request_refresh(&symbols) {
            // The cycle runs on its own; results arrive through the published value
            Ok(handle) => debug!(cycle = %handle.cycle(), "scheduled refresh started"),
            Err(RefreshError::AlreadyInProgress { cycle }) => {
                debug!(cycle, "previous refresh still running, skipping tick")
            }
            Err(err) => warn!(error = %err, "scheduled refresh rejected"),
        }
    }
}
