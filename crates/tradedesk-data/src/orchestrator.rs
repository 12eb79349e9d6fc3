//! Watchlist refresh cycles.
//!
//! A cycle fetches every requested symbol with at most `concurrency` fetches
//! in flight, records one outcome per symbol as it resolves, and reports a
//! progress event per resolution. When the last symbol resolves the result
//! is published and delivered exactly once. Only one cycle may run at a
//! time; cancelling releases the slot immediately and discards everything
//! the cycle had gathered.

use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{mpsc, oneshot, watch, Semaphore};
use tracing::{debug, info, warn};
use tradedesk_core::error::RefreshError;
use tradedesk_core::traits::QuoteFetcher;
use tradedesk_core::types::{
    normalize_watchlist, CycleId, FetchOutcome, RefreshResult, Signal, Symbol,
};
use tradedesk_signals::SignalExt;

/// Fetches in flight per cycle unless configured otherwise.
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Event delivered to the requester of a cycle.
#[derive(Debug, Clone)]
pub enum RefreshEvent {
    /// One more symbol resolved; `completed` runs 1..=total.
    Progress { completed: usize, total: usize },
    /// Every symbol resolved; always the last event of a finished cycle.
    Completed(Arc<RefreshResult>),
    /// The cycle was cancelled; nothing follows.
    Cancelled,
}

/// Terminal state of a cycle.
#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    Completed(Arc<RefreshResult>),
    Cancelled,
}

impl RefreshOutcome {
    pub fn result(&self) -> Option<&Arc<RefreshResult>> {
        match self {
            RefreshOutcome::Completed(result) => Some(result),
            RefreshOutcome::Cancelled => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, RefreshOutcome::Cancelled)
    }
}

/// Receiving end of one cycle.
#[derive(Debug)]
pub struct RefreshHandle {
    cycle: CycleId,
    total: usize,
    events: mpsc::UnboundedReceiver<RefreshEvent>,
}

impl RefreshHandle {
    pub fn cycle(&self) -> CycleId {
        self.cycle
    }

    /// Number of distinct symbols in the cycle.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Next event, or `None` once the cycle has delivered its terminal event.
    pub async fn next_event(&mut self) -> Option<RefreshEvent> {
        self.events.recv().await
    }

    /// Wait for the terminal event, ignoring progress.
    pub async fn finish(self) -> RefreshOutcome {
        self.finish_with(|_, _| {}).await
    }

    /// Wait for the terminal event, calling `on_progress(completed, total)`
    /// for each progress event.
    pub async fn finish_with<P>(mut self, mut on_progress: P) -> RefreshOutcome
    where
        P: FnMut(usize, usize),
    {
        while let Some(event) = self.events.recv().await {
            match event {
                RefreshEvent::Progress { completed, total } => on_progress(completed, total),
                RefreshEvent::Completed(result) => return RefreshOutcome::Completed(result),
                RefreshEvent::Cancelled => return RefreshOutcome::Cancelled,
            }
        }
        // The driver went away without a terminal event (runtime shutdown).
        RefreshOutcome::Cancelled
    }
}

/// The cycle currently holding the refresh slot.
struct ActiveCycle {
    id: CycleId,
    events: mpsc::UnboundedSender<RefreshEvent>,
    // Dropping this wakes the driver so it abandons in-flight fetches.
    _abandon: oneshot::Sender<()>,
}

struct Shared<F> {
    fetcher: F,
    active: Mutex<Option<ActiveCycle>>,
    next_cycle: AtomicU64,
    latest: watch::Sender<Option<Arc<RefreshResult>>>,
}

impl<F> Shared<F> {
    fn active(&self) -> MutexGuard<'_, Option<ActiveCycle>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Send an event if `id` still holds the slot.
    ///
    /// Sending under the lock means no event of a cycle can follow the
    /// `Cancelled` that `cancel` sends under the same lock.
    fn emit(&self, id: CycleId, event: RefreshEvent) -> bool {
        let active = self.active();
        match active.as_ref() {
            Some(cycle) if cycle.id == id => {
                let _ = cycle.events.send(event);
                true
            }
            _ => false,
        }
    }

    /// Publish the result and release the slot, if `id` still holds it.
    fn complete(&self, id: CycleId, result: RefreshResult) -> bool {
        let mut active = self.active();
        let cycle = match active.take() {
            Some(cycle) if cycle.id == id => cycle,
            other => {
                *active = other;
                return false;
            }
        };

        let result = Arc::new(result);
        self.latest.send_replace(Some(Arc::clone(&result)));
        let _ = cycle.events.send(RefreshEvent::Completed(result));
        true
    }

    /// Cancel whichever cycle holds the slot.
    fn cancel(&self) -> Option<CycleId> {
        let cycle = self.active().take()?;
        let _ = cycle.events.send(RefreshEvent::Cancelled);
        Some(cycle.id)
    }

    fn release(&self, id: CycleId) {
        let mut active = self.active();
        if matches!(active.as_ref(), Some(cycle) if cycle.id == id) {
            *active = None;
        }
    }
}

/// Frees the slot if the driver exits without completing.
struct CycleGuard<'a, F> {
    shared: &'a Shared<F>,
    id: CycleId,
}

impl<F> Drop for CycleGuard<'_, F> {
    fn drop(&mut self) {
        self.shared.release(self.id);
    }
}

/// Runs refresh cycles against a quote fetcher.
///
/// Cloning is cheap; clones share the refresh slot and the published result.
pub struct RefreshOrchestrator<F> {
    shared: Arc<Shared<F>>,
    concurrency: usize,
}

impl<F> Clone for RefreshOrchestrator<F> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            concurrency: self.concurrency,
        }
    }
}

impl<F: QuoteFetcher + 'static> RefreshOrchestrator<F> {
    /// Create an orchestrator with the default concurrency.
    pub fn new(fetcher: F) -> Self {
        let (latest, _) = watch::channel(None);
        Self {
            shared: Arc::new(Shared {
                fetcher,
                active: Mutex::new(None),
                next_cycle: AtomicU64::new(0),
                latest,
            }),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Set the maximum number of fetches in flight (at least one).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn fetcher(&self) -> &F {
        &self.shared.fetcher
    }

    /// Check if a cycle currently holds the refresh slot.
    pub fn is_refreshing(&self) -> bool {
        self.shared.active().is_some()
    }

    /// Last published result, if any cycle has completed.
    pub fn latest(&self) -> Option<Arc<RefreshResult>> {
        self.shared.latest.borrow().clone()
    }

    /// Watch published results; each completed cycle replaces the value.
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<RefreshResult>>> {
        self.shared.latest.subscribe()
    }

    /// Start a refresh cycle.
    ///
    /// Symbols are uppercased and de-duplicated. An empty list completes
    /// immediately with an empty result and no fetches. A blank symbol, or a
    /// cycle already in flight, rejects the request without side effects.
    ///
    /// # Panics
    /// Must be called from within a Tokio runtime.
    pub fn request_refresh<S: AsRef<str>>(
        &self,
        symbols: &[S],
    ) -> Result<RefreshHandle, RefreshError> {
        let symbols = normalize_watchlist(symbols)?;

        let mut active = self.shared.active();
        if let Some(cycle) = active.as_ref() {
            warn!(cycle = %cycle.id, "refresh rejected, a cycle is still in progress");
            return Err(RefreshError::AlreadyInProgress { cycle: cycle.id.0 });
        }

        let id = CycleId(self.shared.next_cycle.fetch_add(1, Ordering::Relaxed) + 1);
        let total = symbols.len();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let handle = RefreshHandle {
            cycle: id,
            total,
            events: events_rx,
        };

        if symbols.is_empty() {
            info!(cycle = %id, "empty watchlist, nothing to fetch");
            let result = Arc::new(RefreshResult::empty(id));
            self.shared.latest.send_replace(Some(Arc::clone(&result)));
            let _ = events_tx.send(RefreshEvent::Completed(result));
            return Ok(handle);
        }

        let (abandon_tx, abandon_rx) = oneshot::channel();
        *active = Some(ActiveCycle {
            id,
            events: events_tx,
            _abandon: abandon_tx,
        });
        drop(active);

        info!(cycle = %id, symbols = total, concurrency = self.concurrency, "refresh started");
        tokio::spawn(drive(
            Arc::clone(&self.shared),
            id,
            symbols,
            self.concurrency,
            abandon_rx,
        ));

        Ok(handle)
    }

    /// Run a cycle to its end, reporting progress along the way.
    pub async fn refresh<S, P>(
        &self,
        symbols: &[S],
        on_progress: P,
    ) -> Result<RefreshOutcome, RefreshError>
    where
        S: AsRef<str>,
        P: FnMut(usize, usize),
    {
        let handle = self.request_refresh(symbols)?;
        Ok(handle.finish_with(on_progress).await)
    }

    /// Cancel the cycle in flight. Returns `false` if nothing was running.
    ///
    /// Outcomes gathered so far are discarded, in-flight fetches are dropped
    /// and the published result is left untouched.
    pub fn cancel_refresh(&self) -> bool {
        match self.shared.cancel() {
            Some(id) => {
                info!(cycle = %id, "refresh cancelled");
                true
            }
            None => false,
        }
    }
}

async fn drive<F: QuoteFetcher>(
    shared: Arc<Shared<F>>,
    id: CycleId,
    symbols: Vec<Symbol>,
    concurrency: usize,
    mut abandoned: oneshot::Receiver<()>,
) {
    let _guard = CycleGuard {
        shared: &shared,
        id,
    };
    let total = symbols.len();
    let permits = Semaphore::new(concurrency);
    let fetcher = &shared.fetcher;

    let mut pending: FuturesUnordered<_> = symbols
        .iter()
        .map(|symbol| {
            let permits = &permits;
            async move {
                let outcome = match permits.acquire().await {
                    Ok(_permit) => fetch_isolated(fetcher, symbol).await,
                    Err(_) => FetchOutcome::failure("fetch pool closed"),
                };
                (symbol, outcome)
            }
        })
        .collect();

    let mut outcomes = HashMap::with_capacity(total);

    loop {
        tokio::select! {
            biased;

            _ = &mut abandoned => {
                debug!(
                    cycle = %id,
                    resolved = outcomes.len(),
                    "cycle abandoned, discarding outcomes"
                );
                return;
            }

            next = pending.next() => {
                let Some((symbol, outcome)) = next else { break };

                match outcome.failure_reason() {
                    Some(reason) => warn!(cycle = %id, %symbol, reason, "fetch failed"),
                    None => debug!(cycle = %id, %symbol, "fetch succeeded"),
                }
                outcomes.insert(symbol.clone(), outcome);

                let progress = RefreshEvent::Progress {
                    completed: outcomes.len(),
                    total,
                };
                if !shared.emit(id, progress) {
                    return;
                }
            }
        }
    }
    drop(pending);

    let result = RefreshResult::new(id, symbols, outcomes);
    let signals = result.signals();
    info!(
        cycle = %id,
        succeeded = result.succeeded(),
        failed = result.failed(),
        buys = signals.iter().filter(|(_, s)| *s == Signal::Buy).count(),
        sells = signals.iter().filter(|(_, s)| *s == Signal::Sell).count(),
        "refresh complete"
    );

    if !shared.complete(id, result) {
        debug!(cycle = %id, "cycle lost its slot before publishing");
    }
}

/// Fetch one symbol, turning panics and bad payloads into failures.
async fn fetch_isolated<F: QuoteFetcher + ?Sized>(fetcher: &F, symbol: &Symbol) -> FetchOutcome {
    let outcome = match AssertUnwindSafe(fetcher.fetch(symbol)).catch_unwind().await {
        Ok(outcome) => outcome,
        Err(_) => FetchOutcome::failure(format!("{} fetcher panicked", fetcher.name())),
    };
    sanitize(symbol, outcome)
}

fn sanitize(symbol: &Symbol, outcome: FetchOutcome) -> FetchOutcome {
    match outcome {
        FetchOutcome::Success { ref quote, .. } if !quote.has_valid_price() => {
            FetchOutcome::failure(format!("invalid quote payload: price {}", quote.price))
        }
        FetchOutcome::Success { ref quote, .. } if quote.symbol != *symbol => {
            FetchOutcome::failure(format!("invalid quote payload: received {}", quote.symbol))
        }
        other => other,
    }
}
