//! Refresh command implementation.

use anyhow::{Context, Result};
use serde_json::json;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};
use tradedesk_core::traits::QuoteFetcher;
use tradedesk_core::types::{FetchOutcome, RefreshResult};
use tradedesk_data::{
    AutoRefresh, CachedFetcher, CsvSnapshotFetcher, RefreshOrchestrator, TimeoutFetcher,
};
use tradedesk_signals::SignalExt;

use super::load_settings;
use crate::cli::{OutputFormat, RefreshArgs};

pub async fn run(args: RefreshArgs, config_path: &Path) -> Result<()> {
    let config = load_settings(config_path)?;
    let symbols = if args.symbols.is_empty() {
        config.watchlist.clone()
    } else {
        args.symbols.clone()
    };

    let source = CsvSnapshotFetcher::from_path(&args.data)
        .with_context(|| format!("Failed to load quote snapshot {}", args.data.display()))?;
    info!(rows = source.len(), path = %args.data.display(), "quote snapshot loaded");

    let fetcher = TimeoutFetcher::new(
        CachedFetcher::new(source, config.refresh.cache_ttl()),
        config.refresh.fetch_timeout(),
    );
    let orchestrator =
        RefreshOrchestrator::new(fetcher).with_concurrency(config.refresh.concurrency);

    if args.watch {
        return watch(
            orchestrator,
            symbols,
            config.refresh.auto_refresh_period(),
            args.output,
        )
        .await;
    }

    let outcome = orchestrator
        .refresh(&symbols, |completed, total| {
            debug!(completed, total, "refresh progress")
        })
        .await?;

    match outcome.result() {
        Some(result) => print_result(result, args.output)?,
        None => println!("Refresh cancelled"),
    }

    Ok(())
}

async fn watch<F: QuoteFetcher + 'static>(
    orchestrator: RefreshOrchestrator<F>,
    symbols: Vec<String>,
    period: Duration,
    output: OutputFormat,
) -> Result<()> {
    let mut updates = orchestrator.subscribe();
    let auto = AutoRefresh::spawn(orchestrator.clone(), symbols, period);
    println!("Refreshing every {}s, press Ctrl-C to stop", period.as_secs());

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let latest = updates.borrow_and_update().clone();
                if let Some(result) = latest {
                    print_result(&result, output)?;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                orchestrator.cancel_refresh();
                break;
            }
        }
    }

    auto.stop();
    Ok(())
}

fn print_result(result: &RefreshResult, output: OutputFormat) -> Result<()> {
    match output {
        OutputFormat::Json => {
            let signals: serde_json::Map<String, serde_json::Value> = result
                .signals()
                .into_iter()
                .map(|(symbol, signal)| (symbol.to_string(), json!(signal)))
                .collect();
            let document = json!({ "result": serde_json::to_value(result)?, "signals": signals });
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
        OutputFormat::Text => {
            println!();
            println!(
                "Refresh {}  {} symbols, {} ok, {} failed",
                result.cycle(),
                result.total(),
                result.succeeded(),
                result.failed()
            );
            println!("═══════════════════════════════════════════════════════════");
            println!(
                "  {:<8} {:>12} {:>10} {:>12}  {}",
                "SYMBOL", "PRICE", "CHANGE", "VOLUME", "SIGNAL"
            );
            println!("  ───────────────────────────────────────────────────────");

            for (symbol, outcome) in result.iter() {
                match outcome {
                    FetchOutcome::Success { quote, .. } => {
                        let signal = result
                            .signal(symbol.as_str())
                            .map(|s| s.to_string())
                            .unwrap_or_default();
                        println!(
                            "  {:<8} {:>12.2} {:>9.2}% {:>12}  {}",
                            symbol.as_str(), quote.price, quote.change_percent, quote.volume, signal
                        );
                    }
                    FetchOutcome::Failure { reason } => {
                        println!(
                            "  {:<8} {:>12} {:>10} {:>12}  error: {}",
                            symbol.as_str(),
                            "-",
                            "-",
                            "-",
                            reason
                        );
                    }
                }
            }
            println!();
        }
    }
    Ok(())
}
