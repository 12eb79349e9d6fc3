//! Paper order command implementation.

use anyhow::{bail, Context, Result};
use rust_decimal::Decimal;
use std::path::Path;
use tracing::info;
use tradedesk_broker::PaperBroker;
use tradedesk_core::traits::{Broker, QuoteFetcher};
use tradedesk_core::types::{OrderTicket, Side, Symbol};
use tradedesk_data::CsvSnapshotFetcher;
use tradedesk_risk::{PositionSizeRequest, PositionSizeResult};
use tradedesk_signals::classify;

use super::load_settings;
use crate::cli::OrderArgs;

pub async fn run(args: OrderArgs, config_path: &Path) -> Result<()> {
    let config = load_settings(config_path)?;
    let symbol = Symbol::parse(&args.symbol).context("Invalid symbol")?;
    let side: Side = args.side.into();

    let source = CsvSnapshotFetcher::from_path(&args.data)
        .with_context(|| format!("Failed to load quote snapshot {}", args.data.display()))?;
    let outcome = source.fetch(&symbol).await;
    let (Some(quote), Some(indicators)) = (outcome.quote(), outcome.classification_input()) else {
        bail!(
            "No quote for {}: {}",
            symbol,
            outcome.failure_reason().unwrap_or("unknown error")
        );
    };
    let signal = classify(&indicators);
    info!(%symbol, price = quote.price, %signal, "quote loaded");

    let quantity = match (args.quantity, args.stop) {
        (Some(quantity), _) => quantity,
        (None, Some(stop)) => {
            let request = PositionSizeRequest::new(
                config.risk.account_capital,
                config.risk.risk_percent,
                quote.price,
                stop,
            );
            let sized = config
                .risk
                .sizer()
                .size(&request)
                .context("Invalid sizing request")?;
            match sized {
                PositionSizeResult::Sized(size) if size.shares > 0 => Decimal::from(size.shares),
                PositionSizeResult::Sized(_) => {
                    bail!("Risk budget is too small for a single share")
                }
                PositionSizeResult::Invalid => bail!("Stop equals the entry price, cannot size"),
            }
        }
        (None, None) => bail!("Provide --quantity or --stop"),
    };

    let ticket = match args.limit_price {
        Some(limit) => OrderTicket::limit(symbol.clone(), side, quantity, limit),
        None => OrderTicket::market(symbol.clone(), side, quantity),
    }
    .with_time_in_force(args.tif.into());

    let market_price =
        Decimal::try_from(quote.price).context("Quote price is not representable")?;
    let broker =
        PaperBroker::new(config.paper.initial_capital).with_slippage(config.paper.slippage_pct);

    let order = broker.submit_order(ticket).await?;
    let order = broker.execute_at_price(order.id, market_price)?;
    let account = broker.get_account().await?;

    println!("Paper Order");
    println!("═══════════════════════════════════════════════════════════");
    println!("  Order:     {}", order.id);
    println!("  Symbol:    {} (signal {})", symbol, signal);
    println!("  Side:      {}", order.ticket.side);
    println!("  Type:      {}", order.ticket.order_type);
    println!("  Quantity:  {}", order.ticket.quantity);
    println!("  Status:    {:?}", order.status);
    if let Some(fill) = &order.fill {
        println!("  Fill:      {} @ ${}", fill.quantity, fill.price);
    }
    if let Some(note) = &order.note {
        println!("  Note:      {}", note);
    }
    println!("  ───────────────────────────────────────────────────────");
    println!("  Cash:      ${}", account.cash.round_dp(2));
    for (held, holding) in broker.positions() {
        println!(
            "  Holding:   {} x {} @ ${}",
            held,
            holding.quantity,
            holding.avg_price.round_dp(4)
        );
    }

    Ok(())
}
