//! Signal command implementation.

use anyhow::Result;
use tradedesk_core::types::IndicatorSet;
use tradedesk_signals::{explain, RSI_OVERBOUGHT, RSI_OVERSOLD, SIGNAL_THRESHOLD};

use crate::cli::{OutputFormat, SignalArgs};

pub async fn run(args: SignalArgs) -> Result<()> {
    let indicators = IndicatorSet::new()
        .with_optional(IndicatorSet::RSI14, args.rsi14)
        .with_optional(IndicatorSet::MACD, args.macd)
        .with_optional(IndicatorSet::MACD_SIGNAL, args.macd_signal)
        .with_optional(IndicatorSet::PRICE, args.price)
        .with_optional(IndicatorSet::SMA20, args.sma20);

    let breakdown = explain(&indicators);

    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&breakdown)?),
        OutputFormat::Text => {
            println!("Signal: {}", breakdown.signal);
            println!("═══════════════════════════════════════════════════════════");
            for vote in &breakdown.votes {
                let value = match vote.value {
                    Some(v) => format!("{:+}", v),
                    None => "abstain".to_string(),
                };
                println!("  {:<6} {}", vote.voter, value);
            }
            println!("  ───────────────────────────────────────────────────────");
            match breakdown.average {
                Some(avg) => println!(
                    "  average {:+.3} over {} voter(s), threshold ±{}",
                    avg,
                    breakdown.participating(),
                    SIGNAL_THRESHOLD
                ),
                None => println!("  no voter had enough data"),
            }
            println!(
                "  RSI bands: oversold < {}, overbought > {}",
                RSI_OVERSOLD, RSI_OVERBOUGHT
            );
        }
    }

    Ok(())
}
