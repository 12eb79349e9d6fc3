//! Position size command implementation.

use anyhow::{Context, Result};
use std::path::Path;
use tradedesk_risk::{PositionSizeRequest, PositionSizeResult};

use super::load_settings;
use crate::cli::{OutputFormat, SizeArgs};

pub async fn run(args: SizeArgs, config_path: &Path) -> Result<()> {
    let config = load_settings(config_path)?;

    let request = PositionSizeRequest::new(
        args.capital.unwrap_or(config.risk.account_capital),
        args.risk_percent.unwrap_or(config.risk.risk_percent),
        args.entry,
        args.stop,
    );
    let result = config
        .risk
        .sizer()
        .size(&request)
        .context("Invalid sizing request")?;

    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Text => match result {
            PositionSizeResult::Sized(size) => {
                println!("Position Size");
                println!("═══════════════════════════════════════════════════════════");
                println!("  Shares:          {}", size.shares);
                println!("  Risk amount:     ${:.2}", size.risk_amount);
                println!("  Risk per share:  ${:.2}", request.risk_per_share());
                println!("  Position value:  ${:.2}", size.position_value);
                println!("  Of capital:      {:.2}%", size.percent_of_capital);
            }
            PositionSizeResult::Invalid => {
                println!("Cannot size: entry and stop are the same price");
            }
        },
    }

    Ok(())
}
