//! Validate configuration command.

use anyhow::Result;
use std::path::Path;
use tradedesk_config::load_config;

pub async fn run(config_path: &Path) -> Result<()> {
    println!("Validating configuration: {:?}", config_path);

    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            println!("Configuration error: {}", e);
            return Err(e.into());
        }
    };

    if let Err(e) = config.validate() {
        println!("Configuration error: {}", e);
        return Err(e.into());
    }

    println!("Configuration is valid!");
    println!();
    println!("App: {}", config.app.name);
    println!("Environment: {}", config.app.environment);
    println!("Log level: {}", config.logging.level);
    println!("Watchlist: {}", config.watchlist.join(", "));
    println!(
        "Refresh: concurrency {}, timeout {}ms, cache {}s, every {}s",
        config.refresh.concurrency,
        config.refresh.fetch_timeout_ms,
        config.refresh.cache_ttl_secs,
        config.refresh.auto_refresh_secs
    );
    println!(
        "Risk: {}% of ${}",
        config.risk.risk_percent, config.risk.account_capital
    );
    println!(
        "Paper: ${} capital, {}% slippage",
        config.paper.initial_capital, config.paper.slippage_pct
    );

    Ok(())
}
