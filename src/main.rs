//! Trading desk CLI application.

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;
use tradedesk_config::load_config_or_default;
use tradedesk_monitor::setup_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging; the file sink and format come from the config when it loads
    let logging = load_config_or_default(&cli.config)
        .map(|config| config.logging)
        .unwrap_or_default();
    let _log_guard = setup_logging(
        cli.log_level.as_str(),
        cli.json_logs || logging.is_json(),
        logging.file.as_deref().map(Path::new),
    );

    // Execute command
    match cli.command {
        Commands::Refresh(args) => cli::commands::refresh::run(args, &cli.config).await,
        Commands::Signal(args) => cli::commands::signal::run(args).await,
        Commands::Size(args) => cli::commands::size::run(args, &cli.config).await,
        Commands::Order(args) => cli::commands::order::run(args, &cli.config).await,
        Commands::ValidateConfig => cli::commands::validate::run(&cli.config).await,
    }
}
