//! CLI definitions.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use std::path::PathBuf;
use tradedesk_core::types::{Side, TimeInForce};

#[derive(Parser)]
#[command(name = "tradedesk")]
#[command(author, version, about = "Watchlist quotes, composite signals, position sizing and paper orders")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Log level
    #[arg(short, long, default_value = "info")]
    pub log_level: LogLevel,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Refresh the watchlist from a quote snapshot
    Refresh(RefreshArgs),
    /// Classify a set of indicator values
    Signal(SignalArgs),
    /// Size a position from a risk budget
    Size(SizeArgs),
    /// Place a paper order against a quote snapshot
    Order(OrderArgs),
    /// Validate configuration
    ValidateConfig,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(clap::Args)]
pub struct RefreshArgs {
    /// Quote snapshot (CSV)
    #[arg(long)]
    pub data: PathBuf,

    /// Symbols to refresh (comma-separated); defaults to the configured watchlist
    #[arg(short = 'S', long, value_delimiter = ',')]
    pub symbols: Vec<String>,

    /// Keep refreshing on the configured interval until Ctrl-C
    #[arg(long)]
    pub watch: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

#[derive(clap::Args)]
pub struct SignalArgs {
    /// 14-period RSI
    #[arg(long)]
    pub rsi14: Option<f64>,

    /// MACD line
    #[arg(long, allow_hyphen_values = true)]
    pub macd: Option<f64>,

    /// MACD signal line
    #[arg(long, allow_hyphen_values = true)]
    pub macd_signal: Option<f64>,

    /// Last price
    #[arg(long)]
    pub price: Option<f64>,

    /// 20-period simple moving average
    #[arg(long)]
    pub sma20: Option<f64>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

#[derive(clap::Args)]
pub struct SizeArgs {
    /// Account capital; defaults to risk.account_capital
    #[arg(long)]
    pub capital: Option<f64>,

    /// Percent of capital to risk; defaults to risk.risk_percent
    #[arg(long)]
    pub risk_percent: Option<f64>,

    /// Planned entry price
    #[arg(long)]
    pub entry: f64,

    /// Stop-loss price
    #[arg(long)]
    pub stop: f64,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SideArg {
    Buy,
    Sell,
}

impl From<SideArg> for Side {
    fn from(side: SideArg) -> Self {
        match side {
            SideArg::Buy => Side::Buy,
            SideArg::Sell => Side::Sell,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum TifArg {
    Day,
    Gtc,
    Ioc,
    Fok,
}

impl From<TifArg> for TimeInForce {
    fn from(tif: TifArg) -> Self {
        match tif {
            TifArg::Day => TimeInForce::Day,
            TifArg::Gtc => TimeInForce::Gtc,
            TifArg::Ioc => TimeInForce::Ioc,
            TifArg::Fok => TimeInForce::Fok,
        }
    }
}

#[derive(clap::Args)]
pub struct OrderArgs {
    /// Quote snapshot (CSV) providing the fill price
    #[arg(long)]
    pub data: PathBuf,

    /// Symbol to trade
    #[arg(long)]
    pub symbol: String,

    /// Order side
    #[arg(long, value_enum)]
    pub side: SideArg,

    /// Share quantity
    #[arg(long, conflicts_with = "stop", required_unless_present = "stop")]
    pub quantity: Option<Decimal>,

    /// Size the order from the configured risk budget with this stop
    #[arg(long)]
    pub stop: Option<f64>,

    /// Limit price; market order when omitted
    #[arg(long)]
    pub limit_price: Option<Decimal>,

    /// Time in force
    #[arg(long, value_enum, default_value = "day")]
    pub tif: TifArg,
}
