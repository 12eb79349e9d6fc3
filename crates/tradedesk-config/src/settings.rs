//! Configuration structures.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tradedesk_core::error::{DeskError, DeskResult};
use tradedesk_risk::PositionSizer;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub refresh: RefreshSettings,
    #[serde(default = "default_watchlist")]
    pub watchlist: Vec<String>,
    #[serde(default)]
    pub risk: RiskSettings,
    #[serde(default)]
    pub paper: PaperSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app: AppSettings::default(),
            logging: LoggingConfig::default(),
            refresh: RefreshSettings::default(),
            watchlist: default_watchlist(),
            risk: RiskSettings::default(),
            paper: PaperSettings::default(),
        }
    }
}

fn default_watchlist() -> Vec<String> {
    ["AAPL", "MSFT", "GOOGL", "AMZN", "NVDA"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl AppConfig {
    /// Reject settings the desk cannot run with.
    pub fn validate(&self) -> DeskResult<()> {
        if self.refresh.concurrency == 0 {
            return Err(invalid("refresh.concurrency", "must be at least 1"));
        }
        if self.refresh.fetch_timeout_ms == 0 {
            return Err(invalid("refresh.fetch_timeout_ms", "must be positive"));
        }
        if self.watchlist.iter().any(|s| s.trim().is_empty()) {
            return Err(invalid("watchlist", "contains a blank symbol"));
        }
        if !(self.risk.account_capital.is_finite() && self.risk.account_capital > 0.0) {
            return Err(invalid("risk.account_capital", "must be positive"));
        }
        if !(self.risk.risk_percent > 0.0 && self.risk.risk_percent <= 100.0) {
            return Err(invalid("risk.risk_percent", "must be in (0, 100]"));
        }
        if matches!(self.risk.max_position_value, Some(v) if !(v.is_finite() && v > 0.0)) {
            return Err(invalid("risk.max_position_value", "must be positive"));
        }
        if self.paper.initial_capital <= Decimal::ZERO {
            return Err(invalid("paper.initial_capital", "must be positive"));
        }
        if self.paper.slippage_pct < Decimal::ZERO {
            return Err(invalid("paper.slippage_pct", "must not be negative"));
        }
        Ok(())
    }
}

fn invalid(key: &str, reason: &str) -> DeskError {
    DeskError::Config(format!("{} {}", key, reason))
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "tradedesk".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    /// Directory for a daily-rolling log file, in addition to stdout.
    pub file: Option<String>,
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

/// Watchlist refresh settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshSettings {
    /// Fetches in flight per cycle.
    pub concurrency: usize,
    pub fetch_timeout_ms: u64,
    /// Cache lifetime for successful quotes; 0 disables the cache.
    pub cache_ttl_secs: u64,
    pub auto_refresh_secs: u64,
}

impl RefreshSettings {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn auto_refresh_period(&self) -> Duration {
        Duration::from_secs(self.auto_refresh_secs)
    }
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            concurrency: 5,
            fetch_timeout_ms: 10_000,
            cache_ttl_secs: 300,
            auto_refresh_secs: 60,
        }
    }
}

/// Risk management settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskSettings {
    pub account_capital: f64,
    pub risk_percent: f64,
    pub max_shares: Option<u64>,
    pub max_position_value: Option<f64>,
}

impl RiskSettings {
    /// Sizer carrying the configured caps.
    pub fn sizer(&self) -> PositionSizer {
        let mut sizer = PositionSizer::new();
        if let Some(max) = self.max_shares {
            sizer = sizer.with_max_shares(max);
        }
        if let Some(max) = self.max_position_value {
            sizer = sizer.with_max_position_value(max);
        }
        sizer
    }
}

impl Default for RiskSettings {
    fn default() -> Self {
        Self {
            account_capital: 100_000.0,
            risk_percent: 1.0,
            max_shares: None,
            max_position_value: None,
        }
    }
}

/// Paper trading settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaperSettings {
    pub initial_capital: Decimal,
    pub slippage_pct: Decimal,
}

impl Default for PaperSettings {
    fn default() -> Self {
        Self {
            initial_capital: dec!(100000),
            slippage_pct: Decimal::ZERO,
        }
    }
}
