//! Configuration management.

mod settings;

pub use settings::{
    AppConfig, AppSettings, LoggingConfig, PaperSettings, RefreshSettings, RiskSettings,
};

use config::{Config, ConfigError, Environment, File, FileFormat};
use std::path::Path;

const ENV_PREFIX: &str = "TRADEDESK";

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}

/// Load configuration from file and environment.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from(path).required(true))
        .add_source(environment())
        .build()?;

    config.try_deserialize()
}

/// Like [`load_config`], but a missing file yields the defaults
/// (still overridable from the environment).
pub fn load_config_or_default(path: &Path) -> Result<AppConfig, ConfigError> {
    if path.exists() {
        return load_config(path);
    }

    let config = Config::builder().add_source(environment()).build()?;
    config.try_deserialize()
}

/// Parse configuration from TOML text, without environment overrides.
pub fn parse_config(text: &str) -> Result<AppConfig, ConfigError> {
    Config::builder()
        .add_source(File::from_str(text, FileFormat::Toml))
        .build()?
        .try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::time::Duration;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.refresh.concurrency, 5);
        assert_eq!(config.refresh.fetch_timeout(), Duration::from_secs(10));
        assert_eq!(config.refresh.cache_ttl(), Duration::from_secs(300));
        assert_eq!(config.watchlist, vec!["AAPL", "MSFT", "GOOGL", "AMZN", "NVDA"]);
        assert_eq!(config.risk.account_capital, 100_000.0);
        assert_eq!(config.paper.initial_capital, dec!(100000));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.refresh.concurrency, 5);
        assert_eq!(config.watchlist.len(), 5);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_sections() {
        let config = parse_config(
            r#"
            watchlist = ["tsla", "amd"]

            [refresh]
            concurrency = 2
            cache_ttl_secs = 0

            [risk]
            risk_percent = 2.5
            max_shares = 500

            [logging]
            level = "debug"
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.watchlist, vec!["tsla", "amd"]);
        assert_eq!(config.refresh.concurrency, 2);
        assert_eq!(config.refresh.fetch_timeout_ms, 10_000);
        assert!(config.refresh.cache_ttl().is_zero());
        assert_eq!(config.risk.risk_percent, 2.5);
        assert_eq!(config.risk.account_capital, 100_000.0);
        assert_eq!(config.risk.max_shares, Some(500));
        assert!(config.logging.is_json());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.refresh.concurrency = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.risk.risk_percent = 150.0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.risk.account_capital = 0.0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.watchlist.push("  ".into());
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.paper.slippage_pct = dec!(-1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = load_config_or_default(Path::new("no/such/config.toml")).unwrap();
        assert_eq!(config.app.name, "tradedesk");
        assert!(load_config(Path::new("no/such/config.toml")).is_err());
    }

    #[test]
    fn test_sizer_caps_from_settings() {
        use tradedesk_risk::PositionSizeRequest;

        let mut config = AppConfig::default();
        config.risk.max_shares = Some(50);
        let request = PositionSizeRequest::new(100_000.0, 1.0, 50.0, 45.0);
        let result = config.risk.sizer().size(&request).unwrap();
        assert_eq!(result.shares(), Some(50));
    }
}
