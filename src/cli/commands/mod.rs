//! CLI command implementations.

pub mod order;
pub mod refresh;
pub mod signal;
pub mod size;
pub mod validate;

use anyhow::{Context, Result};
use std::path::Path;
use tradedesk_config::{load_config_or_default, AppConfig};

/// Load and validate the configuration, falling back to defaults when the
/// file does not exist.
pub(crate) fn load_settings(config_path: &Path) -> Result<AppConfig> {
    let config = load_config_or_default(config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path.display()))?;
    config.validate().context("Invalid configuration")?;
    Ok(config)
}
