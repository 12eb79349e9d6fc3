//! Logging setup.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// File name prefix for the rolling log file.
pub const LOG_FILE_PREFIX: &str = "tradedesk.log";

/// Setup logging with the given level.
///
/// `RUST_LOG` overrides `level` when set. With `log_dir`, events are also
/// written as JSON to a daily-rolling file in that directory; keep the
/// returned guard alive until exit so buffered lines are flushed.
pub fn setup_logging(level: &str, json: bool, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stdout = if json {
        fmt::layer().json().boxed()
    } else {
        fmt::layer().pretty().boxed()
    };

    let (file, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().json().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout)
        .with(file)
        .init();

    guard
}
