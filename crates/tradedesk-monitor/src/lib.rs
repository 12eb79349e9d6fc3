//! Logging for the desk.

mod logging;

pub use logging::{setup_logging, LOG_FILE_PREFIX};
