//! Error types for the trading desk.

use rust_decimal::Decimal;
use thiserror::Error;

/// Top-level error.
#[derive(Error, Debug)]
pub enum DeskError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Refresh error: {0}")]
    Refresh(#[from] RefreshError),

    #[error("Broker error: {0}")]
    Broker(#[from] BrokerError),

    #[error("Data error: {0}")]
    Data(#[from] DataError),
}

/// A request was malformed and rejected before any work started.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("symbol must not be empty")]
    EmptySymbol,

    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },

    #[error("{field} must be greater than zero, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("{field} must be in ({min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("invalid order: {0}")]
    InvalidOrder(String),
}

impl ValidationError {
    /// Reject NaN and infinities.
    pub fn require_finite(field: &'static str, value: f64) -> Result<f64, Self> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(Self::NotFinite { field })
        }
    }

    /// Require a finite value strictly above zero.
    pub fn require_positive(field: &'static str, value: f64) -> Result<f64, Self> {
        let value = Self::require_finite(field, value)?;
        if value > 0.0 {
            Ok(value)
        } else {
            Err(Self::NotPositive { field, value })
        }
    }

    /// Require a finite value at or above zero.
    pub fn require_non_negative(field: &'static str, value: f64) -> Result<f64, Self> {
        let value = Self::require_finite(field, value)?;
        if value < 0.0 {
            Err(Self::Negative { field, value })
        } else {
            Ok(value)
        }
    }
}

/// Refresh requests that could not be started.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RefreshError {
    #[error("refresh cycle {cycle} is still in progress")]
    AlreadyInProgress { cycle: u64 },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Quote data source errors.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("No data available")]
    NoDataAvailable,

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(#[from] ValidationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Paper broker errors.
#[derive(Error, Debug)]
pub enum BrokerError {
    #[error("Order rejected: {0}")]
    OrderRejected(String),

    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: Decimal, available: Decimal },

    #[error("Insufficient position in {symbol}: requested {requested}, held {held}")]
    InsufficientPosition {
        symbol: String,
        requested: Decimal,
        held: Decimal,
    },

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Invalid order: {0}")]
    InvalidOrder(#[from] ValidationError),
}

/// Result type alias for desk operations.
pub type DeskResult<T> = Result<T, DeskError>;
