//! Position sizing from a risk budget.

use serde::{Deserialize, Serialize};
use tracing::debug;
use tradedesk_core::error::ValidationError;

/// How much to risk on one trade and where the stop sits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionSizeRequest {
    /// Account capital, > 0
    pub account_capital: f64,
    /// Percent of capital at risk, in (0, 100]
    pub risk_percent: f64,
    /// Planned entry price, > 0
    pub entry_price: f64,
    /// Stop-loss price, >= 0
    pub stop_price: f64,
}

impl PositionSizeRequest {
    pub fn new(account_capital: f64, risk_percent: f64, entry_price: f64, stop_price: f64) -> Self {
        Self {
            account_capital,
            risk_percent,
            entry_price,
            stop_price,
        }
    }

    /// Reject malformed requests before any computation.
    pub fn validate(&self) -> Result<(), ValidationError> {
        ValidationError::require_positive("account capital", self.account_capital)?;
        let risk = ValidationError::require_finite("risk percent", self.risk_percent)?;
        if risk <= 0.0 || risk > 100.0 {
            return Err(ValidationError::OutOfRange {
                field: "risk percent",
                value: risk,
                min: 0.0,
                max: 100.0,
            });
        }
        ValidationError::require_positive("entry price", self.entry_price)?;
        ValidationError::require_non_negative("stop price", self.stop_price)?;
        Ok(())
    }

    /// Capital at risk: `capital * (risk% / 100)`, never more than the capital.
    pub fn risk_amount(&self) -> f64 {
        self.account_capital * (self.risk_percent / 100.0)
    }

    /// Distance between entry and stop.
    pub fn risk_per_share(&self) -> f64 {
        (self.entry_price - self.stop_price).abs()
    }
}

/// A sized position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionSize {
    pub shares: u64,
    /// Risk budget the size was derived from
    pub risk_amount: f64,
    /// `shares * entry_price`
    pub position_value: f64,
    /// Position value as a percent of account capital
    pub percent_of_capital: f64,
}

/// Sizing outcome for a well-formed request.
///
/// `Invalid` is an expected result (no distance between entry and stop), not
/// an error; malformed requests are reported as [`ValidationError`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PositionSizeResult {
    Sized(PositionSize),
    Invalid,
}

impl PositionSizeResult {
    pub fn shares(&self) -> Option<u64> {
        match self {
            PositionSizeResult::Sized(size) => Some(size.shares),
            PositionSizeResult::Invalid => None,
        }
    }
}

/// Largest share count a sized position can report.
const MAX_SHARES: f64 = u64::MAX as f64;

/// Position sizer with optional caps.
///
/// The default sizer applies no caps.
#[derive(Debug, Clone, Default)]
pub struct PositionSizer {
    max_shares: Option<u64>,
    max_position_value: Option<f64>,
}

impl PositionSizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum shares per position.
    pub fn with_max_shares(mut self, max: u64) -> Self {
        self.max_shares = Some(max);
        self
    }

    /// Set maximum position value.
    pub fn with_max_position_value(mut self, max: f64) -> Self {
        self.max_position_value = Some(max);
        self
    }

    /// Calculate position size.
    pub fn size(&self, req: &PositionSizeRequest) -> Result<PositionSizeResult, ValidationError> {
        req.validate()?;

        let risk_amount = req.risk_amount();
        let price_diff = req.risk_per_share();

        if price_diff <= 0.0 {
            debug!(
                entry = req.entry_price,
                stop = req.stop_price,
                "stop equals entry, cannot size"
            );
            return Ok(PositionSizeResult::Invalid);
        }

        let mut shares = (risk_amount / price_diff).floor().max(0.0);

        if let Some(max) = self.max_shares {
            shares = shares.min(max as f64);
        }

        if let Some(max_value) = self.max_position_value {
            shares = shares.min((max_value / req.entry_price).floor().max(0.0));
        }

        // A tiny stop distance can size past what a share count can hold
        if !shares.is_finite() || shares >= MAX_SHARES {
            return Err(ValidationError::OutOfRange {
                field: "shares",
                value: shares,
                min: 0.0,
                max: MAX_SHARES,
            });
        }

        let shares = shares as u64;
        let position_value = shares as f64 * req.entry_price;

        Ok(PositionSizeResult::Sized(PositionSize {
            shares,
            risk_amount,
            position_value,
            percent_of_capital: position_value / req.account_capital * 100.0,
        }))
    }
}

/// Size a position with no caps.
pub fn size_position(req: &PositionSizeRequest) -> Result<PositionSizeResult, ValidationError> {
    PositionSizer::default().size(req)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sized(result: PositionSizeResult) -> PositionSize {
        match result {
            PositionSizeResult::Sized(size) => size,
            PositionSizeResult::Invalid => panic!("expected a sized position"),
        }
    }

    #[test]
    fn test_risk_based() {
        // Risk 1% = $1000, stop $5 away = 200 shares
        let req = PositionSizeRequest::new(100_000.0, 1.0, 150.0, 145.0);
        let size = sized(size_position(&req).unwrap());

        assert_eq!(size.shares, 200);
        assert_eq!(size.risk_amount, 1000.0);
        assert_eq!(size.position_value, 30_000.0);
        assert!((size.percent_of_capital - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_stop_above_entry_uses_distance() {
        // Short-side stop: distance is still 5
        let req = PositionSizeRequest::new(100_000.0, 1.0, 150.0, 155.0);
        assert_eq!(size_position(&req).unwrap().shares(), Some(200));
    }

    #[test]
    fn test_stop_equal_to_entry_is_invalid() {
        let req = PositionSizeRequest::new(100_000.0, 1.0, 150.0, 150.0);
        assert_eq!(size_position(&req), Ok(PositionSizeResult::Invalid));
    }

    #[test]
    fn test_rounds_down_and_allows_zero() {
        // $10 budget, $7 distance = 1.43 shares -> 1
        let req = PositionSizeRequest::new(1000.0, 1.0, 50.0, 43.0);
        assert_eq!(size_position(&req).unwrap().shares(), Some(1));

        // $1 budget, $40 distance -> 0 shares, still a sized result
        let req = PositionSizeRequest::new(100.0, 1.0, 50.0, 10.0);
        let size = sized(size_position(&req).unwrap());
        assert_eq!(size.shares, 0);
        assert_eq!(size.risk_amount, 1.0);
    }

    #[test]
    fn test_validation_is_distinct_from_invalid() {
        let cases = [
            PositionSizeRequest::new(0.0, 1.0, 150.0, 145.0),
            PositionSizeRequest::new(-5.0, 1.0, 150.0, 145.0),
            PositionSizeRequest::new(100_000.0, 0.0, 150.0, 145.0),
            PositionSizeRequest::new(100_000.0, 100.5, 150.0, 145.0),
            PositionSizeRequest::new(100_000.0, 1.0, 0.0, 0.0),
            PositionSizeRequest::new(100_000.0, 1.0, 150.0, -1.0),
            PositionSizeRequest::new(f64::NAN, 1.0, 150.0, 145.0),
        ];
        for req in cases {
            assert!(size_position(&req).is_err(), "{:?} should be rejected", req);
        }

        // Full risk and a zero stop are allowed
        let req = PositionSizeRequest::new(10_000.0, 100.0, 50.0, 0.0);
        assert_eq!(size_position(&req).unwrap().shares(), Some(200));
    }

    #[test]
    fn test_out_of_range_error_message() {
        let req = PositionSizeRequest::new(100_000.0, 150.0, 150.0, 145.0);
        let err = size_position(&req).unwrap_err();
        assert_eq!(err.to_string(), "risk percent must be in (0, 100], got 150");
    }

    #[test]
    fn test_large_capital_keeps_risk_finite() {
        let req = PositionSizeRequest::new(1e307, 50.0, 150.0, 145.0);
        assert_eq!(req.risk_amount(), 5e306);

        // Uncapped, the share count cannot be represented
        assert!(matches!(
            size_position(&req),
            Err(ValidationError::OutOfRange { field: "shares", .. })
        ));

        let size = sized(PositionSizer::new().with_max_shares(1_000).size(&req).unwrap());
        assert_eq!(size.shares, 1_000);
        assert_eq!(size.risk_amount, 5e306);
        assert!(size.percent_of_capital.is_finite());
    }

    #[test]
    fn test_tiny_stop_distance_rejected() {
        let req = PositionSizeRequest::new(100_000.0, 1.0, 1e-300, 0.0);
        assert!(size_position(&req).is_err());
    }

    #[test]
    fn test_caps() {
        let req = PositionSizeRequest::new(100_000.0, 1.0, 150.0, 145.0);

        let capped = PositionSizer::new().with_max_shares(50).size(&req).unwrap();
        assert_eq!(capped.shares(), Some(50));

        // $15,000 cap at $150 = 100 shares
        let capped = PositionSizer::new()
            .with_max_position_value(15_000.0)
            .size(&req)
            .unwrap();
        let size = sized(capped);
        assert_eq!(size.shares, 100);
        assert_eq!(size.risk_amount, 1000.0);
    }
}
