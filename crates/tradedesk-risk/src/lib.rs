//! Risk-based position sizing.
//!
//! Converts an account-risk budget and a stop-loss distance into a share
//! quantity.

mod position_sizer;

pub use position_sizer::{
    size_position, PositionSize, PositionSizeRequest, PositionSizeResult, PositionSizer,
};
