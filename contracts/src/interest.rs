//! Interest and points accrual model.
//!
//! Everything here is integer math over whole epochs:
//! - Loan interest is simple (non-compounding), truncated toward zero
//! - Stake rewards are a flat per-epoch rate scaled by a duration multiplier
//! - Truncation always rounds in the protocol's favour

use odra::casper_types::U256;
use crate::errors::ProtocolError;
use crate::types::{BPS_SCALE, EPOCHS_PER_YEAR, INTEREST_RATE_BPS};

/// Multiplier for stakes shorter than 30 days (1.00x)
pub const BASE_MULTIPLIER_BPS: u64 = 10_000;

/// Duration tiers as `(minimum days, multiplier bps)`, longest first
const MULTIPLIER_TIERS: [(u64, u64); 4] = [
    (365, 20_000),
    (180, 17_500),
    (90, 15_000),
    (30, 12_500),
];

/// Reward multiplier for a stake of `duration_days`.
pub fn duration_multiplier_bps(duration_days: u64) -> u64 {
    MULTIPLIER_TIERS
        .iter()
        .find(|(min_days, _)| duration_days >= *min_days)
        .map(|(_, bps)| *bps)
        .unwrap_or(BASE_MULTIPLIER_BPS)
}

/// Simple interest owed on `principal` points after `elapsed_epochs`.
///
/// `principal * INTEREST_RATE_BPS * elapsed / (BPS_SCALE * EPOCHS_PER_YEAR)`
pub fn calculate_interest(principal: u64, elapsed_epochs: u64) -> Result<u64, ProtocolError> {
    if principal == 0 || elapsed_epochs == 0 {
        return Ok(0);
    }

    let interest = U256::from(principal)
        .checked_mul(U256::from(INTEREST_RATE_BPS))
        .and_then(|v| v.checked_mul(U256::from(elapsed_epochs)))
        .and_then(|v| v.checked_div(U256::from(BPS_SCALE * EPOCHS_PER_YEAR)))
        .ok_or(ProtocolError::ArithmeticOverflow)?;

    if interest > U256::from(u64::MAX) {
        return Err(ProtocolError::ArithmeticOverflow);
    }
    Ok(interest.as_u64())
}

/// Points a position earns per epoch.
///
/// `principal * points_per_asset_per_epoch * multiplier / (10^asset_decimals * BPS_SCALE)`
pub fn points_per_epoch(
    principal: U256,
    asset_decimals: u8,
    points_per_asset_per_epoch: u64,
    duration_days: u64,
) -> Result<U256, ProtocolError> {
    let unit = U256::from(10u64)
        .checked_pow(U256::from(asset_decimals))
        .ok_or(ProtocolError::ArithmeticOverflow)?;

    principal
        .checked_mul(U256::from(points_per_asset_per_epoch))
        .and_then(|v| v.checked_mul(U256::from(duration_multiplier_bps(duration_days))))
        .and_then(|v| v.checked_div(unit))
        .and_then(|v| v.checked_div(U256::from(BPS_SCALE)))
        .ok_or(ProtocolError::ArithmeticOverflow)
}

/// Points owed for the epochs in `(last_claim_epoch, current_epoch]`.
///
/// Zero when no full epoch has passed since the last claim.
pub fn accrued_points(
    per_epoch: U256,
    last_claim_epoch: u64,
    current_epoch: u64,
) -> Result<U256, ProtocolError> {
    if current_epoch <= last_claim_epoch {
        return Ok(U256::zero());
    }
    per_epoch
        .checked_mul(U256::from(current_epoch - last_claim_epoch))
        .ok_or(ProtocolError::ArithmeticOverflow)
}

/// Largest loan a collateral value supports at `ltv_bps`.
pub fn max_borrowable(value_in_points: U256, ltv_bps: u64) -> Result<U256, ProtocolError> {
    value_in_points
        .checked_mul(U256::from(ltv_bps))
        .and_then(|v| v.checked_div(U256::from(BPS_SCALE)))
        .ok_or(ProtocolError::ArithmeticOverflow)
}
