//! Rate oracle.
//!
//! Stores one `RateSnapshot` per stakeable asset: the number of points one
//! whole asset unit is worth, as `rate / 10^rate_decimals`. Writes are gated
//! by an `OracleCap` at the contract boundary; this module only validates and
//! stores.

use odra::prelude::*;
use odra::casper_types::{U128, U256};
use crate::errors::ProtocolError;
use crate::events::RateUpdated;
use crate::types::{AssetId, RateSnapshot, MAX_RATE_DECIMALS};

/// Rate oracle sub-module
#[odra::module(events = [RateUpdated])]
pub struct RateOracle {
    /// Latest snapshot per asset
    rates: Mapping<AssetId, RateSnapshot>,
}

impl RateOracle {
    /// Latest snapshot for `asset`.
    pub fn snapshot(&self, asset: AssetId) -> Result<RateSnapshot, ProtocolError> {
        self.rates.get(&asset).ok_or(ProtocolError::UnsupportedAsset)
    }

    /// Replace the snapshot for `asset`.
    pub fn update_rate(
        &mut self,
        asset: AssetId,
        rate: U128,
        rate_decimals: u8,
    ) -> Result<RateSnapshot, ProtocolError> {
        validate_rate(rate, rate_decimals)?;
        let snapshot = RateSnapshot {
            rate,
            rate_decimals,
            updated_at: self.env().get_block_time(),
        };
        self.rates.set(&asset, snapshot);
        self.env().emit_event(RateUpdated {
            asset,
            rate,
            rate_decimals,
            updated_at: snapshot.updated_at,
        });
        Ok(snapshot)
    }

    /// Value of `amount` smallest units of `asset` in points at the current rate.
    pub fn value_in_points(
        &self,
        asset: AssetId,
        amount: U256,
        asset_decimals: u8,
    ) -> Result<U256, ProtocolError> {
        let snapshot = self.snapshot(asset)?;
        value_in_points(amount, asset_decimals, &snapshot)
    }
}

/// Rates must be positive and carry at most 18 decimals.
pub fn validate_rate(rate: U128, rate_decimals: u8) -> Result<(), ProtocolError> {
    if rate.is_zero() || rate_decimals > MAX_RATE_DECIMALS {
        return Err(ProtocolError::InvalidRate);
    }
    Ok(())
}

/// `floor(amount * rate / (10^asset_decimals * 10^rate_decimals))`
pub fn value_in_points(
    amount: U256,
    asset_decimals: u8,
    snapshot: &RateSnapshot,
) -> Result<U256, ProtocolError> {
    let scale = U256::from(10u64)
        .checked_pow(U256::from(asset_decimals as u64 + snapshot.rate_decimals as u64))
        .ok_or(ProtocolError::ArithmeticOverflow)?;

    amount
        .checked_mul(U256::from(snapshot.rate.as_u128()))
        .and_then(|v| v.checked_div(scale))
        .ok_or(ProtocolError::ArithmeticOverflow)
}
