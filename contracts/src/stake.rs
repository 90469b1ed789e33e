//! Stake positions.
//!
//! ## Lifecycle
//!
//! 1. `create`: principal is already in escrow, position starts `Active`
//! 2. `claim`: credits whole epochs since the last checkpoint, any state
//! 3. Unlock time passes: position reads as `Matured`
//! 4. `redeem`: settles pending points, deletes the position; the caller
//!    returns the principal from escrow
//!
//! `encumbered` is orthogonal to the state and blocks redemption while a loan
//! references the position. Accrual continues after maturity until redeemed.

use odra::prelude::*;
use odra::casper_types::{U128, U256};
use crate::errors::ProtocolError;
use crate::events::{StakeCreated, StakeRedeemed};
use crate::interest::{accrued_points, points_per_epoch};
use crate::types::{
    epoch_at, u256_to_points, AssetId, PositionState, StakePosition, MAX_STAKE_DURATION_DAYS,
    MILLIS_PER_EPOCH, MIN_STAKE_DURATION_DAYS,
};

/// Reward parameters needed to value a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccrualParams {
    /// Points per whole asset unit per epoch
    pub points_per_asset_per_epoch: u64,
    /// Decimals of the position's asset
    pub asset_decimals: u8,
}

/// Stake position book sub-module
#[odra::module(events = [StakeCreated, StakeRedeemed])]
pub struct StakeBook {
    /// Positions by id; `None` once redeemed
    positions: Mapping<u64, Option<StakePosition>>,
    /// Next position id (starts at 1)
    next_position_id: Var<u64>,
    /// Principal of live positions per asset
    total_principal: Mapping<AssetId, U256>,
    /// Number of live positions
    open_positions: Var<u64>,
}

impl StakeBook {
    // ========== Reads ==========

    pub fn get(&self, position_id: u64) -> Option<StakePosition> {
        self.positions.get(&position_id).flatten()
    }

    pub fn total_principal(&self, asset: AssetId) -> U256 {
        self.total_principal.get(&asset).unwrap_or_default()
    }

    pub fn open_positions(&self) -> u64 {
        self.open_positions.get_or_default()
    }

    pub fn state(&self, position_id: u64) -> Result<PositionState, ProtocolError> {
        let position = self.get(position_id).ok_or(ProtocolError::PositionNotFound)?;
        Ok(position_state(&position, self.env().get_block_time()))
    }

    /// Live position owned by `caller`.
    pub fn owned_by(&self, position_id: u64, caller: Address) -> Result<StakePosition, ProtocolError> {
        let position = self.get(position_id).ok_or(ProtocolError::PositionNotFound)?;
        if position.owner != caller {
            return Err(ProtocolError::NotPositionOwner);
        }
        Ok(position)
    }

    /// Points claimable right now, without writing a checkpoint.
    pub fn pending_points(
        &self,
        position_id: u64,
        params: AccrualParams,
    ) -> Result<U128, ProtocolError> {
        let position = self.get(position_id).ok_or(ProtocolError::PositionNotFound)?;
        pending_points(&position, params, self.current_epoch())
    }

    pub fn current_epoch(&self) -> u64 {
        epoch_at(self.env().get_block_time())
    }

    // ========== Mutations ==========

    /// Record a new position. The principal must already be held in escrow.
    pub fn create(
        &mut self,
        owner: Address,
        asset: AssetId,
        principal: U256,
        duration_days: u64,
    ) -> Result<StakePosition, ProtocolError> {
        if principal.is_zero() {
            return Err(ProtocolError::ZeroAmount);
        }
        validate_duration(duration_days)?;

        let now = self.env().get_block_time();
        let unlock_time = duration_days
            .checked_mul(MILLIS_PER_EPOCH)
            .and_then(|lock| now.checked_add(lock))
            .ok_or(ProtocolError::ArithmeticOverflow)?;
        let start_epoch = epoch_at(now);

        let id = self.next_position_id.get().unwrap_or(1);
        self.next_position_id.set(id.saturating_add(1));

        let position = StakePosition {
            id,
            owner,
            asset,
            principal,
            duration_days,
            start_time: now,
            unlock_time,
            start_epoch,
            unlock_epoch: epoch_at(unlock_time),
            last_claim_epoch: start_epoch,
            encumbered: false,
        };
        self.positions.set(&id, Some(position.clone()));

        let total = self
            .total_principal(asset)
            .checked_add(principal)
            .ok_or(ProtocolError::ArithmeticOverflow)?;
        self.total_principal.set(&asset, total);
        let open = self.open_positions().saturating_add(1);
        self.open_positions.set(open);

        self.env().emit_event(StakeCreated {
            position_id: id,
            owner,
            asset,
            principal,
            duration_days,
            unlock_time,
        });
        Ok(position)
    }

    /// Advance the claim checkpoint of `caller`'s position to the current
    /// epoch and return the points earned since the previous checkpoint.
    ///
    /// Claiming twice in the same epoch returns zero.
    pub fn claim(
        &mut self,
        position_id: u64,
        caller: Address,
        params: AccrualParams,
    ) -> Result<U128, ProtocolError> {
        let mut position = self.owned_by(position_id, caller)?;
        let current_epoch = self.current_epoch();
        let earned = pending_points(&position, params, current_epoch)?;

        if current_epoch > position.last_claim_epoch {
            position.last_claim_epoch = current_epoch;
            self.positions.set(&position_id, Some(position));
        }
        Ok(earned)
    }

    /// Flag the position as loan collateral.
    pub fn encumber(&mut self, position_id: u64) -> Result<(), ProtocolError> {
        let mut position = self.get(position_id).ok_or(ProtocolError::PositionNotFound)?;
        if position.encumbered {
            return Err(ProtocolError::PositionEncumbered);
        }
        position.encumbered = true;
        self.positions.set(&position_id, Some(position));
        Ok(())
    }

    /// Clear the collateral flag after the backing loan is repaid.
    pub fn release(&mut self, position_id: u64) -> Result<(), ProtocolError> {
        let mut position = self.get(position_id).ok_or(ProtocolError::PositionNotFound)?;
        position.encumbered = false;
        self.positions.set(&position_id, Some(position));
        Ok(())
    }

    /// Close a matured, unencumbered position.
    ///
    /// Returns the closed position and the points still owed for it. The
    /// caller is responsible for crediting those points and paying the
    /// principal out of escrow.
    pub fn redeem(
        &mut self,
        position_id: u64,
        caller: Address,
        params: AccrualParams,
    ) -> Result<(StakePosition, U128), ProtocolError> {
        let position = self.owned_by(position_id, caller)?;
        if position.encumbered {
            return Err(ProtocolError::PositionEncumbered);
        }
        if position_state(&position, self.env().get_block_time()) != PositionState::Matured {
            return Err(ProtocolError::NotMature);
        }

        let settled = pending_points(&position, params, self.current_epoch())?;

        self.positions.set(&position_id, None);
        let total = self
            .total_principal(position.asset)
            .checked_sub(position.principal)
            .ok_or(ProtocolError::ArithmeticOverflow)?;
        self.total_principal.set(&position.asset, total);
        let open = self.open_positions().saturating_sub(1);
        self.open_positions.set(open);

        self.env().emit_event(StakeRedeemed {
            position_id,
            owner: position.owner,
            asset: position.asset,
            principal: position.principal,
        });
        Ok((position, settled))
    }
}

/// Durations are whole days in `[1, 1460]`.
pub fn validate_duration(duration_days: u64) -> Result<(), ProtocolError> {
    if !(MIN_STAKE_DURATION_DAYS..=MAX_STAKE_DURATION_DAYS).contains(&duration_days) {
        return Err(ProtocolError::InvalidDuration);
    }
    Ok(())
}

pub fn position_state(position: &StakePosition, now: u64) -> PositionState {
    if now >= position.unlock_time {
        PositionState::Matured
    } else {
        PositionState::Active
    }
}

/// Points owed to `position` at `current_epoch`.
pub fn pending_points(
    position: &StakePosition,
    params: AccrualParams,
    current_epoch: u64,
) -> Result<U128, ProtocolError> {
    let per_epoch = points_per_epoch(
        position.principal,
        params.asset_decimals,
        params.points_per_asset_per_epoch,
        position.duration_days,
    )?;
    let earned = accrued_points(per_epoch, position.last_claim_epoch, current_epoch)?;
    u256_to_points(earned)
}
