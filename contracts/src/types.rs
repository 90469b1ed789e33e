//! Common types and protocol constants used across the points protocol.

use odra::prelude::*;
use odra::casper_types::{U128, U256, U512};
use crate::errors::ProtocolError;

/// Maximum loan-to-value in basis points (70% = 7000 bps)
pub const MAX_LTV_BPS: u64 = 7_000;
/// Annual loan interest in basis points (5% = 500 bps)
pub const INTEREST_RATE_BPS: u64 = 500;
/// Basis points scale (100% = 10000 bps)
pub const BPS_SCALE: u64 = 10_000;
/// One epoch is one day of block time
pub const MILLIS_PER_EPOCH: u64 = 86_400_000;
/// Epochs per year (365 days)
pub const EPOCHS_PER_YEAR: u64 = 365;
/// Shortest allowed stake
pub const MIN_STAKE_DURATION_DAYS: u64 = 1;
/// Longest allowed stake (4 years)
pub const MAX_STAKE_DURATION_DAYS: u64 = 1_460;
/// Native CSPR uses 9 decimals (motes)
pub const NATIVE_DECIMALS: u8 = 9;
/// Upper bound for oracle rate decimals
pub const MAX_RATE_DECIMALS: u8 = 18;

/// Asset that can be staked into the escrow vault
#[odra::odra_type]
#[derive(Copy, PartialOrd, Ord)]
pub enum AssetId {
    /// Native CSPR, attached to the call
    Cspr,
    /// CEP-18 staking token configured at deployment
    StakeToken,
}

/// Oracle exchange rate of one whole asset unit expressed in points.
///
/// The effective rate is `rate / 10^rate_decimals`.
#[odra::odra_type]
#[derive(Copy)]
pub struct RateSnapshot {
    /// Integer rate value
    pub rate: U128,
    /// Decimal places for `rate`
    pub rate_decimals: u8,
    /// Block time (ms) of the last update
    pub updated_at: u64,
}

/// Per-account points balance
#[odra::odra_type]
#[derive(Copy, Default)]
pub struct LedgerBalance {
    /// Spendable points
    pub available: U128,
    /// Points mirrored against outstanding loan principal
    pub locked: U128,
}

/// Lifecycle state of a live stake position
#[odra::odra_type]
#[derive(Copy)]
pub enum PositionState {
    /// Before unlock time
    Active,
    /// Unlock time reached, redeemable once unencumbered
    Matured,
}

/// Time-locked stake of an asset held in escrow
#[odra::odra_type]
pub struct StakePosition {
    /// Position id
    pub id: u64,
    /// Owner address
    pub owner: Address,
    /// Staked asset
    pub asset: AssetId,
    /// Staked amount in the asset's smallest unit
    pub principal: U256,
    /// Lock duration in days
    pub duration_days: u64,
    /// Block time (ms) at creation
    pub start_time: u64,
    /// Block time (ms) from which the position may be redeemed
    pub unlock_time: u64,
    /// Epoch at creation
    pub start_epoch: u64,
    /// Epoch at unlock time
    pub unlock_epoch: u64,
    /// Epoch up to which points have been credited
    pub last_claim_epoch: u64,
    /// True while an open loan references this position
    pub encumbered: bool,
}

/// Points loan backed by a stake position
#[odra::odra_type]
pub struct Loan {
    /// Loan id
    pub id: u64,
    /// Borrower address (owner of the backing position)
    pub borrower: Address,
    /// Backing position id
    pub position_id: u64,
    /// Borrowed points
    pub principal_points: u64,
    /// Position value in points when the loan was opened; interest base
    pub collateral_points: u64,
    /// Zero while the loan is stored; only the copy returned on repayment
    /// carries the settled interest, which `LoanRepaid` also reports
    pub interest_accrued: u64,
    /// Epoch the loan was opened
    pub opened_epoch: u64,
}

/// Snapshot of the global protocol configuration
#[odra::odra_type]
pub struct ConfigSnapshot {
    /// Global pause switch
    pub paused: bool,
    /// Current admin; capabilities are valid only while their auth key matches
    pub admin: Address,
    /// Points credited per whole asset unit per epoch, before the duration multiplier
    pub points_per_asset_per_epoch: u64,
}

/// Epoch index for a block time in milliseconds
pub fn epoch_at(block_time_ms: u64) -> u64 {
    block_time_ms / MILLIS_PER_EPOCH
}

/// Native attached value (U512 motes) to the escrow unit.
pub fn motes_to_u256(amount: U512) -> Result<U256, ProtocolError> {
    let mut bytes = [0u8; 64];
    amount.to_little_endian(&mut bytes);
    if bytes[32..].iter().any(|b| *b != 0) {
        return Err(ProtocolError::ArithmeticOverflow);
    }
    Ok(U256::from_little_endian(&bytes[..32]))
}

/// Escrow unit back to native motes for payout.
pub fn u256_to_motes(amount: U256) -> U512 {
    let mut bytes = [0u8; 32];
    amount.to_little_endian(&mut bytes);
    U512::from_little_endian(&bytes)
}

/// Narrow a U256 points value into the ledger's U128 unit.
pub fn u256_to_points(amount: U256) -> Result<U128, ProtocolError> {
    if amount > U256::from(u128::MAX) {
        return Err(ProtocolError::ArithmeticOverflow);
    }
    Ok(U128::from(amount.as_u128()))
}
