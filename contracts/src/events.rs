//! Events emitted by the points protocol.

use odra::prelude::*;
use odra::casper_types::{U128, U256};
use crate::types::AssetId;

// ========== Configuration ==========

#[odra::event]
pub struct PauseStateChanged {
    pub paused: bool,
    pub by: Address,
}

#[odra::event]
pub struct PointsRateChanged {
    pub old_rate: u64,
    pub new_rate: u64,
}

#[odra::event]
pub struct GovernCapTransferred {
    pub cap_id: u64,
    pub from: Address,
    pub to: Address,
}

#[odra::event]
pub struct OracleCapTransferred {
    pub cap_id: u64,
    pub from: Address,
    pub to: Address,
}

#[odra::event]
pub struct OracleCapIssued {
    pub cap_id: u64,
    pub holder: Address,
}

#[odra::event]
pub struct AdminRotated {
    pub old_admin: Address,
    pub new_admin: Address,
    pub govern_cap_id: u64,
    pub oracle_cap_id: u64,
}

// ========== Oracle ==========

#[odra::event]
pub struct RateUpdated {
    pub asset: AssetId,
    pub rate: U128,
    pub rate_decimals: u8,
    pub updated_at: u64,
}

// ========== Ledger ==========

#[odra::event]
pub struct Earned {
    pub user: Address,
    pub amount: U128,
}

#[odra::event]
pub struct Spent {
    pub user: Address,
    pub amount: U128,
}

#[odra::event]
pub struct Locked {
    pub user: Address,
    pub amount: U128,
}

#[odra::event]
pub struct Unlocked {
    pub user: Address,
    pub amount: U128,
}

// ========== Stakes ==========

#[odra::event]
pub struct StakeCreated {
    pub position_id: u64,
    pub owner: Address,
    pub asset: AssetId,
    pub principal: U256,
    pub duration_days: u64,
    pub unlock_time: u64,
}

#[odra::event]
pub struct StakeRedeemed {
    pub position_id: u64,
    pub owner: Address,
    pub asset: AssetId,
    pub principal: U256,
}

// ========== Loans ==========

#[odra::event]
pub struct LoanOpened {
    pub loan_id: u64,
    pub borrower: Address,
    pub position_id: u64,
    pub principal_points: u64,
    pub collateral_points: u64,
    pub opened_epoch: u64,
}

#[odra::event]
pub struct LoanRepaid {
    pub loan_id: u64,
    pub borrower: Address,
    pub position_id: u64,
    pub principal_points: u64,
    pub interest_accrued: u64,
}
