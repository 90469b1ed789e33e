//! Points protocol contract.
//!
//! The single deployable entry point. It composes the component sub-modules
//! and owns no state of its own. Every mutating operation checks the pause
//! switch before touching state; `set_pause_state` alone is exempt so the
//! protocol can be unpaused.
//!
//! Components return `Result<_, ProtocolError>`; this module turns errors into
//! reverts, which discard every write and event of the call. Fatal (9xx)
//! errors are also passed to `log::error!`, which only prints on a host with
//! a logger installed; on chain the 9xx revert code itself is the alert.

use odra::prelude::*;
use odra::casper_types::{U128, U256};
use crate::config::{AuthorizedBy, GovernCap, OracleCap, ProtocolConfig};
use crate::errors::ProtocolError;
use crate::escrow::EscrowVault;
use crate::interest::max_borrowable;
use crate::ledger::Ledger;
use crate::loan::{total_due, LoanBook};
use crate::oracle::RateOracle;
use crate::stake::{AccrualParams, StakeBook};
use crate::types::{
    epoch_at, motes_to_u256, AssetId, ConfigSnapshot, Loan, PositionState, RateSnapshot,
    StakePosition, MAX_LTV_BPS,
};

/// Points protocol - main entry point
#[odra::module]
pub struct PointsProtocol {
    config: SubModule<ProtocolConfig>,
    oracle: SubModule<RateOracle>,
    escrow: SubModule<EscrowVault>,
    ledger: SubModule<Ledger>,
    stakes: SubModule<StakeBook>,
    loans: SubModule<LoanBook>,
}

#[odra::module]
impl PointsProtocol {
    /// Initialize the protocol. The deployer becomes admin and receives
    /// governance capability #1 and oracle capability #1.
    ///
    /// # Arguments
    /// * `points_per_asset_per_epoch` - Base reward per whole asset unit per epoch
    /// * `initial_rate` / `initial_rate_decimals` - Points per whole asset unit
    /// * `stake_token` - Optional CEP-18 token accepted as a second stake asset
    /// * `stake_token_decimals` - Decimals of `stake_token`
    pub fn init(
        &mut self,
        points_per_asset_per_epoch: u64,
        initial_rate: U128,
        initial_rate_decimals: u8,
        stake_token: Option<Address>,
        stake_token_decimals: u8,
    ) {
        let admin = self.env().caller();
        let result = self.setup(
            admin,
            points_per_asset_per_epoch,
            initial_rate,
            initial_rate_decimals,
            stake_token,
            stake_token_decimals,
        );
        self.ok_or_revert(result);
    }

    // ========== Staking ==========

    /// Stake the attached CSPR for `duration_days`. Returns the position id.
    #[odra(payable)]
    pub fn create_stake(&mut self, duration_days: u64) -> u64 {
        let result = self.stake_native(duration_days);
        self.ok_or_revert(result)
    }

    /// Stake `amount` of the CEP-18 staking token for `duration_days`.
    ///
    /// The caller must approve this contract for `amount` first.
    pub fn create_token_stake(&mut self, amount: U256, duration_days: u64) -> u64 {
        let result = self.stake_token(amount, duration_days);
        self.ok_or_revert(result)
    }

    /// Credit points earned by a position since its last claim.
    pub fn claim_points(&mut self, position_id: u64) -> U128 {
        let result = self.claim(position_id);
        self.ok_or_revert(result)
    }

    /// Close a matured, unencumbered position: settle pending points and
    /// return the principal to the owner.
    pub fn redeem_stake(&mut self, position_id: u64) {
        let result = self.redeem(position_id);
        self.ok_or_revert(result)
    }

    // ========== Loans ==========

    /// Borrow `borrow_points` against a position. Returns the loan id.
    pub fn open_loan(&mut self, position_id: u64, borrow_points: u64) -> u64 {
        let result = self.borrow(position_id, borrow_points);
        self.ok_or_revert(result)
    }

    /// Repay a loan in full (principal plus interest).
    pub fn repay_loan(&mut self, loan_id: u64) {
        let result = self.repay(loan_id);
        self.ok_or_revert(result)
    }

    // ========== Points ==========

    /// Burn `amount` of the caller's available points.
    pub fn spend_points(&mut self, amount: U128) {
        let result = self.spend(amount);
        self.ok_or_revert(result)
    }

    // ========== Governance ==========

    pub fn set_pause_state(&mut self, paused: bool, govern_cap_id: u64) {
        let caller = self.env().caller();
        let result = self.config.set_pause_state(caller, paused, govern_cap_id);
        self.ok_or_revert(result)
    }

    pub fn set_points_rate(&mut self, rate: u64, govern_cap_id: u64) {
        let caller = self.env().caller();
        let result = self.config.set_points_rate(caller, rate, govern_cap_id);
        self.ok_or_revert(result)
    }

    pub fn transfer_govern_cap(&mut self, cap_id: u64, recipient: Address) {
        let caller = self.env().caller();
        let result = self.config.transfer_govern_cap(caller, cap_id, recipient);
        self.ok_or_revert(result)
    }

    pub fn transfer_oracle_cap(&mut self, cap_id: u64, recipient: Address) {
        let caller = self.env().caller();
        let result = self.config.transfer_oracle_cap(caller, cap_id, recipient);
        self.ok_or_revert(result)
    }

    /// Issue an extra oracle capability to `recipient`. Returns its id.
    pub fn issue_oracle_cap(&mut self, recipient: Address, govern_cap_id: u64) -> u64 {
        let caller = self.env().caller();
        let result = self.config.issue_oracle_cap(caller, recipient, govern_cap_id);
        self.ok_or_revert(result)
    }

    /// Hand the admin key to `new_admin`, revoking every existing capability.
    /// Returns the ids of the governance and oracle capabilities issued to
    /// the new admin.
    pub fn rotate_admin(&mut self, new_admin: Address, govern_cap_id: u64) -> (u64, u64) {
        let caller = self.env().caller();
        let result = self.config.rotate_admin(caller, new_admin, govern_cap_id);
        self.ok_or_revert(result)
    }

    // ========== Oracle ==========

    /// Update the native CSPR rate.
    pub fn update_oracle_rate(&mut self, rate: U128, decimals: u8, oracle_cap_id: u64) {
        let result = self.update_rate(AssetId::Cspr, rate, decimals, oracle_cap_id);
        self.ok_or_revert(result)
    }

    /// Update the rate of any configured asset.
    pub fn update_asset_rate(
        &mut self,
        asset: AssetId,
        rate: U128,
        decimals: u8,
        oracle_cap_id: u64,
    ) {
        let result = self.update_rate(asset, rate, decimals, oracle_cap_id);
        self.ok_or_revert(result)
    }

    // ========== Views ==========

    pub fn get_available_balance(&self, user: Address) -> U128 {
        self.ledger.available(&user)
    }

    pub fn get_locked_balance(&self, user: Address) -> U128 {
        self.ledger.locked(&user)
    }

    /// `(principal, interest owed now, opened epoch)`
    pub fn get_loan_details(&self, loan_id: u64) -> (u64, u64, u64) {
        let result = self.loans.details(loan_id);
        self.ok_or_revert(result)
    }

    /// Native CSPR rate as `(rate, decimals)`.
    pub fn get_rate(&self) -> (U128, u8) {
        let result = self.oracle.snapshot(AssetId::Cspr);
        let snapshot = self.ok_or_revert(result);
        (snapshot.rate, snapshot.rate_decimals)
    }

    pub fn get_asset_rate(&self, asset: AssetId) -> RateSnapshot {
        let result = self.oracle.snapshot(asset);
        self.ok_or_revert(result)
    }

    pub fn get_position(&self, position_id: u64) -> Option<StakePosition> {
        self.stakes.get(position_id)
    }

    pub fn get_position_state(&self, position_id: u64) -> PositionState {
        let result = self.stakes.state(position_id);
        self.ok_or_revert(result)
    }

    pub fn get_loan(&self, loan_id: u64) -> Option<Loan> {
        self.loans.get(loan_id)
    }

    /// Points `claim_points` would credit right now.
    pub fn pending_points(&self, position_id: u64) -> U128 {
        let result = self
            .accrual_params(position_id)
            .and_then(|params| self.stakes.pending_points(position_id, params));
        self.ok_or_revert(result)
    }

    /// Largest loan the position supports at the current rate.
    pub fn max_borrowable(&self, position_id: u64) -> U256 {
        let result = self
            .stakes
            .get(position_id)
            .ok_or(ProtocolError::PositionNotFound)
            .and_then(|position| self.borrow_limit(&position));
        self.ok_or_revert(result)
    }

    pub fn get_config(&self) -> ConfigSnapshot {
        let result = self.config.snapshot();
        self.ok_or_revert(result)
    }

    pub fn is_paused(&self) -> bool {
        self.config.is_paused()
    }

    pub fn current_epoch(&self) -> u64 {
        epoch_at(self.env().get_block_time())
    }

    pub fn get_govern_cap(&self, cap_id: u64) -> Option<GovernCap> {
        self.config.govern_cap(cap_id)
    }

    pub fn get_oracle_cap(&self, cap_id: u64) -> Option<OracleCap> {
        self.config.oracle_cap(cap_id)
    }

    /// Principal held in escrow for `asset`.
    pub fn escrow_balance(&self, asset: AssetId) -> U256 {
        self.escrow.held(asset)
    }

    /// Principal of live positions for `asset`.
    pub fn total_staked(&self, asset: AssetId) -> U256 {
        self.stakes.total_principal(asset)
    }

    pub fn open_positions(&self) -> u64 {
        self.stakes.open_positions()
    }

    pub fn total_available(&self) -> U128 {
        self.ledger.total_available()
    }

    pub fn total_locked(&self) -> U128 {
        self.ledger.total_locked()
    }

    pub fn outstanding_loan_principal(&self) -> u64 {
        self.loans.outstanding_principal()
    }
}

impl PointsProtocol {
    fn setup(
        &mut self,
        admin: Address,
        points_per_asset_per_epoch: u64,
        initial_rate: U128,
        initial_rate_decimals: u8,
        stake_token: Option<Address>,
        stake_token_decimals: u8,
    ) -> Result<(), ProtocolError> {
        self.config.init(admin, points_per_asset_per_epoch)?;
        self.escrow.init(stake_token, stake_token_decimals);
        self.oracle
            .update_rate(AssetId::Cspr, initial_rate, initial_rate_decimals)?;
        if stake_token.is_some() {
            self.oracle
                .update_rate(AssetId::StakeToken, initial_rate, initial_rate_decimals)?;
        }
        Ok(())
    }

    fn stake_native(&mut self, duration_days: u64) -> Result<u64, ProtocolError> {
        self.config.assert_not_paused()?;
        let caller = self.env().caller();
        let amount = motes_to_u256(self.env().attached_value())?;
        if amount.is_zero() {
            return Err(ProtocolError::ZeroAmount);
        }
        self.escrow.deposit_native(amount)?;
        let position = self
            .stakes
            .create(caller, AssetId::Cspr, amount, duration_days)?;
        Ok(position.id)
    }

    fn stake_token(&mut self, amount: U256, duration_days: u64) -> Result<u64, ProtocolError> {
        self.config.assert_not_paused()?;
        let caller = self.env().caller();
        if amount.is_zero() {
            return Err(ProtocolError::ZeroAmount);
        }
        self.escrow.deposit_token(caller, amount)?;
        let position = self
            .stakes
            .create(caller, AssetId::StakeToken, amount, duration_days)?;
        Ok(position.id)
    }

    fn claim(&mut self, position_id: u64) -> Result<U128, ProtocolError> {
        self.config.assert_not_paused()?;
        let caller = self.env().caller();
        let params = self.accrual_params(position_id)?;
        let earned = self.stakes.claim(position_id, caller, params)?;
        self.ledger.credit_available(caller, earned)?;
        Ok(earned)
    }

    fn redeem(&mut self, position_id: u64) -> Result<(), ProtocolError> {
        self.config.assert_not_paused()?;
        let caller = self.env().caller();
        let params = self.accrual_params(position_id)?;
        let (position, settled) = self.stakes.redeem(position_id, caller, params)?;
        self.ledger.credit_available(caller, settled)?;
        self.escrow
            .withdraw(position.asset, position.owner, position.principal)
    }

    fn borrow(&mut self, position_id: u64, borrow_points: u64) -> Result<u64, ProtocolError> {
        self.config.assert_not_paused()?;
        let caller = self.env().caller();
        let position = self.stakes.owned_by(position_id, caller)?;
        if position.encumbered {
            return Err(ProtocolError::PositionEncumbered);
        }

        let value = self.collateral_value(&position)?;
        let loan = self.loans.open(caller, position_id, borrow_points, value)?;
        self.stakes.encumber(position_id)?;

        let principal = U128::from(borrow_points);
        self.ledger.credit_available(caller, principal)?;
        self.ledger.credit_locked(caller, principal)?;
        Ok(loan.id)
    }

    fn repay(&mut self, loan_id: u64) -> Result<(), ProtocolError> {
        self.config.assert_not_paused()?;
        let caller = self.env().caller();
        let loan = self.loans.owned_by(loan_id, caller)?;
        let interest = self.loans.interest_due(&loan)?;
        let due = total_due(loan.principal_points, interest)?;

        self.ledger.debit_available(caller, U128::from(due))?;
        self.ledger
            .debit_locked(caller, U128::from(loan.principal_points))?;
        self.stakes.release(loan.position_id)?;
        self.loans.close(loan_id, interest)?;
        Ok(())
    }

    fn spend(&mut self, amount: U128) -> Result<(), ProtocolError> {
        self.config.assert_not_paused()?;
        if amount.is_zero() {
            return Err(ProtocolError::ZeroAmount);
        }
        let caller = self.env().caller();
        self.ledger.debit_available(caller, amount)
    }

    fn update_rate(
        &mut self,
        asset: AssetId,
        rate: U128,
        decimals: u8,
        oracle_cap_id: u64,
    ) -> Result<(), ProtocolError> {
        self.config.assert_not_paused()?;
        let caller = self.env().caller();
        let _: OracleCap = self.config.authorize(oracle_cap_id, caller)?;
        self.escrow.asset_decimals(asset)?;
        self.oracle.update_rate(asset, rate, decimals)?;
        Ok(())
    }

    fn accrual_params(&self, position_id: u64) -> Result<AccrualParams, ProtocolError> {
        let position = self
            .stakes
            .get(position_id)
            .ok_or(ProtocolError::PositionNotFound)?;
        Ok(AccrualParams {
            points_per_asset_per_epoch: self.config.points_per_asset_per_epoch(),
            asset_decimals: self.escrow.asset_decimals(position.asset)?,
        })
    }

    /// Position principal valued in points at the current rate.
    fn collateral_value(&self, position: &StakePosition) -> Result<U256, ProtocolError> {
        let decimals = self.escrow.asset_decimals(position.asset)?;
        self.oracle
            .value_in_points(position.asset, position.principal, decimals)
    }

    fn borrow_limit(&self, position: &StakePosition) -> Result<U256, ProtocolError> {
        max_borrowable(self.collateral_value(position)?, MAX_LTV_BPS)
    }

    fn ok_or_revert<T>(&self, result: Result<T, ProtocolError>) -> T {
        match result {
            Ok(value) => value,
            Err(error) => {
                if error.is_fatal() {
                    log::error!("protocol invariant violated: {} (code {})", error, error.code());
                }
                self.env().revert(error)
            }
        }
    }
}
