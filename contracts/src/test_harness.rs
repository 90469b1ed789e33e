//! Test-only contract exposing single components, for paths the protocol
//! entry points never reach on their own.

use odra::prelude::*;
use odra::casper_types::{U128, U256};
use crate::errors::ProtocolError;
use crate::escrow::EscrowVault;
use crate::ledger::Ledger;
use crate::loan::LoanBook;
use crate::types::{motes_to_u256, AssetId, Loan};

#[odra::module]
pub struct ComponentHarness {
    escrow: SubModule<EscrowVault>,
    ledger: SubModule<Ledger>,
    loans: SubModule<LoanBook>,
}

#[odra::module]
impl ComponentHarness {
    #[odra(payable)]
    pub fn deposit(&mut self) {
        let result = motes_to_u256(self.env().attached_value());
        let amount = self.ok_or_revert(result);
        let result = self.escrow.deposit_native(amount);
        self.ok_or_revert(result)
    }

    /// Credit `points` to `user`, then pay `amount` of CSPR out of escrow.
    pub fn payout(&mut self, user: Address, points: U128, amount: U256) {
        let result = self.ledger.credit_available(user, points);
        self.ok_or_revert(result);
        let result = self.escrow.withdraw(AssetId::Cspr, user, amount);
        self.ok_or_revert(result)
    }

    pub fn held(&self) -> U256 {
        self.escrow.held(AssetId::Cspr)
    }

    pub fn credit(&mut self, user: Address, amount: U128) {
        let result = self.ledger.credit_available(user, amount);
        self.ok_or_revert(result)
    }

    pub fn lock(&mut self, user: Address, amount: U128) {
        let result = self.ledger.lock(user, amount);
        self.ok_or_revert(result)
    }

    pub fn unlock(&mut self, user: Address, amount: U128) {
        let result = self.ledger.unlock(user, amount);
        self.ok_or_revert(result)
    }

    pub fn available(&self, user: Address) -> U128 {
        self.ledger.available(&user)
    }

    pub fn locked(&self, user: Address) -> U128 {
        self.ledger.locked(&user)
    }

    pub fn total_available(&self) -> U128 {
        self.ledger.total_available()
    }

    pub fn total_locked(&self) -> U128 {
        self.ledger.total_locked()
    }

    pub fn open_loan(
        &mut self,
        borrower: Address,
        position_id: u64,
        principal_points: u64,
        collateral_value: U256,
    ) -> u64 {
        let result = self
            .loans
            .open(borrower, position_id, principal_points, collateral_value);
        self.ok_or_revert(result).id
    }

    pub fn close_loan(&mut self, loan_id: u64, interest: u64) -> Loan {
        let result = self.loans.close(loan_id, interest);
        self.ok_or_revert(result)
    }

    pub fn get_loan(&self, loan_id: u64) -> Option<Loan> {
        self.loans.get(loan_id)
    }

    pub fn outstanding_principal(&self) -> u64 {
        self.loans.outstanding_principal()
    }
}

impl ComponentHarness {
    fn ok_or_revert<T>(&self, result: Result<T, ProtocolError>) -> T {
        match result {
            Ok(value) => value,
            Err(error) => self.env().revert(error),
        }
    }
}
