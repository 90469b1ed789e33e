//! Points loans backed by stake positions.
//!
//! A loan is opened against one unencumbered position, up to `MAX_LTV_BPS` of
//! the position's oracle value at that instant. That value is frozen on the
//! loan as `collateral_points`; interest is simple, accrues per whole epoch on
//! it and never follows later rate moves. Repayment deletes the loan; there is
//! no partial repayment and no liquidation.

use odra::prelude::*;
use odra::casper_types::U256;
use crate::errors::ProtocolError;
use crate::events::{LoanOpened, LoanRepaid};
use crate::interest::{calculate_interest, max_borrowable};
use crate::types::{epoch_at, Loan, MAX_LTV_BPS};

/// Loan book sub-module
#[odra::module(events = [LoanOpened, LoanRepaid])]
pub struct LoanBook {
    /// Loans by id; `None` once repaid
    loans: Mapping<u64, Option<Loan>>,
    /// Next loan id (starts at 1)
    next_loan_id: Var<u64>,
    /// Sum of principal over open loans
    outstanding_principal: Var<u64>,
}

impl LoanBook {
    // ========== Reads ==========

    pub fn get(&self, loan_id: u64) -> Option<Loan> {
        self.loans.get(&loan_id).flatten()
    }

    pub fn outstanding_principal(&self) -> u64 {
        self.outstanding_principal.get_or_default()
    }

    /// Open loan borrowed by `caller`.
    pub fn owned_by(&self, loan_id: u64, caller: Address) -> Result<Loan, ProtocolError> {
        let loan = self.get(loan_id).ok_or(ProtocolError::LoanNotFound)?;
        if loan.borrower != caller {
            return Err(ProtocolError::NotLoanBorrower);
        }
        Ok(loan)
    }

    /// Interest owed on `loan` as of now.
    pub fn interest_due(&self, loan: &Loan) -> Result<u64, ProtocolError> {
        let elapsed = epoch_at(self.env().get_block_time()).saturating_sub(loan.opened_epoch);
        calculate_interest(loan.collateral_points, elapsed)
    }

    /// `(principal, interest owed now, opened epoch)`
    pub fn details(&self, loan_id: u64) -> Result<(u64, u64, u64), ProtocolError> {
        let loan = self.get(loan_id).ok_or(ProtocolError::LoanNotFound)?;
        let interest = self.interest_due(&loan)?;
        Ok((loan.principal_points, interest, loan.opened_epoch))
    }

    // ========== Mutations ==========

    /// Record a new loan of `principal_points` against `position_id`.
    ///
    /// `collateral_value` is the position's value in points at this instant.
    pub fn open(
        &mut self,
        borrower: Address,
        position_id: u64,
        principal_points: u64,
        collateral_value: U256,
    ) -> Result<Loan, ProtocolError> {
        check_ltv(principal_points, collateral_value)?;
        let collateral_points = points_u64(collateral_value)?;

        let id = self.next_loan_id.get().unwrap_or(1);
        self.next_loan_id.set(id.saturating_add(1));

        let opened_epoch = epoch_at(self.env().get_block_time());
        let loan = Loan {
            id,
            borrower,
            position_id,
            principal_points,
            collateral_points,
            interest_accrued: 0,
            opened_epoch,
        };
        self.loans.set(&id, Some(loan.clone()));

        let outstanding = self
            .outstanding_principal()
            .checked_add(principal_points)
            .ok_or(ProtocolError::ArithmeticOverflow)?;
        self.outstanding_principal.set(outstanding);

        self.env().emit_event(LoanOpened {
            loan_id: id,
            borrower,
            position_id,
            principal_points,
            collateral_points,
            opened_epoch,
        });
        Ok(loan)
    }

    /// Delete a repaid loan. The returned copy carries the settled interest.
    pub fn close(&mut self, loan_id: u64, interest: u64) -> Result<Loan, ProtocolError> {
        let mut loan = self.get(loan_id).ok_or(ProtocolError::LoanNotFound)?;
        loan.interest_accrued = interest;
        self.loans.set(&loan_id, None);

        let outstanding = self
            .outstanding_principal()
            .checked_sub(loan.principal_points)
            .ok_or(ProtocolError::ArithmeticOverflow)?;
        self.outstanding_principal.set(outstanding);

        self.env().emit_event(LoanRepaid {
            loan_id,
            borrower: loan.borrower,
            position_id: loan.position_id,
            principal_points: loan.principal_points,
            interest_accrued: interest,
        });
        Ok(loan)
    }
}

/// Fails unless `0 < principal_points <= floor(collateral_value * MAX_LTV_BPS / 10000)`.
pub fn check_ltv(principal_points: u64, collateral_value: U256) -> Result<(), ProtocolError> {
    if principal_points == 0 {
        return Err(ProtocolError::ZeroAmount);
    }
    if U256::from(principal_points) > max_borrowable(collateral_value, MAX_LTV_BPS)? {
        return Err(ProtocolError::ExceedsLtv);
    }
    Ok(())
}

fn points_u64(value: U256) -> Result<u64, ProtocolError> {
    if value > U256::from(u64::MAX) {
        return Err(ProtocolError::ArithmeticOverflow);
    }
    Ok(value.as_u64())
}

/// Principal plus interest due at repayment.
pub fn total_due(principal_points: u64, interest: u64) -> Result<u64, ProtocolError> {
    principal_points
        .checked_add(interest)
        .ok_or(ProtocolError::ArithmeticOverflow)
}
