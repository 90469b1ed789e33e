//! Points ledger.
//!
//! Per-account `available` and `locked` balances plus running totals of both.
//! `available` moves on claims, spends and loan open/repay; `locked` mirrors
//! outstanding loan principal. Every mutation is checked arithmetic, so the
//! totals only ever change by the exact amount credited or debited.

use odra::prelude::*;
use odra::casper_types::U128;
use crate::errors::ProtocolError;
use crate::events::{Earned, Locked, Spent, Unlocked};
use crate::types::LedgerBalance;

impl LedgerBalance {
    pub fn credit_available(self, amount: U128) -> Result<Self, ProtocolError> {
        Ok(Self {
            available: checked_add(self.available, amount)?,
            ..self
        })
    }

    pub fn debit_available(self, amount: U128) -> Result<Self, ProtocolError> {
        if self.available < amount {
            return Err(ProtocolError::InsufficientPoints);
        }
        Ok(Self {
            available: self.available - amount,
            ..self
        })
    }

    pub fn credit_locked(self, amount: U128) -> Result<Self, ProtocolError> {
        Ok(Self {
            locked: checked_add(self.locked, amount)?,
            ..self
        })
    }

    pub fn debit_locked(self, amount: U128) -> Result<Self, ProtocolError> {
        if self.locked < amount {
            return Err(ProtocolError::InsufficientLocked);
        }
        Ok(Self {
            locked: self.locked - amount,
            ..self
        })
    }

    /// Move `amount` from available to locked.
    pub fn lock(self, amount: U128) -> Result<Self, ProtocolError> {
        self.debit_available(amount)?.credit_locked(amount)
    }

    /// Move `amount` from locked back to available.
    pub fn unlock(self, amount: U128) -> Result<Self, ProtocolError> {
        self.debit_locked(amount)?.credit_available(amount)
    }
}

fn checked_add(a: U128, b: U128) -> Result<U128, ProtocolError> {
    a.checked_add(b).ok_or(ProtocolError::ArithmeticOverflow)
}

/// Ledger sub-module
#[odra::module(events = [Earned, Spent, Locked, Unlocked])]
pub struct Ledger {
    /// Balances by account
    balances: Mapping<Address, LedgerBalance>,
    /// Sum of all available balances
    total_available: Var<U128>,
    /// Sum of all locked balances
    total_locked: Var<U128>,
}

impl Ledger {
    pub fn balance_of(&self, user: &Address) -> LedgerBalance {
        self.balances.get(user).unwrap_or_default()
    }

    pub fn available(&self, user: &Address) -> U128 {
        self.balance_of(user).available
    }

    pub fn locked(&self, user: &Address) -> U128 {
        self.balance_of(user).locked
    }

    pub fn total_available(&self) -> U128 {
        self.total_available.get_or_default()
    }

    pub fn total_locked(&self) -> U128 {
        self.total_locked.get_or_default()
    }

    pub fn credit_available(&mut self, user: Address, amount: U128) -> Result<(), ProtocolError> {
        if amount.is_zero() {
            return Ok(());
        }
        let balance = self.balance_of(&user).credit_available(amount)?;
        let total = checked_add(self.total_available(), amount)?;
        self.balances.set(&user, balance);
        self.total_available.set(total);
        self.env().emit_event(Earned { user, amount });
        Ok(())
    }

    pub fn debit_available(&mut self, user: Address, amount: U128) -> Result<(), ProtocolError> {
        if amount.is_zero() {
            return Ok(());
        }
        let balance = self.balance_of(&user).debit_available(amount)?;
        self.balances.set(&user, balance);
        let total_available = self.total_available() - amount;
        self.total_available.set(total_available);
        self.env().emit_event(Spent { user, amount });
        Ok(())
    }

    pub fn lock(&mut self, user: Address, amount: U128) -> Result<(), ProtocolError> {
        if amount.is_zero() {
            return Ok(());
        }
        let balance = self.balance_of(&user).lock(amount)?;
        self.balances.set(&user, balance);
        let total_available = self.total_available() - amount;
        self.total_available.set(total_available);
        let total_locked = checked_add(self.total_locked(), amount)?;
        self.total_locked.set(total_locked);
        self.env().emit_event(Locked { user, amount });
        Ok(())
    }

    pub fn unlock(&mut self, user: Address, amount: U128) -> Result<(), ProtocolError> {
        if amount.is_zero() {
            return Ok(());
        }
        let balance = self.balance_of(&user).unlock(amount)?;
        self.balances.set(&user, balance);
        let total_locked = self.total_locked() - amount;
        self.total_locked.set(total_locked);
        let total_available = checked_add(self.total_available(), amount)?;
        self.total_available.set(total_available);
        self.env().emit_event(Unlocked { user, amount });
        Ok(())
    }

    /// Mirror newly borrowed principal into `locked`.
    pub fn credit_locked(&mut self, user: Address, amount: U128) -> Result<(), ProtocolError> {
        if amount.is_zero() {
            return Ok(());
        }
        let balance = self.balance_of(&user).credit_locked(amount)?;
        let total = checked_add(self.total_locked(), amount)?;
        self.balances.set(&user, balance);
        self.total_locked.set(total);
        self.env().emit_event(Locked { user, amount });
        Ok(())
    }

    /// Release repaid principal from `locked`.
    pub fn debit_locked(&mut self, user: Address, amount: U128) -> Result<(), ProtocolError> {
        if amount.is_zero() {
            return Ok(());
        }
        let balance = self.balance_of(&user).debit_locked(amount)?;
        self.balances.set(&user, balance);
        let total_locked = self.total_locked() - amount;
        self.total_locked.set(total_locked);
        self.env().emit_event(Unlocked { user, amount });
        Ok(())
    }
}
