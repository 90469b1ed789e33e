//! CEP-18 token interface for cross-contract calls.
//!
//! Used by the escrow vault to pull the staking token from a staker
//! (approve -> transfer_from) and to pay it back out on redemption.

use odra::prelude::*;
use odra::casper_types::U256;

/// CEP-18 token interface
#[odra::external_contract]
pub trait Cep18Token {
    fn transfer(&mut self, recipient: Address, amount: U256);
    fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256);
}
