//! Escrow vault.
//!
//! Custody of staked principal, one held balance per asset:
//! - Native CSPR arrives as value attached to the payable entry point
//! - The CEP-18 staking token is pulled with `transfer_from`
//!
//! The held balance of an asset never drops below the principal of its
//! un-redeemed positions; a withdrawal that would break this is fatal. The
//! `log::error!` line only reaches a host logger; on chain the revert code
//! 901 (`InsufficientVaultBalance`) is what operators see.

use odra::prelude::*;
use odra::casper_types::U256;
use odra::ContractRef;
use crate::errors::ProtocolError;
use crate::token_adapter::Cep18TokenContractRef;
use crate::types::{u256_to_motes, AssetId, NATIVE_DECIMALS};

/// Escrow vault sub-module
#[odra::module]
pub struct EscrowVault {
    /// Held balance per asset
    held: Mapping<AssetId, U256>,
    /// CEP-18 staking token, if one was configured
    stake_token: Var<Option<Address>>,
    /// Decimals of the CEP-18 staking token
    stake_token_decimals: Var<u8>,
}

impl EscrowVault {
    pub fn init(&mut self, stake_token: Option<Address>, stake_token_decimals: u8) {
        self.stake_token.set(stake_token);
        self.stake_token_decimals.set(stake_token_decimals);
        self.held.set(&AssetId::Cspr, U256::zero());
        self.held.set(&AssetId::StakeToken, U256::zero());
    }

    /// Configured CEP-18 staking token.
    pub fn stake_token(&self) -> Result<Address, ProtocolError> {
        self.stake_token
            .get()
            .flatten()
            .ok_or(ProtocolError::UnsupportedAsset)
    }

    /// Decimals of one whole unit of `asset`.
    pub fn asset_decimals(&self, asset: AssetId) -> Result<u8, ProtocolError> {
        match asset {
            AssetId::Cspr => Ok(NATIVE_DECIMALS),
            AssetId::StakeToken => {
                self.stake_token()?;
                Ok(self.stake_token_decimals.get_or_default())
            }
        }
    }

    pub fn held(&self, asset: AssetId) -> U256 {
        self.held.get(&asset).unwrap_or_default()
    }

    /// Record native value already attached to the current call.
    pub fn deposit_native(&mut self, amount: U256) -> Result<(), ProtocolError> {
        self.credit(AssetId::Cspr, amount)
    }

    /// Pull `amount` of the staking token from `owner` into the vault.
    ///
    /// The owner must have approved the protocol contract beforehand.
    pub fn deposit_token(&mut self, owner: Address, amount: U256) -> Result<(), ProtocolError> {
        let token = self.stake_token()?;
        let vault = self.env().self_address();
        Cep18TokenContractRef::new(self.env(), token).transfer_from(owner, vault, amount);
        self.credit(AssetId::StakeToken, amount)
    }

    /// Pay `amount` of `asset` out to `recipient`.
    pub fn withdraw(
        &mut self,
        asset: AssetId,
        recipient: Address,
        amount: U256,
    ) -> Result<(), ProtocolError> {
        let held = self.held(asset);
        if amount > held {
            log::error!(
                "escrow shortfall for {:?}: held {} below withdrawal {}",
                asset,
                held,
                amount
            );
            return Err(ProtocolError::InsufficientVaultBalance);
        }
        self.held.set(&asset, held - amount);

        match asset {
            AssetId::Cspr => {
                self.env().transfer_tokens(&recipient, &u256_to_motes(amount));
            }
            AssetId::StakeToken => {
                let token = self.stake_token()?;
                Cep18TokenContractRef::new(self.env(), token).transfer(recipient, amount);
            }
        }
        Ok(())
    }

    fn credit(&mut self, asset: AssetId, amount: U256) -> Result<(), ProtocolError> {
        let held = self
            .held(asset)
            .checked_add(amount)
            .ok_or(ProtocolError::ArithmeticOverflow)?;
        self.held.set(&asset, held);
        Ok(())
    }
}
