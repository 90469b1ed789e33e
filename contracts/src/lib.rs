//! Points Protocol Contracts
//!
//! Accounting core of a points-based staking and lending protocol on Casper.
//!
//! ## Architecture
//!
//! - **PointsProtocol** (router): Single deployable contract composing the components below
//! - **ProtocolConfig**: Pause switch, points rate, governance/oracle capabilities
//! - **RateOracle**: Per-asset points exchange rate
//! - **EscrowVault**: Custody of staked CSPR and CEP-18 principal
//! - **Ledger**: Available/locked points balances
//! - **StakeBook**: Time-locked stake positions and point accrual
//! - **LoanBook**: Points loans against stake positions
//!
//! ## Pause
//!
//! While paused every mutating operation reverts with `ProtocolPaused`,
//! capability-gated ones included. `set_pause_state` is the only exception.

#![cfg_attr(target_arch = "wasm32", no_std)]

#[cfg(target_arch = "wasm32")]
extern crate alloc;

// Re-export odra for downstream usage
pub use odra;

// Core module declarations
pub mod types;
pub mod errors;
pub mod events;
pub mod interest;
pub mod token_adapter;

// Components
pub mod config;
pub mod oracle;
pub mod escrow;
pub mod ledger;
pub mod stake;
pub mod loan;

// Contract entry point
pub mod router;

#[cfg(test)]
mod test_harness;
