//! Shared deployment helpers.

use odra::casper_types::{U128, U512};
use odra::host::{Deployer, HostEnv, HostRef};
use odra::prelude::*;
use points_protocol_contracts::router::{PointsProtocol, PointsProtocolHostRef, PointsProtocolInitArgs};
use points_protocol_contracts::types::MILLIS_PER_EPOCH;

/// 1 CSPR = 1e9 motes
pub const MOTES_PER_CSPR: u64 = 1_000_000_000;
/// Base reward used by every fixture
pub const POINTS_PER_ASSET_PER_EPOCH: u64 = 10;
/// Governance and oracle capability ids issued at init
pub const ADMIN_CAP: u64 = 1;

pub fn cspr(amount: u64) -> U512 {
    U512::from(amount) * U512::from(MOTES_PER_CSPR)
}

pub fn points(amount: u64) -> U128 {
    U128::from(amount)
}

pub fn advance_epochs(env: &HostEnv, epochs: u64) {
    env.advance_block_time(epochs * MILLIS_PER_EPOCH);
}

/// Deploy with account 0 as admin, 1 point per CSPR and no staking token.
pub fn deploy(env: &HostEnv) -> PointsProtocolHostRef {
    deploy_with_token(env, None, 0)
}

pub fn deploy_with_token(
    env: &HostEnv,
    stake_token: Option<Address>,
    stake_token_decimals: u8,
) -> PointsProtocolHostRef {
    env.set_caller(env.get_account(0));
    PointsProtocol::deploy(
        env,
        PointsProtocolInitArgs {
            points_per_asset_per_epoch: POINTS_PER_ASSET_PER_EPOCH,
            initial_rate: U128::from(1u64),
            initial_rate_decimals: 0,
            stake_token,
            stake_token_decimals,
        },
    )
}

/// Stake `amount_cspr` from `user` for `duration_days`; returns the position id.
pub fn stake(
    env: &HostEnv,
    protocol: &mut PointsProtocolHostRef,
    user: Address,
    amount_cspr: u64,
    duration_days: u64,
) -> u64 {
    env.set_caller(user);
    protocol.with_tokens(cspr(amount_cspr)).create_stake(duration_days)
}
