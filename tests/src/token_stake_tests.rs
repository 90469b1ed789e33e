//! Staking the CEP-18 staking token.

use odra::casper_types::{U128, U256};
use odra::host::{Deployer, HostEnv, HostRef};
use odra::prelude::*;
use odra_modules::cep18_token::{Cep18, Cep18HostRef, Cep18InitArgs};
use pretty_assertions::assert_eq;
use points_protocol_contracts::errors::ProtocolError;
use points_protocol_contracts::router::PointsProtocolHostRef;
use points_protocol_contracts::types::AssetId;

use crate::fixtures::*;

const TOKEN_DECIMALS: u8 = 9;

fn tokens(amount: u64) -> U256 {
    U256::from(amount) * U256::from(MOTES_PER_CSPR)
}

/// Deploy a token, fund `user` with 10_000 tokens and deploy the protocol
/// accepting it.
fn setup(env: &HostEnv, user: Address) -> (Cep18HostRef, PointsProtocolHostRef) {
    env.set_caller(env.get_account(0));
    let mut token = Cep18::deploy(
        env,
        Cep18InitArgs {
            symbol: "STK".to_string(),
            name: "Stake Token".to_string(),
            decimals: TOKEN_DECIMALS,
            initial_supply: tokens(1_000_000),
        },
    );
    token.transfer(&user, &tokens(10_000));

    let protocol = deploy_with_token(env, Some(token.address()), TOKEN_DECIMALS);
    (token, protocol)
}

#[test]
fn test_token_stake_pulls_tokens_into_escrow() {
    let env = odra_test::env();
    let user = env.get_account(1);
    let (mut token, mut protocol) = setup(&env, user);

    env.set_caller(user);
    token.approve(&protocol.address(), &tokens(1_000));
    let position_id = protocol.create_token_stake(tokens(1_000), 90);

    assert_eq!(token.balance_of(&user), tokens(9_000));
    assert_eq!(token.balance_of(&protocol.address()), tokens(1_000));
    assert_eq!(protocol.escrow_balance(AssetId::StakeToken), tokens(1_000));
    assert_eq!(protocol.escrow_balance(AssetId::Cspr), U256::zero());

    let position = protocol.get_position(position_id).unwrap();
    assert_eq!(position.asset, AssetId::StakeToken);

    // 1000 tokens * 10 points * 1.5x (90 day tier)
    advance_epochs(&env, 1);
    assert_eq!(protocol.claim_points(position_id), U128::from(15_000u64));
}

#[test]
fn test_token_stake_round_trip() {
    let env = odra_test::env();
    let user = env.get_account(1);
    let (mut token, mut protocol) = setup(&env, user);

    env.set_caller(user);
    token.approve(&protocol.address(), &tokens(500));
    let position_id = protocol.create_token_stake(tokens(500), 30);

    // Token collateral uses its own rate
    assert_eq!(protocol.max_borrowable(position_id), U256::from(350u64));
    env.set_caller(env.get_account(0));
    protocol.update_asset_rate(AssetId::StakeToken, U128::from(4u64), 0, ADMIN_CAP);
    assert_eq!(protocol.max_borrowable(position_id), U256::from(1_400u64));
    assert_eq!(protocol.get_rate(), (U128::from(1u64), 0));

    advance_epochs(&env, 30);
    env.set_caller(user);
    protocol.redeem_stake(position_id);

    assert_eq!(token.balance_of(&user), tokens(10_000));
    assert_eq!(protocol.escrow_balance(AssetId::StakeToken), U256::zero());
}

#[test]
fn test_token_stake_requires_configured_token() {
    let env = odra_test::env();
    let mut protocol = deploy(&env);

    env.set_caller(env.get_account(1));
    assert_eq!(
        protocol.try_create_token_stake(tokens(1), 30),
        Err(ProtocolError::UnsupportedAsset.into())
    );
    assert_eq!(
        protocol.try_create_token_stake(U256::zero(), 30),
        Err(ProtocolError::ZeroAmount.into())
    );
}
