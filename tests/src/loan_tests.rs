//! Loans against stake positions: LTV bound, encumbrance, interest, repayment.

use odra::casper_types::{U128, U256};
use pretty_assertions::assert_eq;
use points_protocol_contracts::errors::ProtocolError;
use points_protocol_contracts::interest::calculate_interest;

use crate::fixtures::*;

// 1000 CSPR * 10 points * 1.25x (30 day tier)
const PER_EPOCH_30D: u64 = 12_500;

#[test]
fn test_loan_scenario() {
    let env = odra_test::env();
    let mut protocol = deploy(&env);
    let user = env.get_account(1);

    // 1000 CSPR at 1 point per CSPR -> value 1000, max borrow 700
    let position_id = stake(&env, &mut protocol, user, 1_000, 30);
    assert_eq!(protocol.max_borrowable(position_id), U256::from(700u64));

    let t0 = protocol.current_epoch();
    let loan_id = protocol.open_loan(position_id, 350);
    assert_eq!(protocol.get_loan_details(loan_id), (350, 0, t0));
    assert_eq!(protocol.get_available_balance(user), points(350));
    assert_eq!(protocol.get_locked_balance(user), points(350));
    assert!(protocol.get_position(position_id).unwrap().encumbered);

    // Interest runs on the 1000 point collateral value
    advance_epochs(&env, 10);
    assert_eq!(calculate_interest(1_000, 10), Ok(1));
    assert_eq!(protocol.get_loan_details(loan_id), (350, 1, t0));

    // Only the borrowed 350 is available: short by the interest
    assert_eq!(
        protocol.try_repay_loan(loan_id),
        Err(ProtocolError::InsufficientPoints.into())
    );
    assert_eq!(protocol.get_available_balance(user), points(350));

    let earned = protocol.claim_points(position_id);
    assert_eq!(earned, points(10 * PER_EPOCH_30D));

    protocol.repay_loan(loan_id);
    assert_eq!(
        protocol.get_available_balance(user),
        points(350 + 10 * PER_EPOCH_30D - 351)
    );
    assert_eq!(protocol.get_locked_balance(user), U128::zero());
    assert!(!protocol.get_position(position_id).unwrap().encumbered);
    assert_eq!(protocol.get_loan(loan_id), None);
    assert_eq!(protocol.outstanding_loan_principal(), 0);
}

#[test]
fn test_ltv_bound_is_inclusive() {
    let env = odra_test::env();
    let mut protocol = deploy(&env);
    let user = env.get_account(1);
    let position_id = stake(&env, &mut protocol, user, 1_000, 30);

    assert_eq!(
        protocol.try_open_loan(position_id, 701),
        Err(ProtocolError::ExceedsLtv.into())
    );
    assert!(!protocol.get_position(position_id).unwrap().encumbered);

    let loan_id = protocol.open_loan(position_id, 700);
    assert_eq!(protocol.get_loan_details(loan_id).0, 700);
}

#[test]
fn test_open_loan_rejects_zero() {
    let env = odra_test::env();
    let mut protocol = deploy(&env);
    let user = env.get_account(1);
    let position_id = stake(&env, &mut protocol, user, 1_000, 30);

    assert_eq!(
        protocol.try_open_loan(position_id, 0),
        Err(ProtocolError::ZeroAmount.into())
    );
}

#[test]
fn test_position_backs_one_loan_at_a_time() {
    let env = odra_test::env();
    let mut protocol = deploy(&env);
    let user = env.get_account(1);
    let position_id = stake(&env, &mut protocol, user, 1_000, 30);

    protocol.open_loan(position_id, 100);
    assert_eq!(
        protocol.try_open_loan(position_id, 100),
        Err(ProtocolError::PositionEncumbered.into())
    );
}

#[test]
fn test_encumbered_position_cannot_be_redeemed() {
    let env = odra_test::env();
    let mut protocol = deploy(&env);
    let user = env.get_account(1);
    let position_id = stake(&env, &mut protocol, user, 1_000, 1);
    let loan_id = protocol.open_loan(position_id, 500);

    // Encumbrance wins over maturity, before and after unlock time
    assert_eq!(
        protocol.try_redeem_stake(position_id),
        Err(ProtocolError::PositionEncumbered.into())
    );
    advance_epochs(&env, 5);
    assert_eq!(
        protocol.try_redeem_stake(position_id),
        Err(ProtocolError::PositionEncumbered.into())
    );

    // 1000 CSPR * 10 points, 1 day tier, 5 epochs
    protocol.claim_points(position_id);
    protocol.repay_loan(loan_id);
    protocol.redeem_stake(position_id);
    assert_eq!(protocol.get_position(position_id), None);
}

#[test]
fn test_ltv_uses_oracle_rate_at_open_time() {
    let env = odra_test::env();
    let mut protocol = deploy(&env);
    let user = env.get_account(1);
    let position_id = stake(&env, &mut protocol, user, 1_000, 30);

    // 2.5 points per CSPR
    env.set_caller(env.get_account(0));
    protocol.update_oracle_rate(U128::from(25u64), 1, ADMIN_CAP);
    assert_eq!(protocol.get_rate(), (U128::from(25u64), 1));
    assert_eq!(protocol.max_borrowable(position_id), U256::from(1_750u64));

    env.set_caller(user);
    let loan_id = protocol.open_loan(position_id, 1_750);

    // A later rate drop does not touch the open loan
    env.set_caller(env.get_account(0));
    protocol.update_oracle_rate(U128::from(1u64), 0, ADMIN_CAP);
    assert_eq!(protocol.get_loan_details(loan_id).0, 1_750);
    assert_eq!(protocol.max_borrowable(position_id), U256::from(700u64));

    // Interest keeps using the 2500 point value frozen at open
    assert_eq!(protocol.get_loan(loan_id).unwrap().collateral_points, 2_500);
    advance_epochs(&env, 10);
    assert_eq!(protocol.get_loan_details(loan_id).1, 3);
}

#[test]
fn test_only_borrower_can_repay() {
    let env = odra_test::env();
    let mut protocol = deploy(&env);
    let borrower = env.get_account(1);
    let position_id = stake(&env, &mut protocol, borrower, 1_000, 30);
    let loan_id = protocol.open_loan(position_id, 100);

    env.set_caller(env.get_account(2));
    assert_eq!(
        protocol.try_repay_loan(loan_id),
        Err(ProtocolError::NotLoanBorrower.into())
    );
    assert_eq!(
        protocol.try_repay_loan(42),
        Err(ProtocolError::LoanNotFound.into())
    );
    assert_eq!(
        protocol.try_open_loan(position_id, 10),
        Err(ProtocolError::NotPositionOwner.into())
    );
}

#[test]
fn test_points_are_conserved_across_loan_lifecycle() {
    let env = odra_test::env();
    let mut protocol = deploy(&env);
    let user = env.get_account(1);
    let position_id = stake(&env, &mut protocol, user, 1_000, 30);

    let total = |p: &points_protocol_contracts::router::PointsProtocolHostRef| {
        p.total_available() + p.total_locked()
    };
    assert_eq!(total(&protocol), U128::zero());

    let loan_id = protocol.open_loan(position_id, 400);
    assert_eq!(total(&protocol), points(800));
    assert_eq!(protocol.total_locked(), points(400));
    assert_eq!(protocol.outstanding_loan_principal(), 400);

    advance_epochs(&env, 2);
    protocol.claim_points(position_id);
    assert_eq!(total(&protocol), points(800 + 2 * PER_EPOCH_30D));

    // 1000 * 500 * 2 / 3_650_000 truncates to zero interest
    protocol.repay_loan(loan_id);
    assert_eq!(total(&protocol), points(2 * PER_EPOCH_30D));
    assert_eq!(protocol.total_locked(), U128::zero());

    protocol.spend_points(points(1_000));
    assert_eq!(total(&protocol), points(2 * PER_EPOCH_30D - 1_000));
}
