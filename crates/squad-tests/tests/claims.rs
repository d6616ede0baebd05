//! Exactly-once claim guarantees under races and payout failures.

use std::sync::Arc;
use std::thread;

use squad_core::constants::MIN_DEPOSIT;
use squad_core::error::{ClaimError, EngineError};
use squad_core::types::MilestoneTier;
use squad_tests::helpers::*;

const TARGET: u64 = 5 * MIN_DEPOSIT;
const DAY: u64 = 86_400;

#[test]
fn concurrent_claims_pay_exactly_once() {
    let bench = TestBench::new();
    let squad = bench.squad(TARGET);
    bench.deposit_at(squad, addr(1), TARGET, DAY);
    bench.at(WEEK + DAY);

    let engine = bench.engine.clone();
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || engine.claim_token_reward(squad, addr(1)).is_ok())
        })
        .collect();
    let successes = handles
        .into_iter()
        .map(|h| h.join().unwrap_or(false))
        .filter(|&won| won)
        .count();

    assert_eq!(successes, 1);
    assert_eq!(bench.payout.token_payouts(), 1);
    assert_eq!(bench.engine.claims(squad, &addr(1)).len(), 1);
}

#[test]
fn concurrent_badge_claims_mint_exactly_once() {
    let bench = TestBench::new();
    let squad = bench.squad(TARGET);
    for week in 0..4 {
        bench.deposit_at(squad, addr(1), TARGET, week * WEEK + DAY);
    }

    let engine = bench.engine.clone();
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                engine
                    .claim_badge(squad, addr(1), MilestoneTier::Bronze)
                    .is_ok()
            })
        })
        .collect();
    let successes = handles
        .into_iter()
        .map(|h| h.join().unwrap_or(false))
        .filter(|&won| won)
        .count();

    assert_eq!(successes, 1);
    assert_eq!(bench.payout.badge_mints(), 1);
}

#[test]
fn failed_payout_leaves_no_record_and_allows_retry() {
    let bench = TestBench::new();
    let squad = bench.squad(TARGET);
    bench.deposit_at(squad, addr(1), TARGET, DAY);
    bench.at(WEEK + DAY);

    bench.payout.fail_next();
    let first = bench.engine.claim_token_reward(squad, addr(1));
    assert!(matches!(first, Err(EngineError::Claim(ClaimError::PayoutFailed(_)))));
    assert!(bench.engine.claims(squad, &addr(1)).is_empty());
    assert_eq!(bench.payout.token_payouts(), 0);

    // Eligibility is restored, so the retry goes through.
    let retry = bench.engine.claim_token_reward(squad, addr(1)).unwrap();
    assert_eq!(bench.engine.claims(squad, &addr(1)), vec![retry.claim]);
    assert_eq!(bench.payout.token_payouts(), 1);
}

#[test]
fn badge_stays_claimed_across_a_streak_reset() {
    let bench = TestBench::new();
    let squad = bench.squad(TARGET);

    for week in 0..4 {
        bench.deposit_at(squad, addr(1), TARGET, week * WEEK + DAY);
    }
    bench.engine.claim_badge(squad, addr(1), MilestoneTier::Bronze).unwrap();

    // Skip cycle 4, then rebuild a four-cycle streak. Bronze is crossed
    // again but the badge is not re-mintable.
    for week in 5..9 {
        bench.deposit_at(squad, addr(1), TARGET, week * WEEK + DAY);
    }
    assert_eq!(bench.engine.streak(squad, addr(1)).unwrap().length, 4);
    assert!(matches!(
        bench.engine.claim_badge(squad, addr(1), MilestoneTier::Bronze),
        Err(EngineError::Claim(ClaimError::AlreadyClaimed(_)))
    ));
    assert_eq!(bench.payout.badge_mints(), 1);

    let claimable = bench.engine.claimable_rewards(squad, addr(1)).unwrap();
    assert!(claimable.badges.is_empty());
}

#[test]
fn each_closed_cycle_is_a_distinct_claim() {
    let bench = TestBench::new();
    let squad = bench.squad(TARGET);

    bench.deposit_at(squad, addr(1), TARGET, DAY);
    bench.at(WEEK + DAY);
    bench.engine.claim_token_reward(squad, addr(1)).unwrap();

    // Deposit in cycle 1, claim it after it closes. Cycle 0's claim does
    // not block cycle 1's.
    bench.engine.record_deposit(squad, addr(1), TARGET).unwrap();
    bench.at(2 * WEEK + DAY);
    bench.engine.claim_token_reward(squad, addr(1)).unwrap();

    assert_eq!(bench.payout.token_payouts(), 2);
    assert_eq!(bench.engine.claims(squad, &addr(1)).len(), 2);
}

#[test]
fn members_claims_do_not_interfere() {
    let bench = TestBench::new();
    let squad = bench.squad(TARGET);
    bench.engine.join_squad(squad, addr(2)).unwrap();
    bench.deposit_at(squad, addr(1), TARGET, DAY);
    bench.engine.record_deposit(squad, addr(2), TARGET).unwrap();
    bench.at(WEEK + DAY);

    bench.engine.claim_token_reward(squad, addr(1)).unwrap();
    // The creator's claim does not consume the joiner's.
    bench.engine.claim_token_reward(squad, addr(2)).unwrap();
    assert_eq!(bench.payout.token_payouts(), 2);
}
