//! Engine-level properties over randomized deposit histories.

use proptest::prelude::*;
use squad_core::constants::MIN_DEPOSIT;
use squad_core::types::MilestoneTier;
use squad_tests::helpers::*;

const TARGET: u64 = 5 * MIN_DEPOSIT;
const DAY: u64 = 86_400;

proptest! {
    /// However deposits are scattered, the engine never reports a streak
    /// longer than the elapsed cycle count, and every badge it offers is
    /// justified by that streak.
    #[test]
    fn streak_and_badges_stay_consistent(
        cycles in proptest::collection::btree_set(0u64..26, 0..15),
    ) {
        let bench = TestBench::new();
        let squad = bench.squad(TARGET);
        for &cycle in &cycles {
            bench.deposit_at(squad, addr(1), TARGET, cycle * WEEK + DAY);
        }
        bench.at(26 * WEEK + DAY);

        let streak = bench.engine.streak(squad, addr(1)).unwrap();
        prop_assert!(streak.length <= 27);

        let claimable = bench.engine.claimable_rewards(squad, addr(1)).unwrap();
        for tier in &claimable.badges {
            prop_assert!(streak.length >= tier.threshold());
        }
    }

    /// A token claim succeeds exactly when the view said it would, and the
    /// view goes empty right after.
    #[test]
    fn claim_agrees_with_claimable_view(
        cycles in proptest::collection::btree_set(0u64..10, 0..8),
        observe_week in 1u64..11,
    ) {
        let bench = TestBench::new();
        let squad = bench.squad(TARGET);
        for &cycle in &cycles {
            bench.deposit_at(squad, addr(1), TARGET, cycle * WEEK + DAY);
        }
        bench.at(observe_week * WEEK + DAY);

        let view = bench.engine.claimable_rewards(squad, addr(1)).unwrap();
        let result = bench.engine.claim_token_reward(squad, addr(1));
        prop_assert_eq!(view.token_cycle.is_some(), result.is_ok());
        if result.is_ok() {
            let after = bench.engine.claimable_rewards(squad, addr(1)).unwrap();
            prop_assert_eq!(after.token_cycle, None);
        }
    }
}

#[test]
fn claimable_rewards_serialize_for_api_consumers() {
    let bench = TestBench::new();
    let squad = bench.squad(TARGET);
    for week in 0..4 {
        bench.deposit_at(squad, addr(1), TARGET, week * WEEK + DAY);
    }

    let view = bench.engine.claimable_rewards(squad, addr(1)).unwrap();
    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json["token_cycle"], 2);
    assert_eq!(json["badges"][0], serde_json::to_value(MilestoneTier::Bronze).unwrap());
    assert_eq!(json["highest_tier"], serde_json::to_value(MilestoneTier::Bronze).unwrap());
    assert_eq!(json["next_milestone"][0], serde_json::to_value(MilestoneTier::Silver).unwrap());
    assert_eq!(json["next_milestone"][1], 4);
}
