//! Streak derivation over the deposit ledger.
//!
//! A streak is the count of consecutive qualifying cycles ending at the most
//! recent one, with no gap. Derived on demand — the ledger is the only
//! state, so recomputing from the same record always yields the same answer.

use squad_core::cycle;
use squad_core::error::CycleError;
use squad_core::types::{Member, Squad, StreakState};

use crate::deposit::DepositStore;

/// Compute a member's current streak at `now`.
///
/// Scans the member's qualifying-cycle set backward from the open cycle —
/// or from the one before it when the open cycle has no qualifying deposit
/// yet, since an in-progress cycle can extend a streak but never break one.
/// Counting stops at the first missed *closed* cycle, and never looks below
/// the member's join cycle (cycles before joining are neither counted nor
/// gaps).
///
/// # Errors
///
/// [`CycleError::InvalidTimeRange`] when `now` precedes the squad's
/// creation.
pub fn current_streak(
    store: &dyn DepositStore,
    squad: &Squad,
    member: &Member,
    now: u64,
) -> Result<StreakState, CycleError> {
    let current = cycle::cycle_index(squad.created_at, now)?;
    // Membership cannot predate the squad; clamp defends against bad input.
    let join_cycle = cycle::cycle_index(squad.created_at, member.joined_at.max(squad.created_at))?;

    let qualifying = store.qualifying_cycles(squad.id, &member.address, squad.weekly_target);

    let mut cursor = if qualifying.contains(&current) {
        Some(current)
    } else {
        current.checked_sub(1)
    };

    let mut state = StreakState::empty(squad.id, member.address);
    while let Some(c) = cursor {
        if c < join_cycle || !qualifying.contains(&c) {
            break;
        }
        if state.last_completed_cycle.is_none() {
            state.last_completed_cycle = Some(c);
        }
        state.length += 1;
        cursor = c.checked_sub(1);
    }
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deposit::MemoryDepositLedger;
    use proptest::prelude::*;
    use squad_core::constants::CYCLE_LENGTH_SECS;
    use squad_core::types::{Address, Deposit, SquadId};

    const T0: u64 = 1_700_000_000;
    const WEEK: u64 = CYCLE_LENGTH_SECS;
    const TARGET: u64 = 1_000;

    fn squad() -> Squad {
        Squad {
            id: SquadId(1),
            name: "college savings".into(),
            creator: Address([1; 32]),
            created_at: T0,
            weekly_target: TARGET,
            max_members: 10,
            active: true,
            deactivated_at: None,
        }
    }

    fn member_joined(joined_at: u64) -> Member {
        Member {
            squad_id: SquadId(1),
            address: Address([1; 32]),
            joined_at,
            is_creator: true,
        }
    }

    fn ledger_with(cycles: &[u64]) -> MemoryDepositLedger {
        let ledger = MemoryDepositLedger::new();
        for &cycle in cycles {
            ledger.record(Deposit {
                squad_id: SquadId(1),
                member: Address([1; 32]),
                cycle_index: cycle,
                amount: TARGET,
                recorded_at: T0 + cycle * WEEK,
            });
        }
        ledger
    }

    fn streak_at(ledger: &MemoryDepositLedger, now: u64) -> StreakState {
        current_streak(ledger, &squad(), &member_joined(T0), now).unwrap()
    }

    // ------------------------------------------------------------------
    // Basic counting
    // ------------------------------------------------------------------

    #[test]
    fn no_deposits_no_streak() {
        let ledger = ledger_with(&[]);
        let s = streak_at(&ledger, T0 + 10 * WEEK);
        assert_eq!(s.length, 0);
        assert_eq!(s.last_completed_cycle, None);
    }

    #[test]
    fn single_deposit_in_open_cycle() {
        let ledger = ledger_with(&[0]);
        let s = streak_at(&ledger, T0 + 86_400);
        assert_eq!(s.length, 1);
        assert_eq!(s.last_completed_cycle, Some(0));
    }

    #[test]
    fn consecutive_cycles_accumulate() {
        let ledger = ledger_with(&[0, 1, 2]);
        let s = streak_at(&ledger, T0 + 2 * WEEK + 1);
        assert_eq!(s.length, 3);
        assert_eq!(s.last_completed_cycle, Some(2));
    }

    // ------------------------------------------------------------------
    // The open cycle never breaks a streak
    // ------------------------------------------------------------------

    #[test]
    fn open_cycle_without_deposit_is_not_a_gap() {
        let ledger = ledger_with(&[0, 1, 2]);
        // Cycle 3 is open, nothing deposited yet.
        let s = streak_at(&ledger, T0 + 3 * WEEK + 1);
        assert_eq!(s.length, 3);
        assert_eq!(s.last_completed_cycle, Some(2));
    }

    #[test]
    fn closed_empty_cycle_is_a_gap() {
        let ledger = ledger_with(&[0, 1, 2]);
        // Cycle 3 closed empty; cycle 4 is open.
        let s = streak_at(&ledger, T0 + 4 * WEEK + 1);
        assert_eq!(s.length, 0);
        assert_eq!(s.last_completed_cycle, None);
    }

    // ------------------------------------------------------------------
    // Gap reset
    // ------------------------------------------------------------------

    #[test]
    fn streak_restarts_at_one_after_gap() {
        // Qualifying in {0,1,2}, gap at 3, qualifying again at 4.
        let ledger = ledger_with(&[0, 1, 2, 4]);
        let s = streak_at(&ledger, T0 + 4 * WEEK + 1);
        assert_eq!(s.length, 1, "streak must restart, not resume at 4");
        assert_eq!(s.last_completed_cycle, Some(4));
    }

    #[test]
    fn streak_regrows_after_reset() {
        let ledger = ledger_with(&[0, 2, 3, 4]);
        let s = streak_at(&ledger, T0 + 4 * WEEK + 1);
        assert_eq!(s.length, 3);
        assert_eq!(s.last_completed_cycle, Some(4));
    }

    // ------------------------------------------------------------------
    // Join cycle
    // ------------------------------------------------------------------

    #[test]
    fn cycles_before_join_are_not_gaps() {
        let ledger = ledger_with(&[5, 6]);
        let member = member_joined(T0 + 5 * WEEK);
        let s = current_streak(&ledger, &squad(), &member, T0 + 6 * WEEK + 1).unwrap();
        assert_eq!(s.length, 2);
    }

    #[test]
    fn cycles_before_join_are_not_counted() {
        // Deposits exist before the join cycle (e.g. imported history);
        // they must not inflate the streak.
        let ledger = ledger_with(&[0, 1, 2, 3]);
        let member = member_joined(T0 + 2 * WEEK);
        let s = current_streak(&ledger, &squad(), &member, T0 + 3 * WEEK + 1).unwrap();
        assert_eq!(s.length, 2);
        assert_eq!(s.last_completed_cycle, Some(3));
    }

    // ------------------------------------------------------------------
    // Validation and qualification
    // ------------------------------------------------------------------

    #[test]
    fn now_before_creation_rejected() {
        let ledger = ledger_with(&[]);
        let err = current_streak(&ledger, &squad(), &member_joined(T0), T0 - 1).unwrap_err();
        assert!(matches!(err, CycleError::InvalidTimeRange { .. }));
    }

    #[test]
    fn below_target_deposit_does_not_extend() {
        let ledger = MemoryDepositLedger::new();
        ledger.record(Deposit {
            squad_id: SquadId(1),
            member: Address([1; 32]),
            cycle_index: 0,
            amount: TARGET - 1,
            recorded_at: T0,
        });
        let s = streak_at(&ledger, T0 + 1);
        assert_eq!(s.length, 0);
    }

    // ------------------------------------------------------------------
    // Properties
    // ------------------------------------------------------------------

    proptest! {
        #[test]
        fn recomputation_is_idempotent(cycles in proptest::collection::btree_set(0u64..20, 0..12)) {
            let cycles: Vec<u64> = cycles.into_iter().collect();
            let ledger = ledger_with(&cycles);
            let now = T0 + 20 * WEEK + 1;
            let a = streak_at(&ledger, now);
            let b = streak_at(&ledger, now);
            prop_assert_eq!(a, b);
        }

        #[test]
        fn length_never_exceeds_elapsed_cycles(cycles in proptest::collection::btree_set(0u64..20, 0..12), extra in 0u64..5) {
            let cycles: Vec<u64> = cycles.into_iter().collect();
            let ledger = ledger_with(&cycles);
            let open = 19 + extra;
            let s = streak_at(&ledger, T0 + open * WEEK + 1);
            prop_assert!(s.length <= open + 1);
            if let Some(last) = s.last_completed_cycle {
                prop_assert!(last <= open);
                // The streak's span is contiguous: all cycles in
                // (last - length, last] are qualifying.
                for c in (last + 1 - s.length)..=last {
                    prop_assert!(cycles.contains(&c));
                }
            } else {
                prop_assert_eq!(s.length, 0);
            }
        }
    }
}
