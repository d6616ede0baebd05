//! Reward eligibility: pure predicates over the two ledgers.
//!
//! Token rewards are strictly retroactive — claimable only for the most
//! recently *closed* cycle, never the open one, so a claim can never race a
//! qualifying deposit landing in the same cycle it pays for. Badge
//! eligibility is a streak-threshold check. In both cases the claim ledger
//! is the sole suppressor of repeats: once a key is reserved or honored, the
//! predicate goes false.

use serde::{Deserialize, Serialize};

use squad_core::error::CycleError;
use squad_core::{cycle, milestone};
use squad_core::types::{ClaimKey, ClaimKind, Member, MilestoneTier, Squad};

use crate::claims::ClaimStore;
use crate::deposit::DepositStore;
use crate::streak;

/// Everything a member could claim right now. Returned to the presentation
/// layer so it never has to re-derive eligibility.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct ClaimableRewards {
    /// Closed cycle whose token reward is claimable, if any.
    pub token_cycle: Option<u64>,
    /// Badge tiers reached by the current streak and not yet claimed.
    pub badges: Vec<MilestoneTier>,
    /// Highest tier the current streak has reached, claimed or not.
    pub highest_tier: Option<MilestoneTier>,
    /// Next tier ahead of the streak and the consecutive qualifying cycles
    /// still needed to reach it. `None` once Diamond is reached.
    pub next_milestone: Option<(MilestoneTier, u64)>,
}

/// The closed cycle whose token reward the member may claim, if any.
///
/// `Some(c)` iff `c` is the most recently closed cycle, the member has a
/// qualifying deposit in it, and no claim (honored or in-flight) exists for
/// it. `None` during cycle 0, which has not closed yet.
pub fn claimable_reward_cycle(
    deposits: &dyn DepositStore,
    claims: &dyn ClaimStore,
    squad: &Squad,
    member: &Member,
    now: u64,
) -> Result<Option<u64>, CycleError> {
    let Some(closed) = cycle::last_closed_cycle(squad.created_at, now)? else {
        return Ok(None);
    };
    if !deposits.has_qualifying(squad.id, &member.address, closed, squad.weekly_target) {
        return Ok(None);
    }
    let key = ClaimKey {
        squad_id: squad.id,
        member: member.address,
        kind: ClaimKind::TokenReward { cycle_index: closed },
    };
    Ok((!claims.is_claimed(&key)).then_some(closed))
}

/// Whether the member may claim the token reward for the most recently
/// closed cycle.
pub fn can_claim_token_reward(
    deposits: &dyn DepositStore,
    claims: &dyn ClaimStore,
    squad: &Squad,
    member: &Member,
    now: u64,
) -> Result<bool, CycleError> {
    Ok(claimable_reward_cycle(deposits, claims, squad, member, now)?.is_some())
}

/// Whether the member may claim the badge for `tier`.
///
/// True iff the current streak has reached the tier's threshold and no
/// claim exists for the badge key. Re-crossing after a streak reset does
/// not re-open a claimed badge — the claim key is the source of truth.
pub fn can_claim_badge(
    deposits: &dyn DepositStore,
    claims: &dyn ClaimStore,
    squad: &Squad,
    member: &Member,
    tier: MilestoneTier,
    now: u64,
) -> Result<bool, CycleError> {
    let state = streak::current_streak(deposits, squad, member, now)?;
    if state.length < tier.threshold() {
        return Ok(false);
    }
    let key = ClaimKey {
        squad_id: squad.id,
        member: member.address,
        kind: ClaimKind::Badge { tier },
    };
    Ok(!claims.is_claimed(&key))
}

/// Everything claimable for a member at `now`, in one pass.
pub fn claimable_rewards(
    deposits: &dyn DepositStore,
    claims: &dyn ClaimStore,
    squad: &Squad,
    member: &Member,
    now: u64,
) -> Result<ClaimableRewards, CycleError> {
    let token_cycle = claimable_reward_cycle(deposits, claims, squad, member, now)?;
    let state = streak::current_streak(deposits, squad, member, now)?;
    let badges = MilestoneTier::ASCENDING
        .into_iter()
        .filter(|tier| state.length >= tier.threshold())
        .filter(|tier| {
            !claims.is_claimed(&ClaimKey {
                squad_id: squad.id,
                member: member.address,
                kind: ClaimKind::Badge { tier: *tier },
            })
        })
        .collect();
    Ok(ClaimableRewards {
        token_cycle,
        badges,
        highest_tier: milestone::highest_reached(state.length),
        next_milestone: milestone::next_milestone(state.length),
    })
}
