//! The engine service: squad registry, ledgers and the claim protocol.
//!
//! `SquadEngine` owns the in-memory stores and wires them to a clock and a
//! payout provider. All derived state (cycle position, streaks, eligibility)
//! is recomputed from the ledgers on every read; the engine caches nothing.
//!
//! Claims follow a reserve/confirm protocol: the claim key is reserved in
//! the ledger *before* the payout is submitted, and only finalized once the
//! provider confirms. A failed payout aborts the reservation, so the member
//! can retry, while a concurrent attempt during the in-flight window is
//! turned away as already claimed.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use squad_core::clock::ClockSource;
use squad_core::constants::{DEFAULT_MAX_MEMBERS, MAX_SQUAD_NAME_LEN, MIN_DEPOSIT};
use squad_core::cycle;
use squad_core::error::{ClaimError, DepositError, EngineError, SquadError};
use squad_core::policy::RewardPolicy;
use squad_core::traits::PayoutProvider;
use squad_core::types::{
    Address, Claim, ClaimKey, ClaimKind, CyclePosition, Deposit, Member, MilestoneTier, Squad,
    SquadId, StreakState,
};

use crate::claims::{ClaimStore, MemoryClaimLedger};
use crate::deposit::{DepositStore, MemoryDepositLedger};
use crate::eligibility::{self, ClaimableRewards};
use crate::streak;

/// What a deposit changed, returned to the caller in one shot so the
/// presentation layer never reads stale state after a write.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct DepositOutcome {
    pub deposit: Deposit,
    /// Whether this deposit alone met the squad's weekly target.
    pub qualifying: bool,
    /// Streak recomputed after the deposit landed.
    pub streak: StreakState,
    /// Milestone tiers whose thresholds this deposit's streak growth crossed.
    pub newly_crossed: Vec<MilestoneTier>,
}

/// A finalized claim plus the streak it was priced against.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ClaimOutcome {
    pub claim: Claim,
    pub streak: StreakState,
}

pub struct SquadEngine {
    squads: DashMap<SquadId, Squad>,
    members: DashMap<SquadId, Vec<Member>>,
    deposits: MemoryDepositLedger,
    claims: MemoryClaimLedger,
    policy: RwLock<RewardPolicy>,
    clock: Arc<dyn ClockSource>,
    payout: Arc<dyn PayoutProvider>,
    next_id: AtomicU64,
}

impl SquadEngine {
    pub fn new(clock: Arc<dyn ClockSource>, payout: Arc<dyn PayoutProvider>) -> Self {
        Self::with_policy(clock, payout, RewardPolicy::default())
    }

    pub fn with_policy(
        clock: Arc<dyn ClockSource>,
        payout: Arc<dyn PayoutProvider>,
        policy: RewardPolicy,
    ) -> Self {
        Self {
            squads: DashMap::new(),
            members: DashMap::new(),
            deposits: MemoryDepositLedger::new(),
            claims: MemoryClaimLedger::new(),
            policy: RwLock::new(policy),
            clock,
            payout,
            next_id: AtomicU64::new(0),
        }
    }

    // ------------------------------------------------------------------
    // Squad lifecycle
    // ------------------------------------------------------------------

    /// Creates a squad and enrolls the creator as its first member.
    ///
    /// `max_members` of `None` uses [`DEFAULT_MAX_MEMBERS`].
    pub fn create_squad(
        &self,
        name: &str,
        creator: Address,
        weekly_target: u64,
        max_members: Option<u32>,
    ) -> Result<Squad, EngineError> {
        if name.is_empty() {
            return Err(SquadError::EmptyName.into());
        }
        if name.len() > MAX_SQUAD_NAME_LEN {
            return Err(SquadError::NameTooLong { len: name.len(), max: MAX_SQUAD_NAME_LEN }.into());
        }
        if weekly_target < MIN_DEPOSIT {
            return Err(SquadError::TargetTooLow { target: weekly_target, min: MIN_DEPOSIT }.into());
        }
        let max_members = max_members.unwrap_or(DEFAULT_MAX_MEMBERS);
        if max_members == 0 {
            return Err(SquadError::ZeroMemberCap.into());
        }

        let id = SquadId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let created_at = self.clock.now();
        let squad = Squad {
            id,
            name: name.to_owned(),
            creator,
            created_at,
            weekly_target,
            max_members,
            active: true,
            deactivated_at: None,
        };
        self.squads.insert(id, squad.clone());
        self.members.insert(
            id,
            vec![Member { squad_id: id, address: creator, joined_at: created_at, is_creator: true }],
        );
        info!(squad = %id, %creator, weekly_target, "squad created");
        Ok(squad)
    }

    /// Adds a member to an active squad with spare capacity.
    pub fn join_squad(&self, squad_id: SquadId, address: Address) -> Result<Member, EngineError> {
        let squad = self.squad(squad_id).ok_or(SquadError::UnknownSquad(squad_id))?;
        if !squad.active {
            return Err(SquadError::SquadInactive(squad_id).into());
        }
        let mut roster = self
            .members
            .get_mut(&squad_id)
            .ok_or(SquadError::UnknownSquad(squad_id))?;
        if roster.iter().any(|m| m.address == address) {
            return Err(SquadError::AlreadyMember { id: squad_id, member: address }.into());
        }
        if roster.len() >= squad.max_members as usize {
            return Err(SquadError::SquadFull { id: squad_id, max: squad.max_members }.into());
        }
        let member = Member {
            squad_id,
            address,
            joined_at: self.clock.now(),
            is_creator: false,
        };
        roster.push(member.clone());
        info!(squad = %squad_id, member = %address, "member joined");
        Ok(member)
    }

    /// Toggles whether the squad accepts joins and deposits.
    ///
    /// Deactivation also freezes reward time at the deactivation instant:
    /// the claimable window and streaks stop advancing, so rewards earned
    /// before the freeze stay claimable however long the squad sits idle.
    /// Reactivation resumes the clock.
    pub fn set_active(&self, squad_id: SquadId, active: bool) -> Result<(), EngineError> {
        let mut squad = self
            .squads
            .get_mut(&squad_id)
            .ok_or(SquadError::UnknownSquad(squad_id))?;
        if squad.active != active {
            squad.active = active;
            // Transition-only so a repeated freeze cannot slide the stamp.
            squad.deactivated_at = (!active).then(|| self.clock.now());
            info!(squad = %squad_id, active, "squad activity changed");
        }
        Ok(())
    }

    pub fn squad(&self, squad_id: SquadId) -> Option<Squad> {
        self.squads.get(&squad_id).map(|s| s.clone())
    }

    pub fn policy(&self) -> RewardPolicy {
        self.policy.read().clone()
    }

    /// Swaps the reward policy. Affects amounts for claims honored after
    /// the swap; already-honored claims keep their recorded amounts.
    pub fn set_policy(&self, policy: RewardPolicy) {
        *self.policy.write() = policy;
        info!("reward policy updated");
    }

    pub fn members(&self, squad_id: SquadId) -> Vec<Member> {
        self.members.get(&squad_id).map(|r| r.clone()).unwrap_or_default()
    }

    /// Sum of all deposits ever made into the squad.
    pub fn pool_total(&self, squad_id: SquadId) -> u64 {
        self.deposits.pool_total(squad_id)
    }

    // ------------------------------------------------------------------
    // Deposits
    // ------------------------------------------------------------------

    /// Records a deposit and reports the member's state after it landed.
    pub fn record_deposit(
        &self,
        squad_id: SquadId,
        address: Address,
        amount: u64,
    ) -> Result<DepositOutcome, EngineError> {
        let (squad, member) = self.squad_and_member(squad_id, address)?;
        if !squad.active {
            return Err(SquadError::SquadInactive(squad_id).into());
        }
        if amount < MIN_DEPOSIT {
            return Err(DepositError::BelowMinimum { amount, min: MIN_DEPOSIT }.into());
        }
        if self.deposits.pool_total(squad_id).checked_add(amount).is_none() {
            return Err(DepositError::AmountOverflow.into());
        }

        let now = self.clock.now();
        let before = streak::current_streak(&self.deposits, &squad, &member, now)?;
        let deposit = Deposit {
            squad_id,
            member: address,
            cycle_index: cycle::cycle_index(squad.created_at, now)?,
            amount,
            recorded_at: now,
        };
        self.deposits.record(deposit.clone());
        let after = streak::current_streak(&self.deposits, &squad, &member, now)?;
        let newly_crossed =
            squad_core::milestone::crossed_milestones(before.length, after.length);

        debug!(
            squad = %squad_id,
            member = %address,
            amount,
            cycle = deposit.cycle_index,
            streak = after.length,
            "deposit recorded"
        );
        Ok(DepositOutcome {
            deposit,
            qualifying: amount >= squad.weekly_target,
            streak: after,
            newly_crossed,
        })
    }

    pub fn deposits(&self, squad_id: SquadId, address: &Address) -> Vec<Deposit> {
        self.deposits.deposits(squad_id, address)
    }

    // ------------------------------------------------------------------
    // Derived state
    // ------------------------------------------------------------------

    /// Where the squad sits in its current cycle.
    pub fn cycle_position(&self, squad_id: SquadId) -> Result<CyclePosition, EngineError> {
        let squad = self.squad(squad_id).ok_or(SquadError::UnknownSquad(squad_id))?;
        Ok(cycle::cycle_position(squad.created_at, self.clock.now())?)
    }

    /// The member's streak, recomputed from the deposit ledger.
    pub fn streak(&self, squad_id: SquadId, address: Address) -> Result<StreakState, EngineError> {
        let (squad, member) = self.squad_and_member(squad_id, address)?;
        let now = self.reward_instant(&squad);
        Ok(streak::current_streak(&self.deposits, &squad, &member, now)?)
    }

    /// Everything the member could claim right now.
    pub fn claimable_rewards(
        &self,
        squad_id: SquadId,
        address: Address,
    ) -> Result<ClaimableRewards, EngineError> {
        let (squad, member) = self.squad_and_member(squad_id, address)?;
        Ok(eligibility::claimable_rewards(
            &self.deposits,
            &self.claims,
            &squad,
            &member,
            self.reward_instant(&squad),
        )?)
    }

    pub fn claims(&self, squad_id: SquadId, address: &Address) -> Vec<Claim> {
        self.claims.claims(squad_id, address)
    }

    // ------------------------------------------------------------------
    // Claims
    // ------------------------------------------------------------------

    /// Claims the token reward for the most recently closed cycle.
    ///
    /// The payout amount scales with the streak at claim time, with the
    /// creator bonus applied on top for the squad's creator.
    pub fn claim_token_reward(
        &self,
        squad_id: SquadId,
        address: Address,
    ) -> Result<ClaimOutcome, EngineError> {
        let (squad, member) = self.squad_and_member(squad_id, address)?;
        let now = self.reward_instant(&squad);

        let Some(cycle_index) =
            eligibility::claimable_reward_cycle(&self.deposits, &self.claims, &squad, &member, now)?
        else {
            // Distinguish "already claimed" from "never eligible" so the
            // caller can surface the right message.
            if let Some(closed) = cycle::last_closed_cycle(squad.created_at, now)? {
                let key = self.token_key(squad_id, address, closed);
                if self.claims.is_claimed(&key)
                    && self.deposits.has_qualifying(
                        squad_id,
                        &address,
                        closed,
                        squad.weekly_target,
                    )
                {
                    return Err(ClaimError::AlreadyClaimed(key).into());
                }
            }
            return Err(
                ClaimError::NotEligible("no qualifying deposit in the closed cycle".into()).into()
            );
        };

        let state = streak::current_streak(&self.deposits, &squad, &member, now)?;
        let amount = self.policy.read().reward_amount(state.length, member.is_creator)?;
        let key = self.token_key(squad_id, address, cycle_index);
        let claim = self.honor(key, amount, |payout| {
            payout.submit_token_payout(&address, amount)
        })?;
        info!(squad = %squad_id, member = %address, cycle = cycle_index, amount, "token reward claimed");
        Ok(ClaimOutcome { claim, streak: state })
    }

    /// Claims the badge for `tier`. Badges carry no token amount; the claim
    /// record alone marks the tier as minted, once per member per squad.
    pub fn claim_badge(
        &self,
        squad_id: SquadId,
        address: Address,
        tier: MilestoneTier,
    ) -> Result<ClaimOutcome, EngineError> {
        let (squad, member) = self.squad_and_member(squad_id, address)?;
        let now = self.reward_instant(&squad);

        let state = streak::current_streak(&self.deposits, &squad, &member, now)?;
        let key = ClaimKey { squad_id, member: address, kind: ClaimKind::Badge { tier } };
        if state.length < tier.threshold() {
            return Err(ClaimError::NotEligible(format!(
                "streak {} below {tier} threshold {}",
                state.length,
                tier.threshold()
            ))
            .into());
        }
        if self.claims.is_claimed(&key) {
            return Err(ClaimError::AlreadyClaimed(key).into());
        }

        let claim = self.honor(key, 0, |payout| payout.submit_badge_mint(&address, tier))?;
        info!(squad = %squad_id, member = %address, %tier, "badge claimed");
        Ok(ClaimOutcome { claim, streak: state })
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Reserve the key, run the payout, then finalize. Aborts the
    /// reservation on payout failure so the claim can be retried.
    fn honor(
        &self,
        key: ClaimKey,
        amount: u64,
        submit: impl FnOnce(&dyn PayoutProvider) -> Result<(), squad_core::error::PayoutError>,
    ) -> Result<Claim, EngineError> {
        if !self.claims.try_begin(key) {
            return Err(ClaimError::AlreadyClaimed(key).into());
        }
        if let Err(err) = submit(self.payout.as_ref()) {
            self.claims.abort(&key);
            warn!(%key, %err, "payout failed, claim released");
            return Err(ClaimError::PayoutFailed(err.to_string()).into());
        }
        // Wall-clock on purpose: the record says when the payout confirmed,
        // even when eligibility was derived at a frozen instant.
        let claim = Claim { key, amount, honored_at: self.clock.now() };
        self.claims.finalize(claim.clone());
        Ok(claim)
    }

    fn token_key(&self, squad_id: SquadId, member: Address, cycle_index: u64) -> ClaimKey {
        ClaimKey { squad_id, member, kind: ClaimKind::TokenReward { cycle_index } }
    }

    /// The instant reward derivation runs at: the wall clock, or the
    /// deactivation instant while the squad is frozen. Keeps the claimable
    /// window and streaks from decaying on an inactive squad.
    fn reward_instant(&self, squad: &Squad) -> u64 {
        let now = self.clock.now();
        squad.deactivated_at.map_or(now, |frozen| frozen.min(now))
    }

    fn squad_and_member(
        &self,
        squad_id: SquadId,
        address: Address,
    ) -> Result<(Squad, Member), EngineError> {
        let squad = self.squad(squad_id).ok_or(SquadError::UnknownSquad(squad_id))?;
        let member = self
            .members
            .get(&squad_id)
            .and_then(|r| r.iter().find(|m| m.address == address).cloned())
            .ok_or(SquadError::NotMember { id: squad_id, member: address })?;
        Ok((squad, member))
    }
}
