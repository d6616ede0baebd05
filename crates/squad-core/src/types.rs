//! Core domain types: squads, members, deposits, claims, and derived state.
//!
//! All timestamps are Unix seconds (`u64`) — the engine never assumes
//! sub-second precision. Deposit amounts are in MIST, reward amounts in
//! squad token units.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{BRONZE_STREAK, DIAMOND_STREAK, GOLD_STREAK, SILVER_STREAK};

/// An opaque 32-byte member identity.
///
/// The engine never interprets the bytes; they identify a member within and
/// across squads. Rendered as lowercase hex.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
)]
pub struct Address(pub [u8; 32]);

impl Address {
    /// The zero address (32 zero bytes).
    pub const ZERO: Self = Self([0u8; 32]);

    /// Create an Address from a byte array.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Return the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl From<[u8; 32]> for Address {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// Identifier of a squad, assigned sequentially at creation.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
)]
pub struct SquadId(pub u64);

impl fmt::Display for SquadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "squad-{}", self.0)
    }
}

/// A savings squad: a group committed to a weekly deposit target.
///
/// `created_at` and `weekly_target` are immutable after creation — they fix
/// the cycle boundaries and qualifying threshold forever. `active` may be
/// toggled by external governance.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Squad {
    pub id: SquadId,
    pub name: String,
    pub creator: Address,
    /// Unix seconds. Cycle 0 begins here.
    pub created_at: u64,
    /// Qualifying deposit threshold per cycle, in MIST.
    pub weekly_target: u64,
    pub max_members: u32,
    pub active: bool,
    /// Instant the squad was deactivated, while `active` is false.
    ///
    /// Reward derivation clamps its notion of "now" to this instant, so the
    /// claimable window and streaks freeze instead of decaying while the
    /// squad is frozen. Cleared on reactivation.
    pub deactivated_at: Option<u64>,
}

/// A membership record. Created on join, never mutated.
///
/// One identity may hold memberships in multiple squads, each tracked
/// independently.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Member {
    pub squad_id: SquadId,
    pub address: Address,
    /// Unix seconds. Cycles before the join cycle are neither counted
    /// toward a streak nor treated as gaps.
    pub joined_at: u64,
    pub is_creator: bool,
}

/// An append-only deposit record.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Deposit {
    pub squad_id: SquadId,
    pub member: Address,
    /// Cycle the deposit landed in, derived from `recorded_at`.
    pub cycle_index: u64,
    /// Amount in MIST.
    pub amount: u64,
    /// Unix seconds.
    pub recorded_at: u64,
}

/// Badge milestone tiers, in ascending streak-threshold order.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MilestoneTier {
    Bronze,
    Silver,
    Gold,
    Diamond,
}

impl MilestoneTier {
    /// All tiers in ascending threshold order.
    pub const ASCENDING: [MilestoneTier; 4] = [
        MilestoneTier::Bronze,
        MilestoneTier::Silver,
        MilestoneTier::Gold,
        MilestoneTier::Diamond,
    ];

    /// Streak length (consecutive qualifying cycles) unlocking this tier.
    ///
    /// # Examples
    ///
    /// ```
    /// use squad_core::types::MilestoneTier;
    /// assert_eq!(MilestoneTier::Bronze.threshold(), 4);
    /// assert_eq!(MilestoneTier::Diamond.threshold(), 24);
    /// ```
    pub fn threshold(&self) -> u64 {
        match self {
            Self::Bronze => BRONZE_STREAK,
            Self::Silver => SILVER_STREAK,
            Self::Gold => GOLD_STREAK,
            Self::Diamond => DIAMOND_STREAK,
        }
    }
}

impl fmt::Display for MilestoneTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// What a claim is for: the token reward of a closed cycle, or a badge.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClaimKind {
    /// Weekly token reward for a specific closed cycle.
    TokenReward { cycle_index: u64 },
    /// Milestone badge for a tier.
    Badge { tier: MilestoneTier },
}

impl fmt::Display for ClaimKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TokenReward { cycle_index } => write!(f, "token-reward(cycle {cycle_index})"),
            Self::Badge { tier } => write!(f, "badge({tier:?})"),
        }
    }
}

/// Natural key of a claim. At most one honored claim ever exists per key —
/// the exactly-once contract the engine upholds.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ClaimKey {
    pub squad_id: SquadId,
    pub member: Address,
    pub kind: ClaimKind,
}

impl fmt::Display for ClaimKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.squad_id, self.member, self.kind)
    }
}

/// A durable record that a reward or badge was honored.
///
/// Created only by a successful claim operation, after the external payout
/// confirmed. Never mutated or deleted.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Claim {
    pub key: ClaimKey,
    /// Token units paid out, or 0 for a badge mint.
    pub amount: u64,
    /// Unix seconds.
    pub honored_at: u64,
}

/// Where a squad stands in its weekly cadence at a given instant.
///
/// Derived, never stored: computed from `Squad::created_at` and `now`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct CyclePosition {
    pub cycle_index: u64,
    /// Unix seconds, inclusive.
    pub cycle_start: u64,
    /// Unix seconds, exclusive.
    pub cycle_end: u64,
    /// Seconds until the cycle closes, always in `[0, CYCLE_LENGTH_SECS)`.
    pub remaining_secs: u64,
}

/// A member's derived streak within one squad.
///
/// `length` counts consecutive qualifying cycles ending at
/// `last_completed_cycle`, with no gap. The current open cycle extends the
/// streak once it has a qualifying deposit but never breaks it.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreakState {
    pub squad_id: SquadId,
    pub member: Address,
    pub length: u64,
    /// Most recent cycle with a qualifying deposit in the streak, or `None`
    /// when the streak is empty.
    pub last_completed_cycle: Option<u64>,
}

impl StreakState {
    /// An empty streak for a member.
    pub fn empty(squad_id: SquadId, member: Address) -> Self {
        Self {
            squad_id,
            member,
            length: 0,
            last_completed_cycle: None,
        }
    }
}
