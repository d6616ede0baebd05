//! Reward amount policy: base amount, creator bonus, and streak multipliers.
//!
//! The amount paid for a qualifying cycle is policy, not mechanism — the
//! banding lives in a validated configuration table so it can be tuned
//! without touching eligibility logic. All arithmetic is integer-only with
//! u128 intermediates.

use serde::{Deserialize, Serialize};

use crate::constants::{
    BASE_REWARD, BPS_PRECISION, BRONZE_STREAK, CREATOR_BONUS_BPS, DIAMOND_STREAK, GOLD_STREAK,
    SILVER_STREAK,
};
use crate::error::PolicyError;

/// One multiplier band: applies to streaks of at least `min_streak` cycles.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreakBand {
    /// Lowest streak length the band covers.
    pub min_streak: u64,
    /// Reward multiplier in basis points (10_000 = 1.0×).
    pub multiplier_bps: u64,
}

/// Configuration table for reward amounts.
///
/// Bands must be strictly ascending in both `min_streak` and
/// `multiplier_bps`, and the first band must start at streak 0 so every
/// streak length falls in exactly one band.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RewardPolicy {
    /// Token units paid per qualifying cycle before multipliers.
    pub base_reward: u64,
    /// Surcharge for squad creators, in basis points.
    pub creator_bonus_bps: u64,
    bands: Vec<StreakBand>,
}

impl RewardPolicy {
    /// Build a policy, validating the band table.
    ///
    /// # Errors
    ///
    /// - [`PolicyError::EmptyBands`] for an empty table
    /// - [`PolicyError::FirstBandNonZero`] when the first band starts above 0
    /// - [`PolicyError::BandsNotAscending`] when either field fails to
    ///   strictly increase
    pub fn new(
        base_reward: u64,
        creator_bonus_bps: u64,
        bands: Vec<StreakBand>,
    ) -> Result<Self, PolicyError> {
        let first = bands.first().ok_or(PolicyError::EmptyBands)?;
        if first.min_streak != 0 {
            return Err(PolicyError::FirstBandNonZero(first.min_streak));
        }
        for (i, pair) in bands.windows(2).enumerate() {
            if pair[1].min_streak <= pair[0].min_streak
                || pair[1].multiplier_bps <= pair[0].multiplier_bps
            {
                return Err(PolicyError::BandsNotAscending(i + 1));
            }
        }
        Ok(Self {
            base_reward,
            creator_bonus_bps,
            bands,
        })
    }

    /// The band table, ascending.
    pub fn bands(&self) -> &[StreakBand] {
        &self.bands
    }

    /// The multiplier (in basis points) applying to a streak of `len` cycles.
    pub fn multiplier_bps(&self, len: u64) -> u64 {
        self.bands
            .iter()
            .rev()
            .find(|b| b.min_streak <= len)
            .map(|b| b.multiplier_bps)
            .unwrap_or(BPS_PRECISION)
    }

    /// Token units owed for a qualifying cycle at streak `len`.
    ///
    /// `base × band multiplier`, plus the creator surcharge when
    /// `is_creator`.
    ///
    /// # Errors
    ///
    /// [`PolicyError::ArithmeticOverflow`] when the result exceeds `u64`.
    pub fn reward_amount(&self, len: u64, is_creator: bool) -> Result<u64, PolicyError> {
        let bps = if is_creator {
            self.multiplier_bps(len)
                .checked_add(self.creator_bonus_bps)
                .ok_or(PolicyError::ArithmeticOverflow)?
        } else {
            self.multiplier_bps(len)
        };
        let amount = (self.base_reward as u128) * (bps as u128) / BPS_PRECISION as u128;
        u64::try_from(amount).map_err(|_| PolicyError::ArithmeticOverflow)
    }
}

impl Default for RewardPolicy {
    /// Flat 1.0× below Bronze, then a 0.25× step at each milestone up to
    /// 2.0× at Diamond, with the 10% creator surcharge.
    fn default() -> Self {
        Self {
            base_reward: BASE_REWARD,
            creator_bonus_bps: CREATOR_BONUS_BPS,
            bands: vec![
                StreakBand { min_streak: 0, multiplier_bps: 10_000 },
                StreakBand { min_streak: BRONZE_STREAK, multiplier_bps: 12_500 },
                StreakBand { min_streak: SILVER_STREAK, multiplier_bps: 15_000 },
                StreakBand { min_streak: GOLD_STREAK, multiplier_bps: 17_500 },
                StreakBand { min_streak: DIAMOND_STREAK, multiplier_bps: 20_000 },
            ],
        }
    }
}
