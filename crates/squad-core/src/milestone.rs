//! Milestone evaluation over the fixed threshold schedule.
//!
//! The schedule is static (Bronze 4, Silver 8, Gold 12, Diamond 24 cycles)
//! and consulted by value — there is no stored milestone entity. Whether a
//! badge may actually be minted again after a streak reset is decided by
//! claim-key uniqueness in the eligibility layer, not here.

use crate::types::MilestoneTier;

/// Tiers newly entered by a streak advancing from `previous_len` to `new_len`.
///
/// Returns every tier `t` with `previous_len < threshold(t) <= new_len`, in
/// ascending order. A jump over several thresholds (e.g. a backfilled
/// history) crosses all of them at once. Returns nothing when the streak
/// shrank or stood still.
///
/// # Examples
///
/// ```
/// use squad_core::milestone::crossed_milestones;
/// use squad_core::types::MilestoneTier;
/// assert_eq!(crossed_milestones(3, 4), vec![MilestoneTier::Bronze]);
/// assert_eq!(
///     crossed_milestones(3, 9),
///     vec![MilestoneTier::Bronze, MilestoneTier::Silver]
/// );
/// assert!(crossed_milestones(4, 4).is_empty());
/// ```
pub fn crossed_milestones(previous_len: u64, new_len: u64) -> Vec<MilestoneTier> {
    MilestoneTier::ASCENDING
        .into_iter()
        .filter(|t| previous_len < t.threshold() && t.threshold() <= new_len)
        .collect()
}

/// The highest tier a streak of `len` cycles has reached, if any.
pub fn highest_reached(len: u64) -> Option<MilestoneTier> {
    MilestoneTier::ASCENDING
        .into_iter()
        .rev()
        .find(|t| t.threshold() <= len)
}

/// The next tier ahead of a streak of `len` cycles, with how many more
/// consecutive qualifying cycles it needs. `None` once Diamond is reached.
pub fn next_milestone(len: u64) -> Option<(MilestoneTier, u64)> {
    MilestoneTier::ASCENDING
        .into_iter()
        .find(|t| t.threshold() > len)
        .map(|t| (t, t.threshold() - len))
}
