//! Cycle arithmetic: mapping instants to deposit windows.
//!
//! A squad's cycle boundaries are fixed forever by its `created_at`:
//! - Cycle 0 spans `[created_at, created_at + CYCLE_LENGTH_SECS)`
//! - Cycle k spans `[created_at + k * CYCLE_LENGTH_SECS, created_at + (k + 1) * CYCLE_LENGTH_SECS)`
//!
//! All functions are pure and monotonic in `now`: as `now` advances the
//! cycle index never decreases, and `remaining_secs` is always in
//! `[0, CYCLE_LENGTH_SECS)`.

use crate::constants::CYCLE_LENGTH_SECS;
use crate::error::CycleError;
use crate::types::CyclePosition;

/// The cycle index open at `now` for a squad created at `created_at`.
///
/// `cycle_index = (now - created_at) / CYCLE_LENGTH_SECS`, so the instant a
/// cycle ends is the instant the next one begins.
///
/// # Errors
///
/// [`CycleError::InvalidTimeRange`] when `now < created_at`.
pub fn cycle_index(created_at: u64, now: u64) -> Result<u64, CycleError> {
    if now < created_at {
        return Err(CycleError::InvalidTimeRange { now, created_at });
    }
    Ok((now - created_at) / CYCLE_LENGTH_SECS)
}

/// Start instant (inclusive) of cycle `index`.
///
/// Saturates at `u64::MAX` for indices beyond representable time.
pub fn cycle_start(created_at: u64, index: u64) -> u64 {
    created_at.saturating_add(index.saturating_mul(CYCLE_LENGTH_SECS))
}

/// End instant (exclusive) of cycle `index`.
pub fn cycle_end(created_at: u64, index: u64) -> u64 {
    cycle_start(created_at, index).saturating_add(CYCLE_LENGTH_SECS)
}

/// Full position within the open cycle at `now`.
///
/// `remaining_secs` counts the whole seconds strictly after `now` before the
/// cycle closes: `CYCLE_LENGTH_SECS - 1` at the cycle's first second, 0 at
/// its last. The invariant `0 <= remaining_secs < CYCLE_LENGTH_SECS` holds
/// for every valid `now`.
///
/// # Errors
///
/// [`CycleError::InvalidTimeRange`] when `now < created_at`.
pub fn cycle_position(created_at: u64, now: u64) -> Result<CyclePosition, CycleError> {
    let index = cycle_index(created_at, now)?;
    let start = cycle_start(created_at, index);
    let end = cycle_end(created_at, index);
    Ok(CyclePosition {
        cycle_index: index,
        cycle_start: start,
        cycle_end: end,
        remaining_secs: end - now - 1,
    })
}

/// The most recently closed cycle at `now`, or `None` while cycle 0 is
/// still open.
///
/// Token rewards are strictly retroactive: only this cycle's deposit result
/// is final and claimable.
pub fn last_closed_cycle(created_at: u64, now: u64) -> Result<Option<u64>, CycleError> {
    Ok(cycle_index(created_at, now)?.checked_sub(1))
}
