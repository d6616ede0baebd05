//! Trait interfaces between the engine and its collaborators.
//!
//! - [`PayoutProvider`] — the external ledger/custody collaborator that
//!   actually transfers tokens and mints badges (squad-engine calls it)
//! - [`ClockSource`](crate::clock::ClockSource) — time, in the clock module
//!
//! The engine holds no custody: it decides eligibility and records claims,
//! and delegates value movement here. A claim record is committed only after
//! the provider confirms, so a provider failure leaves eligibility intact.

use crate::error::PayoutError;
use crate::types::{Address, MilestoneTier};

/// External payout and mint collaborator.
///
/// Implementations submit the actual transfer/mint and report success or
/// failure. They should be idempotent per call site but the engine never
/// retries on its own — a failed payout surfaces to the caller as retryable.
pub trait PayoutProvider: Send + Sync {
    /// Transfer `amount` token units to `member`.
    fn submit_token_payout(&self, member: &Address, amount: u64) -> Result<(), PayoutError>;

    /// Mint the badge for `tier` to `member`.
    fn submit_badge_mint(&self, member: &Address, tier: MilestoneTier) -> Result<(), PayoutError>;
}
