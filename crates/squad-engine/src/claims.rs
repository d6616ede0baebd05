//! Append-only claim ledger: the source of exactly-once semantics.
//!
//! For a given claim key at most one honored claim ever exists. The record
//! is committed only after the external payout confirms, so claiming is a
//! three-step protocol:
//!
//! 1. [`try_begin`](ClaimStore::try_begin) — one atomic check-and-reserve of
//!    the key. Exactly one of any number of concurrent attempts wins.
//! 2. The caller runs the external payout.
//! 3. [`finalize`](ClaimStore::finalize) on success (the claim becomes
//!    durable and immutable), or [`abort`](ClaimStore::abort) on payout
//!    failure (the key is released and the member stays eligible).
//!
//! A key with an in-flight reservation reports as claimed to concurrent
//! observers; if its payout then fails the reservation is released and a
//! retry is clean.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use squad_core::types::{Address, Claim, ClaimKey, SquadId};

/// State of a claim key in the ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
enum ClaimSlot {
    /// Reserved by an in-flight claim; payout not yet confirmed.
    Pending,
    /// Payout confirmed; the durable record.
    Honored(Claim),
}

/// Read/append access to the claim record.
pub trait ClaimStore: Send + Sync {
    /// Atomically reserve `key` if it is neither reserved nor honored.
    ///
    /// Returns `true` to exactly one caller per key lifetime; every
    /// concurrent or later caller gets `false` until the reservation is
    /// aborted.
    fn try_begin(&self, key: ClaimKey) -> bool;

    /// Commit the claim for a previously reserved key.
    fn finalize(&self, claim: Claim);

    /// Release a reserved key after payout failure. Honored claims are
    /// never released.
    fn abort(&self, key: &ClaimKey);

    /// Whether `key` is reserved or honored.
    fn is_claimed(&self, key: &ClaimKey) -> bool;

    /// Honored claims of a member in a squad.
    fn claims(&self, squad_id: SquadId, member: &Address) -> Vec<Claim>;
}

/// In-memory claim ledger.
///
/// The sharded map's entry API makes [`try_begin`](ClaimStore::try_begin) a
/// single atomic insert-if-absent: no outer lock, no check-then-act window
/// on the claim path.
#[derive(Debug, Default)]
pub struct MemoryClaimLedger {
    slots: DashMap<ClaimKey, ClaimSlot>,
}

impl MemoryClaimLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of honored claims across all keys.
    pub fn honored_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|e| matches!(e.value(), ClaimSlot::Honored(_)))
            .count()
    }
}

impl ClaimStore for MemoryClaimLedger {
    fn try_begin(&self, key: ClaimKey) -> bool {
        match self.slots.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(ClaimSlot::Pending);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    fn finalize(&self, claim: Claim) {
        self.slots.insert(claim.key, ClaimSlot::Honored(claim));
    }

    fn abort(&self, key: &ClaimKey) {
        self.slots
            .remove_if(key, |_, slot| *slot == ClaimSlot::Pending);
    }

    fn is_claimed(&self, key: &ClaimKey) -> bool {
        self.slots.contains_key(key)
    }

    fn claims(&self, squad_id: SquadId, member: &Address) -> Vec<Claim> {
        self.slots
            .iter()
            .filter_map(|e| match e.value() {
                ClaimSlot::Honored(claim)
                    if claim.key.squad_id == squad_id && claim.key.member == *member =>
                {
                    Some(claim.clone())
                }
                _ => None,
            })
            .collect()
    }
}
