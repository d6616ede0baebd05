//! Append-only deposit ledger.
//!
//! Deposits are recorded by the deposit-submission collaborator and only
//! ever read by the engine. Derived state (qualifying cycles, streaks) is
//! recomputed from the raw record on every query — append-only storage with
//! no caches means concurrent readers never see torn state and nothing needs
//! invalidation.
//!
//! Writes are linearized per `(squad, member)` key by the map's shard lock.
//! Relative order of same-instant deposits does not matter: only the
//! existence of a qualifying deposit in a cycle does.

use std::collections::BTreeSet;

use dashmap::DashMap;

use squad_core::types::{Address, Deposit, SquadId};

/// Read/append access to the deposit record.
///
/// A ledger-resident deployment implements this over its own table; the
/// in-memory [`MemoryDepositLedger`] serves tests and in-process use.
pub trait DepositStore: Send + Sync {
    /// Append a deposit. Infallible: the record is append-only and every
    /// validated deposit is accepted.
    fn record(&self, deposit: Deposit);

    /// All deposits by a member in a squad, in insertion order.
    fn deposits(&self, squad_id: SquadId, member: &Address) -> Vec<Deposit>;

    /// The set of cycles in which the member made at least one single
    /// deposit of `min_amount` or more.
    ///
    /// A cycle appears at most once however many deposits landed in it —
    /// later deposits in an already-qualified cycle grow the pool but never
    /// the streak.
    fn qualifying_cycles(
        &self,
        squad_id: SquadId,
        member: &Address,
        min_amount: u64,
    ) -> BTreeSet<u64>;

    /// Whether `cycle` holds a qualifying deposit for the member.
    ///
    /// Default implementation delegates to
    /// [`qualifying_cycles`](Self::qualifying_cycles).
    fn has_qualifying(
        &self,
        squad_id: SquadId,
        member: &Address,
        cycle: u64,
        min_amount: u64,
    ) -> bool {
        self.qualifying_cycles(squad_id, member, min_amount)
            .contains(&cycle)
    }

    /// Total MIST deposited into a squad's pool across all members,
    /// saturating on overflow.
    fn pool_total(&self, squad_id: SquadId) -> u64;
}

/// In-memory deposit ledger.
///
/// Backed by a sharded map keyed per `(squad, member)`; each shard lock
/// linearizes concurrent appends from the same member without blocking
/// unrelated members.
#[derive(Debug, Default)]
pub struct MemoryDepositLedger {
    by_member: DashMap<(SquadId, Address), Vec<Deposit>>,
}

impl MemoryDepositLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of deposits recorded for a squad.
    pub fn deposit_count(&self, squad_id: SquadId) -> usize {
        self.by_member
            .iter()
            .filter(|e| e.key().0 == squad_id)
            .map(|e| e.value().len())
            .sum()
    }
}

impl DepositStore for MemoryDepositLedger {
    fn record(&self, deposit: Deposit) {
        self.by_member
            .entry((deposit.squad_id, deposit.member))
            .or_default()
            .push(deposit);
    }

    fn deposits(&self, squad_id: SquadId, member: &Address) -> Vec<Deposit> {
        self.by_member
            .get(&(squad_id, *member))
            .map(|e| e.value().clone())
            .unwrap_or_default()
    }

    fn qualifying_cycles(
        &self,
        squad_id: SquadId,
        member: &Address,
        min_amount: u64,
    ) -> BTreeSet<u64> {
        self.by_member
            .get(&(squad_id, *member))
            .map(|e| {
                e.value()
                    .iter()
                    .filter(|d| d.amount >= min_amount)
                    .map(|d| d.cycle_index)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn pool_total(&self, squad_id: SquadId) -> u64 {
        self.by_member
            .iter()
            .filter(|e| e.key().0 == squad_id)
            .flat_map(|e| e.value().iter().map(|d| d.amount).collect::<Vec<_>>())
            .fold(0u64, |acc, amt| acc.saturating_add(amt))
    }
}
