//! # squad-engine
//! Stateful core of the SaveSquad incentive tracker: append-only deposit and
//! claim ledgers, streak derivation, reward eligibility, and the
//! [`SquadEngine`](engine::SquadEngine) service that composes them.

pub mod claims;
pub mod deposit;
pub mod eligibility;
pub mod engine;
pub mod streak;
