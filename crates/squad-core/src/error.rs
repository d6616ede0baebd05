//! Error types for the SaveSquad engine.
use thiserror::Error;

use crate::types::{Address, ClaimKey, SquadId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CycleError {
    #[error("invalid time range: now {now} precedes squad creation {created_at}")]
    InvalidTimeRange { now: u64, created_at: u64 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SquadError {
    #[error("unknown squad: {0}")] UnknownSquad(SquadId),
    #[error("squad inactive: {0}")] SquadInactive(SquadId),
    #[error("squad full: {id} at {max} members")] SquadFull { id: SquadId, max: u32 },
    #[error("already a member: {member} in {id}")] AlreadyMember { id: SquadId, member: Address },
    #[error("not a member: {member} in {id}")] NotMember { id: SquadId, member: Address },
    #[error("empty squad name")] EmptyName,
    #[error("squad name too long: {len} > {max}")] NameTooLong { len: usize, max: usize },
    #[error("weekly target below minimum: {target} < {min}")] TargetTooLow { target: u64, min: u64 },
    #[error("member cap must be at least 1")] ZeroMemberCap,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DepositError {
    #[error("deposit below minimum: {amount} < {min}")] BelowMinimum { amount: u64, min: u64 },
    #[error("deposit amount overflow")] AmountOverflow,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClaimError {
    #[error("not eligible: {0}")] NotEligible(String),
    #[error("already claimed: {0}")] AlreadyClaimed(ClaimKey),
    #[error("payout failed: {0}")] PayoutFailed(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PayoutError {
    #[error("payout rejected: {0}")] Rejected(String),
    #[error("payout collaborator unavailable: {0}")] Unavailable(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("streak bands not strictly ascending at index {0}")] BandsNotAscending(usize),
    #[error("empty streak band table")] EmptyBands,
    #[error("first band must start at streak 0, got {0}")] FirstBandNonZero(u64),
    #[error("arithmetic overflow")] ArithmeticOverflow,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error(transparent)] Cycle(#[from] CycleError),
    #[error(transparent)] Squad(#[from] SquadError),
    #[error(transparent)] Deposit(#[from] DepositError),
    #[error(transparent)] Claim(#[from] ClaimError),
    #[error(transparent)] Policy(#[from] PolicyError),
}
