//! Protocol constants. Deposits are denominated in MIST (1 SUI = 10^9 MIST);
//! reward tokens in squad units (1 SQUAD = 10^6 units).

/// Smallest deposit currency unit: 1 SUI = 10^9 MIST.
pub const MIST: u64 = 1_000_000_000;

/// Smallest reward token unit: 1 SQUAD = 10^6 units.
pub const SQUAD_TOKEN_UNIT: u64 = 1_000_000;

/// Absolute floor on any recorded deposit (0.001 SUI).
///
/// The per-squad qualifying threshold is `Squad::weekly_target`, which may
/// be higher but never lower than this.
pub const MIN_DEPOSIT: u64 = 1_000_000;

/// Length of one deposit cycle in seconds (seven days).
///
/// Fixed at squad creation time for the lifetime of the squad: cycle `k`
/// spans `[created_at + k * CYCLE_LENGTH_SECS, created_at + (k + 1) *
/// CYCLE_LENGTH_SECS)`.
///
/// # Examples
///
/// ```
/// use squad_core::constants::CYCLE_LENGTH_SECS;
/// assert_eq!(CYCLE_LENGTH_SECS, 604_800);
/// ```
pub const CYCLE_LENGTH_SECS: u64 = 7 * 24 * 60 * 60;

/// Default member cap for a new squad.
pub const DEFAULT_MAX_MEMBERS: u32 = 10;

/// Maximum length of a squad name in bytes.
pub const MAX_SQUAD_NAME_LEN: usize = 64;

/// Base token reward per qualifying cycle, before multipliers.
pub const BASE_REWARD: u64 = 10 * SQUAD_TOKEN_UNIT;

/// Creator surcharge applied to reward amounts, in basis points (10%).
pub const CREATOR_BONUS_BPS: u64 = 1_000;

/// Basis-point denominator.
pub const BPS_PRECISION: u64 = 10_000;

/// Streak length unlocking the Bronze badge.
pub const BRONZE_STREAK: u64 = 4;
/// Streak length unlocking the Silver badge.
pub const SILVER_STREAK: u64 = 8;
/// Streak length unlocking the Gold badge.
pub const GOLD_STREAK: u64 = 12;
/// Streak length unlocking the Diamond badge.
pub const DIAMOND_STREAK: u64 = 24;
