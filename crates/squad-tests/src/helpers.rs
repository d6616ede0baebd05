//! Shared test helpers for the engine integration tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use squad_core::clock::FixedClock;
use squad_core::constants::CYCLE_LENGTH_SECS;
use squad_core::error::PayoutError;
use squad_core::traits::PayoutProvider;
use squad_core::types::{Address, MilestoneTier, SquadId};
use squad_engine::engine::SquadEngine;

/// Epoch for every scenario. An arbitrary real timestamp so off-by-one bugs
/// near zero cannot hide.
pub const T0: u64 = 1_700_000_000;

/// Install a tracing subscriber honoring `RUST_LOG`, once per process.
/// Later calls are no-ops so parallel tests can all ask for it.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// One cycle, for readable arithmetic in scenarios.
pub const WEEK: u64 = CYCLE_LENGTH_SECS;

/// Member address from a seed byte.
pub fn addr(seed: u8) -> Address {
    Address([seed; 32])
}

/// Payout provider that records submissions and can be told to fail.
pub struct ScriptablePayout {
    fail_next: AtomicBool,
    token_payouts: AtomicU64,
    badge_mints: AtomicU64,
}

impl ScriptablePayout {
    pub fn new() -> Self {
        Self {
            fail_next: AtomicBool::new(false),
            token_payouts: AtomicU64::new(0),
            badge_mints: AtomicU64::new(0),
        }
    }

    /// Makes the next submission fail, then recover.
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn token_payouts(&self) -> u64 {
        self.token_payouts.load(Ordering::SeqCst)
    }

    pub fn badge_mints(&self) -> u64 {
        self.badge_mints.load(Ordering::SeqCst)
    }

    fn gate(&self) -> Result<(), PayoutError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(PayoutError::Unavailable("scripted outage".into()));
        }
        Ok(())
    }
}

impl Default for ScriptablePayout {
    fn default() -> Self {
        Self::new()
    }
}

impl PayoutProvider for ScriptablePayout {
    fn submit_token_payout(&self, _member: &Address, _amount: u64) -> Result<(), PayoutError> {
        self.gate()?;
        self.token_payouts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn submit_badge_mint(&self, _member: &Address, _tier: MilestoneTier) -> Result<(), PayoutError> {
        self.gate()?;
        self.badge_mints.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// An engine wired to a fixed clock and a scriptable payout provider.
pub struct TestBench {
    pub engine: Arc<SquadEngine>,
    pub clock: Arc<FixedClock>,
    pub payout: Arc<ScriptablePayout>,
}

impl TestBench {
    pub fn new() -> Self {
        init_tracing();
        let clock = Arc::new(FixedClock::new(T0));
        let payout = Arc::new(ScriptablePayout::new());
        let engine = Arc::new(SquadEngine::new(clock.clone(), payout.clone()));
        Self { engine, clock, payout }
    }

    /// Creates a squad with `target` and the creator `addr(1)`, at `T0`.
    pub fn squad(&self, target: u64) -> SquadId {
        self.engine
            .create_squad("integration", addr(1), target, None)
            .unwrap()
            .id
    }

    /// Jumps the clock to `secs` after squad creation.
    pub fn at(&self, secs: u64) {
        self.clock.set(T0 + secs);
    }

    /// Deposits `amount` for `member` at `secs` after creation.
    pub fn deposit_at(&self, squad: SquadId, member: Address, amount: u64, secs: u64) {
        self.at(secs);
        self.engine.record_deposit(squad, member, amount).unwrap();
    }
}

impl Default for TestBench {
    fn default() -> Self {
        Self::new()
    }
}
