//! Integration test suite for the SaveSquad engine.
//!
//! These tests drive the engine through multi-cycle member lifecycles with a
//! controllable clock and a scriptable payout provider, verifying the
//! exactly-once claim guarantees and streak semantics end to end.

pub mod helpers;
