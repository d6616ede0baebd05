//! # squad-core
//! Foundation types and pure domain logic for the SaveSquad engine.

pub mod clock;
pub mod constants;
pub mod cycle;
pub mod error;
pub mod milestone;
pub mod policy;
pub mod traits;
pub mod types;
