//! # Shared Types Crate
//!
//! This crate contains the domain entities shared by the LogiChain core
//! subsystems and the clock abstraction their temporal rules depend on.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: all cross-subsystem types are defined here.
//! - **Derived identity**: block hashes are always recomputed from header
//!   fields, never trusted from the wire.
//! - **Integer units**: amounts are integer base units and timestamps are
//!   whole Unix seconds; no floating point in consensus-critical fields.

pub mod entities;
pub mod time;

pub use entities::*;
pub use time::{ManualClock, SystemTimeSource, TimeSource};
