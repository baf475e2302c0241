//! # LC-02 Fork Detection
//!
//! Competing-tip discovery, common-ancestor search and malicious-fork
//! scoring for the dual-partition chain.
//!
//! ## Problem
//!
//! With an online quorum network and an offgrid mesh partition mining
//! against the same ledger, honest operation produces occasional forks.
//! The detector has to separate those from replay mills and score-inflation
//! attacks without ever silently accepting an unverifiable tip.
//!
//! ## Approach
//!
//! 1. Every validated tip is registered in a time-pruned registry.
//! 2. Tips at the same height with a different parent, seen inside the
//!    fork window, form candidate pairs.
//! 3. A bounded backward walk over the registry finds the common ancestor.
//! 4. The pair is classified `Stale` / `Orphaned` / `Malicious` /
//!    `Divergent`; condemned pairs are remembered forever.
//!
//! The registry lives behind one mutex: cleanup sweeps and candidate scans
//! iterate the whole map, so per-entry locking would buy nothing but races.
//!
//! ## Module Structure
//!
//! ```text
//! lc-02-fork-detection/
//! ├── domain/      # ForkId, ForkValidation, tip scoring
//! ├── state.rs     # ForkStore (tips, validations, malicious memory)
//! ├── service.rs   # ForkDetector
//! └── config.rs    # ForkDetectorConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod domain;
pub mod service;
pub mod state;

// Re-exports
pub use config::ForkDetectorConfig;
pub use domain::scoring::{
    EXPECTED_MESH_CONFIRMATIONS, EXPECTED_QUORUM_CONFIRMATIONS, MAX_ACCEPTABLE_LATENCY_SECS,
};
pub use domain::{
    score_tip, DivergenceInfo, ForkDetails, ForkId, ForkValidation, TipEvidence, TipSummary,
};
pub use service::ForkDetector;
pub use state::ForkStore;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
