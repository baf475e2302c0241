//! # LC-01 Validation Engine
//!
//! Mode-dependent consensus-rule enforcement for candidate blocks.
//!
//! ## Pipeline
//!
//! Checks run cheapest-first and short-circuit on the first violation:
//!
//! | # | Check | Notes |
//! |---|-------|-------|
//! | 1 | Size / count limits | Offgrid bounds are radio-budget tight |
//! | 2 | Proof-of-work | U256 target comparison, never floats |
//! | 3 | Temporal order | Bounded future drift, strictly increasing |
//! | 4 | Merkle root | Empty list hashes to `sha256(b"")` |
//! | 5 | Transaction structure | Amounts, endpoints, timestamps |
//! | 6 | Dependency DAG | Iterative cycle detection |
//! | 7 | Quorum signatures | Online mode only, real verification |
//! | 8 | State transition | Defensive copy, all-or-nothing |
//! | 9 | Fork consultation | `Malicious` is fatal, rest advisory |
//!
//! ## Contract
//!
//! `validate_block` never throws and never mutates the caller's state; it
//! returns a `BlockVerdict` whose `reason` string is the audit-trail
//! rendering of the first failed rule.
//!
//! ## Module Structure
//!
//! ```text
//! lc-01-validation/
//! ├── domain/      # rules, DAG check, errors, verdict
//! ├── state.rs     # bounded rejection audit log
//! ├── service.rs   # BlockValidator pipeline
//! └── config.rs    # ValidationConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod domain;
pub mod service;
pub mod state;

// Re-exports
pub use config::ValidationConfig;
pub use domain::{check_dependency_cycles, BlockVerdict, ValidationError};
pub use service::BlockValidator;
pub use state::{RejectionLog, RejectionRecord};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
