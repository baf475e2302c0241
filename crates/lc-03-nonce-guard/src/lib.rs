//! # LC-03 NonceGuard
//!
//! Per-sender monotonic nonce tracking with a bounded sliding window.
//!
//! ## Purpose
//!
//! Detect replays and resubmission double-spends before they reach the
//! ledger:
//! - a nonce at or below the confirmed watermark is a **replay**;
//! - a nonce already reserved is a **double-submit**;
//! - a nonce far beyond the watermark is an attempt to grow the pending set
//!   without bound and is rejected by the **sliding window**.
//!
//! ## Guarantees
//!
//! - `last_used` only advances on confirmation, and never regresses; this
//!   monotonic watermark is what stops an operation merged in one
//!   synchronization round from replaying in a later one.
//! - For any sender, confirmed nonces form a strictly increasing sequence
//!   with no gap wider than the configured window.
//!
//! ## Module Structure
//!
//! ```text
//! lc-03-nonce-guard/
//! ├── domain/      # NonceState, NonceError
//! ├── ports/       # NonceStore persistence port
//! ├── service.rs   # NonceLedger<K>
//! └── config.rs    # NonceGuardConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use config::NonceGuardConfig;
pub use domain::{NonceError, NonceState};
pub use ports::{InMemoryNonceStore, NonceStore};
pub use service::NonceLedger;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
