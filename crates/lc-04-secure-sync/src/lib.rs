//! # LC-04 Secure Synchronizer
//!
//! Cross-partition state reconciliation for the dual-network chain: when
//! an offgrid mesh partition reconnects, its accumulated `NetworkState`
//! and the online network's are merged into one authoritative snapshot.
//!
//! ## State machine
//!
//! ```text
//! VALIDATING -> CONFLICT_DETECTION -> CONFLICT_RESOLUTION
//!            -> CIRCUIT_CHECK -> MERGE -> { COMPLETE | ABORTED }
//! ```
//!
//! ## Guarantees
//!
//! - **All-or-nothing**: an aborted merge commits nothing.
//! - **Deterministic**: conflict resolution depends only on the two input
//!   snapshots, so independent nodes reconciling the same pair converge
//!   on identical results.
//! - **Replay-proof across rounds**: merged operation IDs are remembered
//!   and NonceGuard watermarks advance on commit, so a previously merged
//!   operation cannot re-enter through a later synchronization.
//! - **Abuse-limited**: one in-flight session per node, sessions expire at
//!   the timeout, and nodes with a failure streak are refused for the
//!   suspicion window.
//!
//! ## Module Structure
//!
//! ```text
//! lc-04-secure-sync/
//! ├── domain/      # validation, conflicts, merging, circuit breaker
//! ├── ports/       # ConfirmationProvider (external quorum data)
//! ├── state.rs     # SyncRegistry (admission, suspicion)
//! ├── service.rs   # SecureSynchronizer
//! └── config.rs    # SyncConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod domain;
pub mod ports;
pub mod service;
pub mod state;

// Re-exports
pub use config::SyncConfig;
pub use domain::{
    BreakReason, CircuitBreaker, Conflict, ConflictStrategy, QuorumStrategy, StateMetrics,
    SyncError, SyncPhase, TimestampStrategy, Winner, WorkStrategy,
};
pub use ports::{ConfirmationProvider, NoConfirmationData};
pub use service::SecureSynchronizer;
pub use state::SyncRegistry;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
