//! # Synchronization Session Types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Phases of the reconciliation state machine, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncPhase {
    /// Structural validation of both snapshots.
    Validating,
    /// Pairing operations that exist on both sides with differing content.
    ConflictDetection,
    /// Strategy-chain arbitration of each conflicting pair.
    ConflictResolution,
    /// Divergence metrics over the proposed merge.
    CircuitCheck,
    /// Assembling and committing the merged state.
    Merge,
    /// Terminal: merge committed.
    Complete,
    /// Terminal: merge abandoned, nothing committed.
    Aborted,
}

impl std::fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SyncPhase::Validating => "VALIDATING",
            SyncPhase::ConflictDetection => "CONFLICT_DETECTION",
            SyncPhase::ConflictResolution => "CONFLICT_RESOLUTION",
            SyncPhase::CircuitCheck => "CIRCUIT_CHECK",
            SyncPhase::Merge => "MERGE",
            SyncPhase::Complete => "COMPLETE",
            SyncPhase::Aborted => "ABORTED",
        };
        f.write_str(s)
    }
}

/// Bookkeeping for one in-flight synchronization.
#[derive(Debug, Clone)]
pub struct ActiveSync {
    /// Correlation ID for logs and timeout reporting.
    pub sync_id: Uuid,
    /// When the synchronization was registered (Unix seconds).
    pub started_at: u64,
}
