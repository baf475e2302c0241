//! # Synchronization Errors
//!
//! Every abort reason the synchronizer can produce. A failed merge is
//! abandoned as a unit; these errors are the caller's only signal, so the
//! messages double as the audit-trail strings.

use shared_types::NodeId;
use thiserror::Error;
use uuid::Uuid;

/// Reasons a synchronization aborts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// One of the snapshots failed structural validation.
    #[error("Invalid state format: {detail}")]
    InvalidStateFormat {
        /// Which structural rule failed.
        detail: String,
    },

    /// Divergence metrics over the proposed merge exceeded thresholds, or
    /// a component has failed repeatedly.
    #[error("Circuit breaker activated")]
    CircuitBreakerOpen,

    /// The node already has a synchronization in flight.
    #[error("Synchronization already in progress for node {0}")]
    AlreadySyncing(NodeId),

    /// The node earned a timeout/failure streak and is refused for the
    /// suspicion window.
    #[error("Node {0} is suspicious, synchronization refused")]
    NodeSuspicious(NodeId),

    /// The synchronization did not commit inside the timeout.
    #[error("Synchronization {0} timed out")]
    TimedOut(Uuid),
}

impl SyncError {
    /// The component name failure accounting files this error under.
    pub fn component(&self) -> &'static str {
        match self {
            SyncError::InvalidStateFormat { .. } => "validation",
            SyncError::CircuitBreakerOpen => "circuit_breaker",
            SyncError::AlreadySyncing(_) => "registry",
            SyncError::NodeSuspicious(_) => "registry",
            SyncError::TimedOut(_) => "timeout",
        }
    }
}
