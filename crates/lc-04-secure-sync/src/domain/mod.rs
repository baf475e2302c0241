//! # Domain Module
//!
//! Pure reconciliation logic: snapshot validation, conflict detection and
//! resolution, state merging, and the circuit breaker.

pub mod breaker;
pub mod conflict;
pub mod entities;
pub mod errors;
pub mod merge;
pub mod validate;

pub use breaker::{BreakReason, CircuitBreaker, StateMetrics};
pub use conflict::{
    detect_conflicts, index_operations, operations_conflict, resolve_conflict, Conflict,
    ConflictStrategy, QuorumStrategy, TimestampStrategy, Winner, WorkStrategy,
};
pub use entities::{ActiveSync, SyncPhase};
pub use errors::SyncError;
pub use merge::{assemble_merged_state, merge_node_states, node_state_timestamp};
pub use validate::{validate_operation, validate_states};
