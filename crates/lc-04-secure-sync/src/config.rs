//! # Synchronizer Configuration

use serde::{Deserialize, Serialize};

/// Tunables for partition reconciliation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Allowed drift between a snapshot timestamp and the local clock
    /// (seconds). Mesh clocks wander, so this is generous.
    pub max_time_drift_secs: u64,
    /// Timestamp gap below which two copies of an operation are considered
    /// the same event (seconds).
    pub conflict_tolerance_secs: u64,
    /// A synchronization not committed within this bound is expired
    /// (seconds).
    pub sync_timeout_secs: u64,
    /// Failed or expired attempts inside `failure_window_secs` before the
    /// node is marked suspicious.
    pub max_failed_attempts: usize,
    /// Window for the per-node failure count (seconds).
    pub failure_window_secs: u64,
    /// How long a suspicious node stays refused (seconds).
    pub suspicion_secs: u64,
    /// Previously merged operation IDs remembered for replay detection.
    pub replay_cache_size: usize,
    /// Minimum fraction of node sub-states that must agree.
    pub min_node_agreement: f64,
    /// Maximum allowed spread in per-node operation counts.
    pub max_op_count_diff: usize,
    /// Component failures inside `breaker_reset_secs` before the breaker
    /// opens.
    pub breaker_max_failures: u32,
    /// Quiet period after which component failure counters reset (seconds).
    pub breaker_reset_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_time_drift_secs: 3_600,
            conflict_tolerance_secs: 1,
            sync_timeout_secs: 3_600,
            max_failed_attempts: 3,
            failure_window_secs: 3_600,
            suspicion_secs: 3_600,
            replay_cache_size: 1_000,
            min_node_agreement: 0.67,
            max_op_count_diff: 1_000,
            breaker_max_failures: 3,
            breaker_reset_secs: 3_600,
        }
    }
}

impl SyncConfig {
    /// Small bounds for tests.
    pub fn for_testing() -> Self {
        Self {
            replay_cache_size: 64,
            ..Default::default()
        }
    }
}
