//! # Fork Detector Configuration

use serde::{Deserialize, Serialize};

/// Tunables for fork discovery and classification.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ForkDetectorConfig {
    /// Maximum blocks walked backward when searching for a common ancestor;
    /// forks deeper than this are stale.
    pub max_fork_depth: u64,
    /// Minimum absolute score for a fork tip to stay in contention.
    pub min_fork_score: f64,
    /// A fork scoring below this fraction of the main tip is orphaned.
    pub orphan_score_ratio: f64,
    /// A fork scoring above this multiple of the main tip signals score
    /// manipulation.
    pub manipulation_score_ratio: f64,
    /// Tips unseen for this long are swept from the registry (seconds).
    pub tip_ttl_secs: u64,
    /// Fork validations older than this are swept (seconds).
    pub validation_ttl_secs: u64,
    /// Competing tips must have been observed within this window (seconds).
    pub fork_window_secs: u64,
    /// A fork tip this far behind the main tip is stale (seconds).
    pub stale_age_secs: u64,
    /// A fork tip this far ahead of the main tip is stale (seconds).
    pub future_window_secs: u64,
    /// Two tips produced closer together than this signal double-production
    /// (seconds).
    pub rapid_production_secs: u64,
    /// More than this many competing forks from one miner inside
    /// `miner_window_secs` is malicious.
    pub miner_fork_limit: usize,
    /// Window for the per-miner fork count (seconds).
    pub miner_window_secs: u64,
}

impl Default for ForkDetectorConfig {
    fn default() -> Self {
        Self {
            max_fork_depth: 100,
            min_fork_score: 0.8,
            orphan_score_ratio: 0.9,
            manipulation_score_ratio: 1.5,
            tip_ttl_secs: 3_600,
            validation_ttl_secs: 86_400,
            fork_window_secs: 3_600,
            stale_age_secs: 3_600,
            future_window_secs: 300,
            rapid_production_secs: 5,
            miner_fork_limit: 3,
            miner_window_secs: 86_400,
        }
    }
}

impl ForkDetectorConfig {
    /// Shallow limits for tests.
    pub fn for_testing() -> Self {
        Self {
            max_fork_depth: 10,
            ..Default::default()
        }
    }
}
