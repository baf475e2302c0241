//! # Validation Engine Configuration
//!
//! Mode-dependent limits: the mesh partition moves blocks over LoRa radio,
//! so its size and count bounds sit three orders of magnitude below the
//! online network's.

use serde::{Deserialize, Serialize};
use shared_types::NetworkMode;

/// Tunables for the block validation pipeline.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Serialized block size ceiling for online blocks (bytes).
    pub max_block_size_online: u64,
    /// Serialized block size ceiling for offgrid blocks (bytes).
    pub max_block_size_offline: u64,
    /// Transaction count ceiling for online blocks.
    pub max_tx_count_online: usize,
    /// Transaction count ceiling for offgrid blocks.
    pub max_tx_count_offline: usize,
    /// Allowed clock drift into the future (seconds).
    pub max_time_drift_secs: u64,
    /// Minimum distinct trusted signers on an online block.
    pub min_quorum_sigs: usize,
    /// Rejected block hashes kept for audit.
    pub max_rejection_log: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_block_size_online: 1_048_576, // 1 MiB
            max_block_size_offline: 1_024,    // 1 KiB over radio
            max_tx_count_online: 1_000,
            max_tx_count_offline: 10,
            max_time_drift_secs: 300,
            min_quorum_sigs: 3,
            max_rejection_log: 1_000,
        }
    }
}

impl ValidationConfig {
    /// Small limits for tests.
    pub fn for_testing() -> Self {
        Self {
            max_rejection_log: 16,
            ..Default::default()
        }
    }

    /// Size ceiling for the given mode.
    pub fn max_block_size(&self, mode: NetworkMode) -> u64 {
        match mode {
            NetworkMode::Online => self.max_block_size_online,
            NetworkMode::Offline => self.max_block_size_offline,
        }
    }

    /// Transaction-count ceiling for the given mode.
    pub fn max_tx_count(&self, mode: NetworkMode) -> usize {
        match mode {
            NetworkMode::Online => self.max_tx_count_online,
            NetworkMode::Offline => self.max_tx_count_offline,
        }
    }
}
