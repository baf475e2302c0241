//! # Fork Store
//!
//! The mutable registry behind the detector: live chain tips, recorded fork
//! validations, and the permanent malicious-fork memory. The service wraps
//! the whole store in one mutex because the cleanup sweep and the candidate
//! scan both need a consistent view of every entry.

use crate::config::ForkDetectorConfig;
use crate::domain::{ForkId, ForkValidation};
use shared_types::{ChainTip, Hash};
use std::collections::{HashMap, HashSet};

/// Registry of observed tips and validated forks.
#[derive(Debug, Default)]
pub struct ForkStore {
    /// Live tips by block hash.
    pub tips: HashMap<Hash, ChainTip>,
    /// Fork validations by canonical pair identity.
    pub validations: HashMap<ForkId, ForkValidation>,
    /// Fork pairs ever classified malicious. Never pruned.
    pub malicious: HashSet<ForkId>,
}

impl ForkStore {
    /// Sweep entries past their time bound. Malicious memory is kept
    /// forever so a condemned pair can never re-enter through expiry.
    pub fn prune(&mut self, now: u64, config: &ForkDetectorConfig) {
        self.tips
            .retain(|_, tip| now.saturating_sub(tip.timestamp) <= config.tip_ttl_secs);
        self.validations.retain(|_, validation| {
            let newest = validation
                .main_tip
                .timestamp
                .max(validation.fork_tip.timestamp);
            now.saturating_sub(newest) <= config.validation_ttl_secs
        });
    }
}
