//! # Fork Detector Service
//!
//! Watches every accepted chain tip for competitors: tips at the same
//! height with a different parent, observed inside the fork window. For
//! each competing pair it locates the common ancestor by bounded backward
//! walk, classifies the fork, and remembers the verdict under the pair's
//! canonical identity so re-detection is idempotent.
//!
//! Classification errs toward caution: anything that cannot be positively
//! cleared or condemned lands on `Divergent`, never on silent acceptance.

use crate::config::ForkDetectorConfig;
use crate::domain::{DivergenceInfo, ForkDetails, ForkId, ForkValidation, TipSummary};
use crate::state::ForkStore;
use parking_lot::Mutex;
use shared_types::{ChainTip, ForkStatus, Hash, SystemTimeSource, TimeSource};
use std::collections::HashSet;
use std::sync::Arc;

/// Competing-tip discovery and malicious-fork scoring.
pub struct ForkDetector {
    config: ForkDetectorConfig,
    time: Arc<dyn TimeSource>,
    store: Mutex<ForkStore>,
}

impl ForkDetector {
    /// Create a detector using the system clock.
    pub fn new(config: ForkDetectorConfig) -> Self {
        Self::with_time_source(config, Arc::new(SystemTimeSource))
    }

    /// Create a detector with an injected clock.
    pub fn with_time_source(config: ForkDetectorConfig, time: Arc<dyn TimeSource>) -> Self {
        Self {
            config,
            time,
            store: Mutex::new(ForkStore::default()),
        }
    }

    /// Create a detector with default configuration and the system clock.
    pub fn with_defaults() -> Self {
        Self::new(ForkDetectorConfig::default())
    }

    /// Register a newly validated tip and classify it against every other
    /// live tip. Returns the most severe classification found; `Valid`
    /// when no competing tip exists.
    pub fn check_fork(&self, tip: ChainTip) -> ForkStatus {
        let now = self.time.now();
        let mut store = self.store.lock();
        store.prune(now, &self.config);
        store.tips.insert(tip.block_hash, tip.clone());

        let candidates = Self::find_candidates(&store, &tip, &self.config);
        if candidates.is_empty() {
            return ForkStatus::Valid;
        }

        let mut worst = ForkStatus::Valid;
        for candidate in candidates {
            let Some((ancestor, divergence_height)) = Self::find_common_ancestor(
                &store,
                &tip,
                &candidate,
                self.config.max_fork_depth,
            ) else {
                // No provable relationship inside the walk bound; nothing
                // to classify for this pair.
                continue;
            };

            let fork_id = ForkId::new(tip.block_hash, candidate.block_hash);
            if store.malicious.contains(&fork_id) {
                tracing::warn!(%fork_id, "tip pairs with a condemned fork");
                return ForkStatus::Malicious;
            }

            let status = self.classify(&store, &tip, &candidate, divergence_height);

            store.validations.insert(
                fork_id,
                ForkValidation {
                    fork_id,
                    status,
                    main_tip: tip.clone(),
                    fork_tip: candidate.clone(),
                    common_ancestor: ancestor,
                    divergence_height,
                    details: ForkDetails {
                        main_chain: TipSummary::from(&tip),
                        fork_chain: TipSummary::from(&candidate),
                        divergence: DivergenceInfo {
                            ancestor,
                            height: divergence_height,
                            depth: tip.height.saturating_sub(divergence_height),
                        },
                    },
                },
            );

            if status == ForkStatus::Malicious {
                store.malicious.insert(fork_id);
                tracing::warn!(
                    %fork_id,
                    miner = %hex::encode(candidate.miner),
                    "fork condemned as malicious"
                );
                return ForkStatus::Malicious;
            }

            tracing::debug!(%fork_id, %status, "fork classified");
            worst = worst.max(status);
        }

        worst
    }

    /// Recorded validation for a fork pair, if any.
    pub fn get_fork_status(&self, fork_id: &ForkId) -> Option<ForkValidation> {
        self.store.lock().validations.get(fork_id).cloned()
    }

    /// Whether the pair was ever condemned.
    pub fn is_malicious(&self, fork_id: &ForkId) -> bool {
        self.store.lock().malicious.contains(fork_id)
    }

    /// Sweep expired tips and validations.
    pub fn prune_expired(&self) {
        let now = self.time.now();
        self.store.lock().prune(now, &self.config);
    }

    /// Number of live tips.
    pub fn tip_count(&self) -> usize {
        self.store.lock().tips.len()
    }

    fn find_candidates(
        store: &ForkStore,
        tip: &ChainTip,
        config: &ForkDetectorConfig,
    ) -> Vec<ChainTip> {
        store
            .tips
            .values()
            .filter(|other| {
                other.block_hash != tip.block_hash
                    && other.height == tip.height
                    && other.parent_hash != tip.parent_hash
                    && tip.timestamp.abs_diff(other.timestamp) <= config.fork_window_secs
            })
            .cloned()
            .collect()
    }

    /// Walk both chains backward through the tip registry until they meet,
    /// bounded by `max_depth` steps. Each side keeps a visited set; the
    /// first hash seen from both sides is the common ancestor.
    fn find_common_ancestor(
        store: &ForkStore,
        tip1: &ChainTip,
        tip2: &ChainTip,
        max_depth: u64,
    ) -> Option<(Hash, u64)> {
        let mut current1 = tip1.clone();
        let mut current2 = tip2.clone();

        let mut visited1: HashSet<Hash> = HashSet::from([tip1.block_hash]);
        let mut visited2: HashSet<Hash> = HashSet::from([tip2.block_hash]);

        for _ in 0..max_depth {
            if current1.parent_hash == current2.parent_hash {
                return Some((current1.parent_hash, current1.height.saturating_sub(1)));
            }

            if let Some(parent) = store.tips.get(&current1.parent_hash) {
                current1 = parent.clone();
                visited1.insert(current1.block_hash);
            }
            if let Some(parent) = store.tips.get(&current2.parent_hash) {
                current2 = parent.clone();
                visited2.insert(current2.block_hash);
            }

            if visited2.contains(&current1.block_hash) {
                return Some((current1.block_hash, current1.height));
            }
            if visited1.contains(&current2.block_hash) {
                return Some((current2.block_hash, current2.height));
            }
        }

        None
    }

    fn classify(
        &self,
        store: &ForkStore,
        main: &ChainTip,
        fork: &ChainTip,
        divergence_height: u64,
    ) -> ForkStatus {
        let depth = main.height.saturating_sub(divergence_height);
        if depth > self.config.max_fork_depth {
            return ForkStatus::Stale;
        }

        // Too far in the past or the future relative to the main tip.
        if main.timestamp.saturating_sub(fork.timestamp) > self.config.stale_age_secs
            || fork.timestamp.saturating_sub(main.timestamp) > self.config.future_window_secs
        {
            return ForkStatus::Stale;
        }

        if fork.score < self.config.min_fork_score
            || fork.score < main.score * self.config.orphan_score_ratio
        {
            return ForkStatus::Orphaned;
        }

        if self.matches_malicious_pattern(store, main, fork) {
            return ForkStatus::Malicious;
        }

        // Nothing cleared it and nothing condemned it: a live fork.
        ForkStatus::Divergent
    }

    fn matches_malicious_pattern(
        &self,
        store: &ForkStore,
        main: &ChainTip,
        fork: &ChainTip,
    ) -> bool {
        // Serial forker: this miner's competing tips inside the window,
        // counting the pair under classification.
        let miner_forks = store
            .validations
            .values()
            .filter(|v| {
                v.fork_tip.miner == fork.miner
                    && main.timestamp.saturating_sub(v.fork_tip.timestamp)
                        < self.config.miner_window_secs
            })
            .count()
            + 1;
        if miner_forks > self.config.miner_fork_limit {
            return true;
        }

        // Double-production: two competing tips seconds apart.
        if fork.timestamp.abs_diff(main.timestamp) < self.config.rapid_production_secs {
            return true;
        }

        // Score manipulation: the challenger claims implausibly more weight.
        fork.score > main.score * self.config.manipulation_score_ratio
    }
}
