//! # Circuit Breaker
//!
//! The safety gate in front of every commit: a merge whose divergence
//! metrics look anomalous is aborted wholesale rather than committed and
//! repaired later. Component failure counters feed the same gate, so a
//! subsystem failing repeatedly inside the window also holds merges back.

use crate::config::SyncConfig;
use serde_json::Value;
use sha2::{Digest, Sha256};
use shared_types::NetworkState;
use std::collections::HashMap;

/// Why the breaker refused a merge.
#[derive(Debug, Clone, PartialEq)]
pub enum BreakReason {
    /// A component crossed the failure threshold inside the window.
    ComponentFailures {
        /// The failing component.
        component: String,
        /// Failures recorded.
        count: u32,
    },
    /// Too few node sub-states agree with the majority fingerprint.
    LowAgreement {
        /// Fraction of nodes agreeing.
        ratio: f64,
    },
    /// Per-node operation counts spread too far apart.
    OpCountSkew {
        /// Max minus min operation count.
        diff: usize,
    },
}

/// Divergence metrics computed over a proposed merged state.
#[derive(Debug, Clone, PartialEq)]
pub struct StateMetrics {
    /// Fraction of node sub-states matching the most common fingerprint.
    pub node_agreement: f64,
    /// Spread between the busiest and quietest node's operation counts.
    pub op_count_diff: usize,
}

/// Failure accounting plus divergence analysis.
#[derive(Debug, Default)]
pub struct CircuitBreaker {
    failure_counts: HashMap<String, u32>,
    last_failure: HashMap<String, u64>,
}

impl CircuitBreaker {
    /// Create a breaker with clean counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a component failure. Counters reset after a quiet period.
    pub fn record_failure(&mut self, component: &str, now: u64, config: &SyncConfig) {
        let last = self.last_failure.get(component).copied().unwrap_or(0);
        if now.saturating_sub(last) > config.breaker_reset_secs {
            self.failure_counts.insert(component.to_string(), 0);
        }
        *self.failure_counts.entry(component.to_string()).or_insert(0) += 1;
        self.last_failure.insert(component.to_string(), now);
    }

    /// Failures currently on record for a component.
    pub fn failure_count(&self, component: &str) -> u32 {
        self.failure_counts.get(component).copied().unwrap_or(0)
    }

    /// Decide whether the proposed merge may commit.
    pub fn should_break(
        &self,
        proposed: &NetworkState,
        now: u64,
        config: &SyncConfig,
    ) -> Option<BreakReason> {
        for (component, &count) in &self.failure_counts {
            let last = self.last_failure.get(component).copied().unwrap_or(0);
            let quiet = now.saturating_sub(last) > config.breaker_reset_secs;
            if !quiet && count >= config.breaker_max_failures {
                return Some(BreakReason::ComponentFailures {
                    component: component.clone(),
                    count,
                });
            }
        }

        let metrics = Self::state_metrics(proposed);
        if metrics.node_agreement < config.min_node_agreement {
            return Some(BreakReason::LowAgreement {
                ratio: metrics.node_agreement,
            });
        }
        if metrics.op_count_diff > config.max_op_count_diff {
            return Some(BreakReason::OpCountSkew {
                diff: metrics.op_count_diff,
            });
        }

        None
    }

    /// Compute divergence metrics over a state's node sub-states.
    pub fn state_metrics(state: &NetworkState) -> StateMetrics {
        let fingerprints: Vec<[u8; 32]> = state
            .node_states
            .values()
            .map(Self::fingerprint_node_state)
            .collect();

        let node_agreement = if fingerprints.is_empty() {
            1.0
        } else {
            let mut tally: HashMap<[u8; 32], usize> = HashMap::new();
            for fp in &fingerprints {
                *tally.entry(*fp).or_insert(0) += 1;
            }
            let majority = tally.values().copied().max().unwrap_or(0);
            majority as f64 / fingerprints.len() as f64
        };

        let op_counts: Vec<usize> = state
            .node_states
            .values()
            .map(|node_state| {
                node_state
                    .get("operations")
                    .and_then(Value::as_array)
                    .map_or(0, Vec::len)
            })
            .collect();
        let op_count_diff = match (op_counts.iter().max(), op_counts.iter().min()) {
            (Some(max), Some(min)) => max - min,
            _ => 0,
        };

        StateMetrics {
            node_agreement,
            op_count_diff,
        }
    }

    /// Deterministic fingerprint of one node sub-state. Maps serialize
    /// with sorted keys, so equal states fingerprint equally.
    fn fingerprint_node_state(state: &shared_types::NodeStateMap) -> [u8; 32] {
        let canonical = serde_json::to_string(state).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        hasher.finalize().into()
    }
}
