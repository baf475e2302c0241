//! # Sync Registry
//!
//! Per-node admission control for synchronization requests: one in-flight
//! session per node, expiry of sessions that overran the timeout, failure
//! counting, and the suspicion window that refuses repeat offenders.
//!
//! The registry lock is held only for these bookkeeping calls, never for
//! the duration of a merge.

use crate::config::SyncConfig;
use crate::domain::{ActiveSync, SyncError};
use shared_types::NodeId;
use std::collections::HashMap;
use uuid::Uuid;

/// Admission and abuse bookkeeping for synchronization sessions.
#[derive(Debug, Default)]
pub struct SyncRegistry {
    active: HashMap<NodeId, ActiveSync>,
    /// Unix timestamps of recent failed or expired attempts per node.
    failures: HashMap<NodeId, Vec<u64>>,
    /// When each suspicious node was condemned.
    suspicious: HashMap<NodeId, u64>,
}

impl SyncRegistry {
    /// Admit a synchronization request for `node_id`, allocating its
    /// session ID.
    ///
    /// Rejections: the node is inside its suspicion window, already has a
    /// live session, or has burned through the failure budget. A session
    /// past the timeout is expired here (counted as a failure) before the
    /// new request is considered.
    pub fn begin(
        &mut self,
        node_id: &NodeId,
        now: u64,
        config: &SyncConfig,
    ) -> Result<Uuid, SyncError> {
        if let Some(&since) = self.suspicious.get(node_id) {
            if now.saturating_sub(since) < config.suspicion_secs {
                return Err(SyncError::NodeSuspicious(node_id.clone()));
            }
            self.suspicious.remove(node_id);
            self.failures.remove(node_id);
        }

        if let Some(existing) = self.active.get(node_id) {
            if now.saturating_sub(existing.started_at) <= config.sync_timeout_secs {
                return Err(SyncError::AlreadySyncing(node_id.clone()));
            }
        }
        if let Some(expired) = self.active.remove(node_id) {
            tracing::warn!(
                node = %node_id,
                sync_id = %expired.sync_id,
                "synchronization expired past its timeout"
            );
            self.note_failure(node_id, now, config);
            if self.suspicious.contains_key(node_id) {
                return Err(SyncError::NodeSuspicious(node_id.clone()));
            }
        }

        if self.recent_failure_count(node_id, now, config) >= config.max_failed_attempts {
            self.suspicious.insert(node_id.clone(), now);
            return Err(SyncError::NodeSuspicious(node_id.clone()));
        }

        let sync_id = Uuid::new_v4();
        self.active.insert(
            node_id.clone(),
            ActiveSync {
                sync_id,
                started_at: now,
            },
        );
        Ok(sync_id)
    }

    /// Close a session, recording the outcome for failure accounting.
    pub fn finish(&mut self, node_id: &NodeId, success: bool, now: u64, config: &SyncConfig) {
        self.active.remove(node_id);
        if !success {
            self.note_failure(node_id, now, config);
        }
    }

    /// Whether the node is currently refused.
    pub fn is_suspicious(&self, node_id: &NodeId) -> bool {
        self.suspicious.contains_key(node_id)
    }

    /// Number of live sessions.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    fn note_failure(&mut self, node_id: &NodeId, now: u64, config: &SyncConfig) {
        let failures = self.failures.entry(node_id.clone()).or_default();
        failures.push(now);
        failures.retain(|&ts| now.saturating_sub(ts) <= config.failure_window_secs);
        if failures.len() >= config.max_failed_attempts {
            tracing::warn!(node = %node_id, "node marked suspicious after repeated sync failures");
            self.suspicious.insert(node_id.clone(), now);
        }
    }

    fn recent_failure_count(&mut self, node_id: &NodeId, now: u64, config: &SyncConfig) -> usize {
        match self.failures.get_mut(node_id) {
            Some(failures) => {
                failures.retain(|&ts| now.saturating_sub(ts) <= config.failure_window_secs);
                failures.len()
            }
            None => 0,
        }
    }
}
