//! # Secure Synchronizer Service
//!
//! The partition-reconciliation state machine. One call to
//! `sync_networks` runs `VALIDATING -> CONFLICT_DETECTION ->
//! CONFLICT_RESOLUTION -> CIRCUIT_CHECK -> MERGE` and either returns the
//! committed snapshot or aborts with nothing applied; partial merges do
//! not exist.
//!
//! Admission is per node: the global registry lock is held only while a
//! session ID is allocated or closed, never across the merge itself. Each
//! in-flight session owns its working state exclusively on this task's
//! stack, so two nodes reconciling concurrently never contend beyond the
//! brief registry and cache locks.
//!
//! Replay protection layers under conflict handling: an operation whose ID
//! was merged in an earlier round, or whose nonce NonceGuard has already
//! confirmed, is dropped before resolution ever sees it.

use crate::config::SyncConfig;
use crate::domain::{
    assemble_merged_state, detect_conflicts, index_operations, resolve_conflict, validate_states,
    CircuitBreaker, ConflictStrategy, QuorumStrategy, SyncError, SyncPhase, TimestampStrategy,
    Winner, WorkStrategy,
};
use crate::ports::{ConfirmationProvider, NoConfirmationData};
use crate::state::SyncRegistry;
use lc_03_nonce_guard::{NonceGuardConfig, NonceLedger};
use lru::LruCache;
use parking_lot::Mutex;
use shared_types::{NetworkState, NodeId, Operation, SystemTimeSource, TimeSource};
use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Cross-partition state reconciliation.
pub struct SecureSynchronizer {
    config: SyncConfig,
    time: Arc<dyn TimeSource>,
    nonce_guard: Arc<NonceLedger<NodeId>>,
    strategies: Vec<Box<dyn ConflictStrategy>>,
    registry: Mutex<SyncRegistry>,
    breaker: Mutex<CircuitBreaker>,
    merged_ops: Mutex<LruCache<String, u64>>,
}

impl SecureSynchronizer {
    /// Create a synchronizer with the system clock, a fresh nonce ledger
    /// and no external quorum data.
    pub fn new(config: SyncConfig) -> Self {
        Self::with_deps(
            config,
            Arc::new(SystemTimeSource),
            Arc::new(NonceLedger::new(NonceGuardConfig::default())),
            Arc::new(NoConfirmationData),
        )
    }

    /// Create a synchronizer with injected collaborators.
    pub fn with_deps(
        config: SyncConfig,
        time: Arc<dyn TimeSource>,
        nonce_guard: Arc<NonceLedger<NodeId>>,
        confirmations: Arc<dyn ConfirmationProvider>,
    ) -> Self {
        let cache_size = NonZeroUsize::new(config.replay_cache_size)
            .unwrap_or(NonZeroUsize::new(1_000).expect("constant is non-zero"));
        let strategies: Vec<Box<dyn ConflictStrategy>> = vec![
            Box::new(TimestampStrategy {
                tolerance_secs: config.conflict_tolerance_secs,
            }),
            Box::new(QuorumStrategy::new(confirmations)),
            Box::new(WorkStrategy),
        ];
        Self {
            config,
            time,
            nonce_guard,
            strategies,
            registry: Mutex::new(SyncRegistry::default()),
            breaker: Mutex::new(CircuitBreaker::new()),
            merged_ops: Mutex::new(LruCache::new(cache_size)),
        }
    }

    /// Reconcile the two partition snapshots on behalf of `node_id`.
    ///
    /// Idempotent per node: a second request while one is in flight is
    /// rejected immediately rather than queued, and a node with a recent
    /// failure streak is refused for the suspicion window.
    pub async fn sync_networks(
        &self,
        node_id: &NodeId,
        online: NetworkState,
        offline: NetworkState,
    ) -> Result<NetworkState, SyncError> {
        let now = self.time.now();
        // Global lock only long enough to allocate and register the session.
        let sync_id = self.registry.lock().begin(node_id, now, &self.config)?;
        tracing::info!(%sync_id, node = %node_id, "synchronization started");

        let outcome = match tokio::time::timeout(
            Duration::from_secs(self.config.sync_timeout_secs),
            self.run_sync(sync_id, &online, &offline),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(SyncError::TimedOut(sync_id)),
        };

        let finished_at = self.time.now();
        self.registry
            .lock()
            .finish(node_id, outcome.is_ok(), finished_at, &self.config);

        match &outcome {
            Ok(state) => {
                tracing::info!(
                    %sync_id,
                    operations = state.operations.len(),
                    phase = %SyncPhase::Complete,
                    "synchronization committed"
                );
            }
            Err(error) => {
                self.breaker
                    .lock()
                    .record_failure(error.component(), finished_at, &self.config);
                tracing::warn!(%sync_id, %error, phase = %SyncPhase::Aborted, "synchronization aborted");
            }
        }

        outcome
    }

    /// Whether a node is currently refused synchronization.
    pub fn is_node_suspicious(&self, node_id: &NodeId) -> bool {
        self.registry.lock().is_suspicious(node_id)
    }

    /// Number of synchronizations currently in flight.
    pub fn active_sync_count(&self) -> usize {
        self.registry.lock().active_count()
    }

    async fn run_sync(
        &self,
        sync_id: Uuid,
        online: &NetworkState,
        offline: &NetworkState,
    ) -> Result<NetworkState, SyncError> {
        let now = self.time.now();

        tracing::debug!(%sync_id, phase = %SyncPhase::Validating, "validating snapshots");
        validate_states(online, offline, now, &self.config)?;

        // Replay protection precedes conflict handling: a previously
        // merged operation is a replay, not a conflict.
        let online_ops = self.drop_replays(&online.operations);
        let offline_ops = self.drop_replays(&offline.operations);

        tracing::debug!(%sync_id, phase = %SyncPhase::ConflictDetection, "pairing operations");
        let online_map = index_operations(&online_ops);
        let offline_map = index_operations(&offline_ops);
        let conflicts = detect_conflicts(
            &online_map,
            &offline_map,
            self.config.conflict_tolerance_secs,
        );

        tracing::debug!(
            %sync_id,
            phase = %SyncPhase::ConflictResolution,
            conflicts = conflicts.len(),
            "resolving conflicts"
        );
        let conflict_ids: std::collections::HashSet<&str> = conflicts
            .iter()
            .map(|c| c.online.op_id.as_str())
            .collect();

        let mut resolved: BTreeMap<String, Operation> = BTreeMap::new();
        for (op_id, op) in &online_map {
            if !conflict_ids.contains(op_id.as_str()) {
                resolved.insert(op_id.clone(), op.clone());
            }
        }
        for (op_id, op) in &offline_map {
            if !conflict_ids.contains(op_id.as_str()) {
                resolved.entry(op_id.clone()).or_insert_with(|| op.clone());
            }
        }
        for conflict in &conflicts {
            let winner = match resolve_conflict(&self.strategies, conflict) {
                Winner::Online => conflict.online.clone(),
                Winner::Offline => conflict.offline.clone(),
            };
            resolved.insert(winner.op_id.clone(), winner);
        }

        tracing::debug!(%sync_id, phase = %SyncPhase::CircuitCheck, "checking divergence metrics");
        let proposed =
            assemble_merged_state(online, offline, resolved.into_values().collect());
        if let Some(reason) = self
            .breaker
            .lock()
            .should_break(&proposed, now, &self.config)
        {
            tracing::warn!(%sync_id, ?reason, "circuit breaker refused the merge");
            return Err(SyncError::CircuitBreakerOpen);
        }

        tracing::debug!(%sync_id, phase = %SyncPhase::Merge, "committing merged state");
        {
            let mut cache = self.merged_ops.lock();
            for op in &proposed.operations {
                self.nonce_guard.confirm_nonce(&op.node_id, op.nonce);
                cache.put(op.op_id.clone(), now);
            }
        }

        Ok(proposed)
    }

    fn drop_replays(&self, ops: &[Operation]) -> Vec<Operation> {
        ops.iter()
            .filter(|op| {
                if self.merged_ops.lock().contains(&op.op_id) {
                    tracing::debug!(op = %op.op_id, "dropping replay: already merged");
                    return false;
                }
                if self.nonce_guard.is_confirmed(&op.node_id, op.nonce) {
                    tracing::debug!(
                        op = %op.op_id,
                        node = %op.node_id,
                        nonce = op.nonce,
                        "dropping replay: nonce already confirmed"
                    );
                    return false;
                }
                true
            })
            .cloned()
            .collect()
    }
}
