//! # Conflict Detection and Resolution
//!
//! An `op_id` present on both sides with differing content is a conflict.
//! Resolution walks a fixed-priority strategy chain; every strategy is
//! deterministic in the two operations alone, so two nodes reconciling the
//! same pair of snapshots converge on identical winners without talking to
//! each other.

use crate::ports::ConfirmationProvider;
use shared_types::Operation;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Which side's copy of a conflicting operation wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winner {
    /// Keep the online partition's copy.
    Online,
    /// Keep the offline partition's copy.
    Offline,
}

/// One conflicting pair.
#[derive(Debug, Clone)]
pub struct Conflict {
    /// The online side's copy.
    pub online: Operation,
    /// The offline side's copy.
    pub offline: Operation,
}

/// Whether two copies of the same `op_id` actually disagree.
pub fn operations_conflict(a: &Operation, b: &Operation, tolerance_secs: u64) -> bool {
    a.data != b.data
        || a.signature != b.signature
        || a.timestamp.abs_diff(b.timestamp) > tolerance_secs
}

/// Index operations by ID. Later duplicates of the same ID within one
/// snapshot are ignored; the first copy speaks for the partition.
pub fn index_operations(ops: &[Operation]) -> BTreeMap<String, Operation> {
    let mut map = BTreeMap::new();
    for op in ops {
        map.entry(op.op_id.clone()).or_insert_with(|| op.clone());
    }
    map
}

/// Find every `op_id` the two sides disagree on.
pub fn detect_conflicts(
    online: &BTreeMap<String, Operation>,
    offline: &BTreeMap<String, Operation>,
    tolerance_secs: u64,
) -> Vec<Conflict> {
    online
        .iter()
        .filter_map(|(op_id, online_op)| {
            let offline_op = offline.get(op_id)?;
            operations_conflict(online_op, offline_op, tolerance_secs).then(|| Conflict {
                online: online_op.clone(),
                offline: offline_op.clone(),
            })
        })
        .collect()
}

/// A conflict-resolution strategy. Returns `None` to abstain and pass the
/// pair to the next strategy in the chain.
pub trait ConflictStrategy: Send + Sync {
    /// Strategy name for logs.
    fn name(&self) -> &'static str;

    /// Decide the winner, or abstain.
    fn resolve(&self, online: &Operation, offline: &Operation) -> Option<Winner>;
}

/// Newer timestamp wins, when the gap is wide enough to mean anything.
pub struct TimestampStrategy {
    /// Gap below which this strategy abstains (seconds).
    pub tolerance_secs: u64,
}

impl ConflictStrategy for TimestampStrategy {
    fn name(&self) -> &'static str {
        "timestamp"
    }

    fn resolve(&self, online: &Operation, offline: &Operation) -> Option<Winner> {
        if online.timestamp.abs_diff(offline.timestamp) <= self.tolerance_secs {
            return None;
        }
        Some(if online.timestamp > offline.timestamp {
            Winner::Online
        } else {
            Winner::Offline
        })
    }
}

/// More trusted confirmations wins. Confirmation counts come from an
/// injected provider; without one, every count is zero and the strategy
/// abstains.
pub struct QuorumStrategy {
    provider: Arc<dyn ConfirmationProvider>,
}

impl QuorumStrategy {
    /// Create a quorum strategy over a confirmation source.
    pub fn new(provider: Arc<dyn ConfirmationProvider>) -> Self {
        Self { provider }
    }
}

impl ConflictStrategy for QuorumStrategy {
    fn name(&self) -> &'static str {
        "quorum"
    }

    fn resolve(&self, online: &Operation, offline: &Operation) -> Option<Winner> {
        let online_votes = self.provider.confirmations(online);
        let offline_votes = self.provider.confirmations(offline);
        match online_votes.cmp(&offline_votes) {
            std::cmp::Ordering::Greater => Some(Winner::Online),
            std::cmp::Ordering::Less => Some(Winner::Offline),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// More cumulative work wins. Operations minted under proof-of-work carry
/// their accumulated weight in the payload's `work` field; copies without
/// one abstain.
pub struct WorkStrategy;

impl WorkStrategy {
    fn work_of(op: &Operation) -> Option<u64> {
        op.data.get("work").and_then(serde_json::Value::as_u64)
    }
}

impl ConflictStrategy for WorkStrategy {
    fn name(&self) -> &'static str {
        "proof_of_work"
    }

    fn resolve(&self, online: &Operation, offline: &Operation) -> Option<Winner> {
        let online_work = Self::work_of(online)?;
        let offline_work = Self::work_of(offline)?;
        match online_work.cmp(&offline_work) {
            std::cmp::Ordering::Greater => Some(Winner::Online),
            std::cmp::Ordering::Less => Some(Winner::Offline),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// Run the strategy chain over one conflict. When every strategy abstains,
/// the newer copy wins; on an exact timestamp tie the online side does, as
/// the authoritative partition.
pub fn resolve_conflict(strategies: &[Box<dyn ConflictStrategy>], conflict: &Conflict) -> Winner {
    for strategy in strategies {
        if let Some(winner) = strategy.resolve(&conflict.online, &conflict.offline) {
            tracing::debug!(
                op_id = %conflict.online.op_id,
                strategy = strategy.name(),
                ?winner,
                "conflict resolved"
            );
            return winner;
        }
    }

    if conflict.offline.timestamp > conflict.online.timestamp {
        Winner::Offline
    } else {
        Winner::Online
    }
}
