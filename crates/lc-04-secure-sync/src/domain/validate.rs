//! # Snapshot Validation
//!
//! Structural checks on the two partition snapshots before anything is
//! compared or merged. Any violation aborts the synchronization with an
//! `Invalid state format` reason naming the rule.

use super::errors::SyncError;
use crate::config::SyncConfig;
use shared_types::{NetworkMode, NetworkState, Operation};

/// Validate both snapshots: mode tags, clock drift, and every operation.
pub fn validate_states(
    online: &NetworkState,
    offline: &NetworkState,
    now: u64,
    config: &SyncConfig,
) -> Result<(), SyncError> {
    if online.network_mode != NetworkMode::Online {
        return invalid("online snapshot not tagged ONLINE");
    }
    if offline.network_mode != NetworkMode::Offline {
        return invalid("offline snapshot not tagged OFFLINE");
    }

    for (label, state) in [("online", online), ("offline", offline)] {
        if state.timestamp.abs_diff(now) > config.max_time_drift_secs {
            return invalid(&format!(
                "{label} snapshot timestamp {} drifts more than {}s from now {}",
                state.timestamp, config.max_time_drift_secs, now
            ));
        }
        for op in &state.operations {
            validate_operation(op, now)?;
        }
    }

    Ok(())
}

/// Structural validation of a single operation.
pub fn validate_operation(op: &Operation, now: u64) -> Result<(), SyncError> {
    if op.op_id.is_empty() {
        return invalid("operation without op_id");
    }
    if op.node_id.as_str().is_empty() {
        return invalid(&format!("operation {} without node_id", op.op_id));
    }
    if op.timestamp == 0 {
        return invalid(&format!("operation {} without timestamp", op.op_id));
    }
    if op.timestamp > now {
        return invalid(&format!(
            "operation {} timestamped in the future ({} > {})",
            op.op_id, op.timestamp, now
        ));
    }
    if op.data.is_null() {
        return invalid(&format!("operation {} without payload", op.op_id));
    }
    if op.signature == [0u8; 64] {
        return invalid(&format!("operation {} without signature", op.op_id));
    }
    if op.public_key == [0u8; 32] {
        return invalid(&format!("operation {} without public key", op.op_id));
    }

    if let Some(history) = &op.location_history {
        let mut previous_ts = 0u64;
        for point in history {
            if point.timestamp <= previous_ts {
                return invalid(&format!(
                    "operation {} location history not strictly increasing",
                    op.op_id
                ));
            }
            if !(-90.0..=90.0).contains(&point.lat) || !(-180.0..=180.0).contains(&point.lon) {
                return invalid(&format!(
                    "operation {} location ({}, {}) out of range",
                    op.op_id, point.lat, point.lon
                ));
            }
            previous_ts = point.timestamp;
        }
    }

    Ok(())
}

fn invalid(detail: &str) -> Result<(), SyncError> {
    tracing::warn!(detail, "snapshot failed structural validation");
    Err(SyncError::InvalidStateFormat {
        detail: detail.to_string(),
    })
}
