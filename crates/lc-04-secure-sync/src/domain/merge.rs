//! # State Merging
//!
//! Assembles the reconciled snapshot: the resolved operation set, node
//! sub-states merged key-by-key with the newer side winning, and the
//! commit metadata rules (mode promotes to online, the later timestamp
//! survives, the online side is the tie-break source for block identity).

use shared_types::{NetworkMode, NetworkState, NodeId, NodeStateMap, Operation};
use std::collections::HashMap;

/// Merge the per-node sub-states of both snapshots.
///
/// Nodes present on one side only carry over unchanged. For nodes present
/// on both, keys are merged individually: when both sides define a key,
/// the side whose sub-state carries the newer `timestamp` field supplies
/// the value (ties prefer the online side).
pub fn merge_node_states(
    online: &HashMap<NodeId, NodeStateMap>,
    offline: &HashMap<NodeId, NodeStateMap>,
) -> HashMap<NodeId, NodeStateMap> {
    let mut merged: HashMap<NodeId, NodeStateMap> = HashMap::new();

    for (node_id, state) in online {
        match offline.get(node_id) {
            Some(other) => {
                merged.insert(node_id.clone(), merge_single_node_state(state, other));
            }
            None => {
                merged.insert(node_id.clone(), state.clone());
            }
        }
    }
    for (node_id, state) in offline {
        merged
            .entry(node_id.clone())
            .or_insert_with(|| state.clone());
    }

    merged
}

/// Timestamp a node sub-state reports for itself.
pub fn node_state_timestamp(state: &NodeStateMap) -> u64 {
    state
        .get("timestamp")
        .and_then(serde_json::Value::as_u64)
        .unwrap_or(0)
}

fn merge_single_node_state(online: &NodeStateMap, offline: &NodeStateMap) -> NodeStateMap {
    let online_newer = node_state_timestamp(online) >= node_state_timestamp(offline);

    let mut merged = NodeStateMap::new();
    for (key, value) in online {
        if offline.contains_key(key) && !online_newer {
            continue; // The offline copy of this key wins below.
        }
        merged.insert(key.clone(), value.clone());
    }
    for (key, value) in offline {
        if !merged.contains_key(key) {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

/// Assemble the committed snapshot from the resolved operations and the
/// two inputs.
///
/// A successful merge always promotes to `Online` mode; the merged
/// timestamp is the later of the two inputs; `last_block_hash` follows the
/// online side whenever its snapshot is at least as new, otherwise the
/// offline side's.
pub fn assemble_merged_state(
    online: &NetworkState,
    offline: &NetworkState,
    operations: Vec<Operation>,
) -> NetworkState {
    let last_block_hash = if online.timestamp >= offline.timestamp {
        online.last_block_hash
    } else {
        offline.last_block_hash
    };

    NetworkState {
        operations,
        last_block_hash,
        timestamp: online.timestamp.max(offline.timestamp),
        node_states: merge_node_states(&online.node_states, &offline.node_states),
        network_mode: NetworkMode::Online,
    }
}
