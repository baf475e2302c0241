//! # Partition Re-merge Flows
//!
//! When a mesh partition reconnects, its accumulated `NetworkState` and
//! the online network's are reconciled by the Secure Synchronizer, with
//! NonceGuard arbitrating replays across rounds. These tests drive the
//! whole reconnection path, including the mesh-side block acceptance that
//! produced the offline operations in the first place.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use lc_01_validation::{BlockValidator, ValidationConfig};
    use lc_02_fork_detection::{ForkDetector, ForkDetectorConfig};
    use lc_03_nonce_guard::{NonceGuardConfig, NonceLedger};
    use lc_04_secure_sync::{SecureSynchronizer, SyncConfig, SyncError};
    use serde_json::json;
    use shared_crypto::{compute_merkle_root, meets_target, AcceptAllVerifier};
    use shared_types::{
        Block, ChainContext, ForkChoiceRule, GeoPoint, ManualClock, NetworkMode, NetworkState,
        NodeId, Operation, Transaction,
    };

    const NOW: u64 = 1_700_000_000;

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    fn make_op(op_id: &str, node: &str, nonce: u64, timestamp: u64) -> Operation {
        Operation {
            op_id: op_id.to_string(),
            node_id: NodeId::new(node),
            nonce,
            timestamp,
            data: json!({"kind": "proof_of_delivery", "op": op_id}),
            signature: [1; 64],
            public_key: [2; 32],
            location_history: Some(vec![
                GeoPoint { lat: 40.7128, lon: -74.0060, timestamp: timestamp - 600 },
                GeoPoint { lat: 40.7130, lon: -74.0020, timestamp: timestamp - 60 },
            ]),
        }
    }

    fn make_network_state(
        mode: NetworkMode,
        timestamp: u64,
        hash: u8,
        ops: Vec<Operation>,
    ) -> NetworkState {
        NetworkState {
            operations: ops,
            last_block_hash: [hash; 32],
            timestamp,
            node_states: HashMap::new(),
            network_mode: mode,
        }
    }

    fn make_synchronizer(nonce_guard: Arc<NonceLedger<NodeId>>) -> SecureSynchronizer {
        SecureSynchronizer::with_deps(
            SyncConfig::default(),
            ManualClock::at(NOW),
            nonce_guard,
            Arc::new(lc_04_secure_sync::NoConfirmationData),
        )
    }

    // =========================================================================
    // FLOWS
    // =========================================================================

    /// The full reconnection path: the mesh accepts a block offgrid, ships
    /// its operations home at reconnection, and the merged snapshot takes
    /// the online partition's identity. Replaying the same operations in
    /// the next round is dropped, not re-merged.
    #[tokio::test]
    async fn test_mesh_reconnection_end_to_end() {
        // --- Offgrid: a courier's block is accepted under mesh rules.
        let detector = Arc::new(ForkDetector::with_time_source(
            ForkDetectorConfig::default(),
            ManualClock::at(NOW),
        ));
        let validator = BlockValidator::with_time_source(
            ValidationConfig::default(),
            Arc::new(AcceptAllVerifier),
            detector,
            ManualClock::at(NOW),
        );

        let tx = Transaction {
            tx_id: [5; 32],
            sender: [1; 20],
            receiver: [2; 20],
            amount: 75,
            timestamp: NOW - 1_000,
            signature: [1; 64],
            public_key: [2; 32],
            dependencies: vec![],
        };
        let mut mesh_block = Block {
            version: 1,
            height: 42,
            previous_hash: [9; 32],
            merkle_root: compute_merkle_root(&[tx.leaf_hash()]),
            timestamp: NOW - 900,
            difficulty: 6,
            nonce: 0,
            proposer: [0xAB; 32],
            transactions: vec![tx],
            quorum_sigs: None,
        };
        while !meets_target(&mesh_block.hash(), 6) {
            mesh_block.nonce += 1;
        }

        let context = ChainContext {
            difficulty: 6,
            last_block: None,
            current_state: HashMap::from([([1u8; 20], 100u64)]),
            trusted_nodes: Default::default(),
            fork_choice_rule: ForkChoiceRule::HeaviestChain,
            network_mode: NetworkMode::Offline,
        };
        assert!(validator.validate_block(&mesh_block, &context).valid);

        // --- Reconnection: the partitions exchange their snapshots.
        let nonce_guard = Arc::new(NonceLedger::new(NonceGuardConfig::default()));
        let sync = make_synchronizer(nonce_guard.clone());
        let courier = NodeId::new("courier-7");

        let offline_ops = vec![
            make_op("delivery-501", "courier-7", 0, NOW - 800),
            make_op("delivery-502", "courier-7", 1, NOW - 700),
        ];
        let online_ops = vec![make_op("dispatch-9", "depot-1", 0, NOW - 750)];

        let merged = sync
            .sync_networks(
                &courier,
                make_network_state(NetworkMode::Online, NOW - 5, 1, online_ops.clone()),
                make_network_state(NetworkMode::Offline, NOW - 60, 2, offline_ops.clone()),
            )
            .await
            .unwrap();

        assert_eq!(merged.operations.len(), 3);
        assert_eq!(merged.network_mode, NetworkMode::Online);
        assert_eq!(merged.timestamp, NOW - 5);
        assert_eq!(merged.last_block_hash, [1; 32]);
        // Commit advanced the couriers' nonce watermarks.
        assert_eq!(nonce_guard.get_next_nonce(&courier), 2);

        // --- Next round replays everything plus one new delivery.
        let mut replay_offline = offline_ops;
        replay_offline.push(make_op("delivery-503", "courier-7", 2, NOW - 30));

        let merged = sync
            .sync_networks(
                &courier,
                make_network_state(NetworkMode::Online, NOW - 5, 1, online_ops),
                make_network_state(NetworkMode::Offline, NOW - 20, 2, replay_offline),
            )
            .await
            .unwrap();

        let ids: Vec<&str> = merged.operations.iter().map(|op| op.op_id.as_str()).collect();
        assert_eq!(ids, vec!["delivery-503"]);
    }

    /// Disjoint operation sets merge to the union, and the merge converges
    /// to the same set regardless of which partition carried which half.
    #[tokio::test]
    async fn test_disjoint_sets_converge() {
        let half_a: Vec<Operation> = (0..4)
            .map(|i| make_op(&format!("a-{i}"), "depot-1", i, NOW - 500 - i))
            .collect();
        let half_b: Vec<Operation> = (0..3)
            .map(|i| make_op(&format!("b-{i}"), "courier-2", i, NOW - 400 - i))
            .collect();

        let first = make_synchronizer(Arc::new(NonceLedger::new(NonceGuardConfig::default())))
            .sync_networks(
                &NodeId::new("courier-2"),
                make_network_state(NetworkMode::Online, NOW - 5, 1, half_a.clone()),
                make_network_state(NetworkMode::Offline, NOW - 15, 2, half_b.clone()),
            )
            .await
            .unwrap();
        assert_eq!(first.operations.len(), half_a.len() + half_b.len());

        let second = make_synchronizer(Arc::new(NonceLedger::new(NonceGuardConfig::default())))
            .sync_networks(
                &NodeId::new("courier-2"),
                make_network_state(NetworkMode::Online, NOW - 5, 1, half_b),
                make_network_state(NetworkMode::Offline, NOW - 15, 2, half_a),
            )
            .await
            .unwrap();

        let ids = |state: &NetworkState| {
            state
                .operations
                .iter()
                .map(|op| op.op_id.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(ids(&first), ids(&second));
    }

    /// A conflicting delivery proof resolves deterministically to the
    /// newer copy on both ends of the reconnection.
    #[tokio::test]
    async fn test_conflicting_delivery_proof_resolves_newer() {
        let mut online_copy = make_op("delivery-77", "courier-3", 0, NOW - 900);
        online_copy.data = json!({"status": "handed_to_customs"});
        let mut offline_copy = make_op("delivery-77", "courier-3", 0, NOW - 300);
        offline_copy.data = json!({"status": "delivered"});

        let merged = make_synchronizer(Arc::new(NonceLedger::new(NonceGuardConfig::default())))
            .sync_networks(
                &NodeId::new("courier-3"),
                make_network_state(NetworkMode::Online, NOW - 5, 1, vec![online_copy]),
                make_network_state(NetworkMode::Offline, NOW - 15, 2, vec![offline_copy]),
            )
            .await
            .unwrap();

        assert_eq!(merged.operations.len(), 1);
        assert_eq!(merged.operations[0].data["status"], json!("delivered"));
    }

    /// The commit rule: online at T, offline at T-10, no conflicts: the
    /// result is ONLINE-tagged, stamped T, and carries the online side's
    /// block hash.
    #[tokio::test]
    async fn test_commit_rule_prefers_newer_online_snapshot() {
        let merged = make_synchronizer(Arc::new(NonceLedger::new(NonceGuardConfig::default())))
            .sync_networks(
                &NodeId::new("courier-1"),
                make_network_state(
                    NetworkMode::Online,
                    NOW,
                    0xAA,
                    vec![make_op("x", "depot-1", 0, NOW - 100)],
                ),
                make_network_state(
                    NetworkMode::Offline,
                    NOW - 10,
                    0xBB,
                    vec![make_op("y", "courier-1", 0, NOW - 90)],
                ),
            )
            .await
            .unwrap();

        assert_eq!(merged.network_mode, NetworkMode::Online);
        assert_eq!(merged.timestamp, NOW);
        assert_eq!(merged.last_block_hash, [0xAA; 32]);
        assert_eq!(merged.operations.len(), 2);
    }

    /// A malformed snapshot aborts the whole merge with the structural
    /// reason, and nothing is committed.
    #[tokio::test]
    async fn test_malformed_snapshot_aborts_as_a_unit() {
        let nonce_guard = Arc::new(NonceLedger::new(NonceGuardConfig::default()));
        let sync = make_synchronizer(nonce_guard.clone());

        let mut bad_op = make_op("z", "courier-4", 0, NOW - 100);
        bad_op.location_history = Some(vec![GeoPoint {
            lat: 95.0, // Off the globe.
            lon: 0.0,
            timestamp: NOW - 50,
        }]);

        let err = sync
            .sync_networks(
                &NodeId::new("courier-4"),
                make_network_state(NetworkMode::Online, NOW - 5, 1, vec![]),
                make_network_state(NetworkMode::Offline, NOW - 15, 2, vec![bad_op]),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::InvalidStateFormat { .. }));
        assert!(err.to_string().contains("Invalid state format"));
        // The abort confirmed nothing.
        assert_eq!(nonce_guard.get_next_nonce(&NodeId::new("courier-4")), 0);
    }

    /// Back-to-back failures put the courier in the penalty box; the
    /// suspicion wears off after the window.
    #[tokio::test]
    async fn test_failure_streak_suspends_then_recovers() {
        let clock = ManualClock::at(NOW);
        let sync = SecureSynchronizer::with_deps(
            SyncConfig::default(),
            clock.clone(),
            Arc::new(NonceLedger::new(NonceGuardConfig::default())),
            Arc::new(lc_04_secure_sync::NoConfirmationData),
        );
        let courier = NodeId::new("courier-5");

        for _ in 0..3 {
            let err = sync
                .sync_networks(
                    &courier,
                    make_network_state(NetworkMode::Offline, NOW - 5, 1, vec![]),
                    make_network_state(NetworkMode::Offline, NOW - 15, 2, vec![]),
                )
                .await
                .unwrap_err();
            assert!(matches!(err, SyncError::InvalidStateFormat { .. }));
        }

        let err = sync
            .sync_networks(
                &courier,
                make_network_state(NetworkMode::Online, NOW - 5, 1, vec![]),
                make_network_state(NetworkMode::Offline, NOW - 15, 2, vec![]),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::NodeSuspicious(_)));

        clock.advance(3_700);
        let result = sync
            .sync_networks(
                &courier,
                make_network_state(NetworkMode::Online, NOW + 3_690, 1, vec![]),
                make_network_state(NetworkMode::Offline, NOW + 3_680, 2, vec![]),
            )
            .await;
        assert!(result.is_ok(), "got: {result:?}");
    }
}
