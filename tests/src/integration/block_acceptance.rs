//! # Block Acceptance Flows
//!
//! A candidate block passes through the Validation Engine, which consults
//! the Fork Detector before the storage collaborator may append. These
//! tests drive that whole path with real mining, real Ed25519 quorum
//! signatures, and a shared detector registry.

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};
    use std::sync::Arc;

    use lc_01_validation::{BlockValidator, ValidationConfig};
    use lc_02_fork_detection::{ForkDetector, ForkDetectorConfig, ForkId};
    use lc_03_nonce_guard::{NonceGuardConfig, NonceLedger};
    use shared_crypto::{compute_merkle_root, meets_target, Ed25519KeyPair, Ed25519Verifier};
    use shared_types::{
        Address, Block, ChainContext, ForkChoiceRule, ForkStatus, ManualClock, NetworkMode,
        QuorumSignature, Transaction,
    };

    const NOW: u64 = 1_700_000_000;

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    fn make_tx(id: u8, sender: Address, receiver: Address, amount: u64) -> Transaction {
        Transaction {
            tx_id: [id; 32],
            sender,
            receiver,
            amount,
            timestamp: NOW - 240,
            signature: [1; 64],
            public_key: [2; 32],
            dependencies: vec![],
        }
    }

    fn make_block(
        height: u64,
        previous_hash: [u8; 32],
        timestamp: u64,
        difficulty: u32,
        transactions: Vec<Transaction>,
    ) -> Block {
        let leaves: Vec<_> = transactions.iter().map(|tx| tx.leaf_hash()).collect();
        Block {
            version: 1,
            height,
            previous_hash,
            merkle_root: compute_merkle_root(&leaves),
            timestamp,
            difficulty,
            nonce: 0,
            proposer: [0xAB; 32],
            transactions,
            quorum_sigs: None,
        }
    }

    fn mine(block: &mut Block, difficulty: u32) {
        while !meets_target(&block.hash(), difficulty) {
            block.nonce += 1;
        }
    }

    fn quorum_keypairs() -> Vec<Ed25519KeyPair> {
        (1u8..=3).map(|s| Ed25519KeyPair::from_seed([s; 32])).collect()
    }

    fn sign_quorum(block: &mut Block, keypairs: &[Ed25519KeyPair]) {
        let block_hash = block.hash();
        block.quorum_sigs = Some(
            keypairs
                .iter()
                .map(|kp| QuorumSignature {
                    signer: kp.public_key_bytes(),
                    signature: kp.sign_bytes(&block_hash),
                })
                .collect(),
        );
    }

    fn make_context(
        mode: NetworkMode,
        difficulty: u32,
        last_block: Option<Block>,
        trusted: &[Ed25519KeyPair],
    ) -> ChainContext {
        ChainContext {
            difficulty,
            last_block,
            current_state: HashMap::from([([1u8; 20], 10_000u64), ([2u8; 20], 500u64)]),
            trusted_nodes: trusted.iter().map(|kp| kp.public_key_bytes()).collect(),
            fork_choice_rule: ForkChoiceRule::HeaviestChain,
            network_mode: mode,
        }
    }

    fn make_validator() -> (BlockValidator, Arc<ForkDetector>) {
        let detector = Arc::new(ForkDetector::with_time_source(
            ForkDetectorConfig::default(),
            ManualClock::at(NOW),
        ));
        let validator = BlockValidator::with_time_source(
            ValidationConfig::default(),
            Arc::new(Ed25519Verifier),
            detector.clone(),
            ManualClock::at(NOW),
        );
        (validator, detector)
    }

    // =========================================================================
    // FLOWS
    // =========================================================================

    /// The online happy path: two blocks mined, quorum-signed, validated
    /// and appended in sequence.
    #[test]
    fn test_online_chain_extension_flow() {
        let (validator, _) = make_validator();
        let quorum = quorum_keypairs();

        let mut genesis = make_block(
            1,
            [0; 32],
            NOW - 600,
            8,
            vec![make_tx(1, [1; 20], [2; 20], 250)],
        );
        mine(&mut genesis, 8);
        sign_quorum(&mut genesis, &quorum);

        let context = make_context(NetworkMode::Online, 8, None, &quorum);
        let verdict = validator.validate_block(&genesis, &context);
        assert!(verdict.valid, "reason: {:?}", verdict.reason);
        assert_eq!(verdict.fork_status, Some(ForkStatus::Valid));

        // The storage collaborator appends and hands back the new context.
        let mut child = make_block(
            2,
            genesis.hash(),
            NOW - 300,
            8,
            vec![make_tx(2, [2; 20], [1; 20], 100)],
        );
        mine(&mut child, 8);
        sign_quorum(&mut child, &quorum);

        let context = make_context(NetworkMode::Online, 8, Some(genesis), &quorum);
        let verdict = validator.validate_block(&child, &context);
        assert!(verdict.valid, "reason: {:?}", verdict.reason);
        assert_eq!(verdict.fork_status, Some(ForkStatus::Valid));
    }

    /// Offgrid blocks skip quorum entirely but still face the tighter
    /// radio limits.
    #[test]
    fn test_offgrid_block_without_quorum() {
        let (validator, _) = make_validator();

        let mut block = make_block(1, [0; 32], NOW - 120, 8, vec![make_tx(1, [1; 20], [2; 20], 40)]);
        mine(&mut block, 8);

        let context = make_context(NetworkMode::Offline, 8, None, &[]);
        let verdict = validator.validate_block(&block, &context);
        assert!(verdict.valid, "reason: {:?}", verdict.reason);
    }

    /// An empty block with a brute-forced nonce at difficulty 10 is valid;
    /// corrupting one byte of `previous_hash` invalidates the proof of
    /// work, which fires before the temporal check in pipeline order.
    #[test]
    fn test_empty_block_scenario_at_difficulty_10() {
        let (validator, _) = make_validator();

        let mut block = make_block(1, [7; 32], NOW - 120, 10, vec![]);
        mine(&mut block, 10);

        let context = make_context(NetworkMode::Offline, 10, None, &[]);
        let verdict = validator.validate_block(&block, &context);
        assert!(verdict.valid, "reason: {:?}", verdict.reason);

        // Flip one byte; pick one whose corruption provably misses the
        // target, since any given flip has a 2^-10 chance of re-mining.
        let mut corrupted = block.clone();
        for byte in 0..32 {
            corrupted.previous_hash = block.previous_hash;
            corrupted.previous_hash[byte] ^= 0x01;
            if !meets_target(&corrupted.hash(), 10) {
                break;
            }
        }
        let verdict = validator.validate_block(&corrupted, &context);
        assert!(!verdict.valid);
        assert!(verdict.reason.unwrap().contains("proof of work"));
    }

    /// Mutually dependent transactions are rejected with a cycle reason
    /// regardless of every other field being well-formed.
    #[test]
    fn test_cyclic_dependencies_reject_block() {
        let (validator, _) = make_validator();

        let mut tx1 = make_tx(1, [1; 20], [2; 20], 10);
        let mut tx2 = make_tx(2, [1; 20], [2; 20], 20);
        tx1.dependencies = vec![tx2.tx_id];
        tx2.dependencies = vec![tx1.tx_id];

        let mut block = make_block(1, [0; 32], NOW - 120, 8, vec![tx1, tx2]);
        mine(&mut block, 8);

        let context = make_context(NetworkMode::Offline, 8, None, &[]);
        let verdict = validator.validate_block(&block, &context);
        assert!(!verdict.valid);
        assert!(verdict.reason.unwrap().contains("Cycle"));
    }

    /// Two mesh branches re-merging at the same height: the second block
    /// is accepted but flagged divergent, and the recorded fork is
    /// queryable under the order-independent pair ID.
    #[test]
    fn test_divergent_mesh_branches_flagged_and_recorded() {
        let (validator, detector) = make_validator();
        let context = make_context(NetworkMode::Offline, 6, None, &[]);

        // Shared history: one ancestor, then one block per branch.
        let mut ancestor = make_block(98, [0; 32], NOW - 900, 6, vec![]);
        mine(&mut ancestor, 6);
        assert!(validator.validate_block(&ancestor, &context).valid);

        let mut left = make_block(99, ancestor.hash(), NOW - 800, 6, vec![]);
        mine(&mut left, 6);
        assert!(validator.validate_block(&left, &context).valid);

        let mut right = make_block(99, ancestor.hash(), NOW - 790, 6, vec![]);
        right.proposer = [0xCD; 32];
        mine(&mut right, 6);
        assert!(validator.validate_block(&right, &context).valid);

        // The branches each extend to height 100.
        let mut left_tip = make_block(100, left.hash(), NOW - 500, 6, vec![]);
        mine(&mut left_tip, 6);
        let verdict = validator.validate_block(&left_tip, &context);
        assert_eq!(verdict.fork_status, Some(ForkStatus::Valid));

        let mut right_tip = make_block(100, right.hash(), NOW - 200, 6, vec![]);
        right_tip.proposer = [0xCD; 32];
        mine(&mut right_tip, 6);
        let verdict = validator.validate_block(&right_tip, &context);
        assert!(verdict.valid);
        assert_eq!(verdict.fork_status, Some(ForkStatus::Divergent));

        let fork_id = ForkId::new(left_tip.hash(), right_tip.hash());
        let validation = detector.get_fork_status(&fork_id).unwrap();
        assert_eq!(validation.status, ForkStatus::Divergent);
        assert_eq!(validation.common_ancestor, ancestor.hash());
        assert_eq!(validation.divergence_height, 98);
    }

    /// The admission-side NonceGuard contract around block acceptance:
    /// reserve on submission, confirm on append, and the same nonce can
    /// never be admitted twice.
    #[test]
    fn test_nonce_lifecycle_around_acceptance() {
        let ledger: NonceLedger<Address> = NonceLedger::new(NonceGuardConfig::default());
        let sender: Address = [1; 20];

        let nonce = ledger.get_next_nonce(&sender);
        assert_eq!(nonce, 0);
        ledger.validate_nonce(&sender, nonce, true).unwrap();

        // Block containing the transaction is accepted; the caller
        // confirms the nonce.
        ledger.confirm_nonce(&sender, nonce);

        // Resubmission of the same transaction is a replay.
        assert!(ledger.validate_nonce(&sender, nonce, true).is_err());
        assert_eq!(ledger.get_next_nonce(&sender), 1);
    }
}

#[cfg(test)]
mod merkle_properties {
    use proptest::prelude::*;
    use shared_crypto::{compute_merkle_root, sha256};
    use shared_types::{Hash, Transaction};

    fn make_tx(seed: u64) -> Transaction {
        let mut tx_id = [0u8; 32];
        tx_id[..8].copy_from_slice(&seed.to_le_bytes());
        Transaction {
            tx_id,
            sender: [1; 20],
            receiver: [2; 20],
            amount: seed % 1_000 + 1,
            timestamp: 1_700_000_000 + seed % 3_600,
            signature: [3; 64],
            public_key: [4; 32],
            dependencies: vec![],
        }
    }

    proptest! {
        /// Recomputing the root of the same transaction list twice always
        /// agrees.
        #[test]
        fn prop_merkle_root_is_deterministic(seeds in prop::collection::vec(any::<u64>(), 0..40)) {
            let leaves: Vec<Hash> = seeds.iter().map(|&s| make_tx(s).leaf_hash()).collect();
            prop_assert_eq!(compute_merkle_root(&leaves), compute_merkle_root(&leaves));
        }

        /// The empty list hashes to the defined base case.
        #[test]
        fn prop_empty_list_base_case(_ in any::<u8>()) {
            prop_assert_eq!(compute_merkle_root(&[]), sha256(b""));
        }

        /// Changing any single transaction changes the root.
        #[test]
        fn prop_any_leaf_change_moves_the_root(
            seeds in prop::collection::vec(any::<u64>(), 1..20),
            victim in any::<prop::sample::Index>(),
        ) {
            let mut leaves: Vec<Hash> = seeds.iter().map(|&s| make_tx(s).leaf_hash()).collect();
            let original = compute_merkle_root(&leaves);

            let index = victim.index(leaves.len());
            leaves[index][0] ^= 0x01;
            prop_assert_ne!(compute_merkle_root(&leaves), original);
        }
    }
}
