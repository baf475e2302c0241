//! # Block Validator Service
//!
//! Orchestrates the consensus-rule pipeline over a candidate block. Checks
//! run cheapest-first and short-circuit on the first violation: structural
//! limits, proof-of-work, temporal order, Merkle root, transaction
//! structure, dependency cycles, quorum signatures (online mode), state
//! transition, and finally the fork-detector consultation.
//!
//! The validator is a pure function of its inputs apart from the bounded
//! rejection log it keeps for audit. It never blocks and never throws
//! across its contract boundary: every failure is a rendered reason.

use crate::config::ValidationConfig;
use crate::domain::{check_dependency_cycles, rules, BlockVerdict, ValidationError};
use crate::state::{RejectionLog, RejectionRecord};
use lc_02_fork_detection::{score_tip, ForkDetector, TipEvidence, EXPECTED_MESH_CONFIRMATIONS};
use parking_lot::Mutex;
use shared_crypto::SignatureVerifier;
use shared_types::{
    Block, ChainContext, ChainTip, ForkStatus, NetworkMode, SystemTimeSource, TimeSource,
};
use std::sync::Arc;

/// Consensus-rule enforcement for candidate blocks.
pub struct BlockValidator {
    config: ValidationConfig,
    verifier: Arc<dyn SignatureVerifier>,
    fork_detector: Arc<ForkDetector>,
    time: Arc<dyn TimeSource>,
    rejections: Mutex<RejectionLog>,
}

impl BlockValidator {
    /// Create a validator using the system clock.
    pub fn new(
        config: ValidationConfig,
        verifier: Arc<dyn SignatureVerifier>,
        fork_detector: Arc<ForkDetector>,
    ) -> Self {
        Self::with_time_source(config, verifier, fork_detector, Arc::new(SystemTimeSource))
    }

    /// Create a validator with an injected clock.
    pub fn with_time_source(
        config: ValidationConfig,
        verifier: Arc<dyn SignatureVerifier>,
        fork_detector: Arc<ForkDetector>,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        let log = RejectionLog::new(config.max_rejection_log);
        Self {
            config,
            verifier,
            fork_detector,
            time,
            rejections: Mutex::new(log),
        }
    }

    /// Apply the full consensus-rule pipeline to one candidate block.
    pub fn validate_block(&self, block: &Block, context: &ChainContext) -> BlockVerdict {
        match self.run_pipeline(block, context) {
            Ok(fork_status) => {
                tracing::debug!(
                    block = %hex::encode(block.hash()),
                    %fork_status,
                    "block accepted"
                );
                BlockVerdict::accepted(fork_status)
            }
            Err(error) => {
                let block_hash = block.hash();
                tracing::warn!(
                    block = %hex::encode(block_hash),
                    reason = %error,
                    "block rejected"
                );
                self.rejections.lock().record(block_hash, error.to_string());
                BlockVerdict::rejected(&error)
            }
        }
    }

    /// Recently rejected blocks, oldest first.
    pub fn recent_rejections(&self) -> Vec<RejectionRecord> {
        self.rejections.lock().entries().cloned().collect()
    }

    fn run_pipeline(
        &self,
        block: &Block,
        context: &ChainContext,
    ) -> Result<ForkStatus, ValidationError> {
        let now = self.time.now();

        // 1. Structural limits (cheap, mode-dependent).
        rules::check_limits(block, context.network_mode, &self.config)?;

        // 2. Proof-of-work against the context's difficulty.
        rules::check_proof_of_work(block, context.difficulty)?;

        // 3. Temporal order.
        rules::check_temporal_order(block, context.last_block.as_ref(), now, &self.config)?;

        // 4. Merkle root recomputation.
        rules::check_merkle_root(block)?;

        // 5. Per-transaction structure.
        rules::check_transactions(block, now, &self.config)?;

        // 6. Dependency-DAG acyclicity.
        check_dependency_cycles(&block.transactions)?;

        // 7. Quorum signatures. Offgrid blocks skip this entirely: the
        //    mesh has no quorum to consult.
        if context.network_mode == NetworkMode::Online {
            rules::check_quorum_signatures(block, context, self.verifier.as_ref(), &self.config)?;
        }

        // 8. Balance replay on a defensive copy.
        rules::check_state_transition(block, &context.current_state)?;

        // 9. Fork consultation: a condemned tip is fatal, anything else is
        //    advisory.
        let fork_status = self.consult_fork_detector(block, context, now);
        if fork_status.is_fatal() {
            return Err(ValidationError::MaliciousFork);
        }

        Ok(fork_status)
    }

    fn consult_fork_detector(&self, block: &Block, context: &ChainContext, now: u64) -> ForkStatus {
        let is_offgrid = context.network_mode == NetworkMode::Offline;

        let evidence = TipEvidence {
            quorum_confirmations: block
                .quorum_sigs
                .as_ref()
                .map_or(0, |sigs| sigs.len() as u32),
            // Mesh witnessing happens in the radio layer before a block
            // reaches validation, so an offgrid candidate is credited full
            // mesh coverage here.
            mesh_confirmations: if is_offgrid {
                EXPECTED_MESH_CONFIRMATIONS
            } else {
                0
            },
            age_secs: now.saturating_sub(block.timestamp),
        };

        self.fork_detector.check_fork(ChainTip {
            block_hash: block.hash(),
            height: block.height,
            timestamp: block.timestamp,
            miner: block.proposer,
            parent_hash: block.previous_hash,
            is_offgrid,
            score: score_tip(&evidence),
        })
    }
}
