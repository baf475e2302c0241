//! # Consensus Rules
//!
//! The pure checks behind the validation pipeline. Each function takes the
//! block plus exactly the context it needs and returns the first rule
//! violation it finds. No I/O, no clocks -- callers pass `now` in.

use super::errors::ValidationError;
use crate::config::ValidationConfig;
use shared_crypto::{compute_merkle_root, meets_target, SignatureVerifier};
use shared_types::{Address, Block, ChainContext, Hash, NetworkMode};
use std::collections::{HashMap, HashSet};

/// Mode-dependent size and transaction-count ceilings.
pub fn check_limits(
    block: &Block,
    mode: NetworkMode,
    config: &ValidationConfig,
) -> Result<(), ValidationError> {
    let size = bincode::serialized_size(block)
        .map_err(|e| ValidationError::SerializationFailed(e.to_string()))?;

    let size_limit = config.max_block_size(mode);
    if size > size_limit {
        return Err(ValidationError::BlockTooLarge {
            size,
            limit: size_limit,
        });
    }

    let count_limit = config.max_tx_count(mode);
    if block.transactions.len() > count_limit {
        return Err(ValidationError::TooManyTransactions {
            count: block.transactions.len(),
            limit: count_limit,
        });
    }

    Ok(())
}

/// The header hash must satisfy the context's difficulty target.
pub fn check_proof_of_work(block: &Block, difficulty: u32) -> Result<(), ValidationError> {
    if meets_target(&block.hash(), difficulty) {
        Ok(())
    } else {
        Err(ValidationError::InvalidProofOfWork { difficulty })
    }
}

/// Temporal order: bounded future drift, and strictly after the previous
/// block when one exists.
pub fn check_temporal_order(
    block: &Block,
    last_block: Option<&Block>,
    now: u64,
    config: &ValidationConfig,
) -> Result<(), ValidationError> {
    if block.timestamp > now + config.max_time_drift_secs {
        return Err(ValidationError::TimestampTooFarInFuture {
            timestamp: block.timestamp,
            now,
        });
    }

    if let Some(previous) = last_block {
        if block.timestamp <= previous.timestamp {
            return Err(ValidationError::TimestampNotAfterPrevious {
                timestamp: block.timestamp,
                previous: previous.timestamp,
            });
        }
    }

    Ok(())
}

/// The header's Merkle root must equal the root recomputed from the
/// transaction list.
pub fn check_merkle_root(block: &Block) -> Result<(), ValidationError> {
    let leaves: Vec<Hash> = block.transactions.iter().map(|tx| tx.leaf_hash()).collect();
    let computed = compute_merkle_root(&leaves);

    if computed == block.merkle_root {
        Ok(())
    } else {
        Err(ValidationError::MerkleRootMismatch {
            header: hex::encode(block.merkle_root),
            computed: hex::encode(computed),
        })
    }
}

/// Per-transaction structural sanity: amounts move value, endpoints
/// differ, timestamps are not from the future.
pub fn check_transactions(
    block: &Block,
    now: u64,
    config: &ValidationConfig,
) -> Result<(), ValidationError> {
    for tx in &block.transactions {
        if tx.amount == 0 {
            return Err(ValidationError::TransactionZeroAmount { tx_id: tx.tx_id });
        }
        if tx.sender == tx.receiver {
            return Err(ValidationError::TransactionSelfTransfer { tx_id: tx.tx_id });
        }
        if tx.timestamp > now + config.max_time_drift_secs {
            return Err(ValidationError::TransactionFromFuture { tx_id: tx.tx_id });
        }
    }
    Ok(())
}

/// Online-mode quorum: enough distinct trusted signers, every signature
/// verified over the block hash.
pub fn check_quorum_signatures(
    block: &Block,
    context: &ChainContext,
    verifier: &dyn SignatureVerifier,
    config: &ValidationConfig,
) -> Result<(), ValidationError> {
    let Some(signatures) = block.quorum_sigs.as_ref().filter(|s| !s.is_empty()) else {
        return Err(ValidationError::MissingQuorumSignatures);
    };

    if signatures.len() < config.min_quorum_sigs {
        return Err(ValidationError::InsufficientQuorum {
            got: signatures.len(),
            required: config.min_quorum_sigs,
        });
    }

    let block_hash = block.hash();
    let mut seen: HashSet<[u8; 32]> = HashSet::with_capacity(signatures.len());

    for quorum_sig in signatures {
        if !seen.insert(quorum_sig.signer) {
            return Err(ValidationError::DuplicateQuorumSigner {
                signer: quorum_sig.signer,
            });
        }
        if !context.trusted_nodes.contains(&quorum_sig.signer) {
            return Err(ValidationError::UntrustedQuorumSigner {
                signer: quorum_sig.signer,
            });
        }
        if !verifier.verify(&quorum_sig.signer, &block_hash, &quorum_sig.signature) {
            return Err(ValidationError::InvalidQuorumSignature {
                signer: quorum_sig.signer,
            });
        }
    }

    Ok(())
}

/// Replay the block against a defensive copy of the balances. The whole
/// block stands or falls together: the first overdraft rejects it, and the
/// caller's state is never touched.
pub fn check_state_transition(
    block: &Block,
    current_state: &HashMap<Address, u64>,
) -> Result<(), ValidationError> {
    let mut balances = current_state.clone();

    for tx in &block.transactions {
        let sender_balance = balances.get(&tx.sender).copied().unwrap_or(0);
        if sender_balance < tx.amount {
            return Err(ValidationError::InsufficientBalance {
                sender: tx.sender,
                balance: sender_balance,
                required: tx.amount,
            });
        }
        balances.insert(tx.sender, sender_balance - tx.amount);

        let receiver_balance = balances.get(&tx.receiver).copied().unwrap_or(0);
        let credited = receiver_balance
            .checked_add(tx.amount)
            .ok_or(ValidationError::BalanceOverflow {
                receiver: tx.receiver,
            })?;
        balances.insert(tx.receiver, credited);
    }

    Ok(())
}
