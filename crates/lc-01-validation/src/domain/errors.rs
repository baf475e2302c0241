//! # Validation Errors
//!
//! One variant per consensus rule. The rendered messages double as the
//! audit-trail rejection reasons, so each names the rule it enforces and
//! the values that broke it.

use shared_types::Hash;
use thiserror::Error;

/// Reasons a candidate block fails validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Serialized block exceeds the mode's size ceiling.
    #[error("Block size {size} exceeds maximum {limit}")]
    BlockTooLarge {
        /// Serialized size in bytes.
        size: u64,
        /// Ceiling for the active mode.
        limit: u64,
    },

    /// Transaction count exceeds the mode's ceiling.
    #[error("Transaction count {count} exceeds maximum {limit}")]
    TooManyTransactions {
        /// Transactions in the block.
        count: usize,
        /// Ceiling for the active mode.
        limit: usize,
    },

    /// The header hash does not satisfy the difficulty target.
    #[error("Invalid proof of work at difficulty {difficulty}")]
    InvalidProofOfWork {
        /// Difficulty the context demanded.
        difficulty: u32,
    },

    /// Block timestamp is beyond the allowed future drift.
    #[error("Invalid temporal order: timestamp {timestamp} exceeds allowed drift (now {now})")]
    TimestampTooFarInFuture {
        /// Offending block timestamp.
        timestamp: u64,
        /// Validator clock at check time.
        now: u64,
    },

    /// Block timestamp does not advance past the previous block.
    #[error("Invalid temporal order: timestamp {timestamp} not after previous {previous}")]
    TimestampNotAfterPrevious {
        /// Offending block timestamp.
        timestamp: u64,
        /// Previous block's timestamp.
        previous: u64,
    },

    /// Recomputed Merkle root differs from the header's.
    #[error("Invalid merkle root: header {header}, computed {computed}")]
    MerkleRootMismatch {
        /// Root claimed by the header (hex).
        header: String,
        /// Root recomputed from the transactions (hex).
        computed: String,
    },

    /// A transaction carries a zero amount.
    #[error("Transaction {} has zero amount", hex::encode(.tx_id))]
    TransactionZeroAmount {
        /// Offending transaction.
        tx_id: Hash,
    },

    /// A transaction pays its own sender.
    #[error("Transaction {} transfers to its own sender", hex::encode(.tx_id))]
    TransactionSelfTransfer {
        /// Offending transaction.
        tx_id: Hash,
    },

    /// A transaction is dated beyond the allowed future drift.
    #[error("Transaction {} is from the future", hex::encode(.tx_id))]
    TransactionFromFuture {
        /// Offending transaction.
        tx_id: Hash,
    },

    /// The in-block dependency graph has a cycle.
    #[error("Cycle detected in transaction {}", hex::encode(.tx_id))]
    DependencyCycle {
        /// Transaction on the back edge.
        tx_id: Hash,
    },

    /// Online block arrived without quorum signatures.
    #[error("Missing quorum signatures in online mode")]
    MissingQuorumSignatures,

    /// Fewer signatures than the quorum requires.
    #[error("Insufficient quorum signatures: {got} < {required}")]
    InsufficientQuorum {
        /// Signatures present.
        got: usize,
        /// Quorum threshold.
        required: usize,
    },

    /// The same trusted node signed twice.
    #[error("Duplicate quorum signer {}", hex::encode(.signer))]
    DuplicateQuorumSigner {
        /// Repeated signer.
        signer: [u8; 32],
    },

    /// A signer is not in the trusted set.
    #[error("Quorum signer {} not trusted", hex::encode(.signer))]
    UntrustedQuorumSigner {
        /// Unknown signer.
        signer: [u8; 32],
    },

    /// A quorum signature fails cryptographic verification.
    #[error("Invalid quorum signature from {}", hex::encode(.signer))]
    InvalidQuorumSignature {
        /// Signer whose signature failed.
        signer: [u8; 32],
    },

    /// Replaying the block would overdraw a sender.
    #[error("Insufficient balance for {}: {balance} < {required}", hex::encode(.sender))]
    InsufficientBalance {
        /// Overdrawn sender.
        sender: [u8; 20],
        /// Balance at the failing transaction.
        balance: u64,
        /// Amount the transaction moves.
        required: u64,
    },

    /// Crediting a receiver would overflow its balance.
    #[error("Balance overflow for {}", hex::encode(.receiver))]
    BalanceOverflow {
        /// Receiver whose balance would overflow.
        receiver: [u8; 20],
    },

    /// The fork detector condemned the block's tip.
    #[error("Malicious fork detected")]
    MaliciousFork,

    /// The block could not be canonically serialized. Unverifiable input
    /// fails closed.
    #[error("Block serialization failed: {0}")]
    SerializationFailed(String),
}
