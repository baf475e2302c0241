//! # Core Domain Entities
//!
//! Defines the entities shared by the LogiChain core subsystems.
//!
//! ## Clusters
//!
//! - **Chain**: `Transaction`, `QuorumSignature`, `Block`, `ChainContext`
//! - **Fork tracking**: `ChainTip`, `ForkStatus`
//! - **Partition state**: `Operation`, `GeoPoint`, `NetworkState`

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use std::collections::{HashMap, HashSet};

// Re-export U256 from primitive-types for use across all subsystems
pub use primitive_types::U256;

// =============================================================================
// CLUSTER A: THE CHAIN
// =============================================================================

/// A 32-byte SHA-256 hash.
pub type Hash = [u8; 32];

/// A 64-byte Ed25519 signature.
pub type Signature = [u8; 64];

/// A 32-byte Ed25519 public key.
pub type PublicKey = [u8; 32];

/// A 20-byte account address.
pub type Address = [u8; 20];

/// Unique identifier for a node in either partition.
///
/// Mesh nodes announce themselves by name (radio call-sign style), so this
/// is a string identity rather than a key-derived one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct NodeId(pub String);

impl NodeId {
    /// Create a node ID from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which partition a block, state or context belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetworkMode {
    /// Fully-connected quorum-signed network.
    Online,
    /// Intermittently-connected LoRa mesh partition.
    Offline,
}

/// Fork-choice rule announced by the validator's context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForkChoiceRule {
    /// Prefer the chain with the most blocks.
    LongestChain,
    /// Prefer the chain with the most accumulated work.
    HeaviestChain,
}

/// A ledger transaction.
///
/// Dependencies reference other transaction IDs *within the same block*;
/// the dependency relation must be acyclic. Immutable once included.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction identifier.
    pub tx_id: Hash,
    /// Sender address.
    pub sender: Address,
    /// Receiver address.
    pub receiver: Address,
    /// Amount in base units.
    pub amount: u64,
    /// Unix timestamp (seconds) when the transaction was created.
    pub timestamp: u64,
    /// Sender's signature over the canonical fields.
    #[serde_as(as = "Bytes")]
    pub signature: Signature,
    /// Sender's public key.
    pub public_key: PublicKey,
    /// IDs of transactions in the same block this one depends on.
    pub dependencies: Vec<Hash>,
}

impl Transaction {
    /// Merkle leaf hash over the canonical fields.
    ///
    /// The leaf covers identity, endpoints, amount and timestamp; the
    /// signature is excluded so that re-signing cannot move a committed
    /// transaction inside the tree.
    pub fn leaf_hash(&self) -> Hash {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(self.tx_id);
        hasher.update(self.sender);
        hasher.update(self.receiver);
        hasher.update(self.amount.to_le_bytes());
        hasher.update(self.timestamp.to_le_bytes());
        hasher.finalize().into()
    }
}

/// A quorum signature: the trusted signer's identity plus their signature
/// over the block hash.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuorumSignature {
    /// Public key of the signing trusted node.
    pub signer: PublicKey,
    /// Ed25519 signature over the block hash.
    #[serde_as(as = "Bytes")]
    pub signature: Signature,
}

/// A candidate block.
///
/// The hash is always derived from the sealed header fields, never stored
/// as authoritative input; once accepted, the hash is the block's identity.
/// `height` and `proposer` are chain metadata: height is implied by the
/// `previous_hash` linkage and the proposer is attested by the partition
/// that produced the block, so neither enters the sealed encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Protocol version.
    pub version: u16,
    /// Block height in the producing chain.
    pub height: u64,
    /// Hash of the preceding block in the canonical chain.
    pub previous_hash: Hash,
    /// Merkle root over the transaction list.
    pub merkle_root: Hash,
    /// Unix timestamp (seconds) when the block was produced.
    pub timestamp: u64,
    /// Proof-of-work difficulty (leading-zero bits of the target).
    pub difficulty: u32,
    /// Proof-of-work nonce.
    pub nonce: u64,
    /// The miner that produced this block.
    pub proposer: PublicKey,
    /// Transactions carried by this block.
    pub transactions: Vec<Transaction>,
    /// Quorum signatures (present on online-mode blocks).
    pub quorum_sigs: Option<Vec<QuorumSignature>>,
}

impl Block {
    /// Derived block hash: SHA-256 over the canonical header encoding
    /// `version ‖ previous_hash ‖ merkle_root ‖ timestamp ‖ difficulty ‖ nonce`
    /// with integers in fixed-width little-endian form. This is also the
    /// proof-of-work preimage.
    pub fn hash(&self) -> Hash {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(self.version.to_le_bytes());
        hasher.update(self.previous_hash);
        hasher.update(self.merkle_root);
        hasher.update(self.timestamp.to_le_bytes());
        hasher.update(self.difficulty.to_le_bytes());
        hasher.update(self.nonce.to_le_bytes());
        hasher.finalize().into()
    }
}

/// The validator's view of the chain at validation time.
///
/// Owned by the storage collaborator; this subsystem never persists it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainContext {
    /// Required proof-of-work difficulty for the candidate block.
    pub difficulty: u32,
    /// The current tip of the canonical chain, if any.
    pub last_block: Option<Block>,
    /// Account balances before the candidate block is applied.
    pub current_state: HashMap<Address, u64>,
    /// Public keys of the trusted quorum nodes.
    pub trusted_nodes: HashSet<PublicKey>,
    /// Fork-choice rule in effect.
    pub fork_choice_rule: ForkChoiceRule,
    /// Which partition the validator operates in.
    pub network_mode: NetworkMode,
}

// =============================================================================
// CLUSTER B: FORK TRACKING
// =============================================================================

/// One observed chain tip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainTip {
    /// Tip block hash.
    pub block_hash: Hash,
    /// Tip height.
    pub height: u64,
    /// Tip block timestamp (Unix seconds).
    pub timestamp: u64,
    /// Public key of the miner that produced the tip.
    pub miner: PublicKey,
    /// Parent block hash.
    pub parent_hash: Hash,
    /// Whether the tip was produced on the mesh partition.
    pub is_offgrid: bool,
    /// Tip score (see `lc-02-fork-detection`'s scoring module).
    pub score: f64,
}

/// Classification of a chain tip relative to the other known tips.
///
/// Variants are ordered by severity: when one tip participates in several
/// forks, the most severe classification wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ForkStatus {
    /// No competing tip; the block extends the chain cleanly.
    Valid,
    /// The fork is too deep or too old to matter.
    Stale,
    /// The fork's score is too weak to ever win.
    Orphaned,
    /// A legitimate, currently-unresolved fork.
    Divergent,
    /// A fork matching a known attack pattern.
    Malicious,
}

impl ForkStatus {
    /// Whether this classification should stop block acceptance.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ForkStatus::Malicious)
    }
}

impl std::fmt::Display for ForkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ForkStatus::Valid => "VALID",
            ForkStatus::Stale => "STALE",
            ForkStatus::Orphaned => "ORPHANED",
            ForkStatus::Divergent => "DIVERGENT",
            ForkStatus::Malicious => "MALICIOUS",
        };
        f.write_str(s)
    }
}

// =============================================================================
// CLUSTER C: PARTITION STATE
// =============================================================================

/// A recorded geolocation sample attached to a delivery operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees, [-90, 90].
    pub lat: f64,
    /// Longitude in degrees, [-180, 180].
    pub lon: f64,
    /// Unix timestamp (seconds) of the sample.
    pub timestamp: u64,
}

/// The partition-agnostic unit of state change exchanged during
/// synchronization: a transaction, a delivery proof, or any other
/// state-changing action.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Globally unique operation identifier.
    pub op_id: String,
    /// Originating node.
    pub node_id: NodeId,
    /// Sender-side monotonic counter, arbitrated by NonceGuard.
    pub nonce: u64,
    /// Unix timestamp (seconds) when the operation was recorded.
    pub timestamp: u64,
    /// Operation payload.
    pub data: serde_json::Value,
    /// Originator's signature over the payload.
    #[serde_as(as = "Bytes")]
    pub signature: Signature,
    /// Originator's public key.
    pub public_key: PublicKey,
    /// Optional route trace for delivery operations.
    pub location_history: Option<Vec<GeoPoint>>,
}

/// Free-form per-node sub-state exchanged during synchronization.
pub type NodeStateMap = serde_json::Map<String, serde_json::Value>;

/// A partition's accumulated view, produced independently by each side and
/// consumed pairwise by the Secure Synchronizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkState {
    /// All operations accumulated by this partition.
    pub operations: Vec<Operation>,
    /// Hash of the partition's latest block.
    pub last_block_hash: Hash,
    /// Unix timestamp (seconds) when the snapshot was taken.
    pub timestamp: u64,
    /// Per-node sub-states.
    pub node_states: HashMap<NodeId, NodeStateMap>,
    /// Which partition produced the snapshot.
    pub network_mode: NetworkMode,
}
