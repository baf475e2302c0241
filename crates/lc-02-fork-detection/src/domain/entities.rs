//! # Fork Tracking Entities
//!
//! Records kept per detected fork: the canonical pair identifier, the two
//! competing tips, and where they diverged.

use serde::{Deserialize, Serialize};
use shared_types::{ChainTip, ForkStatus, Hash, PublicKey};

/// Order-independent identity of a fork: the canonical pairing of the two
/// tip hashes. Re-detecting the same pair in either order yields the same
/// `ForkId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ForkId {
    lo: Hash,
    hi: Hash,
}

impl ForkId {
    /// Build the canonical pairing `min(a, b) : max(a, b)`.
    pub fn new(a: Hash, b: Hash) -> Self {
        if a <= b {
            Self { lo: a, hi: b }
        } else {
            Self { lo: b, hi: a }
        }
    }

    /// The lexically smaller tip hash.
    pub fn lo(&self) -> &Hash {
        &self.lo
    }

    /// The lexically larger tip hash.
    pub fn hi(&self) -> &Hash {
        &self.hi
    }
}

impl std::fmt::Display for ForkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", hex::encode(self.lo), hex::encode(self.hi))
    }
}

/// Condensed view of one side of a fork.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TipSummary {
    /// Tip block hash.
    pub tip_hash: Hash,
    /// Tip height.
    pub height: u64,
    /// Producing miner.
    pub miner: PublicKey,
    /// Tip score.
    pub score: f64,
    /// Whether the tip came from the mesh partition.
    pub is_offgrid: bool,
}

impl From<&ChainTip> for TipSummary {
    fn from(tip: &ChainTip) -> Self {
        Self {
            tip_hash: tip.block_hash,
            height: tip.height,
            miner: tip.miner,
            score: tip.score,
            is_offgrid: tip.is_offgrid,
        }
    }
}

/// Where two chains split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DivergenceInfo {
    /// Hash of the last block both chains share.
    pub ancestor: Hash,
    /// Height of the common ancestor.
    pub height: u64,
    /// Blocks between the main tip and the ancestor.
    pub depth: u64,
}

/// Detailed fork report for audit trails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForkDetails {
    /// The chain the detector currently follows.
    pub main_chain: TipSummary,
    /// The competing chain.
    pub fork_chain: TipSummary,
    /// Divergence point.
    pub divergence: DivergenceInfo,
}

/// One validated fork: a unique record per unordered tip pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForkValidation {
    /// Canonical pair identity.
    pub fork_id: ForkId,
    /// Classification at detection time.
    pub status: ForkStatus,
    /// The tip being validated when the fork was found.
    pub main_tip: ChainTip,
    /// The competing tip.
    pub fork_tip: ChainTip,
    /// Last shared block hash.
    pub common_ancestor: Hash,
    /// Height of the common ancestor.
    pub divergence_height: u64,
    /// Audit detail.
    pub details: ForkDetails,
}
