//! # SHA-256 Hashing and Merkle Trees
//!
//! One-shot hashing helpers plus the Merkle-root construction every chain
//! component agrees on: leaves are paired level by level, the last leaf is
//! duplicated when a level has odd cardinality, and an empty leaf set hashes
//! to `sha256(b"")` as the defined base case.

use sha2::{Digest, Sha256};

/// SHA-256 hash output (256-bit).
pub type Hash = [u8; 32];

/// Hash data with SHA-256 (one-shot).
pub fn sha256(data: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Hash multiple inputs as one message.
pub fn sha256_concat(inputs: &[&[u8]]) -> Hash {
    let mut hasher = Sha256::new();
    for input in inputs {
        hasher.update(input);
    }
    hasher.finalize().into()
}

/// Hash two tree nodes together.
pub fn hash_pair(left: &Hash, right: &Hash) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

/// Compute the Merkle root of an ordered leaf sequence.
///
/// # Algorithm
///
/// 1. An empty sequence yields `sha256(b"")`.
/// 2. Otherwise, pair leaves left-to-right, duplicating the last leaf when
///    the level has odd cardinality, hashing each pair into the next level.
/// 3. Repeat until one root remains.
pub fn compute_merkle_root(leaves: &[Hash]) -> Hash {
    if leaves.is_empty() {
        return sha256(b"");
    }

    let mut level: Vec<Hash> = leaves.to_vec();

    while level.len() > 1 {
        let mut next_level = Vec::with_capacity(level.len().div_ceil(2));

        for chunk in level.chunks(2) {
            let left = &chunk[0];
            let right = chunk.get(1).unwrap_or(left); // Duplicate last if odd
            next_level.push(hash_pair(left, right));
        }

        level = next_level;
    }

    level[0]
}
