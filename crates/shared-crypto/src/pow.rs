//! # Proof-of-Work Target Arithmetic
//!
//! A block hash satisfies difficulty `d` when, interpreted as a 256-bit
//! big-endian integer, it is strictly below `2^(256 - d)`. All comparisons
//! are big-integer comparisons; floating point never enters the picture.

use crate::errors::CryptoError;
use crate::hashing::Hash;
use primitive_types::U256;

/// The target value for a given difficulty: `2^(256 - difficulty)`.
///
/// Difficulty 0 means "anything goes" and maps to `U256::MAX`; a difficulty
/// of 256 or more leaves no satisfiable hash and is rejected.
pub fn pow_target(difficulty: u32) -> Result<U256, CryptoError> {
    match difficulty {
        0 => Ok(U256::MAX),
        1..=255 => Ok(U256::one() << (256 - difficulty)),
        _ => Err(CryptoError::DifficultyOutOfRange(difficulty)),
    }
}

/// Whether `hash` satisfies `difficulty`.
///
/// An unrepresentable difficulty fails closed.
pub fn meets_target(hash: &Hash, difficulty: u32) -> bool {
    match pow_target(difficulty) {
        Ok(target) => U256::from_big_endian(hash) < target,
        Err(_) => false,
    }
}
