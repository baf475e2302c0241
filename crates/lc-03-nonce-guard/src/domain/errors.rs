//! # Nonce Errors

use thiserror::Error;

/// Reasons a nonce fails validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NonceError {
    /// The nonce is at or below the confirmed watermark (replay).
    #[error("Nonce {nonce} already confirmed (watermark {watermark})")]
    AlreadyConfirmed {
        /// The rejected nonce.
        nonce: u64,
        /// Highest confirmed nonce for the sender.
        watermark: u64,
    },

    /// The nonce is reserved by an in-flight submission (double-submit).
    #[error("Nonce {nonce} already pending")]
    AlreadyPending {
        /// The rejected nonce.
        nonce: u64,
    },

    /// The nonce jumps further ahead than the sliding window allows.
    #[error("Nonce {nonce} outside window (next expected {base}, window {window})")]
    OutOfWindow {
        /// The rejected nonce.
        nonce: u64,
        /// Lowest unconfirmed nonce for the sender.
        base: u64,
        /// Configured window width.
        window: u64,
    },
}
