//! # NonceGuard Configuration

use serde::{Deserialize, Serialize};

/// Tunables for the nonce ledger.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NonceGuardConfig {
    /// Width of the sliding window: a nonce more than this far ahead of the
    /// lowest unconfirmed nonce is rejected. Bounds per-sender `pending`
    /// memory against attacker-chosen nonce values.
    pub window: u64,
}

impl Default for NonceGuardConfig {
    fn default() -> Self {
        Self { window: 1024 }
    }
}

impl NonceGuardConfig {
    /// Narrow window for tests.
    pub fn for_testing() -> Self {
        Self { window: 8 }
    }
}
