//! # Nonce State
//!
//! The per-sender record NonceGuard keeps: a confirmed watermark plus the
//! set of nonces reserved but not yet committed.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Nonce bookkeeping for one sender.
///
/// `last_used` only advances on confirmation; `pending` holds reservations
/// that are either confirmed (moving the watermark) or rejected (freed).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonceState {
    /// Highest confirmed nonce, `None` until the first confirmation.
    pub last_used: Option<u64>,
    /// Nonces reserved by in-flight transactions/operations.
    pub pending: BTreeSet<u64>,
}

impl NonceState {
    /// The lowest nonce that is neither confirmed nor reserved.
    pub fn next_free(&self) -> u64 {
        let mut candidate = self.base();
        while self.pending.contains(&candidate) {
            candidate += 1;
        }
        candidate
    }

    /// The lowest nonce not yet confirmed.
    pub fn base(&self) -> u64 {
        self.last_used.map_or(0, |n| n.saturating_add(1))
    }

    /// Whether `nonce` is at or below the confirmed watermark.
    pub fn is_confirmed(&self, nonce: u64) -> bool {
        self.last_used.is_some_and(|w| nonce <= w)
    }

    /// Confirm `nonce`: advance the watermark and drop reservations the new
    /// watermark makes unusable.
    pub fn confirm(&mut self, nonce: u64) {
        if self.last_used.is_none_or(|w| nonce > w) {
            self.last_used = Some(nonce);
        }
        self.pending.remove(&nonce);
        let watermark = self.last_used.unwrap_or(0);
        self.pending.retain(|&n| n > watermark);
    }

    /// Free a reservation without touching the watermark.
    pub fn reject(&mut self, nonce: u64) {
        self.pending.remove(&nonce);
    }
}
