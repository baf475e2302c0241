//! # Rejection Log
//!
//! Bounded ring of recently rejected block hashes and their reasons,
//! queryable for audit. Newest entries evict the oldest once the ring is
//! full.

use shared_types::Hash;
use std::collections::VecDeque;

/// One audit entry.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectionRecord {
    /// Hash of the rejected block.
    pub block_hash: Hash,
    /// Rendered rejection reason.
    pub reason: String,
}

/// Bounded rejection history.
#[derive(Debug)]
pub struct RejectionLog {
    capacity: usize,
    entries: VecDeque<RejectionRecord>,
}

impl RejectionLog {
    /// Create a log holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity.min(64)),
        }
    }

    /// Record a rejection, evicting the oldest entry when full.
    pub fn record(&mut self, block_hash: Hash, reason: String) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(RejectionRecord { block_hash, reason });
    }

    /// Entries oldest-first.
    pub fn entries(&self) -> impl Iterator<Item = &RejectionRecord> {
        self.entries.iter()
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
