//! # Nonce Ledger Service
//!
//! Tracks per-sender nonces behind a single mutex. The whole map is locked
//! per call rather than per entry: calls are short, and snapshot/restore
//! needs a consistent full view.

use crate::config::NonceGuardConfig;
use crate::domain::{NonceError, NonceState};
use crate::ports::NonceStore;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

/// Per-sender monotonic nonce ledger.
///
/// Generic over the sender key: the validation path keys by account
/// address, the synchronizer keys by node ID.
pub struct NonceLedger<K> {
    config: NonceGuardConfig,
    states: Mutex<HashMap<K, NonceState>>,
    store: Option<Arc<dyn NonceStore<K>>>,
}

impl<K> NonceLedger<K>
where
    K: Clone + Eq + Hash + std::fmt::Debug + Send + Sync,
{
    /// Create an empty ledger.
    pub fn new(config: NonceGuardConfig) -> Self {
        Self {
            config,
            states: Mutex::new(HashMap::new()),
            store: None,
        }
    }

    /// Create an empty ledger with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(NonceGuardConfig::default())
    }

    /// Create a ledger backed by a persistence collaborator, loading any
    /// previously saved watermarks.
    pub fn with_store(config: NonceGuardConfig, store: Arc<dyn NonceStore<K>>) -> Self {
        let states = match store.load_all() {
            Ok(states) => states,
            Err(e) => {
                tracing::warn!(error = %e, "nonce store load failed, starting empty");
                HashMap::new()
            }
        };
        Self {
            config,
            states: Mutex::new(states),
            store: Some(store),
        }
    }

    /// Validate a nonce for `key`, optionally reserving it.
    ///
    /// Rejects nonces at or below the confirmed watermark (replay), nonces
    /// already reserved (double-submit), and nonces beyond the sliding
    /// window (unbounded reservation attack).
    pub fn validate_nonce(&self, key: &K, nonce: u64, reserve: bool) -> Result<(), NonceError> {
        let mut states = self.states.lock();
        let state = states.entry(key.clone()).or_default();

        if state.is_confirmed(nonce) {
            return Err(NonceError::AlreadyConfirmed {
                nonce,
                watermark: state.last_used.unwrap_or(0),
            });
        }
        if state.pending.contains(&nonce) {
            return Err(NonceError::AlreadyPending { nonce });
        }
        let base = state.base();
        if nonce >= base.saturating_add(self.config.window) {
            return Err(NonceError::OutOfWindow {
                nonce,
                base,
                window: self.config.window,
            });
        }

        if reserve {
            state.pending.insert(nonce);
            let snapshot = state.clone();
            drop(states);
            self.persist(key, &snapshot);
        }
        Ok(())
    }

    /// Confirm a nonce after the transaction/operation committed.
    pub fn confirm_nonce(&self, key: &K, nonce: u64) {
        let mut states = self.states.lock();
        let state = states.entry(key.clone()).or_default();
        state.confirm(nonce);
        let snapshot = state.clone();
        drop(states);
        self.persist(key, &snapshot);
    }

    /// Release a reserved nonce after the submission failed.
    pub fn reject_nonce(&self, key: &K, nonce: u64) {
        let mut states = self.states.lock();
        let state = states.entry(key.clone()).or_default();
        state.reject(nonce);
        let snapshot = state.clone();
        drop(states);
        self.persist(key, &snapshot);
    }

    /// The next usable nonce for `key`, skipping reservations.
    pub fn get_next_nonce(&self, key: &K) -> u64 {
        self.states
            .lock()
            .get(key)
            .map(NonceState::next_free)
            .unwrap_or(0)
    }

    /// Whether `nonce` was already confirmed for `key`.
    pub fn is_confirmed(&self, key: &K, nonce: u64) -> bool {
        self.states
            .lock()
            .get(key)
            .is_some_and(|s| s.is_confirmed(nonce))
    }

    /// Drop all reservations for `key`.
    pub fn clear_pending(&self, key: &K) {
        let mut states = self.states.lock();
        if let Some(state) = states.get_mut(key) {
            state.pending.clear();
            let snapshot = state.clone();
            drop(states);
            self.persist(key, &snapshot);
        }
    }

    /// Forget `key` entirely.
    pub fn reset(&self, key: &K) {
        if self.states.lock().remove(key).is_some() {
            if let Some(store) = &self.store {
                if let Err(e) = store.remove(key) {
                    tracing::warn!(key = ?key, error = %e, "nonce store remove failed");
                }
            }
        }
    }

    /// Consistent copy of every sender's state.
    pub fn snapshot(&self) -> HashMap<K, NonceState> {
        self.states.lock().clone()
    }

    /// Replace the in-memory table, e.g. from a collaborator's backup.
    pub fn restore(&self, states: HashMap<K, NonceState>) {
        *self.states.lock() = states;
    }

    fn persist(&self, key: &K, state: &NonceState) {
        if let Some(store) = &self.store {
            if let Err(e) = store.save(key, state) {
                tracing::warn!(key = ?key, error = %e, "nonce store save failed");
            }
        }
    }
}
