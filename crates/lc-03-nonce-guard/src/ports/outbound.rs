//! Driven ports (outbound dependencies)
//!
//! Nonce watermarks must survive process restarts; the storage collaborator
//! implements this port and the ledger calls it on every mutation. The
//! in-memory ledger stays authoritative: a failed save is logged by the
//! caller and retried on the next mutation, never allowed to reorder nonces.

use crate::domain::NonceState;
use std::collections::HashMap;

/// Persistence for per-sender nonce state.
pub trait NonceStore<K>: Send + Sync {
    /// Load every persisted nonce state.
    fn load_all(&self) -> Result<HashMap<K, NonceState>, String>;

    /// Persist the state for one sender.
    fn save(&self, key: &K, state: &NonceState) -> Result<(), String>;

    /// Remove the persisted state for one sender.
    fn remove(&self, key: &K) -> Result<(), String>;
}

/// In-memory store for tests and single-process deployments.
#[derive(Debug, Default)]
pub struct InMemoryNonceStore<K> {
    states: parking_lot::Mutex<HashMap<K, NonceState>>,
}

impl<K> InMemoryNonceStore<K> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            states: parking_lot::Mutex::new(HashMap::new()),
        }
    }
}

impl<K> NonceStore<K> for InMemoryNonceStore<K>
where
    K: Clone + Eq + std::hash::Hash + Send + Sync,
{
    fn load_all(&self) -> Result<HashMap<K, NonceState>, String> {
        Ok(self.states.lock().clone())
    }

    fn save(&self, key: &K, state: &NonceState) -> Result<(), String> {
        self.states.lock().insert(key.clone(), state.clone());
        Ok(())
    }

    fn remove(&self, key: &K) -> Result<(), String> {
        self.states.lock().remove(key);
        Ok(())
    }
}
