//! In-memory `SharedStore`.
//!
//! Stands in for the out-of-process cache in tests and single-node runs.
//! `compare_and_set` is atomic under the map lock, which is all the queue
//! needs to serialize its read-modify-write cycles.

use crate::domain::errors::StoreError;
use crate::ports::outbound::{CasOutcome, SharedStore};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::trace;

/// Process-local key-value store with whole-value semantics.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently set.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[async_trait]
impl SharedStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        self.entries.lock().insert(key.to_string(), value);
        Ok(())
    }

    async fn compare_and_set(
        &self,
        key: &str,
        expected: Option<&[u8]>,
        replacement: Option<Vec<u8>>,
    ) -> Result<CasOutcome, StoreError> {
        let mut entries = self.entries.lock();
        let current = entries.get(key).map(Vec::as_slice);

        if current != expected {
            trace!(key, "compare_and_set lost to a concurrent writer");
            return Ok(CasOutcome::Conflict {
                current: current.map(<[u8]>::to_vec),
            });
        }

        match replacement {
            Some(value) => {
                entries.insert(key.to_string(), value);
            }
            None => {
                entries.remove(key);
            }
        }
        Ok(CasOutcome::Swapped)
    }
}
