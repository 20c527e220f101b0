//! Head pointer: identifier of the last committed block.
//!
//! Owned by the ledger side. Submissions only read it, once, outside the
//! queue's critical section.

use crate::domain::errors::QueueError;
use crate::domain::value_objects::BlockIdentifier;
use crate::ports::outbound::SharedStore;
use std::sync::Arc;

/// Reads and writes the head pointer key.
#[derive(Clone)]
pub struct HeadPointer {
    store: Arc<dyn SharedStore>,
    key: String,
}

impl HeadPointer {
    pub fn new(store: Arc<dyn SharedStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current head, `None` before the first block is committed.
    pub async fn get(&self) -> Result<Option<BlockIdentifier>, QueueError> {
        let Some(raw) = self.store.get(&self.key).await? else {
            return Ok(None);
        };

        let text = String::from_utf8(raw).map_err(|e| self.corrupt(e.to_string()))?;
        BlockIdentifier::parse("head_block_hash", text)
            .map(Some)
            .map_err(|e| self.corrupt(e.to_string()))
    }

    pub async fn set(&self, head: &BlockIdentifier) -> Result<(), QueueError> {
        self.store
            .set(&self.key, head.as_str().as_bytes().to_vec())
            .await?;
        Ok(())
    }

    fn corrupt(&self, reason: String) -> QueueError {
        QueueError::Corrupt {
            key: self.key.clone(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryStore;

    #[tokio::test]
    async fn test_head_roundtrip() {
        let store = Arc::new(InMemoryStore::new());
        let head = HeadPointer::new(store.clone(), "HEAD_BLOCK_HASH");
        assert_eq!(head.get().await.unwrap(), None);

        let h0 = BlockIdentifier::parse("head", "H0").unwrap();
        head.set(&h0).await.unwrap();
        assert_eq!(head.get().await.unwrap(), Some(h0));
        assert_eq!(
            store.get("HEAD_BLOCK_HASH").await.unwrap(),
            Some(b"H0".to_vec())
        );
    }

    #[tokio::test]
    async fn test_invalid_head_is_corrupt() {
        let store = Arc::new(InMemoryStore::new());
        store.set("HEAD_BLOCK_HASH", vec![0xff, 0xfe]).await.unwrap();
        let head = HeadPointer::new(store.clone(), "HEAD_BLOCK_HASH");
        assert!(matches!(head.get().await, Err(QueueError::Corrupt { .. })));

        store.set("HEAD_BLOCK_HASH", Vec::new()).await.unwrap();
        assert!(matches!(head.get().await, Err(QueueError::Corrupt { .. })));
    }
}
