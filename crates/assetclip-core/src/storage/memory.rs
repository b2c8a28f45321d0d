//! In-memory slot storage.

use super::{SlotStorage, StorageError, StorageResult};
use crate::BoxFuture;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
#[derive(Default)]
pub struct MemoryStorage {
    slots: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SlotStorage for MemoryStorage {
    fn get(&self, key: &str) -> BoxFuture<'_, StorageResult<Option<String>>> {
        let key = key.to_string();
        Box::pin(async move {
            let slots = self.slots.read().map_err(|e| {
                StorageError::Other(format!("Lock error: {}", e))
            })?;
            Ok(slots.get(&key).cloned())
        })
    }

    fn set(&self, key: &str, value: &str) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        let value = value.to_string();
        Box::pin(async move {
            let mut slots = self.slots.write().map_err(|e| {
                StorageError::Other(format!("Lock error: {}", e))
            })?;
            slots.insert(key, value);
            Ok(())
        })
    }

    fn remove(&self, key: &str) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        Box::pin(async move {
            let mut slots = self.slots.write().map_err(|e| {
                StorageError::Other(format!("Lock error: {}", e))
            })?;
            slots.remove(&key);
            Ok(())
        })
    }
}
