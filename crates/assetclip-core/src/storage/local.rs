//! Browser `localStorage` slot storage for WebAssembly.

use super::{SlotStorage, StorageError, StorageResult};
use crate::BoxFuture;
use web_sys::Storage;

/// `localStorage`-backed storage.
///
/// The handle is looked up on each call so a storage that becomes
/// unavailable (private browsing, quota policy) surfaces as an error.
#[derive(Default)]
pub struct LocalStorage;

impl LocalStorage {
    pub fn new() -> Self {
        Self
    }

    fn storage() -> StorageResult<Storage> {
        let window = web_sys::window()
            .ok_or_else(|| StorageError::Other("No window object".to_string()))?;
        window
            .local_storage()
            .map_err(|e| StorageError::Other(format!("localStorage error: {:?}", e)))?
            .ok_or_else(|| StorageError::Other("localStorage not available".to_string()))
    }
}

impl SlotStorage for LocalStorage {
    fn get(&self, key: &str) -> BoxFuture<'_, StorageResult<Option<String>>> {
        let key = key.to_string();
        Box::pin(async move {
            Self::storage()?
                .get_item(&key)
                .map_err(|e| StorageError::Io(format!("Get error: {:?}", e)))
        })
    }

    fn set(&self, key: &str, value: &str) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        let value = value.to_string();
        Box::pin(async move {
            Self::storage()?
                .set_item(&key, &value)
                .map_err(|e| StorageError::Io(format!("Set error: {:?}", e)))
        })
    }

    fn remove(&self, key: &str) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        Box::pin(async move {
            Self::storage()?
                .remove_item(&key)
                .map_err(|e| StorageError::Io(format!("Remove error: {:?}", e)))
        })
    }
}
