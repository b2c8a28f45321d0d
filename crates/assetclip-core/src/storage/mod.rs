//! Key-value slot storage backing the clipboard.

mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

#[cfg(target_arch = "wasm32")]
mod local;

pub use memory::MemoryStorage;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

#[cfg(target_arch = "wasm32")]
pub use local::LocalStorage;

use crate::BoxFuture;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for string slot backends.
///
/// Implementations can keep slots in memory, in files, or in the browser's
/// local storage.
///
/// Note: On native platforms, implementations must be Send + Sync.
/// On WASM, these bounds are relaxed since it's single-threaded.
#[cfg(not(target_arch = "wasm32"))]
pub trait SlotStorage: Send + Sync {
    /// Read a slot. Missing slots are `None`.
    fn get(&self, key: &str) -> BoxFuture<'_, StorageResult<Option<String>>>;

    /// Overwrite a slot.
    fn set(&self, key: &str, value: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// Remove a slot. Removing a missing slot is not an error.
    fn remove(&self, key: &str) -> BoxFuture<'_, StorageResult<()>>;
}

/// Trait for string slot backends (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait SlotStorage {
    /// Read a slot. Missing slots are `None`.
    fn get(&self, key: &str) -> BoxFuture<'_, StorageResult<Option<String>>>;

    /// Overwrite a slot.
    fn set(&self, key: &str, value: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// Remove a slot. Removing a missing slot is not an error.
    fn remove(&self, key: &str) -> BoxFuture<'_, StorageResult<()>>;
}
