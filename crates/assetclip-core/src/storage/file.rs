//! File-based slot storage for native platforms.

use super::{SlotStorage, StorageError, StorageResult};
use crate::BoxFuture;
use std::fs;
use std::path::PathBuf;

/// File-based storage for native platforms.
///
/// Stores each slot as a JSON file in a specified directory.
pub struct FileStorage {
    /// Base directory for slot files.
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a new file storage with the given base directory.
    ///
    /// Creates the directory if it doesn't exist.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("Failed to create storage directory: {}", e))
            })?;
        }
        Ok(Self { base_path })
    }

    /// Create file storage in the default location.
    ///
    /// On Unix: `~/.local/share/assetclip/` (or the home directory fallback)
    /// On Windows: `%LOCALAPPDATA%\assetclip\`
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;

        Self::new(base.join("assetclip"))
    }

    /// Get the file path for a slot key.
    fn slot_path(&self, key: &str) -> PathBuf {
        // Sanitize key to be safe for filenames
        let safe_key: String = key
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.base_path.join(format!("{}.json", safe_key))
    }

    /// Get the base path.
    pub fn base_path(&self) -> &PathBuf {
        &self.base_path
    }
}

impl SlotStorage for FileStorage {
    fn get(&self, key: &str) -> BoxFuture<'_, StorageResult<Option<String>>> {
        let path = self.slot_path(key);

        Box::pin(async move {
            if !path.exists() {
                return Ok(None);
            }

            fs::read_to_string(&path).map(Some).map_err(|e| {
                StorageError::Io(format!("Failed to read {}: {}", path.display(), e))
            })
        })
    }

    fn set(&self, key: &str, value: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.slot_path(key);
        let tmp = path.with_extension("json.tmp");
        let value = value.to_string();

        Box::pin(async move {
            // Write then rename so a failed write never truncates the slot
            fs::write(&tmp, value).map_err(|e| {
                StorageError::Io(format!("Failed to write {}: {}", tmp.display(), e))
            })?;
            fs::rename(&tmp, &path).map_err(|e| {
                StorageError::Io(format!("Failed to replace {}: {}", path.display(), e))
            })
        })
    }

    fn remove(&self, key: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.slot_path(key);

        Box::pin(async move {
            if path.exists() {
                fs::remove_file(&path).map_err(|e| {
                    StorageError::Io(format!("Failed to delete {}: {}", path.display(), e))
                })?;
            }
            Ok(())
        })
    }
}
