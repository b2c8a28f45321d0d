//! Clipboard configuration.
//!
//! Names the fields through which the engine recognises a registry-bearing
//! document and the references pointing into it.

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default key of the persisted clipboard slot.
pub const DEFAULT_STORAGE_KEY: &str = "assetclip_clipboard";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Field layout of registry-bearing documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipboardConfig {
    /// Key of the persisted clipboard slot.
    pub storage_key: String,
    /// Record fields leading from a registry root to its entity sequence.
    pub registry_path: Vec<String>,
    /// Field holding a foreign entity id.
    pub reference_field: String,
    /// Entity field holding the resource reference used for content hashing.
    pub resource_field: String,
    /// Entity id field.
    pub id_field: String,
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            registry_path: vec!["data".to_string(), "sprites".to_string()],
            reference_field: "spriteId".to_string(),
            resource_field: "texture".to_string(),
            id_field: "id".to_string(),
        }
    }
}

impl ClipboardConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a config from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// The id of an entity record, if it has a string id.
    pub fn id_of<'a>(&self, entity: &'a Value) -> Option<&'a str> {
        entity.get(&self.id_field).and_then(Value::as_str)
    }
}
