//! AssetClip Core Library
//!
//! Copy/paste transfer engine for hierarchical documents. Copies nested
//! values (binary resources included) into a persisted envelope together
//! with the registry entities they reference, and on paste deduplicates
//! those entities against the destination registry by content hash.

pub mod clipboard;
pub mod codec;
pub mod config;
pub mod graph;
pub mod hash;
pub mod merge;
pub mod notice;
pub mod registry;
pub mod resolve;
pub mod storage;
pub mod value;

#[cfg(test)]
mod test_support;

pub use clipboard::{Clipboard, ClipboardError, ClipboardStore, Envelope, PasteOptions, PasteReport};
pub use config::ClipboardConfig;
pub use hash::{ContentHasher, HashError, Sha256Hasher};
pub use notice::{LogNotifier, Notice, Notifier, RecordingNotifier};
pub use registry::{Entity, Registry, StagedRegistry};
pub use resolve::RemapTable;
pub use storage::{MemoryStorage, SlotStorage, StorageError, StorageResult};
pub use value::{Blob, BlobContent, Record, Value};

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStorage;

#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorage;

use std::future::Future;
use std::pin::Pin;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;
