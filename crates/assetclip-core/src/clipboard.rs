//! Copy/paste orchestration over a single persisted envelope slot.
//!
//! ```text
//! copy:  walk deps -> encode data + deps -> write slot (only if all encoded)
//! paste: load -> type check -> decode -> resolve deps -> rewrite refs
//!        -> commit registry inserts -> drop excluded -> merge into target
//! read:  same as paste, returning the value instead of merging
//! ```

use crate::codec::{self, CodecError};
use crate::config::ClipboardConfig;
use crate::graph;
use crate::hash::{ContentHasher, Sha256Hasher};
use crate::notice::{LogNotifier, Notice, Notifier};
use crate::registry::{self, Entity, Registry};
use crate::resolve::resolve;
use crate::storage::{SlotStorage, StorageError};
use crate::value::{Record, Value};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Clipboard errors.
#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("Failed to encode clipboard data: {0}")]
    Encode(#[source] CodecError),
    #[error("Failed to decode clipboard data: {0}")]
    Decode(String),
    #[error("Clipboard is empty")]
    Empty,
    #[error("Type mismatch (clipboard: {clipboard}, target: {requested})")]
    TypeMismatch { clipboard: String, requested: String },
    #[error("Clipboard payload is not a record")]
    PayloadNotRecord,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ClipboardError {
    fn paste_notice(&self) -> Notice {
        match self {
            ClipboardError::Empty => Notice::ClipboardEmpty,
            ClipboardError::TypeMismatch { clipboard, requested } => Notice::TypeMismatch {
                clipboard: clipboard.clone(),
                requested: requested.clone(),
            },
            other => Notice::PasteFailed(other.to_string()),
        }
    }
}

/// The persisted clipboard contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub type_tag: String,
    pub data: serde_json::Value,
    #[serde(default)]
    pub dependencies: Vec<serde_json::Value>,
}

/// The single clipboard slot in a storage backend.
pub struct ClipboardStore<S: SlotStorage> {
    storage: Arc<S>,
    key: String,
}

impl<S: SlotStorage> ClipboardStore<S> {
    pub fn new(storage: Arc<S>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// Load the envelope, if the slot holds one.
    pub async fn load(&self) -> Result<Option<Envelope>, ClipboardError> {
        match self.storage.get(&self.key).await? {
            Some(text) if !text.is_empty() => serde_json::from_str(&text)
                .map(Some)
                .map_err(|e| ClipboardError::Decode(format!("Malformed envelope: {}", e))),
            _ => Ok(None),
        }
    }

    /// Replace the slot with a fully built envelope.
    pub async fn save(&self, envelope: &Envelope) -> Result<(), ClipboardError> {
        let text = serde_json::to_string(envelope)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.storage.set(&self.key, &text).await?;
        Ok(())
    }

    /// Empty the slot.
    pub async fn clear(&self) -> Result<(), ClipboardError> {
        Ok(self.storage.remove(&self.key).await?)
    }

    /// Get a reference to the storage backend.
    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }
}

/// Options for [`Clipboard::paste`].
#[derive(Debug, Clone, Default)]
pub struct PasteOptions {
    /// Top-level payload fields never assigned onto the target.
    pub exclude: Vec<String>,
}

impl PasteOptions {
    pub fn exclude<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            exclude: keys.into_iter().map(Into::into).collect(),
        }
    }
}

/// What a paste changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PasteReport {
    /// Fields assigned onto the target.
    pub merged: usize,
    /// Entities added to the destination registry.
    pub added: usize,
    /// Dependencies replaced by existing entities with identical content.
    pub remapped: usize,
}

/// A decoded envelope with references resolved against a destination.
struct Materialized {
    payload: Value,
    added: usize,
    remapped: usize,
}

/// Copy/paste engine.
pub struct Clipboard<S: SlotStorage, H: ContentHasher = Sha256Hasher> {
    store: ClipboardStore<S>,
    hasher: H,
    notifier: Arc<dyn Notifier>,
    config: ClipboardConfig,
}

impl<S: SlotStorage> Clipboard<S, Sha256Hasher> {
    /// Create a clipboard with SHA-256 content hashing and log notices.
    pub fn new(storage: Arc<S>, config: ClipboardConfig) -> Self {
        Self::with_hasher(storage, Sha256Hasher::new(), config)
    }
}

impl<S: SlotStorage, H: ContentHasher> Clipboard<S, H> {
    pub fn with_hasher(storage: Arc<S>, hasher: H, config: ClipboardConfig) -> Self {
        Self {
            store: ClipboardStore::new(storage, config.storage_key.clone()),
            hasher,
            notifier: Arc::new(LogNotifier),
            config,
        }
    }

    /// Send notices somewhere other than the log.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn config(&self) -> &ClipboardConfig {
        &self.config
    }

    pub fn store(&self) -> &ClipboardStore<S> {
        &self.store
    }

    /// Copy `data` under `type_tag`.
    ///
    /// When `root` exposes a registry, the entities `data` references are
    /// carried along. The slot is only written once everything encoded.
    pub async fn copy(
        &self,
        type_tag: &str,
        data: &Value,
        root: Option<&Value>,
    ) -> Result<(), ClipboardError> {
        let result = match self.build_envelope(type_tag, data, root).await {
            Ok(envelope) => self.store.save(&envelope).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                self.notifier.notify(Notice::Copied);
                Ok(())
            }
            Err(e) => {
                self.notifier.notify(Notice::CopyFailed(e.to_string()));
                Err(e)
            }
        }
    }

    async fn build_envelope(
        &self,
        type_tag: &str,
        data: &Value,
        root: Option<&Value>,
    ) -> Result<Envelope, ClipboardError> {
        let dependencies: Vec<Value> = root
            .and_then(|root| registry::entities_of(root, &self.config))
            .map(|candidates| graph::walk(data, &candidates, &self.config.reference_field))
            .unwrap_or_default()
            .into_iter()
            .map(Entity::into_value)
            .collect();
        log::debug!("Copying '{}' with {} dependencies", type_tag, dependencies.len());

        Ok(Envelope {
            type_tag: type_tag.to_string(),
            data: codec::encode(data).await.map_err(ClipboardError::Encode)?,
            dependencies: codec::encode_all(&dependencies)
                .await
                .map_err(ClipboardError::Encode)?,
        })
    }

    /// Paste the clipboard into `target`.
    ///
    /// Fields of the payload overwrite same-named fields of `target`; fields
    /// named in `options.exclude` are dropped first. Dependencies are merged
    /// into the registry `root` exposes, if any. Nothing is mutated unless
    /// the whole pipeline succeeds.
    pub async fn paste(
        &self,
        type_tag: &str,
        target: &mut Record,
        root: Option<&mut Value>,
        options: &PasteOptions,
    ) -> Result<PasteReport, ClipboardError> {
        let materialized = match self.materialize(type_tag, root, true).await {
            Ok(m) => m,
            Err(e) => {
                log::warn!("Paste of '{}' aborted: {}", type_tag, e);
                self.notifier.notify(e.paste_notice());
                return Err(e);
            }
        };

        let Value::Record(mut fields) = materialized.payload else {
            self.notifier.notify(ClipboardError::PayloadNotRecord.paste_notice());
            return Err(ClipboardError::PayloadNotRecord);
        };
        for key in &options.exclude {
            fields.shift_remove(key);
        }

        let report = PasteReport {
            merged: fields.len(),
            added: materialized.added,
            remapped: materialized.remapped,
        };
        for (key, value) in fields {
            target.insert(key, value);
        }

        log::info!(
            "Pasted '{}': {} fields, {} entities added, {} remapped",
            type_tag,
            report.merged,
            report.added,
            report.remapped
        );
        if report.merged == 0 && report.added == 0 {
            self.notifier.notify(Notice::NothingPasted);
        } else {
            self.notifier.notify(Notice::Pasted {
                merged: report.merged,
                added: report.added,
            });
        }
        Ok(report)
    }

    /// Decode the clipboard for custom merge logic.
    ///
    /// Returns `None` when the clipboard is empty or holds another type.
    /// Dependencies are still merged into `root`'s registry.
    pub async fn read(
        &self,
        type_tag: &str,
        root: Option<&mut Value>,
    ) -> Result<Option<Value>, ClipboardError> {
        match self.materialize(type_tag, root, false).await {
            Ok(m) => Ok(Some(m.payload)),
            Err(ClipboardError::Empty) => Ok(None),
            Err(ClipboardError::TypeMismatch { clipboard, .. }) => {
                log::debug!("Clipboard holds '{}', not '{}'", clipboard, type_tag);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Type tag of the current envelope, if any.
    pub async fn current_type(&self) -> Result<Option<String>, ClipboardError> {
        Ok(self.store.load().await?.map(|e| e.type_tag))
    }

    /// Empty the clipboard.
    pub async fn clear(&self) -> Result<(), ClipboardError> {
        self.store.clear().await
    }

    async fn materialize(
        &self,
        type_tag: &str,
        root: Option<&mut Value>,
        require_record: bool,
    ) -> Result<Materialized, ClipboardError> {
        let envelope = self.store.load().await?.ok_or(ClipboardError::Empty)?;
        if envelope.type_tag != type_tag {
            return Err(ClipboardError::TypeMismatch {
                clipboard: envelope.type_tag,
                requested: type_tag.to_string(),
            });
        }

        let mut payload = codec::decode(envelope.data)
            .map_err(|e| ClipboardError::Decode(e.to_string()))?;
        if require_record && payload.as_record().is_none() {
            return Err(ClipboardError::PayloadNotRecord);
        }

        let mut materialized = Materialized {
            payload: Value::Null,
            added: 0,
            remapped: 0,
        };
        // Dependencies only matter when there is a registry to merge them into
        let registry = root.and_then(|root| Registry::locate(root, &self.config));
        if let Some(mut registry) = registry.filter(|_| !envelope.dependencies.is_empty()) {
            let dependencies = self.decode_dependencies(envelope.dependencies)?;
            let mut staged = registry.stage();
            let table = resolve(
                &mut staged,
                &dependencies,
                &self.hasher,
                &self.config.resource_field,
            )
            .await;
            graph::rewrite(&mut payload, &table, &self.config.reference_field);

            materialized.remapped = table.len();
            materialized.added = registry.commit(staged);
        }

        materialized.payload = payload;
        Ok(materialized)
    }

    fn decode_dependencies(&self, wire: Vec<serde_json::Value>) -> Result<Vec<Entity>, ClipboardError> {
        wire.into_iter()
            .map(|item| {
                let value = codec::decode(item).map_err(|e| ClipboardError::Decode(e.to_string()))?;
                Entity::from_value(value, &self.config.id_field).ok_or_else(|| {
                    ClipboardError::Decode(format!(
                        "dependency without a string '{}'",
                        self.config.id_field
                    ))
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::RecordingNotifier;
    use crate::storage::MemoryStorage;
    use crate::test_support::{block_on, FakeHasher};
    use crate::value::Blob;
    use serde_json::json;

    fn clipboard(hasher: FakeHasher) -> (Clipboard<MemoryStorage, FakeHasher>, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::new());
        let clipboard = Clipboard::with_hasher(
            Arc::new(MemoryStorage::new()),
            hasher,
            ClipboardConfig::default(),
        )
        .with_notifier(notifier.clone());
        (clipboard, notifier)
    }

    fn record(json: serde_json::Value) -> Record {
        match Value::from(json) {
            Value::Record(r) => r,
            other => panic!("Expected record, got {:?}", other),
        }
    }

    #[test]
    fn test_copy_then_paste_merges_fields() {
        let (clipboard, notifier) = clipboard(FakeHasher::default());
        let data = Value::from(json!({ "id": "s1", "texture": "tex://a" }));

        block_on(clipboard.copy("sprite", &data, None)).unwrap();
        assert_eq!(notifier.last(), Some(Notice::Copied));

        let mut target = record(json!({ "keep": true, "id": "old" }));
        let report =
            block_on(clipboard.paste("sprite", &mut target, None, &PasteOptions::default())).unwrap();

        assert_eq!(report, PasteReport { merged: 2, added: 0, remapped: 0 });
        assert_eq!(Value::Record(target), Value::from(json!({ "keep": true, "id": "s1", "texture": "tex://a" })));
        assert_eq!(notifier.last(), Some(Notice::Pasted { merged: 2, added: 0 }));
    }

    #[test]
    fn test_copy_failure_keeps_previous_envelope() {
        let (clipboard, notifier) = clipboard(FakeHasher::default());
        block_on(clipboard.copy("first", &Value::from(json!({ "a": 1 })), None)).unwrap();

        let broken = Value::from(vec![Value::Binary(Blob::from_file(
            "gone.png",
            "image/png",
            "/no/such/file.png",
        ))]);
        let result = block_on(clipboard.copy("second", &broken, None));

        assert!(matches!(result, Err(ClipboardError::Encode(_))));
        assert!(matches!(notifier.last(), Some(Notice::CopyFailed(_))));
        assert_eq!(block_on(clipboard.current_type()).unwrap().as_deref(), Some("first"));
    }

    #[test]
    fn test_copy_collects_dependencies_from_root() {
        let (clipboard, _) = clipboard(FakeHasher::default());
        let root = Value::from(json!({
            "data": { "sprites": [
                { "id": "s1", "texture": "tex://a" },
                { "id": "s2", "texture": "tex://b" },
            ] }
        }));
        let data = Value::from(json!({ "groups": [ { "spriteId": "s2" } ] }));

        block_on(clipboard.copy("groups", &data, Some(&root))).unwrap();

        let envelope = block_on(clipboard.store().load()).unwrap().unwrap();
        assert_eq!(envelope.type_tag, "groups");
        assert_eq!(envelope.dependencies, vec![json!({ "id": "s2", "texture": "tex://b" })]);
    }

    #[test]
    fn test_paste_empty_clipboard() {
        let (clipboard, notifier) = clipboard(FakeHasher::default());
        let mut target = record(json!({ "a": 1 }));

        let result = block_on(clipboard.paste("sprite", &mut target, None, &PasteOptions::default()));

        assert!(matches!(result, Err(ClipboardError::Empty)));
        assert_eq!(notifier.last(), Some(Notice::ClipboardEmpty));
        assert_eq!(target, record(json!({ "a": 1 })));
    }

    #[test]
    fn test_paste_type_mismatch_mutates_nothing() {
        let (clipboard, notifier) = clipboard(FakeHasher::new(&[("tex://b", "h2")]));
        let source = Value::from(json!({ "data": { "sprites": [ { "id": "s2", "texture": "tex://b" } ] } }));
        block_on(clipboard.copy("effects", &Value::from(json!({ "spriteId": "s2" })), Some(&source)))
            .unwrap();

        let mut root = Value::from(json!({ "data": { "sprites": [] } }));
        let mut target = Record::new();
        let result = block_on(clipboard.paste(
            "skins",
            &mut target,
            Some(&mut root),
            &PasteOptions::default(),
        ));

        assert!(matches!(result, Err(ClipboardError::TypeMismatch { .. })));
        assert!(target.is_empty());
        assert_eq!(root, Value::from(json!({ "data": { "sprites": [] } })));
        assert_eq!(
            notifier.last(),
            Some(Notice::TypeMismatch { clipboard: "effects".into(), requested: "skins".into() })
        );
    }

    #[test]
    fn test_paste_exclude() {
        let (clipboard, _) = clipboard(FakeHasher::default());
        block_on(clipboard.copy("skin", &Value::from(json!({ "name": "x", "foo": 1 })), None)).unwrap();

        let mut target = record(json!({ "foo": 0 }));
        let report = block_on(clipboard.paste(
            "skin",
            &mut target,
            None,
            &PasteOptions::exclude(["foo"]),
        ))
        .unwrap();

        assert_eq!(report.merged, 1);
        assert_eq!(target, record(json!({ "foo": 0, "name": "x" })));
    }

    #[test]
    fn test_paste_nothing_new() {
        let (clipboard, notifier) = clipboard(FakeHasher::default());
        block_on(clipboard.copy("skin", &Value::from(json!({ "foo": 1 })), None)).unwrap();

        let mut target = Record::new();
        block_on(clipboard.paste("skin", &mut target, None, &PasteOptions::exclude(["foo"]))).unwrap();

        assert_eq!(notifier.last(), Some(Notice::NothingPasted));
    }

    #[test]
    fn test_paste_non_record_payload_fails() {
        let (clipboard, notifier) = clipboard(FakeHasher::default());
        block_on(clipboard.copy("list", &Value::from(json!([1, 2])), None)).unwrap();

        let mut target = Record::new();
        let result = block_on(clipboard.paste("list", &mut target, None, &PasteOptions::default()));

        assert!(matches!(result, Err(ClipboardError::PayloadNotRecord)));
        assert!(matches!(notifier.last(), Some(Notice::PasteFailed(_))));
        assert_eq!(block_on(clipboard.read("list", None)).unwrap(), Some(Value::from(json!([1, 2]))));
    }

    #[test]
    fn test_malformed_envelope_is_decode_failure() {
        let (clipboard, notifier) = clipboard(FakeHasher::default());
        block_on(clipboard.store().storage().set("assetclip_clipboard", "{ nope")).unwrap();

        let mut target = Record::new();
        let result = block_on(clipboard.paste("x", &mut target, None, &PasteOptions::default()));

        assert!(matches!(result, Err(ClipboardError::Decode(_))));
        assert!(matches!(notifier.last(), Some(Notice::PasteFailed(_))));
        assert!(block_on(clipboard.read("x", None)).is_err());
    }

    #[test]
    fn test_bad_dependency_leaves_registry_untouched() {
        let (clipboard, _) = clipboard(FakeHasher::default());
        let envelope = json!({
            "type": "groups",
            "data": { "spriteId": "s9" },
            "dependencies": [ { "id": "s9" }, { "noId": true } ],
        });
        block_on(clipboard.store().storage().set("assetclip_clipboard", &envelope.to_string()))
            .unwrap();

        let mut root = Value::from(json!({ "data": { "sprites": [] } }));
        let result = block_on(clipboard.read("groups", Some(&mut root)));

        assert!(matches!(result, Err(ClipboardError::Decode(_))));
        assert_eq!(root, Value::from(json!({ "data": { "sprites": [] } })));
    }

    #[test]
    fn test_bad_dependency_ignored_without_registry() {
        let (clipboard, notifier) = clipboard(FakeHasher::default());
        let envelope = json!({
            "type": "groups",
            "data": { "spriteId": "s9" },
            "dependencies": [ { "noId": true } ],
        });
        block_on(clipboard.store().storage().set("assetclip_clipboard", &envelope.to_string()))
            .unwrap();

        let mut target = Record::new();
        let report =
            block_on(clipboard.paste("groups", &mut target, None, &PasteOptions::default())).unwrap();
        assert_eq!(report.merged, 1);
        assert_eq!(notifier.last(), Some(Notice::Pasted { merged: 1, added: 0 }));

        let mut elsewhere = Value::from(json!({ "assets": [] }));
        let read = block_on(clipboard.read("groups", Some(&mut elsewhere))).unwrap();
        assert_eq!(read, Some(Value::from(json!({ "spriteId": "s9" }))));
    }

    #[test]
    fn test_read_empty_and_mismatch_are_none() {
        let (clipboard, _) = clipboard(FakeHasher::default());
        assert_eq!(block_on(clipboard.read("skin", None)).unwrap(), None);

        block_on(clipboard.copy("skin", &Value::from(json!({})), None)).unwrap();
        assert_eq!(block_on(clipboard.read("effect", None)).unwrap(), None);
        assert!(block_on(clipboard.read("skin", None)).unwrap().is_some());
    }

    #[test]
    fn test_clear() {
        let (clipboard, _) = clipboard(FakeHasher::default());
        block_on(clipboard.copy("skin", &Value::from(json!({})), None)).unwrap();
        block_on(clipboard.clear()).unwrap();
        assert_eq!(block_on(clipboard.current_type()).unwrap(), None);
    }
}
