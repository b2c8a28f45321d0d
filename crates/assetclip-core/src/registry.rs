//! Entities and the registries that own them.

use crate::config::ClipboardConfig;
use crate::value::{Record, Value};

/// A uniquely identified asset record.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    id: String,
    record: Record,
}

impl Entity {
    /// Wrap a record value that carries a string id under `id_field`.
    pub fn from_value(value: Value, id_field: &str) -> Option<Self> {
        match value {
            Value::Record(record) => {
                let id = record.get(id_field)?.as_str()?.to_string();
                Some(Self { id, record })
            }
            _ => None,
        }
    }

    /// Entity id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// All fields, including the id.
    pub fn record(&self) -> &Record {
        &self.record
    }

    /// Look up a field.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.record.get(key)
    }

    /// Replace the id, keeping the id field in sync.
    pub fn set_id(&mut self, id: String, id_field: &str) {
        self.record.insert(id_field.to_string(), Value::String(id.clone()));
        self.id = id;
    }

    pub fn into_value(self) -> Value {
        Value::Record(self.record)
    }
}

/// Snapshot the entities a registry root exposes.
///
/// Returns `None` when `root` has no sequence at the configured registry
/// path. Elements without a string id are skipped.
pub fn entities_of(root: &Value, config: &ClipboardConfig) -> Option<Vec<Entity>> {
    let items = root.get_path(&config.registry_path)?.as_sequence()?;
    Some(collect_entities(items, config))
}

fn collect_entities(items: &[Value], config: &ClipboardConfig) -> Vec<Entity> {
    items
        .iter()
        .filter_map(|item| {
            let entity = Entity::from_value(item.clone(), &config.id_field);
            if entity.is_none() {
                log::warn!("Skipping registry entry without a string '{}'", config.id_field);
            }
            entity
        })
        .collect()
}

/// A destination document's live entity collection.
pub struct Registry<'a> {
    items: &'a mut Vec<Value>,
    config: &'a ClipboardConfig,
}

impl<'a> Registry<'a> {
    /// Find the registry inside `root`, if it exposes one.
    pub fn locate(root: &'a mut Value, config: &'a ClipboardConfig) -> Option<Self> {
        let items = root.get_path_mut(&config.registry_path)?.as_sequence_mut()?;
        Some(Self { items, config })
    }

    /// Entities in registry order.
    pub fn entities(&self) -> Vec<Entity> {
        collect_entities(self.items.as_slice(), self.config)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether an entity with this id exists.
    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|item| self.config.id_of(item) == Some(id))
    }

    /// Append an entity.
    pub fn push(&mut self, entity: Entity) {
        self.items.push(entity.into_value());
    }

    /// Start a staged mutation over the current contents.
    pub fn stage(&self) -> StagedRegistry {
        StagedRegistry::new(self.entities())
    }

    /// Append every entity staged since [`Registry::stage`].
    pub fn commit(&mut self, staged: StagedRegistry) -> usize {
        let added = staged.pending.len();
        for entity in staged.pending {
            log::info!("Auto-added missing entity: {}", entity.id);
            self.push(entity);
        }
        added
    }
}

/// A registry view that buffers inserts until committed.
///
/// Lookups see existing entities followed by pending inserts, in insertion
/// order.
#[derive(Debug, Clone, Default)]
pub struct StagedRegistry {
    existing: Vec<Entity>,
    pending: Vec<Entity>,
}

impl StagedRegistry {
    pub fn new(existing: Vec<Entity>) -> Self {
        Self {
            existing,
            pending: Vec::new(),
        }
    }

    /// Entities in enumeration order, pending inserts last.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.existing.iter().chain(self.pending.iter())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.iter().any(|e| e.id == id)
    }

    /// Stage an insert.
    pub fn insert(&mut self, entity: Entity) {
        self.pending.push(entity);
    }

    /// Entities staged so far.
    pub fn pending(&self) -> &[Entity] {
        &self.pending
    }
}
