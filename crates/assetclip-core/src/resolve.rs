//! Dependency resolution against a destination registry.
//!
//! Each incoming dependency is either already present (same id), adopted as
//! an existing entity with identical content, or inserted as-is.

use crate::hash::ContentHasher;
use crate::registry::{Entity, StagedRegistry};
use indexmap::IndexMap;
use std::collections::HashMap;

/// Mapping from incoming entity ids to the local ids that replace them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemapTable {
    entries: IndexMap<String, String>,
}

impl RemapTable {
    pub fn get(&self, id: &str) -> Option<&str> {
        self.entries.get(id).map(String::as_str)
    }

    pub fn insert(&mut self, from: String, to: String) {
        self.entries.insert(from, to);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Digest of an entity's resource, or empty when none can be had.
///
/// Hashing failures are logged and reported as empty.
pub async fn content_hash<H>(entity: &Entity, hasher: &H, resource_field: &str) -> String
where
    H: ContentHasher + ?Sized,
{
    let Some(resource) = entity.field(resource_field) else {
        return String::new();
    };
    match hasher.digest(resource).await {
        Ok(digest) => digest,
        Err(e) => {
            log::warn!("Could not hash resource of '{}': {}", entity.id(), e);
            String::new()
        }
    }
}

/// Resolve `dependencies` into `registry`, in list order.
///
/// Returns remap entries only for dependencies adopted by content match.
/// Later dependencies can match entities inserted earlier in the same call.
pub async fn resolve<H>(
    registry: &mut StagedRegistry,
    dependencies: &[Entity],
    hasher: &H,
    resource_field: &str,
) -> RemapTable
where
    H: ContentHasher + ?Sized,
{
    let mut table = RemapTable::default();
    let mut memo: HashMap<String, String> = HashMap::new();

    for dependency in dependencies {
        if registry.contains(dependency.id()) {
            log::debug!("Dependency '{}' already present", dependency.id());
            continue;
        }

        let hash = content_hash(dependency, hasher, resource_field).await;
        if hash.is_empty() {
            log::debug!("Dependency '{}' has no content hash, inserting", dependency.id());
            registry.insert(dependency.clone());
            continue;
        }

        let mut adopted = None;
        for existing in registry.iter() {
            let existing_hash = match memo.get(existing.id()) {
                Some(h) => h.clone(),
                None => {
                    let h = content_hash(existing, hasher, resource_field).await;
                    memo.insert(existing.id().to_string(), h.clone());
                    h
                }
            };
            if existing_hash == hash {
                adopted = Some(existing.id().to_string());
                break;
            }
        }

        match adopted {
            Some(target) => {
                log::debug!("Dependency '{}' matches existing '{}'", dependency.id(), target);
                table.insert(dependency.id().to_string(), target);
            }
            None => {
                log::debug!("Inserting dependency '{}'", dependency.id());
                memo.insert(dependency.id().to_string(), hash);
                registry.insert(dependency.clone());
            }
        }
    }

    table
}
