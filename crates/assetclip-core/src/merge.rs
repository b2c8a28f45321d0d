//! Helpers for hosts merging pasted collections with custom logic.

use crate::hash::ContentHasher;
use crate::registry::{Entity, Registry};
use crate::resolve::content_hash;
use std::collections::HashSet;
use uuid::Uuid;

/// Append copies of `items` to `registry`, skipping content duplicates.
///
/// An item is skipped when its resource hash matches an entity already in
/// the registry or one appended earlier in this call. Items without a hash
/// are always appended. Each appended copy gets a fresh id.
pub async fn append_deduplicated<H>(
    registry: &mut Registry<'_>,
    items: &[Entity],
    hasher: &H,
    resource_field: &str,
    id_field: &str,
) -> usize
where
    H: ContentHasher + ?Sized,
{
    let mut seen = HashSet::new();
    for existing in registry.entities() {
        let hash = content_hash(&existing, hasher, resource_field).await;
        if !hash.is_empty() {
            seen.insert(hash);
        }
    }

    let mut added = 0;
    for item in items {
        let hash = content_hash(item, hasher, resource_field).await;
        if !hash.is_empty() && !seen.insert(hash) {
            log::debug!("Skipping duplicate '{}'", item.id());
            continue;
        }

        let mut copy = item.clone();
        copy.set_id(Uuid::new_v4().to_string(), id_field);
        registry.push(copy);
        added += 1;
    }
    added
}

/// A name not in `existing`: `name`, then `Copy of name`, then
/// `Copy (1) of name`, `Copy (2) of name`, ...
pub fn unique_copy_name<S: AsRef<str>>(existing: &[S], name: &str) -> String {
    let taken = |candidate: &str| existing.iter().any(|n| n.as_ref() == candidate);
    if !taken(name) {
        return name.to_string();
    }

    let mut candidate = format!("Copy of {}", name);
    let mut i = 1;
    while taken(&candidate) {
        candidate = format!("Copy ({}) of {}", i, name);
        i += 1;
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClipboardConfig;
    use crate::test_support::{block_on, FakeHasher};
    use crate::value::Value;
    use serde_json::json;

    fn sprite(id: &str, texture: &str) -> Entity {
        Entity::from_value(Value::from(json!({ "id": id, "texture": texture })), "id").unwrap()
    }

    #[test]
    fn test_append_skips_duplicates_and_assigns_ids() {
        let config = ClipboardConfig::default();
        let hasher = FakeHasher::new(&[("tex://a", "h1"), ("tex://b", "h2")]);
        let mut doc = Value::from(json!({ "data": { "sprites": [ { "id": "s1", "texture": "tex://a" } ] } }));
        let mut registry = Registry::locate(&mut doc, &config).unwrap();

        let items = [
            sprite("x1", "tex://a"),
            sprite("x2", "tex://b"),
            sprite("x3", "tex://b"),
            sprite("x4", "tex://unknown"),
        ];
        let added = block_on(append_deduplicated(&mut registry, &items, &hasher, "texture", "id"));

        assert_eq!(added, 2);
        let entities = registry.entities();
        assert_eq!(entities.len(), 3);
        assert_eq!(entities[1].field("texture").and_then(Value::as_str), Some("tex://b"));
        assert_ne!(entities[1].id(), "x2");
        assert_eq!(entities[2].field("texture").and_then(Value::as_str), Some("tex://unknown"));
    }

    #[test]
    fn test_unique_copy_name() {
        assert_eq!(unique_copy_name::<&str>(&[], "Fire"), "Fire");
        assert_eq!(unique_copy_name(&["Fire"], "Fire"), "Copy of Fire");
        assert_eq!(unique_copy_name(&["Fire", "Copy of Fire"], "Fire"), "Copy (1) of Fire");
        assert_eq!(
            unique_copy_name(&["Fire", "Copy of Fire", "Copy (1) of Fire"], "Fire"),
            "Copy (2) of Fire"
        );
    }
}
