//! Reference graph traversal.
//!
//! Both passes walk depth-first: sequences element by element, records field
//! by field in insertion order. A composite node's own reference is handled
//! before its children. Each composite node is visited at most once, keyed by
//! its address for the duration of the pass.

use crate::registry::Entity;
use crate::resolve::RemapTable;
use crate::value::Value;
use indexmap::IndexMap;
use std::collections::HashSet;

type Visited = HashSet<*const Value>;

/// Collect the candidates referenced anywhere under `node`.
///
/// Results are unique by id, in order of first appearance.
pub fn walk(node: &Value, candidates: &[Entity], reference_field: &str) -> Vec<Entity> {
    let mut found: IndexMap<String, Entity> = IndexMap::new();
    let mut visited = Visited::new();
    collect(node, candidates, reference_field, &mut visited, &mut found);
    found.into_values().collect()
}

fn collect(
    node: &Value,
    candidates: &[Entity],
    reference_field: &str,
    visited: &mut Visited,
    found: &mut IndexMap<String, Entity>,
) {
    if !node.is_composite() || !visited.insert(node as *const Value) {
        return;
    }

    match node {
        Value::Record(record) => {
            if let Some(Value::String(id)) = record.get(reference_field) {
                if !found.contains_key(id) {
                    if let Some(entity) = candidates.iter().find(|e| e.id() == id.as_str()) {
                        log::debug!("Found dependency '{}'", id);
                        found.insert(id.clone(), entity.clone());
                    }
                }
            }
            for field in record.values() {
                collect(field, candidates, reference_field, visited, found);
            }
        }
        Value::Sequence(items) => {
            for item in items {
                collect(item, candidates, reference_field, visited, found);
            }
        }
        _ => {}
    }
}

/// Replace every remapped reference under `node` in place.
pub fn rewrite(node: &mut Value, table: &RemapTable, reference_field: &str) {
    if table.is_empty() {
        return;
    }
    let mut visited = Visited::new();
    remap(node, table, reference_field, &mut visited);
}

fn remap(node: &mut Value, table: &RemapTable, reference_field: &str, visited: &mut Visited) {
    if !node.is_composite() || !visited.insert(&*node as *const Value) {
        return;
    }

    match node {
        Value::Record(record) => {
            if let Some(Value::String(id)) = record.get_mut(reference_field) {
                if let Some(target) = table.get(id) {
                    log::debug!("Rewriting reference '{}' -> '{}'", id, target);
                    *id = target.to_string();
                }
            }
            for field in record.values_mut() {
                remap(field, table, reference_field, visited);
            }
        }
        Value::Sequence(items) => {
            for item in items.iter_mut() {
                remap(item, table, reference_field, visited);
            }
        }
        _ => {}
    }
}
