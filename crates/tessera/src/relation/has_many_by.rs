use super::{resolve_key, Batch, Owner};
use crate::{engine::Normalized, Instance, Result};
use tessera_core::{record::index_key, schema::relation::HasManyBy, Schema};

use indexmap::{IndexMap, IndexSet};
use serde_json::Value;

/// Collect the nested parents' keys into the owner's array field, unless
/// the owner already carries it.
pub(super) fn attach(
    schema: &Schema,
    rel: &HasManyBy,
    owner: &Owner<'_>,
    reference: &Value,
    data: &mut Normalized,
) {
    if owner.record.contains_key(&rel.foreign_key) {
        return;
    }
    let Value::Array(references) = reference else {
        return;
    };

    let keys: Vec<Value> = references
        .iter()
        .filter_map(|reference| resolve_key(schema, data, &rel.parent, &rel.owner_key, reference))
        .collect();

    if let Some(record) = data
        .get_mut(owner.entity)
        .and_then(|records| records.get_mut(owner.id))
    {
        record.insert(rel.foreign_key.clone(), Value::Array(keys));
    }
}

pub(super) fn load(
    batch: &Batch<'_, '_>,
    rel: &HasManyBy,
    parents: &mut [&mut Instance],
) -> Result<()> {
    let per_parent: Vec<Vec<String>> = parents
        .iter()
        .map(|parent| match parent.get(&rel.foreign_key) {
            Some(Value::Array(keys)) => keys.iter().map(index_key).collect(),
            _ => vec![],
        })
        .collect();

    let keys: IndexSet<String> = per_parent.iter().flatten().cloned().collect();
    let related = batch
        .related(&rel.parent)?
        .where_keys(rel.owner_key.clone(), keys)
        .get()?;

    let mut by_key: IndexMap<String, Instance> = IndexMap::new();
    for item in related {
        if let Some(key) = item.key_index(&rel.owner_key) {
            by_key.entry(key).or_insert(item);
        }
    }

    // Keep the order of the owner's key array
    for (parent, keys) in parents.iter_mut().zip(per_parent) {
        let related = keys
            .iter()
            .filter_map(|key| by_key.get(key).cloned())
            .collect();
        batch.set_many(parent, related);
    }

    Ok(())
}
