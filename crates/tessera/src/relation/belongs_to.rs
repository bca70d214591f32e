use super::{key_set, resolve_key, Batch, Owner};
use crate::{engine::Normalized, Instance, Result};
use tessera_core::{schema::relation::BelongsTo, Schema};

use indexmap::IndexMap;
use serde_json::Value;

/// Set the owner's foreign key from the nested parent, or from an inline
/// key, unless the owner already carries one.
pub(super) fn attach(
    schema: &Schema,
    rel: &BelongsTo,
    owner: &Owner<'_>,
    reference: &Value,
    data: &mut Normalized,
) {
    if !rel.foreign_key.is_absent(owner.record) {
        return;
    }

    let Some(value) = resolve_key(schema, data, &rel.parent, &rel.owner_key, reference) else {
        return;
    };

    if let Some(record) = data
        .get_mut(owner.entity)
        .and_then(|records| records.get_mut(owner.id))
    {
        rel.foreign_key.write(record, value);
    }
}

pub(super) fn load(
    batch: &Batch<'_, '_>,
    rel: &BelongsTo,
    parents: &mut [&mut Instance],
) -> Result<()> {
    let keys = key_set(parents, &rel.foreign_key);
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

    for parent in parents.iter_mut() {
        let related = parent
            .key_index(&rel.foreign_key)
            .and_then(|key| by_key.get(&key).cloned());
        batch.set_one(parent, related);
    }

    Ok(())
}
