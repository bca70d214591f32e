use super::{fill_key, key_set, referenced_mut, Batch, Owner};
use crate::{engine::Normalized, Instance, Result};
use tessera_core::{schema::relation::HasOne, Schema};

use indexmap::IndexMap;
use serde_json::Value;

pub(super) fn attach(
    schema: &Schema,
    rel: &HasOne,
    owner: &Owner<'_>,
    reference: &Value,
    data: &mut Normalized,
) {
    let Some(value) = rel.local_key.read(owner.record) else {
        return;
    };

    if let Some(related) = referenced_mut(schema, data, &rel.related, reference) {
        fill_key(related, &rel.foreign_key, value);
    }
}

pub(super) fn load(
    batch: &Batch<'_, '_>,
    rel: &HasOne,
    parents: &mut [&mut Instance],
) -> Result<()> {
    let keys = key_set(parents, &rel.local_key);
    let related = batch
        .related(&rel.related)?
        .where_keys(rel.foreign_key.clone(), keys)
        .get()?;

    let mut by_key: IndexMap<String, Instance> = IndexMap::new();
    for item in related {
        if let Some(key) = item.key_index(&rel.foreign_key) {
            by_key.entry(key).or_insert(item);
        }
    }

    for parent in parents.iter_mut() {
        let related = parent
            .key_index(&rel.local_key)
            .and_then(|key| by_key.get(&key).cloned());
        batch.set_one(parent, related);
    }

    Ok(())
}
