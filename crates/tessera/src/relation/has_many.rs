use super::{fill_key, key_set, referenced_mut, Batch, Owner};
use crate::{engine::Normalized, Instance, Result};
use tessera_core::{schema::relation::HasMany, Schema};

use indexmap::IndexMap;
use serde_json::Value;

pub(super) fn attach(
    schema: &Schema,
    rel: &HasMany,
    owner: &Owner<'_>,
    reference: &Value,
    data: &mut Normalized,
) {
    let Value::Array(references) = reference else {
        return;
    };
    let Some(value) = rel.local_key.read(owner.record) else {
        return;
    };

    for reference in references {
        if let Some(related) = referenced_mut(schema, data, &rel.related, reference) {
            fill_key(related, &rel.foreign_key, value.clone());
        }
    }
}

pub(super) fn load(
    batch: &Batch<'_, '_>,
    rel: &HasMany,
    parents: &mut [&mut Instance],
) -> Result<()> {
    let keys = key_set(parents, &rel.local_key);
    let related = batch
        .related(&rel.related)?
        .where_keys(rel.foreign_key.clone(), keys)
        .get()?;

    let mut groups: IndexMap<String, Vec<Instance>> = IndexMap::new();
    for item in related {
        if let Some(key) = item.key_index(&rel.foreign_key) {
            groups.entry(key).or_default().push(item);
        }
    }

    for parent in parents.iter_mut() {
        let related = parent
            .key_index(&rel.local_key)
            .and_then(|key| groups.get(&key).cloned())
            .unwrap_or_default();
        batch.set_many(parent, related);
    }

    Ok(())
}
