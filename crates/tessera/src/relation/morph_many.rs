use super::{key_set, referenced_mut, Batch, Owner};
use crate::{engine::Normalized, Instance, Result};
use tessera_core::{
    record::{Keys, Record},
    schema::relation::{MorphMany, MorphOne},
    Schema,
};

use indexmap::IndexMap;
use serde_json::Value;

pub(super) fn attach_one(
    schema: &Schema,
    rel: &MorphOne,
    owner: &Owner<'_>,
    reference: &Value,
    data: &mut Normalized,
) {
    let Some(value) = rel.local_key.read(owner.record) else {
        return;
    };

    if let Some(related) = referenced_mut(schema, data, &rel.related, reference) {
        stamp(related, &rel.id, &rel.ty, value, &owner.model.entity);
    }
}

pub(super) fn attach(
    schema: &Schema,
    rel: &MorphMany,
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
            stamp(related, &rel.id, &rel.ty, value.clone(), &owner.model.entity);
        }
    }
}

/// Point a related record at its polymorphic owner, keeping any fields it
/// already has.
fn stamp(related: &mut Record, id: &str, ty: &str, key: Value, entity: &str) {
    if !related.contains_key(id) {
        related.insert(id.to_string(), key);
    }
    if !related.contains_key(ty) {
        related.insert(ty.to_string(), Value::from(entity));
    }
}

pub(super) fn load_one(
    batch: &Batch<'_, '_>,
    rel: &MorphOne,
    parents: &mut [&mut Instance],
) -> Result<()> {
    let groups = fetch(batch, &rel.related, &rel.id, &rel.ty, &rel.local_key, parents)?;

    for parent in parents.iter_mut() {
        let related = parent
            .key_index(&rel.local_key)
            .and_then(|key| groups.get(&key))
            .and_then(|items| items.first().cloned());
        batch.set_one(parent, related);
    }

    Ok(())
}

pub(super) fn load(
    batch: &Batch<'_, '_>,
    rel: &MorphMany,
    parents: &mut [&mut Instance],
) -> Result<()> {
    let groups = fetch(batch, &rel.related, &rel.id, &rel.ty, &rel.local_key, parents)?;

    for parent in parents.iter_mut() {
        let related = parent
            .key_index(&rel.local_key)
            .and_then(|key| groups.get(&key).cloned())
            .unwrap_or_default();
        batch.set_many(parent, related);
    }

    Ok(())
}

/// Related records owned by the batch, grouped by the owner key they hold.
fn fetch(
    batch: &Batch<'_, '_>,
    related: &str,
    id: &str,
    ty: &str,
    local_key: &Keys,
    parents: &[&mut Instance],
) -> Result<IndexMap<String, Vec<Instance>>> {
    let id = Keys::from(id);
    let items = batch
        .related(related)?
        .where_keys(id.clone(), key_set(parents, local_key))
        .where_eq(ty, batch.owner.entity.as_str())
        .get()?;

    let mut groups: IndexMap<String, Vec<Instance>> = IndexMap::new();
    for item in items {
        if let Some(key) = item.key_index(&id) {
            groups.entry(key).or_default().push(item);
        }
    }
    Ok(groups)
}
