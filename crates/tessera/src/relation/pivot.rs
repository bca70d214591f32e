use super::{key_set, referenced, Batch};
use crate::{engine::Normalized, Instance, Related, Result};
use tessera_core::{
    record::{Keys, Record, INDEX_ID},
    Schema,
};

use indexmap::IndexMap;
use serde_json::Value;

/// How a many-to-many relation is laid out over its pivot entity.
pub(super) struct Layout<'r> {
    pub(super) pivot: &'r str,
    pub(super) accessor: &'r str,
    pub(super) related: &'r str,

    /// Owner field(s) the pivot points at
    pub(super) parent_key: &'r Keys,

    /// Related field(s) the pivot points at
    pub(super) related_key: &'r Keys,

    /// Pivot field holding the owner's key
    pub(super) foreign: &'r str,

    /// Pivot field holding the related key
    pub(super) other: &'r str,

    /// Pivot type field and the value it must hold
    pub(super) ty: Option<(&'r str, &'r str)>,
}

/// Pivot data nested under `accessor` on a related record, if any.
pub(super) fn payload(
    schema: &Schema,
    data: &Normalized,
    related: &str,
    accessor: &str,
    reference: &Value,
) -> Record {
    referenced(schema, data, related, reference)
        .and_then(|record| record.get(accessor))
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

/// Insert or merge a pivot record under `key`.
pub(super) fn upsert(
    schema: &Schema,
    data: &mut Normalized,
    entity: &str,
    key: String,
    fields: Record,
) {
    let Some(model) = schema.get(entity) else {
        return;
    };

    let record = data
        .entry(schema.storage_entity(model).to_string())
        .or_default()
        .entry(key.clone())
        .or_default();

    record.extend(fields);
    record.insert(INDEX_ID.to_string(), Value::String(key));
}

/// Load related instances through pivot records, exposing each pivot on its
/// related instance under the layout's accessor.
///
/// Results follow pivot order unless the related sub-query is ordered, in
/// which case they follow the related ordering.
pub(super) fn load(
    batch: &Batch<'_, '_>,
    layout: &Layout<'_>,
    parents: &mut [&mut Instance],
) -> Result<()> {
    let foreign = Keys::from(layout.foreign);
    let other = Keys::from(layout.other);

    let mut pivots = batch
        .plain(layout.pivot)?
        .where_keys(foreign.clone(), key_set(parents, layout.parent_key));
    if let Some((field, value)) = layout.ty {
        pivots = pivots.where_eq(field, value);
    }
    let pivots = pivots.get()?;

    let related_keys = pivots
        .iter()
        .filter_map(|pivot| pivot.key_index(&other))
        .collect();
    let query = batch
        .related(layout.related)?
        .where_keys(layout.related_key.clone(), related_keys);
    let related = query.get()?;

    let mut groups: IndexMap<String, Vec<Instance>> = IndexMap::new();
    let mut push = |pivot: &Instance, item: &Instance| {
        let Some(parent) = pivot.key_index(&foreign) else {
            return;
        };
        let mut item = item.clone();
        item.set_related(layout.accessor, Related::One(Some(Box::new(pivot.clone()))));
        groups.entry(parent).or_default().push(item);
    };

    if query.has_orders() {
        let mut by_related: IndexMap<String, Vec<&Instance>> = IndexMap::new();
        for pivot in &pivots {
            if let Some(key) = pivot.key_index(&other) {
                by_related.entry(key).or_default().push(pivot);
            }
        }

        for item in &related {
            let Some(key) = item.key_index(layout.related_key) else {
                continue;
            };
            for pivot in by_related.get(&key).into_iter().flatten() {
                push(*pivot, item);
            }
        }
    } else {
        let by_key: IndexMap<String, &Instance> = related
            .iter()
            .filter_map(|item| item.key_index(layout.related_key).map(|key| (key, item)))
            .collect();

        for pivot in &pivots {
            if let Some(item) = pivot.key_index(&other).and_then(|key| by_key.get(&key).copied()) {
                push(pivot, item);
            }
        }
    }

    for parent in parents.iter_mut() {
        let related = parent
            .key_index(layout.parent_key)
            .and_then(|key| groups.get(&key).cloned())
            .unwrap_or_default();
        batch.set_many(parent, related);
    }

    Ok(())
}
