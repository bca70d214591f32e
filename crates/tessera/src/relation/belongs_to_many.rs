use super::{
    pivot::{self, Layout},
    resolve_key, Batch, Owner,
};
use crate::{engine::Normalized, Instance, Result};
use tessera_core::{
    record::index_key,
    schema::relation::BelongsToMany,
    Schema,
};

use serde_json::Value;

/// Create a pivot record for every related reference of the owner.
///
/// The pivot's index id is the JSON array of both keys, parent key first
/// unless the pivot's primary key starts with the related pivot field. Data
/// found under the accessor of a nested related record is copied onto the
/// pivot.
pub(super) fn create_pivots(
    schema: &Schema,
    rel: &BelongsToMany,
    owner: &Owner<'_>,
    references: &[Value],
    data: &mut Normalized,
) {
    let Some(parent) = rel.parent_key.read(owner.record) else {
        return;
    };

    let related_first = schema
        .get(&rel.pivot)
        .and_then(|pivot| pivot.primary_key.fields().first())
        .is_some_and(|field| *field == rel.related_pivot_key);

    for reference in references {
        let Some(related) = resolve_key(schema, data, &rel.related, &rel.related_key, reference)
        else {
            continue;
        };

        let mut fields = pivot::payload(schema, data, &rel.related, &rel.accessor, reference);

        let pair = if related_first {
            vec![related.clone(), parent.clone()]
        } else {
            vec![parent.clone(), related.clone()]
        };
        let key = index_key(&Value::Array(pair));

        fields.insert(rel.foreign_pivot_key.clone(), parent.clone());
        fields.insert(rel.related_pivot_key.clone(), related);

        pivot::upsert(schema, data, &rel.pivot, key, fields);
    }
}

pub(super) fn load(
    batch: &Batch<'_, '_>,
    rel: &BelongsToMany,
    parents: &mut [&mut Instance],
) -> Result<()> {
    let layout = Layout {
        pivot: &rel.pivot,
        accessor: &rel.accessor,
        related: &rel.related,
        parent_key: &rel.parent_key,
        related_key: &rel.related_key,
        foreign: &rel.foreign_pivot_key,
        other: &rel.related_pivot_key,
        ty: None,
    };

    pivot::load(batch, &layout, parents)
}
