use super::{
    pivot::{self, Layout},
    resolve_key, Batch, Owner,
};
use crate::{engine::Normalized, Instance, Result};
use tessera_core::{
    record::index_key,
    schema::relation::{MorphToMany, MorphedByMany},
    Schema,
};

use serde_json::Value;

/// Pivot records for a polymorphic many-to-many seen from the owner.
///
/// Both sides of the relation key an edge as `[owner key, related key,
/// owner entity]`, so inserting from either side never duplicates a pivot.
pub(super) fn create_pivots(
    schema: &Schema,
    rel: &MorphToMany,
    owner: &Owner<'_>,
    references: &[Value],
    data: &mut Normalized,
) {
    let Some(parent) = rel.parent_key.read(owner.record) else {
        return;
    };
    let ty = owner.model.entity.as_str();

    for reference in references {
        let Some(related) = resolve_key(schema, data, &rel.related, &rel.related_key, reference)
        else {
            continue;
        };

        let key = edge_key(&parent, &related, ty);

        let mut fields = pivot::payload(schema, data, &rel.related, &rel.accessor, reference);
        fields.insert(rel.id.clone(), parent.clone());
        fields.insert(rel.related_id.clone(), related);
        fields.insert(rel.ty.clone(), Value::from(ty));

        pivot::upsert(schema, data, &rel.pivot, key, fields);
    }
}

/// Pivot records for a polymorphic many-to-many seen from the shared side.
pub(super) fn create_inverse_pivots(
    schema: &Schema,
    rel: &MorphedByMany,
    owner: &Owner<'_>,
    references: &[Value],
    data: &mut Normalized,
) {
    let Some(parent) = rel.parent_key.read(owner.record) else {
        return;
    };

    for reference in references {
        let Some(related) = resolve_key(schema, data, &rel.related, &rel.related_key, reference)
        else {
            continue;
        };

        let key = edge_key(&related, &parent, &rel.related);

        let mut fields = pivot::payload(schema, data, &rel.related, &rel.accessor, reference);
        fields.insert(rel.related_id.clone(), parent.clone());
        fields.insert(rel.id.clone(), related);
        fields.insert(rel.ty.clone(), Value::from(rel.related.as_str()));

        pivot::upsert(schema, data, &rel.pivot, key, fields);
    }
}

pub(super) fn load(
    batch: &Batch<'_, '_>,
    rel: &MorphToMany,
    parents: &mut [&mut Instance],
) -> Result<()> {
    let layout = Layout {
        pivot: &rel.pivot,
        accessor: &rel.accessor,
        related: &rel.related,
        parent_key: &rel.parent_key,
        related_key: &rel.related_key,
        foreign: &rel.id,
        other: &rel.related_id,
        ty: Some((rel.ty.as_str(), batch.owner.entity.as_str())),
    };

    pivot::load(batch, &layout, parents)
}

pub(super) fn load_inverse(
    batch: &Batch<'_, '_>,
    rel: &MorphedByMany,
    parents: &mut [&mut Instance],
) -> Result<()> {
    let layout = Layout {
        pivot: &rel.pivot,
        accessor: &rel.accessor,
        related: &rel.related,
        parent_key: &rel.parent_key,
        related_key: &rel.related_key,
        foreign: &rel.related_id,
        other: &rel.id,
        ty: Some((rel.ty.as_str(), rel.related.as_str())),
    };

    pivot::load(batch, &layout, parents)
}

fn edge_key(owner: &Value, related: &Value, ty: &str) -> String {
    index_key(&Value::Array(vec![
        owner.clone(),
        related.clone(),
        Value::from(ty),
    ]))
}
