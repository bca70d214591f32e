//! Per-kind relation behaviour: wiring foreign keys after normalization,
//! creating pivot records, and loading related instances for a batch.

mod belongs_to;
mod belongs_to_many;
mod has_many;
mod has_many_by;
mod has_many_through;
mod has_one;
mod morph_many;
mod morph_to;
mod morph_to_many;
mod pivot;

use crate::{
    engine::Normalized,
    query::{Constraint, Cx, Query},
    Instance, Related, Result,
};
use tessera_core::{
    err,
    record::{index_key, Keys, Record},
    schema::{Model, Relation},
    Schema,
};

use indexmap::{IndexMap, IndexSet};
use serde_json::Value;

/// Fill in foreign keys implied by the nesting of a normalized payload.
///
/// Keys already present on a record are never overwritten, so attaching is
/// idempotent.
pub(crate) fn attach_all(schema: &Schema, data: &mut Normalized) {
    for (entity, id) in owners(data) {
        let Some(bucket) = schema.get(&entity) else {
            continue;
        };
        let record = data[&entity][&id].clone();
        let model = schema.model_for_record(bucket, &record);

        for (name, relation) in model.relations() {
            let Some(reference) = record.get(name) else {
                continue;
            };

            let owner = Owner {
                model,
                entity: &entity,
                id: &id,
                record: &record,
            };

            match relation {
                Relation::HasOne(rel) => has_one::attach(schema, rel, &owner, reference, data),
                Relation::BelongsTo(rel) => {
                    belongs_to::attach(schema, rel, &owner, reference, data)
                }
                Relation::HasMany(rel) => has_many::attach(schema, rel, &owner, reference, data),
                Relation::HasManyBy(rel) => {
                    has_many_by::attach(schema, rel, &owner, reference, data)
                }
                Relation::MorphOne(rel) => {
                    morph_many::attach_one(schema, rel, &owner, reference, data)
                }
                Relation::MorphMany(rel) => {
                    morph_many::attach(schema, rel, &owner, reference, data)
                }
                // Keys live on pivot or intermediate records, or are
                // already on the owner
                Relation::HasManyThrough(_)
                | Relation::BelongsToMany(_)
                | Relation::MorphTo(_)
                | Relation::MorphToMany(_)
                | Relation::MorphedByMany(_) => {}
            }
        }
    }
}

/// Create one pivot record per (owner, related) pair of every many-to-many
/// relation in a normalized payload.
pub(crate) fn create_pivots(schema: &Schema, data: &mut Normalized) {
    for (entity, id) in owners(data) {
        let Some(bucket) = schema.get(&entity) else {
            continue;
        };
        let record = data[&entity][&id].clone();
        let model = schema.model_for_record(bucket, &record);

        for (name, relation) in model.relations() {
            let Some(Value::Array(references)) = record.get(name) else {
                continue;
            };

            let owner = Owner {
                model,
                entity: &entity,
                id: &id,
                record: &record,
            };

            match relation {
                Relation::BelongsToMany(rel) => {
                    belongs_to_many::create_pivots(schema, rel, &owner, references, data)
                }
                Relation::MorphToMany(rel) => {
                    morph_to_many::create_pivots(schema, rel, &owner, references, data)
                }
                Relation::MorphedByMany(rel) => {
                    morph_to_many::create_inverse_pivots(schema, rel, &owner, references, data)
                }
                _ => {}
            }
        }
    }
}

/// Load the relation `name` on a batch of instances.
///
/// Instances are grouped by concrete entity, so a relation declared only on
/// a subtype still loads when the batch was queried through the base model.
pub(crate) fn load<'a>(
    cx: Cx<'a>,
    queried: &'a Model,
    items: &mut [Instance],
    name: &str,
    constraints: &[Constraint<'a>],
) -> Result<()> {
    let mut groups: IndexMap<String, Vec<&mut Instance>> = IndexMap::new();
    for item in items.iter_mut() {
        groups.entry(item.entity().to_string()).or_default().push(item);
    }

    let mut found = false;

    for (entity, mut parents) in groups {
        let model = cx.schema.model(&entity)?;
        let Some(relation) = model.relation(name).or_else(|| queried.relation(name)) else {
            continue;
        };
        found = true;

        let batch = Batch {
            cx,
            owner: model,
            name,
            constraints,
        };

        let loaded = match relation {
            Relation::HasOne(rel) => has_one::load(&batch, rel, &mut parents),
            Relation::BelongsTo(rel) => belongs_to::load(&batch, rel, &mut parents),
            Relation::HasMany(rel) => has_many::load(&batch, rel, &mut parents),
            Relation::HasManyBy(rel) => has_many_by::load(&batch, rel, &mut parents),
            Relation::HasManyThrough(rel) => has_many_through::load(&batch, rel, &mut parents),
            Relation::BelongsToMany(rel) => belongs_to_many::load(&batch, rel, &mut parents),
            Relation::MorphTo(rel) => morph_to::load(&batch, rel, &mut parents),
            Relation::MorphOne(rel) => morph_many::load_one(&batch, rel, &mut parents),
            Relation::MorphMany(rel) => morph_many::load(&batch, rel, &mut parents),
            Relation::MorphToMany(rel) => morph_to_many::load(&batch, rel, &mut parents),
            Relation::MorphedByMany(rel) => {
                morph_to_many::load_inverse(&batch, rel, &mut parents)
            }
        };

        loaded.map_err(|err| err.context(err!("failed to load `{}.{name}`", model.entity)))?;
    }

    if !found {
        tracing::warn!(entity = %queried.entity, relation = name, "unknown relation; not loaded");
    }

    Ok(())
}

/// A record of a normalized payload whose relations are being processed.
struct Owner<'r> {
    model: &'r Model,
    entity: &'r str,
    id: &'r str,
    record: &'r Record,
}

/// One relation being loaded for a group of same-entity instances.
struct Batch<'a, 'b> {
    cx: Cx<'a>,
    owner: &'a Model,
    name: &'b str,
    constraints: &'b [Constraint<'a>],
}

impl<'a> Batch<'a, '_> {
    /// A query over `entity` with the caller's constraints applied.
    fn related(&self, entity: &str) -> Result<Query<'a>> {
        let mut query = self.cx.query(entity)?;
        for constraint in self.constraints {
            query = constraint(query);
        }
        Ok(query)
    }

    /// An unconstrained query, for pivot and intermediate records.
    fn plain(&self, entity: &str) -> Result<Query<'a>> {
        self.cx.query(entity)
    }

    fn set_one(&self, parent: &mut Instance, related: Option<Instance>) {
        parent.set_related(self.name, Related::One(related.map(Box::new)));
    }

    fn set_many(&self, parent: &mut Instance, related: Vec<Instance>) {
        parent.set_related(self.name, Related::Many(related));
    }
}

/// Every (entity, index id) pair of a normalized payload, in order.
fn owners(data: &Normalized) -> Vec<(String, String)> {
    data.iter()
        .flat_map(|(entity, records)| {
            records
                .keys()
                .map(move |id| (entity.clone(), id.clone()))
        })
        .collect()
}

/// The index keys formed by `keys` across a batch.
fn key_set(parents: &[&mut Instance], keys: &Keys) -> IndexSet<String> {
    parents
        .iter()
        .filter_map(|parent| parent.key_index(keys))
        .collect()
}

/// Look up a record referenced from a normalized payload. Returns `None`
/// for inline keys, whose record is not part of the payload.
fn referenced<'d>(
    schema: &Schema,
    data: &'d Normalized,
    entity: &str,
    reference: &Value,
) -> Option<&'d Record> {
    if reference.is_null() {
        return None;
    }
    let model = schema.get(entity)?;
    data.get(schema.storage_entity(model))?
        .get(&index_key(reference))
}

/// Mutable variant of [`referenced`].
fn referenced_mut<'d>(
    schema: &Schema,
    data: &'d mut Normalized,
    entity: &str,
    reference: &Value,
) -> Option<&'d mut Record> {
    if reference.is_null() {
        return None;
    }
    let model = schema.get(entity)?;
    data.get_mut(schema.storage_entity(model))?
        .get_mut(&index_key(reference))
}

/// Write `value` into `keys` on `record` unless the key is already set.
fn fill_key(record: &mut Record, keys: &Keys, value: Value) {
    if keys.is_absent(record) {
        keys.write(record, value);
    }
}

/// The key value a reference stands for: `keys` read from the referenced
/// record, or the reference itself when it is an inline key.
fn resolve_key(
    schema: &Schema,
    data: &Normalized,
    entity: &str,
    keys: &Keys,
    reference: &Value,
) -> Option<Value> {
    match referenced(schema, data, entity, reference) {
        Some(record) => keys.read(record),
        None if is_inline(reference) => Some(reference.clone()),
        None => None,
    }
}

fn is_inline(reference: &Value) -> bool {
    !matches!(reference, Value::Null | Value::Object(_))
}
