use super::{Graph, NodeId, Slot};
use crate::{relation, Error, Result};
use tessera_core::{
    record::{index_key, Record, Records, INDEX_ID},
    schema::{AttrKind, Model},
    value::kind_name,
    Schema,
};

use indexmap::IndexMap;
use serde_json::{json, Value};

/// Flat records grouped by the entity whose table stores them.
pub type Normalized = IndexMap<String, Records>;

/// Flatten a nested payload rooted at `entity`.
///
/// Every nested object is moved into its entity's bucket, keyed by index id,
/// and replaced in its parent by that id. Records appearing more than once
/// are merged, later fields winning. Foreign keys implied by the nesting are
/// then filled in and pivot records are created for many-to-many relations.
///
/// The payload must be an object or an array of objects. `null`, `{}` and
/// `[]` normalize to nothing.
pub fn normalize(schema: &Schema, entity: &str, payload: &Value) -> Result<Normalized> {
    let model = schema.model(entity)?;

    let items: Vec<&Record> = match payload {
        Value::Null => vec![],
        Value::Object(item) if item.is_empty() => vec![],
        Value::Object(item) => vec![item],
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_object()
                    .ok_or_else(|| Error::invalid_payload(entity, kind_name(item)))
            })
            .collect::<Result<_>>()?,
        other => return Err(Error::invalid_payload(entity, kind_name(other))),
    };

    let mut normalizer = Normalizer {
        schema,
        graph: Graph::new(schema),
        data: Normalized::new(),
        placeholders: 0,
    };

    let root = normalizer.graph.node(model);
    for item in items {
        normalizer.visit(root, item)?;
    }

    let mut data = normalizer.data;
    relation::attach_all(schema, &mut data);
    relation::create_pivots(schema, &mut data);

    tracing::debug!(
        entity,
        entities = data.len(),
        records = data.values().map(Records::len).sum::<usize>(),
        "normalized payload"
    );

    Ok(data)
}

struct Normalizer<'a> {
    schema: &'a Schema,
    graph: Graph<'a>,
    data: Normalized,

    /// Counter for records without a primary key, reset on every call
    placeholders: usize,
}

impl<'a> Normalizer<'a> {
    /// Flatten one object and return the value its parent should hold.
    fn visit(&mut self, node: NodeId, raw: &Record) -> Result<Value> {
        let declared = self.graph.get(node).model;
        let model = self.schema.model_for_record(declared, raw);
        let node = if model.entity == declared.entity {
            node
        } else {
            self.graph.node(model)
        };

        let mut record = raw.clone();
        self.stamp(model, &mut record);

        let id = match model.index_id(&record) {
            Some(id) => id,
            None => {
                let id = format!("_no_key_{}", self.placeholders);
                self.placeholders += 1;
                id
            }
        };

        let slots: Vec<(&'a str, Slot<'a>)> = self
            .graph
            .get(node)
            .slots
            .iter()
            .map(|(name, slot)| (*name, *slot))
            .collect();

        for (name, slot) in slots {
            let Some(value) = raw.get(name) else {
                continue;
            };

            let reference = match slot {
                Slot::One(child) => self.reference(child, value)?,
                Slot::Many(child) => match value {
                    Value::Array(items) => items
                        .iter()
                        .map(|item| self.reference(child, item))
                        .collect::<Result<_>>()?,
                    _ => Value::Array(vec![]),
                },
                Slot::Union { ty } => self.union_reference(&record, ty, value)?,
            };

            record.insert(name.to_string(), reference);
        }

        record.insert(INDEX_ID.to_string(), Value::String(id.clone()));

        let bucket = self
            .data
            .entry(self.schema.storage_entity(model).to_string())
            .or_default();

        match bucket.get_mut(&id) {
            Some(existing) => existing.extend(record),
            None => {
                bucket.insert(id.clone(), record);
            }
        }

        Ok(Value::String(id))
    }

    /// Fill what the record must carry before its id is derived: the
    /// discriminator of a subtype, and generated ids.
    fn stamp(&self, model: &Model, record: &mut Record) {
        if model.is_subtype() && !record.contains_key(&model.type_key) {
            if let Some(discriminator) = self.schema.discriminator_of(model) {
                record.insert(model.type_key.clone(), Value::from(discriminator));
            }
        }

        for (name, attr) in model.attrs() {
            if attr.kind == AttrKind::Uid && record.get(name).map_or(true, Value::is_null) {
                record.insert(name.to_string(), attr.default_value());
            }
        }
    }

    fn reference(&mut self, node: NodeId, value: &Value) -> Result<Value> {
        match value {
            Value::Object(item) => self.visit(node, item),
            // Inline keys stay as they are
            value => Ok(value.clone()),
        }
    }

    fn union_reference(&mut self, owner: &Record, ty: &str, value: &Value) -> Result<Value> {
        let Some(entity) = owner.get(ty).and_then(Value::as_str) else {
            return Ok(Value::Null);
        };

        let Some(model) = self.schema.get(entity) else {
            tracing::warn!(entity, field = ty, "unknown polymorphic type; dropping nested value");
            return Ok(Value::Null);
        };

        let id = match value {
            Value::Object(item) => {
                let node = self.graph.node(model);
                self.visit(node, item)?
            }
            Value::Null => return Ok(Value::Null),
            value => Value::String(index_key(value)),
        };

        Ok(json!({ "id": id, "schema": entity }))
    }
}
