use crate::Result;
use tessera_core::{
    record::{Keys, Record, INDEX_ID},
    schema::{Model, Relation},
    Schema,
};

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Records touched by a mutation, grouped by the entity they were stored in.
pub type Collections = IndexMap<String, Vec<Instance>>;

/// A hydrated record: coerced attributes plus whatever relations were loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    entity: String,
    id: Option<String>,
    attributes: Record,
    relations: IndexMap<String, Related>,
}

/// A loaded relation value.
#[derive(Debug, Clone, PartialEq)]
pub enum Related {
    One(Option<Box<Instance>>),
    Many(Vec<Instance>),
}

impl Instance {
    /// Build an instance of `model` from a stored record. Every declared
    /// attribute is coerced; relations start out unloaded.
    pub(crate) fn hydrate(model: &Model, record: &Record) -> Instance {
        let attributes: Record = model
            .attrs()
            .map(|(name, attr)| (name.to_string(), attr.fill(record.get(name))))
            .collect();

        let id = match record.get(INDEX_ID) {
            Some(Value::String(id)) => Some(id.clone()),
            _ => model.index_id(&attributes),
        };

        Instance {
            entity: model.entity.clone(),
            id,
            attributes,
            relations: IndexMap::new(),
        }
    }

    /// Build an instance from a nested payload. The concrete model is picked
    /// by discriminator and nested relation values are made recursively.
    pub(crate) fn make(schema: &Schema, model: &Model, raw: &Record) -> Result<Instance> {
        let model = schema.model_for_record(model, raw);
        let mut instance = Instance::hydrate(model, raw);

        for (name, relation) in model.relations() {
            let related = make_related(schema, model, relation, raw, raw.get(name))?;
            instance.relations.insert(name.to_string(), related);
        }

        Ok(instance)
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// The index id under which the record is stored.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Read a coerced attribute.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.attributes.get(field)
    }

    pub fn attributes(&self) -> &Record {
        &self.attributes
    }

    pub fn related(&self, name: &str) -> Option<&Related> {
        self.relations.get(name)
    }

    /// A loaded singular relation, if it resolved to an instance.
    pub fn one(&self, name: &str) -> Option<&Instance> {
        match self.relations.get(name)? {
            Related::One(instance) => instance.as_deref(),
            Related::Many(_) => None,
        }
    }

    /// A loaded plural relation. Unloaded relations read as empty.
    pub fn many(&self, name: &str) -> &[Instance] {
        match self.relations.get(name) {
            Some(Related::Many(instances)) => instances,
            _ => &[],
        }
    }

    /// The pivot record attached under the default accessor.
    pub fn pivot(&self) -> Option<&Instance> {
        self.one(tessera_core::schema::relation::DEFAULT_ACCESSOR)
    }

    /// Attributes plus `$id`, as stored.
    pub fn to_record(&self) -> Record {
        let mut record = self.attributes.clone();
        if let Some(id) = &self.id {
            record.insert(INDEX_ID.to_string(), Value::String(id.clone()));
        }
        record
    }

    /// Attributes and loaded relations as one nested JSON object.
    pub fn to_json(&self) -> Value {
        let mut record = self.to_record();

        for (name, related) in &self.relations {
            let value = match related {
                Related::One(Some(instance)) => instance.to_json(),
                Related::One(None) => Value::Null,
                Related::Many(instances) => instances.iter().map(Instance::to_json).collect(),
            };
            record.insert(name.clone(), value);
        }

        Value::Object(record)
    }

    pub(crate) fn set_related(&mut self, name: &str, related: Related) {
        self.relations.insert(name.to_string(), related);
    }

    /// The value of `field`, where `$id` resolves to the index id.
    pub(crate) fn field(&self, field: &str) -> Option<Value> {
        if field == INDEX_ID {
            return self.id.clone().map(Value::String);
        }
        self.attributes.get(field).cloned()
    }

    /// The index key formed by `keys` on this instance.
    pub(crate) fn key_index(&self, keys: &Keys) -> Option<String> {
        match keys.as_single() {
            Some(INDEX_ID) => self.id.clone(),
            _ => keys.index_key(&self.attributes),
        }
    }
}

impl Related {
    pub fn len(&self) -> usize {
        match self {
            Related::One(instance) => usize::from(instance.is_some()),
            Related::Many(instances) => instances.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Serialize for Instance {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

fn make_related(
    schema: &Schema,
    owner: &Model,
    relation: &Relation,
    raw: &Record,
    value: Option<&Value>,
) -> Result<Related> {
    let value = relation.fill(value);

    let target = match relation {
        // The related entity is named by the owner's type field
        Relation::MorphTo(rel) => match raw.get(&rel.ty).and_then(Value::as_str) {
            Some(entity) => schema.get(entity),
            None => None,
        },
        _ => match relation.related() {
            Some(entity) => Some(schema.model(entity)?),
            None => None,
        },
    };

    let Some(target) = target else {
        tracing::debug!(
            entity = %owner.entity,
            relation = relation.kind_name(),
            "no target to make"
        );
        return Ok(if relation.is_plural() {
            Related::Many(vec![])
        } else {
            Related::One(None)
        });
    };

    match value {
        Value::Object(item) => {
            let instance = make_item(schema, target, relation, &item)?;
            Ok(Related::One(Some(Box::new(instance))))
        }
        Value::Array(items) => {
            let mut instances = Vec::with_capacity(items.len());
            for item in items {
                // Inline keys have nothing to make
                if let Value::Object(item) = item {
                    instances.push(make_item(schema, target, relation, &item)?);
                }
            }
            Ok(Related::Many(instances))
        }
        _ => Ok(Related::One(None)),
    }
}

fn make_item(
    schema: &Schema,
    target: &Model,
    relation: &Relation,
    item: &Record,
) -> Result<Instance> {
    let mut instance = Instance::make(schema, target, item)?;

    if let Some(pivot) = relation.pivot() {
        if let Some(Value::Object(raw)) = item.get(pivot.accessor) {
            let model = schema.model(pivot.entity)?;
            let pivot_instance = Instance::make(schema, model, raw)?;
            instance.set_related(pivot.accessor, Related::One(Some(Box::new(pivot_instance))));
        }
    }

    Ok(instance)
}
