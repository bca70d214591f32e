use super::{Attr, Field, Relation};
use crate::{
    record::{index_id, index_key, Keys, Record},
    Error, Result,
};

use indexmap::IndexMap;
use serde_json::Value;

/// Default discriminator field for models declaring subtypes.
pub const DEFAULT_TYPE_KEY: &str = "type";

#[derive(Debug, Clone)]
pub struct Model {
    /// Name of the entity, unique within the schema
    pub entity: String,

    /// Entity this model inherits from. Subtypes share their base entity's
    /// flat table.
    pub base_entity: Option<String>,

    /// Field(s) composing the primary key
    pub primary_key: Keys,

    /// Fields in declaration order. After the schema is built, a subtype's
    /// map also contains every inherited field.
    pub fields: IndexMap<String, Field>,

    /// Field read to pick a subtype when hydrating a record
    pub type_key: String,

    /// Discriminator value to entity name
    pub types: IndexMap<String, String>,
}

impl Model {
    pub fn new(entity: impl Into<String>) -> Model {
        Model {
            entity: entity.into(),
            base_entity: None,
            primary_key: Keys::from("id"),
            fields: IndexMap::new(),
            type_key: DEFAULT_TYPE_KEY.to_string(),
            types: IndexMap::new(),
        }
    }

    /// Set the primary key: a field name or an array of field names.
    pub fn key(mut self, primary_key: impl Into<Keys>) -> Model {
        self.primary_key = primary_key.into();
        self
    }

    pub fn field(mut self, name: impl Into<String>, field: impl Into<Field>) -> Model {
        self.fields.insert(name.into(), field.into());
        self
    }

    /// Declare this model as a subtype of `base_entity`.
    pub fn extends(mut self, base_entity: impl Into<String>) -> Model {
        self.base_entity = Some(base_entity.into());
        self
    }

    /// Map a discriminator value to a concrete entity.
    pub fn subtype(mut self, discriminator: impl Into<String>, entity: impl Into<String>) -> Model {
        self.types.insert(discriminator.into(), entity.into());
        self
    }

    /// Set the discriminator field name (defaults to `type`).
    pub fn discriminator(mut self, type_key: impl Into<String>) -> Model {
        self.type_key = type_key.into();
        self
    }

    pub fn is_subtype(&self) -> bool {
        self.base_entity.is_some()
    }

    pub fn attr(&self, name: &str) -> Option<&Attr> {
        self.fields.get(name).and_then(Field::as_attr)
    }

    pub fn relation(&self, name: &str) -> Option<&Relation> {
        self.fields.get(name).and_then(Field::as_relation)
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&str, &Attr)> + '_ {
        self.fields
            .iter()
            .filter_map(|(name, field)| field.as_attr().map(|attr| (name.as_str(), attr)))
    }

    pub fn relations(&self) -> impl Iterator<Item = (&str, &Relation)> + '_ {
        self.fields
            .iter()
            .filter_map(|(name, field)| field.as_relation().map(|rel| (name.as_str(), rel)))
    }

    /// Derive the index id of a record from this model's primary key.
    pub fn index_id(&self, record: &Record) -> Option<String> {
        index_id(&self.primary_key, record)
    }

    /// Convert a key given by a caller (`find`, `delete`, `update_by`) into
    /// an index id.
    ///
    /// Single-key models accept a scalar. Composite-key models accept an
    /// array with one value per key field, or an index id string as produced
    /// by [`Model::index_id`].
    pub fn key_id(&self, key: &Value) -> Result<String> {
        let arity = self.primary_key.fields().len();

        if self.primary_key.is_composite() {
            match key {
                Value::Array(values) if values.len() == arity => Ok(index_key(key)),
                Value::String(id) => Ok(id.clone()),
                _ => Err(Error::malformed_key(
                    &self.entity,
                    key.clone(),
                    "an array with one value per primary key field",
                )),
            }
        } else {
            match key {
                Value::String(_) | Value::Number(_) | Value::Bool(_) => Ok(index_key(key)),
                _ => Err(Error::malformed_key(
                    &self.entity,
                    key.clone(),
                    "a single key value",
                )),
            }
        }
    }
}
