use super::{Builder, Model};
use crate::{
    record::{index_key, Record},
    Error, Result,
};

use indexmap::IndexMap;

/// The model registry. Relations name their targets by entity and are
/// resolved through the schema lazily, so models may reference each other in
/// any order.
#[derive(Debug, Default)]
pub struct Schema {
    pub(super) models: IndexMap<String, Model>,
}

impl Schema {
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Resolve a model by entity name.
    pub fn model(&self, entity: &str) -> Result<&Model> {
        self.models
            .get(entity)
            .ok_or_else(|| Error::unknown_entity(entity))
    }

    pub fn get(&self, entity: &str) -> Option<&Model> {
        self.models.get(entity)
    }

    pub fn models(&self) -> impl Iterator<Item = &Model> {
        self.models.values()
    }

    /// The top of the model's inheritance chain, whose entity names the flat
    /// table the model's records live in.
    pub fn root_model<'a>(&'a self, model: &'a Model) -> &'a Model {
        let mut current = model;
        while let Some(base) = current.base_entity.as_deref().and_then(|base| self.get(base)) {
            current = base;
        }
        current
    }

    pub fn storage_entity<'a>(&'a self, model: &'a Model) -> &'a str {
        &self.root_model(model).entity
    }

    /// Returns `true` if `model` is `ancestor` or inherits from it.
    pub fn is_kind_of(&self, model: &Model, ancestor: &str) -> bool {
        let mut current = Some(model);
        while let Some(model) = current {
            if model.entity == ancestor {
                return true;
            }
            current = model.base_entity.as_deref().and_then(|base| self.get(base));
        }
        false
    }

    /// Pick the concrete model for a record.
    ///
    /// The discriminator is looked up in the declaring model's `types` map.
    /// An absent discriminator, or one that maps to nothing registered, falls
    /// back to `model` itself: dispatch never fails.
    pub fn model_for_record<'a>(&'a self, model: &'a Model, record: &Record) -> &'a Model {
        if model.types.is_empty() {
            return model;
        }

        record
            .get(&model.type_key)
            .filter(|value| !value.is_null())
            .and_then(|value| model.types.get(&index_key(value)))
            .and_then(|entity| self.get(entity))
            .unwrap_or(model)
    }

    /// Discriminator values that select `model` or one of its subtypes.
    pub fn discriminators<'a>(&'a self, model: &'a Model) -> Vec<&'a str> {
        model
            .types
            .iter()
            .filter(|(_, entity)| {
                self.get(entity)
                    .is_some_and(|m| self.is_kind_of(m, &model.entity))
            })
            .map(|(value, _)| value.as_str())
            .collect()
    }

    /// The first discriminator value mapping exactly to `model`.
    pub fn discriminator_of<'a>(&'a self, model: &'a Model) -> Option<&'a str> {
        model
            .types
            .iter()
            .find(|(_, entity)| **entity == model.entity)
            .map(|(value, _)| value.as_str())
    }

    /// Models inheriting, directly or not, from `model`.
    pub fn subtypes<'a>(&'a self, model: &'a Model) -> impl Iterator<Item = &'a Model> + 'a {
        self.models
            .values()
            .filter(move |m| m.entity != model.entity && self.is_kind_of(m, &model.entity))
    }
}
