use super::{Field, Model, Relation, Schema};
use crate::{record::Keys, Error, Result};

use indexmap::IndexMap;
use std::collections::HashMap;

/// Collects model definitions and turns them into a verified [`Schema`].
#[derive(Debug, Default)]
pub struct Builder {
    models: Vec<Model>,
}

impl Builder {
    pub fn register(&mut self, model: Model) -> &mut Self {
        self.models.push(model);
        self
    }

    pub fn build(&self) -> Result<Schema> {
        let mut declared = IndexMap::new();

        for model in &self.models {
            if declared.insert(model.entity.clone(), model).is_some() {
                return Err(Error::invalid_schema(format!(
                    "entity `{}` is registered twice",
                    model.entity
                )));
            }
        }

        // Flatten inheritance so each subtype carries its base's fields
        let mut resolved = HashMap::new();
        for entity in declared.keys() {
            resolve_inheritance(entity, &declared, &mut resolved, &mut vec![])?;
        }

        let mut models: IndexMap<String, Model> = declared
            .keys()
            .filter_map(|entity| resolved.remove(entity).map(|model| (entity.clone(), model)))
            .collect();

        let primary_keys: HashMap<String, Keys> = models
            .values()
            .map(|model| (model.entity.clone(), model.primary_key.clone()))
            .collect();

        for model in models.values_mut() {
            verify_primary_key(model)?;

            for entity in model.types.values() {
                if !primary_keys.contains_key(entity) {
                    return Err(Error::unknown_entity_in(
                        entity,
                        format!("{}.types", model.entity),
                    ));
                }
            }

            let owner = model.entity.clone();
            let owner_pk = model.primary_key.clone();

            for (name, field) in model.fields.iter_mut() {
                if let Some(relation) = field.as_relation_mut() {
                    let referrer = format!("{owner}.{name}");
                    resolve_relation_keys(relation, &owner_pk, &primary_keys, &referrer)?;
                }
            }
        }

        tracing::debug!(models = models.len(), "schema built");

        Ok(Schema { models })
    }
}

fn resolve_inheritance(
    entity: &str,
    declared: &IndexMap<String, &Model>,
    resolved: &mut HashMap<String, Model>,
    visiting: &mut Vec<String>,
) -> Result<()> {
    if resolved.contains_key(entity) {
        return Ok(());
    }

    let model = declared[entity];

    let Some(base_entity) = &model.base_entity else {
        resolved.insert(entity.to_string(), model.clone());
        return Ok(());
    };

    if visiting.iter().any(|e| e == entity) {
        return Err(Error::invalid_schema(format!(
            "inheritance cycle through `{entity}`"
        )));
    }

    if !declared.contains_key(base_entity) {
        return Err(Error::unknown_entity_in(
            base_entity,
            format!("{entity} (base entity)"),
        ));
    }

    visiting.push(entity.to_string());
    resolve_inheritance(base_entity, declared, resolved, visiting)?;
    visiting.pop();

    let base = &resolved[base_entity];
    let mut merged = model.clone();

    let mut fields = base.fields.clone();
    for (name, field) in &model.fields {
        fields.insert(name.clone(), field.clone());
    }

    merged.fields = fields;
    merged.primary_key = base.primary_key.clone();
    merged.type_key = base.type_key.clone();
    if merged.types.is_empty() {
        merged.types = base.types.clone();
    }

    resolved.insert(entity.to_string(), merged);
    Ok(())
}

fn verify_primary_key(model: &Model) -> Result<()> {
    if model.primary_key.is_empty() {
        return Err(Error::invalid_schema(format!(
            "`{}` has an empty primary key",
            model.entity
        )));
    }

    for component in model.primary_key.fields() {
        match model.fields.get(component) {
            Some(Field::Attr(_)) => {}
            Some(Field::Relation(_)) => {
                return Err(Error::invalid_schema(format!(
                    "primary key `{component}` of `{}` is a relation",
                    model.entity
                )))
            }
            None => {
                return Err(Error::invalid_schema(format!(
                    "primary key `{component}` of `{}` is not a declared field",
                    model.entity
                )))
            }
        }
    }

    Ok(())
}

/// Check every entity the relation names and default its omitted keys.
fn resolve_relation_keys(
    relation: &mut Relation,
    owner_pk: &Keys,
    primary_keys: &HashMap<String, Keys>,
    referrer: &str,
) -> Result<()> {
    for entity in relation.entities() {
        if !primary_keys.contains_key(entity) {
            return Err(Error::unknown_entity_in(entity, referrer));
        }
    }

    let pk_of = |entity: &str| primary_keys[entity].clone();

    fn default(key: &mut Keys, value: Keys) {
        if key.is_empty() {
            *key = value;
        }
    }

    match relation {
        Relation::HasOne(rel) => default(&mut rel.local_key, owner_pk.clone()),
        Relation::BelongsTo(rel) => default(&mut rel.owner_key, pk_of(&rel.parent)),
        Relation::HasMany(rel) => default(&mut rel.local_key, owner_pk.clone()),
        Relation::HasManyBy(rel) => default(&mut rel.owner_key, pk_of(&rel.parent)),
        Relation::HasManyThrough(rel) => {
            default(&mut rel.local_key, owner_pk.clone());
            default(&mut rel.second_local_key, pk_of(&rel.through));
        }
        Relation::BelongsToMany(rel) => {
            default(&mut rel.parent_key, owner_pk.clone());
            default(&mut rel.related_key, pk_of(&rel.related));
        }
        Relation::MorphTo(_) => {}
        Relation::MorphOne(rel) => default(&mut rel.local_key, owner_pk.clone()),
        Relation::MorphMany(rel) => default(&mut rel.local_key, owner_pk.clone()),
        Relation::MorphToMany(rel) => {
            default(&mut rel.parent_key, owner_pk.clone());
            default(&mut rel.related_key, pk_of(&rel.related));
        }
        Relation::MorphedByMany(rel) => {
            default(&mut rel.parent_key, owner_pk.clone());
            default(&mut rel.related_key, pk_of(&rel.related));
        }
    }

    Ok(())
}
