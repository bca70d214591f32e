use super::Db;
use crate::{
    engine::{self, fill, merge},
    hooks::Event,
    query::in_scope,
    Collections, Error, Instance, Mutation, Result, Store,
};
use tessera_core::{
    err,
    record::{Record, Records, INDEX_ID},
    schema::Model,
    value::kind_name,
    Schema,
};

use serde_json::Value;

/// What to change on the records matched by [`Db::update_by`].
pub enum Patch {
    /// Attributes to merge into each record
    Data(Value),

    /// Closure mutating each record in place
    Apply(Box<dyn Fn(&mut Record)>),
}

/// Selects the records a mutation applies to.
pub enum Condition {
    /// Primary key value, or an array of values for composite keys
    Key(Value),

    /// Predicate over the hydrated record
    Predicate(Box<dyn Fn(&Instance) -> bool>),
}

impl Patch {
    pub fn apply(f: impl Fn(&mut Record) + 'static) -> Patch {
        Patch::Apply(Box::new(f))
    }
}

impl From<Value> for Patch {
    fn from(value: Value) -> Self {
        Patch::Data(value)
    }
}

impl Condition {
    pub fn key(key: impl Into<Value>) -> Condition {
        Condition::Key(key.into())
    }

    pub fn when(predicate: impl Fn(&Instance) -> bool + 'static) -> Condition {
        Condition::Predicate(Box::new(predicate))
    }
}

macro_rules! impl_condition_from_key {
    ( $($t:ty),+ ) => {
        $(
            impl From<$t> for Condition {
                fn from(value: $t) -> Self {
                    Condition::Key(value.into())
                }
            }
        )+
    };
}

impl_condition_from_key!(Value, i32, i64, u32, u64, &str, String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Method {
    Create,
    Insert,
    Update,
    InsertOrUpdate,
}

impl<S: Store> Db<S> {
    /// Replace the tables of every entity present in the payload with its
    /// records. An empty payload clears the root entity.
    pub fn create(&mut self, entity: &str, payload: &Value) -> Result<Collections> {
        self.persist(Method::Create, entity, payload)
    }

    /// Add the payload's records, replacing records with the same id.
    pub fn insert(&mut self, entity: &str, payload: &Value) -> Result<Collections> {
        self.persist(Method::Insert, entity, payload)
    }

    /// Merge the payload into records that already exist. Records not in the
    /// store are skipped.
    pub fn update(&mut self, entity: &str, payload: &Value) -> Result<Collections> {
        self.persist(Method::Update, entity, payload)
    }

    /// Merge into existing records and insert the rest.
    pub fn insert_or_update(&mut self, entity: &str, payload: &Value) -> Result<Collections> {
        self.persist(Method::InsertOrUpdate, entity, payload)
    }

    /// Update the records selected by `condition`.
    ///
    /// Without a condition, a data patch behaves like [`Db::update`] and is
    /// matched by the primary keys it carries. A closure patch needs a
    /// condition. Changing a primary key moves the record to its new id.
    pub fn update_by(
        &mut self,
        entity: &str,
        patch: impl Into<Patch>,
        condition: Option<Condition>,
    ) -> Result<Collections> {
        let patch = patch.into();

        let Some(condition) = condition else {
            return match patch {
                Patch::Data(payload) => self.update(entity, &payload),
                Patch::Apply(_) => Err(Error::missing_condition(entity)),
            };
        };

        if let Patch::Data(value) = &patch {
            if !value.is_object() {
                return Err(Error::invalid_payload(entity, kind_name(value)));
            }
        }

        let schema = self.schema.clone();
        let model = schema.model(entity)?;

        let updates = self
            .targets(&schema, model, condition)?
            .into_iter()
            .map(|(id, current)| {
                let record = match &patch {
                    Patch::Data(Value::Object(data)) => merge(&schema, model, &current, data),
                    Patch::Data(_) => current,
                    Patch::Apply(f) => {
                        let mut record = current;
                        f(&mut record);
                        record
                    }
                };
                (id, record)
            })
            .collect();

        let instances = self.commit_update(&schema, model, updates)?;
        Ok(Collections::from([(storage_name(&schema, model), instances)]))
    }

    /// Delete the records selected by `condition`.
    pub fn delete(&mut self, entity: &str, condition: impl Into<Condition>) -> Result<Collections> {
        let schema = self.schema.clone();
        let model = schema.model(entity)?;
        let targets = self.targets(&schema, model, condition.into())?;

        let instances = self.commit_delete(&schema, model, targets)?;
        Ok(Collections::from([(storage_name(&schema, model), instances)]))
    }

    /// Delete every record of `entity`, or of every entity. A subtype only
    /// deletes its own records.
    pub fn delete_all(&mut self, entity: Option<&str>) -> Result<Collections> {
        let schema = self.schema.clone();
        let hooked = self.hooks.is_registered(Event::BeforeDelete)
            || self.hooks.is_registered(Event::AfterDelete);

        let models: Vec<&Model> = match entity {
            Some(entity) => vec![schema.model(entity)?],
            None => schema.models().filter(|model| !model.is_subtype()).collect(),
        };

        let mut collections = Collections::new();

        for model in &models {
            let targets = self.targets(&schema, model, Condition::when(|_| true))?;

            if hooked || model.is_subtype() {
                let instances = self.commit_delete(&schema, model, targets)?;
                collections.insert(storage_name(&schema, model), instances);
            } else {
                collections.insert(model.entity.clone(), hydrate_all(&schema, model, &targets));
            }
        }

        if !hooked {
            match entity {
                None => self.commit(Mutation::DeleteAll { entity: None })?,
                Some(_) => {
                    for model in models.iter().filter(|model| !model.is_subtype()) {
                        self.commit(Mutation::DeleteAll {
                            entity: Some(model.entity.clone()),
                        })?;
                    }
                }
            }
        }

        Ok(collections)
    }

    fn persist(&mut self, method: Method, entity: &str, payload: &Value) -> Result<Collections> {
        let schema = self.schema.clone();
        let root = schema.model(entity)?;
        let data = engine::normalize(&schema, entity, payload)?;

        let mut collections = Collections::new();

        if data.is_empty() {
            if method == Method::Create {
                self.commit(Mutation::Create {
                    entity: storage_name(&schema, root),
                    records: Records::new(),
                })?;
            }
            return Ok(collections);
        }

        for (entity, records) in data {
            let model = schema.model(&entity)?;
            let records: Vec<(String, Record)> = records.into_iter().collect();

            let instances = match method {
                Method::Create => self.commit_create(&schema, model, records, true)?,
                Method::Insert => self.commit_create(&schema, model, records, false)?,
                Method::Update => self.update_existing(&schema, model, records, false)?,
                Method::InsertOrUpdate => self.update_existing(&schema, model, records, true)?,
            };

            collections.insert(entity, instances);
        }

        Ok(collections)
    }

    /// Fill and commit new records. `replace` clears the table first.
    fn commit_create(
        &mut self,
        schema: &Schema,
        model: &Model,
        records: Vec<(String, Record)>,
        replace: bool,
    ) -> Result<Vec<Instance>> {
        let entity = &model.entity;
        let records = records
            .into_iter()
            .map(|(id, record)| (id, fill(schema, model, &record)))
            .collect();
        let records = self.hooks.run_before(Event::BeforeCreate, entity, records);

        let table: Records = records.iter().cloned().collect();
        let mutation = if replace {
            Mutation::Create {
                entity: entity.clone(),
                records: table,
            }
        } else {
            Mutation::Insert {
                entity: entity.clone(),
                records: table,
            }
        };

        if replace || !records.is_empty() {
            self.commit(mutation)?;
        }

        self.hooks.run_after(Event::AfterCreate, entity, &records);
        Ok(hydrate_all(schema, model, &records))
    }

    fn update_existing(
        &mut self,
        schema: &Schema,
        model: &Model,
        records: Vec<(String, Record)>,
        insert_missing: bool,
    ) -> Result<Vec<Instance>> {
        let existing = self.store.state(&self.namespace, &model.entity);

        let mut updates = vec![];
        let mut inserts = vec![];

        for (id, record) in records {
            match existing.and_then(|table| table.get(&id)) {
                Some(current) => updates.push((id, merge(schema, model, current, &record))),
                None if insert_missing => inserts.push((id, record)),
                None => tracing::debug!(
                    entity = %model.entity,
                    %id,
                    "skipping update of missing record"
                ),
            }
        }

        let mut instances = self.commit_update(schema, model, updates)?;
        if !inserts.is_empty() {
            instances.extend(self.commit_create(schema, model, inserts, false)?);
        }
        Ok(instances)
    }

    /// Commit `(stored id, new record)` pairs. A record whose primary key
    /// changed gets a new `$id` and is moved there.
    fn commit_update(
        &mut self,
        schema: &Schema,
        model: &Model,
        updates: Vec<(String, Record)>,
    ) -> Result<Vec<Instance>> {
        let entity = &model.entity;
        let updates: Vec<(String, Record)> = self
            .hooks
            .run_before(Event::BeforeUpdate, entity, updates)
            .into_iter()
            .map(|(id, mut record)| {
                let concrete = schema.model_for_record(model, &record);
                let new_id = concrete.index_id(&record).unwrap_or_else(|| id.clone());
                record.insert(INDEX_ID.to_string(), Value::String(new_id));
                (id, record)
            })
            .collect();

        if updates.is_empty() {
            return Ok(vec![]);
        }

        self.commit(Mutation::Update {
            entity: storage_name(schema, model),
            records: updates.clone(),
        })?;

        self.hooks.run_after(Event::AfterUpdate, entity, &updates);
        Ok(hydrate_all(schema, model, &updates))
    }

    fn commit_delete(
        &mut self,
        schema: &Schema,
        model: &Model,
        targets: Vec<(String, Record)>,
    ) -> Result<Vec<Instance>> {
        let entity = &model.entity;
        let targets = self.hooks.run_before(Event::BeforeDelete, entity, targets);

        if targets.is_empty() {
            return Ok(vec![]);
        }

        self.commit(Mutation::Delete {
            entity: storage_name(schema, model),
            ids: targets.iter().map(|(id, _)| id.clone()).collect(),
        })?;

        self.hooks.run_after(Event::AfterDelete, entity, &targets);
        Ok(hydrate_all(schema, model, &targets))
    }

    /// Stored records selected by a condition, paired with their ids.
    fn targets(
        &self,
        schema: &Schema,
        model: &Model,
        condition: Condition,
    ) -> Result<Vec<(String, Record)>> {
        let table = self.store.state(&self.namespace, schema.storage_entity(model));

        let ids: Vec<String> = match condition {
            Condition::Key(key) => vec![model.key_id(&key)?],
            Condition::Predicate(predicate) => self
                .query(&model.entity)?
                .where_record(predicate)
                .get()?
                .iter()
                .filter_map(|item| item.id().map(str::to_string))
                .collect(),
        };

        Ok(ids
            .into_iter()
            .filter_map(|id| {
                let record = table?.get(&id)?;
                in_scope(schema, model, record).then(|| (id, record.clone()))
            })
            .collect())
    }

    fn commit(&mut self, mutation: Mutation) -> Result<()> {
        let name = mutation.name();
        let entity = mutation.entity().unwrap_or("*").to_string();

        self.store
            .commit(&self.namespace, mutation)
            .map_err(|err| err.context(err!("failed to commit `{name}` on `{entity}`")))
    }
}

fn storage_name(schema: &Schema, model: &Model) -> String {
    schema.storage_entity(model).to_string()
}

fn hydrate_all(schema: &Schema, model: &Model, records: &[(String, Record)]) -> Vec<Instance> {
    records
        .iter()
        .map(|(_, record)| Instance::hydrate(schema.model_for_record(model, record), record))
        .collect()
}
