mod db;
pub use db::{Builder, Condition, Db, Dispatch, Patch};

mod engine;
pub use engine::{normalize, Normalized};

pub mod hooks;
pub use hooks::{Flow, HookId, Hooks};

mod instance;
pub use instance::{Collections, Instance, Related};

pub mod query;
pub use query::{Constraint, Count, Direction, Query};

mod relation;

pub mod store;
pub use store::{MemoryStore, Mutation, Store};

pub use tessera_core::{
    bail, err,
    schema::{self, Attr, Model, Relation},
    Error, Keys, Record, Records, Result, Schema,
};

/// Hydrate a nested payload object against `schema` without a store.
pub fn make(schema: &Schema, entity: &str, payload: &serde_json::Value) -> Result<Instance> {
    let model = schema.model(entity)?;
    match payload {
        serde_json::Value::Object(raw) => Instance::make(schema, model, raw),
        other => Err(Error::invalid_payload(
            entity,
            tessera_core::value::kind_name(other),
        )),
    }
}
