mod builder;
pub use builder::Builder;

mod dispatch;
pub use dispatch::Dispatch;

mod persist;
pub use persist::{Condition, Patch};

use crate::{
    engine::{self, Normalized},
    query::{Cx, Query},
    Hooks, Instance, MemoryStore, Result, Store,
};
use tessera_core::Schema;

use serde_json::Value;
use std::sync::Arc;

/// A model registry bound to a store.
///
/// All reads go through [`Db::query`]. Mutations normalize their payload,
/// run hooks and commit one batch per touched entity.
pub struct Db<S = MemoryStore> {
    schema: Arc<Schema>,
    store: S,
    hooks: Hooks,
    namespace: String,
}

impl Db {
    pub fn builder() -> Builder {
        Builder::default()
    }
}

impl<S: Store> Db<S> {
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Namespace all tables are stored under.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The lifecycle hook registry.
    pub fn hooks(&mut self) -> &mut Hooks {
        &mut self.hooks
    }

    /// Start a query over `entity`.
    pub fn query(&self, entity: &str) -> Result<Query<'_>> {
        self.cx().query(entity)
    }

    /// Find a record by primary key.
    pub fn find(&self, entity: &str, key: impl Into<Value>) -> Result<Option<Instance>> {
        self.query(entity)?.find(key)
    }

    /// Every record of `entity`.
    pub fn all(&self, entity: &str) -> Result<Vec<Instance>> {
        self.query(entity)?.get()
    }

    /// Flatten a nested payload without touching the store.
    pub fn normalize(&self, entity: &str, payload: &Value) -> Result<Normalized> {
        engine::normalize(&self.schema, entity, payload)
    }

    /// Hydrate a nested payload object, relations included, without touching
    /// the store.
    pub fn make(&self, entity: &str, payload: &Value) -> Result<Instance> {
        crate::make(&self.schema, entity, payload)
    }

    /// Wrap the database for use from async code.
    pub fn dispatch(&mut self) -> Dispatch<'_, S> {
        Dispatch::new(self)
    }

    fn cx(&self) -> Cx<'_> {
        Cx {
            schema: &self.schema,
            store: &self.store,
            hooks: &self.hooks,
            namespace: &self.namespace,
        }
    }
}

impl<S: std::fmt::Debug> std::fmt::Debug for Db<S> {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fmt.debug_struct("Db")
            .field("namespace", &self.namespace)
            .field("store", &self.store)
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}
