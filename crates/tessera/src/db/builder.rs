use super::Db;
use crate::{Hooks, MemoryStore, Result, Store};

use tessera_core::schema::{self, Model};

use std::sync::Arc;

/// Namespace used when none is configured.
pub const DEFAULT_NAMESPACE: &str = "entities";

#[derive(Debug, Default)]
pub struct Builder {
    /// Schema builder
    core: schema::Builder,

    namespace: Option<String>,
}

impl Builder {
    pub fn register(&mut self, model: Model) -> &mut Self {
        self.core.register(model);
        self
    }

    /// Set the store namespace all tables live under
    pub fn namespace(&mut self, namespace: impl Into<String>) -> &mut Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Build the schema and bind it to a fresh in-memory store.
    pub fn build(&self) -> Result<Db> {
        self.build_with_store(MemoryStore::new())
    }

    pub fn build_with_store<S: Store>(&self, store: S) -> Result<Db<S>> {
        let schema = self.core.build()?;
        let namespace = self
            .namespace
            .clone()
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());

        tracing::debug!(%namespace, models = schema.models().count(), "database ready");

        Ok(Db {
            schema: Arc::new(schema),
            store,
            hooks: Hooks::default(),
            namespace,
        })
    }
}
