use super::Query;
use crate::{Hooks, Result, Store};
use tessera_core::{schema::Model, Records, Schema};

/// What a query reads from: the schema, a store snapshot and the hooks.
#[derive(Clone, Copy)]
pub(crate) struct Cx<'a> {
    pub(crate) schema: &'a Schema,
    pub(crate) store: &'a dyn Store,
    pub(crate) hooks: &'a Hooks,
    pub(crate) namespace: &'a str,
}

impl<'a> Cx<'a> {
    /// The flat table `model`'s records are stored in.
    pub(crate) fn records(&self, model: &Model) -> Option<&'a Records> {
        let store = self.store;
        store.state(self.namespace, self.schema.storage_entity(model))
    }

    pub(crate) fn query(&self, entity: &str) -> Result<Query<'a>> {
        Ok(Query::new(*self, self.schema.model(entity)?))
    }
}
