use super::{Condition, Db, Patch};
use crate::{Collections, Instance, MemoryStore, Result, Store};

use serde_json::Value;

/// Async face of a [`Db`], for hosts whose actions are awaited.
///
/// Every method runs the synchronous operation to completion; nothing is
/// spawned and no state is shared across awaits.
pub struct Dispatch<'a, S = MemoryStore> {
    db: &'a mut Db<S>,
}

impl<'a, S: Store> Dispatch<'a, S> {
    pub(super) fn new(db: &'a mut Db<S>) -> Dispatch<'a, S> {
        Dispatch { db }
    }

    pub async fn create(&mut self, entity: &str, payload: Value) -> Result<Collections> {
        self.db.create(entity, &payload)
    }

    pub async fn insert(&mut self, entity: &str, payload: Value) -> Result<Collections> {
        self.db.insert(entity, &payload)
    }

    pub async fn update(&mut self, entity: &str, payload: Value) -> Result<Collections> {
        self.db.update(entity, &payload)
    }

    pub async fn update_by(
        &mut self,
        entity: &str,
        patch: Patch,
        condition: Option<Condition>,
    ) -> Result<Collections> {
        self.db.update_by(entity, patch, condition)
    }

    pub async fn insert_or_update(&mut self, entity: &str, payload: Value) -> Result<Collections> {
        self.db.insert_or_update(entity, &payload)
    }

    pub async fn delete(&mut self, entity: &str, condition: Condition) -> Result<Collections> {
        self.db.delete(entity, condition)
    }

    pub async fn delete_all(&mut self, entity: Option<&str>) -> Result<Collections> {
        self.db.delete_all(entity)
    }

    pub async fn all(&self, entity: &str) -> Result<Vec<Instance>> {
        self.db.all(entity)
    }

    pub async fn find(&self, entity: &str, key: Value) -> Result<Option<Instance>> {
        self.db.find(entity, key)
    }
}
