//! The host store the engine reads from and commits to.

use crate::Result;
use tessera_core::record::{Record, Records, INDEX_ID};

use indexmap::IndexMap;
use serde_json::Value;

/// A namespaced key-value state container.
///
/// The engine only reads through [`Store::state`] and only writes through
/// [`Store::commit`]. A commit must be applied before the next read in the
/// same call stack; every batch is one commit.
pub trait Store {
    /// The flat table of `entity` within `namespace`, if one exists.
    fn state(&self, namespace: &str, entity: &str) -> Option<&Records>;

    /// Apply a mutation synchronously.
    fn commit(&mut self, namespace: &str, mutation: Mutation) -> Result<()>;
}

/// A state patch, always carrying a whole batch.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Replace the entity's table with `records`
    Create { entity: String, records: Records },

    /// Insert `records`, replacing any record with the same index id
    Insert { entity: String, records: Records },

    /// Replace each record stored under the paired index id. When a record's
    /// own `$id` differs from that key (its primary key changed), the old slot
    /// is removed and the record is stored under the new id.
    Update {
        entity: String,
        records: Vec<(String, Record)>,
    },

    /// Remove records by index id
    Delete { entity: String, ids: Vec<String> },

    /// Clear one entity's table, or every table in the namespace
    DeleteAll { entity: Option<String> },
}

impl Mutation {
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::Create { .. } => "create",
            Mutation::Insert { .. } => "insert",
            Mutation::Update { .. } => "update",
            Mutation::Delete { .. } => "delete",
            Mutation::DeleteAll { .. } => "delete_all",
        }
    }

    pub fn entity(&self) -> Option<&str> {
        match self {
            Mutation::Create { entity, .. }
            | Mutation::Insert { entity, .. }
            | Mutation::Update { entity, .. }
            | Mutation::Delete { entity, .. } => Some(entity),
            Mutation::DeleteAll { entity } => entity.as_deref(),
        }
    }

    /// Number of records carried by the mutation.
    pub fn len(&self) -> usize {
        match self {
            Mutation::Create { records, .. } | Mutation::Insert { records, .. } => records.len(),
            Mutation::Update { records, .. } => records.len(),
            Mutation::Delete { ids, .. } => ids.len(),
            Mutation::DeleteAll { .. } => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-process [`Store`] keeping every namespace in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    namespaces: IndexMap<String, IndexMap<String, Records>>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    /// Every table of a namespace.
    pub fn namespace(&self, namespace: &str) -> Option<&IndexMap<String, Records>> {
        self.namespaces.get(namespace)
    }
}

impl Store for MemoryStore {
    fn state(&self, namespace: &str, entity: &str) -> Option<&Records> {
        self.namespaces.get(namespace)?.get(entity)
    }

    fn commit(&mut self, namespace: &str, mutation: Mutation) -> Result<()> {
        tracing::debug!(
            namespace,
            mutation = mutation.name(),
            entity = mutation.entity().unwrap_or("*"),
            records = mutation.len(),
            "commit"
        );

        let tables = self.namespaces.entry(namespace.to_string()).or_default();

        match mutation {
            Mutation::Create { entity, records } => {
                tables.insert(entity, records);
            }
            Mutation::Insert { entity, records } => {
                tables.entry(entity).or_default().extend(records);
            }
            Mutation::Update { entity, records } => {
                let table = tables.entry(entity).or_default();

                let moves: Vec<(String, Record)> = records
                    .into_iter()
                    .map(|(old_id, record)| {
                        let new_id = match record.get(INDEX_ID) {
                            Some(Value::String(id)) => id.clone(),
                            _ => old_id.clone(),
                        };
                        if new_id != old_id {
                            table.shift_remove(&old_id);
                        }
                        (new_id, record)
                    })
                    .collect();

                // Every relocated id is vacated before any record lands, so
                // a batch may shift keys onto each other
                table.extend(moves);
            }
            Mutation::Delete { entity, ids } => {
                if let Some(table) = tables.get_mut(&entity) {
                    for id in &ids {
                        table.shift_remove(id);
                    }
                }
            }
            Mutation::DeleteAll { entity: Some(entity) } => {
                tables.insert(entity, Records::new());
            }
            Mutation::DeleteAll { entity: None } => {
                for table in tables.values_mut() {
                    table.clear();
                }
            }
        }

        Ok(())
    }
}
