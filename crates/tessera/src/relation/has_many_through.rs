use super::{key_set, Batch};
use crate::{Instance, Result};
use tessera_core::schema::relation::HasManyThrough;

use indexmap::{IndexMap, IndexSet};

pub(super) fn load(
    batch: &Batch<'_, '_>,
    rel: &HasManyThrough,
    parents: &mut [&mut Instance],
) -> Result<()> {
    let keys = key_set(parents, &rel.local_key);
    let through = batch
        .plain(&rel.through)?
        .where_keys(rel.first_key.clone(), keys)
        .get()?;

    // Intermediate key to the owner key it points at
    let mut owners: IndexMap<String, String> = IndexMap::new();
    for item in &through {
        if let (Some(key), Some(owner)) = (
            item.key_index(&rel.second_local_key),
            item.key_index(&rel.first_key),
        ) {
            owners.insert(key, owner);
        }
    }

    let through_keys: IndexSet<String> = owners.keys().cloned().collect();
    let related = batch
        .related(&rel.related)?
        .where_keys(rel.second_key.clone(), through_keys)
        .get()?;

    let mut groups: IndexMap<String, Vec<Instance>> = IndexMap::new();
    for item in related {
        let owner = item
            .key_index(&rel.second_key)
            .and_then(|key| owners.get(&key));
        if let Some(owner) = owner {
            groups.entry(owner.clone()).or_default().push(item);
        }
    }

    for parent in parents.iter_mut() {
        let related = parent
            .key_index(&rel.local_key)
            .and_then(|key| groups.get(&key).cloned())
            .unwrap_or_default();
        batch.set_many(parent, related);
    }

    Ok(())
}
