use super::Batch;
use crate::{Instance, Result};
use tessera_core::{record::Keys, schema::relation::MorphTo};

use indexmap::{IndexMap, IndexSet};
use serde_json::Value;

/// Load each owner's polymorphic parent, running one sub-query per entity
/// named in the batch. Unregistered entity names resolve to nothing.
pub(super) fn load(
    batch: &Batch<'_, '_>,
    rel: &MorphTo,
    parents: &mut [&mut Instance],
) -> Result<()> {
    let id = Keys::from(rel.id.as_str());

    let mut wanted: IndexMap<String, IndexSet<String>> = IndexMap::new();
    for parent in parents.iter() {
        if let (Some(ty), Some(key)) = (
            parent.get(&rel.ty).and_then(Value::as_str),
            parent.key_index(&id),
        ) {
            wanted.entry(ty.to_string()).or_default().insert(key);
        }
    }

    let mut found: IndexMap<(String, String), Instance> = IndexMap::new();

    for (ty, keys) in wanted {
        let Some(model) = batch.cx.schema.get(&ty) else {
            tracing::warn!(
                entity = %batch.owner.entity,
                relation = batch.name,
                %ty,
                "polymorphic type is not registered"
            );
            continue;
        };

        let related = batch
            .related(&ty)?
            .where_keys(model.primary_key.clone(), keys)
            .get()?;

        for item in related {
            if let Some(key) = item.key_index(&model.primary_key) {
                found.entry((ty.clone(), key)).or_insert(item);
            }
        }
    }

    for parent in parents.iter_mut() {
        let related = match (
            parent.get(&rel.ty).and_then(Value::as_str),
            parent.key_index(&id),
        ) {
            (Some(ty), Some(key)) => found.get(&(ty.to_string(), key)).cloned(),
            _ => None,
        };
        batch.set_one(parent, related);
    }

    Ok(())
}
