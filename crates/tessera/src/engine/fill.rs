use tessera_core::record::{Record, INDEX_ID};
use tessera_core::schema::Model;
use tessera_core::Schema;

/// Produce the stored form of a normalized record: every attribute of its
/// concrete model coerced, relation fields and undeclared keys dropped, and
/// `$id` kept.
pub(crate) fn fill(schema: &Schema, model: &Model, record: &Record) -> Record {
    let model = schema.model_for_record(model, record);
    let mut out = Record::new();

    for (name, attr) in model.attrs() {
        out.insert(name.to_string(), attr.fill(record.get(name)));
    }

    if let Some(id) = record.get(INDEX_ID) {
        out.insert(INDEX_ID.to_string(), id.clone());
    }

    out
}

/// Apply the attributes present in `patch` on top of a stored record.
/// Fields absent from the patch keep their stored value.
pub(crate) fn merge(schema: &Schema, model: &Model, current: &Record, patch: &Record) -> Record {
    let mut candidate = current.clone();
    if let Some(ty) = patch.get(&model.type_key) {
        candidate.insert(model.type_key.clone(), ty.clone());
    }
    let model = schema.model_for_record(model, &candidate);

    let mut out = current.clone();
    for (name, attr) in model.attrs() {
        match patch.get(name) {
            Some(value) => {
                out.insert(name.to_string(), attr.fill(Some(value)));
            }
            None if !out.contains_key(name) => {
                out.insert(name.to_string(), attr.fill(None));
            }
            None => {}
        }
    }

    out
}
