use crate::value::{js_json, js_string};

use indexmap::IndexMap;
use serde_json::Value;

use std::fmt;

/// Name of the synthesized key holding a record's index id.
pub const INDEX_ID: &str = "$id";

/// A flat record: field name to plain JSON value.
pub type Record = serde_json::Map<String, Value>;

/// The flat table of one entity, keyed by index id.
pub type Records = IndexMap<String, Record>;

/// One or more field names acting together as a key.
///
/// Primary keys, foreign keys and owner keys are all `Keys`. A single field
/// reads and writes a plain value; several fields read and write an array of
/// per-field values in declaration order.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Keys(Vec<String>);

impl Keys {
    pub fn new(fields: impl IntoIterator<Item = impl Into<String>>) -> Keys {
        Keys(fields.into_iter().map(Into::into).collect())
    }

    pub fn fields(&self) -> &[String] {
        &self.0
    }

    /// An empty key is an unresolved default, filled in when the schema is
    /// built.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_composite(&self) -> bool {
        self.0.len() > 1
    }

    /// The single field name, if this key is not composite.
    pub fn as_single(&self) -> Option<&str> {
        match &self.0[..] {
            [field] => Some(field),
            _ => None,
        }
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.iter().any(|f| f == field)
    }

    /// Read the key value from a record. Missing or null components mean the
    /// key cannot be read.
    pub fn read(&self, record: &Record) -> Option<Value> {
        match &self.0[..] {
            [field] => record.get(field).filter(|v| !v.is_null()).cloned(),
            fields => fields
                .iter()
                .map(|field| record.get(field).filter(|v| !v.is_null()).cloned())
                .collect::<Option<Vec<_>>>()
                .map(Value::Array),
        }
    }

    /// Write a key value into a record. A composite key expects an array with
    /// one element per field; anything else is ignored.
    pub fn write(&self, record: &mut Record, value: Value) {
        match &self.0[..] {
            [field] => {
                record.insert(field.clone(), value);
            }
            fields => {
                if let Value::Array(values) = value {
                    for (field, value) in fields.iter().zip(values) {
                        record.insert(field.clone(), value);
                    }
                }
            }
        }
    }

    /// Returns `true` if any component is entirely absent from the record.
    /// An explicit `null` counts as present.
    pub fn is_absent(&self, record: &Record) -> bool {
        self.0.iter().any(|field| !record.contains_key(field))
    }

    /// The index key for this key's value in `record`, see [`index_key`].
    pub fn index_key(&self, record: &Record) -> Option<String> {
        self.read(record).map(|value| index_key(&value))
    }
}

/// Convert a key value into the string used to index it.
///
/// Scalars use their `String(value)` form and arrays (composite keys) their
/// compact JSON form, so `1`, `1.0` and `"1"` share the index key `"1"` and
/// `[1, 2]` indexes as `"[1,2]"`.
pub fn index_key(value: &Value) -> String {
    match value {
        Value::Array(_) => js_json(value),
        _ => js_string(value),
    }
}

/// Derive a record's index id from its primary key.
pub fn index_id(primary_key: &Keys, record: &Record) -> Option<String> {
    primary_key.index_key(record)
}

impl From<&str> for Keys {
    fn from(value: &str) -> Self {
        Keys(vec![value.to_string()])
    }
}

impl From<String> for Keys {
    fn from(value: String) -> Self {
        Keys(vec![value])
    }
}

impl<const N: usize> From<[&str; N]> for Keys {
    fn from(value: [&str; N]) -> Self {
        Keys::new(value)
    }
}

impl From<Vec<String>> for Keys {
    fn from(value: Vec<String>) -> Self {
        Keys(value)
    }
}

impl fmt::Debug for Keys {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_single() {
            Some(field) => write!(fmt, "{field:?}"),
            None => fmt.debug_list().entries(&self.0).finish(),
        }
    }
}

impl fmt::Display for Keys {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str(&self.0.join(", "))
    }
}
