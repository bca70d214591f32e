use crate::Instance;
use tessera_core::{
    record::{index_key, Keys, INDEX_ID},
    schema::Model,
    value::same,
};

use indexmap::IndexSet;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Boolean {
    And,
    Or,
}

pub(crate) struct Where<'a> {
    pub(crate) boolean: Boolean,
    pub(crate) test: Test<'a>,
}

pub(crate) enum Test<'a> {
    /// Strict equality against a field
    Eq { field: String, value: Value },

    /// Field equals any of the values
    In { field: String, values: Vec<Value> },

    /// Caller predicate over a field value (`null` when absent)
    Field {
        field: String,
        predicate: Box<dyn Fn(&Value) -> bool + 'a>,
    },

    /// Caller predicate over the whole instance
    Instance(Box<dyn Fn(&Instance) -> bool + 'a>),

    /// Index key formed by `keys` is in the allow-list
    Keys { keys: Keys, ids: IndexSet<String> },
}

impl Where<'_> {
    pub(crate) fn eval(&self, instance: &Instance) -> bool {
        match &self.test {
            Test::Eq { field, value } => instance
                .field(field)
                .is_some_and(|actual| same(&actual, value)),
            Test::In { field, values } => instance
                .field(field)
                .is_some_and(|actual| values.iter().any(|value| same(&actual, value))),
            Test::Field { field, predicate } => {
                predicate(&instance.field(field).unwrap_or(Value::Null))
            }
            Test::Instance(predicate) => predicate(instance),
            Test::Keys { keys, ids } => instance
                .key_index(keys)
                .is_some_and(|key| ids.contains(&key)),
        }
    }
}

/// Evaluate the clause list against one instance.
///
/// The `AND` clauses form one group that passes when all of them pass, the
/// `OR` clauses another that passes when any of them does. The instance is
/// kept if any present group passes, so `where a OR where b` mixed with
/// `where c` reads as `(c) OR (a OR b)`.
pub(crate) fn matches(wheres: &[&Where<'_>], instance: &Instance) -> bool {
    if wheres.is_empty() {
        return true;
    }

    let mut ands = wheres.iter().filter(|w| w.boolean == Boolean::And).peekable();
    let mut ors = wheres.iter().filter(|w| w.boolean == Boolean::Or).peekable();

    let and_group = ands.peek().is_some() && ands.all(|w| w.eval(instance));
    let or_group = ors.peek().is_some() && ors.any(|w| w.eval(instance));

    and_group || or_group
}

/// Candidate index ids when every clause is an `AND` and at least one of
/// them constrains the primary key (or `$id`). Returns `None` when a full
/// scan is needed.
pub(crate) fn id_filter(model: &Model, wheres: &[&Where<'_>]) -> Option<IndexSet<String>> {
    if wheres.iter().any(|w| w.boolean == Boolean::Or) {
        return None;
    }

    let is_id_field =
        |field: &str| field == INDEX_ID || model.primary_key.as_single() == Some(field);

    let mut filter: Option<IndexSet<String>> = None;

    for w in wheres {
        let ids: IndexSet<String> = match &w.test {
            Test::Eq { field, value } if is_id_field(field) => {
                IndexSet::from([index_key(value)])
            }
            Test::In { field, values } if is_id_field(field) => {
                values.iter().map(index_key).collect()
            }
            Test::Keys { keys, ids }
                if keys.as_single() == Some(INDEX_ID) || *keys == model.primary_key =>
            {
                ids.clone()
            }
            _ => continue,
        };

        filter = Some(match filter {
            None => ids,
            Some(current) => current.intersection(&ids).cloned().collect(),
        });
    }

    filter
}
