//! Reading records back out of the store.

mod cx;
pub(crate) use cx::Cx;

mod eager;

mod filter;
use filter::{Boolean, Test, Where};

mod has;
pub use has::Count;
use has::Has;

mod order;
pub use order::Direction;
use order::{OrderBy, SortKey};

use crate::{hooks::Event, Instance, Result};
use tessera_core::{
    record::{index_key, Keys, Record, INDEX_ID},
    schema::Model,
    Schema,
};

use indexmap::{IndexMap, IndexSet};
use serde_json::Value;
use std::rc::Rc;

/// Adjusts a relation's sub-query during eager loading.
pub type Constraint<'a> = Rc<dyn Fn(Query<'a>) -> Query<'a> + 'a>;

/// A query over one entity.
///
/// Builder methods consume and return the query. Terminal methods borrow it,
/// so a built query can be run several times.
pub struct Query<'a> {
    cx: Cx<'a>,
    model: &'a Model,
    wheres: Vec<Where<'a>>,
    orders: Vec<OrderBy<'a>>,
    offset: usize,
    limit: Option<usize>,
    eager: IndexMap<String, Vec<Constraint<'a>>>,
    has: Vec<Has<'a>>,
}

impl<'a> Query<'a> {
    pub(crate) fn new(cx: Cx<'a>, model: &'a Model) -> Query<'a> {
        Query {
            cx,
            model,
            wheres: vec![],
            orders: vec![],
            offset: 0,
            limit: None,
            eager: IndexMap::new(),
            has: vec![],
        }
    }

    pub fn model(&self) -> &'a Model {
        self.model
    }

    pub fn where_eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(
            Boolean::And,
            Test::Eq {
                field: field.into(),
                value: value.into(),
            },
        )
    }

    pub fn or_where_eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(
            Boolean::Or,
            Test::Eq {
                field: field.into(),
                value: value.into(),
            },
        )
    }

    pub fn where_in<V: Into<Value>>(
        self,
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.push(
            Boolean::And,
            Test::In {
                field: field.into(),
                values: values.into_iter().map(Into::into).collect(),
            },
        )
    }

    pub fn or_where_in<V: Into<Value>>(
        self,
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.push(
            Boolean::Or,
            Test::In {
                field: field.into(),
                values: values.into_iter().map(Into::into).collect(),
            },
        )
    }

    /// Filter on a predicate over one field. Absent fields read as `null`.
    pub fn where_fn(
        self,
        field: impl Into<String>,
        predicate: impl Fn(&Value) -> bool + 'a,
    ) -> Self {
        self.push(
            Boolean::And,
            Test::Field {
                field: field.into(),
                predicate: Box::new(predicate),
            },
        )
    }

    pub fn or_where_fn(
        self,
        field: impl Into<String>,
        predicate: impl Fn(&Value) -> bool + 'a,
    ) -> Self {
        self.push(
            Boolean::Or,
            Test::Field {
                field: field.into(),
                predicate: Box::new(predicate),
            },
        )
    }

    pub fn where_record(self, predicate: impl Fn(&Instance) -> bool + 'a) -> Self {
        self.push(Boolean::And, Test::Instance(Box::new(predicate)))
    }

    pub fn or_where_record(self, predicate: impl Fn(&Instance) -> bool + 'a) -> Self {
        self.push(Boolean::Or, Test::Instance(Box::new(predicate)))
    }

    /// Match the record whose primary key is `key`. Composite keys are given
    /// as an array of per-field values.
    pub fn where_id(self, key: impl Into<Value>) -> Self {
        let ids = IndexSet::from([index_key(&key.into())]);
        self.where_keys(Keys::from(INDEX_ID), ids)
    }

    pub fn where_id_in<V: Into<Value>>(self, keys: impl IntoIterator<Item = V>) -> Self {
        let ids = keys.into_iter().map(|key| index_key(&key.into())).collect();
        self.where_keys(Keys::from(INDEX_ID), ids)
    }

    /// Keep records whose index key formed by `keys` is one of `ids`.
    pub(crate) fn where_keys(self, keys: Keys, ids: IndexSet<String>) -> Self {
        self.push(Boolean::And, Test::Keys { keys, ids })
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.orders.push(OrderBy {
            key: SortKey::Field(field.into()),
            direction,
        });
        self
    }

    pub fn order_by_fn(
        mut self,
        key: impl Fn(&Instance) -> Value + 'a,
        direction: Direction,
    ) -> Self {
        self.orders.push(OrderBy {
            key: SortKey::Fn(Box::new(key)),
            direction,
        });
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Keep records with at least one related record.
    pub fn has(self, relation: impl Into<String>) -> Self {
        self.has_count(relation, Count::default())
    }

    pub fn has_count(mut self, relation: impl Into<String>, count: impl Into<Count>) -> Self {
        self.has.push(Has {
            relation: relation.into(),
            count: count.into(),
            constraint: None,
            exists: true,
        });
        self
    }

    /// Keep records with no related record.
    pub fn has_not(mut self, relation: impl Into<String>) -> Self {
        self.has.push(Has {
            relation: relation.into(),
            count: Count::default(),
            constraint: None,
            exists: false,
        });
        self
    }

    /// Keep records with at least one related record passing `constraint`.
    pub fn where_has(
        mut self,
        relation: impl Into<String>,
        constraint: impl Fn(Query<'a>) -> Query<'a> + 'a,
    ) -> Self {
        self.has.push(Has {
            relation: relation.into(),
            count: Count::default(),
            constraint: Some(Rc::new(constraint)),
            exists: true,
        });
        self
    }

    pub fn where_has_not(
        mut self,
        relation: impl Into<String>,
        constraint: impl Fn(Query<'a>) -> Query<'a> + 'a,
    ) -> Self {
        self.has.push(Has {
            relation: relation.into(),
            count: Count::default(),
            constraint: Some(Rc::new(constraint)),
            exists: false,
        });
        self
    }

    pub(crate) fn has_orders(&self) -> bool {
        !self.orders.is_empty()
    }

    fn push(mut self, boolean: Boolean, test: Test<'a>) -> Self {
        self.wheres.push(Where { boolean, test });
        self
    }

    /// Run the query, loading requested relations.
    pub fn get(&self) -> Result<Vec<Instance>> {
        let mut items = self.collect()?;
        self.load(&mut items)?;
        Ok(items)
    }

    /// Same as [`Query::get`].
    pub fn all(&self) -> Result<Vec<Instance>> {
        self.get()
    }

    pub fn first(&self) -> Result<Option<Instance>> {
        let item = self.collect()?.into_iter().next();
        self.load_one(item)
    }

    pub fn last(&self) -> Result<Option<Instance>> {
        let item = self.collect()?.pop();
        self.load_one(item)
    }

    /// Find by primary key. Composite keys accept an array of per-field
    /// values or an index id string.
    pub fn find(self, key: impl Into<Value>) -> Result<Option<Instance>> {
        let id = self.model.key_id(&key.into())?;
        self.where_keys(Keys::from(INDEX_ID), IndexSet::from([id]))
            .first()
    }

    pub fn find_in<V: Into<Value>>(
        self,
        keys: impl IntoIterator<Item = V>,
    ) -> Result<Vec<Instance>> {
        let ids = keys
            .into_iter()
            .map(|key| self.model.key_id(&key.into()))
            .collect::<Result<IndexSet<_>>>()?;
        self.where_keys(Keys::from(INDEX_ID), ids).get()
    }

    pub fn count(&self) -> Result<usize> {
        Ok(self.collect()?.len())
    }

    pub fn exists(&self) -> Result<bool> {
        Ok(self.count()? > 0)
    }

    /// Largest numeric value of `field`; `0` when there is none.
    pub fn max(&self, field: &str) -> Result<f64> {
        Ok(self.numbers(field)?.into_iter().reduce(f64::max).unwrap_or(0.0))
    }

    /// Smallest numeric value of `field`; `0` when there is none.
    pub fn min(&self, field: &str) -> Result<f64> {
        Ok(self.numbers(field)?.into_iter().reduce(f64::min).unwrap_or(0.0))
    }

    /// Sum of the numeric values of `field`. Other values are skipped.
    pub fn sum(&self, field: &str) -> Result<f64> {
        Ok(self.numbers(field)?.into_iter().sum())
    }

    fn numbers(&self, field: &str) -> Result<Vec<f64>> {
        Ok(self
            .collect()?
            .iter()
            .filter_map(|item| item.get(field).and_then(Value::as_f64))
            .collect())
    }

    fn load_one(&self, item: Option<Instance>) -> Result<Option<Instance>> {
        let Some(item) = item else {
            return Ok(None);
        };
        let mut items = vec![item];
        self.load(&mut items)?;
        Ok(items.pop())
    }

    /// Select, filter, sort and slice, without loading relations.
    fn collect(&self) -> Result<Vec<Instance>> {
        let entity = self.model.entity.as_str();
        let hooks = self.cx.hooks;

        // `has` constraints hold regardless of how the clauses are grouped
        let allowed = self.resolve_has()?;
        let wheres: Vec<&Where<'a>> = self.wheres.iter().collect();
        let lookup: Vec<&Where<'a>> = wheres.iter().copied().chain(allowed.as_ref()).collect();

        let items = self.candidates(&lookup);
        let candidates = items.len();

        let items = hooks.run_select(Event::BeforeSelect, entity, items);
        let items = items
            .into_iter()
            .filter(|item| allowed.as_ref().map_or(true, |allowed| allowed.eval(item)))
            .filter(|item| filter::matches(&wheres, item))
            .collect();
        let items = hooks.run_select(Event::AfterWhere, entity, items);

        let items = order::sort(items, &self.orders);
        let items = hooks.run_select(Event::AfterOrderBy, entity, items);

        let items = items
            .into_iter()
            .skip(self.offset)
            .take(self.limit.unwrap_or(usize::MAX))
            .collect();
        let items = hooks.run_select(Event::AfterLimit, entity, items);

        tracing::debug!(entity, candidates, results = items.len(), "query");
        Ok(items)
    }

    /// Hydrate the records that may match, using the primary key index when
    /// the clauses allow it.
    fn candidates(&self, wheres: &[&Where<'a>]) -> Vec<Instance> {
        let Some(records) = self.cx.records(self.model) else {
            return vec![];
        };

        let selected: Vec<&Record> = match filter::id_filter(self.model, wheres) {
            Some(ids) => {
                tracing::trace!(entity = %self.model.entity, ids = ids.len(), "primary key lookup");

                // Keep store order so both paths yield the same sequence
                let mut hits: Vec<(usize, &Record)> = ids
                    .iter()
                    .filter_map(|id| records.get_full(id).map(|(i, _, record)| (i, record)))
                    .collect();
                hits.sort_by_key(|(i, _)| *i);
                hits.into_iter().map(|(_, record)| record).collect()
            }
            None => records.values().collect(),
        };

        let schema = self.cx.schema;

        selected
            .into_iter()
            .filter(|record| in_scope(schema, self.model, record))
            .map(|record| Instance::hydrate(schema.model_for_record(self.model, record), record))
            .collect()
    }

    /// Turn `has` constraints into an index id allow-list.
    fn resolve_has(&self) -> Result<Option<Where<'a>>> {
        if self.has.is_empty() {
            return Ok(None);
        }

        let mut allowed: Option<IndexSet<String>> = None;

        for has in &self.has {
            let mut query = Query::new(self.cx, self.model);
            query.add_eager(&has.relation, has.constraint.clone());

            let ids: IndexSet<String> = query
                .get()?
                .into_iter()
                .filter(|item| {
                    let n = item.related(&has.relation).map_or(0, |related| related.len());
                    has.count.matches(n) == has.exists
                })
                .filter_map(|item| item.id().map(str::to_string))
                .collect();

            allowed = Some(match allowed {
                None => ids,
                Some(current) => current.intersection(&ids).cloned().collect(),
            });
        }

        Ok(allowed.map(|ids| Where {
            boolean: Boolean::And,
            test: Test::Keys {
                keys: Keys::from(INDEX_ID),
                ids,
            },
        }))
    }
}

/// Returns `true` if a stored record belongs to `model`: always for a root
/// model, and for a subtype only when the record dispatches to it or one of
/// its own subtypes.
pub(crate) fn in_scope(schema: &Schema, model: &Model, record: &Record) -> bool {
    if !model.is_subtype() {
        return true;
    }
    let root = schema.root_model(model);
    schema.is_kind_of(schema.model_for_record(root, record), &model.entity)
}
