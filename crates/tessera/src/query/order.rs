use crate::{Error, Instance};
use tessera_core::value::compare;

use serde_json::Value;
use std::{cmp::Ordering, str::FromStr};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

pub(crate) struct OrderBy<'a> {
    pub(crate) key: SortKey<'a>,
    pub(crate) direction: Direction,
}

pub(crate) enum SortKey<'a> {
    Field(String),
    Fn(Box<dyn Fn(&Instance) -> Value + 'a>),
}

impl SortKey<'_> {
    fn read(&self, instance: &Instance) -> Value {
        match self {
            SortKey::Field(field) => instance.field(field).unwrap_or(Value::Null),
            SortKey::Fn(f) => f(instance),
        }
    }
}

/// Stable multi-key sort; earlier keys take precedence.
pub(crate) fn sort(items: Vec<Instance>, orders: &[OrderBy<'_>]) -> Vec<Instance> {
    if orders.is_empty() {
        return items;
    }

    let mut keyed: Vec<(Vec<Value>, Instance)> = items
        .into_iter()
        .map(|item| {
            let keys = orders.iter().map(|order| order.key.read(&item)).collect();
            (keys, item)
        })
        .collect();

    keyed.sort_by(|(lhs, _), (rhs, _)| {
        for ((lhs, rhs), order) in lhs.iter().zip(rhs).zip(orders) {
            let ord = match order.direction {
                Direction::Asc => compare(lhs, rhs),
                Direction::Desc => compare(rhs, lhs),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });

    keyed.into_iter().map(|(_, item)| item).collect()
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Direction::Asc),
            "desc" => Ok(Direction::Desc),
            _ => Err(tessera_core::err!("invalid sort direction `{s}`; expected `asc` or `desc`")),
        }
    }
}
