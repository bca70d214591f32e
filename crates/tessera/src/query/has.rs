use super::Constraint;
use crate::Error;

use std::str::FromStr;

/// How many related records a `has` constraint requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Count {
    Eq(usize),
    Ne(usize),
    Gt(usize),
    Ge(usize),
    Lt(usize),
    Le(usize),
}

impl Count {
    pub fn matches(self, n: usize) -> bool {
        match self {
            Count::Eq(count) => n == count,
            Count::Ne(count) => n != count,
            Count::Gt(count) => n > count,
            Count::Ge(count) => n >= count,
            Count::Lt(count) => n < count,
            Count::Le(count) => n <= count,
        }
    }
}

impl Default for Count {
    /// At least one.
    fn default() -> Self {
        Count::Ge(1)
    }
}

/// A bare number means "at least".
impl From<usize> for Count {
    fn from(value: usize) -> Self {
        Count::Ge(value)
    }
}

impl FromStr for Count {
    type Err = Error;

    /// Parse `"2"`, `">= 2"`, `"=2"`, `"== 2"`, `"!= 0"`, `"<3"` and so on.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| tessera_core::err!("invalid count `{s}`; expected a number"))?;
        let (op, n) = s.split_at(split);

        let n: usize = n
            .trim()
            .parse()
            .map_err(|_| tessera_core::err!("invalid count `{s}`"))?;

        match op.trim() {
            "" | ">=" => Ok(Count::Ge(n)),
            "=" | "==" | "===" => Ok(Count::Eq(n)),
            "!=" | "!==" | "<>" => Ok(Count::Ne(n)),
            ">" => Ok(Count::Gt(n)),
            "<" => Ok(Count::Lt(n)),
            "<=" => Ok(Count::Le(n)),
            op => Err(tessera_core::err!("invalid count operator `{op}`")),
        }
    }
}

/// A relationship existence constraint.
pub(crate) struct Has<'a> {
    pub(crate) relation: String,
    pub(crate) count: Count,
    pub(crate) constraint: Option<Constraint<'a>>,

    /// `false` keeps the records that do *not* satisfy the count
    pub(crate) exists: bool,
}
