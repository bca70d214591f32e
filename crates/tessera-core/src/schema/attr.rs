use crate::value::{js_string, number, parse_float, parse_int};

use serde_json::Value;

use std::{fmt, sync::Arc};

/// A plain (non-relation) field.
#[derive(Debug, Clone)]
pub struct Attr {
    /// How input values are coerced
    pub kind: AttrKind,

    /// Produced when the input is absent. For `Uid` attributes this is the id
    /// generator.
    pub default: DefaultValue,

    /// True if an explicit `null` input is kept as `null`
    pub nullable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrKind {
    /// Any JSON value, passed through untouched
    Value,
    String,
    Number,
    Boolean,
    /// Generated unique id
    Uid,
}

#[derive(Clone)]
pub enum DefaultValue {
    Value(Value),
    Factory(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl Attr {
    pub fn value(default: impl Into<Value>) -> Attr {
        Attr::new(AttrKind::Value, DefaultValue::Value(default.into()))
    }

    pub fn string(default: impl Into<Value>) -> Attr {
        Attr::new(AttrKind::String, DefaultValue::Value(default.into()))
    }

    pub fn number(default: impl Into<Value>) -> Attr {
        Attr::new(AttrKind::Number, DefaultValue::Value(default.into()))
    }

    pub fn boolean(default: impl Into<Value>) -> Attr {
        Attr::new(AttrKind::Boolean, DefaultValue::Value(default.into()))
    }

    /// A generated id, using random v4 UUID strings.
    pub fn uid() -> Attr {
        Attr::uid_with(|| Value::String(uuid::Uuid::new_v4().to_string()))
    }

    /// A generated id using a custom generator.
    pub fn uid_with(generate: impl Fn() -> Value + Send + Sync + 'static) -> Attr {
        Attr::new(AttrKind::Uid, DefaultValue::Factory(Arc::new(generate)))
    }

    fn new(kind: AttrKind, default: DefaultValue) -> Attr {
        Attr {
            kind,
            default,
            nullable: false,
        }
    }

    pub fn nullable(mut self) -> Attr {
        self.nullable = true;
        self
    }

    /// Replace the default with a factory evaluated on every fill.
    pub fn default_with(mut self, factory: impl Fn() -> Value + Send + Sync + 'static) -> Attr {
        self.default = DefaultValue::Factory(Arc::new(factory));
        self
    }

    pub fn default_value(&self) -> Value {
        match &self.default {
            DefaultValue::Value(value) => value.clone(),
            DefaultValue::Factory(factory) => factory(),
        }
    }

    /// Coerce an input value (or its absence) into a value of this
    /// attribute's kind.
    pub fn fill(&self, input: Option<&Value>) -> Value {
        let Some(value) = input else {
            return self.default_value();
        };

        if value.is_null() && self.nullable {
            return Value::Null;
        }

        match self.kind {
            AttrKind::Value => value.clone(),
            AttrKind::String => match value {
                Value::String(_) => value.clone(),
                value => Value::String(js_string(value)),
            },
            AttrKind::Number => match value {
                Value::Number(_) => value.clone(),
                Value::String(s) => match parse_float(s) {
                    Some(f) => number(f),
                    None => self.default_value(),
                },
                Value::Bool(b) => Value::from(u8::from(*b)),
                _ => Value::from(0),
            },
            AttrKind::Boolean => match value {
                Value::Bool(_) => value.clone(),
                Value::String(s) if s.is_empty() => Value::Bool(false),
                Value::String(s) => Value::Bool(parse_int(s).map_or(true, |n| n != 0)),
                Value::Number(n) => Value::Bool(n.as_f64().is_some_and(|f| f != 0.0)),
                _ => Value::Bool(false),
            },
            AttrKind::Uid => match value {
                Value::String(_) | Value::Number(_) => value.clone(),
                _ => self.default_value(),
            },
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Value(value) => fmt.debug_tuple("Value").field(value).finish(),
            DefaultValue::Factory(_) => fmt.write_str("Factory(..)"),
        }
    }
}
