use super::Error;
use serde_json::Value;

/// Error when a key value does not match the shape of a model's primary key:
/// an array given to a single-key model, or a scalar (or an array of the
/// wrong arity) given to a composite-key model.
#[derive(Debug)]
pub(super) struct MalformedKeyError {
    entity: Box<str>,
    value: Value,
    expected: &'static str,
}

impl std::error::Error for MalformedKeyError {}

impl core::fmt::Display for MalformedKeyError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "malformed key for `{}`: expected {}, got {}",
            self.entity, self.expected, self.value
        )
    }
}

impl Error {
    pub fn malformed_key(entity: impl Into<String>, value: Value, expected: &'static str) -> Error {
        Error::from(super::ErrorKind::MalformedKey(MalformedKeyError {
            entity: entity.into().into(),
            value,
            expected,
        }))
    }

    /// Returns `true` if this error is a malformed key error.
    pub fn is_malformed_key(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::MalformedKey(_))
    }
}
