use super::Error;

/// Error when a closure-form update is issued without a condition selecting
/// the records to mutate.
#[derive(Debug)]
pub(super) struct MissingConditionError {
    entity: Box<str>,
}

impl std::error::Error for MissingConditionError {}

impl core::fmt::Display for MissingConditionError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "missing condition: a closure update on `{}` needs a key or predicate",
            self.entity
        )
    }
}

impl Error {
    pub fn missing_condition(entity: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::MissingCondition(MissingConditionError {
            entity: entity.into().into(),
        }))
    }

    /// Returns `true` if this error is a missing condition error.
    pub fn is_missing_condition(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::MissingCondition(_))
    }
}
