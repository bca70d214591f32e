use super::Error;

/// Error when a model definition is invalid.
///
/// This occurs when:
/// - A primary key component names a relation or an undeclared field
/// - A relation omits a key that cannot be defaulted (composite primary key)
/// - An entity is registered twice, or subtypes form an inheritance cycle
///
/// These errors are caught when the schema is built, before any record is
/// normalized.
#[derive(Debug)]
pub(super) struct InvalidSchema {
    message: Box<str>,
}

impl std::error::Error for InvalidSchema {}

impl core::fmt::Display for InvalidSchema {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid schema: {}", self.message)
    }
}

impl Error {
    pub fn invalid_schema(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidSchema(InvalidSchema {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is an invalid schema error.
    pub fn is_invalid_schema(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::InvalidSchema(_))
    }
}
