use super::Error;

/// Error when `normalize` receives a root payload that is neither an object
/// nor an array of objects.
#[derive(Debug)]
pub(super) struct InvalidPayloadError {
    entity: Box<str>,
    found: &'static str,
}

impl std::error::Error for InvalidPayloadError {}

impl core::fmt::Display for InvalidPayloadError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "invalid payload for `{}`: expected an object or an array of objects, found {}",
            self.entity, self.found
        )
    }
}

impl Error {
    /// Creates an invalid payload error. `found` names the JSON kind that was
    /// received instead of an object.
    pub fn invalid_payload(entity: impl Into<String>, found: &'static str) -> Error {
        Error::from(super::ErrorKind::InvalidPayload(InvalidPayloadError {
            entity: entity.into().into(),
            found,
        }))
    }

    /// Returns `true` if this error is an invalid payload error.
    pub fn is_invalid_payload(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::InvalidPayload(_))
    }
}
