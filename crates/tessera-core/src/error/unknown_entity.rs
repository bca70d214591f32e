use super::Error;

/// Error when a query, relation, or discriminator names an entity that is not
/// registered with the schema.
#[derive(Debug)]
pub(super) struct UnknownEntityError {
    entity: Box<str>,
    referenced_by: Option<Box<str>>,
}

impl std::error::Error for UnknownEntityError {}

impl core::fmt::Display for UnknownEntityError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "unknown entity `{}`", self.entity)?;
        if let Some(ref by) = self.referenced_by {
            write!(f, " (referenced by `{}`)", by)?;
        }
        Ok(())
    }
}

impl Error {
    pub fn unknown_entity(entity: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::UnknownEntity(UnknownEntityError {
            entity: entity.into().into(),
            referenced_by: None,
        }))
    }

    /// Unknown entity referenced from a model field, e.g. `posts.author`.
    pub fn unknown_entity_in(entity: impl Into<String>, referenced_by: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::UnknownEntity(UnknownEntityError {
            entity: entity.into().into(),
            referenced_by: Some(referenced_by.into().into()),
        }))
    }

    /// Returns `true` if this error is an unknown entity error.
    pub fn is_unknown_entity(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::UnknownEntity(_))
    }
}
