use super::*;

/// Polymorphic inverse: the owning record names both the related entity and
/// its key.
#[derive(Debug, Clone)]
pub struct MorphTo {
    /// Field holding the related record's primary key
    pub id: String,

    /// Field holding the related entity name
    pub ty: String,
}

impl MorphTo {
    pub fn new(id: impl Into<String>, ty: impl Into<String>) -> MorphTo {
        MorphTo {
            id: id.into(),
            ty: ty.into(),
        }
    }
}

impl From<MorphTo> for Relation {
    fn from(value: MorphTo) -> Self {
        Self::MorphTo(value)
    }
}
