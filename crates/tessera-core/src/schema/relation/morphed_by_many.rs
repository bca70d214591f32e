use super::*;

/// Polymorphic many-to-many, seen from the shared side: a tag's posts
/// through the same `taggables` pivot.
#[derive(Debug, Clone)]
pub struct MorphedByMany {
    pub related: String,

    pub pivot: String,

    /// Pivot field holding the owner's key
    pub related_id: String,

    /// Pivot field holding the related record's key
    pub id: String,

    /// Pivot field holding the related entity name
    pub ty: String,

    /// Defaults to the owner's primary key
    pub parent_key: Keys,

    /// Defaults to the related entity's primary key
    pub related_key: Keys,

    pub accessor: String,
}

impl MorphedByMany {
    pub fn new(
        related: impl Into<String>,
        pivot: impl Into<String>,
        related_id: impl Into<String>,
        id: impl Into<String>,
        ty: impl Into<String>,
    ) -> MorphedByMany {
        MorphedByMany {
            related: related.into(),
            pivot: pivot.into(),
            related_id: related_id.into(),
            id: id.into(),
            ty: ty.into(),
            parent_key: Keys::default(),
            related_key: Keys::default(),
            accessor: DEFAULT_ACCESSOR.to_string(),
        }
    }

    pub fn accessor(mut self, accessor: impl Into<String>) -> MorphedByMany {
        self.accessor = accessor.into();
        self
    }
}

impl From<MorphedByMany> for Relation {
    fn from(value: MorphedByMany) -> Self {
        Self::MorphedByMany(value)
    }
}
