use super::*;

/// Many-to-many through a pivot entity holding both foreign keys.
#[derive(Debug, Clone)]
pub struct BelongsToMany {
    pub related: String,

    /// Join entity
    pub pivot: String,

    /// Pivot field holding the owner's key
    pub foreign_pivot_key: String,

    /// Pivot field holding the related record's key
    pub related_pivot_key: String,

    /// Defaults to the owner's primary key
    pub parent_key: Keys,

    /// Defaults to the related entity's primary key
    pub related_key: Keys,

    /// Field on each related instance exposing its pivot record
    pub accessor: String,
}

impl BelongsToMany {
    pub fn new(
        related: impl Into<String>,
        pivot: impl Into<String>,
        foreign_pivot_key: impl Into<String>,
        related_pivot_key: impl Into<String>,
    ) -> BelongsToMany {
        BelongsToMany {
            related: related.into(),
            pivot: pivot.into(),
            foreign_pivot_key: foreign_pivot_key.into(),
            related_pivot_key: related_pivot_key.into(),
            parent_key: Keys::default(),
            related_key: Keys::default(),
            accessor: DEFAULT_ACCESSOR.to_string(),
        }
    }

    pub fn parent_key(mut self, parent_key: impl Into<Keys>) -> BelongsToMany {
        self.parent_key = parent_key.into();
        self
    }

    pub fn related_key(mut self, related_key: impl Into<Keys>) -> BelongsToMany {
        self.related_key = related_key.into();
        self
    }

    pub fn accessor(mut self, accessor: impl Into<String>) -> BelongsToMany {
        self.accessor = accessor.into();
        self
    }
}

impl From<BelongsToMany> for Relation {
    fn from(value: BelongsToMany) -> Self {
        Self::BelongsToMany(value)
    }
}
