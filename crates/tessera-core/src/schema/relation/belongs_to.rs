use super::*;

/// Inverse side of a one-to-one or one-to-many: the owning record carries the
/// foreign key.
#[derive(Debug, Clone)]
pub struct BelongsTo {
    /// Entity being referenced
    pub parent: String,

    /// Field(s) on the owning record
    pub foreign_key: Keys,

    /// Parent field(s) the foreign key references. Defaults to the parent's
    /// primary key.
    pub owner_key: Keys,
}

impl BelongsTo {
    pub fn new(parent: impl Into<String>, foreign_key: impl Into<Keys>) -> BelongsTo {
        BelongsTo {
            parent: parent.into(),
            foreign_key: foreign_key.into(),
            owner_key: Keys::default(),
        }
    }

    pub fn owner_key(mut self, owner_key: impl Into<Keys>) -> BelongsTo {
        self.owner_key = owner_key.into();
        self
    }
}

impl From<BelongsTo> for Relation {
    fn from(value: BelongsTo) -> Self {
        Self::BelongsTo(value)
    }
}
