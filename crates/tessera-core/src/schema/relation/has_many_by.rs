use super::*;

/// One-to-many where the owning record holds an array of the related keys.
#[derive(Debug, Clone)]
pub struct HasManyBy {
    /// Entity being referenced
    pub parent: String,

    /// Array field on the owning record
    pub foreign_key: String,

    /// Defaults to the parent's primary key
    pub owner_key: Keys,
}

impl HasManyBy {
    pub fn new(parent: impl Into<String>, foreign_key: impl Into<String>) -> HasManyBy {
        HasManyBy {
            parent: parent.into(),
            foreign_key: foreign_key.into(),
            owner_key: Keys::default(),
        }
    }

    pub fn owner_key(mut self, owner_key: impl Into<Keys>) -> HasManyBy {
        self.owner_key = owner_key.into();
        self
    }
}

impl From<HasManyBy> for Relation {
    fn from(value: HasManyBy) -> Self {
        Self::HasManyBy(value)
    }
}
