use super::*;

#[derive(Debug, Clone)]
pub struct HasMany {
    /// Entity holding the foreign key
    pub related: String,

    /// Field(s) on each related record pointing back at the owner
    pub foreign_key: Keys,

    /// Defaults to the owner's primary key
    pub local_key: Keys,
}

impl HasMany {
    pub fn new(related: impl Into<String>, foreign_key: impl Into<Keys>) -> HasMany {
        HasMany {
            related: related.into(),
            foreign_key: foreign_key.into(),
            local_key: Keys::default(),
        }
    }

    pub fn local_key(mut self, local_key: impl Into<Keys>) -> HasMany {
        self.local_key = local_key.into();
        self
    }
}

impl From<HasMany> for Relation {
    fn from(value: HasMany) -> Self {
        Self::HasMany(value)
    }
}
