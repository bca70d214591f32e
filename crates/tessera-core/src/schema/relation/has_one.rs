use super::*;

/// One-to-one where the related record carries the foreign key.
#[derive(Debug, Clone)]
pub struct HasOne {
    /// Entity holding the foreign key
    pub related: String,

    /// Field(s) on the related record pointing back at the owner
    pub foreign_key: Keys,

    /// Owner field(s) the foreign key references. Defaults to the owner's
    /// primary key.
    pub local_key: Keys,
}

impl HasOne {
    pub fn new(related: impl Into<String>, foreign_key: impl Into<Keys>) -> HasOne {
        HasOne {
            related: related.into(),
            foreign_key: foreign_key.into(),
            local_key: Keys::default(),
        }
    }

    pub fn local_key(mut self, local_key: impl Into<Keys>) -> HasOne {
        self.local_key = local_key.into();
        self
    }
}

impl From<HasOne> for Relation {
    fn from(value: HasOne) -> Self {
        Self::HasOne(value)
    }
}
