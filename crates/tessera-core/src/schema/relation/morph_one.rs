use super::*;

#[derive(Debug, Clone)]
pub struct MorphOne {
    pub related: String,

    /// Field on the related record holding the owner's key
    pub id: String,

    /// Field on the related record holding the owner's entity name
    pub ty: String,

    /// Defaults to the owner's primary key
    pub local_key: Keys,
}

impl MorphOne {
    pub fn new(
        related: impl Into<String>,
        id: impl Into<String>,
        ty: impl Into<String>,
    ) -> MorphOne {
        MorphOne {
            related: related.into(),
            id: id.into(),
            ty: ty.into(),
            local_key: Keys::default(),
        }
    }

    pub fn local_key(mut self, local_key: impl Into<Keys>) -> MorphOne {
        self.local_key = local_key.into();
        self
    }
}

impl From<MorphOne> for Relation {
    fn from(value: MorphOne) -> Self {
        Self::MorphOne(value)
    }
}
