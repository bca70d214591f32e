use super::*;

#[derive(Debug, Clone)]
pub struct MorphMany {
    pub related: String,

    /// Field on each related record holding the owner's key
    pub id: String,

    /// Field on each related record holding the owner's entity name
    pub ty: String,

    /// Defaults to the owner's primary key
    pub local_key: Keys,
}

impl MorphMany {
    pub fn new(
        related: impl Into<String>,
        id: impl Into<String>,
        ty: impl Into<String>,
    ) -> MorphMany {
        MorphMany {
            related: related.into(),
            id: id.into(),
            ty: ty.into(),
            local_key: Keys::default(),
        }
    }

    pub fn local_key(mut self, local_key: impl Into<Keys>) -> MorphMany {
        self.local_key = local_key.into();
        self
    }
}

impl From<MorphMany> for Relation {
    fn from(value: MorphMany) -> Self {
        Self::MorphMany(value)
    }
}
