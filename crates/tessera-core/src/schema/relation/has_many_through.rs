use super::*;

/// Distant one-to-many through an intermediate entity, e.g. a country's posts
/// through its users.
#[derive(Debug, Clone)]
pub struct HasManyThrough {
    pub related: String,

    /// Intermediate entity
    pub through: String,

    /// Field(s) on the intermediate record pointing at the owner
    pub first_key: Keys,

    /// Field(s) on the related record pointing at the intermediate record
    pub second_key: Keys,

    /// Defaults to the owner's primary key
    pub local_key: Keys,

    /// Defaults to the intermediate entity's primary key
    pub second_local_key: Keys,
}

impl HasManyThrough {
    pub fn new(
        related: impl Into<String>,
        through: impl Into<String>,
        first_key: impl Into<Keys>,
        second_key: impl Into<Keys>,
    ) -> HasManyThrough {
        HasManyThrough {
            related: related.into(),
            through: through.into(),
            first_key: first_key.into(),
            second_key: second_key.into(),
            local_key: Keys::default(),
            second_local_key: Keys::default(),
        }
    }

    pub fn local_key(mut self, local_key: impl Into<Keys>) -> HasManyThrough {
        self.local_key = local_key.into();
        self
    }

    pub fn second_local_key(mut self, second_local_key: impl Into<Keys>) -> HasManyThrough {
        self.second_local_key = second_local_key.into();
        self
    }
}

impl From<HasManyThrough> for Relation {
    fn from(value: HasManyThrough) -> Self {
        Self::HasManyThrough(value)
    }
}
