use super::{Attr, Relation};

/// A model field: either a plain attribute or a relation.
#[derive(Debug, Clone)]
pub enum Field {
    Attr(Attr),
    Relation(Relation),
}

impl Field {
    pub fn is_relation(&self) -> bool {
        matches!(self, Field::Relation(_))
    }

    pub fn as_attr(&self) -> Option<&Attr> {
        match self {
            Field::Attr(attr) => Some(attr),
            _ => None,
        }
    }

    pub fn as_relation(&self) -> Option<&Relation> {
        match self {
            Field::Relation(relation) => Some(relation),
            _ => None,
        }
    }

    pub(crate) fn as_relation_mut(&mut self) -> Option<&mut Relation> {
        match self {
            Field::Relation(relation) => Some(relation),
            _ => None,
        }
    }
}

impl From<Attr> for Field {
    fn from(value: Attr) -> Self {
        Field::Attr(value)
    }
}

impl From<Relation> for Field {
    fn from(value: Relation) -> Self {
        Field::Relation(value)
    }
}

macro_rules! impl_from_relation {
    ( $( $ty:ident ),* ) => {
        $(
            impl From<super::$ty> for Field {
                fn from(value: super::$ty) -> Self {
                    Field::Relation(value.into())
                }
            }
        )*
    };
}

impl_from_relation!(
    HasOne,
    BelongsTo,
    HasMany,
    HasManyBy,
    HasManyThrough,
    BelongsToMany,
    MorphTo,
    MorphOne,
    MorphMany,
    MorphToMany,
    MorphedByMany
);
