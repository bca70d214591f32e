mod belongs_to;
pub use belongs_to::BelongsTo;

mod belongs_to_many;
pub use belongs_to_many::BelongsToMany;

mod has_many;
pub use has_many::HasMany;

mod has_many_by;
pub use has_many_by::HasManyBy;

mod has_many_through;
pub use has_many_through::HasManyThrough;

mod has_one;
pub use has_one::HasOne;

mod morph_many;
pub use morph_many::MorphMany;

mod morph_one;
pub use morph_one::MorphOne;

mod morph_to;
pub use morph_to::MorphTo;

mod morph_to_many;
pub use morph_to_many::MorphToMany;

mod morphed_by_many;
pub use morphed_by_many::MorphedByMany;

use crate::record::Keys;

use serde_json::Value;

/// Default name of the field exposing a pivot record on related instances.
pub const DEFAULT_ACCESSOR: &str = "pivot";

/// A relationship between the owning model and another entity.
#[derive(Debug, Clone)]
pub enum Relation {
    HasOne(HasOne),
    BelongsTo(BelongsTo),
    HasMany(HasMany),
    HasManyBy(HasManyBy),
    HasManyThrough(HasManyThrough),
    BelongsToMany(BelongsToMany),
    MorphTo(MorphTo),
    MorphOne(MorphOne),
    MorphMany(MorphMany),
    MorphToMany(MorphToMany),
    MorphedByMany(MorphedByMany),
}

/// Pivot description shared by the many-to-many kinds.
#[derive(Debug, Clone, Copy)]
pub struct PivotRef<'a> {
    pub entity: &'a str,
    pub accessor: &'a str,
}

impl Relation {
    pub fn has_one(related: impl Into<String>, foreign_key: impl Into<Keys>) -> Relation {
        HasOne::new(related, foreign_key).into()
    }

    pub fn belongs_to(parent: impl Into<String>, foreign_key: impl Into<Keys>) -> Relation {
        BelongsTo::new(parent, foreign_key).into()
    }

    pub fn has_many(related: impl Into<String>, foreign_key: impl Into<Keys>) -> Relation {
        HasMany::new(related, foreign_key).into()
    }

    pub fn has_many_by(parent: impl Into<String>, foreign_key: impl Into<String>) -> Relation {
        HasManyBy::new(parent, foreign_key).into()
    }

    pub fn has_many_through(
        related: impl Into<String>,
        through: impl Into<String>,
        first_key: impl Into<Keys>,
        second_key: impl Into<Keys>,
    ) -> Relation {
        HasManyThrough::new(related, through, first_key, second_key).into()
    }

    pub fn belongs_to_many(
        related: impl Into<String>,
        pivot: impl Into<String>,
        foreign_pivot_key: impl Into<String>,
        related_pivot_key: impl Into<String>,
    ) -> Relation {
        BelongsToMany::new(related, pivot, foreign_pivot_key, related_pivot_key).into()
    }

    pub fn morph_to(id: impl Into<String>, ty: impl Into<String>) -> Relation {
        MorphTo::new(id, ty).into()
    }

    pub fn morph_one(
        related: impl Into<String>,
        id: impl Into<String>,
        ty: impl Into<String>,
    ) -> Relation {
        MorphOne::new(related, id, ty).into()
    }

    pub fn morph_many(
        related: impl Into<String>,
        id: impl Into<String>,
        ty: impl Into<String>,
    ) -> Relation {
        MorphMany::new(related, id, ty).into()
    }

    pub fn morph_to_many(
        related: impl Into<String>,
        pivot: impl Into<String>,
        related_id: impl Into<String>,
        id: impl Into<String>,
        ty: impl Into<String>,
    ) -> Relation {
        MorphToMany::new(related, pivot, related_id, id, ty).into()
    }

    pub fn morphed_by_many(
        related: impl Into<String>,
        pivot: impl Into<String>,
        related_id: impl Into<String>,
        id: impl Into<String>,
        ty: impl Into<String>,
    ) -> Relation {
        MorphedByMany::new(related, pivot, related_id, id, ty).into()
    }

    /// The entity this relation resolves to. `MorphTo` has no fixed target.
    pub fn related(&self) -> Option<&str> {
        match self {
            Relation::HasOne(rel) => Some(&rel.related),
            Relation::BelongsTo(rel) => Some(&rel.parent),
            Relation::HasMany(rel) => Some(&rel.related),
            Relation::HasManyBy(rel) => Some(&rel.parent),
            Relation::HasManyThrough(rel) => Some(&rel.related),
            Relation::BelongsToMany(rel) => Some(&rel.related),
            Relation::MorphTo(_) => None,
            Relation::MorphOne(rel) => Some(&rel.related),
            Relation::MorphMany(rel) => Some(&rel.related),
            Relation::MorphToMany(rel) => Some(&rel.related),
            Relation::MorphedByMany(rel) => Some(&rel.related),
        }
    }

    /// Returns `true` if the relation resolves to a collection.
    pub fn is_plural(&self) -> bool {
        matches!(
            self,
            Relation::HasMany(_)
                | Relation::HasManyBy(_)
                | Relation::HasManyThrough(_)
                | Relation::BelongsToMany(_)
                | Relation::MorphMany(_)
                | Relation::MorphToMany(_)
                | Relation::MorphedByMany(_)
        )
    }

    pub fn pivot(&self) -> Option<PivotRef<'_>> {
        match self {
            Relation::BelongsToMany(rel) => Some(PivotRef {
                entity: &rel.pivot,
                accessor: &rel.accessor,
            }),
            Relation::MorphToMany(rel) => Some(PivotRef {
                entity: &rel.pivot,
                accessor: &rel.accessor,
            }),
            Relation::MorphedByMany(rel) => Some(PivotRef {
                entity: &rel.pivot,
                accessor: &rel.accessor,
            }),
            _ => None,
        }
    }

    /// Every entity name this relation refers to, including pivot and
    /// intermediate entities.
    pub fn entities(&self) -> Vec<&str> {
        let mut entities: Vec<&str> = self.related().into_iter().collect();
        match self {
            Relation::HasManyThrough(rel) => entities.push(&rel.through),
            Relation::BelongsToMany(rel) => entities.push(&rel.pivot),
            Relation::MorphToMany(rel) => entities.push(&rel.pivot),
            Relation::MorphedByMany(rel) => entities.push(&rel.pivot),
            _ => {}
        }
        entities
    }

    /// Coerce an absent or malformed nested value into the relation's empty
    /// shape: `null` for singular relations, `[]` for plural ones.
    pub fn fill(&self, raw: Option<&Value>) -> Value {
        match raw {
            Some(value @ Value::Array(_)) if self.is_plural() => value.clone(),
            Some(value @ Value::Object(_)) if !self.is_plural() => value.clone(),
            _ if self.is_plural() => Value::Array(vec![]),
            _ => Value::Null,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Relation::HasOne(_) => "has_one",
            Relation::BelongsTo(_) => "belongs_to",
            Relation::HasMany(_) => "has_many",
            Relation::HasManyBy(_) => "has_many_by",
            Relation::HasManyThrough(_) => "has_many_through",
            Relation::BelongsToMany(_) => "belongs_to_many",
            Relation::MorphTo(_) => "morph_to",
            Relation::MorphOne(_) => "morph_one",
            Relation::MorphMany(_) => "morph_many",
            Relation::MorphToMany(_) => "morph_to_many",
            Relation::MorphedByMany(_) => "morphed_by_many",
        }
    }
}
