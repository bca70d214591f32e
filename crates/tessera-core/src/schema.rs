//! Model definitions and the registry that resolves them by entity name.

mod attr;
pub use attr::{Attr, AttrKind, DefaultValue};

mod builder;
pub use builder::Builder;

mod field;
pub use field::Field;

mod model;
pub use model::{Model, DEFAULT_TYPE_KEY};

pub mod relation;
pub use relation::{
    BelongsTo, BelongsToMany, HasMany, HasManyBy, HasManyThrough, HasOne, MorphMany, MorphOne,
    MorphTo, MorphToMany, MorphedByMany, Relation,
};

#[allow(clippy::module_inception)]
mod schema;
pub use schema::Schema;
