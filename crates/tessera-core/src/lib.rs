mod error;
pub use error::{Error, IntoError};

pub mod record;
pub use record::{Keys, Record, Records};

pub mod schema;
pub use schema::Schema;

pub mod value;

/// A Result type alias that uses Tessera's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;
