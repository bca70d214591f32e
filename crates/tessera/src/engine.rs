//! Turning nested payloads into flat, per-entity record tables.

mod fill;
pub(crate) use fill::{fill, merge};

mod graph;
use graph::{Graph, NodeId, Slot};

mod normalize;
pub use normalize::{normalize, Normalized};
