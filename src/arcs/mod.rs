//! Packed arc storage and signed arc references.
//!
//! Every arc of a dataset lives in one set of parallel coordinate buffers.
//! Paths refer to arcs through [`ArcId`], which also records the direction
//! of travel, so a boundary shared by two polygons is stored once.

mod arc_id;
mod iter;
mod store;

pub use arc_id::ArcId;
pub use iter::ArcPoints;
pub use store::ArcStore;
