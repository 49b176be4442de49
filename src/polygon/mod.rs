//! Polygon rings expressed as arc paths.
//!
//! Measures and containment tests read every vertex of an arc, ignoring
//! the retained simplification interval.

mod index;
mod ring;

pub use index::RingIndex;
pub use ring::{
    arc_sample_point, path_area, path_bounds, path_vertices, point_in_ring, ring_area,
    winding_number,
};
