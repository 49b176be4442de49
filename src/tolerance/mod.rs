//! Geometric predicates and coordinate conditioning.
//!
//! Predicates are exact floating-point tests unless a function takes an
//! explicit tolerance parameter.

mod predicates;
mod snap;

pub use predicates::{
    cross3, orient2d, segment_hit, segment_intersection, Crossing, Orientation, PARALLEL_EPSILON,
};
pub use snap::{auto_snap_interval, remove_repeated_points, snap_to_grid, AUTO_SNAP_FACTOR};
