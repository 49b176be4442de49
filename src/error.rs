//! Error types for arc graph operations.
//!
//! Geometric degeneracies (collapsed rings, dead-end traces, snapped
//! intersections) are not errors; they are counted in the report returned
//! by the operation that met them.

use thiserror::Error;

/// Errors raised by arc graph operations.
///
/// Structural variants signal an internal inconsistency and are never
/// recoverable. Input variants are raised before any buffer is touched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TopologyError {
    /// Two buffers that must describe the same vertices disagree in length.
    #[error("point count mismatch: expected {expected}, found {found}")]
    PointCountMismatch {
        /// Number of points implied by the length table.
        expected: usize,
        /// Number of points actually present.
        found: usize,
    },

    /// An arc id refers past the end of the arc store.
    #[error("arc id {id} is out of range for {count} arcs")]
    ArcOutOfRange {
        /// The raw signed id.
        id: i64,
        /// Number of arcs in the store.
        count: usize,
    },

    /// An isolated ring shares its vertices with an earlier path but no
    /// matching arc was emitted for it.
    #[error("unmatched ring in path {path}")]
    UnmatchedRing {
        /// Index of the offending input path.
        path: usize,
    },

    /// A path endpoint was not detected as an arc endpoint.
    #[error("path {path} does not end at an arc endpoint")]
    UnterminatedPath {
        /// Index of the offending input path.
        path: usize,
    },

    /// Consecutive arcs of a path do not meet at a common vertex.
    #[error("path is not contiguous between arcs {prev} and {next}")]
    DiscontinuousPath {
        /// Raw id of the arc before the gap.
        prev: i32,
        /// Raw id of the arc after the gap.
        next: i32,
    },

    /// A layer needed a geometry type and has none.
    #[error("layer is missing a geometry type")]
    MissingGeometryType,

    /// A layer has the wrong geometry type for the operation.
    #[error("expected a {expected} layer, found {found}")]
    WrongGeometryType {
        /// Geometry type the operation requires.
        expected: &'static str,
        /// Geometry type the layer has.
        found: &'static str,
    },

    /// Malformed caller input.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TopologyError>;
