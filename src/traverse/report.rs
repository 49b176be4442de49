//! Degeneracies met while assembling rings.

use crate::topology::{GeometryType, Layer, Path};
use tracing::warn;

/// Counts of rings dropped during a traversal, plus the partial paths of
/// traces that could not be closed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraversalReport {
    /// Rings removed for having zero area or fewer than four vertices.
    pub collapsed_rings: usize,
    /// Traces abandoned because a route had already been consumed.
    pub blocked_paths: usize,
    /// Traces dropped for leaving the region being kept. Clipping discards
    /// the outside parts of crossing targets this way.
    pub discarded_paths: usize,
    /// Partial paths of traces that hit a dead end.
    pub collisions: Vec<Path>,
}

impl TraversalReport {
    /// Adds another report's counts and collisions to this one.
    pub fn merge(&mut self, other: TraversalReport) {
        self.collapsed_rings += other.collapsed_rings;
        self.blocked_paths += other.blocked_paths;
        self.discarded_paths += other.discarded_paths;
        self.collisions.extend(other.collisions);
    }

    pub(crate) fn add_collision(&mut self, path: Path) {
        warn!(arcs = path.len(), "ring trace reached a dead end");
        self.collisions.push(path);
    }

    /// Returns true if no ring collapsed and every trace either closed or
    /// was discarded.
    pub fn is_clean(&self) -> bool {
        self.collapsed_rings == 0 && self.blocked_paths == 0 && self.collisions.is_empty()
    }

    /// The collisions as a polyline layer, one shape per partial path.
    pub fn collision_layer(&self) -> Layer {
        Layer::new(
            GeometryType::Polyline,
            self.collisions.iter().map(|p| Some(vec![p.clone()])).collect(),
        )
        .with_name("collisions")
    }
}
