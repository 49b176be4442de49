//! Point containment against a set of rings.

use super::ring::{arc_sample_point, path_bounds, winding_number};
use crate::arcs::{ArcId, ArcStore};
use crate::bounds::Aabb2;
use crate::primitives::Point2;
use crate::spatial::BoxTree;
use num_traits::Float;

const LEAF_SIZE: usize = 4;

/// Containment index over polygon rings.
///
/// Candidate rings are found through a box tree of ring bounds and then
/// tested exactly by winding number. Clockwise rings add to the coverage
/// and counter-clockwise rings (holes) subtract from it.
#[derive(Debug, Clone)]
pub struct RingIndex<F> {
    rings: Vec<Vec<ArcId>>,
    bounds: Vec<Aabb2<F>>,
    tree: BoxTree<F>,
}

impl<F: Float> RingIndex<F> {
    /// Indexes the given rings. Empty rings are ignored.
    pub fn new(arcs: &ArcStore<F>, rings: impl IntoIterator<Item = Vec<ArcId>>) -> Self {
        let mut kept = Vec::new();
        let mut bounds = Vec::new();
        for ring in rings {
            if let Some(bb) = path_bounds(arcs, &ring) {
                kept.push(ring);
                bounds.push(bb);
            }
        }
        let tree = BoxTree::build(&bounds, LEAF_SIZE);
        Self {
            rings: kept,
            bounds,
            tree,
        }
    }

    /// Number of indexed rings.
    pub fn len(&self) -> usize {
        self.rings.len()
    }

    /// Returns true if no rings are indexed.
    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }

    /// Sum of the winding numbers of every ring around `p`.
    pub fn winding_number(&self, arcs: &ArcStore<F>, p: Point2<F>) -> i32 {
        self.tree
            .query_point(p)
            .into_iter()
            .map(|i| winding_number(arcs, &self.rings[i], p))
            .sum()
    }

    /// Returns true if `p` is covered by the indexed rings.
    pub fn contains_point(&self, arcs: &ArcStore<F>, p: Point2<F>) -> bool {
        self.winding_number(arcs, p) > 0
    }

    /// Returns true if `path` lies inside the indexed rings, judged by the
    /// sample point of its first arc.
    pub fn contains_path(&self, arcs: &ArcStore<F>, path: &[ArcId]) -> bool {
        match path.first() {
            Some(&id) => self.contains_point(arcs, arc_sample_point(arcs, id)),
            None => false,
        }
    }

    /// Bounding box of ring `i`.
    pub fn ring_bounds(&self, i: usize) -> Aabb2<F> {
        self.bounds[i]
    }
}
