//! Ring measures over arc-based paths.
//!
//! Rings that enclose space run clockwise, so their area is positive;
//! holes run counter-clockwise and have negative area. The y axis points
//! up.

use crate::arcs::{ArcId, ArcStore};
use crate::bounds::Aabb2;
use crate::primitives::Point2;
use num_traits::Float;

/// Signed area of a closed vertex ring. Positive for clockwise rings.
///
/// The ring may or may not repeat its first vertex at the end.
pub fn ring_area<F: Float>(vertices: &[Point2<F>]) -> F {
    if vertices.len() < 3 {
        return F::zero();
    }
    let mut sum = F::zero();
    let n = vertices.len();
    for i in 0..n {
        let a = vertices[i];
        let b = vertices[(i + 1) % n];
        sum = sum + a.x * b.y - b.x * a.y;
    }
    -sum / F::from(2.0).unwrap()
}

/// Vertices of a path in travel order, with the shared vertex between
/// consecutive arcs emitted once. Uses every vertex regardless of the
/// retained interval.
pub fn path_vertices<F: Float>(arcs: &ArcStore<F>, path: &[ArcId]) -> Vec<Point2<F>> {
    let mut out: Vec<Point2<F>> = Vec::new();
    for (k, &id) in path.iter().enumerate() {
        let skip = usize::from(k > 0);
        out.extend(arcs.arc_vertices(id).skip(skip));
    }
    out
}

/// Signed area of a ring path. Positive for clockwise rings.
pub fn path_area<F: Float>(arcs: &ArcStore<F>, path: &[ArcId]) -> F {
    ring_area(&path_vertices(arcs, path))
}

/// Bounding box of a path, or `None` for an empty path.
pub fn path_bounds<F: Float>(arcs: &ArcStore<F>, path: &[ArcId]) -> Option<Aabb2<F>> {
    path.iter()
        .map(|id| arcs.arc_bounds(id.index()))
        .reduce(Aabb2::union)
}

/// Winding number of a ring around `p`: `1` inside a clockwise ring, `-1`
/// inside a counter-clockwise ring, `0` outside.
///
/// Points exactly on the boundary may be counted either way.
pub fn winding_number<F: Float>(arcs: &ArcStore<F>, path: &[ArcId], p: Point2<F>) -> i32 {
    let mut wn = 0;
    for &id in path {
        let mut iter = arcs.arc_vertices(id);
        let Some(mut a) = iter.next() else { continue };
        for b in iter {
            wn += crossing_winding(a, b, p);
            a = b;
        }
    }
    wn
}

/// Returns true if `p` lies inside the ring, regardless of winding.
pub fn point_in_ring<F: Float>(arcs: &ArcStore<F>, path: &[ArcId], p: Point2<F>) -> bool {
    winding_number(arcs, path, p) != 0
}

/// Contribution of edge `a -> b` to the clockwise winding number around
/// `p`, counting upward edges with `p` on their left as negative.
#[inline]
fn crossing_winding<F: Float>(a: Point2<F>, b: Point2<F>, p: Point2<F>) -> i32 {
    let side = (b - a).cross(p - a);
    if a.y <= p.y {
        if b.y > p.y && side > F::zero() {
            return -1;
        }
    } else if b.y <= p.y && side < F::zero() {
        return 1;
    }
    0
}

/// Point a short way along the first segment of `id`, used as a sample for
/// which side of other geometry the arc lies on.
pub fn arc_sample_point<F: Float>(arcs: &ArcStore<F>, id: ArcId) -> Point2<F> {
    let a = arcs.vertex(arcs.first_vertex_index(id));
    if arcs.arc_len(id.index()) < 2 {
        return a;
    }
    let b = arcs.vertex(arcs.nth_vertex_index(id, 1));
    a.midpoint(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square_cw() -> ArcStore<f64> {
        ArcStore::from_arcs(&[vec![
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 2.0),
            Point2::new(2.0, 2.0),
            Point2::new(2.0, 0.0),
            Point2::new(0.0, 0.0),
        ]])
        .unwrap()
    }

    #[test]
    fn test_area_sign() {
        let arcs = square_cw();
        assert_relative_eq!(path_area(&arcs, &[ArcId::forward(0)]), 4.0);
        assert_relative_eq!(path_area(&arcs, &[ArcId::reverse(0)]), -4.0);
    }

    #[test]
    fn test_winding() {
        let arcs = square_cw();
        let inside = Point2::new(1.0, 1.0);
        let outside = Point2::new(3.0, 1.0);
        assert_eq!(winding_number(&arcs, &[ArcId::forward(0)], inside), 1);
        assert_eq!(winding_number(&arcs, &[ArcId::reverse(0)], inside), -1);
        assert_eq!(winding_number(&arcs, &[ArcId::forward(0)], outside), 0);
        assert!(point_in_ring(&arcs, &[ArcId::reverse(0)], inside));
    }

    #[test]
    fn test_path_vertices_skip_joints() {
        let arcs = ArcStore::from_arcs(&[
            vec![Point2::new(0.0, 0.0), Point2::new(0.0, 1.0), Point2::new(1.0, 1.0)],
            vec![Point2::new(1.0, 1.0), Point2::new(0.0, 0.0)],
        ])
        .unwrap();
        let ring = path_vertices(&arcs, &[ArcId::forward(0), ArcId::forward(1)]);
        assert_eq!(ring.len(), 4);
        assert_relative_eq!(ring_area(&ring), 0.5);
        let bb = path_bounds(&arcs, &[ArcId::forward(0), ArcId::forward(1)]).unwrap();
        assert_relative_eq!(bb.max.x, 1.0);
    }

    #[test]
    fn test_sample_point() {
        let arcs = square_cw();
        let p = arc_sample_point(&arcs, ArcId::reverse(0));
        assert_relative_eq!(p.x, 1.0);
        assert_relative_eq!(p.y, 0.0);
    }
}
