//! Douglas-Peucker vertex thresholds.
//!
//! Instead of simplifying at one tolerance, every interior vertex records
//! the largest tolerance at which the classic recursion would still keep
//! it. Filtering by threshold then reproduces the simplification for any
//! tolerance.

use num_traits::Float;

/// Douglas-Peucker thresholds for one arc of `n` vertices.
///
/// `dist_sq(a, b, p)` returns the squared distance from vertex `p` to the
/// segment between vertices `a` and `b`. Each interior vertex receives the
/// distance that made it the split point of its sub-range, capped by the
/// threshold of the split point above it, so a vertex is never removed
/// after the vertex that introduced it. Endpoints receive infinity.
pub fn douglas_peucker_thresholds<F: Float>(
    n: usize,
    dist_sq: impl Fn(usize, usize, usize) -> F,
) -> Vec<F> {
    let mut out = vec![F::infinity(); n];
    if n < 3 {
        return out;
    }

    // explicit stack of (start, end, cap) ranges
    let mut stack = vec![(0, n - 1, F::infinity())];
    while let Some((start, end, cap)) = stack.pop() {
        if end <= start + 1 {
            continue;
        }
        let mut max_dist = F::neg_infinity();
        let mut max_idx = start + 1;
        for i in (start + 1)..end {
            let d = dist_sq(start, end, i);
            if d > max_dist {
                max_dist = d;
                max_idx = i;
            }
        }
        let threshold = max_dist.max(F::zero()).sqrt().min(cap);
        out[max_idx] = threshold;
        stack.push((start, max_idx, threshold));
        stack.push((max_idx, end, threshold));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{Point2, Segment2};
    use approx::assert_relative_eq;

    fn planar(points: &[Point2<f64>]) -> Vec<f64> {
        douglas_peucker_thresholds(points.len(), |a, b, p| {
            Segment2::new(points[a], points[b]).distance_squared_to_point(points[p])
        })
    }

    #[test]
    fn test_short_arcs() {
        assert!(planar(&[]).is_empty());
        let two = planar(&[Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)]);
        assert!(two.iter().all(|z| z.is_infinite()));
    }

    #[test]
    fn test_single_spike() {
        let points = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 3.0),
            Point2::new(3.0, 0.0),
            Point2::new(4.0, 0.0),
        ];
        let z = planar(&points);
        assert!(z[0].is_infinite() && z[4].is_infinite());
        assert_relative_eq!(z[2], 3.0);
        // distance from (1, 0) to the segment (0, 0)-(2, 3)
        assert_relative_eq!(z[1], 3.0 / 13.0_f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(z[3], 3.0 / 13.0_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_children_capped_by_parent() {
        // (2, 0.9) is closer to the chord than (9, -1), but farther from
        // the sub-chord that remains once (9, -1) is kept
        let points = vec![
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.9),
            Point2::new(9.0, -1.0),
            Point2::new(10.0, 0.0),
        ];
        let z = planar(&points);
        assert_relative_eq!(z[2], 1.0, epsilon = 1e-12);
        assert_eq!(z[1], z[2]);
    }

    #[test]
    fn test_collinear_points_get_zero() {
        let points: Vec<Point2<f64>> = (0..6).map(|i| Point2::new(i as f64, 0.0)).collect();
        let z = planar(&points);
        assert!(z[1..5].iter().all(|&v| v == 0.0));
    }
}
