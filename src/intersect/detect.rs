//! Segment intersection detection by horizontal stripes.

use crate::arcs::ArcStore;
use crate::primitives::Point2;
use crate::tolerance::{segment_intersection, Crossing};
use crate::topology::chains::{coord_key, CoordKey};
use num_traits::Float;
use rustc_hash::FxHashSet;
use tracing::debug;

/// Target height of one stripe, in multiples of the average segment height.
pub const STRIPE_FACTOR: f64 = 20.0;

/// A point where two segments of the arc store meet.
///
/// Segments are identified by the buffer offsets of their endpoints. When
/// the point coincides with a vertex of a segment, both offsets of that
/// segment name the vertex. `a` sorts before `b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentIntersection<F> {
    pub point: Point2<F>,
    pub a: (usize, usize),
    pub b: (usize, usize),
}

/// Intersections plus the number that needed the parallel-segment
/// fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection<F> {
    pub intersections: Vec<SegmentIntersection<F>>,
    pub snapped: usize,
}

impl<F> Default for Detection<F> {
    fn default() -> Self {
        Self {
            intersections: Vec::new(),
            snapped: 0,
        }
    }
}

/// Finds every point where segments of different arcs (or non-adjacent
/// segments of one arc) cross or touch. Shared endpoints are not reported.
///
/// All vertices are used, whatever the retained interval.
pub fn find_segment_intersections<F: Float>(arcs: &ArcStore<F>) -> Vec<SegmentIntersection<F>> {
    detect_intersections(arcs).intersections
}

#[derive(Debug, Clone, Copy)]
struct Seg<F> {
    i: usize,
    j: usize,
    xmin: F,
    xmax: F,
    ymin: F,
    ymax: F,
}

fn collect_segments<F: Float>(arcs: &ArcStore<F>) -> Vec<Seg<F>> {
    let (xx, yy) = (arcs.xx(), arcs.yy());
    let mut segs = Vec::with_capacity(arcs.point_count());
    for idx in 0..arcs.len() {
        let start = arcs.arc_start(idx);
        for i in start..start + arcs.arc_len(idx) - 1 {
            let j = i + 1;
            segs.push(Seg {
                i,
                j,
                xmin: xx[i].min(xx[j]),
                xmax: xx[i].max(xx[j]),
                ymin: yy[i].min(yy[j]),
                ymax: yy[i].max(yy[j]),
            });
        }
    }
    segs
}

fn stripe_count<F: Float>(segs: &[Seg<F>], yrange: F) -> usize {
    if segs.is_empty() || !(yrange > F::zero()) {
        return 1;
    }
    let total = segs.iter().fold(F::zero(), |acc, s| acc + (s.ymax - s.ymin));
    let avg = total / F::from(segs.len()).unwrap();
    if !(avg > F::zero()) {
        return 1;
    }
    (yrange / avg / F::from(STRIPE_FACTOR).unwrap())
        .ceil()
        .to_usize()
        .unwrap_or(1)
        .max(1)
}

/// Like [`find_segment_intersections`], also counting near-parallel pairs
/// whose crossing was snapped to an endpoint.
pub fn detect_intersections<F: Float>(arcs: &ArcStore<F>) -> Detection<F> {
    let segs = collect_segments(arcs);
    let Some(bounds) = arcs.bounds() else {
        return Detection::default();
    };
    let ymin = bounds.min.y;
    let yrange = bounds.height();
    let count = stripe_count(&segs, yrange);

    let stripe_of = |y: F| -> usize {
        if count == 1 {
            return 0;
        }
        let s = (F::from(count - 1).unwrap() * (y - ymin) / yrange).floor();
        s.to_usize().unwrap_or(0).min(count - 1)
    };
    let mut stripes: Vec<Vec<usize>> = vec![Vec::new(); count];
    for (k, s) in segs.iter().enumerate() {
        for stripe in &mut stripes[stripe_of(s.ymin)..=stripe_of(s.ymax)] {
            stripe.push(k);
        }
    }
    debug!(segments = segs.len(), stripes = count, "detecting intersections");

    let mut seen: FxHashSet<(CoordKey, (usize, usize), (usize, usize))> = FxHashSet::default();
    let mut out = Detection::default();
    for stripe in &mut stripes {
        stripe.sort_by(|&a, &b| {
            segs[a]
                .xmin
                .partial_cmp(&segs[b].xmin)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        for (n, &k1) in stripe.iter().enumerate() {
            let s1 = segs[k1];
            for &k2 in &stripe[n + 1..] {
                let s2 = segs[k2];
                if s2.xmin > s1.xmax {
                    break;
                }
                if s2.ymin > s1.ymax || s2.ymax < s1.ymin {
                    continue;
                }
                if s1.i == s2.j || s1.j == s2.i {
                    continue;
                }
                test_pair(arcs, s1, s2, &mut seen, &mut out);
            }
        }
    }
    if out.snapped > 0 {
        debug!(count = out.snapped, "snapped near-parallel intersections to endpoints");
    }
    out
}

fn test_pair<F: Float>(
    arcs: &ArcStore<F>,
    s1: Seg<F>,
    s2: Seg<F>,
    seen: &mut FxHashSet<(CoordKey, (usize, usize), (usize, usize))>,
    out: &mut Detection<F>,
) {
    let hit = segment_intersection(
        arcs.vertex(s1.i),
        arcs.vertex(s1.j),
        arcs.vertex(s2.i),
        arcs.vertex(s2.j),
    );
    let points = match hit {
        Crossing::None => return,
        Crossing::One { point, snapped } => {
            if snapped {
                out.snapped += 1;
            }
            [Some(point), None]
        }
        Crossing::Two(p, q) => [Some(p), Some(q)],
    };
    for point in points.into_iter().flatten() {
        let a = segment_ids(arcs, s1, point);
        let b = segment_ids(arcs, s2, point);
        let (a, b) = if a <= b { (a, b) } else { (b, a) };
        if seen.insert((coord_key(point.x, point.y), a, b)) {
            out.intersections.push(SegmentIntersection { point, a, b });
        }
    }
}

fn segment_ids<F: Float>(arcs: &ArcStore<F>, s: Seg<F>, p: Point2<F>) -> (usize, usize) {
    if arcs.vertex(s.i).same_xy(p) {
        (s.i, s.i)
    } else if arcs.vertex(s.j).same_xy(p) {
        (s.j, s.j)
    } else {
        (s.i, s.j)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn store(arcs: &[&[(f64, f64)]]) -> ArcStore<f64> {
        let arcs: Vec<Vec<Point2<f64>>> = arcs
            .iter()
            .map(|a| a.iter().map(|&(x, y)| Point2::new(x, y)).collect())
            .collect();
        ArcStore::from_arcs(&arcs).unwrap()
    }

    #[test]
    fn test_detection_over_f32() {
        let arcs: ArcStore<f32> = ArcStore::from_arcs(&[
            vec![Point2::new(0.0, 0.0), Point2::new(2.0, 2.0)],
            vec![Point2::new(0.0, 2.0), Point2::new(2.0, 0.0)],
        ])
        .unwrap();
        let found = detect_intersections(&arcs);
        assert_eq!(found.intersections.len(), 1);
        assert_eq!(found.snapped, 0);
        assert!(detect_intersections(&ArcStore::<f32>::from_arcs(&[]).unwrap())
            .intersections
            .is_empty());
    }

    #[test]
    fn test_single_crossing() {
        let arcs = store(&[&[(0.0, 0.0), (2.0, 2.0)], &[(0.0, 2.0), (2.0, 0.0)]]);
        let found = find_segment_intersections(&arcs);
        assert_eq!(found.len(), 1);
        assert_relative_eq!(found[0].point.x, 1.0);
        assert_eq!(found[0].a, (0, 1));
        assert_eq!(found[0].b, (2, 3));
    }

    #[test]
    fn test_touching_endpoints_not_reported() {
        let arcs = store(&[&[(0.0, 0.0), (1.0, 1.0)], &[(1.0, 1.0), (2.0, 0.0)]]);
        assert!(find_segment_intersections(&arcs).is_empty());
    }

    #[test]
    fn test_t_junction_names_vertex() {
        let arcs = store(&[&[(0.0, 0.0), (4.0, 0.0)], &[(2.0, 0.0), (2.0, 3.0)]]);
        let found = find_segment_intersections(&arcs);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].a, (0, 1));
        assert_eq!(found[0].b, (2, 2));
    }

    #[test]
    fn test_symmetry() {
        let a: &[(f64, f64)] = &[(0.0, 0.0), (3.0, 3.0), (6.0, 0.0)];
        let b: &[(f64, f64)] = &[(0.0, 2.0), (6.0, 2.0)];
        let p1: Vec<(f64, f64)> = find_segment_intersections(&store(&[a, b]))
            .iter()
            .map(|ix| (ix.point.x, ix.point.y))
            .collect();
        let mut p2: Vec<(f64, f64)> = find_segment_intersections(&store(&[b, a]))
            .iter()
            .map(|ix| (ix.point.x, ix.point.y))
            .collect();
        let mut p1 = p1;
        p1.sort_by(|x, y| x.partial_cmp(y).unwrap());
        p2.sort_by(|x, y| x.partial_cmp(y).unwrap());
        assert_eq!(p1.len(), 2);
        assert_eq!(p1, p2);
    }

    #[test]
    fn test_many_stripes_match_single_pass() {
        // a tall zigzag crossed by a vertical line
        let mut zig = Vec::new();
        for k in 0..200 {
            zig.push((if k % 2 == 0 { 0.0 } else { 2.0 }, k as f64 * 0.5));
        }
        let line: Vec<(f64, f64)> = vec![(1.0, -1.0), (1.0, 200.0)];
        let arcs = store(&[&zig, &line]);
        let detection = detect_intersections(&arcs);
        assert_eq!(detection.intersections.len(), 199);
        assert_eq!(detection.snapped, 0);
    }

    #[test]
    fn test_collinear_overlap_reports_two() {
        let arcs = store(&[&[(0.0, 0.0), (10.0, 0.0)], &[(5.0, 0.0), (15.0, 0.0)]]);
        let found = find_segment_intersections(&arcs);
        assert_eq!(found.len(), 2);
    }
}
