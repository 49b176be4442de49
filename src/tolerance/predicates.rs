//! Orientation and segment intersection predicates.
//!
//! Intersection points are snapped onto existing vertices whenever the
//! configuration allows it, so that cut points inserted into arcs land
//! exactly on the segments they split.

use crate::primitives::{Point2, Segment2};
use num_traits::Float;

/// Denominators smaller than this are treated as parallel.
pub const PARALLEL_EPSILON: f64 = 1e-25;

/// Result of an orientation test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Points are counter-clockwise (positive area).
    CounterClockwise,
    /// Points are clockwise (negative area).
    Clockwise,
    /// Points are collinear (within tolerance).
    Collinear,
}

/// Twice the signed area of triangle `abc`.
///
/// Positive when `c` lies left of the directed line `a -> b`.
#[inline]
pub fn cross3<F: Float>(a: Point2<F>, b: Point2<F>, c: Point2<F>) -> F {
    (b - a).cross(c - a)
}

/// Computes the orientation of three points with tolerance.
///
/// `eps` is compared against the absolute value of the cross product
/// (twice the signed area). Pass zero for an exact floating-point test.
#[inline]
pub fn orient2d<F: Float>(a: Point2<F>, b: Point2<F>, c: Point2<F>, eps: F) -> Orientation {
    let cross = cross3(a, b, c);
    if cross > eps {
        Orientation::CounterClockwise
    } else if cross < -eps {
        Orientation::Clockwise
    } else {
        Orientation::Collinear
    }
}

/// Returns true if segments `ab` and `cd` touch or cross.
///
/// Always true for collinear segments, overlapping or not; callers handle
/// the collinear case first.
#[inline]
pub fn segment_hit<F: Float>(a: Point2<F>, b: Point2<F>, c: Point2<F>, d: Point2<F>) -> bool {
    cross3(a, b, c) * cross3(a, b, d) <= F::zero() && cross3(c, d, a) * cross3(c, d, b) <= F::zero()
}

/// Points where two segments meet, excluding shared endpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Crossing<F> {
    /// The segments do not meet, or meet only at a shared endpoint.
    None,
    /// One meeting point.
    One {
        /// The meeting point, clamped to both segments' extents.
        point: Point2<F>,
        /// The segments were nearly parallel and the point was snapped to
        /// the nearest endpoint.
        snapped: bool,
    },
    /// Two collinear segments overlap; the points are the endpoints lying
    /// strictly inside the other segment.
    Two(Point2<F>, Point2<F>),
}

/// Finds where segment `ab` meets segment `cd`.
///
/// - Collinear segments yield every endpoint that lies strictly inside the
///   other segment (zero, one or two points).
/// - Segments that share an endpoint and are not collinear yield nothing.
/// - When an endpoint lies on the other segment, that endpoint is returned
///   exactly.
/// - Otherwise the closed-form crossing is clamped to the overlap of both
///   segments' bounding boxes.
///
/// # Example
///
/// ```
/// use arcgraph::tolerance::{segment_intersection, Crossing};
/// use arcgraph::Point2;
///
/// let hit = segment_intersection(
///     Point2::new(0.0, 0.0),
///     Point2::new(2.0, 2.0),
///     Point2::new(0.0, 2.0),
///     Point2::new(2.0, 0.0),
/// );
/// assert_eq!(hit, Crossing::One { point: Point2::new(1.0, 1.0), snapped: false });
/// ```
pub fn segment_intersection<F: Float>(
    a: Point2<F>,
    b: Point2<F>,
    c: Point2<F>,
    d: Point2<F>,
) -> Crossing<F> {
    let abc = cross3(a, b, c);
    let abd = cross3(a, b, d);
    let cda = cross3(c, d, a);
    let cdb = cross3(c, d, b);
    let zero = F::zero();

    if abc == zero && abd == zero && cda == zero && cdb == zero {
        return collinear_overlap(a, b, c, d);
    }

    if a.same_xy(c) || a.same_xy(d) || b.same_xy(c) || b.same_xy(d) {
        return Crossing::None;
    }

    if abc * abd > zero || cda * cdb > zero {
        return Crossing::None;
    }

    // an endpoint touching the other segment is returned as-is
    let touch = if abc == zero {
        Some(c)
    } else if abd == zero {
        Some(d)
    } else if cda == zero {
        Some(a)
    } else if cdb == zero {
        Some(b)
    } else {
        None
    };
    if let Some(point) = touch {
        return Crossing::One {
            point,
            snapped: false,
        };
    }

    let ab = b - a;
    let cd = d - c;
    let den = ab.cross(cd);
    if den.abs() < F::from(PARALLEL_EPSILON).unwrap() {
        return Crossing::One {
            point: nearest_endpoint(a, b, c, d),
            snapped: true,
        };
    }

    let t = (c - a).cross(cd) / den;
    let p = a + ab * t;
    let sa = Segment2::new(a, b).bounds();
    let sc = Segment2::new(c, d).bounds();
    let x = p.x.max(sa.min.x).max(sc.min.x).min(sa.max.x).min(sc.max.x);
    let y = p.y.max(sa.min.y).max(sc.min.y).min(sa.max.y).min(sc.max.y);
    Crossing::One {
        point: Point2::new(x, y),
        snapped: false,
    }
}

/// Endpoint of either segment that is closest to the other segment.
fn nearest_endpoint<F: Float>(a: Point2<F>, b: Point2<F>, c: Point2<F>, d: Point2<F>) -> Point2<F> {
    let ab = Segment2::new(a, b);
    let cd = Segment2::new(c, d);
    let candidates = [
        (c, ab.distance_squared_to_point(c)),
        (d, ab.distance_squared_to_point(d)),
        (a, cd.distance_squared_to_point(a)),
        (b, cd.distance_squared_to_point(b)),
    ];
    let mut best = candidates[0];
    for cand in &candidates[1..] {
        if cand.1 < best.1 {
            best = *cand;
        }
    }
    best.0
}

fn collinear_overlap<F: Float>(a: Point2<F>, b: Point2<F>, c: Point2<F>, d: Point2<F>) -> Crossing<F> {
    let mut hits: Vec<Point2<F>> = Vec::with_capacity(2);
    for (p, s, e) in [(c, a, b), (d, a, b), (a, c, d), (b, c, d)] {
        if strictly_between(p, s, e) && !hits.iter().any(|h| h.same_xy(p)) {
            hits.push(p);
        }
    }
    match hits.as_slice() {
        [] => Crossing::None,
        [p] => Crossing::One {
            point: *p,
            snapped: false,
        },
        [p, q, ..] => Crossing::Two(*p, *q),
    }
}

/// For a point collinear with `s`-`e`: true if it lies inside the segment
/// and is not one of its endpoints.
fn strictly_between<F: Float>(p: Point2<F>, s: Point2<F>, e: Point2<F>) -> bool {
    if p.same_xy(s) || p.same_xy(e) {
        return false;
    }
    let inside = |v: F, lo: F, hi: F| v >= lo.min(hi) && v <= lo.max(hi);
    inside(p.x, s.x, e.x) && inside(p.y, s.y, e.y)
}
