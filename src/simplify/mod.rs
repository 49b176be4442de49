//! Progressive simplification of shared arcs.
//!
//! Simplification does not remove vertices. It assigns every vertex a
//! threshold, stored alongside the coordinates in the [`ArcStore`], and the
//! store's retained interval then decides which vertices are visible. A
//! vertex stays visible while its threshold is at least the interval, so an
//! interval of zero shows every vertex and an infinite interval shows only
//! arc endpoints.
//!
//! Because arcs are shared, adjacent polygons are always simplified
//! identically along their common boundary.
//!
//! # Example
//!
//! ```
//! use arcgraph::simplify::{simplify, SimplifyOptions};
//! use arcgraph::{ArcStore, Point2};
//!
//! let line: Vec<Point2<f64>> = (0..10)
//!     .map(|i| Point2::new(i as f64, if i % 2 == 0 { 0.0 } else { 0.1 }))
//!     .collect();
//! let mut arcs = ArcStore::from_arcs(&[line]).unwrap();
//! simplify(&mut arcs, &SimplifyOptions::default()).unwrap();
//! assert_eq!(arcs.retained_point_count(), 10);
//! arcs.set_retained_interval(f64::INFINITY);
//! assert_eq!(arcs.retained_point_count(), 2);
//! ```

mod heap;
mod rdp;
mod visvalingam;

pub use heap::IndexedMinHeap;
pub use rdp::douglas_peucker_thresholds;
pub use visvalingam::visvalingam_thresholds;

use crate::arcs::ArcStore;
use crate::error::{Result, TopologyError};
use crate::primitives::{Point2, Segment2, Vec3};
use num_traits::Float;
use tracing::debug;

/// Default angle weighting of [`SimplifyMethod::WeightedVisvalingam`].
pub const DEFAULT_WEIGHTING: f64 = 0.7;

/// How vertex thresholds are computed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimplifyMethod<F> {
    /// Distance from the chord of the recursive split, in coordinate units.
    DouglasPeucker,
    /// Effective triangle area, in squared coordinate units.
    Visvalingam,
    /// Effective area scaled by `1 - weighting * cos(angle)`, where `angle`
    /// is the interior angle at the vertex.
    WeightedVisvalingam { weighting: F },
}

/// Options for [`simplify`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimplifyOptions<F> {
    pub method: SimplifyMethod<F>,
    /// Treat coordinates as longitude/latitude degrees and measure on the
    /// unit sphere.
    pub spherical: bool,
    /// If set, the retained interval is chosen so that this fraction of the
    /// removable vertices stays visible.
    pub percentage: Option<F>,
}

impl<F: Float> Default for SimplifyOptions<F> {
    fn default() -> Self {
        Self {
            method: SimplifyMethod::WeightedVisvalingam {
                weighting: F::from(DEFAULT_WEIGHTING).unwrap(),
            },
            spherical: false,
            percentage: None,
        }
    }
}

impl<F: Float> SimplifyOptions<F> {
    /// Options using the given method.
    pub fn with_method(method: SimplifyMethod<F>) -> Self {
        Self {
            method,
            ..Default::default()
        }
    }

    /// Sets spherical measurement.
    pub fn spherical(mut self, spherical: bool) -> Self {
        self.spherical = spherical;
        self
    }

    /// Keeps about `fraction` of the removable vertices after simplifying.
    pub fn percentage(mut self, fraction: F) -> Self {
        self.percentage = Some(fraction);
        self
    }
}

/// Computes one threshold per vertex of `arcs`, endpoints included.
///
/// Endpoints receive infinity.
pub fn compute_thresholds<F: Float>(
    arcs: &ArcStore<F>,
    options: &SimplifyOptions<F>,
) -> Vec<F> {
    let mut out = Vec::with_capacity(arcs.point_count());
    let xx = arcs.xx();
    let yy = arcs.yy();
    for idx in 0..arcs.len() {
        let start = arcs.arc_start(idx);
        let n = arcs.arc_len(idx);
        let z = if options.spherical {
            let pts: Vec<Vec3<F>> = (start..start + n)
                .map(|i| Vec3::from_lon_lat_degrees(xx[i], yy[i]))
                .collect();
            let point = |i: usize| pts[i];
            arc_thresholds(&options.method, n, point, spherical_area, spherical_distance_sq)
        } else {
            let pts: Vec<Point2<F>> = (start..start + n)
                .map(|i| Point2::new(xx[i], yy[i]))
                .collect();
            let point = |i: usize| pts[i];
            arc_thresholds(&options.method, n, point, planar_area, planar_distance_sq)
        };
        out.extend(z);
    }
    out
}

/// Computes thresholds for every vertex and stores them in `arcs`.
///
/// With [`SimplifyOptions::percentage`] set, the retained interval is also
/// updated.
pub fn simplify<F: Float>(arcs: &mut ArcStore<F>, options: &SimplifyOptions<F>) -> Result<()> {
    if let SimplifyMethod::WeightedVisvalingam { weighting } = options.method {
        if !weighting.is_finite() || weighting < F::zero() {
            return Err(TopologyError::InvalidInput(
                "weighting must be finite and non-negative".to_string(),
            ));
        }
    }
    if let Some(fraction) = options.percentage {
        if !(fraction >= F::zero() && fraction <= F::one()) {
            return Err(TopologyError::InvalidInput(
                "retained fraction must lie in [0, 1]".to_string(),
            ));
        }
    }

    let thresholds = compute_thresholds(arcs, options);
    arcs.set_thresholds(thresholds)?;
    if let Some(fraction) = options.percentage {
        arcs.set_retained_fraction(fraction);
    }
    debug!(
        arcs = arcs.len(),
        points = arcs.point_count(),
        retained = arcs.retained_point_count(),
        "simplified arcs"
    );
    Ok(())
}

/// Thresholds of one arc whose vertices are read through `point`.
fn arc_thresholds<F: Float, P: Copy>(
    method: &SimplifyMethod<F>,
    n: usize,
    point: impl Fn(usize) -> P,
    area: fn(P, P, P) -> (F, F),
    distance_sq: fn(P, P, P) -> F,
) -> Vec<F> {
    match *method {
        SimplifyMethod::DouglasPeucker => {
            douglas_peucker_thresholds(n, |a, b, p| distance_sq(point(a), point(b), point(p)))
        }
        SimplifyMethod::Visvalingam => {
            visvalingam_thresholds(n, |a, b, c| area(point(a), point(b), point(c)).0)
        }
        SimplifyMethod::WeightedVisvalingam { weighting } => visvalingam_thresholds(n, |a, b, c| {
            let (raw, cos) = area(point(a), point(b), point(c));
            (raw * (F::one() - weighting * cos)).max(F::zero())
        }),
    }
}

/// Triangle area at `b` and the cosine of the angle there. The cosine is
/// zero when a neighbour coincides with `b`.
fn planar_area<F: Float>(a: Point2<F>, b: Point2<F>, c: Point2<F>) -> (F, F) {
    let two = F::one() + F::one();
    let (ba, bc) = (a - b, c - b);
    let area = ba.cross(bc).abs() / two;
    let len = ba.magnitude() * bc.magnitude();
    let cos = if len > F::zero() { ba.dot(bc) / len } else { F::zero() };
    (area, cos)
}

fn planar_distance_sq<F: Float>(a: Point2<F>, b: Point2<F>, p: Point2<F>) -> F {
    Segment2::new(a, b).distance_squared_to_point(p)
}

fn spherical_area<F: Float>(a: Vec3<F>, b: Vec3<F>, c: Vec3<F>) -> (F, F) {
    let two = F::one() + F::one();
    let (ba, bc) = (a - b, c - b);
    let area = ba.cross(bc).magnitude() / two;
    let len = ba.magnitude() * bc.magnitude();
    let cos = if len > F::zero() { ba.dot(bc) / len } else { F::zero() };
    (area, cos)
}

/// Squared distance from `p` to the chord `a`-`b` through the sphere.
fn spherical_distance_sq<F: Float>(a: Vec3<F>, b: Vec3<F>, p: Vec3<F>) -> F {
    let ab = b - a;
    let ap = p - a;
    let len_sq = ab.dot(ab);
    if len_sq == F::zero() {
        return ap.dot(ap);
    }
    let t = (ap.dot(ab) / len_sq).max(F::zero()).min(F::one());
    let d = ap - ab * t;
    d.dot(d)
}
