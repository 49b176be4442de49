//! Packed coordinate storage for every arc of a dataset.

use super::{ArcId, ArcPoints};
use crate::bounds::Aabb2;
use crate::error::{Result, TopologyError};
use crate::primitives::Point2;
use num_traits::Float;

/// Parallel coordinate buffers for a set of arcs.
///
/// Arc `i` occupies `len(i)` consecutive entries starting at `start(i)`.
/// An optional threshold buffer assigns each vertex the interval at which
/// it disappears during simplification; the store's retained interval
/// decides which vertices are visible to filtered queries.
///
/// # Example
///
/// ```
/// use arcgraph::{ArcId, ArcStore, Point2};
///
/// let arcs = ArcStore::from_arcs(&[vec![
///     Point2::new(0.0, 0.0),
///     Point2::new(1.0, 0.0),
///     Point2::new(1.0, 1.0),
/// ]])
/// .unwrap();
/// let back: Vec<_> = arcs.arc_vertices(ArcId::reverse(0)).collect();
/// assert_eq!(back[0], Point2::new(1.0, 1.0));
/// ```
#[derive(Debug, Clone)]
pub struct ArcStore<F> {
    xx: Vec<F>,
    yy: Vec<F>,
    zz: Option<Vec<F>>,
    nn: Vec<usize>,
    ii: Vec<usize>,
    bounds: Vec<Aabb2<F>>,
    interval: F,
}

impl<F: Float> Default for ArcStore<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Float> ArcStore<F> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            xx: Vec::new(),
            yy: Vec::new(),
            zz: None,
            nn: Vec::new(),
            ii: Vec::new(),
            bounds: Vec::new(),
            interval: F::zero(),
        }
    }

    /// Creates a store from a length table and flat coordinate buffers.
    ///
    /// Fails if the buffers disagree with the length table or if an arc has
    /// no vertices.
    pub fn from_parts(nn: Vec<usize>, xx: Vec<F>, yy: Vec<F>) -> Result<Self> {
        let mut store = Self::new();
        store.replace_coords(nn, xx, yy)?;
        Ok(store)
    }

    /// Creates a store with one arc per vertex list.
    pub fn from_arcs(arcs: &[Vec<Point2<F>>]) -> Result<Self> {
        let total = arcs.iter().map(Vec::len).sum();
        let mut nn = Vec::with_capacity(arcs.len());
        let mut xx = Vec::with_capacity(total);
        let mut yy = Vec::with_capacity(total);
        for arc in arcs {
            nn.push(arc.len());
            for p in arc {
                xx.push(p.x);
                yy.push(p.y);
            }
        }
        Self::from_parts(nn, xx, yy)
    }

    /// Replaces all coordinates, dropping thresholds and rebuilding the
    /// start table and bounding box cache.
    pub(crate) fn replace_coords(&mut self, nn: Vec<usize>, xx: Vec<F>, yy: Vec<F>) -> Result<()> {
        let expected: usize = nn.iter().sum();
        if xx.len() != expected {
            return Err(TopologyError::PointCountMismatch {
                expected,
                found: xx.len(),
            });
        }
        if yy.len() != expected {
            return Err(TopologyError::PointCountMismatch {
                expected,
                found: yy.len(),
            });
        }
        if let Some(i) = nn.iter().position(|&n| n == 0) {
            return Err(TopologyError::InvalidInput(format!("arc {i} has no vertices")));
        }

        let mut ii = Vec::with_capacity(nn.len());
        let mut bounds = Vec::with_capacity(nn.len());
        let mut start = 0;
        for &n in &nn {
            ii.push(start);
            let mut bb = Aabb2::from_point(Point2::new(xx[start], yy[start]));
            for j in start + 1..start + n {
                bb = bb.expand_to_include(Point2::new(xx[j], yy[j]));
            }
            bounds.push(bb);
            start += n;
        }

        self.xx = xx;
        self.yy = yy;
        self.zz = None;
        self.nn = nn;
        self.ii = ii;
        self.bounds = bounds;
        self.interval = F::zero();
        Ok(())
    }

    /// Number of arcs.
    #[inline]
    pub fn len(&self) -> usize {
        self.nn.len()
    }

    /// Returns true if the store holds no arcs.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nn.is_empty()
    }

    /// Total number of vertices over all arcs.
    #[inline]
    pub fn point_count(&self) -> usize {
        self.xx.len()
    }

    /// Number of vertices of arc `idx`.
    #[inline]
    pub fn arc_len(&self, idx: usize) -> usize {
        self.nn[idx]
    }

    /// Buffer offset of the first vertex of arc `idx`.
    #[inline]
    pub fn arc_start(&self, idx: usize) -> usize {
        self.ii[idx]
    }

    /// The per-arc length table.
    pub fn lengths(&self) -> &[usize] {
        &self.nn
    }

    /// The packed x buffer.
    pub fn xx(&self) -> &[F] {
        &self.xx
    }

    /// The packed y buffer.
    pub fn yy(&self) -> &[F] {
        &self.yy
    }

    /// Vertex at buffer offset `i`.
    #[inline]
    pub fn vertex(&self, i: usize) -> Point2<F> {
        Point2::new(self.xx[i], self.yy[i])
    }

    /// Returns an error if `id` does not name an arc of this store.
    pub fn check_id(&self, id: ArcId) -> Result<()> {
        if id.index() < self.len() {
            Ok(())
        } else {
            Err(TopologyError::ArcOutOfRange {
                id: id.raw() as i64,
                count: self.len(),
            })
        }
    }

    /// Buffer offset of the first vertex reached when travelling along `id`.
    #[inline]
    pub fn first_vertex_index(&self, id: ArcId) -> usize {
        self.nth_vertex_index(id, 0)
    }

    /// Buffer offset of the last vertex reached when travelling along `id`.
    #[inline]
    pub fn last_vertex_index(&self, id: ArcId) -> usize {
        self.nth_vertex_index(id.reversed(), 0)
    }

    /// Buffer offset of the `n`th vertex in the direction of `id`.
    #[inline]
    pub fn nth_vertex_index(&self, id: ArcId, n: usize) -> usize {
        let idx = id.index();
        if id.is_forward() {
            self.ii[idx] + n
        } else {
            self.ii[idx] + self.nn[idx] - 1 - n
        }
    }

    /// First vertex reached when travelling along `id`.
    pub fn arc_first_point(&self, id: ArcId) -> Point2<F> {
        self.vertex(self.first_vertex_index(id))
    }

    /// Last vertex reached when travelling along `id`.
    pub fn arc_last_point(&self, id: ArcId) -> Point2<F> {
        self.vertex(self.last_vertex_index(id))
    }

    /// Returns true if arc `idx` starts and ends at the same coordinate.
    pub fn arc_is_closed(&self, idx: usize) -> bool {
        let n = self.nn[idx];
        let i = self.ii[idx];
        n > 1 && self.vertex(i).same_xy(self.vertex(i + n - 1))
    }

    /// Returns true if arc `idx` is closed but encloses no area, i.e. it
    /// leaves a node and returns along the same segment.
    pub fn arc_is_lollipop(&self, idx: usize) -> bool {
        self.arc_is_closed(idx) && self.nn[idx] <= 3
    }

    /// All vertices of `id` in traversal order, ignoring thresholds.
    pub fn arc_vertices(&self, id: ArcId) -> ArcPoints<'_, F> {
        let idx = id.index();
        ArcPoints::new(
            &self.xx,
            &self.yy,
            None,
            F::zero(),
            self.ii[idx],
            self.nn[idx],
            id.is_forward(),
        )
    }

    /// Vertices of `id` in traversal order that survive the retained
    /// interval. Endpoints are always included.
    pub fn arc_points(&self, id: ArcId) -> ArcPoints<'_, F> {
        let idx = id.index();
        ArcPoints::new(
            &self.xx,
            &self.yy,
            self.zz.as_deref(),
            self.interval,
            self.ii[idx],
            self.nn[idx],
            id.is_forward(),
        )
    }

    /// Cached bounding box of arc `idx` over all of its vertices.
    #[inline]
    pub fn arc_bounds(&self, idx: usize) -> Aabb2<F> {
        self.bounds[idx]
    }

    /// Bounding box of every vertex, or `None` for an empty store.
    pub fn bounds(&self) -> Option<Aabb2<F>> {
        self.bounds.iter().copied().reduce(Aabb2::union)
    }

    /// Bounding box of the vertices visible at the retained interval.
    pub fn filtered_bounds(&self) -> Option<Aabb2<F>> {
        (0..self.len())
            .flat_map(|idx| self.arc_points(ArcId::forward(idx)))
            .fold(None, |acc: Option<Aabb2<F>>, p| match acc {
                Some(bb) => Some(bb.expand_to_include(p)),
                None => Some(Aabb2::from_point(p)),
            })
    }

    /// Returns true if vertex `i` is visible at the retained interval.
    #[inline]
    pub fn is_vertex_retained(&self, i: usize) -> bool {
        match &self.zz {
            Some(zz) => zz[i] >= self.interval,
            None => true,
        }
    }

    /// Calls `f(arc, a, b)` with the buffer offsets of both ends of every
    /// segment visible at the retained interval.
    pub fn for_each_segment(&self, mut f: impl FnMut(usize, usize, usize)) {
        for idx in 0..self.len() {
            let start = self.ii[idx];
            let end = start + self.nn[idx];
            let mut prev = start;
            for i in start + 1..end {
                if i == end - 1 || self.is_vertex_retained(i) {
                    f(idx, prev, i);
                    prev = i;
                }
            }
        }
    }

    /// Number of segments visible at the retained interval.
    pub fn segment_count(&self) -> usize {
        let mut count = 0;
        self.for_each_segment(|_, _, _| count += 1);
        count
    }

    /// Mean absolute x and y extent of the visible segments.
    ///
    /// Returns zeros when there are no segments.
    pub fn average_segment(&self) -> (F, F) {
        let mut count = 0usize;
        let mut dx = F::zero();
        let mut dy = F::zero();
        self.for_each_segment(|_, a, b| {
            dx = dx + (self.xx[b] - self.xx[a]).abs();
            dy = dy + (self.yy[b] - self.yy[a]).abs();
            count += 1;
        });
        if count == 0 {
            return (F::zero(), F::zero());
        }
        let n = F::from(count).unwrap();
        (dx / n, dy / n)
    }

    /// Per-vertex thresholds, if simplification has been run.
    pub fn thresholds(&self) -> Option<&[F]> {
        self.zz.as_deref()
    }

    /// Installs per-vertex thresholds.
    ///
    /// Arc endpoints are forced to infinity so they are never removed.
    pub fn set_thresholds(&mut self, mut zz: Vec<F>) -> Result<()> {
        if zz.len() != self.point_count() {
            return Err(TopologyError::PointCountMismatch {
                expected: self.point_count(),
                found: zz.len(),
            });
        }
        for idx in 0..self.len() {
            let start = self.ii[idx];
            zz[start] = F::infinity();
            zz[start + self.nn[idx] - 1] = F::infinity();
        }
        self.zz = Some(zz);
        Ok(())
    }

    /// Removes thresholds and resets the retained interval.
    pub fn clear_thresholds(&mut self) {
        self.zz = None;
        self.interval = F::zero();
    }

    /// The current retained interval.
    pub fn retained_interval(&self) -> F {
        self.interval
    }

    /// Sets the retained interval. A vertex stays visible while its
    /// threshold is at least this value, so zero keeps every vertex and
    /// infinity keeps only arc endpoints.
    pub fn set_retained_interval(&mut self, interval: F) {
        self.interval = interval;
    }

    /// Number of vertices visible at the retained interval.
    pub fn retained_point_count(&self) -> usize {
        (0..self.point_count())
            .filter(|&i| self.is_vertex_retained(i))
            .count()
    }

    /// Interval that keeps about `fraction` of the removable vertices.
    ///
    /// `1` keeps everything, `0` keeps only endpoints. Without thresholds
    /// the result is zero.
    pub fn threshold_for_retained_fraction(&self, fraction: F) -> F {
        let Some(zz) = &self.zz else {
            return F::zero();
        };
        if fraction >= F::one() {
            return F::zero();
        }
        let mut interior: Vec<F> = zz.iter().copied().filter(|z| z.is_finite()).collect();
        if fraction <= F::zero() || interior.is_empty() {
            return F::infinity();
        }
        interior.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
        let keep = (fraction * F::from(interior.len()).unwrap())
            .round()
            .to_usize()
            .unwrap_or(0);
        if keep == 0 {
            F::infinity()
        } else {
            interior[keep.min(interior.len()) - 1]
        }
    }

    /// Sets the retained interval so that about `fraction` of the removable
    /// vertices stay visible.
    pub fn set_retained_fraction(&mut self, fraction: F) {
        self.interval = self.threshold_for_retained_fraction(fraction);
    }

    /// Keeps only the arcs for which `keep(idx)` is true.
    ///
    /// Returns a map from old arc index to new arc index. Thresholds of
    /// kept vertices and the retained interval survive.
    pub fn filter_arcs(&mut self, mut keep: impl FnMut(usize) -> bool) -> Vec<Option<usize>> {
        let mut map = vec![None; self.len()];
        let mut nn = Vec::new();
        let mut xx = Vec::new();
        let mut yy = Vec::new();
        let mut zz = self.zz.as_ref().map(|_| Vec::new());
        for (idx, slot) in map.iter_mut().enumerate() {
            if !keep(idx) {
                continue;
            }
            *slot = Some(nn.len());
            let start = self.ii[idx];
            let end = start + self.nn[idx];
            nn.push(self.nn[idx]);
            xx.extend_from_slice(&self.xx[start..end]);
            yy.extend_from_slice(&self.yy[start..end]);
            if let (Some(dst), Some(src)) = (zz.as_mut(), self.zz.as_ref()) {
                dst.extend_from_slice(&src[start..end]);
            }
        }

        let interval = self.interval;
        // lengths are copied from a valid store, so this cannot fail
        if self.replace_coords(nn, xx, yy).is_ok() {
            self.zz = zz;
            self.interval = interval;
        }
        map
    }
}
