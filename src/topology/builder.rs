//! Conversion of raw path coordinates into deduplicated arcs.

use super::chains::{coord_key, CoordKey, PointChains};
use crate::arcs::{ArcId, ArcStore};
use crate::error::{Result, TopologyError};
use crate::tolerance::{auto_snap_interval, remove_repeated_points, snap_to_grid};
use num_traits::Float;
use rustc_hash::FxHashMap;
use tracing::debug;

/// A sequence of signed arc references.
pub type Path = Vec<ArcId>;

/// Coordinate snapping applied before topology is built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SnapMode<F> {
    /// Coordinates are used as given.
    None,
    /// Coordinates are rounded to a grid of the given size.
    Grid(F),
    /// Grid size is derived from the average segment length.
    Auto,
}

impl<F> Default for SnapMode<F> {
    fn default() -> Self {
        SnapMode::None
    }
}

/// Options for [`TopologyBuilder`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildOptions<F> {
    /// Snapping applied to input coordinates.
    pub snap: SnapMode<F>,
}

impl<F: Float> Default for BuildOptions<F> {
    fn default() -> Self {
        Self {
            snap: SnapMode::None,
        }
    }
}

/// Result of a topology build.
#[derive(Debug, Clone)]
pub struct Topology<F> {
    /// The deduplicated arcs.
    pub arcs: ArcStore<F>,
    /// For every input path, the arcs that reconstruct it. Paths with fewer
    /// than two distinct points map to an empty list.
    pub paths: Vec<Path>,
}

/// Builds shared-boundary topology from independently digitized paths.
///
/// Vertices are split into arcs at nodes: path endpoints and vertices
/// where coincident paths diverge. Each arc is stored once; a path that
/// runs along an existing arc in the opposite direction references it
/// with a reversed [`ArcId`].
///
/// # Example
///
/// ```
/// use arcgraph::topology::TopologyBuilder;
///
/// // two squares sharing the edge x = 1
/// let xx = vec![0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0, 2.0, 2.0, 1.0];
/// let yy = vec![0.0, 1.0, 1.0, 0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0];
/// let topo = TopologyBuilder::default().build(&[5, 5], xx, yy).unwrap();
/// let shared = topo.paths[0].iter().find(|a| {
///     topo.paths[1].iter().any(|b| b.index() == a.index())
/// });
/// assert!(shared.is_some());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TopologyBuilder<F> {
    options: BuildOptions<F>,
}

impl<F: Float> Default for TopologyBuilder<F> {
    fn default() -> Self {
        Self::new(BuildOptions::default())
    }
}

impl<F: Float> TopologyBuilder<F> {
    /// Creates a builder with the given options.
    pub fn new(options: BuildOptions<F>) -> Self {
        Self { options }
    }

    /// Builds topology from a path length table and flat coordinates.
    pub fn build(&self, lengths: &[usize], mut xx: Vec<F>, mut yy: Vec<F>) -> Result<Topology<F>> {
        let expected: usize = lengths.iter().sum();
        for found in [xx.len(), yy.len()] {
            if found != expected {
                return Err(TopologyError::PointCountMismatch { expected, found });
            }
        }

        let grid = match self.options.snap {
            SnapMode::None => F::zero(),
            SnapMode::Grid(size) => size,
            SnapMode::Auto => auto_snap_interval(lengths, &xx, &yy),
        };
        if grid > F::zero() {
            debug!(grid = grid.to_f64(), "snapping coordinates");
            snap_to_grid(&mut xx, &mut yy, grid);
        }
        let lengths = remove_repeated_points(lengths, &mut xx, &mut yy);

        let topology = PathTopology::new(&lengths, &xx, &yy).build()?;
        debug!(
            paths = lengths.len(),
            points = xx.len(),
            arcs = topology.arcs.len(),
            arc_points = topology.arcs.point_count(),
            "built topology"
        );
        Ok(topology)
    }
}

/// Vertex indices of a candidate arc, in path order.
type Candidate = Vec<usize>;

struct PathTopology<'a, F> {
    nn: &'a [usize],
    xx: &'a [F],
    yy: &'a [F],
    path_ids: Vec<usize>,
    path_starts: Vec<usize>,
    chains: PointChains,
    out: ArcBuffer<F>,
}

impl<'a, F: Float> PathTopology<'a, F> {
    fn new(nn: &'a [usize], xx: &'a [F], yy: &'a [F]) -> Self {
        let mut path_ids = Vec::with_capacity(xx.len());
        let mut path_starts = Vec::with_capacity(nn.len());
        let mut start = 0;
        for (path, &n) in nn.iter().enumerate() {
            path_starts.push(start);
            path_ids.extend(std::iter::repeat(path).take(n));
            start += n;
        }
        Self {
            nn,
            xx,
            yy,
            path_ids,
            path_starts,
            chains: PointChains::new(xx, yy),
            out: ArcBuffer::default(),
        }
    }

    fn build(mut self) -> Result<Topology<F>> {
        let mut paths = Vec::with_capacity(self.nn.len());
        for path in 0..self.nn.len() {
            let n = self.nn[path];
            if n < 2 {
                paths.push(Vec::new());
                continue;
            }
            let start = self.path_starts[path];
            paths.push(self.convert_path(path, start, start + n - 1)?);
        }
        let arcs = ArcStore::from_parts(self.out.nn, self.out.xx, self.out.yy)?;
        Ok(Topology { arcs, paths })
    }

    #[inline]
    fn same_xy(&self, a: usize, b: usize) -> bool {
        self.xx[a] == self.xx[b] && self.yy[a] == self.yy[b]
    }

    /// Following vertex along the path, wrapping around closed rings.
    fn next_point(&self, id: usize) -> Option<usize> {
        let path = self.path_ids[id];
        let start = self.path_starts[path];
        let end = start + self.nn[path] - 1;
        if id < end {
            Some(id + 1)
        } else if self.same_xy(start, end) {
            Some(start + 1)
        } else {
            None
        }
    }

    /// Preceding vertex along the path, wrapping around closed rings.
    fn prev_point(&self, id: usize) -> Option<usize> {
        let path = self.path_ids[id];
        let start = self.path_starts[path];
        let end = start + self.nn[path] - 1;
        if id > start {
            Some(id - 1)
        } else if self.same_xy(start, end) {
            Some(end - 1)
        } else {
            None
        }
    }

    /// A vertex is a node if it ends an open path or if some coincident
    /// vertex does not continue along the same two edges.
    fn is_arc_endpoint(&self, id: usize) -> bool {
        let (Some(prev), Some(next)) = (self.prev_point(id), self.next_point(id)) else {
            return true;
        };
        self.chains.coincident(id).any(|other| {
            match (self.prev_point(other), self.next_point(other)) {
                (Some(prev2), Some(next2)) => self.broken_edge(prev, next, prev2, next2),
                _ => true,
            }
        })
    }

    fn broken_edge(&self, prev: usize, next: usize, prev2: usize, next2: usize) -> bool {
        let reversed = self.same_xy(prev, next2) && self.same_xy(next, prev2);
        let parallel = self.same_xy(prev, prev2) && self.same_xy(next, next2);
        !(reversed || parallel)
    }

    fn convert_path(&mut self, path: usize, start: usize, end: usize) -> Result<Path> {
        let mut ids = Vec::new();
        let mut first_node = None;
        let mut arc_start = start;
        for i in start..end {
            if self.is_arc_endpoint(i) {
                if first_node.is_some() {
                    ids.push(self.add_arc((arc_start..=i).collect()));
                } else {
                    first_node = Some(i);
                }
                arc_start = i;
            }
        }

        match first_node {
            None => ids.push(self.add_ring(path, start, end)?),
            Some(node) if node == start => {
                if !self.is_arc_endpoint(end) {
                    return Err(TopologyError::UnterminatedPath { path });
                }
                ids.push(self.add_arc((arc_start..=end).collect()));
            }
            Some(node) => {
                // the last arc wraps around the ring's closing vertex
                let candidate = (arc_start..=end).chain(start + 1..=node).collect();
                ids.push(self.add_arc(candidate));
            }
        }
        Ok(ids)
    }

    /// Emits a ring that contains no node as a single closed arc, reusing
    /// an earlier identical ring when one exists.
    fn add_ring(&mut self, path: usize, start: usize, end: usize) -> Result<ArcId> {
        let shares_earlier_path = self
            .chains
            .coincident(start)
            .any(|other| self.path_ids[other] < path);
        if !shares_earlier_path {
            return Ok(self.add_arc((start..=end).collect()));
        }

        let n = end - start + 1;
        for i in start..end {
            let mut candidate = Vec::with_capacity(n);
            let mut cur = i;
            candidate.push(cur);
            while candidate.len() < n {
                match self.next_point(cur) {
                    Some(next) => cur = next,
                    None => break,
                }
                candidate.push(cur);
            }
            if let Some(id) = self.out.find_duplicate(self.xx, self.yy, &candidate) {
                return Ok(id);
            }
        }
        Err(TopologyError::UnmatchedRing { path })
    }

    fn add_arc(&mut self, candidate: Candidate) -> ArcId {
        match self.out.find_duplicate(self.xx, self.yy, &candidate) {
            Some(id) => id,
            None => self.out.push(self.xx, self.yy, &candidate),
        }
    }
}

/// Output arcs under construction, indexed by endpoint coordinates.
struct ArcBuffer<F> {
    nn: Vec<usize>,
    ii: Vec<usize>,
    xx: Vec<F>,
    yy: Vec<F>,
    by_first: FxHashMap<CoordKey, Vec<usize>>,
    by_last: FxHashMap<CoordKey, Vec<usize>>,
}

impl<F> Default for ArcBuffer<F> {
    fn default() -> Self {
        Self {
            nn: Vec::new(),
            ii: Vec::new(),
            xx: Vec::new(),
            yy: Vec::new(),
            by_first: FxHashMap::default(),
            by_last: FxHashMap::default(),
        }
    }
}

impl<F: Float> ArcBuffer<F> {
    fn push(&mut self, xx: &[F], yy: &[F], candidate: &[usize]) -> ArcId {
        let idx = self.nn.len();
        self.ii.push(self.xx.len());
        self.nn.push(candidate.len());
        for &i in candidate {
            self.xx.push(xx[i]);
            self.yy.push(yy[i]);
        }
        let (first, last) = (candidate[0], candidate[candidate.len() - 1]);
        self.by_first
            .entry(coord_key(xx[first], yy[first]))
            .or_default()
            .push(idx);
        self.by_last
            .entry(coord_key(xx[last], yy[last]))
            .or_default()
            .push(idx);
        ArcId::forward(idx)
    }

    /// Looks for a stored arc with the candidate's exact coordinates,
    /// preferring one that runs in the opposite direction.
    fn find_duplicate(&self, xx: &[F], yy: &[F], candidate: &[usize]) -> Option<ArcId> {
        let n = candidate.len();
        let first = candidate[0];

        // reverse match: a stored arc ending where the candidate starts
        if let Some(arcs) = self.by_last.get(&coord_key(xx[first], yy[first])) {
            for &idx in arcs {
                if self.nn[idx] != n {
                    continue;
                }
                let base = self.ii[idx];
                let same = candidate.iter().enumerate().all(|(k, &i)| {
                    let j = base + n - 1 - k;
                    self.xx[j] == xx[i] && self.yy[j] == yy[i]
                });
                if same {
                    return Some(ArcId::reverse(idx));
                }
            }
        }

        if let Some(arcs) = self.by_first.get(&coord_key(xx[first], yy[first])) {
            for &idx in arcs {
                if self.nn[idx] != n {
                    continue;
                }
                let base = self.ii[idx];
                let same = candidate.iter().enumerate().all(|(k, &i)| {
                    let j = base + k;
                    self.xx[j] == xx[i] && self.yy[j] == yy[i]
                });
                if same {
                    return Some(ArcId::forward(idx));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::Point2;

    fn flatten(paths: &[&[(f64, f64)]]) -> (Vec<usize>, Vec<f64>, Vec<f64>) {
        let nn = paths.iter().map(|p| p.len()).collect();
        let xx = paths.iter().flat_map(|p| p.iter().map(|c| c.0)).collect();
        let yy = paths.iter().flat_map(|p| p.iter().map(|c| c.1)).collect();
        (nn, xx, yy)
    }

    fn build(paths: &[&[(f64, f64)]]) -> Topology<f64> {
        let (nn, xx, yy) = flatten(paths);
        TopologyBuilder::default().build(&nn, xx, yy).unwrap()
    }

    fn path_coords(topo: &Topology<f64>, path: &[ArcId]) -> Vec<Point2<f64>> {
        let mut out: Vec<Point2<f64>> = Vec::new();
        for &id in path {
            for p in topo.arcs.arc_vertices(id) {
                if out.last().map_or(true, |q| !q.same_xy(p)) {
                    out.push(p);
                }
            }
        }
        out
    }

    const LEFT: &[(f64, f64)] = &[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0), (0.0, 0.0)];
    const RIGHT: &[(f64, f64)] = &[(1.0, 0.0), (1.0, 1.0), (2.0, 1.0), (2.0, 0.0), (1.0, 0.0)];

    #[test]
    fn test_isolated_ring_is_one_arc() {
        let topo = build(&[LEFT]);
        assert_eq!(topo.arcs.len(), 1);
        assert_eq!(topo.paths[0], vec![ArcId::forward(0)]);
        assert_eq!(topo.arcs.arc_len(0), 5);
    }

    #[test]
    fn test_shared_edge_is_reversed() {
        let topo = build(&[LEFT, RIGHT]);
        // two outer chains plus the shared edge
        assert_eq!(topo.arcs.len(), 3);
        let shared: Vec<(ArcId, ArcId)> = topo.paths[0]
            .iter()
            .flat_map(|&a| topo.paths[1].iter().map(move |&b| (a, b)))
            .filter(|(a, b)| a.index() == b.index())
            .collect();
        assert_eq!(shared.len(), 1);
        let (a, b) = shared[0];
        assert_eq!(a, b.reversed());
        assert_eq!(topo.arcs.arc_len(a.index()), 2);
    }

    #[test]
    fn test_paths_round_trip() {
        let topo = build(&[LEFT, RIGHT]);
        let left = path_coords(&topo, &topo.paths[0]);
        assert_eq!(left.len(), 5);
        assert!(left[0].same_xy(left[4]));
        let right = path_coords(&topo, &topo.paths[1]);
        assert_eq!(right.len(), 5);
        for &(x, y) in &RIGHT[..4] {
            assert!(right.iter().any(|p| p.same_xy(Point2::new(x, y))));
        }
    }

    #[test]
    fn test_duplicate_ring_reuses_arc() {
        let reversed: Vec<(f64, f64)> = LEFT.iter().rev().copied().collect();
        let topo = build(&[LEFT, &reversed]);
        assert_eq!(topo.arcs.len(), 1);
        assert_eq!(topo.paths[1], vec![ArcId::reverse(0)]);
    }

    #[test]
    fn test_rotated_duplicate_ring() {
        let rotated = [(1.0, 1.0), (1.0, 0.0), (0.0, 0.0), (0.0, 1.0), (1.0, 1.0)];
        let topo = build(&[LEFT, &rotated]);
        assert_eq!(topo.arcs.len(), 1);
        assert_eq!(topo.paths[1], vec![ArcId::forward(0)]);
    }

    #[test]
    fn test_polylines_split_at_crossing_vertex() {
        let a = [(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)];
        let b = [(0.0, 2.0), (1.0, 1.0), (2.0, 0.0)];
        let topo = build(&[&a, &b]);
        assert_eq!(topo.arcs.len(), 4);
        assert_eq!(topo.paths[0].len(), 2);
        assert_eq!(topo.paths[1].len(), 2);
    }

    #[test]
    fn test_short_and_repeated_paths() {
        let topo = build(&[&[(3.0, 3.0)], &[(0.0, 0.0), (0.0, 0.0), (1.0, 0.0)]]);
        assert!(topo.paths[0].is_empty());
        assert_eq!(topo.paths[1].len(), 1);
        assert_eq!(topo.arcs.arc_len(0), 2);
    }

    #[test]
    fn test_snapping_merges_near_points() {
        let (nn, xx, yy) = flatten(&[
            &[(0.0, 0.0), (1.0, 0.0)],
            &[(1.0001, 0.0), (0.0001, 0.0)],
        ]);
        let opts = BuildOptions {
            snap: SnapMode::Grid(0.01),
        };
        let topo = TopologyBuilder::new(opts).build(&nn, xx, yy).unwrap();
        assert_eq!(topo.arcs.len(), 1);
        assert_eq!(topo.paths[1], vec![ArcId::reverse(0)]);
    }

    fn generic_square<F: Float>() -> Topology<F> {
        let c = |v: f64| F::from(v).unwrap();
        let xx = [0.0, 0.0, 1.0, 1.0, 0.0].map(c).to_vec();
        let yy = [0.0, 1.0, 1.0, 0.0, 0.0].map(c).to_vec();
        TopologyBuilder::default().build(&[5], xx, yy).unwrap()
    }

    #[test]
    fn test_default_builder_in_generic_code() {
        let topo = generic_square::<f32>();
        assert_eq!(topo.arcs.len(), 1);
        assert_eq!(BuildOptions::<f32>::default().snap, SnapMode::None);
    }

    #[test]
    fn test_length_mismatch() {
        let err = TopologyBuilder::default()
            .build(&[3], vec![0.0, 1.0], vec![0.0, 1.0])
            .unwrap_err();
        assert!(matches!(err, TopologyError::PointCountMismatch { .. }));
    }
}
