//! A dataset: shared arcs plus the layers that reference them.

use super::builder::{BuildOptions, Path, TopologyBuilder};
use super::chains::{coord_key, CoordKey};
use super::layer::{GeometryType, Layer, LayerInput, Shape};
use crate::arcs::{ArcId, ArcStore};
use crate::error::{Result, TopologyError};
use crate::nodes::NodeIndex;
use crate::polygon::path_vertices;
use crate::primitives::Point2;
use num_traits::Float;
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

/// Degenerate input dropped during import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Polygon rings with fewer than four points or with every vertex on
    /// one line.
    pub collapsed_rings: usize,
    /// Polyline paths with fewer than two distinct points.
    pub dropped_paths: usize,
    /// Shapes that lost every path and became null.
    pub null_shapes: usize,
}

/// Arcs and the layers whose shapes reference them.
#[derive(Debug, Clone)]
pub struct Dataset<F> {
    pub arcs: ArcStore<F>,
    pub layers: Vec<Layer>,
}

/// Where a flattened path came from.
#[derive(Debug, Clone, Copy)]
struct Slot {
    layer: usize,
    shape: usize,
}

impl<F: Float> Dataset<F> {
    /// Wraps existing arcs and layers.
    pub fn new(arcs: ArcStore<F>, layers: Vec<Layer>) -> Self {
        Self { arcs, layers }
    }

    /// Builds a dataset from raw coordinates, detecting shared boundaries.
    ///
    /// Polygon rings are closed if needed. Consecutive duplicate vertices are
    /// removed. Rings with fewer than four points or no extent and polylines
    /// with fewer than two points are dropped and counted. A self-crossing
    /// ring whose lobes cancel to zero area is kept for repair.
    ///
    /// # Example
    ///
    /// ```
    /// use arcgraph::topology::{BuildOptions, Dataset, LayerInput};
    /// use arcgraph::Point2;
    ///
    /// let square = |x: f64| vec![
    ///     Point2::new(x, 0.0),
    ///     Point2::new(x, 1.0),
    ///     Point2::new(x + 1.0, 1.0),
    ///     Point2::new(x + 1.0, 0.0),
    ///     Point2::new(x, 0.0),
    /// ];
    /// let input = LayerInput::polygons(vec![square(0.0), square(1.0)]);
    /// let (dataset, report) = Dataset::import(vec![input], BuildOptions::default()).unwrap();
    /// assert_eq!(report.collapsed_rings, 0);
    /// assert_eq!(dataset.arcs.len(), 3);
    /// ```
    pub fn import(inputs: Vec<LayerInput<F>>, options: BuildOptions<F>) -> Result<(Self, ImportReport)> {
        let mut report = ImportReport::default();
        let mut lengths = Vec::new();
        let mut xx = Vec::new();
        let mut yy = Vec::new();
        let mut slots = Vec::new();
        let mut layers = Vec::with_capacity(inputs.len());

        for (li, input) in inputs.into_iter().enumerate() {
            let polygon = input.geometry_type == GeometryType::Polygon;
            let mut shapes: Vec<Shape> = Vec::with_capacity(input.shapes.len());
            for (si, shape) in input.shapes.into_iter().enumerate() {
                let Some(paths) = shape else {
                    shapes.push(None);
                    continue;
                };
                shapes.push(Some(Vec::new()));
                for raw in paths {
                    if raw.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
                        return Err(TopologyError::InvalidInput(format!(
                            "non-finite coordinate in layer {li}, shape {si}"
                        )));
                    }
                    let mut points = dedup_points(raw);
                    if polygon {
                        if let (Some(&first), Some(&last)) = (points.first(), points.last()) {
                            if !first.same_xy(last) {
                                points.push(first);
                            }
                        }
                        if points.len() < 4 || !spans_area(&points) {
                            report.collapsed_rings += 1;
                            continue;
                        }
                    } else if points.len() < 2 {
                        report.dropped_paths += 1;
                        continue;
                    }
                    lengths.push(points.len());
                    for p in points {
                        xx.push(p.x);
                        yy.push(p.y);
                    }
                    slots.push(Slot {
                        layer: li,
                        shape: si,
                    });
                }
            }
            layers.push(Layer {
                name: input.name,
                geometry_type: Some(input.geometry_type),
                shapes,
            });
        }

        let topology = TopologyBuilder::new(options).build(&lengths, xx, yy)?;
        report.null_shapes = assign_paths(&mut layers, &slots, topology.paths);
        if report.collapsed_rings + report.dropped_paths > 0 {
            warn!(
                collapsed_rings = report.collapsed_rings,
                dropped_paths = report.dropped_paths,
                "dropped degenerate paths on import"
            );
        }
        debug!(arcs = topology.arcs.len(), layers = layers.len(), "imported dataset");
        Ok((Self::new(topology.arcs, layers), report))
    }

    /// Re-derives arcs from the current paths.
    ///
    /// Needed after arcs have been split, so coincident pieces are merged
    /// again. Vertex thresholds follow their coordinates into the new arcs
    /// and the retained interval is kept. Vertices without a known
    /// threshold are never removed. On error the dataset is unchanged.
    pub fn rebuild_topology(&mut self) -> Result<()> {
        let mut lengths = Vec::new();
        let mut xx = Vec::new();
        let mut yy = Vec::new();
        let mut slots = Vec::new();

        for (li, layer) in self.layers.iter().enumerate() {
            for (si, shape) in layer.shapes.iter().enumerate() {
                let Some(paths) = shape else { continue };
                for path in paths {
                    for &id in path {
                        self.arcs.check_id(id)?;
                    }
                    let points = path_vertices(&self.arcs, path);
                    lengths.push(points.len());
                    for p in points {
                        xx.push(p.x);
                        yy.push(p.y);
                    }
                    slots.push(Slot {
                        layer: li,
                        shape: si,
                    });
                }
            }
        }

        let topology = TopologyBuilder::default().build(&lengths, xx, yy)?;
        let mut arcs = topology.arcs;
        if let Some(known) = self.thresholds_by_coord() {
            let zz = (0..arcs.point_count())
                .map(|i| {
                    let p = arcs.vertex(i);
                    known.get(&coord_key(p.x, p.y)).copied().unwrap_or(F::infinity())
                })
                .collect();
            arcs.set_thresholds(zz)?;
            arcs.set_retained_interval(self.arcs.retained_interval());
        }

        for shape in self.layers.iter_mut().flat_map(|l| l.shapes.iter_mut()) {
            if let Some(paths) = shape {
                paths.clear();
            }
        }
        let nulled = assign_paths(&mut self.layers, &slots, topology.paths);
        if nulled > 0 {
            warn!(shapes = nulled, "shapes collapsed during topology rebuild");
        }
        debug!(arcs = arcs.len(), "rebuilt topology");
        self.arcs = arcs;
        Ok(())
    }

    /// Largest threshold recorded at each coordinate, if thresholds are set.
    fn thresholds_by_coord(&self) -> Option<FxHashMap<CoordKey, F>> {
        let zz = self.arcs.thresholds()?;
        let mut known: FxHashMap<CoordKey, F> = FxHashMap::default();
        for (i, &z) in zz.iter().enumerate() {
            let p = self.arcs.vertex(i);
            known
                .entry(coord_key(p.x, p.y))
                .and_modify(|cur| *cur = cur.max(z))
                .or_insert(z);
        }
        Some(known)
    }

    /// Replaces duplicate arcs with their lowest-numbered twin and deletes
    /// arcs that no layer references. Returns a node index over the
    /// cleaned arcs.
    pub fn clean_arc_references(&mut self) -> NodeIndex<F> {
        let nodes = NodeIndex::new(&self.arcs);
        for layer in &mut self.layers {
            layer.remap_paths(|path| path.iter().map(|&id| nodes.find_matching_arc(id)).collect());
        }

        let mut used = vec![false; self.arcs.len()];
        for layer in &self.layers {
            for (slot, flag) in used.iter_mut().zip(layer.arc_usage(self.arcs.len())) {
                *slot |= flag;
            }
        }
        let unused = used.iter().filter(|u| !**u).count();
        if unused > 0 {
            let map = self.arcs.filter_arcs(|idx| used[idx]);
            for layer in &mut self.layers {
                layer.remap_paths(|path| {
                    path.iter()
                        .map(|&id| match map[id.index()] {
                            Some(idx) => ArcId::new(idx, id.is_forward()),
                            None => id,
                        })
                        .collect()
                });
            }
            debug!(removed = unused, "removed unreferenced arcs");
        }
        NodeIndex::new(&self.arcs)
    }

    /// Checks that every arc reference is in range and that consecutive
    /// arcs of each path meet. Polygon rings must also close.
    pub fn validate(&self) -> Result<()> {
        for layer in &self.layers {
            if layer.geometry_type.is_none() && layer.paths().next().is_some() {
                return Err(TopologyError::MissingGeometryType);
            }
            let polygon = layer.geometry_type == Some(GeometryType::Polygon);
            for path in layer.paths() {
                for &id in path {
                    self.arcs.check_id(id)?;
                }
                for pair in path.windows(2) {
                    self.check_joint(pair[0], pair[1])?;
                }
                if polygon {
                    if let (Some(&last), Some(&first)) = (path.last(), path.first()) {
                        self.check_joint(last, first)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn check_joint(&self, prev: ArcId, next: ArcId) -> Result<()> {
        if self.arcs.arc_last_point(prev).same_xy(self.arcs.arc_first_point(next)) {
            Ok(())
        } else {
            Err(TopologyError::DiscontinuousPath {
                prev: prev.raw(),
                next: next.raw(),
            })
        }
    }

    /// Vertices of a path visible at the retained interval, with the vertex
    /// shared by consecutive arcs emitted once.
    pub fn path_points(&self, path: &[ArcId]) -> Vec<Point2<F>> {
        let mut out: Vec<Point2<F>> = Vec::new();
        for (k, &id) in path.iter().enumerate() {
            out.extend(self.arcs.arc_points(id).skip(usize::from(k > 0)));
        }
        out
    }

    /// Vertex lists of every path of a shape.
    pub fn shape_points(&self, shape: &Shape) -> Vec<Vec<Point2<F>>> {
        shape
            .iter()
            .flatten()
            .map(|path| self.path_points(path))
            .collect()
    }
}

/// Returns true unless every point lies on one line.
fn spans_area<F: Float>(points: &[Point2<F>]) -> bool {
    let Some(&a) = points.first() else { return false };
    let Some(&b) = points.iter().find(|p| !p.same_xy(a)) else { return false };
    points.iter().any(|&p| (b - a).cross(p - a) != F::zero())
}

fn dedup_points<F: Float>(mut points: Vec<Point2<F>>) -> Vec<Point2<F>> {
    points.dedup_by(|b, a| a.same_xy(*b));
    points
}

/// Distributes built paths back into their shapes. Returns the number of
/// shapes that ended up without paths and were set to `None`.
fn assign_paths(layers: &mut [Layer], slots: &[Slot], paths: Vec<Path>) -> usize {
    for (slot, path) in slots.iter().zip(paths) {
        if path.is_empty() {
            continue;
        }
        if let Some(Some(shape)) = layers[slot.layer].shapes.get_mut(slot.shape) {
            shape.push(path);
        }
    }
    let mut nulled = 0;
    for layer in layers {
        for shape in &mut layer.shapes {
            if matches!(shape, Some(paths) if paths.is_empty()) {
                *shape = None;
                nulled += 1;
            }
        }
    }
    nulled
}
