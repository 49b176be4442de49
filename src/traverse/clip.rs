//! Clipping and erasing of shapes by polygons.

use super::dissolve::{drop_collapsed, flatten_with_table, trace_all};
use super::flags::{RouteFlags, RouteTable};
use super::pathfinder::{PathFinder, Router};
use super::report::TraversalReport;
use crate::arcs::{ArcId, ArcStore};
use crate::nodes::NodeIndex;
use crate::polygon::{arc_sample_point, RingIndex};
use crate::primitives::Point2;
use crate::topology::{reverse_path, Path, Shape};
use num_traits::Float;
use tracing::debug;

/// Whether the clip polygons keep or remove what they cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClipMode {
    /// Keep the parts inside the clip polygons.
    Clip,
    /// Keep the parts outside the clip polygons.
    Erase,
}

impl ClipMode {
    fn keeps(self, inside: bool) -> bool {
        match self {
            ClipMode::Clip => inside,
            ClipMode::Erase => !inside,
        }
    }
}

/// Routes of a target shape and of the clip boundary traced together.
///
/// Target arcs may be followed only in their own open direction. Clip arcs
/// may be followed only in the direction they were opened in, and block
/// the target where they are visible against it.
struct ClipRouter<'t> {
    target: &'t mut RouteTable,
    clip: &'t mut RouteTable,
    used_clip: Vec<ArcId>,
    touched_clip: bool,
}

impl Router for ClipRouter<'_> {
    fn is_visible(&self, id: ArcId) -> bool {
        self.target.is_visible(id) || self.clip.is_visible(id)
    }

    fn is_open(&self, id: ArcId) -> bool {
        self.target.is_open(id)
    }

    fn use_route(&mut self, id: ArcId) -> bool {
        let fwd = id.is_forward();
        let target = self.target.get(id.index());
        let clip = self.clip.get(id.index());
        if !target.is_empty() {
            if !target.is_open(fwd) {
                return false;
            }
            if clip.is_open(fwd) {
                self.touched_clip = true;
            } else if clip.is_visible(fwd) {
                return false;
            }
            self.target.use_route(id)
        } else if clip.is_open(fwd) {
            self.clip.use_route(id);
            self.used_clip.push(id);
            self.touched_clip = true;
            true
        } else {
            false
        }
    }

    fn is_excluded(&self, id: ArcId) -> bool {
        let fwd = id.is_forward();
        let target = self.target.get(id.index());
        let clip = self.clip.get(id.index());
        if target.is_empty() {
            // clip routes consumed by this shape block, the rest lead outside
            !self.used_clip.contains(&id)
        } else {
            !target.is_visible(fwd)
                || (target.is_open(fwd) && clip.is_visible(fwd) && !clip.is_open(fwd))
        }
    }
}

/// Clip boundary prepared once for a series of target shapes.
struct ClipBoundary<F> {
    rings: Vec<Path>,
    index: RingIndex<F>,
    table: RouteTable,
}

impl<F: Float> ClipBoundary<F> {
    fn new(
        arcs: &ArcStore<F>,
        nodes: &NodeIndex<F>,
        clip_shapes: &[Shape],
        mode: ClipMode,
        report: &mut TraversalReport,
    ) -> Self {
        let all: Vec<Path> = clip_shapes.iter().flatten().flatten().cloned().collect();
        let mut table = RouteTable::new(arcs.len());
        let rings = flatten_with_table(arcs, nodes, &mut table, &all, report);
        let forward = mode == ClipMode::Clip;
        table.open_routes(arcs, &rings, forward, !forward, false);
        for &id in rings.iter().flatten() {
            table.merge(id.index(), RouteFlags::VISIBLE);
        }
        let index = RingIndex::new(arcs, rings.iter().cloned());
        Self { rings, index, table }
    }
}

/// Clips or erases one flattened target shape.
fn clip_shape<F: Float>(
    arcs: &ArcStore<F>,
    nodes: &NodeIndex<F>,
    boundary: &mut ClipBoundary<F>,
    target_rings: &[Path],
    mode: ClipMode,
    report: &mut TraversalReport,
) -> Vec<Path> {
    let mut target = RouteTable::new(arcs.len());
    target.open_routes(arcs, target_rings, true, false, false);

    let finder = PathFinder::new(arcs, nodes);
    let mut out = Vec::new();
    let mut router = ClipRouter {
        target: &mut target,
        clip: &mut boundary.table,
        used_clip: Vec::new(),
        touched_clip: false,
    };
    let starts: Vec<ArcId> = target_rings.iter().flatten().copied().collect();
    let clip_index = &boundary.index;
    for id in starts {
        router.touched_clip = false;
        trace_all(&finder, &mut router, [id], report, |r, path| {
            let keep = r.touched_clip || mode.keeps(clip_index.contains_path(arcs, &path));
            if keep {
                out.push(path);
            }
        });
    }

    // clip rings that never met the target lie wholly inside or outside it
    let target_index = RingIndex::new(arcs, target_rings.iter().cloned());
    let used = router.used_clip;
    for ring in &boundary.rings {
        let untouched = ring.iter().all(|id| {
            target.get(id.index()).is_empty() && !used.iter().any(|u| u.index() == id.index())
        });
        if untouched && target_index.contains_path(arcs, ring) {
            out.push(match mode {
                ClipMode::Clip => ring.clone(),
                ClipMode::Erase => reverse_path(ring),
            });
        }
    }
    for id in used {
        boundary.table.reopen(id);
    }
    drop_collapsed(arcs, out, report)
}

fn clip_shapes<F: Float>(
    arcs: &ArcStore<F>,
    nodes: &NodeIndex<F>,
    targets: &[Shape],
    clips: &[Shape],
    mode: ClipMode,
) -> (Vec<Shape>, TraversalReport) {
    let mut report = TraversalReport::default();
    let mut boundary = ClipBoundary::new(arcs, nodes, clips, mode, &mut report);
    let mut flat_table = RouteTable::new(arcs.len());
    let out = targets
        .iter()
        .map(|shape| {
            let rings = shape.as_ref()?;
            let flat = flatten_with_table(arcs, nodes, &mut flat_table, rings, &mut report);
            let clipped = clip_shape(arcs, nodes, &mut boundary, &flat, mode, &mut report);
            (!clipped.is_empty()).then_some(clipped)
        })
        .collect();
    debug!(shapes = targets.len(), ?mode, "clipped polygon shapes");
    (out, report)
}

/// Keeps the parts of each target polygon shape covered by `clips`.
///
/// Target shapes are flattened first and the clip shapes are dissolved into
/// a single boundary. Shapes left without rings become `None`.
pub fn clip_polygons<F: Float>(
    arcs: &ArcStore<F>,
    nodes: &NodeIndex<F>,
    targets: &[Shape],
    clips: &[Shape],
) -> (Vec<Shape>, TraversalReport) {
    clip_shapes(arcs, nodes, targets, clips, ClipMode::Clip)
}

/// Removes the parts of each target polygon shape covered by `clips`.
pub fn erase_polygons<F: Float>(
    arcs: &ArcStore<F>,
    nodes: &NodeIndex<F>,
    targets: &[Shape],
    clips: &[Shape],
) -> (Vec<Shape>, TraversalReport) {
    clip_shapes(arcs, nodes, targets, clips, ClipMode::Erase)
}

/// Pieces of a target layer cut by several clip shapes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Slices {
    /// One clipped copy of the targets per clip shape.
    pub pieces: Vec<Vec<Shape>>,
    /// The targets with every clip shape erased.
    pub remainder: Vec<Shape>,
}

/// Cuts the target shapes by each clip shape in turn, keeping what no clip
/// shape covers as a remainder.
pub fn slice_polygons<F: Float>(
    arcs: &ArcStore<F>,
    nodes: &NodeIndex<F>,
    targets: &[Shape],
    clips: &[Shape],
) -> (Slices, TraversalReport) {
    let mut report = TraversalReport::default();
    let mut pieces = Vec::with_capacity(clips.len());
    for clip in clips {
        let (piece, r) = clip_polygons(arcs, nodes, targets, std::slice::from_ref(clip));
        report.merge(r);
        pieces.push(piece);
    }
    let (remainder, r) = erase_polygons(arcs, nodes, targets, clips);
    report.merge(r);
    (Slices { pieces, remainder }, report)
}

/// Keeps the arcs of polyline shapes that lie inside the clip rings.
///
/// Arcs must already be split where they cross the clip boundary. Each arc
/// is judged by a sample point on its first segment; runs of kept arcs stay
/// joined in one path.
pub fn clip_polylines<F: Float>(
    arcs: &ArcStore<F>,
    shapes: &[Shape],
    clip: &RingIndex<F>,
) -> Vec<Shape> {
    filter_polylines(arcs, shapes, clip, ClipMode::Clip)
}

/// Keeps the arcs of polyline shapes that lie outside the clip rings.
pub fn erase_polylines<F: Float>(
    arcs: &ArcStore<F>,
    shapes: &[Shape],
    clip: &RingIndex<F>,
) -> Vec<Shape> {
    filter_polylines(arcs, shapes, clip, ClipMode::Erase)
}

pub(crate) fn filter_polylines<F: Float>(
    arcs: &ArcStore<F>,
    shapes: &[Shape],
    clip: &RingIndex<F>,
    mode: ClipMode,
) -> Vec<Shape> {
    shapes
        .iter()
        .map(|shape| {
            let mut out: Vec<Path> = Vec::new();
            for path in shape.iter().flatten() {
                let mut run: Path = Vec::new();
                for &id in path {
                    let inside = clip.contains_point(arcs, arc_sample_point(arcs, id));
                    if mode.keeps(inside) {
                        run.push(id);
                    } else if !run.is_empty() {
                        out.push(std::mem::take(&mut run));
                    }
                }
                if !run.is_empty() {
                    out.push(run);
                }
            }
            (!out.is_empty()).then_some(out)
        })
        .collect()
}

/// Keeps the points of each shape that the clip rings cover.
pub fn clip_points<F: Float>(
    arcs: &ArcStore<F>,
    shapes: &[Option<Vec<Point2<F>>>],
    clip: &RingIndex<F>,
) -> Vec<Option<Vec<Point2<F>>>> {
    filter_points(arcs, shapes, clip, ClipMode::Clip)
}

/// Keeps the points of each shape that the clip rings do not cover.
pub fn erase_points<F: Float>(
    arcs: &ArcStore<F>,
    shapes: &[Option<Vec<Point2<F>>>],
    clip: &RingIndex<F>,
) -> Vec<Option<Vec<Point2<F>>>> {
    filter_points(arcs, shapes, clip, ClipMode::Erase)
}

fn filter_points<F: Float>(
    arcs: &ArcStore<F>,
    shapes: &[Option<Vec<Point2<F>>>],
    clip: &RingIndex<F>,
    mode: ClipMode,
) -> Vec<Option<Vec<Point2<F>>>> {
    shapes
        .iter()
        .map(|shape| {
            let kept: Vec<Point2<F>> = shape
                .iter()
                .flatten()
                .copied()
                .filter(|&p| mode.keeps(clip.contains_point(arcs, p)))
                .collect();
            (!kept.is_empty()).then_some(kept)
        })
        .collect()
}
