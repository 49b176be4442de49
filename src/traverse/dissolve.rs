//! Flattening and dissolving of polygon shapes.
//!
//! Flattening rebuilds the rings of one shape so that no two of them
//! overlap: boundaries between parts of the shape disappear and regions
//! covered more than once are covered once. Dissolving flattens the rings
//! of several shapes together.

use super::flags::RouteTable;
use super::pathfinder::{PathFinder, Router, Trace};
use super::report::TraversalReport;
use crate::arcs::{ArcId, ArcStore};
use crate::nodes::NodeIndex;
use crate::polygon::{arc_sample_point, path_area, path_bounds, path_vertices, winding_number};
use crate::spatial::BoxTree;
use crate::topology::{Path, Shape};
use num_traits::Float;
use rustc_hash::FxHashMap;
use std::hash::Hash;
use tracing::debug;

const LEAF_SIZE: usize = 4;

/// Returns true if a ring has fewer than four vertices or zero area.
pub(crate) fn is_collapsed<F: Float>(arcs: &ArcStore<F>, ring: &[ArcId]) -> bool {
    path_vertices(arcs, ring).len() < 4 || path_area(arcs, ring) == F::zero()
}

/// Removes collapsed rings, counting them in `report`.
pub(crate) fn drop_collapsed<F: Float>(
    arcs: &ArcStore<F>,
    rings: Vec<Path>,
    report: &mut TraversalReport,
) -> Vec<Path> {
    let before = rings.len();
    let kept: Vec<Path> = rings.into_iter().filter(|r| !is_collapsed(arcs, r)).collect();
    report.collapsed_rings += before - kept.len();
    kept
}

/// Traces a ring from every open arc of `starts`, in order, handing each
/// closed ring to `on_ring`. Dead ends are recorded as collisions.
pub(crate) fn trace_all<F: Float, R: Router>(
    finder: &PathFinder<'_, F>,
    router: &mut R,
    starts: impl IntoIterator<Item = ArcId>,
    report: &mut TraversalReport,
    mut on_ring: impl FnMut(&mut R, Path),
) {
    for id in starts {
        if !router.is_open(id) {
            continue;
        }
        match finder.trace(id, router) {
            Trace::Ring(path) => on_ring(router, path),
            Trace::Blocked => report.blocked_paths += 1,
            Trace::Discarded => report.discarded_paths += 1,
            Trace::DeadEnd(path) => report.add_collision(path),
        }
    }
}

/// Hides every open arc direction that does not separate covered space
/// (on its right) from uncovered space (on its left).
///
/// Coverage is counted with winding numbers. Rings that run along the
/// arc itself contribute to one side only, according to their direction.
fn hide_interior_routes<F: Float>(arcs: &ArcStore<F>, rings: &[&Path], table: &mut RouteTable) {
    let mut users: FxHashMap<usize, Vec<(usize, bool)>> = FxHashMap::default();
    for (r, ring) in rings.iter().enumerate() {
        for &id in ring.iter() {
            users.entry(id.index()).or_default().push((r, id.is_forward()));
        }
    }
    let clockwise: Vec<bool> = rings.iter().map(|r| path_area(arcs, r) > F::zero()).collect();
    let mut slots = Vec::with_capacity(rings.len());
    let mut boxes = Vec::with_capacity(rings.len());
    for (r, ring) in rings.iter().enumerate() {
        if let Some(bb) = path_bounds(arcs, ring) {
            slots.push(r);
            boxes.push(bb);
        }
    }
    let tree = BoxTree::build(&boxes, LEAF_SIZE);

    let mut hidden = 0usize;
    let mut arc_ids: Vec<usize> = users.keys().copied().collect();
    arc_ids.sort_unstable();
    for idx in arc_ids {
        let own = &users[&idx];
        for forward in [true, false] {
            let id = ArcId::new(idx, forward);
            if !table.is_open(id) {
                continue;
            }
            let sample = arc_sample_point(arcs, id);
            let mut right = 0;
            let mut left = 0;
            for &(r, ring_fwd) in own {
                match (ring_fwd == forward, clockwise[r]) {
                    (true, true) => right += 1,
                    (true, false) => left -= 1,
                    (false, true) => left += 1,
                    (false, false) => right -= 1,
                }
            }
            for slot in tree.query_point(sample) {
                let r = slots[slot];
                if own.iter().any(|&(o, _)| o == r) {
                    continue;
                }
                let w = winding_number(arcs, rings[r], sample);
                right += w;
                left += w;
            }
            if !(right > 0 && left <= 0) {
                table.hide(id);
                hidden += 1;
            }
        }
    }
    if hidden > 0 {
        debug!(hidden, "hid interior routes");
    }
}

/// Flattens rings using a caller-provided table, which is left cleared.
pub(crate) fn flatten_with_table<F: Float>(
    arcs: &ArcStore<F>,
    nodes: &NodeIndex<F>,
    table: &mut RouteTable,
    rings: &[Path],
    report: &mut TraversalReport,
) -> Vec<Path> {
    let rings: Vec<&Path> = rings.iter().filter(|r| !r.is_empty()).collect();
    table.open_routes(arcs, rings.iter().copied(), true, false, true);
    hide_interior_routes(arcs, &rings, table);

    let finder = PathFinder::new(arcs, nodes);
    let mut out = Vec::new();
    let starts: Vec<ArcId> = rings.iter().flat_map(|r| r.iter().copied()).collect();
    trace_all(&finder, table, starts, report, |_, path| out.push(path));
    table.clear_routes(rings.iter().copied());
    drop_collapsed(arcs, out, report)
}

/// Rebuilds the rings of one polygon shape so they do not overlap.
///
/// Arcs shared by two rings of the shape are removed, as are arcs lying in
/// the interior of the shape's coverage.
pub fn flatten_shape<F: Float>(
    arcs: &ArcStore<F>,
    nodes: &NodeIndex<F>,
    rings: &[Path],
    report: &mut TraversalReport,
) -> Vec<Path> {
    let mut table = RouteTable::new(arcs.len());
    flatten_with_table(arcs, nodes, &mut table, rings, report)
}

/// Merges shapes that share a key into one flattened shape each.
///
/// Output shapes follow the order in which keys first appear. A group whose
/// rings all disappear yields `None`. Shapes beyond the end of `keys` are
/// ignored.
pub fn dissolve_shapes<F: Float, K: Eq + Hash>(
    arcs: &ArcStore<F>,
    nodes: &NodeIndex<F>,
    shapes: &[Shape],
    keys: &[K],
) -> (Vec<Shape>, TraversalReport) {
    let mut groups: FxHashMap<&K, usize> = FxHashMap::default();
    let mut members: Vec<Vec<Path>> = Vec::new();
    for (shape, key) in shapes.iter().zip(keys) {
        let g = *groups.entry(key).or_insert_with(|| {
            members.push(Vec::new());
            members.len() - 1
        });
        if let Some(paths) = shape {
            members[g].extend(paths.iter().cloned());
        }
    }

    let mut report = TraversalReport::default();
    let mut table = RouteTable::new(arcs.len());
    let out = members
        .iter()
        .map(|rings| {
            let flat = flatten_with_table(arcs, nodes, &mut table, rings, &mut report);
            (!flat.is_empty()).then_some(flat)
        })
        .collect();
    (out, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::Point2;

    fn store(arcs: &[&[(f64, f64)]]) -> ArcStore<f64> {
        let arcs: Vec<Vec<Point2<f64>>> = arcs
            .iter()
            .map(|a| a.iter().map(|&(x, y)| Point2::new(x, y)).collect())
            .collect();
        ArcStore::from_arcs(&arcs).unwrap()
    }

    fn square_ring(arcs: &mut Vec<Vec<(f64, f64)>>, x0: f64, y0: f64, size: f64) -> Path {
        arcs.push(vec![
            (x0, y0),
            (x0, y0 + size),
            (x0 + size, y0 + size),
            (x0 + size, y0),
            (x0, y0),
        ]);
        vec![ArcId::forward(arcs.len() - 1)]
    }

    fn build(raw: &[Vec<(f64, f64)>]) -> ArcStore<f64> {
        let refs: Vec<&[(f64, f64)]> = raw.iter().map(Vec::as_slice).collect();
        store(&refs)
    }

    /// Two unit squares sharing the edge x = 1, as produced by topology
    /// building: left outer chain, shared edge, right outer chain.
    fn adjacent_squares() -> (ArcStore<f64>, Vec<Path>) {
        let arcs = store(&[
            &[(1.0, 1.0), (1.0, 0.0)],
            &[(1.0, 0.0), (0.0, 0.0), (0.0, 1.0), (1.0, 1.0)],
            &[(1.0, 1.0), (2.0, 1.0), (2.0, 0.0), (1.0, 0.0)],
        ]);
        let left = vec![ArcId::forward(1), ArcId::forward(0)];
        let right = vec![ArcId::forward(2), ArcId::reverse(0)];
        (arcs, vec![left, right])
    }

    #[test]
    fn test_flatten_merges_adjacent_rings() {
        let (arcs, rings) = adjacent_squares();
        let nodes = NodeIndex::new(&arcs);
        let mut report = TraversalReport::default();
        let flat = flatten_shape(&arcs, &nodes, &rings, &mut report);
        assert_eq!(flat, vec![vec![ArcId::forward(1), ArcId::forward(2)]]);
        assert!(report.is_clean());
        assert_eq!(path_vertices(&arcs, &flat[0]).len(), 7);
    }

    #[test]
    fn test_flatten_keeps_hole() {
        let mut raw = Vec::new();
        let outer = square_ring(&mut raw, 0.0, 0.0, 4.0);
        raw.push(vec![(1.0, 1.0), (2.0, 1.0), (2.0, 2.0), (1.0, 2.0), (1.0, 1.0)]);
        let hole = vec![ArcId::forward(1)];
        let arcs = build(&raw);
        let nodes = NodeIndex::new(&arcs);
        let mut report = TraversalReport::default();
        let flat = flatten_shape(&arcs, &nodes, &[outer.clone(), hole.clone()], &mut report);
        assert_eq!(flat, vec![outer, hole]);
    }

    #[test]
    fn test_flatten_drops_contained_ring() {
        let mut raw = Vec::new();
        let outer = square_ring(&mut raw, 0.0, 0.0, 4.0);
        let inner = square_ring(&mut raw, 1.0, 1.0, 1.0);
        let arcs = build(&raw);
        let nodes = NodeIndex::new(&arcs);
        let mut report = TraversalReport::default();
        let flat = flatten_shape(&arcs, &nodes, &[outer.clone(), inner], &mut report);
        assert_eq!(flat, vec![outer]);
    }

    #[test]
    fn test_flatten_collapses_duplicate_ring() {
        let mut raw = Vec::new();
        let ring = square_ring(&mut raw, 0.0, 0.0, 1.0);
        let arcs = build(&raw);
        let nodes = NodeIndex::new(&arcs);
        let mut report = TraversalReport::default();
        let flat = flatten_shape(&arcs, &nodes, &[ring.clone(), ring.clone()], &mut report);
        assert_eq!(flat, vec![ring]);
    }

    #[test]
    fn test_dissolve_groups_by_key() {
        let (arcs, rings) = adjacent_squares();
        let nodes = NodeIndex::new(&arcs);
        let shapes = vec![Some(vec![rings[0].clone()]), None, Some(vec![rings[1].clone()])];

        let (merged, report) = dissolve_shapes(&arcs, &nodes, &shapes, &["a", "b", "a"]);
        assert!(report.is_clean());
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0], Some(vec![vec![ArcId::forward(1), ArcId::forward(2)]]));
        assert_eq!(merged[1], None);

        let (separate, _) = dissolve_shapes(&arcs, &nodes, &shapes, &[1, 2, 3]);
        assert_eq!(separate.len(), 3);
        assert_eq!(separate[0], Some(vec![rings[0].clone()]));
        assert_eq!(separate[2], Some(vec![rings[1].clone()]));
    }
}
