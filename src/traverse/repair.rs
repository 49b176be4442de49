//! Splitting of rings that pass through the same node more than once.

use super::dissolve::drop_collapsed;
use super::report::TraversalReport;
use crate::arcs::{ArcId, ArcStore};
use crate::polygon::{arc_sample_point, path_area, point_in_ring};
use crate::topology::chains::coord_key;
use crate::topology::Path;
use num_traits::Float;
use rustc_hash::FxHashMap;

/// Splits a ring at every node it visits twice.
///
/// The ring is cut into simple loops, each keeping its own orientation, so a
/// figure-eight becomes two rings of opposite winding. Arcs must already be split at crossings.
pub fn split_ring<F: Float>(arcs: &ArcStore<F>, ring: &[ArcId]) -> Vec<Path> {
    let mut out = Vec::new();
    let mut work = vec![ring.to_vec()];
    while let Some(path) = work.pop() {
        match first_revisit(arcs, &path) {
            Some((i, j)) => {
                let mut rest = path[j..].to_vec();
                rest.extend_from_slice(&path[..i]);
                work.push(rest);
                work.push(path[i..j].to_vec());
            }
            None => out.push(path),
        }
    }
    out
}

/// Positions `i < j` of the first pair of arcs that start at the same node.
fn first_revisit<F: Float>(arcs: &ArcStore<F>, path: &[ArcId]) -> Option<(usize, usize)> {
    let mut seen = FxHashMap::default();
    for (j, &id) in path.iter().enumerate() {
        let p = arcs.arc_first_point(id);
        if let Some(&i) = seen.get(&coord_key(p.x, p.y)) {
            return Some((i, j));
        }
        seen.insert(coord_key(p.x, p.y), j);
    }
    None
}

/// Splits every self-touching ring of a polygon shape and drops the
/// collapsed pieces.
///
/// The pieces are then oriented by nesting: a ring inside an even number of
/// the shape's other rings runs clockwise, any other ring is a hole and runs
/// counter-clockwise. Both lobes of a figure-eight therefore come out as
/// clockwise rings.
pub fn repair_self_intersections<F: Float>(
    arcs: &ArcStore<F>,
    rings: &[Path],
    report: &mut TraversalReport,
) -> Vec<Path> {
    let split: Vec<Path> = rings.iter().flat_map(|r| split_ring(arcs, r)).collect();
    orient_by_nesting(arcs, drop_collapsed(arcs, split, report))
}

fn orient_by_nesting<F: Float>(arcs: &ArcStore<F>, rings: Vec<Path>) -> Vec<Path> {
    let depths: Vec<usize> = rings
        .iter()
        .enumerate()
        .map(|(i, ring)| {
            let Some(&first) = ring.first() else { return 0 };
            let sample = arc_sample_point(arcs, first);
            rings
                .iter()
                .enumerate()
                .filter(|&(j, other)| j != i && point_in_ring(arcs, other, sample))
                .count()
        })
        .collect();

    rings
        .into_iter()
        .zip(depths)
        .map(|(ring, depth)| {
            let clockwise = path_area(arcs, &ring) > F::zero();
            if clockwise == (depth % 2 == 0) {
                ring
            } else {
                ring.iter().rev().map(|id| id.reversed()).collect()
            }
        })
        .collect()
}
