//! Ring assembly by always taking the rightmost turn.

use super::flags::RouteTable;
use crate::arcs::{ArcId, ArcStore};
use crate::nodes::NodeIndex;
use crate::primitives::Vec2;
use crate::topology::Path;
use num_traits::Float;
use std::cmp::Ordering;

/// Route access used while tracing.
pub trait Router {
    /// Returns true if `id` may be considered when choosing a turn.
    fn is_visible(&self, id: ArcId) -> bool;

    /// Returns true if a trace may start along `id`.
    fn is_open(&self, id: ArcId) -> bool;

    /// Consumes the route along `id`. Returns false if the path must be
    /// abandoned.
    fn use_route(&mut self, id: ArcId) -> bool;

    /// Returns true if a refused route along `id` leads out of the region
    /// being assembled, rather than having been consumed already. Traces
    /// refused this way are discarded instead of reported as blocked.
    fn is_excluded(&self, _id: ArcId) -> bool {
        false
    }
}

impl Router for RouteTable {
    fn is_visible(&self, id: ArcId) -> bool {
        RouteTable::is_visible(self, id)
    }

    fn is_open(&self, id: ArcId) -> bool {
        RouteTable::is_open(self, id)
    }

    fn use_route(&mut self, id: ArcId) -> bool {
        RouteTable::use_route(self, id)
    }
}

/// Outcome of tracing from one arc.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trace {
    /// The path returned to its starting arc.
    Ring(Path),
    /// A route on the way was already consumed.
    Blocked,
    /// A route on the way leads out of the region being assembled.
    Discarded,
    /// No way onward (or only a way straight back). Holds the partial path.
    DeadEnd(Path),
}

/// Traces rings through the arc graph.
///
/// Rings are followed with their interior on the right, so at each node the
/// tracer takes the sharpest available right turn.
#[derive(Debug, Clone, Copy)]
pub struct PathFinder<'a, F> {
    arcs: &'a ArcStore<F>,
    nodes: &'a NodeIndex<F>,
}

impl<'a, F: Float> PathFinder<'a, F> {
    /// Creates a tracer over `arcs` using the adjacency in `nodes`.
    pub fn new(arcs: &'a ArcStore<F>, nodes: &'a NodeIndex<F>) -> Self {
        Self { arcs, nodes }
    }

    /// Traces a ring starting with `start`.
    pub fn trace(&self, start: ArcId, router: &mut impl Router) -> Trace {
        if !router.use_route(start) {
            return Self::refused(start, router);
        }
        let limit = 2 * self.arcs.len() + 1;
        let mut path = vec![start];
        let mut cur = start;
        loop {
            let Some(next) = self.next_arc(cur, router) else {
                return Trace::DeadEnd(path);
            };
            if next == cur.reversed() {
                return Trace::DeadEnd(path);
            }
            if next == start {
                return Trace::Ring(path);
            }
            if !router.use_route(next) {
                return Self::refused(next, router);
            }
            path.push(next);
            if path.len() > limit {
                return Trace::DeadEnd(path);
            }
            cur = next;
        }
    }

    fn refused(id: ArcId, router: &impl Router) -> Trace {
        if router.is_excluded(id) {
            Trace::Discarded
        } else {
            Trace::Blocked
        }
    }

    /// The visible arc leaving the end node of `prev` that makes the
    /// sharpest right turn.
    pub fn next_arc(&self, prev: ArcId, router: &impl Router) -> Option<ArcId> {
        let arcs = self.arcs;
        let node = arcs.arc_last_point(prev);
        let from = arcs.vertex(arcs.nth_vertex_index(prev.reversed(), 1));
        let back = from - node;
        let tau = F::from(std::f64::consts::TAU).unwrap();

        let mut best: Option<(ArcId, F, Vec2<F>)> = None;
        for incoming in self.nodes.connected_arcs(prev) {
            let cand = incoming.reversed();
            if !router.is_visible(cand) {
                continue;
            }
            let dir = arcs.vertex(arcs.nth_vertex_index(cand, 1)) - node;
            let mut angle = back.ccw_angle_to(dir);
            if angle.is_nan() {
                continue;
            }
            if angle == F::zero() {
                angle = tau;
            }
            let better = match best {
                None => true,
                Some((best_id, best_angle, best_dir)) => match angle.partial_cmp(&best_angle) {
                    Some(Ordering::Less) => true,
                    Some(Ordering::Greater) | None => false,
                    Some(Ordering::Equal) => {
                        let cross = best_dir.cross(dir);
                        cross < F::zero() || (cross == F::zero() && cand.index() < best_id.index())
                    }
                },
            };
            if better {
                best = Some((cand, angle, dir));
            }
        }

        best.map(|(id, _, _)| id)
    }
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

    #[test]
    fn test_single_ring_round_trip() {
        let arcs = store(&[&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0), (0.0, 0.0)]]);
        let nodes = NodeIndex::new(&arcs);
        let mut table = RouteTable::new(1);
        let ring = vec![ArcId::forward(0)];
        table.open_routes(&arcs, [&ring], true, false, false);
        let finder = PathFinder::new(&arcs, &nodes);
        assert_eq!(finder.trace(ArcId::forward(0), &mut table), Trace::Ring(ring));
        // the route is consumed
        assert_eq!(finder.trace(ArcId::forward(0), &mut table), Trace::Blocked);
    }

    #[test]
    fn test_takes_rightmost_turn() {
        // from (0,0) north to (0,1), then branches west, north and east
        let arcs = store(&[
            &[(0.0, 0.0), (0.0, 1.0)],
            &[(0.0, 1.0), (-1.0, 1.0)],
            &[(0.0, 1.0), (0.0, 2.0)],
            &[(0.0, 1.0), (1.0, 1.0)],
        ]);
        let nodes = NodeIndex::new(&arcs);
        let mut table = RouteTable::new(4);
        let all: Vec<Vec<ArcId>> = (0..4).map(|i| vec![ArcId::forward(i)]).collect();
        table.open_routes(&arcs, &all, true, false, false);
        let finder = PathFinder::new(&arcs, &nodes);
        assert_eq!(finder.next_arc(ArcId::forward(0), &table), Some(ArcId::forward(3)));
        table.hide(ArcId::forward(3));
        assert_eq!(finder.next_arc(ArcId::forward(0), &table), Some(ArcId::forward(2)));
    }

    #[test]
    fn test_dead_end_is_reported() {
        let arcs = store(&[&[(0.0, 0.0), (0.0, 1.0)], &[(0.0, 1.0), (1.0, 1.0)]]);
        let nodes = NodeIndex::new(&arcs);
        let mut table = RouteTable::new(2);
        let path = vec![ArcId::forward(0), ArcId::forward(1)];
        table.open_routes(&arcs, [&path], true, false, false);
        let finder = PathFinder::new(&arcs, &nodes);
        assert_eq!(
            finder.trace(ArcId::forward(0), &mut table),
            Trace::DeadEnd(vec![ArcId::forward(0), ArcId::forward(1)])
        );
    }

    #[test]
    fn test_two_arc_ring() {
        let arcs = store(&[
            &[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0)],
            &[(1.0, 1.0), (1.0, 0.0), (0.0, 0.0)],
        ]);
        let nodes = NodeIndex::new(&arcs);
        let mut table = RouteTable::new(2);
        let ring = vec![ArcId::forward(0), ArcId::forward(1)];
        table.open_routes(&arcs, [&ring], true, false, false);
        let finder = PathFinder::new(&arcs, &nodes);
        assert_eq!(finder.trace(ArcId::forward(1), &mut table), Trace::Ring(vec![ArcId::forward(1), ArcId::forward(0)]));
    }
}
