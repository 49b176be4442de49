//! Adjacency between arcs that meet at a common endpoint.

use crate::arcs::{ArcId, ArcStore};
use crate::primitives::Point2;
use crate::topology::chains::{coord_key, CoordKey};
use num_traits::Float;
use rustc_hash::FxHashMap;

/// Index of arc endpoints ("nodes").
///
/// Both ends of every included arc are entered; entry `2 * i` is the first
/// vertex of arc `i` and entry `2 * i + 1` its last vertex. Entries with
/// identical coordinates are linked in a cycle, so the arcs meeting at a
/// node are found by walking the cycle.
///
/// The index is a snapshot: it must be rebuilt after arcs are rewritten.
#[derive(Debug, Clone)]
pub struct NodeIndex<F> {
    next: Vec<usize>,
    ends: Vec<Point2<F>>,
    inner: Vec<Point2<F>>,
    lengths: Vec<usize>,
    included: Vec<bool>,
}

impl<F: Float> NodeIndex<F> {
    /// Indexes every arc of `arcs`.
    pub fn new(arcs: &ArcStore<F>) -> Self {
        Self::with_filter(arcs, |_| true)
    }

    /// Indexes only the arcs for which `include(idx)` returns true.
    pub fn with_filter(arcs: &ArcStore<F>, mut include: impl FnMut(usize) -> bool) -> Self {
        let n = arcs.len();
        let mut next: Vec<usize> = (0..2 * n).collect();
        let mut ends = Vec::with_capacity(2 * n);
        let mut inner = Vec::with_capacity(2 * n);
        let mut included = Vec::with_capacity(n);
        let mut heads: FxHashMap<CoordKey, usize> = FxHashMap::default();

        for idx in 0..n {
            let keep = include(idx);
            included.push(keep);
            for (k, id) in [ArcId::forward(idx), ArcId::reverse(idx)].into_iter().enumerate() {
                let entry = 2 * idx + k;
                let p = arcs.arc_first_point(id);
                let second = if arcs.arc_len(idx) > 1 {
                    arcs.vertex(arcs.nth_vertex_index(id, 1))
                } else {
                    p
                };
                ends.push(p);
                inner.push(second);
                if !keep {
                    continue;
                }
                match heads.get(&coord_key(p.x, p.y)) {
                    Some(&head) => {
                        next[entry] = next[head];
                        next[head] = entry;
                    }
                    None => {
                        heads.insert(coord_key(p.x, p.y), entry);
                    }
                }
            }
        }

        Self {
            next,
            ends,
            inner,
            lengths: arcs.lengths().to_vec(),
            included,
        }
    }

    /// Number of arcs the index was built over, included or not.
    pub fn arc_count(&self) -> usize {
        self.lengths.len()
    }

    /// Returns true if arc `idx` passed the filter.
    pub fn is_included(&self, idx: usize) -> bool {
        self.included[idx]
    }

    /// Entry of the endpoint where travel along `id` begins.
    #[inline]
    fn start_entry(id: ArcId) -> usize {
        2 * id.index() + usize::from(!id.is_forward())
    }

    /// The arc that starts at `entry`, oriented away from the node.
    #[inline]
    fn outgoing(entry: usize) -> ArcId {
        ArcId::new(entry / 2, entry % 2 == 0)
    }

    fn others(&self, entry: usize) -> impl Iterator<Item = usize> + '_ {
        let mut cur = self.next[entry];
        std::iter::from_fn(move || {
            if cur == entry {
                None
            } else {
                let out = cur;
                cur = self.next[cur];
                Some(out)
            }
        })
    }

    /// Arcs meeting `id` at the node where `id` ends.
    ///
    /// Each arc is oriented so that it also ends at that node. Reverse an
    /// element to continue travelling away from the node. The order is the
    /// order of the node's chain, not an angular order.
    pub fn connected_arcs(&self, id: ArcId) -> Vec<ArcId> {
        self.others(Self::start_entry(id.reversed()))
            .map(|entry| Self::outgoing(entry).reversed())
            .collect()
    }

    /// Number of arc ends at the node where `id` ends, including `id`.
    pub fn node_degree(&self, id: ArcId) -> usize {
        self.others(Self::start_entry(id.reversed())).count() + 1
    }

    /// Coordinates of the node where `id` ends.
    pub fn node_point(&self, id: ArcId) -> Point2<F> {
        self.ends[Self::start_entry(id.reversed())]
    }

    /// Lowest-numbered arc that duplicates `id`, oriented like `id`.
    ///
    /// Two arcs match when they have the same vertex count, the same
    /// endpoints and the same vertices next to each endpoint. Returns `id`
    /// itself when there is no lower duplicate.
    pub fn find_matching_arc(&self, id: ArcId) -> ArcId {
        let start = Self::start_entry(id);
        let end = Self::start_entry(id.reversed());
        let mut best = id;
        for entry in self.others(start) {
            let cand = Self::outgoing(entry);
            let cand_end = Self::start_entry(cand.reversed());
            let same = self.lengths[cand.index()] == self.lengths[id.index()]
                && self.inner[entry].same_xy(self.inner[start])
                && self.ends[cand_end].same_xy(self.ends[end])
                && self.inner[cand_end].same_xy(self.inner[end]);
            if same && cand.index() < best.index() {
                best = cand;
            }
        }
        best
    }
}
