//! Exact-coordinate point chains.

use num_traits::Float;
use rustc_hash::FxHashMap;

/// Hashable form of an exact coordinate pair.
///
/// Negative zero is folded onto positive zero so both compare equal, as
/// they do under `==`.
pub(crate) type CoordKey = ((u64, i16, i8), (u64, i16, i8));

#[inline]
pub(crate) fn coord_key<F: Float>(x: F, y: F) -> CoordKey {
    let zero = F::zero();
    ((x + zero).integer_decode(), (y + zero).integer_decode())
}

/// Links every vertex of a coordinate buffer to the other vertices that
/// have exactly the same coordinates.
///
/// The links form closed cycles: following [`PointChains::next`] from any
/// vertex visits every coincident vertex and returns to the start. A vertex
/// with unique coordinates links to itself.
#[derive(Debug, Clone)]
pub struct PointChains {
    next: Vec<usize>,
}

impl PointChains {
    /// Builds chains over parallel coordinate buffers.
    pub fn new<F: Float>(xx: &[F], yy: &[F]) -> Self {
        Self::from_points(xx.len(), |i| (xx[i], yy[i]))
    }

    /// Builds chains over `n` points supplied by `point(i)`.
    pub(crate) fn from_points<F: Float>(n: usize, point: impl Fn(usize) -> (F, F)) -> Self {
        let mut next: Vec<usize> = (0..n).collect();
        let mut heads: FxHashMap<CoordKey, usize> = FxHashMap::default();
        heads.reserve(n);
        for i in 0..n {
            let (x, y) = point(i);
            match heads.get(&coord_key(x, y)) {
                Some(&head) => {
                    next[i] = next[head];
                    next[head] = i;
                }
                None => {
                    heads.insert(coord_key(x, y), i);
                }
            }
        }
        Self { next }
    }

    /// Next vertex in the cycle of coincident vertices.
    #[inline]
    pub fn next(&self, i: usize) -> usize {
        self.next[i]
    }

    /// Vertices coincident with `i`, excluding `i` itself.
    pub fn coincident(&self, i: usize) -> impl Iterator<Item = usize> + '_ {
        let mut cur = self.next[i];
        std::iter::from_fn(move || {
            if cur == i {
                None
            } else {
                let out = cur;
                cur = self.next[cur];
                Some(out)
            }
        })
    }

    /// Returns true if no other vertex shares the coordinates of `i`.
    #[inline]
    pub fn is_unique(&self, i: usize) -> bool {
        self.next[i] == i
    }

    /// Number of vertices indexed.
    pub fn len(&self) -> usize {
        self.next.len()
    }

    /// Returns true if no vertices are indexed.
    pub fn is_empty(&self) -> bool {
        self.next.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chains_form_cycles() {
        let xx = [0.0, 1.0, 0.0, 2.0, 0.0];
        let yy = [0.0, 1.0, 0.0, 2.0, 0.0];
        let chains = PointChains::new(&xx, &yy);
        let mut group: Vec<usize> = chains.coincident(0).collect();
        group.sort_unstable();
        assert_eq!(group, vec![2, 4]);
        assert!(chains.is_unique(1));
        assert_eq!(chains.coincident(3).count(), 0);
        // following the links from any member returns to it
        let mut cur = chains.next(2);
        let mut steps = 1;
        while cur != 2 {
            cur = chains.next(cur);
            steps += 1;
        }
        assert_eq!(steps, 3);
    }

    #[test]
    fn test_negative_zero_matches() {
        let chains = PointChains::new(&[0.0, -0.0], &[1.0, 1.0]);
        assert_eq!(chains.next(0), 1);
    }
}
