//! Visvalingam-Whyatt vertex thresholds.
//!
//! The vertex with the smallest effective area is removed repeatedly, and
//! each removal records the area at which it happened. The recorded values
//! never decrease in removal order, so filtering by threshold removes
//! vertices in the same order as the iterative algorithm.

use super::heap::IndexedMinHeap;
use num_traits::Float;

/// Visvalingam thresholds for one arc of `n` vertices.
///
/// `score(prev, i, next)` returns the effective area of vertex `i` between
/// its current neighbours. Endpoints receive infinity.
pub fn visvalingam_thresholds<F: Float>(
    n: usize,
    score: impl Fn(usize, usize, usize) -> F,
) -> Vec<F> {
    let mut out = vec![F::infinity(); n];
    if n < 3 {
        return out;
    }

    let mut prev: Vec<usize> = (0..n).map(|i| i.saturating_sub(1)).collect();
    let mut next: Vec<usize> = (0..n).map(|i| (i + 1).min(n - 1)).collect();
    let mut heap = IndexedMinHeap::new(n);
    for i in 1..n - 1 {
        heap.push(i, score(i - 1, i, i + 1));
    }

    let mut running = F::neg_infinity();
    while let Some((i, area)) = heap.pop() {
        // removal order must not lower the threshold
        running = running.max(area);
        out[i] = running;

        let (p, nx) = (prev[i], next[i]);
        next[p] = nx;
        prev[nx] = p;
        if p > 0 {
            heap.update(p, score(prev[p], p, nx));
        }
        if nx < n - 1 {
            heap.update(nx, score(p, nx, next[nx]));
        }
    }
    out
}
