//! Vertex iteration over one arc.

use crate::primitives::Point2;
use num_traits::Float;

/// Iterator over the vertices of an arc in traversal order.
///
/// When a threshold buffer and a retained interval are supplied, interior
/// vertices whose threshold is below the interval are skipped. Arc endpoints
/// are always produced.
#[derive(Debug, Clone)]
pub struct ArcPoints<'a, F> {
    xx: &'a [F],
    yy: &'a [F],
    zz: Option<&'a [F]>,
    interval: F,
    first: usize,
    last: usize,
    front: usize,
    back: usize,
    forward: bool,
}

impl<'a, F: Float> ArcPoints<'a, F> {
    pub(crate) fn new(
        xx: &'a [F],
        yy: &'a [F],
        zz: Option<&'a [F]>,
        interval: F,
        start: usize,
        len: usize,
        forward: bool,
    ) -> Self {
        Self {
            xx,
            yy,
            zz,
            interval,
            first: start,
            last: start + len.max(1) - 1,
            front: start,
            back: start + len,
            forward,
        }
    }

    #[inline]
    fn keep(&self, i: usize) -> bool {
        if i == self.first || i == self.last {
            return true;
        }
        match self.zz {
            Some(zz) => zz[i] >= self.interval,
            None => true,
        }
    }
}

impl<F: Float> Iterator for ArcPoints<'_, F> {
    type Item = Point2<F>;

    fn next(&mut self) -> Option<Point2<F>> {
        while self.front < self.back {
            let i = if self.forward {
                self.front += 1;
                self.front - 1
            } else {
                self.back -= 1;
                self.back
            };
            if self.keep(i) {
                return Some(Point2::new(self.xx[i], self.yy[i]));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.back - self.front;
        (n.min(2), Some(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_and_reverse() {
        let xx = [0.0, 1.0, 2.0, 3.0];
        let yy = [0.0, 0.0, 0.0, 0.0];
        let fwd: Vec<f64> = ArcPoints::new(&xx, &yy, None, 0.0, 1, 3, true)
            .map(|p| p.x)
            .collect();
        assert_eq!(fwd, vec![1.0, 2.0, 3.0]);
        let rev: Vec<f64> = ArcPoints::new(&xx, &yy, None, 0.0, 0, 4, false)
            .map(|p| p.x)
            .collect();
        assert_eq!(rev, vec![3.0, 2.0, 1.0, 0.0]);
    }

    #[test]
    fn test_interval_filter_keeps_endpoints() {
        let xx = [0.0, 1.0, 2.0, 3.0, 4.0];
        let yy = [0.0; 5];
        let zz = [f64::INFINITY, 5.0, 1.0, 3.0, f64::INFINITY];
        let kept: Vec<f64> = ArcPoints::new(&xx, &yy, Some(&zz), 3.0, 0, 5, true)
            .map(|p| p.x)
            .collect();
        assert_eq!(kept, vec![0.0, 1.0, 3.0, 4.0]);
        let kept: Vec<f64> = ArcPoints::new(&xx, &yy, Some(&zz), f64::INFINITY, 0, 5, false)
            .map(|p| p.x)
            .collect();
        assert_eq!(kept, vec![4.0, 0.0]);
    }
}
