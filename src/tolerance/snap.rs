//! Coordinate snapping applied before topology is built.

use num_traits::Float;

/// Fraction of the average segment length used as the automatic snapping
/// interval.
pub const AUTO_SNAP_FACTOR: f64 = 0.02;

/// Rounds every coordinate to the nearest multiple of `grid_size`.
///
/// Does nothing for a non-positive or non-finite grid.
pub fn snap_to_grid<F: Float>(xx: &mut [F], yy: &mut [F], grid_size: F) {
    if !(grid_size > F::zero()) || !grid_size.is_finite() {
        return;
    }
    for v in xx.iter_mut().chain(yy.iter_mut()) {
        *v = (*v / grid_size).round() * grid_size;
    }
}

/// Snapping interval derived from the mean segment length of a set of
/// paths given as a length table and flat coordinates.
///
/// Returns zero when there are no segments.
pub fn auto_snap_interval<F: Float>(lengths: &[usize], xx: &[F], yy: &[F]) -> F {
    let mut total = F::zero();
    let mut count = 0usize;
    let mut start = 0;
    for &n in lengths {
        for i in start + 1..start + n {
            let dx = xx[i] - xx[i - 1];
            let dy = yy[i] - yy[i - 1];
            total = total + (dx * dx + dy * dy).sqrt();
            count += 1;
        }
        start += n;
    }
    if count == 0 {
        return F::zero();
    }
    total / F::from(count).unwrap() * F::from(AUTO_SNAP_FACTOR).unwrap()
}

/// Removes consecutive duplicate vertices within each path.
///
/// Returns the new length table; `xx` and `yy` are compacted in place.
pub fn remove_repeated_points<F: Float>(lengths: &[usize], xx: &mut Vec<F>, yy: &mut Vec<F>) -> Vec<usize> {
    let mut out = Vec::with_capacity(lengths.len());
    let mut src = 0;
    let mut dst = 0;
    for &n in lengths {
        let path_start = dst;
        for i in src..src + n {
            if dst > path_start && xx[dst - 1] == xx[i] && yy[dst - 1] == yy[i] {
                continue;
            }
            xx[dst] = xx[i];
            yy[dst] = yy[i];
            dst += 1;
        }
        out.push(dst - path_start);
        src += n;
    }
    xx.truncate(dst);
    yy.truncate(dst);
    out
}
