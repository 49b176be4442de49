//! Splitting arcs at intersection points.

use super::detect::SegmentIntersection;
use crate::arcs::ArcStore;
use crate::error::Result;
use crate::primitives::Point2;
use num_traits::Float;
use std::cmp::Ordering;

/// A location where an arc is to be split.
///
/// `i` is the buffer offset of a vertex. The cut lies either on that vertex
/// or on the segment from `i` to `i + 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutPoint<F> {
    pub point: Point2<F>,
    pub i: usize,
}

/// Converts intersection records into cut points, one per segment side.
pub fn convert_intersections_to_cut_points<F: Float>(
    intersections: &[SegmentIntersection<F>],
) -> Vec<CutPoint<F>> {
    intersections
        .iter()
        .flat_map(|ix| {
            [ix.a, ix.b].into_iter().map(move |(i, j)| CutPoint {
                point: ix.point,
                i: i.min(j),
            })
        })
        .collect()
}

/// Sorts cut points along the buffers and drops those that would not
/// split anything: duplicates and points on an arc endpoint. A point lying
/// on the far vertex of its segment is moved onto that vertex.
fn prepare_cut_points<F: Float>(arcs: &ArcStore<F>, points: &[CutPoint<F>]) -> Vec<CutPoint<F>> {
    let n = arcs.point_count();
    let mut is_first = vec![false; n];
    let mut is_last = vec![false; n];
    for idx in 0..arcs.len() {
        let start = arcs.arc_start(idx);
        is_first[start] = true;
        is_last[start + arcs.arc_len(idx) - 1] = true;
    }
    let is_endpoint = |i: usize| is_first[i] || is_last[i];

    let mut cuts = Vec::with_capacity(points.len());
    for p in points.iter().filter(|p| p.i < n) {
        let i = if arcs.vertex(p.i).same_xy(p.point) {
            p.i
        } else if is_last[p.i] {
            // no segment follows the last vertex of an arc
            continue;
        } else if arcs.vertex(p.i + 1).same_xy(p.point) {
            p.i + 1
        } else {
            cuts.push(*p);
            continue;
        };
        if !is_endpoint(i) {
            cuts.push(CutPoint { point: p.point, i });
        }
    }

    cuts.sort_by(|a, b| {
        a.i.cmp(&b.i).then_with(|| {
            let v = arcs.vertex(a.i);
            v.distance_squared(a.point)
                .partial_cmp(&v.distance_squared(b.point))
                .unwrap_or(Ordering::Equal)
        })
    });
    cuts.dedup_by(|b, a| a.i == b.i && a.point.same_xy(b.point));
    cuts
}

/// Splits arcs at the given cut points.
///
/// Returns, for every original arc, the index of the first arc it was split
/// into; the remaining pieces follow contiguously. An empty cut list leaves
/// the store untouched. Existing vertices keep their thresholds and the
/// retained interval is kept; inserted vertices become arc endpoints.
pub fn insert_cut_points<F: Float>(arcs: &mut ArcStore<F>, points: &[CutPoint<F>]) -> Result<Vec<usize>> {
    let cuts = prepare_cut_points(arcs, points);
    if cuts.is_empty() {
        return Ok((0..arcs.len()).collect());
    }

    let capacity = arcs.point_count() + 2 * cuts.len();
    let mut xx = Vec::with_capacity(capacity);
    let mut yy = Vec::with_capacity(capacity);
    let mut zz = arcs.thresholds().map(|_| Vec::with_capacity(capacity));
    let mut nn = Vec::with_capacity(arcs.len() + cuts.len());
    let mut map = Vec::with_capacity(arcs.len());
    let mut pending = cuts.iter().peekable();

    let mut push = |p: Point2<F>, z: F, zz: &mut Option<Vec<F>>| {
        xx.push(p.x);
        yy.push(p.y);
        if let Some(zz) = zz {
            zz.push(z);
        }
    };
    for idx in 0..arcs.len() {
        map.push(nn.len());
        let start = arcs.arc_start(idx);
        let mut count = 0;
        for i in start..start + arcs.arc_len(idx) {
            let v = arcs.vertex(i);
            let z = arcs.thresholds().map_or(F::infinity(), |t| t[i]);
            push(v, z, &mut zz);
            count += 1;
            while let Some(cut) = pending.next_if(|c| c.i == i) {
                if !v.same_xy(cut.point) {
                    push(cut.point, F::infinity(), &mut zz);
                    count += 1;
                }
                nn.push(count);
                push(cut.point, F::infinity(), &mut zz);
                count = 1;
            }
        }
        nn.push(count);
    }

    let interval = arcs.retained_interval();
    arcs.replace_coords(nn, xx, yy)?;
    if let Some(zz) = zz {
        arcs.set_thresholds(zz)?;
        arcs.set_retained_interval(interval);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arcs::ArcId;

    fn store(arcs: &[&[(f64, f64)]]) -> ArcStore<f64> {
        let arcs: Vec<Vec<Point2<f64>>> = arcs
            .iter()
            .map(|a| a.iter().map(|&(x, y)| Point2::new(x, y)).collect())
            .collect();
        ArcStore::from_arcs(&arcs).unwrap()
    }

    #[test]
    fn test_empty_cut_list_is_identity() {
        let mut arcs = store(&[&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)], &[(5.0, 5.0), (6.0, 6.0)]]);
        let before = arcs.clone();
        let map = insert_cut_points(&mut arcs, &[]).unwrap();
        assert_eq!(map, vec![0, 1]);
        assert_eq!(arcs.xx(), before.xx());
        assert_eq!(arcs.yy(), before.yy());
        assert_eq!(arcs.lengths(), before.lengths());
    }

    #[test]
    fn test_segment_cut() {
        let mut arcs = store(&[&[(0.0, 0.0), (4.0, 0.0)], &[(9.0, 9.0), (9.0, 10.0)]]);
        let cuts = [CutPoint {
            point: Point2::new(1.0, 0.0),
            i: 0,
        }];
        let map = insert_cut_points(&mut arcs, &cuts).unwrap();
        assert_eq!(map, vec![0, 2]);
        assert_eq!(arcs.len(), 3);
        assert_eq!(arcs.arc_last_point(ArcId::forward(0)), Point2::new(1.0, 0.0));
        assert_eq!(arcs.arc_first_point(ArcId::forward(1)), Point2::new(1.0, 0.0));
        assert_eq!(arcs.arc_last_point(ArcId::forward(1)), Point2::new(4.0, 0.0));
    }

    #[test]
    fn test_vertex_cut_and_ordering() {
        let mut arcs = store(&[&[(0.0, 0.0), (2.0, 0.0), (4.0, 0.0), (4.0, 4.0)]]);
        let cuts = [
            CutPoint {
                point: Point2::new(3.5, 0.0),
                i: 1,
            },
            CutPoint {
                point: Point2::new(2.0, 0.0),
                i: 1,
            },
            CutPoint {
                point: Point2::new(2.5, 0.0),
                i: 1,
            },
            // far vertex of its segment
            CutPoint {
                point: Point2::new(4.0, 0.0),
                i: 1,
            },
            // arc endpoint
            CutPoint {
                point: Point2::new(0.0, 0.0),
                i: 0,
            },
        ];
        insert_cut_points(&mut arcs, &cuts).unwrap();
        let ends: Vec<f64> = (0..arcs.len())
            .map(|i| arcs.arc_last_point(ArcId::forward(i)).x)
            .collect();
        assert_eq!(ends, vec![2.0, 2.5, 3.5, 4.0, 4.0]);
        assert_eq!(arcs.arc_len(0), 2);
        assert_eq!(arcs.arc_last_point(ArcId::forward(4)), Point2::new(4.0, 4.0));
    }

    #[test]
    fn test_convert_uses_lower_offset() {
        let ix = SegmentIntersection {
            point: Point2::new(1.0, 1.0),
            a: (0, 1),
            b: (5, 5),
        };
        let cuts = convert_intersections_to_cut_points(&[ix]);
        assert_eq!(cuts.len(), 2);
        assert_eq!(cuts[0].i, 0);
        assert_eq!(cuts[1].i, 5);
    }
}
