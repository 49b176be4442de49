//! Node insertion at segment crossings.
//!
//! Boundaries that cross without sharing a vertex are split at the crossing
//! so that every later traversal sees the crossing as a node.

mod cut;
mod detect;

pub use cut::{convert_intersections_to_cut_points, insert_cut_points, CutPoint};
pub use detect::{
    detect_intersections, find_segment_intersections, Detection, SegmentIntersection,
    STRIPE_FACTOR,
};

use crate::arcs::ArcId;
use crate::error::Result;
use crate::nodes::NodeIndex;
use crate::topology::{Dataset, Path};
use num_traits::Float;
use tracing::debug;

/// Summary of a cut insertion pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CutReport {
    /// Intersection records found.
    pub intersections: usize,
    /// Intersections computed with the near-parallel fallback.
    pub snapped: usize,
    /// Arcs before and after the pass.
    pub arcs_before: usize,
    pub arcs_after: usize,
}

/// Rewrites a path after arc `k` was split into `map[k]..end(k)`.
pub(crate) fn expand_path(path: &[ArcId], map: &[usize], arc_count: usize) -> Path {
    let mut out = Vec::with_capacity(path.len());
    for &id in path {
        let k = id.index();
        let first = map[k];
        let end = map.get(k + 1).copied().unwrap_or(arc_count);
        if id.is_forward() {
            out.extend((first..end).map(ArcId::forward));
        } else {
            out.extend((first..end).rev().map(ArcId::reverse));
        }
    }
    out
}

impl<F: Float> Dataset<F> {
    /// Splits every arc at its crossings with other arcs (and itself), then
    /// rebuilds topology and drops duplicate or unreferenced arcs.
    ///
    /// Returns a report and a node index over the resulting arcs.
    pub fn add_intersection_cuts(&mut self) -> Result<(CutReport, NodeIndex<F>)> {
        let detection = detect_intersections(&self.arcs);
        let mut report = CutReport {
            intersections: detection.intersections.len(),
            snapped: detection.snapped,
            arcs_before: self.arcs.len(),
            arcs_after: self.arcs.len(),
        };
        if detection.intersections.is_empty() {
            let nodes = self.clean_arc_references();
            report.arcs_after = self.arcs.len();
            return Ok((report, nodes));
        }

        let cuts = convert_intersections_to_cut_points(&detection.intersections);
        let map = insert_cut_points(&mut self.arcs, &cuts)?;
        let arc_count = self.arcs.len();
        for layer in &mut self.layers {
            layer.remap_paths(|path| expand_path(path, &map, arc_count));
        }
        self.rebuild_topology()?;
        let nodes = self.clean_arc_references();
        report.arcs_after = self.arcs.len();
        debug!(
            intersections = report.intersections,
            arcs_before = report.arcs_before,
            arcs_after = report.arcs_after,
            "inserted intersection cuts"
        );
        Ok((report, nodes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::Point2;
    use crate::topology::{BuildOptions, GeometryType, LayerInput};

    fn pts(coords: &[(f64, f64)]) -> Vec<Point2<f64>> {
        coords.iter().map(|&(x, y)| Point2::new(x, y)).collect()
    }

    #[test]
    fn test_expand_path() {
        let map = vec![0, 3, 4];
        let path = vec![ArcId::forward(0), ArcId::reverse(2), ArcId::reverse(0)];
        let out = expand_path(&path, &map, 6);
        assert_eq!(
            out,
            vec![
                ArcId::forward(0),
                ArcId::forward(1),
                ArcId::forward(2),
                ArcId::reverse(5),
                ArcId::reverse(4),
                ArcId::reverse(2),
                ArcId::reverse(1),
                ArcId::reverse(0),
            ]
        );
    }

    #[test]
    fn test_overlapping_squares_are_noded() {
        let a = pts(&[(0.0, 0.0), (0.0, 2.0), (2.0, 2.0), (2.0, 0.0), (0.0, 0.0)]);
        let b = pts(&[(1.0, 1.0), (1.0, 3.0), (3.0, 3.0), (3.0, 1.0), (1.0, 1.0)]);
        let input = LayerInput::polygons(vec![a, b]);
        let (mut data, _) = Dataset::import(vec![input], BuildOptions::default()).unwrap();
        assert_eq!(data.arcs.len(), 2);
        let (report, nodes) = data.add_intersection_cuts().unwrap();
        assert_eq!(report.intersections, 2);
        assert_eq!(report.arcs_after, 4);
        assert!(data.validate().is_ok());
        for idx in 0..data.arcs.len() {
            assert_eq!(nodes.node_degree(ArcId::forward(idx)), 4);
        }
        assert!(find_segment_intersections(&data.arcs).is_empty());
    }

    #[test]
    fn test_no_crossings_keeps_arcs() {
        let line = LayerInput::new(
            GeometryType::Polyline,
            vec![Some(vec![pts(&[(0.0, 0.0), (1.0, 0.0), (2.0, 1.0)])])],
        );
        let (mut data, _) = Dataset::import(vec![line], BuildOptions::default()).unwrap();
        let before = data.arcs.xx().to_vec();
        let (report, _) = data.add_intersection_cuts().unwrap();
        assert_eq!(report.intersections, 0);
        assert_eq!(data.arcs.xx(), &before[..]);
    }

    #[test]
    fn test_cuts_keep_thresholds() {
        let lines = LayerInput::new(
            GeometryType::Polyline,
            vec![
                Some(vec![pts(&[(0.0, 0.0), (1.0, 0.5), (2.0, 0.0), (4.0, 0.0)])]),
                Some(vec![pts(&[(3.0, -1.0), (3.0, 1.0)])]),
            ],
        );
        let (mut data, _) = Dataset::import(vec![lines], BuildOptions::default()).unwrap();
        let z_at = |p: Point2<f64>| match (p.x, p.y) {
            (x, y) if x == 1.0 && y == 0.5 => 0.25,
            (x, y) if x == 2.0 && y == 0.0 => 1.0,
            _ => f64::INFINITY,
        };
        let zz = (0..data.arcs.point_count()).map(|i| z_at(data.arcs.vertex(i))).collect();
        data.arcs.set_thresholds(zz).unwrap();
        data.arcs.set_retained_interval(0.5);

        let (report, _) = data.add_intersection_cuts().unwrap();
        assert_eq!(report.intersections, 1);
        assert_eq!(data.arcs.retained_interval(), 0.5);
        let zz = data.arcs.thresholds().unwrap();
        for i in 0..data.arcs.point_count() {
            let p = data.arcs.vertex(i);
            if p.same_xy(Point2::new(3.0, 0.0)) {
                assert!(zz[i].is_infinite());
            } else if p.same_xy(Point2::new(1.0, 0.5)) {
                assert_eq!(zz[i], 0.25);
            }
        }
        let kept = data.shape_points(&data.layers[0].shapes[0]);
        assert_eq!(kept, vec![pts(&[(0.0, 0.0), (2.0, 0.0), (3.0, 0.0), (4.0, 0.0)])]);
    }
}
