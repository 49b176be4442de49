//! Ring assembly over the arc graph.
//!
//! Every polygon operation here works the same way: mark which arc
//! directions belong to the result in a [`RouteTable`], then walk the
//! marked routes with a [`PathFinder`] that always takes the rightmost turn,
//! so each closed walk is a ring with its interior on the right.
//!
//! The `Dataset` methods first split arcs at their crossings, then run one
//! operation over a whole layer and return the result as a new layer.

mod clip;
mod dissolve;
mod flags;
mod pathfinder;
mod repair;
mod report;

pub use clip::{
    clip_points, clip_polygons, clip_polylines, erase_points, erase_polygons, erase_polylines,
    slice_polygons, ClipMode, Slices,
};
pub use dissolve::{dissolve_shapes, flatten_shape};
pub use flags::{RouteFlags, RouteTable};
pub use pathfinder::{PathFinder, Router, Trace};
pub use repair::{repair_self_intersections, split_ring};
pub use report::TraversalReport;

use clip::filter_polylines;
use crate::error::{Result, TopologyError};
use crate::polygon::RingIndex;
use crate::topology::{Dataset, GeometryType, Layer, Shape};
use num_traits::Float;
use std::hash::Hash;
use tracing::debug;

impl<F: Float> Dataset<F> {
    fn layer_at(&self, idx: usize) -> Result<&Layer> {
        self.layers.get(idx).ok_or_else(|| {
            TopologyError::InvalidInput(format!(
                "layer {idx} out of range for {} layers",
                self.layers.len()
            ))
        })
    }

    fn require_polygons(&self, idx: usize) -> Result<()> {
        self.layer_at(idx)?.require(GeometryType::Polygon)
    }

    fn derived_layer(&self, idx: usize, geometry_type: GeometryType, shapes: Vec<Shape>) -> Layer {
        Layer {
            name: self.layers[idx].name.clone(),
            geometry_type: Some(geometry_type),
            shapes,
        }
    }

    /// Flattens every shape of a polygon layer so its rings do not overlap.
    pub fn flatten_layer(&mut self, layer: usize) -> Result<(Layer, TraversalReport)> {
        self.require_polygons(layer)?;
        let (_, nodes) = self.add_intersection_cuts()?;
        let mut report = TraversalReport::default();
        let shapes = self.layers[layer]
            .shapes
            .iter()
            .map(|shape| {
                let flat = flatten_shape(&self.arcs, &nodes, shape.as_ref()?, &mut report);
                (!flat.is_empty()).then_some(flat)
            })
            .collect();
        Ok((self.derived_layer(layer, GeometryType::Polygon, shapes), report))
    }

    /// Merges every shape of a polygon layer into a single shape.
    pub fn dissolve_layer(&mut self, layer: usize) -> Result<(Layer, TraversalReport)> {
        let count = self.layer_at(layer)?.shapes.len();
        self.dissolve_layer_by(layer, &vec![(); count])
    }

    /// Merges the shapes of a polygon layer that share a key.
    ///
    /// `keys` holds one key per shape. Output shapes are ordered by the
    /// first appearance of each key.
    pub fn dissolve_layer_by<K: Eq + Hash>(
        &mut self,
        layer: usize,
        keys: &[K],
    ) -> Result<(Layer, TraversalReport)> {
        self.require_polygons(layer)?;
        let count = self.layers[layer].shapes.len();
        if keys.len() != count {
            return Err(TopologyError::InvalidInput(format!(
                "{} dissolve keys for {count} shapes",
                keys.len()
            )));
        }
        let (_, nodes) = self.add_intersection_cuts()?;
        let shapes = &self.layers[layer].shapes;
        let (shapes, report) = dissolve_shapes(&self.arcs, &nodes, shapes, keys);
        debug!(shapes = count, groups = shapes.len(), "dissolved layer");
        Ok((self.derived_layer(layer, GeometryType::Polygon, shapes), report))
    }

    /// Keeps the parts of the `target` layer covered by the polygons of the
    /// `clip` layer. The target may hold polygons or polylines.
    pub fn clip_layer(&mut self, target: usize, clip: usize) -> Result<(Layer, TraversalReport)> {
        self.clip_layer_with(target, clip, ClipMode::Clip)
    }

    /// Removes the parts of the `target` layer covered by the polygons of
    /// the `clip` layer. The target may hold polygons or polylines.
    pub fn erase_layer(&mut self, target: usize, clip: usize) -> Result<(Layer, TraversalReport)> {
        self.clip_layer_with(target, clip, ClipMode::Erase)
    }

    fn clip_layer_with(
        &mut self,
        target: usize,
        clip: usize,
        mode: ClipMode,
    ) -> Result<(Layer, TraversalReport)> {
        self.require_polygons(clip)?;
        let target_type = self
            .layer_at(target)?
            .geometry_type
            .ok_or(TopologyError::MissingGeometryType)?;
        let (_, nodes) = self.add_intersection_cuts()?;
        let targets = &self.layers[target].shapes;
        let clips = &self.layers[clip].shapes;

        let (shapes, report) = match target_type {
            GeometryType::Polygon => match mode {
                ClipMode::Clip => clip_polygons(&self.arcs, &nodes, targets, clips),
                ClipMode::Erase => erase_polygons(&self.arcs, &nodes, targets, clips),
            },
            GeometryType::Polyline => {
                let mut report = TraversalReport::default();
                let rings: Vec<_> = clips.iter().flatten().flatten().cloned().collect();
                let boundary = flatten_shape(&self.arcs, &nodes, &rings, &mut report);
                let index = RingIndex::new(&self.arcs, boundary);
                let shapes = filter_polylines(&self.arcs, targets, &index, mode);
                (shapes, report)
            }
        };
        Ok((self.derived_layer(target, target_type, shapes), report))
    }

    /// Cuts a polygon layer by each shape of another polygon layer.
    ///
    /// Returns one layer per clip shape, followed by a layer holding what no
    /// clip shape covers.
    pub fn slice_layer(
        &mut self,
        target: usize,
        clip: usize,
    ) -> Result<(Vec<Layer>, TraversalReport)> {
        self.require_polygons(target)?;
        self.require_polygons(clip)?;
        let (_, nodes) = self.add_intersection_cuts()?;
        let (slices, report) = slice_polygons(
            &self.arcs,
            &nodes,
            &self.layers[target].shapes,
            &self.layers[clip].shapes,
        );
        let mut layers: Vec<Layer> = slices
            .pieces
            .into_iter()
            .map(|shapes| self.derived_layer(target, GeometryType::Polygon, shapes))
            .collect();
        layers.push(self.derived_layer(target, GeometryType::Polygon, slices.remainder));
        Ok((layers, report))
    }

    /// Splits the self-intersecting rings of a polygon layer into simple
    /// rings.
    pub fn repair_layer(&mut self, layer: usize) -> Result<(Layer, TraversalReport)> {
        self.require_polygons(layer)?;
        let (cuts, _) = self.add_intersection_cuts()?;
        let mut report = TraversalReport::default();
        let shapes = self.layers[layer]
            .shapes
            .iter()
            .map(|shape| {
                let rings = repair_self_intersections(&self.arcs, shape.as_ref()?, &mut report);
                (!rings.is_empty()).then_some(rings)
            })
            .collect();
        debug!(intersections = cuts.intersections, "repaired layer");
        Ok((self.derived_layer(layer, GeometryType::Polygon, shapes), report))
    }
}
