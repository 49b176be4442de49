//! Layers of shapes that reference arcs.

use super::builder::Path;
use crate::arcs::ArcId;
use crate::error::{Result, TopologyError};
use crate::primitives::Point2;

/// A feature's geometry: a list of paths, or `None` for a feature without
/// geometry.
pub type Shape = Option<Vec<Path>>;

/// Kind of geometry held by a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryType {
    /// Open chains.
    Polyline,
    /// Closed rings; clockwise rings enclose space, counter-clockwise rings
    /// are holes.
    Polygon,
}

impl GeometryType {
    /// Lowercase name used in messages.
    pub fn name(self) -> &'static str {
        match self {
            GeometryType::Polyline => "polyline",
            GeometryType::Polygon => "polygon",
        }
    }
}

/// A named collection of shapes of one geometry type.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Layer {
    pub name: Option<String>,
    pub geometry_type: Option<GeometryType>,
    pub shapes: Vec<Shape>,
}

impl Layer {
    /// Creates a layer of the given type.
    pub fn new(geometry_type: GeometryType, shapes: Vec<Shape>) -> Self {
        Self {
            name: None,
            geometry_type: Some(geometry_type),
            shapes,
        }
    }

    /// Sets the layer name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Returns an error unless the layer holds geometry of type `expected`.
    pub fn require(&self, expected: GeometryType) -> Result<()> {
        match self.geometry_type {
            None => Err(TopologyError::MissingGeometryType),
            Some(found) if found != expected => Err(TopologyError::WrongGeometryType {
                expected: expected.name(),
                found: found.name(),
            }),
            Some(_) => Ok(()),
        }
    }

    /// Every path of every shape.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.shapes.iter().flatten().flatten()
    }

    /// Applies `f` to every arc reference, dropping paths left empty and
    /// nulling shapes left without paths.
    pub(crate) fn remap_paths(&mut self, mut f: impl FnMut(&Path) -> Path) {
        for shape in &mut self.shapes {
            if let Some(paths) = shape {
                let mapped: Vec<Path> = paths.iter().map(&mut f).filter(|p| !p.is_empty()).collect();
                *shape = if mapped.is_empty() { None } else { Some(mapped) };
            }
        }
    }

    /// Flags the arcs referenced by this layer.
    pub fn arc_usage(&self, arc_count: usize) -> Vec<bool> {
        let mut used = vec![false; arc_count];
        for id in self.paths().flatten() {
            if let Some(slot) = used.get_mut(id.index()) {
                *slot = true;
            }
        }
        used
    }

    /// Number of shapes with geometry.
    pub fn feature_count(&self) -> usize {
        self.shapes.iter().filter(|s| s.is_some()).count()
    }
}

/// A layer of raw, non-topological coordinates to be imported.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerInput<F> {
    pub name: Option<String>,
    pub geometry_type: GeometryType,
    /// Per shape, a list of paths given as vertex lists; `None` for a
    /// feature without geometry.
    pub shapes: Vec<Option<Vec<Vec<Point2<F>>>>>,
}

impl<F> LayerInput<F> {
    /// Creates an unnamed input layer.
    pub fn new(geometry_type: GeometryType, shapes: Vec<Option<Vec<Vec<Point2<F>>>>>) -> Self {
        Self {
            name: None,
            geometry_type,
            shapes,
        }
    }

    /// Creates a polygon input layer in which every shape has one ring.
    pub fn polygons(rings: Vec<Vec<Point2<F>>>) -> Self {
        Self::new(
            GeometryType::Polygon,
            rings.into_iter().map(|r| Some(vec![r])).collect(),
        )
    }
}

/// Reverses a path: arcs in reverse order, each traversed the other way.
pub fn reverse_path(path: &[ArcId]) -> Path {
    path.iter().rev().map(|id| id.reversed()).collect()
}
