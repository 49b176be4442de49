//! arcgraph - Shared-boundary topology for polygon and polyline datasets
//!
//! Shapes digitized independently are converted into a graph of arcs in
//! which every boundary shared by two shapes is stored once. Operations
//! then work on the graph: dissolving, clipping and erasing polygons,
//! repairing self-intersecting rings, and simplifying every arc
//! progressively so that neighbouring shapes never drift apart.
//!
//! Coordinates use a y-up convention. Polygon rings enclosing space run
//! clockwise and holes run counter-clockwise.

pub mod arcs;
pub mod bounds;
pub mod error;
pub mod intersect;
pub mod nodes;
pub mod polygon;
pub mod primitives;
pub mod simplify;
pub mod spatial;
pub mod tolerance;
pub mod topology;
pub mod traverse;

pub use arcs::{ArcId, ArcStore};
pub use bounds::Aabb2;
pub use error::{Result, TopologyError};
pub use intersect::CutReport;
pub use nodes::NodeIndex;
pub use primitives::{Point2, Segment2, Vec2, Vec3};
pub use simplify::{simplify, SimplifyMethod, SimplifyOptions};
pub use topology::{Dataset, GeometryType, Layer, LayerInput, Path, Shape, TopologyBuilder};
pub use traverse::TraversalReport;
