//! Shared-boundary topology.
//!
//! Raw paths are converted into arcs so that a boundary shared by two
//! shapes is stored once. [`Dataset`] ties the arcs to layers of shapes and
//! provides the import, rebuild and cleanup passes that keep the two in
//! sync.

mod builder;
pub(crate) mod chains;
mod dataset;
mod layer;

pub use builder::{BuildOptions, Path, SnapMode, Topology, TopologyBuilder};
pub use chains::PointChains;
pub use dataset::{Dataset, ImportReport};
pub use layer::{reverse_path, GeometryType, Layer, LayerInput, Shape};
