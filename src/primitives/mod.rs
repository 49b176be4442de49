//! Floating-point geometric primitives shared by the arc graph.

mod point2;
mod segment2;
mod vec2;
mod vec3;

pub use point2::Point2;
pub use segment2::Segment2;
pub use vec2::Vec2;
pub use vec3::Vec3;
