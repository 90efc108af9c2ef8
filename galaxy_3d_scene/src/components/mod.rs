//! Bundled components: ready-made behavior units that cache data derived
//! from their node's world-space pose.
//!
//! Both types observe their node's transform: a pose change only flags them
//! stale, and the derived data is rebuilt on the next read.

mod bounding_volume;
mod camera;
mod frustum;

pub use bounding_volume::{BoundingVolume, AABB};
pub use camera::Camera;
pub use frustum::Frustum;
