//! Pose: position, Euler rotation (degrees) and scale.
//!
//! Hierarchical composition adds Euler angles component-wise instead of
//! composing rotations. This matches the engine's established output but is
//! only exact when parent and child rotate about a single shared axis; deep
//! hierarchies rotating on several axes drift from true rotational
//! composition. Treat it as a known approximation.

use glam::Vec3;
use crate::math;

/// A position / rotation / scale triple.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    /// Translation
    pub position: Vec3,
    /// Euler angles in degrees (X, then Y, then Z)
    pub rotation: Vec3,
    /// Per-axis scale
    pub scale: Vec3,
}

impl Pose {
    /// Origin, no rotation, unit scale.
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    /// Build a pose from its three parts
    pub fn new(position: Vec3, rotation: Vec3, scale: Vec3) -> Self {
        Self { position, rotation, scale }
    }

    /// Absolute pose of a child with `relative` pose under a parent whose
    /// absolute pose is `parent`.
    ///
    /// - position: `parent.position + rotate(relative.position, parent.rotation)`
    /// - rotation: `parent.rotation + relative.rotation`
    /// - scale: `parent.scale * relative.scale`
    pub fn compose(parent: &Pose, relative: &Pose) -> Pose {
        let parent_rotation = math::euler_degrees_to_quat(parent.rotation);
        Pose {
            position: parent.position + parent_rotation * relative.position,
            rotation: parent.rotation + relative.rotation,
            scale: parent.scale * relative.scale,
        }
    }

    /// Inverse of [`Pose::compose`]: the relative pose that places `self`
    /// (an absolute pose) under `parent`.
    ///
    /// A parent scale of zero on an axis keeps `self.scale` on that axis.
    pub fn relative_to(&self, parent: &Pose) -> Pose {
        let parent_rotation = math::euler_degrees_to_quat(parent.rotation);
        Pose {
            position: parent_rotation.inverse() * (self.position - parent.position),
            rotation: self.rotation - parent.rotation,
            scale: math::divide_or_keep(self.scale, parent.scale),
        }
    }

    /// Component-wise comparison within `epsilon`
    pub fn abs_diff_eq(&self, other: &Pose, epsilon: f32) -> bool {
        self.position.abs_diff_eq(other.position, epsilon)
            && self.rotation.abs_diff_eq(other.rotation, epsilon)
            && self.scale.abs_diff_eq(other.scale, epsilon)
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
#[path = "pose_tests.rs"]
mod tests;
