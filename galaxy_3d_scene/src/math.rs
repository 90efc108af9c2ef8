//! Rotation and matrix helpers for the pose cache.
//!
//! Rotations are stored as Euler angles in degrees and only converted to
//! radians here, when a rotation is actually built.

use glam::{Mat4, Quat, Vec3};

/// Canonical forward axis before rotation
pub const FORWARD: Vec3 = Vec3::new(0.0, 0.0, -1.0);
/// Canonical right axis before rotation
pub const RIGHT: Vec3 = Vec3::X;
/// Canonical up axis before rotation
pub const UP: Vec3 = Vec3::Y;

/// Rotation for Euler angles in degrees, applied as X, then Y, then Z
/// (`Rx * Ry * Rz`).
pub fn euler_degrees_to_quat(degrees: Vec3) -> Quat {
    let radians = Vec3::new(
        degrees.x.to_radians(),
        degrees.y.to_radians(),
        degrees.z.to_radians(),
    );
    Quat::from_rotation_x(radians.x)
        * Quat::from_rotation_y(radians.y)
        * Quat::from_rotation_z(radians.z)
}

/// `translate(position) * rotate(rotation) * scale(scale)`
pub fn compose_model_matrix(position: Vec3, rotation: Quat, scale: Vec3) -> Mat4 {
    Mat4::from_scale_rotation_translation(scale, rotation, position)
}

/// Inverse of [`compose_model_matrix`], built as `S^-1 * R^T * T^-1`.
///
/// An axis with zero scale maps to zero instead of infinity.
pub fn compose_inverse_model_matrix(position: Vec3, rotation: Quat, scale: Vec3) -> Mat4 {
    let inverse_scale = Vec3::new(
        reciprocal_or_zero(scale.x),
        reciprocal_or_zero(scale.y),
        reciprocal_or_zero(scale.z),
    );
    Mat4::from_scale(inverse_scale)
        * Mat4::from_quat(rotation.conjugate())
        * Mat4::from_translation(-position)
}

/// Unit `(forward, right, up)` for a rotation; `up` is rebuilt as `right x forward`.
pub fn direction_vectors(rotation: Quat) -> (Vec3, Vec3, Vec3) {
    let forward = (rotation * FORWARD).normalize();
    let right = (rotation * RIGHT).normalize();
    let up = right.cross(forward).normalize();
    (forward, right, up)
}

/// `value / divisor` per component; a zero divisor keeps `value` on that axis
pub fn divide_or_keep(value: Vec3, divisor: Vec3) -> Vec3 {
    let axis = |v: f32, d: f32| if d == 0.0 { v } else { v / d };
    Vec3::new(
        axis(value.x, divisor.x),
        axis(value.y, divisor.y),
        axis(value.z, divisor.z),
    )
}

fn reciprocal_or_zero(value: f32) -> f32 {
    if value == 0.0 {
        0.0
    } else {
        1.0 / value
    }
}

#[cfg(test)]
#[path = "math_tests.rs"]
mod tests;
