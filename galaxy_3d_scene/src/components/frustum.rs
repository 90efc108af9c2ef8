//! Frustum: six clipping planes extracted from a view-projection matrix.
//!
//! Each plane is a Vec4 (A, B, C, D) with a unit, inward-pointing normal
//! (A, B, C). A point P is inside when `dot(plane, (P, 1)) >= 0` for every
//! plane.

use glam::{Mat4, Vec3, Vec4};
use super::bounding_volume::AABB;

/// Six frustum planes: left, right, bottom, top, near, far.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    pub planes: [Vec4; 6],
}

impl Frustum {
    /// Extract the planes of a view-projection matrix (Gribb & Hartmann).
    ///
    /// Works for perspective and orthographic projections alike.
    pub fn from_view_projection(view_projection: &Mat4) -> Self {
        let x = view_projection.row(0);
        let y = view_projection.row(1);
        let z = view_projection.row(2);
        let w = view_projection.row(3);

        let mut planes = [w + x, w - x, w + y, w - y, w + z, w - z];
        for plane in &mut planes {
            let length = plane.truncate().length();
            if length > 0.0 {
                *plane /= length;
            }
        }
        Self { planes }
    }

    /// Whether a point lies inside (or on) every plane
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes.iter().all(|plane| plane.truncate().dot(point) + plane.w >= 0.0)
    }

    /// Conservative box test: false only when the box is fully outside one
    /// plane (the corner furthest along the plane normal is behind it).
    pub fn intersects_aabb(&self, aabb: &AABB) -> bool {
        self.planes.iter().all(|plane| {
            let normal = plane.truncate();
            let furthest = Vec3::select(normal.cmpge(Vec3::ZERO), aabb.max, aabb.min);
            normal.dot(furthest) + plane.w >= 0.0
        })
    }
}

#[cfg(test)]
#[path = "frustum_tests.rs"]
mod tests;
