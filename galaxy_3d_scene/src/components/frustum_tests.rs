use glam::{Mat4, Vec3};
use super::*;

fn looking_down_negative_z(far: f32) -> Frustum {
    let projection = Mat4::perspective_rh(std::f32::consts::FRAC_PI_2, 1.0, 0.1, far);
    let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
    Frustum::from_view_projection(&(projection * view))
}

// ============================================================================
// Plane extraction
// ============================================================================

#[test]
fn test_planes_are_normalized() {
    let perspective = looking_down_negative_z(100.0);
    let orthographic = Frustum::from_view_projection(&Mat4::orthographic_rh(-10.0, 10.0, -10.0, 10.0, 0.1, 100.0));

    for plane in perspective.planes.iter().chain(orthographic.planes.iter()) {
        assert!((plane.truncate().length() - 1.0).abs() < 1e-4);
    }
}

#[test]
fn test_contains_point() {
    let frustum = looking_down_negative_z(100.0);
    assert!(frustum.contains_point(Vec3::ZERO));
    assert!(!frustum.contains_point(Vec3::new(0.0, 0.0, 10.0)));
}

// ============================================================================
// Box tests
// ============================================================================

#[test]
fn test_box_in_front_of_camera() {
    let frustum = looking_down_negative_z(100.0);
    assert!(frustum.intersects_aabb(&AABB::new(Vec3::splat(-1.0), Vec3::splat(1.0))));
}

#[test]
fn test_box_off_to_the_side() {
    let frustum = looking_down_negative_z(100.0);
    assert!(!frustum.intersects_aabb(&AABB::new(Vec3::splat(100.0), Vec3::splat(101.0))));
}

#[test]
fn test_box_behind_camera() {
    let frustum = looking_down_negative_z(100.0);
    assert!(!frustum.intersects_aabb(&AABB::new(Vec3::new(-1.0, -1.0, 10.0), Vec3::new(1.0, 1.0, 12.0))));
}

#[test]
fn test_box_beyond_far_plane() {
    let frustum = looking_down_negative_z(10.0);
    assert!(!frustum.intersects_aabb(&AABB::new(Vec3::new(-1.0, -1.0, -20.0), Vec3::new(1.0, 1.0, -18.0))));
}

#[test]
fn test_box_straddling_a_plane() {
    let frustum = Frustum::from_view_projection(&Mat4::orthographic_rh(-5.0, 5.0, -5.0, 5.0, 0.1, 100.0));
    assert!(frustum.intersects_aabb(&AABB::new(Vec3::new(4.0, 0.0, -10.0), Vec3::new(6.0, 1.0, -5.0))));
}
