use std::rc::Rc;
use glam::{Mat4, Vec3};
use crate::error::Error;
use crate::scene::Scene;
use super::*;

const EPSILON: f32 = 1e-4;

fn unit_box() -> AABB {
    AABB::new(Vec3::splat(-1.0), Vec3::splat(1.0))
}

// ============================================================================
// AABB
// ============================================================================

#[test]
fn test_new_orders_corners() {
    let aabb = AABB::new(Vec3::new(1.0, -2.0, 3.0), Vec3::new(-1.0, 2.0, -3.0));
    assert_eq!(aabb.min, Vec3::new(-1.0, -2.0, -3.0));
    assert_eq!(aabb.max, Vec3::new(1.0, 2.0, 3.0));
}

#[test]
fn test_from_center() {
    let aabb = AABB::from_center(Vec3::new(5.0, 0.0, 0.0), Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(aabb.center(), Vec3::new(5.0, 0.0, 0.0));
    assert_eq!(aabb.size(), Vec3::new(2.0, 4.0, 6.0));
}

#[test]
fn test_transformed_by_translation_and_scale() {
    let matrix = Mat4::from_scale_rotation_translation(
        Vec3::new(2.0, 1.0, 1.0),
        glam::Quat::IDENTITY,
        Vec3::new(10.0, 0.0, 0.0),
    );

    let world = unit_box().transformed(&matrix);

    assert!(world.min.abs_diff_eq(Vec3::new(8.0, -1.0, -1.0), EPSILON));
    assert!(world.max.abs_diff_eq(Vec3::new(12.0, 1.0, 1.0), EPSILON));
}

#[test]
fn test_transformed_by_rotation_stays_tight() {
    let local = AABB::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0));
    let matrix = Mat4::from_rotation_y(std::f32::consts::FRAC_PI_2);

    let world = local.transformed(&matrix);

    // +X maps to -Z under a 90 degree yaw
    assert!(world.min.abs_diff_eq(Vec3::new(0.0, 0.0, -2.0), EPSILON));
    assert!(world.max.abs_diff_eq(Vec3::new(1.0, 1.0, 0.0), EPSILON));
}

#[test]
fn test_contains_and_intersects() {
    let outer = AABB::new(Vec3::splat(-5.0), Vec3::splat(5.0));
    let inner = unit_box();
    let straddling = AABB::new(Vec3::splat(4.0), Vec3::splat(6.0));
    let far = AABB::new(Vec3::splat(10.0), Vec3::splat(11.0));

    assert!(outer.contains(&inner));
    assert!(!inner.contains(&outer));
    assert!(!outer.contains(&straddling));
    assert!(outer.intersects(&straddling));
    assert!(!outer.intersects(&far));
}

// ============================================================================
// BoundingVolume component
// ============================================================================

#[test]
fn test_unbound_volume_has_no_world_bounds() {
    let scene = Scene::new();
    let volume = BoundingVolume::new(unit_box());
    assert!(matches!(volume.world_bounds(&scene), Err(Error::NullArgument(_))));
}

#[test]
fn test_world_bounds_follow_node() {
    let mut scene = Scene::new();
    let node = scene.create_node(Some("crate"));
    let volume = Rc::new(BoundingVolume::new(unit_box()));
    scene.add_component(node, volume.clone()).unwrap();

    scene.set_relative_position(node, Vec3::new(3.0, 0.0, 0.0)).unwrap();
    let world = volume.world_bounds(&scene).unwrap();
    assert!(world.center().abs_diff_eq(Vec3::new(3.0, 0.0, 0.0), EPSILON));
    assert!(!volume.is_stale());

    scene.set_relative_scale(node, Vec3::splat(2.0)).unwrap();
    assert!(volume.is_stale());
    let world = volume.world_bounds(&scene).unwrap();
    assert!(world.size().abs_diff_eq(Vec3::splat(4.0), EPSILON));
}

#[test]
fn test_parent_motion_reaches_volume() {
    let mut scene = Scene::new();
    let parent = scene.create_node(Some("truck"));
    let child = scene.create_node(Some("cargo"));
    scene.add_child(parent, child).unwrap();
    let volume = Rc::new(BoundingVolume::new(unit_box()));
    scene.add_component(child, volume.clone()).unwrap();
    volume.world_bounds(&scene).unwrap();

    scene.set_relative_position(parent, Vec3::new(0.0, 0.0, -7.0)).unwrap();

    assert!(volume.is_stale());
    let world = volume.world_bounds(&scene).unwrap();
    assert!(world.center().abs_diff_eq(Vec3::new(0.0, 0.0, -7.0), EPSILON));
}

#[test]
fn test_set_local_bounds_marks_stale() {
    let mut scene = Scene::new();
    let node = scene.create_node(None);
    let volume = Rc::new(BoundingVolume::new(unit_box()));
    scene.add_component(node, volume.clone()).unwrap();
    volume.world_bounds(&scene).unwrap();

    volume.set_local_bounds(AABB::new(Vec3::ZERO, Vec3::splat(3.0)));

    assert!(volume.is_stale());
    assert_eq!(volume.world_bounds(&scene).unwrap().max, Vec3::splat(3.0));
}

#[test]
fn test_visibility_against_camera_frustum() {
    let mut scene = Scene::new();
    let eye = scene.create_node(Some("eye"));
    scene.set_relative_position(eye, Vec3::new(0.0, 0.0, 5.0)).unwrap();
    let camera = Rc::new(crate::components::Camera::perspective(std::f32::consts::FRAC_PI_2, 1.0, 0.1, 100.0));
    scene.add_component(eye, camera.clone()).unwrap();

    let target = scene.create_node(Some("target"));
    let volume = Rc::new(BoundingVolume::new(unit_box()));
    scene.add_component(target, volume.clone()).unwrap();

    assert!(volume.is_visible(&scene, &camera.frustum(&scene).unwrap()).unwrap());

    scene.set_relative_position(target, Vec3::new(0.0, 0.0, 20.0)).unwrap();
    assert!(!volume.is_visible(&scene, &camera.frustum(&scene).unwrap()).unwrap());
}
