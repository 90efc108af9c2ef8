//! Tests for Scene
//!
//! Node lifecycle, registry queries, component binding and the per-frame
//! update pass.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use glam::Vec3;
use crate::error::Error;
use crate::invalidation::Invalidatable;
use crate::scene::Pose;
use super::*;

const EPSILON: f32 = 1e-4;

fn quiet_scene() -> Scene {
    Scene::with_config(SceneConfig { log_hierarchy_changes: false, ..Default::default() })
}

// ============================================================================
// Test components
// ============================================================================

/// Records lifecycle calls and invalidations
#[derive(Default)]
struct Recorder {
    attached: RefCell<Vec<NodeKey>>,
    detached: RefCell<Vec<NodeKey>>,
    invalidations: Cell<u32>,
    updates: Cell<u32>,
}

impl Invalidatable for Recorder {
    fn invalidate(&self) {
        self.invalidations.set(self.invalidations.get() + 1);
    }
}

impl Component for Recorder {
    fn type_name(&self) -> &'static str {
        "Recorder"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn pose_observer(self: Rc<Self>) -> Option<Rc<dyn Invalidatable>> {
        Some(self)
    }

    fn on_attach(&self, node: NodeKey) {
        self.attached.borrow_mut().push(node);
    }

    fn on_detach(&self, node: NodeKey) {
        self.detached.borrow_mut().push(node);
    }

    fn update(&self, _scene: &mut Scene, _node: NodeKey, _delta_seconds: f32) {
        self.updates.set(self.updates.get() + 1);
    }
}

/// Moves its node along +X at one unit per second
struct Mover;

impl Component for Mover {
    fn type_name(&self) -> &'static str {
        "Mover"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn update(&self, scene: &mut Scene, node: NodeKey, delta_seconds: f32) {
        let position = scene.relative_position(node).unwrap();
        scene.set_relative_position(node, position + Vec3::X * delta_seconds).unwrap();
    }
}

/// Unbinds `victim` from `node` during its update
struct Saboteur {
    victim: Rc<dyn Component>,
}

impl Component for Saboteur {
    fn type_name(&self) -> &'static str {
        "Saboteur"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn update(&self, scene: &mut Scene, node: NodeKey, _delta_seconds: f32) {
        scene.remove_component(node, &self.victim).unwrap();
    }
}

// ============================================================================
// Node lifecycle
// ============================================================================

#[test]
fn test_new_scene_is_empty() {
    let scene = Scene::new();
    assert_eq!(scene.node_count(), 0);
    assert_eq!(scene.transform_count(), 0);
    assert_eq!(scene.stats(), SceneStats::default());
}

#[test]
fn test_create_node_is_a_root_with_identity_pose() {
    let mut scene = quiet_scene();
    let node = scene.create_node(Some("player"));

    let scene_node = scene.node(node).unwrap();
    assert_eq!(scene_node.key(), node);
    assert_eq!(scene_node.name(), "player");
    assert!(scene_node.is_root());
    assert_eq!(scene_node.root(), node);
    assert_eq!(scene.world_pose(node).unwrap(), Pose::IDENTITY);
    assert_eq!(scene.transform(scene_node.transform()).unwrap().owner(), Some(node));
    assert_eq!(scene.node_count(), 1);
    assert_eq!(scene.transform_count(), 1);
}

#[test]
fn test_generated_names_use_prefix() {
    let mut scene = Scene::with_config(SceneConfig {
        name_prefix: "Actor".to_string(),
        log_hierarchy_changes: false,
        ..Default::default()
    });
    let a = scene.create_node(None);
    let b = scene.create_node(None);

    assert!(scene.name(a).unwrap().starts_with("Actor#"));
    assert_ne!(scene.name(a).unwrap(), scene.name(b).unwrap());
}

#[test]
fn test_rename_and_find_by_name() {
    let mut scene = quiet_scene();
    let node = scene.create_node(Some("old"));

    scene.set_name(node, "new").unwrap();

    assert_eq!(scene.find_by_name("new"), Some(node));
    assert_eq!(scene.find_by_name("old"), None);
}

#[test]
fn test_destroy_node_releases_key_and_transform() {
    let mut scene = quiet_scene();
    let node = scene.create_node(Some("temp"));
    let transform = scene.transform_of(node).unwrap();

    scene.destroy_node(node).unwrap();

    assert!(!scene.contains_node(node));
    assert!(scene.transform(transform).is_none());
    assert!(matches!(scene.world_pose(node), Err(Error::NullArgument(_))));
    assert!(matches!(scene.destroy_node(node), Err(Error::NullArgument(_))));
    assert_eq!(scene.node_count(), 0);
    assert_eq!(scene.transform_count(), 0);
}

#[test]
fn test_destroyed_key_is_not_reused() {
    let mut scene = quiet_scene();
    let first = scene.create_node(Some("first"));
    scene.destroy_node(first).unwrap();
    let second = scene.create_node(Some("second"));

    assert_ne!(first, second);
    assert!(scene.node(first).is_none());
}

#[test]
fn test_destroy_node_orphans_children_in_place() {
    let mut scene = quiet_scene();
    let grandparent = scene.create_node(Some("grandparent"));
    let parent = scene.create_node(Some("parent"));
    let child = scene.create_node(Some("child"));
    let grandchild = scene.create_node(Some("grandchild"));
    scene.add_child(grandparent, parent).unwrap();
    scene.add_child(parent, child).unwrap();
    scene.add_child(child, grandchild).unwrap();
    scene.set_relative_position(parent, Vec3::new(5.0, 0.0, 0.0)).unwrap();
    scene.set_relative_rotation(parent, Vec3::new(0.0, 90.0, 0.0)).unwrap();
    scene.set_relative_position(child, Vec3::new(1.0, 0.0, 0.0)).unwrap();
    let before = scene.world_pose(child).unwrap();

    scene.destroy_node(parent).unwrap();

    assert!(scene.children(grandparent).unwrap().is_empty());
    assert_eq!(scene.parent(child).unwrap(), None);
    assert_eq!(scene.root(grandchild).unwrap(), child);
    assert!(scene.world_pose(child).unwrap().abs_diff_eq(&before, EPSILON));
}

#[test]
fn test_clear_detaches_components() {
    let mut scene = quiet_scene();
    let node = scene.create_node(Some("n"));
    let recorder = Rc::new(Recorder::default());
    scene.add_component(node, recorder.clone()).unwrap();

    scene.clear();

    assert_eq!(scene.node_count(), 0);
    assert_eq!(*recorder.detached.borrow(), vec![node]);
    assert!(scene.component_owner(&(recorder as Rc<dyn Component>)).is_none());
}

// ============================================================================
// Components
// ============================================================================

#[test]
fn test_add_component_attaches_and_observes() {
    let mut scene = quiet_scene();
    let node = scene.create_node(Some("n"));
    let recorder = Rc::new(Recorder::default());

    scene.add_component(node, recorder.clone()).unwrap();
    scene.set_relative_position(node, Vec3::Y).unwrap();

    assert_eq!(*recorder.attached.borrow(), vec![node]);
    assert_eq!(recorder.invalidations.get(), 1);
    assert_eq!(scene.components(node).unwrap().len(), 1);
    assert!(scene.component::<Recorder>(node).is_some());
    assert!(scene.component::<Mover>(node).is_none());
}

#[test]
fn test_component_binds_to_one_node_only() {
    let mut scene = quiet_scene();
    let first = scene.create_node(Some("first"));
    let second = scene.create_node(Some("second"));
    let recorder: Rc<dyn Component> = Rc::new(Recorder::default());
    scene.add_component(first, recorder.clone()).unwrap();

    assert!(matches!(scene.add_component(second, recorder.clone()), Err(Error::AlreadyAttached(_))));
    assert!(matches!(scene.add_component(first, recorder.clone()), Err(Error::AlreadyAttached(_))));
    assert_eq!(scene.component_owner(&recorder), Some(first));
    assert!(scene.components(second).unwrap().is_empty());
}

#[test]
fn test_remove_component_stops_notifications() {
    let mut scene = quiet_scene();
    let node = scene.create_node(Some("n"));
    let other = scene.create_node(Some("other"));
    let recorder = Rc::new(Recorder::default());
    let as_component: Rc<dyn Component> = recorder.clone();
    scene.add_component(node, as_component.clone()).unwrap();

    assert!(!scene.remove_component(other, &as_component).unwrap());
    assert!(scene.remove_component(node, &as_component).unwrap());
    scene.set_relative_position(node, Vec3::Y).unwrap();

    assert_eq!(recorder.invalidations.get(), 0);
    assert_eq!(*recorder.detached.borrow(), vec![node]);
    scene.add_component(other, as_component).unwrap();
}

#[test]
fn test_destroy_node_unbinds_components() {
    let mut scene = quiet_scene();
    let node = scene.create_node(Some("n"));
    let recorder = Rc::new(Recorder::default());
    scene.add_component(node, recorder.clone()).unwrap();

    scene.destroy_node(node).unwrap();

    assert_eq!(*recorder.detached.borrow(), vec![node]);
    let survivor = scene.create_node(Some("survivor"));
    scene.add_component(survivor, recorder).unwrap();
}

#[test]
fn test_component_observer_is_not_kept_alive_by_scene_registry() {
    let mut scene = quiet_scene();
    let node = scene.create_node(Some("n"));
    let recorder = Rc::new(Recorder::default());
    scene.add_component(node, recorder.clone()).unwrap();

    // node components list + local handle
    assert_eq!(Rc::strong_count(&recorder), 2);
}

/// Hands out a new listener on every `pose_observer` call and keeps them all
#[derive(Default)]
struct Relay {
    listeners: RefCell<Vec<Rc<Recorder>>>,
}

impl Component for Relay {
    fn type_name(&self) -> &'static str {
        "Relay"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn pose_observer(self: Rc<Self>) -> Option<Rc<dyn Invalidatable>> {
        let listener = Rc::new(Recorder::default());
        self.listeners.borrow_mut().push(listener.clone());
        Some(listener)
    }
}

#[test]
fn test_unbind_removes_the_observer_registered_at_bind() {
    let mut scene = quiet_scene();
    let node = scene.create_node(Some("n"));
    let relay = Rc::new(Relay::default());
    let as_component: Rc<dyn Component> = relay.clone();
    scene.add_component(node, as_component.clone()).unwrap();
    let transform = scene.transform_of(node).unwrap();
    assert_eq!(scene.transform(transform).unwrap().observers().len(), 1);

    assert!(scene.remove_component(node, &as_component).unwrap());
    scene.set_relative_position(node, Vec3::Y).unwrap();

    assert!(scene.transform(transform).unwrap().observers().is_empty());
    let listeners = relay.listeners.borrow();
    assert_eq!(listeners.len(), 1, "pose_observer is asked once per binding");
    assert_eq!(listeners[0].invalidations.get(), 0);
}

// ============================================================================
// Per-frame update
// ============================================================================

#[test]
fn test_update_calls_every_component_once() {
    let mut scene = quiet_scene();
    let a = scene.create_node(Some("a"));
    let b = scene.create_node(Some("b"));
    let first = Rc::new(Recorder::default());
    let second = Rc::new(Recorder::default());
    scene.add_component(a, first.clone()).unwrap();
    scene.add_component(b, second.clone()).unwrap();

    scene.update(0.016);
    scene.update(0.016);

    assert_eq!(first.updates.get(), 2);
    assert_eq!(second.updates.get(), 2);
    assert_eq!(scene.stats().frame_count, 2);
}

#[test]
fn test_update_hook_can_move_nodes() {
    let mut scene = quiet_scene();
    let parent = scene.create_node(Some("parent"));
    let child = scene.create_node(Some("child"));
    scene.add_child(parent, child).unwrap();
    scene.add_component(parent, Rc::new(Mover)).unwrap();

    scene.update(0.5);
    scene.update(0.5);

    assert!(scene.absolute_position(child).unwrap().abs_diff_eq(Vec3::X, EPSILON));
}

#[test]
fn test_component_unbound_mid_pass_is_skipped() {
    let mut scene = quiet_scene();
    let node = scene.create_node(Some("n"));
    let recorder = Rc::new(Recorder::default());
    let saboteur = Rc::new(Saboteur { victim: recorder.clone() });
    scene.add_component(node, saboteur).unwrap();
    scene.add_component(node, recorder.clone()).unwrap();

    scene.update(0.1);

    assert_eq!(recorder.updates.get(), 0);
    assert_eq!(scene.components(node).unwrap().len(), 1);
}
