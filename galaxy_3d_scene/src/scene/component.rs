//! Behavior units attached to scene nodes.

use std::any::Any;
use std::rc::Rc;
use crate::invalidation::Invalidatable;
use super::scene::Scene;
use super::scene_node::NodeKey;

/// A behavior unit bound to at most one [`SceneNode`](super::SceneNode).
///
/// Units are shared through `Rc` and mutate themselves through interior
/// mutability. A unit that caches something derived from its node's pose
/// opts into invalidation by returning itself from
/// [`pose_observer`](Component::pose_observer); the scene then registers it as
/// an observer of the node's transform for as long as it stays bound.
pub trait Component: Any {
    /// Name used in logs and diagnostics
    fn type_name(&self) -> &'static str;

    /// Downcast support for [`Scene::component`]
    fn as_any(&self) -> &dyn Any;

    /// Observer to register on the node's transform, if any.
    ///
    /// Asked once per binding; the scene unregisters that same observer when
    /// the unit is unbound. Only a weak handle is registered, so the unit must
    /// keep the observer alive itself.
    fn pose_observer(self: Rc<Self>) -> Option<Rc<dyn Invalidatable>> {
        None
    }

    /// Called after the unit is bound to `node`
    fn on_attach(&self, _node: NodeKey) {}

    /// Called after the unit is unbound from `node`
    fn on_detach(&self, _node: NodeKey) {}

    /// Per-frame hook, called once per [`Scene::update`]
    fn update(&self, _scene: &mut Scene, _node: NodeKey, _delta_seconds: f32) {}
}
