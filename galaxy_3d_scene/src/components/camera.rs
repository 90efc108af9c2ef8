//! Camera: view matrix derived from the world pose of the node it is bound to.
//!
//! The camera observes its node's transform. Moving the node (or any of its
//! ancestors) only flags the camera stale; the view matrix is rebuilt from
//! the node's world position and direction vectors on the next read.

use std::any::Any;
use std::cell::Cell;
use std::rc::Rc;
use glam::Mat4;
use crate::engine_bail;
use crate::error::Result;
use crate::invalidation::Invalidatable;
use crate::scene::{Component, NodeKey, Scene};
use super::frustum::Frustum;

/// Camera component.
///
/// Bind it with [`Scene::add_component`]; reads take the scene so the node's
/// pose can be refreshed on demand.
#[derive(Debug)]
pub struct Camera {
    projection: Cell<Mat4>,
    node: Cell<Option<NodeKey>>,
    stale: Cell<bool>,
    view: Cell<Mat4>,
    invalidation_count: Cell<u64>,
}

impl Camera {
    /// Create an unbound camera with the given projection matrix
    pub fn new(projection: Mat4) -> Self {
        Self {
            projection: Cell::new(projection),
            node: Cell::new(None),
            stale: Cell::new(true),
            view: Cell::new(Mat4::IDENTITY),
            invalidation_count: Cell::new(0),
        }
    }

    /// Right-handed perspective camera (`fov_y` in radians, depth range [0, 1])
    pub fn perspective(fov_y: f32, aspect_ratio: f32, z_near: f32, z_far: f32) -> Self {
        Self::new(Mat4::perspective_rh(fov_y, aspect_ratio, z_near, z_far))
    }

    // ===== GETTERS =====

    /// Node the camera is bound to
    pub fn node(&self) -> Option<NodeKey> {
        self.node.get()
    }

    /// Projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection.get()
    }

    /// Whether the cached view matrix must be rebuilt
    pub fn is_stale(&self) -> bool {
        self.stale.get()
    }

    /// Number of invalidations received since creation
    pub fn invalidation_count(&self) -> u64 {
        self.invalidation_count.get()
    }

    /// View matrix (inverse of the node's world placement, scale ignored).
    ///
    /// # Errors
    ///
    /// `NullArgument` if the camera is not bound to a live node of `scene`.
    pub fn view_matrix(&self, scene: &Scene) -> Result<Mat4> {
        let Some(node) = self.node.get() else {
            engine_bail!("galaxy3d::Camera", NullArgument, "Camera is not bound to a node");
        };
        if self.stale.get() {
            let eye = scene.absolute_position(node)?;
            let view = Mat4::look_to_rh(eye, scene.forward(node)?, scene.up(node)?);
            self.view.set(view);
            self.stale.set(false);
        }
        Ok(self.view.get())
    }

    /// Combined `projection * view`
    pub fn view_projection_matrix(&self, scene: &Scene) -> Result<Mat4> {
        Ok(self.projection.get() * self.view_matrix(scene)?)
    }

    /// Clipping planes of the current view-projection
    pub fn frustum(&self, scene: &Scene) -> Result<Frustum> {
        Ok(Frustum::from_view_projection(&self.view_projection_matrix(scene)?))
    }

    // ===== SETTERS =====

    /// Replace the projection matrix (the view matrix stays cached)
    pub fn set_projection(&self, projection: Mat4) {
        self.projection.set(projection);
    }
}

impl Invalidatable for Camera {
    fn invalidate(&self) {
        self.stale.set(true);
        self.invalidation_count.set(self.invalidation_count.get() + 1);
    }
}

impl Component for Camera {
    fn type_name(&self) -> &'static str {
        "Camera"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn pose_observer(self: Rc<Self>) -> Option<Rc<dyn Invalidatable>> {
        Some(self)
    }

    fn on_attach(&self, node: NodeKey) {
        self.node.set(Some(node));
        self.stale.set(true);
    }

    fn on_detach(&self, _node: NodeKey) {
        self.node.set(None);
        self.stale.set(true);
    }
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
