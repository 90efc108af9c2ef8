//! Bounding volume: local-space box plus a lazily cached world-space box.

use std::any::Any;
use std::cell::Cell;
use std::rc::Rc;
use glam::{Mat4, Vec3};
use crate::engine_bail;
use crate::error::Result;
use crate::invalidation::Invalidatable;
use crate::scene::{Component, NodeKey, Scene};
use super::frustum::Frustum;

// ===== AABB =====

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl AABB {
    /// Box spanning two corners (component-wise ordered)
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self { min: a.min(b), max: a.max(b) }
    }

    /// Box centered on `center`, extending `half_extents` along each axis
    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        let half_extents = half_extents.abs();
        Self { min: center - half_extents, max: center + half_extents }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Tight box around this box transformed by `matrix`.
    ///
    /// Arvo's method: each matrix column is projected onto the box extents,
    /// so the eight corners never need transforming.
    pub fn transformed(&self, matrix: &Mat4) -> AABB {
        let translation = matrix.col(3).truncate();
        let mut min = translation;
        let mut max = translation;
        for axis in 0..3 {
            let column = matrix.col(axis).truncate();
            let low = column * self.min[axis];
            let high = column * self.max[axis];
            min += low.min(high);
            max += low.max(high);
        }
        AABB { min, max }
    }

    /// Whether `other` lies entirely within this box
    pub fn contains(&self, other: &AABB) -> bool {
        self.min.cmple(other.min).all() && self.max.cmpge(other.max).all()
    }

    /// Whether the two boxes overlap or touch
    pub fn intersects(&self, other: &AABB) -> bool {
        self.min.cmple(other.max).all() && self.max.cmpge(other.min).all()
    }
}

// ===== BOUNDING VOLUME =====

/// Component holding a local-space box and caching its world-space image.
#[derive(Debug)]
pub struct BoundingVolume {
    local: Cell<AABB>,
    world: Cell<AABB>,
    node: Cell<Option<NodeKey>>,
    stale: Cell<bool>,
}

impl BoundingVolume {
    /// Create an unbound volume
    pub fn new(local: AABB) -> Self {
        Self {
            local: Cell::new(local),
            world: Cell::new(local),
            node: Cell::new(None),
            stale: Cell::new(true),
        }
    }

    /// Node the volume is bound to
    pub fn node(&self) -> Option<NodeKey> {
        self.node.get()
    }

    /// Box in the node's local space
    pub fn local_bounds(&self) -> AABB {
        self.local.get()
    }

    /// Replace the local box (the world box is rebuilt on the next read)
    pub fn set_local_bounds(&self, local: AABB) {
        self.local.set(local);
        self.stale.set(true);
    }

    /// Whether the cached world box must be rebuilt
    pub fn is_stale(&self) -> bool {
        self.stale.get()
    }

    /// Local box transformed by the node's model matrix.
    ///
    /// # Errors
    ///
    /// `NullArgument` if the volume is not bound to a live node of `scene`.
    pub fn world_bounds(&self, scene: &Scene) -> Result<AABB> {
        let Some(node) = self.node.get() else {
            engine_bail!("galaxy3d::BoundingVolume", NullArgument, "BoundingVolume is not bound to a node");
        };
        if self.stale.get() {
            let model = scene.model_matrix(node)?;
            self.world.set(self.local.get().transformed(&model));
            self.stale.set(false);
        }
        Ok(self.world.get())
    }

    /// Whether the world box may be visible inside `frustum`
    pub fn is_visible(&self, scene: &Scene, frustum: &Frustum) -> Result<bool> {
        Ok(frustum.intersects_aabb(&self.world_bounds(scene)?))
    }
}

impl Invalidatable for BoundingVolume {
    fn invalidate(&self) {
        self.stale.set(true);
    }
}

impl Component for BoundingVolume {
    fn type_name(&self) -> &'static str {
        "BoundingVolume"
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
#[path = "bounding_volume_tests.rs"]
mod tests;
