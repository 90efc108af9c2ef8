//! Transform node: relative pose plus a lazily derived world-space cache.
//!
//! The relative pose is authoritative. Everything else (absolute pose, model
//! matrices, direction vectors) is a cache rebuilt by the owning [`Scene`]
//! on the first read after an invalidation. Cache fields live in `Cell`s so
//! that reads only need `&Scene`.
//!
//! [`Scene`]: super::Scene

use std::cell::Cell;
use glam::{Mat4, Vec3};
use slotmap::new_key_type;
use crate::invalidation::ObserverRegistry;
use crate::math;
use super::pose::Pose;
use super::scene_node::NodeKey;

// ===== SLOT MAP KEY =====

new_key_type! {
    /// Stable key for a TransformNode within a Scene.
    ///
    /// Keys are generational: a key to a destroyed transform never resolves
    /// to a transform created later.
    pub struct TransformKey;
}

/// Addresses a transform either directly or through the node that owns it.
///
/// Every pose operation on [`Scene`](super::Scene) takes `impl Into<TransformRef>`,
/// so both key types can be passed as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformRef {
    /// The transform owned by this node
    Node(NodeKey),
    /// This transform
    Transform(TransformKey),
}

impl From<NodeKey> for TransformRef {
    fn from(key: NodeKey) -> Self {
        TransformRef::Node(key)
    }
}

impl From<TransformKey> for TransformRef {
    fn from(key: TransformKey) -> Self {
        TransformRef::Transform(key)
    }
}

// ===== DERIVED CACHE =====

/// Everything derived from the absolute pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PoseCache {
    pub(crate) absolute: Pose,
    pub(crate) model: Mat4,
    pub(crate) inverse_model: Mat4,
    pub(crate) forward: Vec3,
    pub(crate) right: Vec3,
    pub(crate) up: Vec3,
}

impl PoseCache {
    /// Rebuild matrices and direction vectors for an absolute pose
    pub(crate) fn from_absolute(absolute: Pose) -> Self {
        let rotation = math::euler_degrees_to_quat(absolute.rotation);
        let (forward, right, up) = math::direction_vectors(rotation);
        Self {
            absolute,
            model: math::compose_model_matrix(absolute.position, rotation, absolute.scale),
            inverse_model: math::compose_inverse_model_matrix(absolute.position, rotation, absolute.scale),
            forward,
            right,
            up,
        }
    }
}

impl Default for PoseCache {
    fn default() -> Self {
        Self::from_absolute(Pose::IDENTITY)
    }
}

// ===== TRANSFORM NODE =====

/// Relative pose, derived world-space cache, validity flag and observers.
///
/// Created and mutated only through [`Scene`](super::Scene); this type
/// exposes read-only views of its authoritative state.
#[derive(Debug)]
pub struct TransformNode {
    /// Authoritative pose relative to the owner's parent (or world)
    pub(crate) relative: Pose,
    /// Derived data, valid only while `valid` is set
    pub(crate) cache: Cell<PoseCache>,
    pub(crate) valid: Cell<bool>,
    /// Node holding this transform, if attached
    pub(crate) owner: Option<NodeKey>,
    /// Objects notified when this transform is invalidated
    pub(crate) observers: ObserverRegistry,
}

impl TransformNode {
    /// Create an identity transform (stale, unattached)
    pub(crate) fn new() -> Self {
        Self {
            relative: Pose::IDENTITY,
            cache: Cell::new(PoseCache::default()),
            valid: Cell::new(false),
            owner: None,
            observers: ObserverRegistry::new(),
        }
    }

    /// Relative pose
    pub fn relative_pose(&self) -> Pose {
        self.relative
    }

    /// Whether the derived cache is current
    pub fn is_valid(&self) -> bool {
        self.valid.get()
    }

    /// Node holding this transform, if any
    pub fn owner(&self) -> Option<NodeKey> {
        self.owner
    }

    /// Registered observers
    pub fn observers(&self) -> &ObserverRegistry {
        &self.observers
    }

    /// Flag the cache stale
    pub(crate) fn mark_stale(&self) {
        self.valid.set(false);
    }

    /// Store a freshly computed cache and flag it current
    pub(crate) fn store(&self, cache: PoseCache) {
        self.cache.set(cache);
        self.valid.set(true);
    }

    /// Cached data (caller guarantees validity)
    pub(crate) fn cached(&self) -> PoseCache {
        debug_assert!(self.valid.get(), "reading a stale transform cache");
        self.cache.get()
    }
}
