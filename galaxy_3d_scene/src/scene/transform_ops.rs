//! Pose access, lazy refresh and invalidation fan-out.
//!
//! Writes overwrite a relative field and invalidate. Reads refresh the stale
//! part of the parent chain top-down, then return a copy from the cache.

use glam::{Mat4, Vec3};
use rustc_hash::FxHashSet;
use crate::error::Result;
use crate::invalidation::Observer;
use crate::{engine_bail, engine_debug, engine_trace};
use super::pose::Pose;
use super::scene::Scene;
use super::scene_node::NodeKey;
use super::transform_node::{PoseCache, TransformKey, TransformNode, TransformRef};

/// Outcome of one invalidation fan-out pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanOutReport {
    /// Transforms flagged stale (the origin included)
    pub transforms: usize,
    /// External observers notified
    pub externals: usize,
}

impl Scene {
    // ===== RESOLUTION =====

    /// Resolve a node or transform reference to a live transform key
    pub fn resolve(&self, target: impl Into<TransformRef>) -> Result<TransformKey> {
        match target.into() {
            TransformRef::Node(node) => Ok(self.node_or_err(node)?.transform),
            TransformRef::Transform(key) => {
                self.transform_or_err(key)?;
                Ok(key)
            }
        }
    }

    /// Transform of the owner's parent, if the transform is attached under a parent
    fn parent_transform(&self, key: TransformKey) -> Option<TransformKey> {
        let owner = self.transforms.get(key)?.owner?;
        let parent = self.nodes.get(owner)?.parent?;
        self.nodes.get(parent).map(|node| node.transform)
    }

    // ===== REFRESH =====

    /// Recompute derived data if stale (no-op when valid)
    pub fn refresh(&self, target: impl Into<TransformRef>) -> Result<()> {
        let key = self.resolve(target)?;
        self.refresh_key(key);
        Ok(())
    }

    /// Refresh every transform in the scene (e.g. before handing poses to a renderer)
    pub fn refresh_all(&self) {
        for key in self.transforms.keys() {
            self.refresh_key(key);
        }
    }

    /// Make `key` valid, recomputing the stale ancestors first.
    fn refresh_key(&self, key: TransformKey) -> &TransformNode {
        let transform = &self.transforms[key];
        if transform.is_valid() {
            return transform;
        }

        // Collect the stale chain up to the first valid ancestor (or the root)
        let mut chain = vec![key];
        let mut parent_pose: Option<Pose> = None;
        let mut cursor = self.parent_transform(key);
        while let Some(parent_key) = cursor {
            let parent = &self.transforms[parent_key];
            if parent.is_valid() {
                parent_pose = Some(parent.cached().absolute);
                break;
            }
            chain.push(parent_key);
            cursor = self.parent_transform(parent_key);
        }

        for stale_key in chain.iter().rev() {
            let stale = &self.transforms[*stale_key];
            let absolute = match &parent_pose {
                Some(parent) => Pose::compose(parent, &stale.relative),
                None => stale.relative,
            };
            stale.store(PoseCache::from_absolute(absolute));
            parent_pose = Some(absolute);
        }
        self.refresh_count.set(self.refresh_count.get() + chain.len() as u64);
        transform
    }

    fn cache_of(&self, target: impl Into<TransformRef>) -> Result<PoseCache> {
        let key = self.resolve(target)?;
        Ok(self.refresh_key(key).cached())
    }

    // ===== POSE QUERIES =====

    /// Whether the derived data of a transform is current
    pub fn is_valid(&self, target: impl Into<TransformRef>) -> Result<bool> {
        let key = self.resolve(target)?;
        Ok(self.transforms[key].is_valid())
    }

    /// Relative pose (authoritative, never triggers a refresh)
    pub fn relative_pose(&self, target: impl Into<TransformRef>) -> Result<Pose> {
        let key = self.resolve(target)?;
        Ok(self.transforms[key].relative)
    }

    /// Relative position
    pub fn relative_position(&self, target: impl Into<TransformRef>) -> Result<Vec3> {
        Ok(self.relative_pose(target)?.position)
    }

    /// Relative rotation (Euler degrees)
    pub fn relative_rotation(&self, target: impl Into<TransformRef>) -> Result<Vec3> {
        Ok(self.relative_pose(target)?.rotation)
    }

    /// Relative scale
    pub fn relative_scale(&self, target: impl Into<TransformRef>) -> Result<Vec3> {
        Ok(self.relative_pose(target)?.scale)
    }

    /// World-space pose
    pub fn world_pose(&self, target: impl Into<TransformRef>) -> Result<Pose> {
        Ok(self.cache_of(target)?.absolute)
    }

    /// World-space position
    pub fn absolute_position(&self, target: impl Into<TransformRef>) -> Result<Vec3> {
        Ok(self.cache_of(target)?.absolute.position)
    }

    /// World-space rotation (Euler degrees)
    pub fn absolute_rotation(&self, target: impl Into<TransformRef>) -> Result<Vec3> {
        Ok(self.cache_of(target)?.absolute.rotation)
    }

    /// World-space scale
    pub fn absolute_scale(&self, target: impl Into<TransformRef>) -> Result<Vec3> {
        Ok(self.cache_of(target)?.absolute.scale)
    }

    /// `translate * rotate * scale` of the world-space pose
    pub fn model_matrix(&self, target: impl Into<TransformRef>) -> Result<Mat4> {
        Ok(self.cache_of(target)?.model)
    }

    /// Exact inverse of [`model_matrix`](Scene::model_matrix)
    pub fn inverse_model_matrix(&self, target: impl Into<TransformRef>) -> Result<Mat4> {
        Ok(self.cache_of(target)?.inverse_model)
    }

    /// World-space forward unit vector (rotated -Z)
    pub fn forward(&self, target: impl Into<TransformRef>) -> Result<Vec3> {
        Ok(self.cache_of(target)?.forward)
    }

    /// World-space right unit vector (rotated +X)
    pub fn right(&self, target: impl Into<TransformRef>) -> Result<Vec3> {
        Ok(self.cache_of(target)?.right)
    }

    /// World-space up unit vector (`right x forward`)
    pub fn up(&self, target: impl Into<TransformRef>) -> Result<Vec3> {
        Ok(self.cache_of(target)?.up)
    }

    // ===== POSE EDITS =====

    /// Overwrite the relative position, then invalidate
    pub fn set_relative_position(&mut self, target: impl Into<TransformRef>, position: Vec3) -> Result<()> {
        let key = self.resolve(target)?;
        self.transforms[key].relative.position = position;
        self.fan_out_and_prune(key);
        Ok(())
    }

    /// Overwrite the relative rotation (Euler degrees), then invalidate
    pub fn set_relative_rotation(&mut self, target: impl Into<TransformRef>, rotation: Vec3) -> Result<()> {
        let key = self.resolve(target)?;
        self.transforms[key].relative.rotation = rotation;
        self.fan_out_and_prune(key);
        Ok(())
    }

    /// Overwrite the relative scale, then invalidate
    pub fn set_relative_scale(&mut self, target: impl Into<TransformRef>, scale: Vec3) -> Result<()> {
        let key = self.resolve(target)?;
        self.transforms[key].relative.scale = scale;
        self.fan_out_and_prune(key);
        Ok(())
    }

    /// Overwrite the whole relative pose, then invalidate once
    pub fn set_relative_pose(&mut self, target: impl Into<TransformRef>, pose: Pose) -> Result<()> {
        let key = self.resolve(target)?;
        self.transforms[key].relative = pose;
        self.fan_out_and_prune(key);
        Ok(())
    }

    // ===== INVALIDATION =====

    /// Flag a transform stale and notify every reachable observer once.
    ///
    /// Dead external handles met here are skipped; they leave the registry on
    /// the next edit that fans out through them.
    pub fn invalidate(&self, target: impl Into<TransformRef>) -> Result<FanOutReport> {
        let key = self.resolve(target)?;
        Ok(self.fan_out(key))
    }

    /// One fan-out pass.
    ///
    /// The observer graph is a superset of the tree (external listeners and
    /// arbitrary transform edges), so it may contain diamonds and cycles.
    /// Each transform is entered at most once per pass and each external
    /// object is notified at most once per pass. Iterative, so depth does not
    /// grow the call stack.
    pub(super) fn fan_out(&self, origin: TransformKey) -> FanOutReport {
        self.propagate(origin, None)
    }

    /// Fan-out pass from an edit path, then drop the dead external handles it met
    pub(super) fn fan_out_and_prune(&mut self, origin: TransformKey) -> FanOutReport {
        let mut dead = Vec::new();
        let report = self.propagate(origin, Some(&mut dead));
        for key in dead {
            if let Some(transform) = self.transforms.get_mut(key) {
                transform.observers.prune();
            }
        }
        report
    }

    fn propagate(&self, origin: TransformKey, mut dead: Option<&mut Vec<TransformKey>>) -> FanOutReport {
        let mut visited: FxHashSet<TransformKey> = FxHashSet::default();
        let mut notified: FxHashSet<*const ()> = FxHashSet::default();
        let mut stack = vec![origin];
        let mut report = FanOutReport::default();
        visited.insert(origin);

        while let Some(key) = stack.pop() {
            // Destroyed transforms may linger in foreign registries until swept
            let Some(transform) = self.transforms.get(key) else { continue };
            transform.mark_stale();
            report.transforms += 1;

            for observer in transform.observers.iter() {
                match observer {
                    Observer::Transform(next) => {
                        if visited.insert(*next) {
                            stack.push(*next);
                        }
                    }
                    Observer::External(weak) => {
                        let Some(target) = weak.upgrade() else {
                            if let Some(dead) = dead.as_deref_mut() {
                                if dead.last() != Some(&key) {
                                    dead.push(key);
                                }
                            }
                            continue;
                        };
                        if notified.insert(Observer::external_address(weak)) {
                            target.invalidate();
                            report.externals += 1;
                        }
                    }
                }
            }
        }

        self.invalidation_passes.set(self.invalidation_passes.get() + 1);
        if self.config().trace_invalidation {
            engine_trace!("galaxy3d::Scene", "Invalidation from {:?}: {} transforms, {} externals",
                origin, report.transforms, report.externals);
        }
        report
    }

    // ===== OBSERVERS =====

    /// Register an observer on a transform.
    ///
    /// Returns false if it was already registered.
    ///
    /// # Errors
    ///
    /// - `NullArgument` if the transform, the observing transform or the
    ///   external object does not exist
    /// - `InvalidHierarchy` if a transform would observe itself
    pub fn add_invalidatable(&mut self, target: impl Into<TransformRef>, observer: Observer) -> Result<bool> {
        let key = self.resolve(target)?;
        match &observer {
            Observer::Transform(other) if *other == key => {
                engine_bail!("galaxy3d::Scene", InvalidHierarchy,
                    "Transform {:?} cannot observe itself", key);
            }
            Observer::Transform(other) => {
                self.transform_or_err(*other)?;
            }
            Observer::External(_) if !observer.is_alive() => {
                engine_bail!("galaxy3d::Scene", NullArgument,
                    "External observer for {:?} no longer exists", key);
            }
            Observer::External(_) => {}
        }

        let observers = &mut self.transforms[key].observers;
        observers.prune();
        Ok(observers.add(observer))
    }

    /// Unregister an observer. Returns false if it was not registered.
    pub fn remove_invalidatable(&mut self, target: impl Into<TransformRef>, observer: &Observer) -> Result<bool> {
        let key = self.resolve(target)?;
        Ok(self.transforms[key].observers.remove(observer))
    }

    /// Whether an observer is registered on a transform
    pub fn contains_invalidatable(&self, target: impl Into<TransformRef>, observer: &Observer) -> Result<bool> {
        let key = self.resolve(target)?;
        Ok(self.transforms[key].observers.contains(observer))
    }

    // ===== DETACHED TRANSFORMS =====

    /// Create an unattached identity transform
    pub fn create_transform(&mut self) -> TransformKey {
        self.transforms.insert(TransformNode::new())
    }

    /// Attach `transform` to `node`, returning the node's previous transform
    /// (now unattached).
    ///
    /// Observers registered on the previous transform (children, bound
    /// units, external listeners) move to the new one, and the parent's
    /// registry follows the swap.
    ///
    /// # Errors
    ///
    /// - `NullArgument` if the node or the transform does not exist
    /// - `AlreadyAttached` if the transform already has an owner
    pub fn replace_transform(&mut self, node: NodeKey, transform: TransformKey) -> Result<TransformKey> {
        let (previous, parent) = {
            let scene_node = self.node_or_err(node)?;
            (scene_node.transform, scene_node.parent)
        };
        if let Some(owner) = self.transform_or_err(transform)?.owner {
            engine_bail!("galaxy3d::Scene", AlreadyAttached,
                "Transform {:?} is already owned by node '{}'", transform, self.nodes[owner].name);
        }

        if let Some(parent) = parent {
            let parent_transform = self.nodes[parent].transform;
            let registry = &mut self.transforms[parent_transform].observers;
            registry.remove_transform(previous);
            registry.add(Observer::Transform(transform));
        }

        let moved: Vec<Observer> = self.transforms[previous].observers.iter().cloned().collect();
        self.transforms[previous].observers.clear();
        self.transforms[previous].owner = None;
        self.transforms[previous].mark_stale();
        for observer in moved {
            if observer != Observer::Transform(transform) {
                self.transforms[transform].observers.add(observer);
            }
        }
        self.transforms[transform].owner = Some(node);
        self.nodes[node].transform = transform;
        self.fan_out_and_prune(transform);

        if self.config().log_hierarchy_changes {
            engine_debug!("galaxy3d::Scene", "Node '{}' switched transform {:?} -> {:?}",
                self.nodes[node].name, previous, transform);
        }
        Ok(previous)
    }

    /// Destroy an unattached transform
    ///
    /// # Errors
    ///
    /// - `NullArgument` if the transform does not exist
    /// - `AlreadyAttached` if a node owns it
    pub fn destroy_transform(&mut self, transform: TransformKey) -> Result<()> {
        if let Some(owner) = self.transform_or_err(transform)?.owner {
            engine_bail!("galaxy3d::Scene", AlreadyAttached,
                "Transform {:?} is owned by node '{}' and cannot be destroyed alone",
                transform, self.nodes[owner].name);
        }
        self.transforms.remove(transform);
        self.forget_transform(transform);
        Ok(())
    }
}

#[cfg(test)]
#[path = "transform_ops_tests.rs"]
mod tests;
