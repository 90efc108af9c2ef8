//! Scene: the registry of every node and transform of a spatial tree set.
//!
//! Uses two SlotMaps for O(1) insert/remove with stable generational keys.
//! The scene is an ordinary value owned by the caller: nothing here is
//! process-wide state. Hierarchy edits live in `hierarchy.rs`, pose access
//! and invalidation in `transform_ops.rs`.

use std::cell::Cell;
use std::rc::Rc;
use rustc_hash::FxHashMap;
use slotmap::{Key, SlotMap};
use crate::error::Result;
use crate::invalidation::Observer;
use crate::{engine_bail, engine_debug, engine_err, engine_trace};
use super::component::Component;
use super::scene_config::{SceneConfig, SceneStats};
use super::scene_node::{NodeKey, SceneNode};
use super::transform_node::{TransformKey, TransformNode};

/// Registry of scene nodes and their transforms.
///
/// Reads take `&self` (pose caches refresh through interior mutability),
/// edits take `&mut self`. The scene is single-threaded: it is neither
/// `Send` nor `Sync`.
pub struct Scene {
    config: SceneConfig,
    pub(super) nodes: SlotMap<NodeKey, SceneNode>,
    pub(super) transforms: SlotMap<TransformKey, TransformNode>,
    /// Component address -> node it is bound to
    pub(super) bound_components: FxHashMap<*const (), NodeKey>,
    /// Component address -> observer registered for it at bind time
    pose_observers: FxHashMap<*const (), Observer>,
    pub(super) refresh_count: Cell<u64>,
    pub(super) invalidation_passes: Cell<u64>,
    frame_count: u64,
}

impl Scene {
    /// Create an empty scene with the default configuration
    pub fn new() -> Self {
        Self::with_config(SceneConfig::default())
    }

    /// Create an empty scene
    pub fn with_config(config: SceneConfig) -> Self {
        Self {
            nodes: SlotMap::with_capacity_and_key(config.node_capacity),
            transforms: SlotMap::with_capacity_and_key(config.node_capacity),
            bound_components: FxHashMap::default(),
            pose_observers: FxHashMap::default(),
            refresh_count: Cell::new(0),
            invalidation_passes: Cell::new(0),
            frame_count: 0,
            config,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    // ===== NODE LIFECYCLE =====

    /// Create a root node with a fresh identity transform.
    ///
    /// Without a name, the node is named `"{name_prefix}#{index}v{version}"`
    /// after its arena key.
    pub fn create_node(&mut self, name: Option<&str>) -> NodeKey {
        let transform = self.transforms.insert(TransformNode::new());
        let prefix = &self.config.name_prefix;
        let key = self.nodes.insert_with_key(|key| {
            let name = match name {
                Some(name) => name.to_string(),
                None => format!("{}#{:?}", prefix, key.data()),
            };
            SceneNode::new(key, name, transform)
        });
        self.transforms[transform].owner = Some(key);

        if self.config.log_hierarchy_changes {
            engine_debug!("galaxy3d::Scene", "Created node '{}'", self.nodes[key].name);
        }
        key
    }

    /// Destroy a node.
    ///
    /// The node leaves its parent, its components are unbound and its
    /// transform is destroyed. Children are not destroyed: each one becomes
    /// the root of its own subtree, keeping its world pose.
    pub fn destroy_node(&mut self, node: NodeKey) -> Result<()> {
        let children = self.node_or_err(node)?.children.clone();
        for child in children {
            self.set_parent(child, None)?;
        }
        self.set_parent(node, None)?;

        let components = self.nodes[node].components.clone();
        for component in &components {
            self.unbind_component(node, component);
        }

        if let Some(removed) = self.nodes.remove(node) {
            self.transforms.remove(removed.transform);
            self.forget_transform(removed.transform);
            if self.config.log_hierarchy_changes {
                engine_debug!("galaxy3d::Scene", "Destroyed node '{}'", removed.name);
            }
        }
        Ok(())
    }

    /// Remove every node and transform, unbinding all components
    pub fn clear(&mut self) {
        let bindings: Vec<(NodeKey, Rc<dyn Component>)> = self
            .nodes
            .iter()
            .flat_map(|(key, node)| node.components.iter().map(move |c| (key, c.clone())))
            .collect();
        self.nodes.clear();
        self.transforms.clear();
        self.bound_components.clear();
        self.pose_observers.clear();
        for (node, component) in bindings {
            component.on_detach(node);
        }
    }

    // ===== REGISTRY QUERIES =====

    /// Get a node by key
    pub fn node(&self, key: NodeKey) -> Option<&SceneNode> {
        self.nodes.get(key)
    }

    /// Get a transform by key
    pub fn transform(&self, key: TransformKey) -> Option<&TransformNode> {
        self.transforms.get(key)
    }

    /// Whether the key resolves to a live node
    pub fn contains_node(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// Iterate over all nodes (key, node), in arena order
    pub fn nodes(&self) -> impl Iterator<Item = (NodeKey, &SceneNode)> {
        self.nodes.iter()
    }

    /// Number of live nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of live transforms, attached or not
    pub fn transform_count(&self) -> usize {
        self.transforms.len()
    }

    /// First node (in arena order) with this name
    pub fn find_by_name(&self, name: &str) -> Option<NodeKey> {
        self.nodes.iter().find(|(_, node)| node.name == name).map(|(key, _)| key)
    }

    /// Node name
    pub fn name(&self, node: NodeKey) -> Result<&str> {
        Ok(&self.node_or_err(node)?.name)
    }

    /// Rename a node
    pub fn set_name(&mut self, node: NodeKey, name: &str) -> Result<()> {
        self.node_mut_or_err(node)?.name = name.to_string();
        Ok(())
    }

    /// The transform owned by a node
    pub fn transform_of(&self, node: NodeKey) -> Result<TransformKey> {
        Ok(self.node_or_err(node)?.transform)
    }

    /// Current statistics
    pub fn stats(&self) -> SceneStats {
        SceneStats {
            node_count: self.nodes.len(),
            transform_count: self.transforms.len(),
            refresh_count: self.refresh_count.get(),
            invalidation_passes: self.invalidation_passes.get(),
            frame_count: self.frame_count,
        }
    }

    // ===== COMPONENTS =====

    /// Bind a behavior unit to a node.
    ///
    /// If the unit provides a [`pose_observer`](Component::pose_observer), it
    /// is registered on the node's transform. The scene keeps that observer
    /// with the binding and unregisters the same one on unbind.
    ///
    /// # Errors
    ///
    /// - `NullArgument` if the node does not exist
    /// - `AlreadyAttached` if the unit is bound to any node (this one included)
    pub fn add_component(&mut self, node: NodeKey, component: Rc<dyn Component>) -> Result<()> {
        let transform = self.node_or_err(node)?.transform;
        let address = Rc::as_ptr(&component) as *const ();
        if let Some(owner) = self.bound_components.get(&address) {
            let owner_name = self.nodes.get(*owner).map(|n| n.name.clone()).unwrap_or_default();
            engine_bail!("galaxy3d::Scene", AlreadyAttached,
                "{} is already bound to node '{}'", component.type_name(), owner_name);
        }

        if let Some(observer) = component.clone().pose_observer() {
            let observer = Observer::from_dyn(&observer);
            self.transforms[transform].observers.add(observer.clone());
            self.pose_observers.insert(address, observer);
        }
        self.bound_components.insert(address, node);
        self.nodes[node].components.push(component.clone());
        component.on_attach(node);

        engine_trace!("galaxy3d::Scene", "Bound {} to node '{}'",
            component.type_name(), self.nodes[node].name);
        Ok(())
    }

    /// Unbind a behavior unit from a node.
    ///
    /// Returns false if the unit was not bound to this node.
    pub fn remove_component(&mut self, node: NodeKey, component: &Rc<dyn Component>) -> Result<bool> {
        self.node_or_err(node)?;
        let address = Rc::as_ptr(component) as *const ();
        if self.bound_components.get(&address) != Some(&node) {
            return Ok(false);
        }
        self.unbind_component(node, component);
        Ok(true)
    }

    /// Units bound to a node, in binding order
    pub fn components(&self, node: NodeKey) -> Result<&[Rc<dyn Component>]> {
        Ok(&self.node_or_err(node)?.components)
    }

    /// First unit of type `T` bound to a node
    pub fn component<T: Component>(&self, node: NodeKey) -> Option<Rc<dyn Component>> {
        self.nodes.get(node)?
            .components
            .iter()
            .find(|c| c.as_any().is::<T>())
            .cloned()
    }

    /// Node a unit is bound to, if any
    pub fn component_owner(&self, component: &Rc<dyn Component>) -> Option<NodeKey> {
        self.bound_components.get(&(Rc::as_ptr(component) as *const ())).copied()
    }

    fn unbind_component(&mut self, node: NodeKey, component: &Rc<dyn Component>) {
        let address = Rc::as_ptr(component) as *const ();
        self.bound_components.remove(&address);

        let transform = self.nodes[node].transform;
        if let Some(observer) = self.pose_observers.remove(&address) {
            self.transforms[transform].observers.remove(&observer);
        }
        self.nodes[node]
            .components
            .retain(|c| Rc::as_ptr(c) as *const () != address);
        component.on_detach(node);
    }

    // ===== PER-FRAME UPDATE =====

    /// Run every bound unit's [`update`](Component::update) hook once.
    ///
    /// Bindings are snapshotted first, so units may edit the scene (move,
    /// reparent, bind or unbind) from their hook. A unit unbound earlier in
    /// the same pass is skipped.
    pub fn update(&mut self, delta_seconds: f32) {
        let bindings: Vec<(NodeKey, Rc<dyn Component>)> = self
            .nodes
            .iter()
            .flat_map(|(key, node)| node.components.iter().map(move |c| (key, c.clone())))
            .collect();

        for (node, component) in bindings {
            if self.component_owner(&component) == Some(node) {
                component.update(self, node, delta_seconds);
            }
        }
        self.frame_count += 1;
    }

    // ===== LOOKUP HELPERS =====

    pub(super) fn node_or_err(&self, key: NodeKey) -> Result<&SceneNode> {
        self.nodes.get(key)
            .ok_or_else(|| engine_err!("galaxy3d::Scene", NullArgument, "Unknown node {:?}", key))
    }

    pub(super) fn node_mut_or_err(&mut self, key: NodeKey) -> Result<&mut SceneNode> {
        self.nodes.get_mut(key)
            .ok_or_else(|| engine_err!("galaxy3d::Scene", NullArgument, "Unknown node {:?}", key))
    }

    pub(super) fn transform_or_err(&self, key: TransformKey) -> Result<&TransformNode> {
        self.transforms.get(key)
            .ok_or_else(|| engine_err!("galaxy3d::Scene", NullArgument, "Unknown transform {:?}", key))
    }

    /// Drop a destroyed transform from every observer registry
    pub(super) fn forget_transform(&mut self, key: TransformKey) {
        for transform in self.transforms.values_mut() {
            transform.observers.remove_transform(key);
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "scene_tests.rs"]
mod tests;
