//! Tree edits: reparenting with world-pose preservation, root propagation.

use crate::error::Result;
use crate::invalidation::Observer;
use crate::{engine_bail, engine_debug};
use super::scene::Scene;
use super::scene_node::NodeKey;

impl Scene {
    /// Parent of a node, if any
    pub fn parent(&self, node: NodeKey) -> Result<Option<NodeKey>> {
        Ok(self.node_or_err(node)?.parent)
    }

    /// Root of the tree a node belongs to
    pub fn root(&self, node: NodeKey) -> Result<NodeKey> {
        Ok(self.node_or_err(node)?.root)
    }

    /// Children of a node, in insertion order
    pub fn children(&self, node: NodeKey) -> Result<&[NodeKey]> {
        Ok(&self.node_or_err(node)?.children)
    }

    /// Whether `ancestor` appears on the parent chain of `node` (strictly above it)
    pub fn is_ancestor_of(&self, ancestor: NodeKey, node: NodeKey) -> Result<bool> {
        self.node_or_err(ancestor)?;
        let mut cursor = self.node_or_err(node)?.parent;
        while let Some(current) = cursor {
            if current == ancestor {
                return Ok(true);
            }
            cursor = self.nodes[current].parent;
        }
        Ok(false)
    }

    /// Every descendant of a node, depth-first, children in insertion order
    pub fn descendants(&self, node: NodeKey) -> Result<Vec<NodeKey>> {
        let mut stack: Vec<NodeKey> = self.node_or_err(node)?.children.iter().rev().copied().collect();
        let mut result = Vec::new();
        while let Some(current) = stack.pop() {
            result.push(current);
            stack.extend(self.nodes[current].children.iter().rev().copied());
        }
        Ok(result)
    }

    /// Move a node under `new_parent` (or make it a root with `None`),
    /// keeping its world-space pose.
    ///
    /// All checks run before any link changes, so a rejected call leaves the
    /// scene untouched.
    ///
    /// # Errors
    ///
    /// - `NullArgument` if either node does not exist
    /// - `InvalidHierarchy` if `new_parent` is the node itself or one of its descendants
    pub fn set_parent(&mut self, node: NodeKey, new_parent: Option<NodeKey>) -> Result<()> {
        let current_parent = self.node_or_err(node)?.parent;
        if let Some(parent) = new_parent {
            self.node_or_err(parent)?;
            if parent == node {
                engine_bail!("galaxy3d::Scene", InvalidHierarchy,
                    "Node '{}' cannot be its own parent", self.nodes[node].name);
            }
            if self.is_ancestor_of(node, parent)? {
                engine_bail!("galaxy3d::Scene", InvalidHierarchy,
                    "Node '{}' cannot be parented to its descendant '{}'",
                    self.nodes[node].name, self.nodes[parent].name);
            }
        }
        if current_parent == new_parent {
            return Ok(());
        }

        // Snapshot everything needed before links change
        let captured = self.world_pose(node)?;
        let parent_pose = match new_parent {
            Some(parent) => Some(self.world_pose(parent)?),
            None => None,
        };
        let node_transform = self.nodes[node].transform;

        // Detach
        if let Some(old_parent) = current_parent {
            let old_parent_transform = self.nodes[old_parent].transform;
            self.nodes[old_parent].children.retain(|child| *child != node);
            self.transforms[old_parent_transform].observers.remove_transform(node_transform);
            self.nodes[node].parent = None;
            self.propagate_root(node, node);
        }

        // Attach
        if let Some(parent) = new_parent {
            let parent_transform = self.nodes[parent].transform;
            self.nodes[node].parent = Some(parent);
            self.nodes[parent].children.push(node);
            self.transforms[parent_transform].observers.add(Observer::Transform(node_transform));
            let root = self.nodes[parent].root;
            self.propagate_root(node, root);
        }

        // Re-express the captured world pose in the new parent's frame
        let relative = match &parent_pose {
            Some(parent_pose) => captured.relative_to(parent_pose),
            None => captured,
        };
        self.transforms[node_transform].relative = relative;
        self.fan_out_and_prune(node_transform);

        if self.config().log_hierarchy_changes {
            let parent_name = new_parent.map(|p| self.nodes[p].name.as_str()).unwrap_or("<none>");
            engine_debug!("galaxy3d::Scene", "Reparented '{}' under '{}'",
                self.nodes[node].name, parent_name);
        }
        Ok(())
    }

    /// Sugar for `set_parent(child, Some(parent))`
    pub fn add_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<()> {
        self.set_parent(child, Some(parent))
    }

    /// Sugar for `set_parent(node, None)`
    pub fn remove_from_parent(&mut self, node: NodeKey) -> Result<()> {
        self.set_parent(node, None)
    }

    /// Overwrite `root` on `start` and its whole subtree
    fn propagate_root(&mut self, start: NodeKey, root: NodeKey) {
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            let node = &mut self.nodes[current];
            node.root = root;
            stack.extend(node.children.iter().copied());
        }
    }
}

#[cfg(test)]
#[path = "hierarchy_tests.rs"]
mod tests;
