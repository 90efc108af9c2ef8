//! Scene node: a named entity in the spatial tree.
//!
//! A node owns exactly one transform, links to an optional parent, tracks the
//! root of its tree, and lists its children in insertion order. Child
//! lifetimes are managed by the [`Scene`](super::Scene), never by the parent.

use std::fmt;
use std::rc::Rc;
use slotmap::new_key_type;
use super::component::Component;
use super::transform_node::TransformKey;

// ===== SLOT MAP KEY =====

new_key_type! {
    /// Stable key for a SceneNode within a Scene.
    pub struct NodeKey;
}

/// Entity of the spatial tree.
pub struct SceneNode {
    pub(crate) key: NodeKey,
    pub(crate) name: String,
    pub(crate) parent: Option<NodeKey>,
    /// Top-most ancestor (`key` itself when there is no parent)
    pub(crate) root: NodeKey,
    pub(crate) children: Vec<NodeKey>,
    pub(crate) transform: TransformKey,
    pub(crate) components: Vec<Rc<dyn Component>>,
}

impl SceneNode {
    pub(crate) fn new(key: NodeKey, name: String, transform: TransformKey) -> Self {
        Self {
            key,
            name,
            parent: None,
            root: key,
            children: Vec::new(),
            transform,
            components: Vec::new(),
        }
    }

    // ===== GETTERS =====

    /// This node's own key
    pub fn key(&self) -> NodeKey {
        self.key
    }

    /// Node name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent node, if any
    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    /// Root of the tree this node belongs to
    pub fn root(&self) -> NodeKey {
        self.root
    }

    /// Whether this node is the root of its tree
    pub fn is_root(&self) -> bool {
        self.root == self.key
    }

    /// Children in insertion order
    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }

    /// The transform owned by this node
    pub fn transform(&self) -> TransformKey {
        self.transform
    }

    /// Bound behavior units
    pub fn components(&self) -> &[Rc<dyn Component>] {
        &self.components
    }
}

impl fmt::Debug for SceneNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneNode")
            .field("key", &self.key)
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("root", &self.root)
            .field("children", &self.children)
            .field("transform", &self.transform)
            .field("components", &self.components.len())
            .finish()
    }
}
