//! Scene module
//!
//! Provides the node/transform registry, hierarchy edits, lazily refreshed
//! world-space poses and the behavior units bound to nodes.

mod component;
mod hierarchy;
mod pose;
mod scene;
mod scene_config;
mod scene_node;
mod transform_node;
mod transform_ops;

pub use component::Component;
pub use pose::Pose;
pub use scene::Scene;
pub use scene_config::{SceneConfig, SceneStats};
pub use scene_node::{NodeKey, SceneNode};
pub use transform_node::{TransformKey, TransformNode, TransformRef};
pub use transform_ops::FanOutReport;
