/*!
# Galaxy 3D Scene

Spatial scene-graph core for the Galaxy 3D engine.

Nodes form trees. Each node owns a transform whose pose is stored relative
to its parent; world-space data (absolute pose, model matrices, direction
vectors) is derived lazily and cached until an edit invalidates it.
Invalidation fans out through an observer graph that reaches descendant
transforms and external caches such as cameras and bounding volumes.

## Architecture

- **Scene**: caller-owned registry of nodes and transforms (generational keys)
- **SceneNode**: named entity with a parent, a root, ordered children and components
- **TransformNode**: relative pose plus the lazily refreshed world-space cache
- **Invalidatable / Observer**: the invalidation contract and its registry
- **Component**: behavior units bound to nodes (`Camera`, `BoundingVolume`)
*/

// Internal modules
mod error;
pub mod log;
pub mod math;
pub mod invalidation;
pub mod scene;
pub mod components;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Scene graph types
    pub use crate::scene::{
        Component, FanOutReport, NodeKey, Pose, Scene, SceneConfig, SceneNode,
        SceneStats, TransformKey, TransformNode, TransformRef,
    };

    // Logging sub-module (types and configuration, NOT macros)
    pub mod log {
        pub use crate::log::{
            Logger, LogEntry, LogSeverity, DefaultLogger,
            set_logger, reset_logger, set_min_severity, min_severity,
        };
    }

    // Invalidation sub-module
    pub mod invalidation {
        pub use crate::invalidation::*;
    }

    // Bundled components sub-module
    pub mod components {
        pub use crate::components::*;
    }
}

// Re-export math library at crate root
pub use glam;
