//! Scene configuration and statistics.

/// Scene configuration
#[derive(Debug, Clone)]
pub struct SceneConfig {
    /// Number of nodes (and transforms) to pre-allocate
    pub node_capacity: usize,
    /// Prefix of generated node names (`"{prefix}#{index}v{version}"`)
    pub name_prefix: String,
    /// Trace-log every invalidation fan-out pass
    pub trace_invalidation: bool,
    /// Debug-log node creation, destruction and reparenting
    pub log_hierarchy_changes: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            node_capacity: 0,
            name_prefix: "Node".to_string(),
            trace_invalidation: false,
            log_hierarchy_changes: cfg!(debug_assertions),
        }
    }
}

/// Scene statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SceneStats {
    /// Live nodes
    pub node_count: usize,
    /// Live transforms (attached or not)
    pub transform_count: usize,
    /// Transforms recomputed since the scene was created
    pub refresh_count: u64,
    /// Invalidation fan-out passes since the scene was created
    pub invalidation_passes: u64,
    /// Calls to `Scene::update`
    pub frame_count: u64,
}
