use atlas_graph::Vec2;
use serde::{Deserialize, Serialize};

/// Externally-owned policy knobs, merely read by the pipeline each frame.
/// Changes to `search_query` or `max_path_nodes` wipe the path cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Paths longer than this many nodes are treated as "no path".
    pub max_path_nodes: usize,
    /// Comma-separated map names; empty disables path queries.
    pub search_query: String,
    /// Drop graph edges touching completed nodes at build time.
    pub skip_completed: bool,
    /// Hide completed nodes from the renderer feed.
    pub hide_completed: bool,
    /// Hide not-yet-accessible nodes from the renderer feed.
    pub hide_not_accessible: bool,
    /// Display size the label-scale multiplier is relative to.
    pub reference_resolution: Vec2,
    /// Extra user-controlled label scale factor.
    pub scale_multiplier: f32,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_path_nodes: 24,
            search_query: String::new(),
            skip_completed: false,
            hide_completed: true,
            hide_not_accessible: false,
            reference_resolution: Vec2::new(1920.0, 1080.0),
            scale_multiplier: 1.0,
        }
    }
}
