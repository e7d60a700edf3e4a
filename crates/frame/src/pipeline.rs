use crate::config::FrameConfig;
use crate::filter::{is_printable, normalize_name, SearchFilter};
use crate::panel::PanelPath;
use atlas_graph::records::UiElementFrame;
use atlas_graph::{
    find_path, BuildPolicy, PathCache, Rect, SnapshotBuilder, SnapshotError, TransformResolver,
    Vec2,
};
use atlas_memory::RemoteReader;
use petgraph::graph::NodeIndex;

/// Per-frame inputs observed by the owning render loop.
#[derive(Debug, Clone, Copy)]
pub struct FrameInput {
    /// Target process, when reading a live process. `None` keeps whatever
    /// source the reader already has (e.g. a loaded dump).
    pub pid: Option<u32>,
    /// Address of the foreign UI root element.
    pub ui_root: u64,
    /// Current display size in pixels.
    pub display_size: Vec2,
    /// Reference point paths originate from (e.g. the mouse cursor).
    pub cursor: Vec2,
}

/// One renderable node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeView {
    /// Stable-for-this-frame local index; path views reference it.
    pub index: u32,
    pub center: Vec2,
    pub rect: Rect,
    pub name: String,
    pub completed: bool,
    pub accessible: bool,
}

/// Polyline from the origin node to one search-matched node.
#[derive(Debug, Clone, PartialEq)]
pub struct PathView {
    pub target: u32,
    pub points: Vec<Vec2>,
    /// Total Euclidean length in pixels.
    pub length: f32,
}

/// Everything the renderer consumes for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameOutput {
    pub nodes: Vec<NodeView>,
    pub paths: Vec<PathView>,
    /// Label scale multiplier relative to the reference resolution.
    pub ui_scale: f32,
}

impl FrameOutput {
    fn empty() -> Self {
        Self {
            ui_scale: 1.0,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct TriggerState {
    visible: bool,
    search_query: String,
    origin: Option<u32>,
    max_path_nodes: usize,
}

impl Default for TriggerState {
    fn default() -> Self {
        Self {
            visible: false,
            search_query: String::new(),
            origin: None,
            max_path_nodes: 0,
        }
    }
}

/// Frame-spanning pipeline state: the process reader, the path cache, and
/// the previous frame's trigger values.
///
/// Cache invalidation is level-triggered: each frame starts by comparing
/// the current (visibility, search query, origin, path budget) against the
/// previous frame and wiping the cache on any difference, so no path is
/// ever served against a previous frame's node indexing.
pub struct FramePipeline {
    reader: RemoteReader,
    cache: PathCache,
    config: FrameConfig,
    panel_path: PanelPath,
    last: TriggerState,
}

impl FramePipeline {
    pub fn new(config: FrameConfig, panel_path: PanelPath) -> Self {
        Self::from_reader(RemoteReader::new(), config, panel_path)
    }

    /// Pipeline over a pre-built reader (dump images, tests).
    pub fn from_reader(reader: RemoteReader, config: FrameConfig, panel_path: PanelPath) -> Self {
        Self {
            reader,
            cache: PathCache::new(),
            config,
            panel_path,
            last: TriggerState::default(),
        }
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    /// Swap in the (externally owned) configuration for coming frames.
    pub fn set_config(&mut self, config: FrameConfig) {
        self.config = config;
    }

    pub fn cache_generation(&self) -> u64 {
        self.cache.generation()
    }

    /// Release the process handle (shutdown path).
    pub fn shutdown(&mut self) {
        self.reader.detach();
    }

    /// Run one frame of the pipeline.
    pub fn run(&mut self, input: &FrameInput) -> FrameOutput {
        if let Some(pid) = input.pid {
            self.reader.ensure_attached(pid);
        }

        let panel_addr = self.panel_path.resolve(&self.reader, input.ui_root);
        let panel_frame: UiElementFrame = self.reader.read(panel_addr);
        let visible = panel_addr != 0 && panel_frame.is_visible();
        if !visible {
            // Graph state is no longer trustworthy once the panel is gone.
            if self.last.visible {
                self.cache.invalidate_all();
            }
            self.last.visible = false;
            self.last.origin = None;
            return FrameOutput::empty();
        }

        if self.last.search_query != self.config.search_query
            || self.last.max_path_nodes != self.config.max_path_nodes
        {
            self.cache.invalidate_all();
        }
        self.last.visible = true;
        self.last.search_query = self.config.search_query.clone();
        self.last.max_path_nodes = self.config.max_path_nodes;

        let transform = TransformResolver::new(input.display_size, self.config.reference_resolution);
        let builder = SnapshotBuilder::new(&self.reader, &transform);
        let policy = BuildPolicy {
            skip_completed: self.config.skip_completed,
        };
        let snapshot = match builder.build(panel_addr, policy) {
            Ok(snapshot) => snapshot,
            Err(SnapshotError::Unavailable) => {
                log::debug!("atlas snapshot unavailable, degrading frame");
                if self.last.origin.is_some() {
                    self.cache.invalidate_all();
                }
                self.last.origin = None;
                return FrameOutput::empty();
            }
        };

        // Nearest node to the moving reference point. Local indices are
        // frame-local, so a change here invalidates every cached path.
        let origin = nearest_node(&snapshot, input.cursor);
        if self.last.origin != origin {
            self.cache.invalidate_all();
            self.last.origin = origin;
        }

        let filter = SearchFilter::parse(&self.config.search_query);
        let mut nodes = Vec::new();
        for (local, node) in snapshot.nodes().iter().enumerate() {
            let name = normalize_name(&node.name);
            if !is_printable(&name) {
                continue;
            }
            // An active search hides non-matching nodes entirely.
            if !filter.is_empty() && !filter.matches(&name) {
                continue;
            }
            if self.config.hide_completed && node.completed {
                continue;
            }
            if self.config.hide_not_accessible && !node.accessible {
                continue;
            }
            nodes.push(NodeView {
                index: local as u32,
                center: node.center,
                rect: node.rect,
                name,
                completed: node.completed,
                accessible: node.accessible,
            });
        }

        let mut paths = Vec::new();
        if let Some(origin) = origin {
            if !filter.is_empty() {
                for view in &nodes {
                    if view.index == origin || !filter.matches(&view.name) {
                        continue;
                    }
                    if let Some(indices) = self.lookup_path(&snapshot, origin, view.index) {
                        paths.push(polyline(&snapshot, view.index, &indices));
                    }
                }
            }
        }

        let ui_scale = (self.config.scale_multiplier * transform.relative_ui_scale(&panel_frame))
            .clamp(0.5, 4.0);

        FrameOutput {
            nodes,
            paths,
            ui_scale,
        }
    }

    fn lookup_path(
        &mut self,
        snapshot: &atlas_graph::AtlasSnapshot,
        origin: u32,
        dest: u32,
    ) -> Option<Vec<u32>> {
        if let Some(cached) = self.cache.get(origin, dest) {
            return Some(cached.to_vec());
        }
        let path = find_path(
            snapshot,
            NodeIndex::new(origin as usize),
            NodeIndex::new(dest as usize),
            self.config.max_path_nodes,
        )?;
        let indices: Vec<u32> = path.iter().map(|idx| idx.index() as u32).collect();
        self.cache.put(origin, dest, indices.clone());
        Some(indices)
    }
}

fn nearest_node(snapshot: &atlas_graph::AtlasSnapshot, cursor: Vec2) -> Option<u32> {
    snapshot
        .nodes()
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            a.center
                .distance_sq(cursor)
                .total_cmp(&b.center.distance_sq(cursor))
        })
        .map(|(local, _)| local as u32)
}

fn polyline(snapshot: &atlas_graph::AtlasSnapshot, target: u32, indices: &[u32]) -> PathView {
    let points: Vec<Vec2> = indices
        .iter()
        .filter_map(|&local| snapshot.node(NodeIndex::new(local as usize)))
        .map(|node| node.center)
        .collect();
    let length = points
        .windows(2)
        .map(|pair| pair[0].distance(pair[1]))
        .sum();
    PathView {
        target,
        points,
        length,
    }
}
