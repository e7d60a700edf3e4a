use crate::records::GridPos;
use petgraph::graph::{NodeIndex, UnGraph};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 2D point/size in current display pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_sq(&self, other: Vec2) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn distance(&self, other: Vec2) -> f32 {
        self.distance_sq(other).sqrt()
    }
}

/// Axis-aligned screen rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn top_left(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

/// Process-local view of one atlas node, rebuilt fresh every frame.
/// Identity is positional (the grid slot), never object identity: the
/// foreign data can shuffle arbitrarily between frames.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    pub grid: GridPos,
    pub center: Vec2,
    pub rect: Rect,
    pub name: String,
    pub labels: Vec<String>,
    pub completed: bool,
    pub accessible: bool,
}

/// One frame's reconstructed node set and adjacency.
///
/// Node weights are stable local indices into `nodes`; the grid index maps
/// a node's grid slot to its petgraph handle. Undirected, de-duplicated.
pub struct AtlasSnapshot {
    nodes: Vec<GraphNode>,
    graph: UnGraph<u32, ()>,
    grid_index: HashMap<GridPos, NodeIndex>,
}

impl AtlasSnapshot {
    pub(crate) fn new() -> Self {
        Self {
            nodes: Vec::new(),
            graph: UnGraph::default(),
            grid_index: HashMap::new(),
        }
    }

    /// Register a node; the first entry for a grid slot wins.
    pub(crate) fn push_node(&mut self, node: GraphNode) -> NodeIndex {
        let grid = node.grid;
        let local = self.nodes.len() as u32;
        self.nodes.push(node);
        let idx = self.graph.add_node(local);
        self.grid_index.entry(grid).or_insert(idx);
        idx
    }

    /// Add an undirected edge unless it already exists.
    pub(crate) fn link(&mut self, a: NodeIndex, b: NodeIndex) {
        if self.graph.find_edge(a, b).is_none() {
            self.graph.add_edge(a, b, ());
        }
    }

    pub fn graph(&self) -> &UnGraph<u32, ()> {
        &self.graph
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn node_index(&self, grid: GridPos) -> Option<NodeIndex> {
        self.grid_index.get(&grid).copied()
    }

    pub fn node(&self, idx: NodeIndex) -> Option<&GraphNode> {
        let local = *self.graph.node_weight(idx)?;
        self.nodes.get(local as usize)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn neighbors(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors(idx)
    }

    /// Edge list as index pairs, for the exporter feed.
    pub fn edges(&self) -> impl Iterator<Item = (NodeIndex, NodeIndex)> + '_ {
        self.graph
            .edge_indices()
            .filter_map(|e| self.graph.edge_endpoints(e))
    }
}

impl std::fmt::Debug for AtlasSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AtlasSnapshot")
            .field("nodes", &self.nodes.len())
            .field("edges", &self.graph.edge_count())
            .finish()
    }
}
