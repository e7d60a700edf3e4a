use atlas_graph::{AtlasSnapshot, Vec2};
use serde::Serialize;

/// One node of the exporter data feed. Data only; the document format
/// belongs to the exporter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportNode {
    pub name: String,
    /// Content labels mined from the node's content vector.
    pub labels: Vec<String>,
    pub position: Vec2,
    pub size: Vec2,
    pub completed: bool,
    pub accessible: bool,
}

/// One undirected edge, as endpoint screen positions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportEdge {
    pub from: Vec2,
    pub to: Vec2,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportGraph {
    pub nodes: Vec<ExportNode>,
    pub edges: Vec<ExportEdge>,
}

/// Flatten a snapshot into the exporter feed.
pub fn collect_export(snapshot: &AtlasSnapshot) -> ExportGraph {
    let nodes = snapshot
        .nodes()
        .iter()
        .map(|node| ExportNode {
            name: node.name.clone(),
            labels: node.labels.clone(),
            position: node.rect.top_left(),
            size: node.rect.size(),
            completed: node.completed,
            accessible: node.accessible,
        })
        .collect();
    let edges = snapshot
        .edges()
        .filter_map(|(a, b)| Some((snapshot.node(a)?, snapshot.node(b)?)))
        .map(|(a, b)| ExportEdge {
            from: a.center,
            to: b.center,
        })
        .collect();
    ExportGraph { nodes, edges }
}
