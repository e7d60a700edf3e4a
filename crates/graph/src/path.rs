use crate::types::AtlasSnapshot;
use petgraph::graph::NodeIndex;
use std::collections::{HashMap, VecDeque};

/// Breadth-first shortest path (by hop count) from `origin` to `dest`.
///
/// Returns the full node sequence including both endpoints. `None` for an
/// unknown endpoint, a disconnected pair, or a reconstructed path longer
/// than `max_nodes` — an over-budget path is a failure, never truncated.
/// `origin == dest` always yields the single-node path.
pub fn find_path(
    snapshot: &AtlasSnapshot,
    origin: NodeIndex,
    dest: NodeIndex,
    max_nodes: usize,
) -> Option<Vec<NodeIndex>> {
    let graph = snapshot.graph();
    if graph.node_weight(origin).is_none() || graph.node_weight(dest).is_none() {
        return None;
    }
    if origin == dest {
        return Some(vec![origin]);
    }

    let mut predecessor: HashMap<NodeIndex, NodeIndex> = HashMap::new();
    let mut queue = VecDeque::new();
    predecessor.insert(origin, origin);
    queue.push_back(origin);

    while let Some(current) = queue.pop_front() {
        if current == dest {
            break;
        }
        for neighbor in graph.neighbors(current) {
            if !predecessor.contains_key(&neighbor) {
                predecessor.insert(neighbor, current);
                queue.push_back(neighbor);
            }
        }
    }

    if !predecessor.contains_key(&dest) {
        return None;
    }

    let mut path = vec![dest];
    let mut current = dest;
    while current != origin {
        current = predecessor[&current];
        path.push(current);
    }
    path.reverse();

    if path.len() > max_nodes {
        return None;
    }
    Some(path)
}
