use crate::error::{Result, SnapshotError};
use crate::records::{
    AtlasConnectionRecord, AtlasNodeEntry, AtlasNodeRecord, AtlasPanel, GridPos,
};
use crate::transform::TransformResolver;
use crate::types::{AtlasSnapshot, GraphNode, Rect};
use atlas_memory::RemoteReader;

/// Caller-owned graph construction policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildPolicy {
    /// Drop edges touching a completed node at insertion time.
    pub skip_completed: bool,
}

/// Builds one frame's [`AtlasSnapshot`] from the panel's backing vectors.
pub struct SnapshotBuilder<'a> {
    reader: &'a RemoteReader,
    transform: &'a TransformResolver,
}

impl<'a> SnapshotBuilder<'a> {
    pub fn new(reader: &'a RemoteReader, transform: &'a TransformResolver) -> Self {
        Self { reader, transform }
    }

    /// Decode the panel at `panel_addr` into a node set and adjacency.
    ///
    /// When the node vector is unusable (malformed span, safety cap) the
    /// panel's child elements are decoded instead; grid slots are unknown
    /// on that path, so the snapshot carries no edges. `Unavailable` only
    /// when neither source yields a node; callers degrade for the frame
    /// rather than treating this as fatal.
    pub fn build(&self, panel_addr: u64, policy: BuildPolicy) -> Result<AtlasSnapshot> {
        if panel_addr == 0 {
            return Err(SnapshotError::Unavailable);
        }
        let panel: AtlasPanel = self.reader.read(panel_addr);
        let bounds = self.panel_bounds(&panel);

        let node_vec = panel.nodes;
        let node_count = node_vec.count::<AtlasNodeEntry>();
        let mut snapshot = AtlasSnapshot::new();
        if node_count == 0 {
            let panel_frame = panel.frame;
            let children = panel_frame.children;
            for i in 0..children.count::<u64>() {
                let element = children.pointer_at(self.reader, i);
                self.push_element(&mut snapshot, GridPos::new(0, 0), element, bounds.as_ref());
            }
            if snapshot.node_count() == 0 {
                return Err(SnapshotError::Unavailable);
            }
            log::debug!(
                "atlas snapshot (children fallback): {} isolated nodes",
                snapshot.node_count(),
            );
            return Ok(snapshot);
        }

        for i in 0..node_count {
            let entry: AtlasNodeEntry = node_vec.read_at(self.reader, i);
            self.push_element(&mut snapshot, entry.grid, entry.element, bounds.as_ref());
        }
        if snapshot.node_count() == 0 {
            return Err(SnapshotError::Unavailable);
        }

        let conn_vec = panel.connections;
        let conn_count = conn_vec.count::<AtlasConnectionRecord>();
        for i in 0..conn_count {
            let record: AtlasConnectionRecord = conn_vec.read_at(self.reader, i);
            let src = record.grid;
            for dst in record.neighbors {
                if dst.is_zero() || dst == src {
                    continue;
                }
                // Each undirected edge appears in both endpoints' records;
                // process it only from the canonically ordered side.
                if !canonical_order(src, dst) {
                    continue;
                }
                let (Some(a), Some(b)) = (snapshot.node_index(src), snapshot.node_index(dst))
                else {
                    // Half-known edges are omitted, not partially added.
                    continue;
                };
                if policy.skip_completed && (node_completed(&snapshot, a) || node_completed(&snapshot, b)) {
                    continue;
                }
                snapshot.link(a, b);
            }
        }

        log::debug!(
            "atlas snapshot: {} nodes, {} edges ({} raw entries, {} connection records)",
            snapshot.node_count(),
            snapshot.edge_count(),
            node_count,
            conn_count,
        );
        Ok(snapshot)
    }

    /// The panel's own screen rectangle, used to drop nodes whose center
    /// lands outside it. A zero-area rect means the panel frame itself
    /// did not decode; no bound is applied then, since it would drop
    /// every node.
    fn panel_bounds(&self, panel: &AtlasPanel) -> Option<Rect> {
        let frame = panel.frame;
        let top_left = self.transform.absolute_top_left(self.reader, &frame);
        let scale = self.transform.scale_pair(&frame);
        let size = frame.unscaled_size;
        let rect = Rect::new(top_left.x, top_left.y, size.x * scale.x, size.y * scale.y);
        (rect.width > 0.0 && rect.height > 0.0).then_some(rect)
    }

    fn push_element(
        &self,
        snapshot: &mut AtlasSnapshot,
        grid: GridPos,
        element: u64,
        bounds: Option<&Rect>,
    ) {
        if element == 0 {
            return;
        }
        let record: AtlasNodeRecord = self.reader.read(element);
        let frame = record.frame;
        let top_left = self.transform.absolute_top_left(self.reader, &frame);
        let scale = self.transform.scale_pair(&frame);
        let size = frame.unscaled_size;
        let rect = Rect::new(top_left.x, top_left.y, size.x * scale.x, size.y * scale.y);
        if let Some(bounds) = bounds {
            if !bounds.contains(rect.center()) {
                return;
            }
        }
        snapshot.push_node(GraphNode {
            grid,
            center: rect.center(),
            rect,
            name: record.read_name(self.reader),
            labels: record.read_labels(self.reader),
            completed: record.is_completed(),
            accessible: record.is_accessible(),
        });
    }
}

/// Canonical processing order for the duplicate directional records:
/// handle (src, dst) only when src sorts at-or-before dst.
fn canonical_order(src: GridPos, dst: GridPos) -> bool {
    let (sx, sy) = (src.x, src.y);
    let (dx, dy) = (dst.x, dst.y);
    sx < dx || (sx == dx && sy <= dy)
}

fn node_completed(snapshot: &AtlasSnapshot, idx: petgraph::graph::NodeIndex) -> bool {
    snapshot.node(idx).map(|n| n.completed).unwrap_or(false)
}
