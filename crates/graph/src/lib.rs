//! # Atlas Graph
//!
//! Reconstructs the atlas panel's node graph from foreign memory and
//! answers shortest-path queries against it.
//!
//! ## Architecture
//!
//! ```text
//! AtlasPanel bytes (foreign)
//!     │
//!     ├──> records        packed ABI views (panel, node entry, connection)
//!     │
//!     ├──> TransformResolver
//!     │      └─ parent-chain walk → absolute screen positions
//!     │
//!     ├──> SnapshotBuilder
//!     │      ├─ node vector → GraphNode list + grid index
//!     │      └─ connection vector → undirected, de-duplicated edges
//!     │
//!     └──> find_path (BFS) + PathCache
//! ```
//!
//! Snapshots are rebuilt from scratch every frame; only the path cache
//! survives frames, and it is wiped whenever its inputs shift.

mod builder;
mod cache;
mod error;
mod path;
pub mod records;
mod transform;
mod types;

pub use builder::{BuildPolicy, SnapshotBuilder};
pub use cache::PathCache;
pub use error::{Result, SnapshotError};
pub use path::find_path;
pub use transform::{TransformResolver, BASE_RESOLUTION, MAX_PARENT_HOPS, MIN_SCALE};
pub use types::{AtlasSnapshot, GraphNode, Rect, Vec2};
