//! # Atlas Frame
//!
//! Per-frame orchestration over the atlas graph pipeline: panel discovery,
//! consolidated cache-invalidation triggers, origin selection, search
//! filtering, and the data feeds handed to the renderer and exporter.
//!
//! Everything here runs once per rendered frame on one thread. A frame
//! either completes or degrades to an empty output; nothing blocks on the
//! foreign process.

mod config;
mod export;
mod filter;
mod panel;
mod pipeline;

pub use config::FrameConfig;
pub use export::{collect_export, ExportEdge, ExportGraph, ExportNode};
pub use filter::{is_printable, normalize_name, SearchFilter};
pub use panel::PanelPath;
pub use pipeline::{FrameInput, FrameOutput, FramePipeline, NodeView, PathView};
