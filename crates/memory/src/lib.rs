//! # Atlas Memory
//!
//! Typed, bounds-checked reads from a foreign process's address space.
//!
//! The external process is uncooperative and unsynchronized: pointers go
//! stale, vectors are resized mid-read, whole structures are garbage. Every
//! primitive here therefore degrades to a zeroed/empty value instead of
//! surfacing an error to the layers that interpret the data.
//!
//! ## Architecture
//!
//! ```text
//! MemorySource (trait)
//!     ├─ ProcessSource   live process, read-only handle keyed by pid
//!     └─ ImageSource     byte snapshot (memory dump, fixtures)
//!           │
//! RemoteReader           typed records + UTF-16 strings, default-on-failure
//!           │
//! ForeignVec             begin/end/capacity vector ABI, capped element count
//! ```

mod error;
mod reader;
mod source;
mod vector;

pub use error::{MemoryError, Result};
pub use reader::{bytes_of, FromMemory, RemoteReader};
pub use source::{ImageSource, MemorySource, ProcessSource};
pub use vector::{ForeignVec, FOREIGN_VEC_CAP};
