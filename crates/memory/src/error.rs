use thiserror::Error;

pub type Result<T> = std::result::Result<T, MemoryError>;

#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("failed to attach to pid {pid}: {reason}")]
    Attach { pid: u32, reason: String },

    #[error("read of {len} bytes at {address:#x} failed: {reason}")]
    ReadFailed {
        address: u64,
        len: usize,
        reason: String,
    },

    #[error("range {address:#x}+{len:#x} is outside the image")]
    OutOfImage { address: u64, len: usize },
}
