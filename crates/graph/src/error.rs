use thiserror::Error;

pub type Result<T> = std::result::Result<T, SnapshotError>;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SnapshotError {
    /// The panel's backing data decoded to nothing usable this frame.
    /// Consumers fall back to a degraded frame; they do not retry.
    #[error("atlas panel data unavailable")]
    Unavailable,
}
