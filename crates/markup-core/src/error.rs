use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarkupError {
    #[error("Invalid overlay image: {0}")]
    InvalidImage(String),

    #[error("Snapshot capture failed: {0}")]
    SnapshotError(String),
}
