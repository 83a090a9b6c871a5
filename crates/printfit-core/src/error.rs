use thiserror::Error;

#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("Failed to parse PDF: {0}")]
    ParseError(String),

    #[error("PDF operation failed: {0}")]
    OperationError(String),

    #[error("Print view blocked by host: {0}")]
    PrintBlocked(String),

    #[error("Save failed: {0}")]
    SaveFailed(String),
}
