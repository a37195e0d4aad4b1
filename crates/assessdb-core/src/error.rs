use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Index not found: {0}")]
    IndexNotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Ground truth is empty; recall and MRR are undefined")]
    EmptyGroundTruth,

    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Operation failed: {0}")]
    Operation(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// True when `err` (or anything it wraps) is an [`Error::IndexNotFound`].
pub fn is_index_not_found(err: &anyhow::Error) -> bool {
    err.chain()
        .any(|cause| matches!(cause.downcast_ref::<Error>(), Some(Error::IndexNotFound(_))))
}
