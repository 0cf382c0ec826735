/// Errors from storage backend and codec operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A codec failed to encode or decode a document.
    #[error("codec error: {0}")]
    Codec(String),

    /// Shards must hold at least one slot.
    #[error("shard size must be at least 1")]
    InvalidShardSize,
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
