//! Error types for the index crate.

use bsl_types::SlotId;

/// Errors that can occur during index operations.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// The slot is not occupied.
    #[error("slot {slot} is not occupied ({occupied} occupied)")]
    NotFound { slot: SlotId, occupied: usize },

    /// A write targeted a slot that is neither occupied nor the next fresh one.
    #[error("slot {slot} cannot be recorded: {occupied} occupied, capacity {capacity}")]
    SlotOutOfRange {
        slot: SlotId,
        occupied: usize,
        capacity: usize,
    },

    /// The persisted index record is unreadable or inconsistent.
    #[error("corrupt index: {0}")]
    Corrupt(String),

    /// Serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Backend operation failed.
    #[error("store error: {0}")]
    Store(#[from] bsl_store::StoreError),
}

/// Convenience alias for index results.
pub type IndexResult<T> = Result<T, IndexError>;
