use thiserror::Error;

/// Errors produced when constructing or parsing foundation types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("capacity must be at least 1")]
    ZeroCapacity,

    #[error("invalid key: {0:?}")]
    InvalidKey(String),
}
