use bsl_types::SlotId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("store is empty")]
    EmptyStore,

    #[error("slot {slot} out of range: {occupied} slots occupied")]
    OutOfRange { slot: SlotId, occupied: usize },

    #[error("document at slot {slot} is corrupt: {reason}")]
    CorruptBlob { slot: SlotId, reason: String },

    #[error("document at slot {0} is indexed but missing from storage")]
    MissingBlob(SlotId),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("config parse error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store error: {0}")]
    Store(#[from] bsl_store::StoreError),

    #[error("index error: {0}")]
    Index(#[from] bsl_index::IndexError),
}

pub type SdkResult<T> = Result<T, SdkError>;
