use std::path::{Path, PathBuf};

use bsl_index::IndexRecovery;
use bsl_store::{ZstdCodec, DEFAULT_SHARD_SIZE};
use serde::{Deserialize, Serialize};

use crate::error::{SdkError, SdkResult};

/// When the index is written back to storage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistMode {
    /// After every `add` (safest; the index always reflects completed writes).
    #[default]
    EveryWrite,
    /// After every N-th `add`. Up to N-1 writes can be lost on a crash.
    EveryN(u32),
    /// Only on explicit `flush` or when the store is dropped.
    Manual,
}

/// Configuration for a [`BlobStore`](crate::BlobStore).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding the index record and shard directories.
    pub root: PathBuf,
    /// Number of slots. Ignored when an existing index is loaded.
    pub capacity: usize,
    /// Slots per shard directory.
    pub shard_size: usize,
    /// zstd level for documents and the index record.
    pub compression_level: i32,
    pub persist: PersistMode,
    pub index_recovery: IndexRecovery,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./blobstorelite_data/"),
            capacity: 10,
            shard_size: DEFAULT_SHARD_SIZE,
            compression_level: ZstdCodec::DEFAULT_LEVEL,
            persist: PersistMode::default(),
            index_recovery: IndexRecovery::default(),
        }
    }
}

impl StoreConfig {
    /// Default configuration rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_shard_size(mut self, shard_size: usize) -> Self {
        self.shard_size = shard_size;
        self
    }

    pub fn with_persist(mut self, persist: PersistMode) -> Self {
        self.persist = persist;
        self
    }

    pub fn with_index_recovery(mut self, recovery: IndexRecovery) -> Self {
        self.index_recovery = recovery;
        self
    }

    /// Parse a TOML document. Missing fields take their defaults.
    pub fn from_toml_str(s: &str) -> SdkResult<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML config file.
    pub fn from_file(path: &Path) -> SdkResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Reject configurations a store cannot be opened with.
    pub fn validate(&self) -> SdkResult<()> {
        if self.capacity == 0 {
            return Err(SdkError::InvalidConfig("capacity must be at least 1".into()));
        }
        if self.shard_size == 0 {
            return Err(SdkError::InvalidConfig("shard_size must be at least 1".into()));
        }
        if self.persist == PersistMode::EveryN(0) {
            return Err(SdkError::InvalidConfig("persist every_n must be at least 1".into()));
        }
        let levels = zstd::compression_level_range();
        if !levels.contains(&self.compression_level) {
            return Err(SdkError::InvalidConfig(format!(
                "compression_level {} outside {}..={}",
                self.compression_level,
                levels.start(),
                levels.end()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = StoreConfig::default();
        assert_eq!(c.root, PathBuf::from("./blobstorelite_data/"));
        assert_eq!(c.capacity, 10);
        assert_eq!(c.shard_size, 1000);
        assert_eq!(c.compression_level, 3);
        assert_eq!(c.persist, PersistMode::EveryWrite);
        assert_eq!(c.index_recovery, IndexRecovery::Reset);
        c.validate().unwrap();
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let err = StoreConfig::default().with_capacity(0).validate().unwrap_err();
        assert!(matches!(err, SdkError::InvalidConfig(_)));
    }

    #[test]
    fn zero_shard_size_is_rejected() {
        let err = StoreConfig::default().with_shard_size(0).validate().unwrap_err();
        assert!(matches!(err, SdkError::InvalidConfig(_)));
    }

    #[test]
    fn every_zero_is_rejected() {
        let err = StoreConfig::default()
            .with_persist(PersistMode::EveryN(0))
            .validate()
            .unwrap_err();
        assert!(matches!(err, SdkError::InvalidConfig(_)));
    }

    #[test]
    fn parse_toml() {
        let c = StoreConfig::from_toml_str(
            r#"
            root = "/var/lib/crawler"
            capacity = 10000
            persist = { every_n = 50 }
            index_recovery = "fail"
            "#,
        )
        .unwrap();
        assert_eq!(c.root, PathBuf::from("/var/lib/crawler"));
        assert_eq!(c.capacity, 10000);
        assert_eq!(c.shard_size, 1000);
        assert_eq!(c.persist, PersistMode::EveryN(50));
        assert_eq!(c.index_recovery, IndexRecovery::Fail);
    }

    #[test]
    fn parse_toml_rejects_invalid_values() {
        assert!(matches!(
            StoreConfig::from_toml_str("capacity = 0"),
            Err(SdkError::InvalidConfig(_))
        ));
        assert!(matches!(
            StoreConfig::from_toml_str("capacity = \"ten\""),
            Err(SdkError::Config(_))
        ));
    }

    #[test]
    fn from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bsl.toml");
        std::fs::write(&path, "capacity = 3\npersist = \"manual\"\n").unwrap();
        let c = StoreConfig::from_file(&path).unwrap();
        assert_eq!(c.capacity, 3);
        assert_eq!(c.persist, PersistMode::Manual);

        let missing = StoreConfig::from_file(&dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(SdkError::Io(_))));
    }
}
