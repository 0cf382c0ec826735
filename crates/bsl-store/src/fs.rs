use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use bsl_types::{ShardId, SlotId};
use tracing::debug;

use crate::error::StoreResult;
use crate::traits::StorageBackend;

/// File name of the persisted index record under the store root.
pub const INDEX_FILE: &str = "lookup";

/// Filesystem storage backend.
///
/// On-disk layout:
/// ```text
/// <root>/lookup          persisted index record
/// <root>/<shard>/<slot>  encoded document bytes
/// ```
///
/// Documents are overwritten in place. The index record is replaced through
/// a temporary file and a rename, so a crash mid-write leaves the previous
/// record readable.
#[derive(Clone, Debug)]
pub struct FsBackend {
    root: PathBuf,
}

impl FsBackend {
    /// Open a backend rooted at `root`, creating the directory if needed.
    pub fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the documents of `shard`.
    pub fn shard_dir(&self, shard: ShardId) -> PathBuf {
        self.root.join(shard.to_string())
    }

    /// Full path of the document stored at `(shard, slot)`.
    pub fn document_path(&self, shard: ShardId, slot: SlotId) -> PathBuf {
        self.shard_dir(shard).join(slot.to_string())
    }

    pub fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_FILE)
    }
}

fn read_optional(path: &Path) -> StoreResult<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

impl StorageBackend for FsBackend {
    fn ensure_namespace(&self, shard: ShardId) -> StoreResult<()> {
        fs::create_dir_all(self.shard_dir(shard))?;
        Ok(())
    }

    fn write(&self, shard: ShardId, slot: SlotId, bytes: &[u8]) -> StoreResult<()> {
        let path = self.document_path(shard, slot);
        fs::write(&path, bytes)?;
        debug!(path = %path.display(), len = bytes.len(), "document written");
        Ok(())
    }

    fn read(&self, shard: ShardId, slot: SlotId) -> StoreResult<Option<Vec<u8>>> {
        read_optional(&self.document_path(shard, slot))
    }

    fn read_index(&self) -> StoreResult<Option<Vec<u8>>> {
        read_optional(&self.index_path())
    }

    fn write_index(&self, bytes: &[u8]) -> StoreResult<()> {
        let mut tmp = tempfile::NamedTempFile::new_in(&self.root)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.index_path()).map_err(|e| e.error)?;
        debug!(len = bytes.len(), "index record replaced");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;

    #[test]
    fn layout_matches_shard_and_slot() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FsBackend::open(dir.path()).unwrap();
        let shard = ShardId::new(1);
        let slot = SlotId::new(1042);

        backend.ensure_namespace(shard).unwrap();
        backend.write(shard, slot, b"payload").unwrap();

        let expected = dir.path().join("1").join("1042");
        assert_eq!(backend.document_path(shard, slot), expected);
        assert_eq!(fs::read(expected).unwrap(), b"payload");
    }

    #[test]
    fn open_creates_nested_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("a").join("b");
        let backend = FsBackend::open(&root).unwrap();
        assert!(root.is_dir());
        assert_eq!(backend.root(), root.as_path());
    }

    #[test]
    fn read_missing_document_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FsBackend::open(dir.path()).unwrap();
        let got = backend.read(ShardId::new(0), SlotId::new(5)).unwrap();
        assert!(got.is_none());
        assert!(backend.read_index().unwrap().is_none());
    }

    #[test]
    fn write_without_namespace_fails() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FsBackend::open(dir.path()).unwrap();
        let err = backend
            .write(ShardId::new(3), SlotId::new(3000), b"x")
            .unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
    }

    #[test]
    fn ensure_namespace_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FsBackend::open(dir.path()).unwrap();
        backend.ensure_namespace(ShardId::new(0)).unwrap();
        backend.ensure_namespace(ShardId::new(0)).unwrap();
        assert!(dir.path().join("0").is_dir());
    }

    #[test]
    fn index_record_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FsBackend::open(dir.path()).unwrap();
        backend.write_index(b"first").unwrap();
        backend.write_index(b"second").unwrap();
        assert_eq!(backend.read_index().unwrap().unwrap(), b"second");
        assert!(dir.path().join(INDEX_FILE).is_file());

        // Only the record itself remains; the temporary file was renamed.
        let entries = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn document_overwrite_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FsBackend::open(dir.path()).unwrap();
        let shard = ShardId::new(0);
        backend.ensure_namespace(shard).unwrap();
        backend.write(shard, SlotId::new(0), b"longer original").unwrap();
        backend.write(shard, SlotId::new(0), b"short").unwrap();
        let got = backend.read(shard, SlotId::new(0)).unwrap().unwrap();
        assert_eq!(got, b"short");
    }
}
