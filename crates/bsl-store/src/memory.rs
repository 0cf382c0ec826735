use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use bsl_types::{ShardId, SlotId};

use crate::error::{StoreError, StoreResult};
use crate::traits::StorageBackend;

/// In-memory, HashMap-based storage backend.
///
/// Intended for tests and embedding. Behaves like the filesystem backend:
/// writing into a shard whose namespace was never ensured fails with
/// `NotFound`. Write failures can also be injected to exercise error paths.
pub struct InMemoryBackend {
    namespaces: RwLock<HashSet<ShardId>>,
    documents: RwLock<HashMap<(ShardId, SlotId), Vec<u8>>>,
    index: RwLock<Option<Vec<u8>>>,
    fail_writes: AtomicBool,
}

impl InMemoryBackend {
    /// Create a new empty backend.
    pub fn new() -> Self {
        Self {
            namespaces: RwLock::new(HashSet::new()),
            documents: RwLock::new(HashMap::new()),
            index: RwLock::new(None),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Number of documents currently stored.
    pub fn len(&self) -> usize {
        self.documents.read().expect("lock poisoned").len()
    }

    /// Returns `true` if no documents are stored.
    pub fn is_empty(&self) -> bool {
        self.documents.read().expect("lock poisoned").is_empty()
    }

    /// Sorted list of shards whose namespace has been created.
    pub fn namespaces(&self) -> Vec<ShardId> {
        let set = self.namespaces.read().expect("lock poisoned");
        let mut shards: Vec<ShardId> = set.iter().copied().collect();
        shards.sort();
        shards
    }

    /// Make every subsequent document or index write fail with an I/O error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Io(io::Error::other("injected write failure")));
        }
        Ok(())
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageBackend for InMemoryBackend {
    fn ensure_namespace(&self, shard: ShardId) -> StoreResult<()> {
        self.namespaces.write().expect("lock poisoned").insert(shard);
        Ok(())
    }

    fn write(&self, shard: ShardId, slot: SlotId, bytes: &[u8]) -> StoreResult<()> {
        self.check_writable()?;
        if !self.namespaces.read().expect("lock poisoned").contains(&shard) {
            return Err(StoreError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("shard {shard} does not exist"),
            )));
        }
        let mut map = self.documents.write().expect("lock poisoned");
        map.insert((shard, slot), bytes.to_vec());
        Ok(())
    }

    fn read(&self, shard: ShardId, slot: SlotId) -> StoreResult<Option<Vec<u8>>> {
        let map = self.documents.read().expect("lock poisoned");
        Ok(map.get(&(shard, slot)).cloned())
    }

    fn read_index(&self) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.index.read().expect("lock poisoned").clone())
    }

    fn write_index(&self, bytes: &[u8]) -> StoreResult<()> {
        self.check_writable()?;
        *self.index.write().expect("lock poisoned") = Some(bytes.to_vec());
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBackend")
            .field("document_count", &self.len())
            .field("namespace_count", &self.namespaces().len())
            .finish()
    }
}
