use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Arc;

use bsl_index::{IndexCodec, SlotIndex, Traversal};
use bsl_store::{BlobCodec, FsBackend, ShardResolver, StorageBackend, StoreError, ZstdCodec};
use bsl_types::{Capacity, Key, Meta, SlotId};
use tracing::{debug, info, warn};

use crate::config::{PersistMode, StoreConfig};
use crate::error::{SdkError, SdkResult};

/// A document read back from the store.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub slot: SlotId,
    pub data: Vec<u8>,
    pub name: Option<String>,
    pub meta: Meta,
}

impl Document {
    /// The document as UTF-8 text, if it is valid UTF-8.
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.data).ok()
    }
}

/// Outcome of [`BlobStore::get`].
#[derive(Clone, Debug, PartialEq)]
pub enum Lookup {
    Found(Document),
    /// The name was never bound, or its slot has since been recycled.
    NotBound(String),
}

impl Lookup {
    pub fn found(self) -> Option<Document> {
        match self {
            Self::Found(doc) => Some(doc),
            Self::NotBound(_) => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// Fixed-capacity circular blob store.
pub struct BlobStore {
    config: StoreConfig,
    backend: Arc<dyn StorageBackend>,
    codec: Box<dyn BlobCodec>,
    index_codec: IndexCodec,
    shards: ShardResolver,
    index: SlotIndex,
    /// Writes not yet reflected in the persisted index.
    unsaved: u32,
}

impl BlobStore {
    /// Open (or create) a filesystem-backed store at `config.root`.
    pub fn open(config: StoreConfig) -> SdkResult<Self> {
        config.validate()?;
        let backend = FsBackend::open(&config.root)?;
        let codec = ZstdCodec::new(config.compression_level);
        Self::with_backend(config, Arc::new(backend), Box::new(codec))
    }

    /// Open a store over an arbitrary backend and blob codec.
    ///
    /// `config.root` is informational only; the backend decides where bytes
    /// live.
    pub fn with_backend(
        config: StoreConfig,
        backend: Arc<dyn StorageBackend>,
        codec: Box<dyn BlobCodec>,
    ) -> SdkResult<Self> {
        config.validate()?;
        let capacity =
            Capacity::new(config.capacity).map_err(|e| SdkError::InvalidConfig(e.to_string()))?;
        let shard_size =
            NonZeroUsize::new(config.shard_size).ok_or(StoreError::InvalidShardSize)?;
        let index_codec = IndexCodec::new(config.compression_level);

        let index = match bsl_index::load(backend.as_ref(), &index_codec, config.index_recovery)? {
            Some(index) => {
                if index.capacity() != capacity {
                    info!(
                        configured = capacity.get(),
                        persisted = index.capacity().get(),
                        "using persisted capacity"
                    );
                }
                if index.shard_size() != shard_size {
                    info!(
                        configured = shard_size.get(),
                        persisted = index.shard_size().get(),
                        "using persisted shard size"
                    );
                }
                index
            }
            None => SlotIndex::new(capacity).with_shard_size(shard_size),
        };
        let shards = ShardResolver::new(index.shard_size().get())?;

        info!(
            root = %config.root.display(),
            capacity = index.capacity().get(),
            occupied = index.occupied_count(),
            "blob store opened"
        );

        Ok(Self {
            config,
            backend,
            codec,
            index_codec,
            shards,
            index,
            unsaved: 0,
        })
    }

    // ---- Writes ----

    /// Write `document` to the next slot and return that slot.
    ///
    /// When the store is full this overwrites the oldest document. A
    /// non-empty `name` is rebound to the new slot. If the backend write
    /// fails after the index was updated, the in-memory index stays ahead of
    /// storage until the slot is written again.
    pub fn add(&mut self, document: &[u8], name: Option<&str>, meta: Meta) -> SdkResult<SlotId> {
        if document.is_empty() {
            return Err(SdkError::InvalidDocument("document is empty".into()));
        }
        let encoded = self.codec.encode(document)?;

        let slot = self.index.next_slot();
        self.index.record(slot, name, meta)?;

        let shard = self.shards.prepare(self.backend.as_ref(), slot)?;
        self.backend.write(shard, slot, &encoded)?;
        self.index.set_head(slot)?;
        debug!(%slot, %shard, len = document.len(), stored = encoded.len(), "document added");

        self.unsaved = self.unsaved.saturating_add(1);
        let due = match self.config.persist {
            PersistMode::EveryWrite => true,
            PersistMode::EveryN(n) => self.unsaved >= n,
            PersistMode::Manual => false,
        };
        if due {
            self.flush()?;
        }
        Ok(slot)
    }

    /// Persist the index now.
    pub fn flush(&mut self) -> SdkResult<()> {
        bsl_index::save(self.backend.as_ref(), &self.index_codec, &self.index)?;
        self.unsaved = 0;
        Ok(())
    }

    // ---- Reads ----

    /// Read the document addressed by `key`.
    ///
    /// An unknown name yields [`Lookup::NotBound`] rather than an error.
    pub fn get(&self, key: &Key) -> SdkResult<Lookup> {
        let slot = match key {
            Key::Latest => self.index.head().ok_or(SdkError::EmptyStore)?,
            Key::Slot(slot) => {
                let occupied = self.index.occupied_count();
                if slot.get() >= occupied {
                    return Err(SdkError::OutOfRange {
                        slot: *slot,
                        occupied,
                    });
                }
                *slot
            }
            Key::Name(name) => match self.index.lookup_by_name(name) {
                Some(slot) => slot,
                None => return Ok(Lookup::NotBound(name.clone())),
            },
        };
        self.read_slot(slot).map(Lookup::Found)
    }

    /// The most recently written document.
    pub fn latest(&self) -> SdkResult<Document> {
        let slot = self.index.head().ok_or(SdkError::EmptyStore)?;
        self.read_slot(slot)
    }

    /// Documents from newest to oldest.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            store: self,
            slots: self.index.traversal(),
        }
    }

    fn read_slot(&self, slot: SlotId) -> SdkResult<Document> {
        let entry = self.index.entry_at(slot)?;
        let shard = self.shards.shard_of(slot);
        let stored = self
            .backend
            .read(shard, slot)?
            .ok_or(SdkError::MissingBlob(slot))?;
        let data = self
            .codec
            .decode(&stored)
            .map_err(|e| SdkError::CorruptBlob {
                slot,
                reason: e.to_string(),
            })?;
        Ok(Document {
            slot,
            data,
            name: entry.name.clone(),
            meta: entry.meta.clone(),
        })
    }

    // ---- Accessors ----

    pub fn len(&self) -> usize {
        self.index.occupied_count()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn capacity(&self) -> Capacity {
        self.index.capacity()
    }

    pub fn head(&self) -> Option<SlotId> {
        self.index.head()
    }

    /// Current name bindings, sorted by name.
    pub fn names(&self) -> Vec<(String, SlotId)> {
        self.index
            .names()
            .map(|(name, slot)| (name.to_string(), slot))
            .collect()
    }

    pub fn root(&self) -> &Path {
        &self.config.root
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }
}

impl Drop for BlobStore {
    fn drop(&mut self) {
        if self.unsaved > 0 {
            if let Err(e) = self.flush() {
                warn!(error = %e, "failed to persist index on close");
            }
        }
    }
}

impl std::fmt::Debug for BlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobStore")
            .field("root", &self.config.root)
            .field("capacity", &self.index.capacity())
            .field("occupied", &self.index.occupied_count())
            .field("head", &self.index.head())
            .finish()
    }
}

/// Most-recent-first iterator over a store's documents.
pub struct Iter<'a> {
    store: &'a BlobStore,
    slots: Traversal,
}

impl Iterator for Iter<'_> {
    type Item = SdkResult<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.slots.next()?;
        Some(self.store.read_slot(slot))
    }
}

impl<'a> IntoIterator for &'a BlobStore {
    type Item = SdkResult<Document>;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
