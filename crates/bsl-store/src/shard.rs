use std::num::NonZeroUsize;

use bsl_types::{ShardId, SlotId};
use tracing::trace;

use crate::error::{StoreError, StoreResult};
use crate::traits::StorageBackend;

/// Slots per shard unless configured otherwise.
pub const DEFAULT_SHARD_SIZE: usize = 1000;

/// Maps slots to shards and makes sure a shard exists before it is written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShardResolver {
    shard_size: NonZeroUsize,
}

impl ShardResolver {
    pub fn new(shard_size: usize) -> StoreResult<Self> {
        let shard_size = NonZeroUsize::new(shard_size).ok_or(StoreError::InvalidShardSize)?;
        Ok(Self { shard_size })
    }

    pub fn shard_size(&self) -> usize {
        self.shard_size.get()
    }

    /// `floor(slot / shard_size)`.
    pub fn shard_of(&self, slot: SlotId) -> ShardId {
        slot.shard(self.shard_size)
    }

    /// Idempotently create the namespace for `shard`.
    pub fn ensure_shard(&self, backend: &dyn StorageBackend, shard: ShardId) -> StoreResult<()> {
        trace!(%shard, "ensuring shard namespace");
        backend.ensure_namespace(shard)
    }

    /// Resolve the shard for `slot` and ensure it exists.
    pub fn prepare(&self, backend: &dyn StorageBackend, slot: SlotId) -> StoreResult<ShardId> {
        let shard = self.shard_of(slot);
        self.ensure_shard(backend, shard)?;
        Ok(shard)
    }
}

impl Default for ShardResolver {
    fn default() -> Self {
        Self {
            shard_size: NonZeroUsize::new(DEFAULT_SHARD_SIZE).expect("default shard size is non-zero"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryBackend;

    #[test]
    fn zero_shard_size_is_rejected() {
        assert!(matches!(
            ShardResolver::new(0),
            Err(StoreError::InvalidShardSize)
        ));
    }

    #[test]
    fn default_groups_by_thousand() {
        let resolver = ShardResolver::default();
        assert_eq!(resolver.shard_size(), 1000);
        assert_eq!(resolver.shard_of(SlotId::new(999)), ShardId::new(0));
        assert_eq!(resolver.shard_of(SlotId::new(1000)), ShardId::new(1));
    }

    #[test]
    fn prepare_creates_namespace_once() {
        let backend = InMemoryBackend::new();
        let resolver = ShardResolver::new(2).unwrap();

        assert_eq!(resolver.prepare(&backend, SlotId::new(0)).unwrap(), ShardId::new(0));
        assert_eq!(resolver.prepare(&backend, SlotId::new(1)).unwrap(), ShardId::new(0));
        assert_eq!(resolver.prepare(&backend, SlotId::new(5)).unwrap(), ShardId::new(2));

        assert_eq!(backend.namespaces(), vec![ShardId::new(0), ShardId::new(2)]);
    }
}
