use bsl_types::{ShardId, SlotId};

use crate::error::StoreResult;

/// Byte storage addressed by `(shard, slot)`, plus one index record.
///
/// All implementations must satisfy these invariants:
/// - `write` replaces whatever was previously stored at the address.
/// - `ensure_namespace` is idempotent and must succeed before the first
///   `write` into a shard.
/// - The backend never interprets the bytes it stores.
/// - All I/O errors are propagated, never silently ignored.
pub trait StorageBackend: Send + Sync {
    /// Create the namespace for `shard` if it does not exist yet.
    fn ensure_namespace(&self, shard: ShardId) -> StoreResult<()>;

    /// Store `bytes` at `(shard, slot)`, overwriting previous content.
    fn write(&self, shard: ShardId, slot: SlotId, bytes: &[u8]) -> StoreResult<()>;

    /// Read the bytes stored at `(shard, slot)`.
    ///
    /// Returns `Ok(None)` if nothing was ever written there.
    fn read(&self, shard: ShardId, slot: SlotId) -> StoreResult<Option<Vec<u8>>>;

    /// Read the persisted index record, if one exists.
    fn read_index(&self) -> StoreResult<Option<Vec<u8>>>;

    /// Replace the persisted index record.
    fn write_index(&self, bytes: &[u8]) -> StoreResult<()>;
}
