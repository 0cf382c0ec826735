//! Storage layer for BlobStoreLite.
//!
//! Documents live at a `(shard, slot)` address. Slots are grouped into shards
//! so that no single directory grows past a fixed number of files; a store
//! with 10 000 slots and the default shard size spreads them over ten
//! directories.
//!
//! # Storage Backends
//!
//! All backends implement the [`StorageBackend`] trait:
//!
//! - [`FsBackend`] -- one directory per shard under a root path
//! - [`InMemoryBackend`] -- `HashMap`-based backend for tests and embedding
//!
//! # Codecs
//!
//! Document bytes pass through a [`BlobCodec`] on the way to and from the
//! backend. [`ZstdCodec`] is the default; [`IdentityCodec`] stores bytes as-is.
//!
//! # Design Rules
//!
//! 1. A slot address is overwritten in place; there is no versioning.
//! 2. The backend never interprets document contents.
//! 3. All I/O errors are propagated, never retried.

pub mod codec;
pub mod error;
pub mod fs;
pub mod memory;
pub mod shard;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use codec::{BlobCodec, IdentityCodec, ZstdCodec};
pub use error::{StoreError, StoreResult};
pub use fs::FsBackend;
pub use memory::InMemoryBackend;
pub use shard::{ShardResolver, DEFAULT_SHARD_SIZE};
pub use traits::StorageBackend;
