//! BlobStoreLite: an embedded, fixed-capacity circular blob store.
//!
//! Documents are written to the next slot of a ring of `capacity` slots.
//! Once the ring is full every write overwrites the oldest document. Each
//! document carries opaque metadata and, optionally, a name that always
//! resolves to the most recent write bearing it.
//!
//! ```no_run
//! use bsl_sdk::{BlobStore, Key, StoreConfig};
//! use serde_json::json;
//!
//! let mut store = BlobStore::open(StoreConfig::new("./blobstorelite_data/"))?;
//! store.add(b"<html>...</html>", Some("front-page"), json!({ "marked": false }))?;
//!
//! let page = store.get(&Key::name("front-page"))?;
//! for doc in &store {
//!     let doc = doc?;
//!     println!("{} {:?}", doc.slot, doc.name);
//! }
//! # Ok::<(), bsl_sdk::SdkError>(())
//! ```
//!
//! A store is a plain owned value. It is not synchronized; share it across
//! threads behind a `Mutex`, and never open the same root from two processes.

pub mod config;
pub mod error;
pub mod store;

pub use config::{PersistMode, StoreConfig};
pub use error::{SdkError, SdkResult};
pub use store::{BlobStore, Document, Iter, Lookup};

// Re-export key types
pub use bsl_index::IndexRecovery;
pub use bsl_store::{BlobCodec, FsBackend, IdentityCodec, InMemoryBackend, StorageBackend, ZstdCodec};
pub use bsl_types::{Capacity, Key, Meta, ShardId, SlotId};
