//! Foundation types for BlobStoreLite.
//!
//! This crate provides the identifiers and small value types shared by every
//! other `bsl-*` crate.
//!
//! # Key Types
//!
//! - [`SlotId`]: Position in the circular buffer (`0..capacity`)
//! - [`ShardId`]: Storage namespace grouping a contiguous range of slots
//! - [`Capacity`]: Non-zero slot count, fixed for the life of a store
//! - [`Key`]: How a caller addresses a document: latest, by slot, or by name
//! - [`Meta`]: Opaque caller-supplied metadata, stored verbatim

pub mod error;
pub mod key;
pub mod slot;

pub use error::TypeError;
pub use key::Key;
pub use slot::{Capacity, ShardId, SlotId};

/// Caller-supplied metadata attached to a slot.
///
/// The store never interprets it; any JSON value round-trips unchanged.
pub type Meta = serde_json::Value;
