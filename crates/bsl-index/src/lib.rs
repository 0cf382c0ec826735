//! Slot index for BlobStoreLite.
//!
//! Tracks which slots of the circular buffer are occupied, the metadata and
//! optional name attached to each, and where the head of the buffer is. All
//! operations are in-memory; document bytes never pass through this crate.
//!
//! # Key Types
//!
//! - [`SlotIndex`] -- Ordered slot entries plus the name-to-slot map
//! - [`SlotEntry`] -- Name and metadata recorded for one slot
//! - [`Traversal`] -- Most-recent-first walk over occupied slots
//! - [`IndexCodec`] -- Framed, checksummed encoding of a [`SlotIndex`]
//! - [`IndexRecovery`] -- What loading does with an unreadable record

pub mod error;
pub mod persist;
pub mod ring;
pub mod slots;

pub use error::{IndexError, IndexResult};
pub use persist::{load, save, IndexCodec, IndexRecovery};
pub use ring::{advance, next_slot, retreat, Traversal};
pub use slots::{SlotEntry, SlotIndex};
