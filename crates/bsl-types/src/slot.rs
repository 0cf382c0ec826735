use std::fmt;
use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Position of a document in the circular buffer.
///
/// Valid slot ids for a store lie in `0..capacity`. A `SlotId` carries no
/// knowledge of the store it belongs to; range checks happen in the index.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotId(usize);

impl SlotId {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// The raw buffer position.
    pub const fn get(self) -> usize {
        self.0
    }

    /// Shard holding this slot when every shard spans `shard_size` slots.
    ///
    /// `shard_size` must be non-zero; callers validate it at construction.
    pub fn shard(self, shard_size: NonZeroUsize) -> ShardId {
        ShardId(self.0 / shard_size.get())
    }
}

impl fmt::Debug for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SlotId({})", self.0)
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for SlotId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

/// Storage namespace (a directory on the filesystem backend).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShardId(usize);

impl ShardId {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for ShardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Total slot count of a store. Always at least one.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct Capacity(NonZeroUsize);

impl Capacity {
    pub fn new(slots: usize) -> Result<Self, TypeError> {
        NonZeroUsize::new(slots)
            .map(Self)
            .ok_or(TypeError::ZeroCapacity)
    }

    pub const fn get(self) -> usize {
        self.0.get()
    }

    /// Returns `true` if `slot` lies inside `0..capacity`.
    pub const fn contains(self, slot: SlotId) -> bool {
        slot.0 < self.0.get()
    }
}

impl TryFrom<usize> for Capacity {
    type Error = TypeError;

    fn try_from(slots: usize) -> Result<Self, Self::Error> {
        Self::new(slots)
    }
}

impl From<Capacity> for usize {
    fn from(capacity: Capacity) -> Self {
        capacity.get()
    }
}

impl fmt::Debug for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Capacity({})", self.0)
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
