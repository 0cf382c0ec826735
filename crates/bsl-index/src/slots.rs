//! The in-memory slot index.
//!
//! [`SlotIndex`] holds one [`SlotEntry`] per occupied slot, in slot order,
//! and a map from name to slot. Between operations it guarantees:
//!
//! - at most `capacity` entries are occupied;
//! - the head, when set, is an occupied slot;
//! - every name in the map resolves to the slot whose entry carries it;
//! - every named entry is reachable through the map.

use std::collections::BTreeMap;
use std::num::NonZeroUsize;

use bsl_store::DEFAULT_SHARD_SIZE;
use bsl_types::{Capacity, Meta, SlotId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{IndexError, IndexResult};
use crate::ring::{self, Traversal};

/// Name and metadata recorded for one slot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlotEntry {
    pub name: Option<String>,
    pub meta: Meta,
}

/// Occupancy, aliases and head position of a circular buffer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlotIndex {
    capacity: Capacity,
    /// Slots per shard the documents were laid out with.
    #[serde(default = "default_shard_size")]
    shard_size: NonZeroUsize,
    head: Option<SlotId>,
    entries: Vec<SlotEntry>,
    names: BTreeMap<String, SlotId>,
}

fn default_shard_size() -> NonZeroUsize {
    NonZeroUsize::new(DEFAULT_SHARD_SIZE).unwrap_or(NonZeroUsize::MIN)
}

impl SlotIndex {
    /// An empty index for a buffer of `capacity` slots.
    pub fn new(capacity: Capacity) -> Self {
        Self {
            capacity,
            shard_size: default_shard_size(),
            head: None,
            entries: Vec::new(),
            names: BTreeMap::new(),
        }
    }

    pub fn with_shard_size(mut self, shard_size: NonZeroUsize) -> Self {
        self.shard_size = shard_size;
        self
    }

    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    pub fn shard_size(&self) -> NonZeroUsize {
        self.shard_size
    }

    /// Slot of the most recent completed write.
    pub fn head(&self) -> Option<SlotId> {
        self.head
    }

    pub fn occupied_count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` once every slot has been written at least once.
    pub fn is_full(&self) -> bool {
        self.entries.len() == self.capacity.get()
    }

    /// Slot the next write will land on.
    pub fn next_slot(&self) -> SlotId {
        ring::next_slot(self.head, self.capacity)
    }

    /// Record `name` and `meta` at `slot`.
    ///
    /// `slot` must be occupied (it is recycled) or equal to the occupied
    /// count (a fresh slot). If the slot previously carried a name, that
    /// alias is dropped and returned. A non-empty `name` is moved here from
    /// whichever slot held it before; that slot keeps its metadata but
    /// becomes anonymous.
    pub fn record(
        &mut self,
        slot: SlotId,
        name: Option<&str>,
        meta: Meta,
    ) -> IndexResult<Option<String>> {
        let occupied = self.entries.len();
        let index = slot.get();
        if index > occupied || !self.capacity.contains(slot) {
            return Err(IndexError::SlotOutOfRange {
                slot,
                occupied,
                capacity: self.capacity.get(),
            });
        }

        let name = name.filter(|n| !n.is_empty()).map(str::to_owned);

        let mut evicted = None;
        if index < occupied {
            if let Some(old) = self.entries[index].name.take() {
                self.names.remove(&old);
                evicted = Some(old);
            }
        }

        let entry = SlotEntry {
            name: name.clone(),
            meta,
        };
        if index == occupied {
            self.entries.push(entry);
        } else {
            self.entries[index] = entry;
        }

        if let Some(name) = name {
            if let Some(previous) = self.names.insert(name.clone(), slot) {
                if previous != slot {
                    self.entries[previous.get()].name = None;
                    debug!(%name, from = %previous, to = %slot, "alias moved");
                }
            }
            if evicted.as_deref() == Some(name.as_str()) {
                evicted = None;
            }
        }

        if let Some(old) = &evicted {
            debug!(name = %old, %slot, "alias evicted by recycled slot");
        }
        Ok(evicted)
    }

    /// Mark `slot` as the most recent completed write.
    pub fn set_head(&mut self, slot: SlotId) -> IndexResult<()> {
        self.entry_at(slot)?;
        self.head = Some(slot);
        Ok(())
    }

    pub fn lookup_by_name(&self, name: &str) -> Option<SlotId> {
        self.names.get(name).copied()
    }

    /// Entry stored at `slot`, if the slot is occupied.
    pub fn entry_at(&self, slot: SlotId) -> IndexResult<&SlotEntry> {
        self.entries.get(slot.get()).ok_or(IndexError::NotFound {
            slot,
            occupied: self.entries.len(),
        })
    }

    /// Current aliases, sorted by name.
    pub fn names(&self) -> impl Iterator<Item = (&str, SlotId)> {
        self.names.iter().map(|(name, slot)| (name.as_str(), *slot))
    }

    /// Occupied slots, most recent first.
    pub fn traversal(&self) -> Traversal {
        Traversal::new(self.head, self.entries.len(), self.capacity)
    }

    /// Verify the structural invariants, reporting the first violation.
    pub fn check_invariants(&self) -> IndexResult<()> {
        let occupied = self.entries.len();
        if occupied > self.capacity.get() {
            return Err(IndexError::Corrupt(format!(
                "{occupied} entries exceed capacity {}",
                self.capacity
            )));
        }
        match self.head {
            Some(head) if head.get() >= occupied => {
                return Err(IndexError::Corrupt(format!(
                    "head {head} outside {occupied} occupied slots"
                )));
            }
            None if occupied > 0 => {
                return Err(IndexError::Corrupt(format!(
                    "{occupied} entries but no head"
                )));
            }
            _ => {}
        }
        for (name, slot) in &self.names {
            let carried = self
                .entries
                .get(slot.get())
                .and_then(|entry| entry.name.as_deref());
            if carried != Some(name.as_str()) {
                return Err(IndexError::Corrupt(format!(
                    "name {name:?} maps to slot {slot} which does not carry it"
                )));
            }
        }
        for (index, entry) in self.entries.iter().enumerate() {
            if let Some(name) = &entry.name {
                if self.lookup_by_name(name) != Some(SlotId::new(index)) {
                    return Err(IndexError::Corrupt(format!(
                        "slot {index} carries name {name:?} missing from the name map"
                    )));
                }
            }
        }
        Ok(())
    }
}
