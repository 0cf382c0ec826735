//! Circular slot arithmetic.

use bsl_types::{Capacity, SlotId};

/// `(slot + 1) mod capacity`.
pub fn advance(slot: SlotId, capacity: Capacity) -> SlotId {
    SlotId::new((slot.get() + 1) % capacity.get())
}

/// `(slot - 1) mod capacity`, wrapping from 0 to `capacity - 1`.
pub fn retreat(slot: SlotId, capacity: Capacity) -> SlotId {
    let cap = capacity.get();
    SlotId::new((slot.get() % cap + cap - 1) % cap)
}

/// Slot the next write lands on. An empty store writes to slot 0.
pub fn next_slot(head: Option<SlotId>, capacity: Capacity) -> SlotId {
    match head {
        Some(slot) => advance(slot, capacity),
        None => SlotId::new(0),
    }
}

/// Most-recent-first walk over the occupied slots of a buffer.
///
/// Starts at the head and retreats. Stops after a full lap, or after slot 0
/// when the buffer has not yet wrapped.
#[derive(Clone, Debug)]
pub struct Traversal {
    cursor: Option<SlotId>,
    head: SlotId,
    capacity: Capacity,
    wrapped: bool,
}

impl Traversal {
    pub fn new(head: Option<SlotId>, occupied: usize, capacity: Capacity) -> Self {
        Self {
            cursor: head,
            head: head.unwrap_or(SlotId::new(0)),
            capacity,
            wrapped: occupied >= capacity.get(),
        }
    }
}

impl Iterator for Traversal {
    type Item = SlotId;

    fn next(&mut self) -> Option<SlotId> {
        let current = self.cursor?;
        let following = retreat(current, self.capacity);
        let lap_done = following == self.head;
        let reached_start = !self.wrapped && current.get() == 0;
        self.cursor = if lap_done || reached_start {
            None
        } else {
            Some(following)
        };
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cap(n: usize) -> Capacity {
        Capacity::new(n).unwrap()
    }

    fn slots(t: Traversal) -> Vec<usize> {
        t.map(SlotId::get).collect()
    }

    #[test]
    fn advance_wraps() {
        assert_eq!(advance(SlotId::new(0), cap(3)), SlotId::new(1));
        assert_eq!(advance(SlotId::new(2), cap(3)), SlotId::new(0));
    }

    #[test]
    fn retreat_never_goes_negative() {
        assert_eq!(retreat(SlotId::new(0), cap(3)), SlotId::new(2));
        assert_eq!(retreat(SlotId::new(2), cap(3)), SlotId::new(1));
        assert_eq!(retreat(SlotId::new(0), cap(1)), SlotId::new(0));
    }

    #[test]
    fn first_write_lands_on_zero() {
        assert_eq!(next_slot(None, cap(10)), SlotId::new(0));
        assert_eq!(next_slot(Some(SlotId::new(9)), cap(10)), SlotId::new(0));
        assert_eq!(next_slot(Some(SlotId::new(4)), cap(10)), SlotId::new(5));
    }

    #[test]
    fn empty_traversal_yields_nothing() {
        assert!(slots(Traversal::new(None, 0, cap(3))).is_empty());
    }

    #[test]
    fn partial_buffer_stops_at_zero() {
        assert_eq!(slots(Traversal::new(Some(SlotId::new(2)), 3, cap(5))), vec![2, 1, 0]);
        assert_eq!(slots(Traversal::new(Some(SlotId::new(0)), 1, cap(5))), vec![0]);
    }

    #[test]
    fn full_buffer_walks_one_lap() {
        assert_eq!(slots(Traversal::new(Some(SlotId::new(0)), 3, cap(3))), vec![0, 2, 1]);
        assert_eq!(slots(Traversal::new(Some(SlotId::new(2)), 3, cap(3))), vec![2, 1, 0]);
    }

    #[test]
    fn capacity_one_yields_single_slot() {
        assert_eq!(slots(Traversal::new(Some(SlotId::new(0)), 1, cap(1))), vec![0]);
    }

    proptest::proptest! {
        #[test]
        fn traversal_length_matches_occupancy(capacity in 1usize..50, writes in 1usize..200) {
            let c = cap(capacity);
            let mut head = None;
            for _ in 0..writes {
                head = Some(next_slot(head, c));
            }
            let occupied = writes.min(capacity);
            let walked: Vec<usize> = slots(Traversal::new(head, occupied, c));
            proptest::prop_assert_eq!(walked.len(), occupied);
            proptest::prop_assert_eq!(walked[0], head.unwrap().get());
        }

        #[test]
        fn retreat_undoes_advance(capacity in 1usize..1000, slot in 0usize..1000) {
            let c = cap(capacity);
            let s = SlotId::new(slot % capacity);
            proptest::prop_assert_eq!(retreat(advance(s, c), c), s);
        }
    }
}
