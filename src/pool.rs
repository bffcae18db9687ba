//! Fixed-capacity object pool.
//!
//! Every entity kind lives in one of these: a slot array allocated once at
//! startup, an `enabled` flag per slot, and a doubly linked list threading
//! the enabled slots in spawn order. Free slots are found by a linear scan,
//! active slots are unlinked in O(1).

use tracing::debug;

use crate::error::SimError;

/// Index of a slot inside its pool. Stays valid until the slot is released.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(usize);

impl SlotId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Debug)]
struct Slot<T> {
    enabled: bool,
    prev: Option<usize>,
    next: Option<usize>,
    item: T,
}

#[derive(Clone, Debug)]
pub struct Pool<T> {
    label: &'static str,
    slots: Vec<Slot<T>>,
    head: Option<usize>,
    tail: Option<usize>,
    count: usize,
}

impl<T: Default> Pool<T> {
    /// Allocate `capacity` free slots. The pool never grows afterwards.
    pub fn with_capacity(label: &'static str, capacity: usize) -> Self {
        let slots = (0..capacity)
            .map(|_| Slot {
                enabled: false,
                prev: None,
                next: None,
                item: T::default(),
            })
            .collect();
        Self {
            label,
            slots,
            head: None,
            tail: None,
            count: 0,
        }
    }
}

impl<T> Pool<T> {
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of active slots.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_full(&self) -> bool {
        self.count == self.slots.len()
    }

    /// Claim the first free slot, store `item` in it and append it to the
    /// tail of the active list. Returns `None` when every slot is taken; in
    /// that case nothing in the pool changes.
    pub fn acquire(&mut self, item: T) -> Option<SlotId> {
        let Some(index) = self.slots.iter().position(|s| !s.enabled) else {
            debug!(pool = self.label, capacity = self.slots.len(), "no free slot");
            return None;
        };

        let slot = &mut self.slots[index];
        slot.enabled = true;
        slot.item = item;
        slot.next = None;
        slot.prev = self.tail;

        match self.tail {
            Some(tail) => self.slots[tail].next = Some(index),
            None => self.head = Some(index),
        }
        self.tail = Some(index);
        self.count += 1;
        Some(SlotId(index))
    }

    /// Return a slot to the free state. Releasing an already free slot is a
    /// no-op and returns `false`.
    pub fn release(&mut self, id: SlotId) -> bool {
        let index = id.0;
        match self.slots.get(index) {
            Some(slot) if slot.enabled => {}
            _ => return false,
        }

        let (prev, next) = {
            let slot = &mut self.slots[index];
            slot.enabled = false;
            (slot.prev.take(), slot.next.take())
        };

        match prev {
            Some(p) => self.slots[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.slots[n].prev = prev,
            None => self.tail = prev,
        }
        self.count -= 1;
        true
    }

    pub fn is_enabled(&self, id: SlotId) -> bool {
        self.slots.get(id.0).is_some_and(|s| s.enabled)
    }

    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.slots
            .get(id.0)
            .filter(|s| s.enabled)
            .map(|s| &s.item)
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.slots
            .get_mut(id.0)
            .filter(|s| s.enabled)
            .map(|s| &mut s.item)
    }

    // ── Cursor walk ───────────────────────────────────────────────────────────
    //
    // Callers that may release the current slot must fetch `next_of` first:
    //
    //     let mut cursor = pool.first();
    //     while let Some(id) = cursor {
    //         cursor = pool.next_of(id);
    //         ...
    //     }

    pub fn first(&self) -> Option<SlotId> {
        self.head.map(SlotId)
    }

    pub fn last(&self) -> Option<SlotId> {
        self.tail.map(SlotId)
    }

    pub fn next_of(&self, id: SlotId) -> Option<SlotId> {
        self.slots
            .get(id.0)
            .filter(|s| s.enabled)
            .and_then(|s| s.next)
            .map(SlotId)
    }

    pub fn prev_of(&self, id: SlotId) -> Option<SlotId> {
        self.slots
            .get(id.0)
            .filter(|s| s.enabled)
            .and_then(|s| s.prev)
            .map(SlotId)
    }

    /// Active slots in list order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            pool: self,
            cursor: self.head,
            remaining: self.count,
        }
    }

    /// Snapshot of the active ids, for passes that spawn into the same pool.
    pub fn ids(&self) -> Vec<SlotId> {
        self.iter().map(|(id, _)| id).collect()
    }

    // ── Consistency ───────────────────────────────────────────────────────────

    /// Walk the list both ways and compare against the count and the
    /// `enabled` flags. O(capacity).
    pub fn check_consistency(&self) -> Result<(), SimError> {
        let walked_forward = self.walk(self.head, |s| s.next)?;
        if walked_forward != self.count {
            return Err(SimError::ListCorrupted {
                pool: self.label,
                expected: self.count,
                walked: walked_forward,
            });
        }
        let walked_backward = self.walk(self.tail, |s| s.prev)?;
        if walked_backward != self.count {
            return Err(SimError::ListCorrupted {
                pool: self.label,
                expected: self.count,
                walked: walked_backward,
            });
        }
        let enabled = self.slots.iter().filter(|s| s.enabled).count();
        if enabled != self.count {
            return Err(SimError::ListCorrupted {
                pool: self.label,
                expected: self.count,
                walked: enabled,
            });
        }
        Ok(())
    }

    fn walk(
        &self,
        start: Option<usize>,
        step: impl Fn(&Slot<T>) -> Option<usize>,
    ) -> Result<usize, SimError> {
        let mut walked = 0;
        let mut cursor = start;
        while let Some(index) = cursor {
            let slot = &self.slots[index];
            if !slot.enabled {
                return Err(SimError::SlotState {
                    pool: self.label,
                    slot: index,
                });
            }
            walked += 1;
            // A cycle would walk forever; more steps than slots means one.
            if walked > self.slots.len() {
                break;
            }
            cursor = step(slot);
        }
        Ok(walked)
    }

    /// Debug builds only: panic on a corrupted active list.
    pub fn debug_validate(&self) {
        #[cfg(debug_assertions)]
        if let Err(err) = self.check_consistency() {
            panic!("{err}");
        }
    }
}

pub struct Iter<'a, T> {
    pool: &'a Pool<T>,
    cursor: Option<usize>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (SlotId, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let index = self.cursor?;
        let slot = &self.pool.slots[index];
        self.cursor = slot.next;
        self.remaining -= 1;
        Some((SlotId(index), &slot.item))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn backward(pool: &Pool<u32>) -> Vec<SlotId> {
        let mut out = Vec::new();
        let mut cursor = pool.last();
        while let Some(id) = cursor {
            out.push(id);
            cursor = pool.prev_of(id);
        }
        out
    }

    #[test]
    fn acquire_appends_in_order() {
        let mut pool: Pool<u32> = Pool::with_capacity("test", 4);
        let a = pool.acquire(1).unwrap();
        let b = pool.acquire(2).unwrap();
        let c = pool.acquire(3).unwrap();
        assert_eq!(pool.ids(), vec![a, b, c]);
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.first(), Some(a));
        assert_eq!(pool.last(), Some(c));
    }

    #[test]
    fn exhausted_pool_returns_none_and_leaves_slots_alone() {
        let mut pool: Pool<u32> = Pool::with_capacity("test", 3);
        for v in 0..3 {
            pool.acquire(v).unwrap();
        }
        let before: Vec<(SlotId, u32)> = pool.iter().map(|(id, v)| (id, *v)).collect();
        assert!(pool.acquire(99).is_none());
        let after: Vec<(SlotId, u32)> = pool.iter().map(|(id, v)| (id, *v)).collect();
        assert_eq!(before, after);
        assert!(pool.is_full());
        pool.check_consistency().unwrap();
    }

    #[test]
    fn release_head_middle_and_tail() {
        let mut pool: Pool<u32> = Pool::with_capacity("test", 5);
        let ids: Vec<SlotId> = (0..5).map(|v| pool.acquire(v).unwrap()).collect();

        assert!(pool.release(ids[2]));
        assert_eq!(pool.ids(), vec![ids[0], ids[1], ids[3], ids[4]]);
        assert!(pool.release(ids[0]));
        assert_eq!(pool.first(), Some(ids[1]));
        assert!(pool.release(ids[4]));
        assert_eq!(pool.last(), Some(ids[3]));
        assert_eq!(pool.ids(), vec![ids[1], ids[3]]);
        assert_eq!(backward(&pool), vec![ids[3], ids[1]]);
        pool.check_consistency().unwrap();
    }

    #[test]
    fn double_release_is_a_no_op() {
        let mut pool: Pool<u32> = Pool::with_capacity("test", 2);
        let a = pool.acquire(7).unwrap();
        assert!(pool.release(a));
        assert!(!pool.release(a));
        assert_eq!(pool.len(), 0);
        assert!(pool.get(a).is_none());
    }

    #[test]
    fn released_slot_is_reused_by_first_free_scan() {
        let mut pool: Pool<u32> = Pool::with_capacity("test", 3);
        let a = pool.acquire(1).unwrap();
        let b = pool.acquire(2).unwrap();
        pool.release(a);
        let c = pool.acquire(3).unwrap();
        assert_eq!(c, a, "lowest free index is claimed first");
        // Reused slot goes to the tail, not back to its old position.
        assert_eq!(pool.ids(), vec![b, c]);
        assert_eq!(pool.get(c), Some(&3));
    }

    #[test]
    fn cursor_walk_survives_release_of_current() {
        let mut pool: Pool<u32> = Pool::with_capacity("test", 6);
        for v in 0..6 {
            pool.acquire(v).unwrap();
        }
        let mut cursor = pool.first();
        while let Some(id) = cursor {
            cursor = pool.next_of(id);
            if pool.get(id).is_some_and(|v| v % 2 == 0) {
                pool.release(id);
            }
        }
        let left: Vec<u32> = pool.iter().map(|(_, v)| *v).collect();
        assert_eq!(left, vec![1, 3, 5]);
        pool.check_consistency().unwrap();
    }

    #[test]
    fn random_sequences_keep_list_and_count_in_agreement() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut pool: Pool<u32> = Pool::with_capacity("test", 16);
        let mut live: Vec<SlotId> = Vec::new();

        for step in 0..2_000u32 {
            if rng.gen_bool(0.55) {
                match pool.acquire(step) {
                    Some(id) => live.push(id),
                    None => assert_eq!(live.len(), 16),
                }
            } else if !live.is_empty() {
                let pick = rng.gen_range(0..live.len());
                let id = live.swap_remove(pick);
                assert!(pool.release(id));
            }

            pool.check_consistency().unwrap();
            assert_eq!(pool.len(), live.len());
            assert_eq!(pool.iter().count(), live.len());
            assert_eq!(backward(&pool).len(), live.len());
        }
    }

    #[test]
    fn consistency_check_reports_broken_links() {
        let mut pool: Pool<u32> = Pool::with_capacity("test", 3);
        pool.acquire(1).unwrap();
        pool.acquire(2).unwrap();
        pool.count = 3;
        assert!(matches!(
            pool.check_consistency(),
            Err(SimError::ListCorrupted { expected: 3, walked: 2, .. })
        ));
    }
}
