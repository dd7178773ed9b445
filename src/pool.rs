//! Slot pooling for per-layout backing storage.
//!
//! Each bind group layout owns one [`SlotPool`]. Creating a bind group
//! leases a slot (reusing a freed one before growing), and destroying it
//! returns the slot to that pool's free list. Slots are never shared across
//! layouts, since binding-slot shapes differ by layout.

use thiserror::Error;

/// Index of a slot within one layout's pool.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SlotIndex(pub(crate) u32);

/// The allocator backend could not provide more slot storage.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("slot pool is exhausted: cannot grow past {limit} slots")]
pub struct ResourceExhausted {
    pub limit: u32,
}

#[derive(Clone, Debug, Error, PartialEq)]
pub(crate) enum DestroyPoolError {
    #[error("slot pool is already retired")]
    AlreadyDestroyed,
    #[error("slot pool still has {live} live slots")]
    StillInUse { live: usize },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PoolReport {
    /// Slots ever allocated from the backend; the pool's high-water mark.
    pub num_slots: usize,
    pub num_live: usize,
    pub num_free: usize,
}

/// An arena of backing slots with a free list.
///
/// Growth is the only operation that talks to the backend; repeated
/// create/destroy cycles are served entirely from the free list, so
/// `num_slots` never exceeds the high-water mark of concurrently live
/// allocations.
#[derive(Debug)]
pub(crate) struct SlotPool<T> {
    slots: Vec<Option<T>>,
    free: Vec<SlotIndex>,
    live: usize,
    max_slots: u32,
    destroyed: bool,
}

impl<T> SlotPool<T> {
    pub fn new(max_slots: u32) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
            max_slots,
            destroyed: false,
        }
    }

    pub fn allocate(&mut self, contents: T) -> Result<SlotIndex, ResourceExhausted> {
        debug_assert!(!self.destroyed);
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                if self.slots.len() as u32 >= self.max_slots {
                    return Err(ResourceExhausted {
                        limit: self.max_slots,
                    });
                }
                self.slots.push(None);
                SlotIndex(self.slots.len() as u32 - 1)
            }
        };
        let slot = &mut self.slots[index.0 as usize];
        debug_assert!(slot.is_none());
        *slot = Some(contents);
        self.live += 1;
        Ok(index)
    }

    /// Return a slot to the free list. Must be called exactly once per
    /// allocation; the destruction path ties it to the registry's
    /// exactly-once destroy transition.
    pub fn deallocate(&mut self, index: SlotIndex) -> T {
        let contents = self.slots[index.0 as usize]
            .take()
            .expect("slot deallocated twice");
        self.free.push(index);
        self.live -= 1;
        contents
    }

    /// Retire the pool. Refused while any lease is live; succeeds at most
    /// once. The caller holds the pool's lock across the precondition and
    /// the retirement, so a racing allocation through a stale reference
    /// cannot pass between them.
    pub fn destroy(&mut self) -> Result<(), DestroyPoolError> {
        if self.destroyed {
            return Err(DestroyPoolError::AlreadyDestroyed);
        }
        if self.live > 0 {
            return Err(DestroyPoolError::StillInUse { live: self.live });
        }
        self.destroyed = true;
        Ok(())
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn generate_report(&self) -> PoolReport {
        PoolReport {
            num_slots: self.slots.len(),
            num_live: self.live,
            num_free: self.free.len(),
        }
    }
}
