use parking_lot::Mutex;

use crate::{
    id::{Id, Marker},
    Epoch, Index,
};
use std::marker::PhantomData;

/// A simple structure to allocate [`Id`] identifiers.
///
/// Calling [`alloc`] returns a fresh, never-before-seen id. Calling
/// [`release`] marks an id as dead; it will never be returned again by
/// `alloc`.
///
/// `IdentityValues` returns `Id`s whose index values are suitable for use as
/// indices into a `Vec<T>` that holds those ids' referents:
///
/// - Every live id has a distinct index value. Every live id's index
///   selects a distinct element in the vector.
///
/// - `IdentityValues` prefers low index numbers. If you size your vector to
///   accommodate the indices produced here, the vector's length will reflect
///   the highwater mark of actual occupancy.
///
/// - `IdentityValues` reuses the index values of freed ids before returning
///   ids with new index values, with the epoch bumped so stale ids are
///   distinguishable. Freed vector entries get reused.
///
/// [`alloc`]: IdentityValues::alloc
/// [`release`]: IdentityValues::release
#[derive(Debug)]
struct IdentityValues {
    free: Vec<(Index, Epoch)>,
    next_index: Index,
    count: usize,
}

impl IdentityValues {
    fn alloc<T: Marker>(&mut self) -> Id<T> {
        self.count += 1;
        match self.free.pop() {
            Some((index, epoch)) => Id::zip(index, epoch + 1),
            None => {
                let index = self.next_index;
                self.next_index += 1;
                let epoch = 1;
                Id::zip(index, epoch)
            }
        }
    }

    fn release<T: Marker>(&mut self, id: Id<T>) {
        let (index, epoch) = id.unzip();
        self.free.push((index, epoch));
        self.count -= 1;
    }
}

#[derive(Debug)]
pub struct IdentityManager<T: Marker> {
    values: Mutex<IdentityValues>,
    _phantom: PhantomData<T>,
}

impl<T: Marker> IdentityManager<T> {
    pub fn new() -> Self {
        Self {
            values: Mutex::new(IdentityValues {
                free: Vec::new(),
                next_index: 0,
                count: 0,
            }),
            _phantom: PhantomData,
        }
    }

    pub fn process(&self) -> Id<T> {
        self.values.lock().alloc()
    }

    pub fn free(&self, id: Id<T>) {
        self.values.lock().release(id)
    }

    pub fn count(&self) -> usize {
        self.values.lock().count
    }
}

#[test]
fn test_epoch_end_of_life() {
    use crate::id;
    let man = IdentityManager::<id::markers::QuerySet>::new();
    let id1 = man.process();
    assert_eq!(id1.unzip(), (0, 1));
    man.free(id1);
    let id2 = man.process();
    // confirm that epoch 1 is no longer re-used
    assert_eq!(id2.unzip(), (0, 2));
}
