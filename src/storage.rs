use std::{mem, sync::Arc};

use crate::{id::Id, resource::Resource, Epoch};

/// An entry in a `Storage::map` table.
#[derive(Debug)]
pub(crate) enum Element<T> {
    /// There are no live ids with this index.
    Vacant,

    /// There is one live id with this index, allocated at the given
    /// epoch.
    Occupied(Arc<T>, Epoch),

    /// Like `Occupied`, but the resource has been marked as destroyed.
    /// The entry keeps the value so that in-flight users can still name it
    /// and so teardown runs exactly once.
    Destroyed(Arc<T>, Epoch),

    /// Like `Occupied`, but an error occurred when creating the
    /// resource.
    ///
    /// The given `String` is the resource's descriptor label.
    Error(Epoch, String),
}

#[derive(Clone, Debug, Default)]
pub struct StorageReport {
    pub num_occupied: usize,
    pub num_destroyed: usize,
    pub num_vacant: usize,
    pub num_error: usize,
    pub element_size: usize,
}

impl StorageReport {
    pub fn is_empty(&self) -> bool {
        self.num_occupied + self.num_destroyed + self.num_vacant + self.num_error == 0
    }
}

#[derive(Clone, Debug)]
pub struct InvalidId;

/// A table of `T` values indexed by the ids' index values.
///
/// The table is represented as a vector indexed by the ids' index
/// values, so you should use an id allocator like `IdentityManager`
/// that keeps the index values dense and close to zero.
#[derive(Debug)]
pub(crate) struct Storage<T: Resource> {
    map: Vec<Element<T>>,
    kind: &'static str,
}

impl<T: Resource> Storage<T> {
    pub(crate) fn new() -> Self {
        Self {
            map: Vec::new(),
            kind: T::TYPE,
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        self.kind
    }

    /// Whether the id refers to a live (not destroyed) resource.
    pub(crate) fn is_valid(&self, id: Id<T::Marker>) -> bool {
        let (index, epoch) = id.unzip();
        match self.map.get(index as usize) {
            Some(&Element::Occupied(_, storage_epoch)) => storage_epoch == epoch,
            _ => false,
        }
    }

    /// Get a reference to an item behind a potentially invalid ID.
    ///
    /// Destroyed and error entries report [`InvalidId`], as do ids whose
    /// epoch does not match the stored one.
    pub(crate) fn get(&self, id: Id<T::Marker>) -> Result<Arc<T>, InvalidId> {
        let (index, epoch) = id.unzip();
        match self.map.get(index as usize) {
            Some(&Element::Occupied(ref v, storage_epoch)) if storage_epoch == epoch => {
                Ok(Arc::clone(v))
            }
            _ => Err(InvalidId),
        }
    }

    /// Like `get`, but returns the element even if it is destroyed.
    ///
    /// Most entry points should use `get` so that a destroyed resource leads
    /// to a validation error. This is for places that need to reason about
    /// an entry after destruction, like the submit-time liveness re-check.
    pub(crate) fn get_occupied_or_destroyed(
        &self,
        id: Id<T::Marker>,
    ) -> Result<Arc<T>, InvalidId> {
        let (index, epoch) = id.unzip();
        match self.map.get(index as usize) {
            Some(&Element::Occupied(ref v, storage_epoch))
            | Some(&Element::Destroyed(ref v, storage_epoch))
                if storage_epoch == epoch =>
            {
                Ok(Arc::clone(v))
            }
            _ => Err(InvalidId),
        }
    }

    pub(crate) fn label_for_invalid_id(&self, id: Id<T::Marker>) -> &str {
        let (index, _) = id.unzip();
        match self.map.get(index as usize) {
            Some(&Element::Error(_, ref label)) => label,
            _ => "",
        }
    }

    fn insert_impl(&mut self, index: usize, element: Element<T>) {
        if index >= self.map.len() {
            self.map.resize_with(index + 1, || Element::Vacant);
        }
        match mem::replace(&mut self.map[index], element) {
            Element::Vacant => {}
            _ => panic!("{}[{}] is already occupied", self.kind, index),
        }
    }

    pub(crate) fn insert(&mut self, id: Id<T::Marker>, value: Arc<T>) {
        let (index, epoch) = id.unzip();
        self.insert_impl(index as usize, Element::Occupied(value, epoch))
    }

    pub(crate) fn insert_error(&mut self, id: Id<T::Marker>, label: &str) {
        let (index, epoch) = id.unzip();
        self.insert_impl(index as usize, Element::Error(epoch, label.to_string()))
    }

    /// Transition `Occupied -> Destroyed`.
    ///
    /// Returns `Ok(Some(_))` with the value exactly once, on the transition;
    /// a second call for the same id is a no-op reporting `Ok(None)`. Vacant,
    /// error, or epoch-mismatched entries report [`InvalidId`].
    pub(crate) fn mark_destroyed(
        &mut self,
        id: Id<T::Marker>,
    ) -> Result<Option<Arc<T>>, InvalidId> {
        let (index, epoch) = id.unzip();
        let slot = match self.map.get_mut(index as usize) {
            Some(slot) => slot,
            None => return Err(InvalidId),
        };
        match *slot {
            Element::Occupied(_, storage_epoch) if storage_epoch == epoch => {
                // borrowck dance: move the element out before replacing it
                // with another variant holding the same value.
                if let Element::Occupied(value, storage_epoch) =
                    mem::replace(slot, Element::Vacant)
                {
                    *slot = Element::Destroyed(Arc::clone(&value), storage_epoch);
                    Ok(Some(value))
                } else {
                    unreachable!()
                }
            }
            Element::Destroyed(_, storage_epoch) if storage_epoch == epoch => Ok(None),
            _ => Err(InvalidId),
        }
    }

    /// Remove the entry entirely, freeing the index for reuse.
    pub(crate) fn remove(&mut self, id: Id<T::Marker>) -> Option<Arc<T>> {
        let (index, epoch) = id.unzip();
        match mem::replace(&mut self.map[index as usize], Element::Vacant) {
            Element::Occupied(value, storage_epoch)
            | Element::Destroyed(value, storage_epoch) => {
                assert_eq!(epoch, storage_epoch, "{}[{}] is no longer alive", self.kind, index);
                Some(value)
            }
            Element::Error(..) => None,
            Element::Vacant => panic!("Cannot remove a vacant resource"),
        }
    }

    pub(crate) fn generate_report(&self) -> StorageReport {
        let mut report = StorageReport {
            element_size: mem::size_of::<T>(),
            ..Default::default()
        };
        for element in self.map.iter() {
            match *element {
                Element::Occupied(..) => report.num_occupied += 1,
                Element::Destroyed(..) => report.num_destroyed += 1,
                Element::Vacant => report.num_vacant += 1,
                Element::Error(..) => report.num_error += 1,
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::{markers, Id};

    #[derive(Debug)]
    struct TestResource;
    impl Resource for TestResource {
        type Marker = markers::QuerySet;
        const TYPE: &'static str = "TestResource";
        fn label(&self) -> &str {
            ""
        }
    }

    #[test]
    fn destroyed_is_never_valid_again() {
        let mut storage = Storage::<TestResource>::new();
        let id = Id::zip(0, 1);
        storage.insert(id, Arc::new(TestResource));
        assert!(storage.is_valid(id));

        assert!(storage.mark_destroyed(id).unwrap().is_some());
        assert!(!storage.is_valid(id));
        // second destroy is a no-op, not an error
        assert!(storage.mark_destroyed(id).unwrap().is_none());
        assert!(!storage.is_valid(id));
        // the value is still reachable for in-flight users
        assert!(storage.get_occupied_or_destroyed(id).is_ok());
        assert!(storage.get(id).is_err());
    }

    #[test]
    fn epoch_mismatch_is_invalid() {
        let mut storage = Storage::<TestResource>::new();
        storage.insert(Id::zip(0, 2), Arc::new(TestResource));
        let stale = Id::zip(0, 1);
        assert!(!storage.is_valid(stale));
        assert!(storage.get(stale).is_err());
        assert!(storage.mark_destroyed(stale).is_err());
    }
}
