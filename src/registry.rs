use std::sync::Arc;

use parking_lot::RwLock;

use crate::{
    id::Id,
    identity::IdentityManager,
    resource::Resource,
    storage::{InvalidId, Storage, StorageReport},
};

/// The primary holder of each resource type.
///
/// A registry owns the [`Storage`] table mapping ids to resources and the
/// [`IdentityManager`] that mints those ids. All state transitions (register,
/// mark-destroyed, unregister) take the storage's write lock, and every
/// lookup takes the read lock, so transitions are linearizable: an
/// `is_valid` that starts after `mark_destroyed` returns always observes the
/// destruction, and concurrent readers never observe a torn entry.
#[derive(Debug)]
pub struct Registry<T: Resource> {
    identity: IdentityManager<T::Marker>,
    storage: RwLock<Storage<T>>,
}

impl<T: Resource> Registry<T> {
    pub(crate) fn new() -> Self {
        Self {
            identity: IdentityManager::new(),
            storage: RwLock::new(Storage::new()),
        }
    }
}

#[must_use]
pub(crate) struct FutureId<'a, T: Resource> {
    id: Id<T::Marker>,
    data: &'a RwLock<Storage<T>>,
}

impl<T: Resource> FutureId<'_, T> {
    pub fn assign(self, value: T) -> Id<T::Marker> {
        self.data.write().insert(self.id, Arc::new(value));
        self.id
    }

    pub fn assign_error(self, label: &str) -> Id<T::Marker> {
        self.data.write().insert_error(self.id, label);
        self.id
    }
}

impl<T: Resource> Registry<T> {
    pub(crate) fn prepare(&self) -> FutureId<T> {
        FutureId {
            id: self.identity.process(),
            data: &self.storage,
        }
    }

    pub(crate) fn get(&self, id: Id<T::Marker>) -> Result<Arc<T>, InvalidId> {
        self.storage.read().get(id)
    }

    /// Whether `id` refers to a live resource. Once `mark_destroyed` has
    /// completed for an id, this never reports true for it again.
    pub(crate) fn is_valid(&self, id: Id<T::Marker>) -> bool {
        self.storage.read().is_valid(id)
    }

    /// Idempotent destruction. The returned value is `Some` only for the
    /// call that performed the transition, so per-resource teardown tied to
    /// it runs exactly once.
    pub(crate) fn mark_destroyed(
        &self,
        id: Id<T::Marker>,
    ) -> Result<Option<Arc<T>>, InvalidId> {
        self.storage.write().mark_destroyed(id)
    }

    pub(crate) fn unregister(&self, id: Id<T::Marker>) -> Option<Arc<T>> {
        let value = self.storage.write().remove(id);
        //Note: careful about the order here!
        self.identity.free(id);
        //Returning None is legal if it's an error ID
        value
    }

    pub fn label_for_resource(&self, id: Id<T::Marker>) -> String {
        let guard = self.storage.read();

        let type_name = guard.kind();
        // Destroyed resources keep their label; it is the most useful thing
        // an error message can say about them.
        match guard.get_occupied_or_destroyed(id) {
            Ok(res) => {
                let label = res.label();
                if label.is_empty() {
                    format!("<{}-{:?}>", type_name, id.unzip())
                } else {
                    label.to_string()
                }
            }
            Err(_) => format!(
                "<Invalid-{} label={}>",
                type_name,
                guard.label_for_invalid_id(id)
            ),
        }
    }

    pub(crate) fn generate_report(&self) -> StorageReport {
        self.storage.read().generate_report()
    }
}
