//! Opaque, typed resource identifiers.
//!
//! An [`Id`] packs an index and an epoch (generation) into a `u64`. The index
//! selects a slot in the matching [`Storage`] table, and the epoch detects
//! stale ids whose slot has since been reused. Ids are the only way resources
//! refer to each other across module boundaries; nothing in this crate holds
//! a back-pointer.
//!
//! [`Storage`]: crate::storage::Storage

use crate::{Epoch, Index};
use std::{cmp::Ordering, fmt, hash, marker::PhantomData};

/// An identifier for a resource of type `T`.
#[repr(transparent)]
pub struct Id<T: Marker>(u64, PhantomData<T>);

impl<T: Marker> Id<T> {
    pub(crate) fn zip(index: Index, epoch: Epoch) -> Self {
        let v = index as u64 | ((epoch as u64) << 32);
        Id(v, PhantomData)
    }

    pub(crate) fn unzip(self) -> (Index, Epoch) {
        (self.0 as u32, (self.0 >> 32) as u32)
    }
}

impl<T: Marker> Copy for Id<T> {}

impl<T: Marker> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Marker> fmt::Debug for Id<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        let (index, epoch) = self.unzip();
        write!(formatter, "Id({},{},{})", index, epoch, T::NAME)
    }
}

impl<T: Marker> hash::Hash for Id<T> {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl<T: Marker> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T: Marker> Eq for Id<T> {}

impl<T: Marker> PartialOrd for Id<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: Marker> Ord for Id<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

/// Marker types for each resource an [`Id`] can denote.
///
/// The markers carry no data; they only keep ids of different resource types
/// from being confused for one another.
pub trait Marker: 'static + Sized {
    const NAME: &'static str;
}

pub mod markers {
    macro_rules! marker {
        ($name:ident) => {
            #[derive(Debug)]
            pub enum $name {}
            impl super::Marker for $name {
                const NAME: &'static str = stringify!($name);
            }
        };
    }

    marker!(Device);
    marker!(QuerySet);
    marker!(BindGroupLayout);
    marker!(BindGroup);
    marker!(CommandBuffer);
    // External collaborators: these resources live outside this subsystem,
    // but bind group entries still name them by id.
    marker!(Buffer);
    marker!(TextureView);
    marker!(Sampler);
}

pub type DeviceId = Id<markers::Device>;
pub type QueueId = DeviceId;
pub type QuerySetId = Id<markers::QuerySet>;
pub type BindGroupLayoutId = Id<markers::BindGroupLayout>;
pub type BindGroupId = Id<markers::BindGroup>;
pub type CommandBufferId = Id<markers::CommandBuffer>;
pub type CommandEncoderId = CommandBufferId;
pub type BufferId = Id<markers::Buffer>;
pub type TextureViewId = Id<markers::TextureView>;
pub type SamplerId = Id<markers::Sampler>;

#[test]
fn test_id_zip() {
    let id = QuerySetId::zip(17, 3);
    assert_eq!(id.unzip(), (17, 3));
}
