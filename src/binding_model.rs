use parking_lot::Mutex;
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    id::{markers, BindGroupLayoutId, BufferId, DeviceId, SamplerId, TextureViewId},
    pool::{DestroyPoolError, PoolReport, ResourceExhausted, SlotIndex, SlotPool},
    resource::{ParentDevice, Resource},
    FastHashMap, Label, LabelHelpers as _,
};
use std::{borrow::Cow, num::NonZeroU64};

/// The shape of one binding slot in a layout.
///
/// Full binding-type validation (visibility, buffer sizes, sampler
/// comparison modes and so on) is the business of the bind-group validation
/// collaborator above this crate; the allocator only needs the slot shape.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BindingType {
    Buffer,
    Sampler,
    TextureView,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BindGroupLayoutEntry {
    pub binding: u32,
    pub ty: BindingType,
}

#[derive(Clone, Debug)]
pub struct BindGroupLayoutDescriptor<'a> {
    pub label: Label<'a>,
    pub entries: Cow<'a, [BindGroupLayoutEntry]>,
}

#[derive(Clone, Debug, Error)]
#[non_exhaustive]
pub enum CreateBindGroupLayoutError {
    #[error(transparent)]
    Device(#[from] crate::device::DeviceError),
    #[error("binding index {0} appears more than once in the layout")]
    ConflictBinding(u32),
}

/// A predeclared binding shape that owns the slot pool its bind groups are
/// leased from.
///
/// The layout conceptually owns every bind group allocated from it: the
/// layout may only be destroyed once its pool holds no live leases.
#[derive(Debug)]
pub struct BindGroupLayout {
    pub(crate) device_id: DeviceId,
    pub(crate) label: String,
    pub(crate) entries: FastHashMap<u32, BindingType>,
    pub(crate) pool: Mutex<SlotPool<SlotContents>>,
}

impl Resource for BindGroupLayout {
    type Marker = markers::BindGroupLayout;
    const TYPE: &'static str = "BindGroupLayout";
    fn label(&self) -> &str {
        &self.label
    }
}

impl ParentDevice for BindGroupLayout {
    fn device_id(&self) -> DeviceId {
        self.device_id
    }
}

/// A resource view bound into one slot of a bind group.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum BindingResource {
    Buffer {
        buffer: BufferId,
        offset: u64,
        size: Option<NonZeroU64>,
    },
    Sampler(SamplerId),
    TextureView(TextureViewId),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BindGroupEntry {
    pub binding: u32,
    pub resource: BindingResource,
}

#[derive(Clone, Debug)]
pub struct BindGroupDescriptor<'a> {
    pub label: Label<'a>,
    pub layout: BindGroupLayoutId,
    pub entries: Cow<'a, [BindGroupEntry]>,
}

/// What actually lives in a pooled slot: the bound resource views.
#[derive(Debug)]
pub struct SlotContents {
    pub bindings: SmallVec<[BindGroupEntry; 4]>,
}

#[derive(Clone, Debug, Error)]
#[non_exhaustive]
pub enum CreateBindGroupError {
    #[error(transparent)]
    Device(#[from] crate::device::DeviceError),
    #[error("bind group layout {0:?} is invalid or destroyed")]
    InvalidLayout(BindGroupLayoutId),
    #[error("bind group layout {0:?} belongs to a different device")]
    DeviceMismatch(BindGroupLayoutId),
    #[error("descriptor names layout {actual:?} but allocation went through layout {expected:?}")]
    LayoutMismatch {
        expected: BindGroupLayoutId,
        actual: BindGroupLayoutId,
    },
    #[error(transparent)]
    ResourceExhausted(#[from] ResourceExhausted),
}

#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum DestroyBindGroupLayoutError {
    #[error("bind group layout is invalid")]
    Invalid,
    #[error("bind group layout still has {live} live bind groups allocated from it")]
    StillInUse { live: usize },
}

impl BindGroupLayout {
    /// Lease a slot from this layout's pool and bind the descriptor's
    /// resource views into it.
    ///
    /// The layout named by the descriptor has to be the layout the
    /// allocation goes through; the registry lookup upstream makes that so,
    /// and the check here keeps a confused caller from crossing pools.
    pub(crate) fn allocate(
        &self,
        self_id: BindGroupLayoutId,
        device_id: DeviceId,
        desc: &BindGroupDescriptor,
    ) -> Result<BindGroup, CreateBindGroupError> {
        if desc.layout != self_id {
            return Err(CreateBindGroupError::LayoutMismatch {
                expected: self_id,
                actual: desc.layout,
            });
        }

        let contents = SlotContents {
            bindings: desc.entries.iter().cloned().collect(),
        };
        // The retirement check and the allocation share one lock
        // acquisition; a layout retired between the registry lookup and
        // this point refuses the lease instead of leaking it.
        let mut pool = self.pool.lock();
        if pool.is_destroyed() {
            return Err(CreateBindGroupError::InvalidLayout(self_id));
        }
        let slot = pool.allocate(contents)?;
        drop(pool);

        Ok(BindGroup {
            device_id,
            layout_id: self_id,
            slot,
            label: desc.label.borrow_or_default().to_string(),
        })
    }

    /// Return a bind group's slot to the pool. Called exactly once per bind
    /// group, from the destroy transition.
    pub(crate) fn deallocate(&self, bind_group: &BindGroup) {
        let _contents = self.pool.lock().deallocate(bind_group.slot);
    }

    /// Retire this layout's pool if it holds no live leases. Precondition
    /// and retirement are settled under the pool lock.
    pub(crate) fn destroy_pool(&self) -> Result<(), DestroyPoolError> {
        self.pool.lock().destroy()
    }

    pub fn generate_pool_report(&self) -> PoolReport {
        self.pool.lock().generate_report()
    }

    /// Declared type of one binding slot, if the layout has it.
    pub fn binding_type(&self, binding: u32) -> Option<BindingType> {
        self.entries.get(&binding).copied()
    }
}

/// A bundle of resource bindings leased from a per-layout pool.
#[derive(Debug)]
pub struct BindGroup {
    pub(crate) device_id: DeviceId,
    pub(crate) layout_id: BindGroupLayoutId,
    pub(crate) slot: SlotIndex,
    pub(crate) label: String,
}

impl Resource for BindGroup {
    type Marker = markers::BindGroup;
    const TYPE: &'static str = "BindGroup";
    fn label(&self) -> &str {
        &self.label
    }
}

impl ParentDevice for BindGroup {
    fn device_id(&self) -> DeviceId {
        self.device_id
    }
}
