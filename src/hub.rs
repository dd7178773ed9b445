/*! Allocating resource ids, and tracking the resources they refer to.
 *
 *  The API uses identifiers of type [`Id<M>`] to refer to resources. Each id
 *  contains an index for the resource it denotes and a generation number for
 *  additional validation. Every resource type gets its own [`Registry`] in
 *  the [`Hub`], and the resources to which identifiers refer are freed
 *  explicitly; attempting to use an identifier for a resource that has been
 *  freed elicits an error result rather than undefined behavior.
 *
 *  [`Id<M>`]: crate::id::Id
 */

use crate::{
    binding_model::{BindGroup, BindGroupLayout},
    command::CommandBuffer,
    device::Device,
    registry::Registry,
    resource::QuerySet,
    storage::StorageReport,
};

#[derive(Debug)]
pub struct Hub {
    pub devices: Registry<Device>,
    pub query_sets: Registry<QuerySet>,
    pub bind_group_layouts: Registry<BindGroupLayout>,
    pub bind_groups: Registry<BindGroup>,
    pub command_buffers: Registry<CommandBuffer>,
}

impl Hub {
    pub(crate) fn new() -> Self {
        Self {
            devices: Registry::new(),
            query_sets: Registry::new(),
            bind_group_layouts: Registry::new(),
            bind_groups: Registry::new(),
            command_buffers: Registry::new(),
        }
    }

    pub fn generate_report(&self) -> HubReport {
        HubReport {
            devices: self.devices.generate_report(),
            query_sets: self.query_sets.generate_report(),
            bind_group_layouts: self.bind_group_layouts.generate_report(),
            bind_groups: self.bind_groups.generate_report(),
            command_buffers: self.command_buffers.generate_report(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct HubReport {
    pub devices: StorageReport,
    pub query_sets: StorageReport,
    pub bind_group_layouts: StorageReport,
    pub bind_groups: StorageReport,
    pub command_buffers: StorageReport,
}

impl HubReport {
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
            && self.query_sets.is_empty()
            && self.bind_group_layouts.is_empty()
            && self.bind_groups.is_empty()
            && self.command_buffers.is_empty()
    }
}
