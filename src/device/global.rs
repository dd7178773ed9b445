use crate::{
    api_log, binding_model,
    command::CommandBuffer,
    device::{Device, DeviceDescriptor, DeviceError},
    global::Global,
    id,
    pool::{DestroyPoolError, PoolReport},
    resource::{self, QuerySetDescription},
    resource_log,
    storage::InvalidId,
    Label, LabelHelpers as _,
};

impl Global {
    /// Register a device with the given capability set and limits.
    ///
    /// Adapter negotiation happens above this crate; by the time a device
    /// reaches the validation core its capabilities are settled.
    pub fn create_device(&self, desc: &DeviceDescriptor) -> id::DeviceId {
        profiling::scope!("Global::create_device");

        let fid = self.hub.devices.prepare();
        let id = fid.assign(Device::new(desc));
        api_log!("Global::create_device -> {:?}", id);
        id
    }

    /// The most recent validation error escalated to the device, if any.
    pub fn device_last_validation_error(&self, device_id: id::DeviceId) -> Option<String> {
        let device = self.hub.devices.get(device_id).ok()?;
        device.last_validation_error()
    }

    pub fn device_create_query_set(
        &self,
        device_id: id::DeviceId,
        desc: &resource::QuerySetDescriptor,
    ) -> (id::QuerySetId, Option<resource::CreateQuerySetError>) {
        profiling::scope!("Device::create_query_set");

        let hub = &self.hub;
        let fid = hub.query_sets.prepare();

        let error = 'error: {
            let device = match hub.devices.get(device_id) {
                Ok(device) => device,
                Err(_) => break 'error DeviceError::Invalid.into(),
            };

            let query_set = match device.create_query_set(device_id, desc) {
                Ok(query_set) => query_set,
                Err(err) => {
                    device.report_validation_error(&err);
                    break 'error err;
                }
            };

            let id = fid.assign(query_set);
            api_log!("Device::create_query_set -> {:?}", id);

            return (id, None);
        };

        let id = fid.assign_error(desc.label.borrow_or_default());
        (id, Some(error))
    }

    /// Mark a query set destroyed. Idempotent: destroying an
    /// already-destroyed set is a no-op. The registry entry stays reachable
    /// for in-flight command buffers; submission referencing it will fail.
    pub fn query_set_destroy(
        &self,
        query_set_id: id::QuerySetId,
    ) -> Result<(), resource::DestroyError> {
        profiling::scope!("QuerySet::destroy");
        api_log!("QuerySet::destroy {:?}", query_set_id);

        match self.hub.query_sets.mark_destroyed(query_set_id) {
            Ok(Some(_query_set)) => {
                resource_log!("Destroy raw QuerySet {:?}", query_set_id);
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(_) => Err(resource::DestroyError::Invalid),
        }
    }

    /// The caller-visible attributes of a live query set.
    pub fn query_set_describe(
        &self,
        query_set_id: id::QuerySetId,
    ) -> Result<QuerySetDescription, InvalidId> {
        let query_set = self.hub.query_sets.get(query_set_id)?;
        Ok(QuerySetDescription {
            kind: query_set.kind,
            count: query_set.count,
            statistics: query_set.statistics.to_vec(),
        })
    }

    pub fn device_create_bind_group_layout(
        &self,
        device_id: id::DeviceId,
        desc: &binding_model::BindGroupLayoutDescriptor,
    ) -> (
        id::BindGroupLayoutId,
        Option<binding_model::CreateBindGroupLayoutError>,
    ) {
        profiling::scope!("Device::create_bind_group_layout");

        let hub = &self.hub;
        let fid = hub.bind_group_layouts.prepare();

        let error = 'error: {
            let device = match hub.devices.get(device_id) {
                Ok(device) => device,
                Err(_) => break 'error DeviceError::Invalid.into(),
            };

            let layout = match device.create_bind_group_layout(device_id, desc) {
                Ok(layout) => layout,
                Err(err) => {
                    device.report_validation_error(&err);
                    break 'error err;
                }
            };

            let id = fid.assign(layout);
            api_log!("Device::create_bind_group_layout -> {:?}", id);

            return (id, None);
        };

        let id = fid.assign_error(desc.label.borrow_or_default());
        (id, Some(error))
    }

    /// Destroy a bind group layout. Fails while any bind group leased from
    /// it is still alive: the layout owns the pool its bind groups live in.
    pub fn bind_group_layout_destroy(
        &self,
        layout_id: id::BindGroupLayoutId,
    ) -> Result<(), binding_model::DestroyBindGroupLayoutError> {
        profiling::scope!("BindGroupLayout::destroy");
        api_log!("BindGroupLayout::destroy {:?}", layout_id);

        let hub = &self.hub;

        let layout = hub
            .bind_group_layouts
            .get(layout_id)
            .map_err(|_| binding_model::DestroyBindGroupLayoutError::Invalid)?;
        // Retiring the pool settles the no-live-leases precondition under
        // the pool lock, so an allocation racing through an already-fetched
        // layout cannot land after the check. A concurrent destroy loses
        // the retirement and reports the layout invalid.
        layout.destroy_pool().map_err(|err| match err {
            DestroyPoolError::AlreadyDestroyed => {
                binding_model::DestroyBindGroupLayoutError::Invalid
            }
            DestroyPoolError::StillInUse { live } => {
                binding_model::DestroyBindGroupLayoutError::StillInUse { live }
            }
        })?;

        resource_log!("Destroy raw BindGroupLayout {:?}", layout_id);
        let _layout = hub.bind_group_layouts.unregister(layout_id);
        Ok(())
    }

    pub fn bind_group_layout_pool_report(
        &self,
        layout_id: id::BindGroupLayoutId,
    ) -> Result<PoolReport, InvalidId> {
        let layout = self.hub.bind_group_layouts.get(layout_id)?;
        Ok(layout.generate_pool_report())
    }

    pub fn device_create_bind_group(
        &self,
        device_id: id::DeviceId,
        desc: &binding_model::BindGroupDescriptor,
    ) -> (id::BindGroupId, Option<binding_model::CreateBindGroupError>) {
        profiling::scope!("Device::create_bind_group");

        let hub = &self.hub;
        let fid = hub.bind_groups.prepare();

        let error = 'error: {
            let device = match hub.devices.get(device_id) {
                Ok(device) => device,
                Err(_) => break 'error DeviceError::Invalid.into(),
            };

            let layout = match hub.bind_group_layouts.get(desc.layout) {
                Ok(layout) => layout,
                Err(_) => {
                    break 'error binding_model::CreateBindGroupError::InvalidLayout(desc.layout)
                }
            };
            if layout.device_id != device_id {
                break 'error binding_model::CreateBindGroupError::DeviceMismatch(desc.layout);
            }

            let bind_group = match layout.allocate(desc.layout, device_id, desc) {
                Ok(bind_group) => bind_group,
                Err(err) => {
                    device.report_validation_error(&err);
                    break 'error err;
                }
            };

            let id = fid.assign(bind_group);
            api_log!("Device::create_bind_group -> {:?}", id);

            return (id, None);
        };

        let id = fid.assign_error(desc.label.borrow_or_default());
        (id, Some(error))
    }

    /// Mark a bind group destroyed, returning its slot to the owning
    /// layout's pool. The slot is reclaimed exactly once: the return happens
    /// on the destroy transition, and destroying again is a no-op.
    pub fn bind_group_destroy(
        &self,
        bind_group_id: id::BindGroupId,
    ) -> Result<(), resource::DestroyError> {
        profiling::scope!("BindGroup::destroy");
        api_log!("BindGroup::destroy {:?}", bind_group_id);

        let hub = &self.hub;

        match hub.bind_groups.mark_destroyed(bind_group_id) {
            Ok(Some(bind_group)) => {
                // The layout outlives its bind groups (destruction of a
                // layout with live leases is refused), so the lookup holds.
                if let Ok(layout) = hub.bind_group_layouts.get(bind_group.layout_id) {
                    layout.deallocate(&bind_group);
                }
                resource_log!("Destroy raw BindGroup {:?}", bind_group_id);
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(_) => Err(resource::DestroyError::Invalid),
        }
    }

    pub fn device_create_command_encoder(
        &self,
        device_id: id::DeviceId,
        label: &Label,
    ) -> (id::CommandEncoderId, Option<DeviceError>) {
        profiling::scope!("Device::create_command_encoder");

        let hub = &self.hub;
        let fid = hub.command_buffers.prepare();

        if let Err(_) = hub.devices.get(device_id) {
            let id = fid.assign_error(label.borrow_or_default());
            return (id, Some(DeviceError::Invalid));
        }

        let id = fid.assign(CommandBuffer::new(device_id, label));
        api_log!("Device::create_command_encoder -> {:?}", id);
        (id, None)
    }
}
