//! Bind-group allocation: per-layout slot pooling, reuse, exhaustion, and
//! the layout-owns-its-bind-groups lifetime rule.

use std::borrow::Cow;

use valet::{
    binding_model::{
        BindGroupDescriptor, BindGroupEntry, BindGroupLayoutDescriptor, BindGroupLayoutEntry,
        BindingResource, BindingType, CreateBindGroupError, CreateBindGroupLayoutError,
        DestroyBindGroupLayoutError,
    },
    device::DeviceDescriptor,
    global::Global,
    id::{markers, BindGroupId, BindGroupLayoutId, DeviceId},
    identity::IdentityManager,
    resource::DestroyError,
    types::{Capabilities, Limits},
};

fn create_device(global: &Global, max_bind_groups_per_layout: u32) -> DeviceId {
    global.create_device(&DeviceDescriptor {
        label: Some(Cow::Borrowed("test-device")),
        capabilities: Capabilities::empty(),
        limits: Limits {
            max_bind_groups_per_layout,
            ..Limits::default()
        },
    })
}

fn create_layout(global: &Global, device: DeviceId) -> BindGroupLayoutId {
    let entries = [
        BindGroupLayoutEntry {
            binding: 0,
            ty: BindingType::Buffer,
        },
        BindGroupLayoutEntry {
            binding: 1,
            ty: BindingType::Sampler,
        },
    ];
    let (id, error) = global.device_create_bind_group_layout(
        device,
        &BindGroupLayoutDescriptor {
            label: Some(Cow::Borrowed("test-layout")),
            entries: Cow::Borrowed(&entries),
        },
    );
    assert!(error.is_none());
    id
}

fn create_bind_group(
    global: &Global,
    device: DeviceId,
    layout: BindGroupLayoutId,
) -> (BindGroupId, Option<CreateBindGroupError>) {
    // ids for resources owned by collaborating subsystems
    let buffers = IdentityManager::<markers::Buffer>::new();
    let samplers = IdentityManager::<markers::Sampler>::new();
    let entries = [
        BindGroupEntry {
            binding: 0,
            resource: BindingResource::Buffer {
                buffer: buffers.process(),
                offset: 0,
                size: None,
            },
        },
        BindGroupEntry {
            binding: 1,
            resource: BindingResource::Sampler(samplers.process()),
        },
    ];
    global.device_create_bind_group(
        device,
        &BindGroupDescriptor {
            label: None,
            layout,
            entries: Cow::Borrowed(&entries),
        },
    )
}

#[test]
fn slots_are_reused() {
    let global = Global::new();
    let device = create_device(&global, 64);
    let layout = create_layout(&global, device);

    let (first, error) = create_bind_group(&global, device, layout);
    assert!(error.is_none());
    let (_second, error) = create_bind_group(&global, device, layout);
    assert!(error.is_none());

    let report = global.bind_group_layout_pool_report(layout).unwrap();
    assert_eq!(report.num_slots, 2);
    assert_eq!(report.num_live, 2);

    global.bind_group_destroy(first).unwrap();
    let (_third, error) = create_bind_group(&global, device, layout);
    assert!(error.is_none());

    // the freed slot was handed out again; the arena did not grow
    let report = global.bind_group_layout_pool_report(layout).unwrap();
    assert_eq!(report.num_slots, 2);
    assert_eq!(report.num_live, 2);
    assert_eq!(report.num_free, 0);
}

#[test]
fn pool_growth_tracks_the_high_water_mark() {
    let global = Global::new();
    let device = create_device(&global, 1024);
    let layout = create_layout(&global, device);

    for _ in 0..4 {
        let mut held = Vec::new();
        for _ in 0..8 {
            let (id, error) = create_bind_group(&global, device, layout);
            assert!(error.is_none());
            held.push(id);
        }
        for id in held {
            global.bind_group_destroy(id).unwrap();
        }
    }

    let report = global.bind_group_layout_pool_report(layout).unwrap();
    assert_eq!(report.num_slots, 8);
    assert_eq!(report.num_live, 0);
    assert_eq!(report.num_free, 8);
}

#[test]
fn layout_outlives_its_bind_groups() {
    let global = Global::new();
    let device = create_device(&global, 64);
    let layout = create_layout(&global, device);

    let (bind_group, error) = create_bind_group(&global, device, layout);
    assert!(error.is_none());

    assert_eq!(
        global.bind_group_layout_destroy(layout),
        Err(DestroyBindGroupLayoutError::StillInUse { live: 1 })
    );

    global.bind_group_destroy(bind_group).unwrap();
    assert!(global.bind_group_layout_destroy(layout).is_ok());
    assert!(global.bind_group_layout_pool_report(layout).is_err());
    assert_eq!(
        global.bind_group_layout_destroy(layout),
        Err(DestroyBindGroupLayoutError::Invalid)
    );
}

#[test]
fn bind_group_destroy_is_idempotent() {
    let global = Global::new();
    let device = create_device(&global, 64);
    let layout = create_layout(&global, device);

    let (bind_group, error) = create_bind_group(&global, device, layout);
    assert!(error.is_none());

    global.bind_group_destroy(bind_group).unwrap();
    // a second destroy changes nothing; the slot was reclaimed exactly once
    global.bind_group_destroy(bind_group).unwrap();

    let report = global.bind_group_layout_pool_report(layout).unwrap();
    assert_eq!(report.num_live, 0);
    assert_eq!(report.num_free, 1);
}

#[test]
fn exhausted_pool_rejects_allocation() {
    let global = Global::new();
    let device = create_device(&global, 2);
    let layout = create_layout(&global, device);

    let (first, error) = create_bind_group(&global, device, layout);
    assert!(error.is_none());
    let (_second, error) = create_bind_group(&global, device, layout);
    assert!(error.is_none());

    let (_, error) = create_bind_group(&global, device, layout);
    assert!(matches!(
        error,
        Some(CreateBindGroupError::ResourceExhausted(_))
    ));
    assert!(global.device_last_validation_error(device).is_some());

    // freeing a lease makes room again
    global.bind_group_destroy(first).unwrap();
    let (_, error) = create_bind_group(&global, device, layout);
    assert!(error.is_none());
}

#[test]
fn conflicting_binding_indices_are_rejected() {
    let global = Global::new();
    let device = create_device(&global, 64);

    let entries = [
        BindGroupLayoutEntry {
            binding: 3,
            ty: BindingType::Buffer,
        },
        BindGroupLayoutEntry {
            binding: 3,
            ty: BindingType::TextureView,
        },
    ];
    let (layout, error) = global.device_create_bind_group_layout(
        device,
        &BindGroupLayoutDescriptor {
            label: None,
            entries: Cow::Borrowed(&entries),
        },
    );
    assert!(matches!(
        error,
        Some(CreateBindGroupLayoutError::ConflictBinding(3))
    ));

    // the parked layout id cannot be allocated from
    let (_, error) = create_bind_group(&global, device, layout);
    assert!(matches!(
        error,
        Some(CreateBindGroupError::InvalidLayout(id)) if id == layout
    ));
}

#[test]
fn cross_device_layout_is_rejected() {
    let global = Global::new();
    let device_a = create_device(&global, 64);
    let device_b = create_device(&global, 64);
    let layout = create_layout(&global, device_b);

    let (_, error) = create_bind_group(&global, device_a, layout);
    assert!(matches!(
        error,
        Some(CreateBindGroupError::DeviceMismatch(id)) if id == layout
    ));
}

#[test]
fn destroying_a_failed_creation_is_an_error() {
    let global = Global::new();
    let device = create_device(&global, 0);
    let layout = create_layout(&global, device);

    let (bind_group, error) = create_bind_group(&global, device, layout);
    assert!(error.is_some());
    assert_eq!(
        global.bind_group_destroy(bind_group),
        Err(DestroyError::Invalid)
    );
}

#[test]
fn hub_report_counts_registrations() {
    let global = Global::new();
    let device = create_device(&global, 64);
    let layout = create_layout(&global, device);
    let (bind_group, _) = create_bind_group(&global, device, layout);

    let report = global.generate_report();
    assert_eq!(report.hub.devices.num_occupied, 1);
    assert_eq!(report.hub.bind_group_layouts.num_occupied, 1);
    assert_eq!(report.hub.bind_groups.num_occupied, 1);

    global.bind_group_destroy(bind_group).unwrap();
    let report = global.generate_report();
    assert_eq!(report.hub.bind_groups.num_occupied, 0);
    assert_eq!(report.hub.bind_groups.num_destroyed, 1);
}
