use crate::hub::{Hub, HubReport};

/// The entry point to the whole subsystem.
///
/// All operations are methods on `Global`, taking ids and descriptors; the
/// per-resource entry points live next to the resources they operate on
/// (`device/global.rs`, `command/*.rs`, `device/queue.rs`).
#[derive(Debug)]
pub struct Global {
    pub hub: Hub,
}

impl Global {
    pub fn new() -> Self {
        profiling::scope!("Global::new");
        Self { hub: Hub::new() }
    }

    pub fn generate_report(&self) -> GlobalReport {
        GlobalReport {
            hub: self.hub.generate_report(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct GlobalReport {
    pub hub: HubReport,
}
