use parking_lot::Mutex;
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    binding_model::{self, BindGroupLayout},
    conv,
    id::{markers, DeviceId},
    pool::SlotPool,
    resource::{CreateQuerySetError, QuerySet, QuerySetDescriptor, Resource},
    types::{Capabilities, Limits, QueryKind},
    FastHashMap, FastHashSet, Label, LabelHelpers as _, SubmissionIndex,
};
use std::{fmt, sync::atomic::{AtomicU64, Ordering}};

mod global;
pub mod queue;

#[derive(Clone, Debug)]
pub struct DeviceDescriptor<'a> {
    pub label: Label<'a>,
    pub capabilities: Capabilities,
    pub limits: Limits,
}

#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum DeviceError {
    #[error("device is invalid")]
    Invalid,
}

#[derive(Clone, Debug, Error, PartialEq)]
#[error("capability {0:?} was not enabled on the device")]
pub struct MissingCapability(pub Capabilities);

/// The owner of every resource created through it.
///
/// The device itself is mostly an identity token plus its immutable
/// capability set and limits; validation consults it, and recording-time
/// validation failures are escalated into its error sink per the API
/// family's device-error convention.
#[derive(Debug)]
pub struct Device {
    pub(crate) label: String,
    pub(crate) capabilities: Capabilities,
    pub(crate) limits: Limits,
    pub(crate) active_submission_index: AtomicU64,
    error_sink: Mutex<ErrorSink>,
}

#[derive(Debug, Default)]
struct ErrorSink {
    last: Option<String>,
    total: usize,
}

impl Resource for Device {
    type Marker = markers::Device;
    const TYPE: &'static str = "Device";
    fn label(&self) -> &str {
        &self.label
    }
}

impl Device {
    pub(crate) fn new(desc: &DeviceDescriptor) -> Self {
        Self {
            label: desc.label.borrow_or_default().to_string(),
            capabilities: desc.capabilities,
            limits: desc.limits.clone(),
            active_submission_index: AtomicU64::new(0),
            error_sink: Mutex::new(ErrorSink::default()),
        }
    }

    pub(crate) fn require_capabilities(
        &self,
        capabilities: Capabilities,
    ) -> Result<(), MissingCapability> {
        if self.capabilities.contains(capabilities) {
            Ok(())
        } else {
            Err(MissingCapability(capabilities - self.capabilities))
        }
    }

    /// Record an uncaptured validation error against this device.
    pub(crate) fn report_validation_error(&self, error: &dyn fmt::Display) {
        let message = error.to_string();
        log::error!("device validation error: {}", message);
        let mut sink = self.error_sink.lock();
        sink.last = Some(message);
        sink.total += 1;
    }

    /// The most recent uncaptured validation error, if any. Reading does not
    /// clear it.
    pub fn last_validation_error(&self) -> Option<String> {
        self.error_sink.lock().last.clone()
    }

    pub(crate) fn next_submission_index(&self) -> SubmissionIndex {
        self.active_submission_index.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Validation sequence for query-set creation; the first failing rule
    /// wins. Statistics-list validation happens before capability checks,
    /// and is insensitive to the order entries arrive in.
    pub(crate) fn create_query_set(
        &self,
        self_id: DeviceId,
        desc: &QuerySetDescriptor,
    ) -> Result<QuerySet, CreateQuerySetError> {
        use CreateQuerySetError as Error;

        let kind = conv::map_query_type(desc.ty)?;

        let mut statistics = SmallVec::new();
        match kind {
            QueryKind::PipelineStatistics => {
                if desc.pipeline_statistics.is_empty() {
                    return Err(Error::EmptyPipelineStatistics);
                }
                for &name in desc.pipeline_statistics.iter() {
                    statistics.push(conv::map_pipeline_statistic(name)?);
                }
                let mut seen = FastHashSet::default();
                for (&name, &statistic) in desc.pipeline_statistics.iter().zip(statistics.iter()) {
                    if !seen.insert(statistic) {
                        return Err(Error::DuplicatePipelineStatisticsName(name));
                    }
                }
            }
            _ => {
                if !desc.pipeline_statistics.is_empty() {
                    return Err(Error::UnnecessaryPipelineStatistics(kind));
                }
            }
        }

        match kind {
            QueryKind::Occlusion => {}
            QueryKind::PipelineStatistics => {
                self.require_capabilities(Capabilities::PIPELINE_STATISTICS_QUERY)?;
            }
            QueryKind::Timestamp => {
                self.require_capabilities(Capabilities::TIMESTAMP_QUERY)?;
            }
        }

        if desc.count == 0 || desc.count > self.limits.max_queries_per_query_set {
            return Err(Error::InvalidCount {
                count: desc.count,
                maximum: self.limits.max_queries_per_query_set,
            });
        }

        Ok(QuerySet {
            device_id: self_id,
            label: desc.label.borrow_or_default().to_string(),
            kind,
            count: desc.count,
            statistics,
        })
    }

    pub(crate) fn create_bind_group_layout(
        &self,
        self_id: DeviceId,
        desc: &binding_model::BindGroupLayoutDescriptor,
    ) -> Result<BindGroupLayout, binding_model::CreateBindGroupLayoutError> {
        let mut entries = FastHashMap::default();
        for entry in desc.entries.iter() {
            if entries.insert(entry.binding, entry.ty).is_some() {
                return Err(binding_model::CreateBindGroupLayoutError::ConflictBinding(
                    entry.binding,
                ));
            }
        }

        Ok(BindGroupLayout {
            device_id: self_id,
            label: desc.label.borrow_or_default().to_string(),
            entries,
            pool: Mutex::new(SlotPool::new(self.limits.max_bind_groups_per_layout)),
        })
    }
}
