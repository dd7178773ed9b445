use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    device::MissingCapability,
    id::{markers, DeviceId, Marker},
    types::{PipelineStatistic, PipelineStatisticName, QueryKind, QueryType},
    Label,
};
use std::borrow::Cow;

/// Common interface for everything a [`Registry`] can hold.
///
/// [`Registry`]: crate::registry::Registry
pub trait Resource: Send + Sync + Sized + 'static {
    type Marker: Marker;
    const TYPE: &'static str;
    fn label(&self) -> &str;
}

/// A resource created on, and owned by, one device.
pub trait ParentDevice: Resource {
    fn device_id(&self) -> DeviceId;
}

#[derive(Clone, Debug)]
pub struct QuerySetDescriptor<'a> {
    pub label: Label<'a>,
    /// Kind of queries the set will hold. Raw on purpose: undefined values
    /// are rejected at creation, not at the type level.
    pub ty: QueryType,
    /// Number of query slots. Must be positive and within the device limit.
    pub count: u32,
    /// Statistics selected by a `PIPELINE_STATISTICS` set. Must be empty for
    /// every other kind.
    pub pipeline_statistics: Cow<'a, [PipelineStatisticName]>,
}

#[derive(Clone, Debug, Error)]
#[non_exhaustive]
pub enum CreateQuerySetError {
    #[error(transparent)]
    Device(#[from] crate::device::DeviceError),
    #[error("{0:?} is not a defined query type")]
    InvalidQueryType(QueryType),
    #[error("pipeline statistics query sets must select at least one statistic")]
    EmptyPipelineStatistics,
    #[error("{0:?} is not a defined pipeline statistic")]
    InvalidPipelineStatisticsName(PipelineStatisticName),
    #[error("pipeline statistic {0:?} is selected more than once")]
    DuplicatePipelineStatisticsName(PipelineStatisticName),
    #[error("query sets of type {0:?} must not select pipeline statistics")]
    UnnecessaryPipelineStatistics(QueryKind),
    #[error(transparent)]
    MissingCapability(#[from] MissingCapability),
    #[error("a query set cannot hold {count} queries; the count must be positive and at most {maximum}")]
    InvalidCount { count: u32, maximum: u32 },
}

/// A fixed-size array of GPU query slots of one kind.
///
/// Construction goes through [`Device::create_query_set`], which performs
/// the full validation sequence. Destruction is a registry transition; the
/// value itself is immutable once created.
///
/// [`Device::create_query_set`]: crate::device::Device::create_query_set
#[derive(Debug)]
pub struct QuerySet {
    pub(crate) device_id: DeviceId,
    pub(crate) label: String,
    pub(crate) kind: QueryKind,
    pub(crate) count: u32,
    pub(crate) statistics: SmallVec<[PipelineStatistic; 5]>,
}

impl Resource for QuerySet {
    type Marker = markers::QuerySet;
    const TYPE: &'static str = "QuerySet";
    fn label(&self) -> &str {
        &self.label
    }
}

impl ParentDevice for QuerySet {
    fn device_id(&self) -> DeviceId {
        self.device_id
    }
}

/// The caller-visible attributes of a live query set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuerySetDescription {
    pub kind: QueryKind,
    pub count: u32,
    pub statistics: Vec<PipelineStatistic>,
}

#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum DestroyError {
    #[error("resource is invalid")]
    Invalid,
}
