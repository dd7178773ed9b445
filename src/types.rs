//! API-level value types.
//!
//! The types that cross the API boundary come in two flavors. The raw,
//! C-header-shaped newtypes ([`QueryType`], [`PipelineStatisticName`]) can
//! hold any `u32` a caller hands us, so out-of-range values survive long
//! enough to be rejected with a proper validation error instead of being
//! unrepresentable. The validated enums ([`QueryKind`],
//! [`PipelineStatistic`]) are what the rest of the crate works with; the
//! mapping lives in `conv`.

use std::fmt;

/// Maximum number of queries a single query set may hold.
pub const QUERY_SET_MAX_QUERIES: u32 = 8192;

/// The kind of queries a query set holds, as supplied by the caller.
///
/// Values other than the associated constants are representable and fail
/// validation at query-set creation.
#[repr(transparent)]
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct QueryType(pub u32);

impl QueryType {
    pub const OCCLUSION: Self = Self(0);
    pub const PIPELINE_STATISTICS: Self = Self(1);
    pub const TIMESTAMP: Self = Self(2);
}

impl fmt::Debug for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::OCCLUSION => f.write_str("QueryType::OCCLUSION"),
            Self::PIPELINE_STATISTICS => f.write_str("QueryType::PIPELINE_STATISTICS"),
            Self::TIMESTAMP => f.write_str("QueryType::TIMESTAMP"),
            Self(other) => write!(f, "QueryType({})", other),
        }
    }
}

/// A pipeline statistic selected by a `PIPELINE_STATISTICS` query set,
/// as supplied by the caller.
#[repr(transparent)]
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct PipelineStatisticName(pub u32);

impl PipelineStatisticName {
    pub const VERTEX_SHADER_INVOCATIONS: Self = Self(0);
    pub const CLIPPER_INVOCATIONS: Self = Self(1);
    pub const CLIPPER_PRIMITIVES_OUT: Self = Self(2);
    pub const FRAGMENT_SHADER_INVOCATIONS: Self = Self(3);
    pub const COMPUTE_SHADER_INVOCATIONS: Self = Self(4);
}

impl fmt::Debug for PipelineStatisticName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match *self {
            Self::VERTEX_SHADER_INVOCATIONS => "VertexShaderInvocations",
            Self::CLIPPER_INVOCATIONS => "ClipperInvocations",
            Self::CLIPPER_PRIMITIVES_OUT => "ClipperPrimitivesOut",
            Self::FRAGMENT_SHADER_INVOCATIONS => "FragmentShaderInvocations",
            Self::COMPUTE_SHADER_INVOCATIONS => "ComputeShaderInvocations",
            Self(other) => return write!(f, "PipelineStatisticName({})", other),
        };
        write!(f, "PipelineStatisticName::{}", name)
    }
}

/// Validated query-set kind.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum QueryKind {
    Occlusion,
    PipelineStatistics,
    Timestamp,
}

/// Validated pipeline statistic.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PipelineStatistic {
    VertexShaderInvocations,
    ClipperInvocations,
    ClipperPrimitivesOut,
    FragmentShaderInvocations,
    ComputeShaderInvocations,
}

bitflags::bitflags! {
    /// Optional capabilities a device was created with.
    ///
    /// Immutable after device creation; consulted when validating query-set
    /// creation.
    pub struct Capabilities: u32 {
        /// Allows `PIPELINE_STATISTICS` query sets to be created.
        const PIPELINE_STATISTICS_QUERY = 1 << 0;
        /// Allows `TIMESTAMP` query sets to be created, and timestamps to be
        /// written into them from command encoders and passes.
        const TIMESTAMP_QUERY = 1 << 1;
    }
}

/// Per-device validation limits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Limits {
    /// Maximum value of `QuerySetDescriptor::count`.
    pub max_queries_per_query_set: u32,
    /// Maximum number of backing slots a single bind group layout's pool may
    /// grow to. Allocation beyond this reports resource exhaustion.
    pub max_bind_groups_per_layout: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_queries_per_query_set: QUERY_SET_MAX_QUERIES,
            max_bind_groups_per_layout: 1 << 20,
        }
    }
}
