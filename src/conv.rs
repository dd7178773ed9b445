//! Mapping from the raw, caller-shaped values to validated internal enums.

use crate::{
    resource::CreateQuerySetError,
    types::{PipelineStatistic, PipelineStatisticName, QueryKind, QueryType},
};

pub fn map_query_type(ty: QueryType) -> Result<QueryKind, CreateQuerySetError> {
    match ty {
        QueryType::OCCLUSION => Ok(QueryKind::Occlusion),
        QueryType::PIPELINE_STATISTICS => Ok(QueryKind::PipelineStatistics),
        QueryType::TIMESTAMP => Ok(QueryKind::Timestamp),
        other => Err(CreateQuerySetError::InvalidQueryType(other)),
    }
}

pub fn map_pipeline_statistic(
    name: PipelineStatisticName,
) -> Result<PipelineStatistic, CreateQuerySetError> {
    match name {
        PipelineStatisticName::VERTEX_SHADER_INVOCATIONS => {
            Ok(PipelineStatistic::VertexShaderInvocations)
        }
        PipelineStatisticName::CLIPPER_INVOCATIONS => Ok(PipelineStatistic::ClipperInvocations),
        PipelineStatisticName::CLIPPER_PRIMITIVES_OUT => {
            Ok(PipelineStatistic::ClipperPrimitivesOut)
        }
        PipelineStatisticName::FRAGMENT_SHADER_INVOCATIONS => {
            Ok(PipelineStatistic::FragmentShaderInvocations)
        }
        PipelineStatisticName::COMPUTE_SHADER_INVOCATIONS => {
            Ok(PipelineStatistic::ComputeShaderInvocations)
        }
        other => Err(CreateQuerySetError::InvalidPipelineStatisticsName(other)),
    }
}
