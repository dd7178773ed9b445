//! Query-set creation validation, covering the full rule sequence and the
//! destruction lifecycle.

use std::borrow::Cow;

use valet::{
    device::DeviceDescriptor,
    global::Global,
    id::DeviceId,
    resource::{CreateQuerySetError, DestroyError, QuerySetDescriptor},
    types::{
        Capabilities, Limits, PipelineStatistic, PipelineStatisticName, QueryKind, QueryType,
        QUERY_SET_MAX_QUERIES,
    },
};

fn device_with(global: &Global, capabilities: Capabilities) -> DeviceId {
    global.create_device(&DeviceDescriptor {
        label: Some(Cow::Borrowed("test-device")),
        capabilities,
        limits: Limits::default(),
    })
}

fn desc<'a>(
    ty: QueryType,
    count: u32,
    statistics: &'a [PipelineStatisticName],
) -> QuerySetDescriptor<'a> {
    QuerySetDescriptor {
        label: None,
        ty,
        count,
        pipeline_statistics: Cow::Borrowed(statistics),
    }
}

#[test]
fn occlusion_needs_no_capability() {
    let global = Global::new();
    let device = device_with(&global, Capabilities::empty());

    let (id, error) = global.device_create_query_set(device, &desc(QueryType::OCCLUSION, 4, &[]));
    assert!(error.is_none());

    let description = global.query_set_describe(id).unwrap();
    assert_eq!(description.kind, QueryKind::Occlusion);
    assert_eq!(description.count, 4);
    assert!(description.statistics.is_empty());
}

#[test]
fn timestamp_capability_is_enforced() {
    let global = Global::new();
    let device = device_with(&global, Capabilities::empty());

    let (id, error) = global.device_create_query_set(device, &desc(QueryType::TIMESTAMP, 1, &[]));
    match error {
        Some(CreateQuerySetError::MissingCapability(missing)) => {
            assert_eq!(missing.0, Capabilities::TIMESTAMP_QUERY);
        }
        other => panic!("unexpected result: {:?}", other),
    }
    // the id minted for the failed creation is not usable
    assert!(global.query_set_describe(id).is_err());

    let capable = device_with(&global, Capabilities::TIMESTAMP_QUERY);
    let (_, error) = global.device_create_query_set(capable, &desc(QueryType::TIMESTAMP, 1, &[]));
    assert!(error.is_none());
}

#[test]
fn pipeline_statistics_capability_is_enforced() {
    let global = Global::new();
    let statistics = [PipelineStatisticName::VERTEX_SHADER_INVOCATIONS];

    let device = device_with(&global, Capabilities::empty());
    let (_, error) =
        global.device_create_query_set(device, &desc(QueryType::PIPELINE_STATISTICS, 1, &statistics));
    assert!(matches!(
        error,
        Some(CreateQuerySetError::MissingCapability(_))
    ));

    let capable = device_with(&global, Capabilities::PIPELINE_STATISTICS_QUERY);
    let (id, error) =
        global.device_create_query_set(capable, &desc(QueryType::PIPELINE_STATISTICS, 1, &statistics));
    assert!(error.is_none());
    let description = global.query_set_describe(id).unwrap();
    assert_eq!(
        description.statistics,
        vec![PipelineStatistic::VertexShaderInvocations]
    );
}

#[test]
fn undefined_query_type_is_rejected() {
    let global = Global::new();
    let device = device_with(&global, Capabilities::all());

    let (_, error) =
        global.device_create_query_set(device, &desc(QueryType(0xffff_ffff), 1, &[]));
    assert!(matches!(
        error,
        Some(CreateQuerySetError::InvalidQueryType(QueryType(0xffff_ffff)))
    ));
}

#[test]
fn empty_statistics_beats_missing_capability() {
    let global = Global::new();
    // No pipeline-statistics capability; the list rules are still checked
    // first.
    let device = device_with(&global, Capabilities::empty());

    let (_, error) =
        global.device_create_query_set(device, &desc(QueryType::PIPELINE_STATISTICS, 1, &[]));
    assert!(matches!(
        error,
        Some(CreateQuerySetError::EmptyPipelineStatistics)
    ));
}

#[test]
fn invalid_statistic_name_beats_duplicates() {
    let global = Global::new();
    let device = device_with(&global, Capabilities::all());

    let statistics = [
        PipelineStatisticName::VERTEX_SHADER_INVOCATIONS,
        PipelineStatisticName::VERTEX_SHADER_INVOCATIONS,
        PipelineStatisticName(99),
    ];
    let (_, error) =
        global.device_create_query_set(device, &desc(QueryType::PIPELINE_STATISTICS, 1, &statistics));
    assert!(matches!(
        error,
        Some(CreateQuerySetError::InvalidPipelineStatisticsName(
            PipelineStatisticName(99)
        ))
    ));
}

#[test]
fn duplicate_statistics_are_rejected() {
    let global = Global::new();
    let device = device_with(&global, Capabilities::all());

    let statistics = [
        PipelineStatisticName::VERTEX_SHADER_INVOCATIONS,
        PipelineStatisticName::CLIPPER_INVOCATIONS,
        PipelineStatisticName::VERTEX_SHADER_INVOCATIONS,
    ];
    let (_, error) =
        global.device_create_query_set(device, &desc(QueryType::PIPELINE_STATISTICS, 1, &statistics));
    assert!(matches!(
        error,
        Some(CreateQuerySetError::DuplicatePipelineStatisticsName(
            PipelineStatisticName::VERTEX_SHADER_INVOCATIONS
        ))
    ));
}

#[test]
fn statistics_order_does_not_matter() {
    let global = Global::new();
    let device = device_with(&global, Capabilities::all());

    let forward = [
        PipelineStatisticName::VERTEX_SHADER_INVOCATIONS,
        PipelineStatisticName::FRAGMENT_SHADER_INVOCATIONS,
        PipelineStatisticName::COMPUTE_SHADER_INVOCATIONS,
    ];
    let mut reverse = forward;
    reverse.reverse();

    for statistics in [&forward, &reverse] {
        let (id, error) = global
            .device_create_query_set(device, &desc(QueryType::PIPELINE_STATISTICS, 1, statistics));
        assert!(error.is_none());
        let description = global.query_set_describe(id).unwrap();
        assert_eq!(description.statistics.len(), 3);
    }
}

#[test]
fn unnecessary_statistics_are_rejected() {
    let global = Global::new();
    let statistics = [PipelineStatisticName::CLIPPER_INVOCATIONS];

    let device = device_with(&global, Capabilities::empty());
    let (_, error) =
        global.device_create_query_set(device, &desc(QueryType::OCCLUSION, 1, &statistics));
    assert!(matches!(
        error,
        Some(CreateQuerySetError::UnnecessaryPipelineStatistics(
            QueryKind::Occlusion
        ))
    ));

    // reported even when the timestamp capability itself is absent; the
    // statistics rules run before the capability check
    let (_, error) =
        global.device_create_query_set(device, &desc(QueryType::TIMESTAMP, 1, &statistics));
    assert!(matches!(
        error,
        Some(CreateQuerySetError::UnnecessaryPipelineStatistics(
            QueryKind::Timestamp
        ))
    ));
}

#[test]
fn count_bounds() {
    let global = Global::new();
    let device = device_with(&global, Capabilities::all());

    let (_, error) = global.device_create_query_set(device, &desc(QueryType::OCCLUSION, 0, &[]));
    assert!(matches!(
        error,
        Some(CreateQuerySetError::InvalidCount { count: 0, .. })
    ));

    let (_, error) = global.device_create_query_set(
        device,
        &desc(QueryType::OCCLUSION, QUERY_SET_MAX_QUERIES, &[]),
    );
    assert!(error.is_none());

    let (_, error) = global.device_create_query_set(
        device,
        &desc(QueryType::OCCLUSION, QUERY_SET_MAX_QUERIES + 1, &[]),
    );
    assert!(matches!(
        error,
        Some(CreateQuerySetError::InvalidCount { .. })
    ));

    // the capability check precedes the count check
    let bare = device_with(&global, Capabilities::empty());
    let (_, error) = global.device_create_query_set(bare, &desc(QueryType::TIMESTAMP, 0, &[]));
    assert!(matches!(
        error,
        Some(CreateQuerySetError::MissingCapability(_))
    ));
}

#[test]
fn destroy_is_idempotent() {
    let global = Global::new();
    let device = device_with(&global, Capabilities::empty());

    let (id, error) = global.device_create_query_set(device, &desc(QueryType::OCCLUSION, 1, &[]));
    assert!(error.is_none());

    assert!(global.query_set_destroy(id).is_ok());
    assert!(global.query_set_destroy(id).is_ok());
    assert!(global.query_set_describe(id).is_err());
}

#[test]
fn destroying_a_failed_creation_is_an_error() {
    let global = Global::new();
    let device = device_with(&global, Capabilities::empty());

    let (id, error) = global.device_create_query_set(device, &desc(QueryType::TIMESTAMP, 1, &[]));
    assert!(error.is_some());
    assert_eq!(global.query_set_destroy(id), Err(DestroyError::Invalid));
}

#[test]
fn creation_failures_escalate_to_the_device() {
    let global = Global::new();
    let device = device_with(&global, Capabilities::empty());
    assert!(global.device_last_validation_error(device).is_none());

    let (_, error) = global.device_create_query_set(device, &desc(QueryType::TIMESTAMP, 1, &[]));
    let message = global.device_last_validation_error(device).unwrap();
    assert_eq!(message, error.unwrap().to_string());
}
