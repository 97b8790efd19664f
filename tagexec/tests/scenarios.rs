//! End-to-end dispatch scenarios through the phase entry points.

use serde_json::json;
use std::sync::Arc;
use tagexec::{
    CapabilityIndex, DynExtension, Phase, PhaseSet, Route, Step, TagExecutor, TagExecutorConfig,
    testing::{CallLog, RecordingExtension},
};

mod common;
use common::{RequestCtx, ctx_resolver, scenario_executor, scenario_registry};

fn beta_plan() -> TagExecutorConfig {
    TagExecutorConfig::from_value(json!({
        "tag_execute_steps": [{
            "target_tag": "beta",
            "name": "s1",
            "plugins": [{"name": "rate-limit", "config": {"limit": 5}}]
        }]
    }))
    .unwrap()
}

#[test]
fn test_scenario_a_index_partition() {
    let log = CallLog::new();
    let executor = scenario_executor(&log);
    let index = executor.index();

    assert_eq!(index.names(Phase::Access), ["rate-limit", "transform"]);
    assert_eq!(index.names(Phase::Log), ["transform"]);
    assert!(index.names(Phase::HeaderFilter).is_empty());
}

#[tokio::test]
async fn test_scenario_b_tagged_route_runs_step_config() {
    let log = CallLog::new();
    let executor = scenario_executor(&log);
    let mut ctx = RequestCtx::for_route(Route::new("api").with_tag("beta"));

    executor.access(&beta_plan(), &mut ctx).await.unwrap();

    let calls = log.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].extension, "rate-limit");
    assert_eq!(calls[0].phase, Phase::Access);
    assert_eq!(calls[0].config, json!({"limit": 5}));
}

#[tokio::test]
async fn test_scenario_c_untagged_route_runs_nothing() {
    let log = CallLog::new();
    let executor = scenario_executor(&log);
    let mut ctx = RequestCtx::for_route(Route::new("api").with_tag("prod"));

    executor.access(&beta_plan(), &mut ctx).await.unwrap();

    assert!(log.is_empty());
}

#[tokio::test]
async fn test_scenario_d_phase_not_implemented() {
    let log = CallLog::new();
    let executor = scenario_executor(&log);
    let conf = TagExecutorConfig::new([Step::new("s1").with_plugin("transform", json!({"a": 1}))]);
    let mut ctx = RequestCtx::for_route(Route::new("api"));

    executor.header_filter(&conf, &mut ctx).await.unwrap();
    assert!(log.is_empty());

    // The same step is active and does run where transform has a handler.
    executor.log(&conf, &mut ctx).await.unwrap();
    assert_eq!(log.extensions(), ["transform"]);
}

#[tokio::test]
async fn test_empty_plan_never_invokes() {
    let log = CallLog::new();
    let executor = scenario_executor(&log);
    let conf = TagExecutorConfig::default();
    let mut ctx = RequestCtx::for_route(Route::new("api").with_tags(["beta", "prod"]));

    for phase in Phase::ALL {
        executor.run_phase(phase, &conf, &mut ctx).await.unwrap();
    }
    assert!(log.is_empty());
}

#[tokio::test]
async fn test_untagged_step_always_active() {
    let log = CallLog::new();
    let executor = scenario_executor(&log);
    let conf = TagExecutorConfig::new([Step::new("always").with_plugin("rate-limit", json!({}))]);

    for route in [
        Route::new("none"),
        Route::new("beta").with_tag("beta"),
        Route::new("many").with_tags(["a", "b", "c"]),
    ] {
        let mut ctx = RequestCtx::for_route(route);
        executor.access(&conf, &mut ctx).await.unwrap();
    }
    assert_eq!(log.len(), 3);
}

#[tokio::test]
async fn test_tag_match_is_case_sensitive() {
    let log = CallLog::new();
    let executor = scenario_executor(&log);
    let conf = TagExecutorConfig::new([Step::new("s1")
        .with_target_tag("Tag")
        .with_plugin("rate-limit", json!({}))]);

    let mut lower = RequestCtx::for_route(Route::new("lower").with_tag("tag"));
    executor.access(&conf, &mut lower).await.unwrap();
    assert!(log.is_empty());

    let mut exact = RequestCtx::for_route(Route::new("exact").with_tag("Tag"));
    executor.access(&conf, &mut exact).await.unwrap();
    assert_eq!(log.len(), 1);
}

#[tokio::test]
async fn test_invocations_follow_index_order_across_steps() {
    let log = CallLog::new();
    let executor = scenario_executor(&log);
    let conf = TagExecutorConfig::new([
        Step::new("s1")
            .with_plugin("unknown", json!("ignored"))
            .with_plugin("transform", json!("s1-transform"))
            .with_plugin("rate-limit", json!("s1-rate-limit")),
        Step::new("s2")
            .with_target_tag("missing")
            .with_plugin("rate-limit", json!("s2-rate-limit")),
        Step::new("s3").with_plugin("transform", json!("s3-transform")),
    ]);
    let mut ctx = RequestCtx::for_route(Route::new("api"));

    executor.access(&conf, &mut ctx).await.unwrap();

    let configs: Vec<_> = log.calls().into_iter().map(|call| call.config).collect();
    assert_eq!(
        configs,
        vec![
            json!("s1-rate-limit"),
            json!("s1-transform"),
            json!("s3-transform"),
        ]
    );

    // Every invoked extension is indexed for the phase.
    let indexed = executor.index().names(Phase::Access);
    assert!(log.extensions().iter().all(|name| indexed.contains(&name.as_str())));
}

#[tokio::test]
async fn test_self_reference_in_plan_is_ignored() {
    let log = CallLog::new();
    let mut registry = scenario_registry(&log);
    registry.insert(
        1,
        Arc::new(RecordingExtension::new("tag-executor", PhaseSet::all(), log.clone()))
            as Arc<dyn DynExtension<RequestCtx>>,
    );
    let executor = TagExecutor::new(&registry, ctx_resolver());
    let conf = TagExecutorConfig::new([Step::new("loop").with_plugin("tag-executor", json!({}))]);
    let mut ctx = RequestCtx::for_route(Route::new("api"));

    for phase in Phase::ALL {
        executor.run_phase(phase, &conf, &mut ctx).await.unwrap();
        assert!(!executor.index().contains(phase, "tag-executor"));
    }
    assert!(log.is_empty());
}

#[test]
fn test_rebuilding_index_is_structurally_identical() {
    let log = CallLog::new();
    let registry = scenario_registry(&log);

    let first = CapabilityIndex::from_registry(&registry, "tag-executor");
    let second = CapabilityIndex::from_registry(&registry, "tag-executor");
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_request_without_route_runs_nothing() {
    let log = CallLog::new();
    let executor = scenario_executor(&log);
    let conf = TagExecutorConfig::new([Step::new("s1").with_plugin("rate-limit", json!({}))]);
    let mut ctx = RequestCtx::default();

    executor.access(&conf, &mut ctx).await.unwrap();
    assert!(log.is_empty());
}
