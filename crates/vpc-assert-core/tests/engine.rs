// crates/vpc-assert-core/tests/engine.rs
// ============================================================================
// Module: Evaluation Engine Tests
// Description: Concurrent execution, retries, timeouts, and plan ordering.
// Purpose: Ensure provider failures stay local and reports stay deterministic.
// Dependencies: vpc-assert-core, tokio, serde_json
// ============================================================================
//! ## Overview
//! Runs small plans against in-memory providers with tight limits.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use vpc_assert_core::ControlName;
use vpc_assert_core::ControlPlan;
use vpc_assert_core::Engine;
use vpc_assert_core::EngineConfig;
use vpc_assert_core::EvaluationPlan;
use vpc_assert_core::ExpectedState;
use vpc_assert_core::FieldCheck;
use vpc_assert_core::Finding;
use vpc_assert_core::FindingKind;
use vpc_assert_core::ProviderError;
use vpc_assert_core::ReportStatus;
use vpc_assert_core::ResourceClass;
use vpc_assert_core::ResourceFilter;
use vpc_assert_core::ResourceId;
use vpc_assert_core::Verdict;

use crate::common::FlakyProvider;
use crate::common::GaugeProvider;
use crate::common::RecordingAuditSink;
use crate::common::SlowProvider;
use crate::common::StaticProvider;
use crate::common::record;

const PROJECT: &str = "my-project-123";

/// Returns engine limits tuned for fast tests.
fn fast_config() -> EngineConfig {
    EngineConfig {
        max_workers: 4,
        fetch_timeout: Duration::from_millis(200),
        max_retries: 2,
        retry_backoff: Duration::from_millis(1),
    }
}

/// Builds a plan with a network check, a precomputed finding, and a route check.
fn sample_plan() -> EvaluationPlan {
    let mut networks = ControlPlan::new(ControlName::new("networks"), "Network shape");
    networks.push_resource(
        ExpectedState::new(
            ControlName::new("networks"),
            "network",
            ResourceClass::Network,
            ResourceFilter::project(PROJECT).named("prod-net"),
        )
        .expect(FieldCheck::equals("routing_config.routing_mode", "GLOBAL")),
    );
    let mut outputs = ControlPlan::new(ControlName::new("outputs"), "Outputs");
    outputs.push_findings(vec![
        Finding::new(
            &ControlName::new("outputs"),
            &ResourceId::new("output.self_link"),
            FindingKind::Structural,
        )
        .with_message("ok"),
    ]);
    outputs.push_findings(Vec::new());
    let mut routes = ControlPlan::new(ControlName::new("routes"), "Routes");
    routes.push_resource(
        ExpectedState::new(
            ControlName::new("routes"),
            "private-api-route",
            ResourceClass::Route,
            ResourceFilter::project(PROJECT).named("prod-net-private-apis"),
        )
        .expect(FieldCheck::equals("dest_range", "199.36.153.8/30")),
    );
    EvaluationPlan {
        controls: vec![networks, outputs, routes],
    }
}

/// Returns records satisfying [`sample_plan`].
fn sample_records() -> Vec<vpc_assert_core::ObservedResource> {
    vec![
        record(
            ResourceClass::Network,
            json!({"name": "prod-net", "project": PROJECT, "routing_config": {"routing_mode": "GLOBAL"}}),
        ),
        record(
            ResourceClass::Route,
            json!({"name": "prod-net-private-apis", "project": PROJECT, "dest_range": "199.36.153.8/30"}),
        ),
    ]
}

// ============================================================================
// SECTION: Execution
// ============================================================================

/// Verifies a passing plan produces findings in plan order.
#[tokio::test(flavor = "multi_thread")]
async fn run_preserves_plan_order() {
    let provider = Arc::new(StaticProvider::new(sample_records()));
    let plan = sample_plan();
    assert_eq!(plan.check_count(), 3);
    let report = Engine::new(provider, fast_config()).run(&plan).await;
    assert_eq!(report.status, ReportStatus::Pass);
    let controls: Vec<_> = report.findings.iter().map(|f| f.control.as_str()).collect();
    assert_eq!(controls, vec!["networks", "networks", "outputs", "routes", "routes"]);
}

/// Verifies concurrent and sequential runs agree, digest included.
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_and_sequential_runs_agree() {
    let plan = sample_plan();
    let concurrent = Engine::new(Arc::new(StaticProvider::new(sample_records())), fast_config())
        .run(&plan)
        .await;
    let sequential = Engine::new(Arc::new(StaticProvider::new(sample_records())), fast_config())
        .run_sequential(&plan);
    assert_eq!(concurrent.findings, sequential.findings);
    assert_eq!(concurrent.digest, sequential.digest);
}

/// Verifies transient errors are retried until the provider recovers.
#[tokio::test(flavor = "multi_thread")]
async fn transient_errors_are_retried() {
    let provider = Arc::new(FlakyProvider::new(
        sample_records(),
        2,
        ProviderError::Transport("connection reset".to_string()),
    ));
    let mut plan = sample_plan();
    plan.controls.truncate(1);
    let report = Engine::new(Arc::clone(&provider), fast_config()).run(&plan).await;
    assert_eq!(report.status, ReportStatus::Pass);
    assert_eq!(provider.calls(), 3);
}

/// Verifies retries stop at the cap and produce one provider finding.
#[tokio::test(flavor = "multi_thread")]
async fn retries_are_capped() {
    let provider = Arc::new(FlakyProvider::new(
        sample_records(),
        10,
        ProviderError::Transport("connection reset".to_string()),
    ));
    let mut plan = sample_plan();
    plan.controls.truncate(1);
    let report = Engine::new(Arc::clone(&provider), fast_config()).run(&plan).await;
    assert_eq!(provider.calls(), 3);
    assert_eq!(report.status, ReportStatus::Error);
    assert_eq!(report.findings.len(), 1);
    assert_eq!(report.findings[0].kind, FindingKind::Provider);
    assert_eq!(report.findings[0].verdict, Verdict::Error);
}

/// Verifies permanent errors are not retried.
#[tokio::test(flavor = "multi_thread")]
async fn auth_errors_are_not_retried() {
    let provider = Arc::new(FlakyProvider::new(
        sample_records(),
        1,
        ProviderError::Auth("token rejected".to_string()),
    ));
    let mut plan = sample_plan();
    plan.controls.truncate(1);
    let report = Engine::new(Arc::clone(&provider), fast_config()).run(&plan).await;
    assert_eq!(provider.calls(), 1);
    assert_eq!(report.findings[0].observed, json!({"error": "auth"}));
}

/// Verifies a slow fetch times out without affecting other checks.
#[tokio::test(flavor = "multi_thread")]
async fn timeout_is_local_to_one_check() {
    let provider = Arc::new(SlowProvider {
        inner: StaticProvider::new(sample_records()),
        slow_class: ResourceClass::Route,
        delay: Duration::from_millis(400),
    });
    let config = EngineConfig {
        fetch_timeout: Duration::from_millis(50),
        max_retries: 0,
        ..fast_config()
    };
    let report = Engine::new(provider, config).run(&sample_plan()).await;
    assert_eq!(report.status, ReportStatus::Error);
    let routes: Vec<_> = report.findings.iter().filter(|f| f.control.as_str() == "routes").collect();
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].kind, FindingKind::Provider);
    assert!(routes[0].message.contains("timed out"));
    assert!(
        report
            .findings
            .iter()
            .filter(|f| f.control.as_str() != "routes")
            .all(Finding::passed)
    );
}

/// Verifies timed-out calls keep their worker slot until they return.
#[tokio::test(flavor = "multi_thread")]
async fn timed_out_calls_stay_within_worker_limit() {
    let provider = Arc::new(GaugeProvider::new(sample_records(), Duration::from_millis(300)));
    let config = EngineConfig {
        max_workers: 1,
        fetch_timeout: Duration::from_millis(40),
        max_retries: 2,
        retry_backoff: Duration::from_millis(1),
    };
    let report = Engine::new(Arc::clone(&provider), config).run(&sample_plan()).await;
    assert_eq!(report.status, ReportStatus::Error);
    assert!(provider.peak() <= 1, "peak {}", provider.peak());
    assert_eq!(provider.calls(), 2, "retries wait on the call in flight");
}

/// Verifies the sequential path enforces the fetch timeout.
#[test]
fn sequential_run_times_out_hung_provider() {
    let provider = Arc::new(SlowProvider {
        inner: StaticProvider::new(sample_records()),
        slow_class: ResourceClass::Route,
        delay: Duration::from_secs(5),
    });
    let config = EngineConfig {
        fetch_timeout: Duration::from_millis(50),
        max_retries: 1,
        ..fast_config()
    };
    let started = std::time::Instant::now();
    let report = Engine::new(provider, config).run_sequential(&sample_plan());
    assert!(started.elapsed() < Duration::from_secs(2), "took {:?}", started.elapsed());
    assert_eq!(report.status, ReportStatus::Error);
    let routes: Vec<_> = report.findings.iter().filter(|f| f.control.as_str() == "routes").collect();
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].kind, FindingKind::Provider);
    assert!(routes[0].message.contains("timed out"));
}

/// Verifies sequential retries never overlap provider calls.
#[test]
fn sequential_retries_do_not_overlap() {
    let provider = Arc::new(GaugeProvider::new(sample_records(), Duration::from_millis(150)));
    let config = EngineConfig {
        fetch_timeout: Duration::from_millis(40),
        max_retries: 2,
        ..fast_config()
    };
    let report = Engine::new(Arc::clone(&provider), config).run_sequential(&sample_plan());
    assert_eq!(report.status, ReportStatus::Error);
    assert_eq!(provider.peak(), 1);
}

/// Verifies run and fetch audit events are emitted.
#[tokio::test(flavor = "multi_thread")]
async fn audit_events_are_recorded() {
    let audit = Arc::new(RecordingAuditSink::default());
    let engine = Engine::new(Arc::new(StaticProvider::new(sample_records())), fast_config())
        .with_audit(Arc::clone(&audit) as Arc<dyn vpc_assert_core::AuditSink>);
    let _ = engine.run(&sample_plan()).await;
    let names = audit.event_names();
    assert_eq!(names.first().map(String::as_str), Some("run_started"));
    assert_eq!(names.last().map(String::as_str), Some("run_finished"));
    assert_eq!(names.iter().filter(|name| *name == "fetch").count(), 2);
}

/// Verifies the backoff doubles per retry.
#[test]
fn backoff_doubles() {
    let config = EngineConfig {
        retry_backoff: Duration::from_millis(250),
        ..EngineConfig::default()
    };
    assert_eq!(config.backoff(1), Duration::from_millis(250));
    assert_eq!(config.backoff(2), Duration::from_millis(500));
    assert_eq!(config.backoff(3), Duration::from_millis(1000));
}
