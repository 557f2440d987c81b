mod common;
use crate::common::*;

use std::sync::Arc;
use std::time::Duration;

use wsrun::engine::{PackageStatus, run_staggered};
use wsrun::errors::WsrunError;
use wsrun::exec::ScriptOutcome;
use wsrun::run_workspace;

fn independent(names: &[&str]) -> WorkspaceFixture {
    names
        .iter()
        .fold(WorkspaceBuilder::new(), |builder, name| {
            builder.package(name, &[], &["dev"])
        })
        .build()
}

#[tokio::test]
async fn test_starts_are_staggered_in_plan_order() {
    init_tracing();

    let ws = independent(&["a", "b", "c"]);
    let runner = Arc::new(FakeScriptRunner::new());
    let request = PlanRequestBuilder::new("dev").build();

    let report = with_timeout(run_workspace(
        &ws.info,
        &ws,
        Arc::clone(&runner),
        &request,
        staggered(Duration::from_millis(100)),
        &no_shutdown(),
    ))
    .await
    .expect("all scripts succeed");

    assert!(report.is_success());
    assert_eq!(report.succeeded(), vec!["a", "b", "c"]);

    let a = runner.start_offset("a").unwrap();
    let b = runner.start_offset("b").unwrap();
    let c = runner.start_offset("c").unwrap();

    assert!(a < Duration::from_millis(100), "a started late: {a:?}");
    assert!(b >= Duration::from_millis(100), "b started early: {b:?}");
    assert!(c >= Duration::from_millis(200), "c started early: {c:?}");
    assert!(a < b && b < c);
}

#[tokio::test]
async fn test_zero_stagger_runs_everything_concurrently() {
    init_tracing();

    let packages: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
    let runner = Arc::new(FakeScriptRunner::with_behaviours(behaviours(&[
        ("a", 300, None),
        ("b", 300, None),
        ("c", 300, None),
        ("d", 300, None),
    ])));

    let started = tokio::time::Instant::now();
    let report = with_timeout(run_staggered(
        Arc::clone(&runner),
        &packages,
        "dev",
        Duration::ZERO,
        &no_shutdown(),
    ))
    .await;

    assert!(report.is_success());
    assert_eq!(report.succeeded().len(), 4);
    assert!(
        started.elapsed() < Duration::from_millis(1000),
        "scripts did not overlap"
    );
}

#[tokio::test]
async fn test_first_failure_cancels_running_and_pending_packages() {
    init_tracing();

    let ws = independent(&["a", "b", "c"]);
    // a is long-running, b fails shortly after it starts at 100ms, c would
    // only start at 200ms.
    let runner = Arc::new(FakeScriptRunner::with_behaviours(behaviours(&[
        ("a", 5_000, None),
        ("b", 10, Some(2)),
    ])));
    let request = PlanRequestBuilder::new("dev").build();

    let result = with_timeout(run_workspace(
        &ws.info,
        &ws,
        Arc::clone(&runner),
        &request,
        staggered(Duration::from_millis(100)),
        &no_shutdown(),
    ))
    .await;

    match result {
        Err(WsrunError::ScriptExecution {
            package, skipped, ..
        }) => {
            assert_eq!(package, "b");
            assert_eq!(skipped, vec!["a".to_string(), "c".to_string()]);
        }
        other => panic!("expected ScriptExecution error, got {other:?}"),
    }

    assert_eq!(runner.started(), vec!["a", "b"]);
    assert_eq!(runner.outcome_of("a"), Some(ScriptOutcome::Cancelled));
    assert_eq!(runner.outcome_of("b"), Some(ScriptOutcome::Failed(2)));
}

#[tokio::test]
async fn test_report_keeps_plan_order_and_statuses() {
    init_tracing();

    let packages: Vec<String> = ["x", "y", "z"].iter().map(|s| s.to_string()).collect();
    let runner = Arc::new(FakeScriptRunner::with_behaviours(behaviours(&[
        ("x", 5_000, None),
        ("y", 10, Some(1)),
    ])));

    let report = with_timeout(run_staggered(
        Arc::clone(&runner),
        &packages,
        "dev",
        Duration::from_millis(100),
        &no_shutdown(),
    ))
    .await;

    assert_eq!(report.first_failure.as_deref(), Some("y"));
    assert_eq!(
        report.results,
        vec![
            ("x".to_string(), PackageStatus::Cancelled),
            ("y".to_string(), PackageStatus::Failed(1)),
            ("z".to_string(), PackageStatus::Skipped),
        ]
    );
}

#[tokio::test]
async fn test_dependency_order_is_used_for_stagger_positions() {
    init_tracing();

    let ws = abc_chain();
    let runner = Arc::new(FakeScriptRunner::new());
    let request = PlanRequestBuilder::new("build").build();

    with_timeout(run_workspace(
        &ws.info,
        &ws,
        Arc::clone(&runner),
        &request,
        staggered(Duration::from_millis(50)),
        &no_shutdown(),
    ))
    .await
    .unwrap();

    assert_eq!(runner.started(), vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_shutdown_cancels_running_and_pending_packages() {
    init_tracing();

    let packages: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
    let runner = Arc::new(FakeScriptRunner::with_behaviours(behaviours(&[
        ("a", 5_000, None),
        ("b", 5_000, None),
    ])));

    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(150)).await;
        trigger.cancel();
    });

    let report = with_timeout(run_staggered(
        Arc::clone(&runner),
        &packages,
        "dev",
        Duration::from_millis(100),
        &shutdown,
    ))
    .await;

    assert!(report.interrupted);
    assert!(report.first_failure.is_none());
    assert!(!report.is_success());
    assert_eq!(
        report.results,
        vec![
            ("a".to_string(), PackageStatus::Cancelled),
            ("b".to_string(), PackageStatus::Cancelled),
            ("c".to_string(), PackageStatus::Skipped),
        ]
    );
}
