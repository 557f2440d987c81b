// src/engine/orchestrator.rs

//! Runs an execution plan through a [`ScriptRunner`].

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::exec::{ScriptOutcome, ScriptRunner};
use crate::types::PackageName;

/// Final state of one planned package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageStatus {
    Succeeded,
    /// Exit code, `-1` when unknown or when the runner could not start it.
    Failed(i32),
    /// Started, then killed because another package failed.
    Cancelled,
    /// Never started.
    Skipped,
}

/// Per-package results, in plan order.
#[derive(Debug, Clone, Default)]
pub struct ExecutionReport {
    pub results: Vec<(PackageName, PackageStatus)>,
    /// First package observed failing, if any.
    pub first_failure: Option<PackageName>,
    /// The shutdown token fired before the plan completed.
    pub interrupted: bool,
}

impl ExecutionReport {
    pub fn is_success(&self) -> bool {
        self.first_failure.is_none() && !self.interrupted
    }

    pub fn with_status(&self, wanted: impl Fn(PackageStatus) -> bool) -> Vec<&str> {
        self.results
            .iter()
            .filter(|(_, status)| wanted(*status))
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn succeeded(&self) -> Vec<&str> {
        self.with_status(|s| s == PackageStatus::Succeeded)
    }

    pub fn failed(&self) -> Vec<&str> {
        self.with_status(|s| matches!(s, PackageStatus::Failed(_)))
    }

    /// Packages that did not run to completion: cancelled or never started.
    pub fn not_completed(&self) -> Vec<&str> {
        self.with_status(|s| matches!(s, PackageStatus::Cancelled | PackageStatus::Skipped))
    }

    fn skip_all(&mut self, packages: &[PackageName]) {
        self.results.extend(
            packages
                .iter()
                .map(|package| (package.clone(), PackageStatus::Skipped)),
        );
    }
}

/// Run every package in order, one at a time, stopping at the first
/// failure or when `shutdown` fires. Everything after the stopping point is
/// reported as skipped.
pub async fn run_sequential<R>(
    runner: &R,
    packages: &[PackageName],
    script: &str,
    shutdown: &CancellationToken,
) -> ExecutionReport
where
    R: ScriptRunner + ?Sized,
{
    let mut report = ExecutionReport::default();

    for (position, package) in packages.iter().enumerate() {
        if shutdown.is_cancelled() {
            warn!(package = %package, "shutdown requested; not starting remaining packages");
            report.interrupted = true;
            report.skip_all(&packages[position..]);
            break;
        }

        debug!(package = %package, position, "running script sequentially");

        let outcome = invoke(runner, package, script, shutdown.child_token()).await;
        let status = status_of(outcome);
        report.results.push((package.clone(), status));

        match status {
            PackageStatus::Succeeded => {}
            PackageStatus::Cancelled | PackageStatus::Skipped => {
                warn!(package = %package, "script stopped by shutdown");
                report.interrupted = true;
                report.skip_all(&packages[position + 1..]);
                break;
            }
            PackageStatus::Failed(_) => {
                error!(package = %package, ?status, "script failed; stopping");
                report.first_failure = Some(package.clone());
                report.skip_all(&packages[position + 1..]);
                break;
            }
        }
    }

    report
}

/// Start the package at position `i` after `i × stagger`, let them run
/// concurrently, and cancel all others as soon as one fails or `shutdown`
/// fires.
pub async fn run_staggered<R>(
    runner: Arc<R>,
    packages: &[PackageName],
    script: &str,
    stagger: Duration,
    shutdown: &CancellationToken,
) -> ExecutionReport
where
    R: ScriptRunner + ?Sized + 'static,
{
    let cancel = shutdown.child_token();
    let mut join_set = JoinSet::new();

    for (position, package) in packages.iter().enumerate() {
        let delay = stagger.saturating_mul(u32::try_from(position).unwrap_or(u32::MAX));
        let runner = Arc::clone(&runner);
        let cancel = cancel.clone();
        let package = package.clone();
        let script = script.to_string();

        join_set.spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {
                    return (position, PackageStatus::Skipped);
                }
                _ = tokio::time::sleep(delay) => {}
            }
            if cancel.is_cancelled() {
                return (position, PackageStatus::Skipped);
            }

            debug!(package = %package, position, ?delay, "starting staggered script");
            let outcome = invoke(runner.as_ref(), &package, &script, cancel.clone()).await;
            (position, status_of(outcome))
        });
    }

    let mut statuses: Vec<Option<PackageStatus>> = vec![None; packages.len()];
    let mut first_failure = None;

    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok((position, status)) => {
                statuses[position] = Some(status);

                if matches!(status, PackageStatus::Failed(_)) && first_failure.is_none() {
                    error!(
                        package = %packages[position],
                        ?status,
                        "script failed; cancelling remaining packages"
                    );
                    first_failure = Some(packages[position].clone());
                    cancel.cancel();
                }
            }
            Err(join_err) => {
                // The position is lost with the panic; it is filled in below.
                warn!(error = %join_err, "script task panicked; cancelling remaining packages");
                cancel.cancel();
            }
        }
    }

    let results: Vec<(PackageName, PackageStatus)> = packages
        .iter()
        .cloned()
        .zip(statuses)
        .map(|(package, status)| (package, status.unwrap_or(PackageStatus::Failed(-1))))
        .collect();

    if first_failure.is_none() {
        first_failure = results
            .iter()
            .find(|(_, status)| matches!(status, PackageStatus::Failed(_)))
            .map(|(name, _)| name.clone());
    }

    let interrupted = shutdown.is_cancelled();
    info!(
        total = results.len(),
        success = first_failure.is_none() && !interrupted,
        interrupted,
        "staggered run finished"
    );

    ExecutionReport {
        results,
        first_failure,
        interrupted,
    }
}

async fn invoke<R>(runner: &R, package: &str, script: &str, cancel: CancellationToken) -> ScriptOutcome
where
    R: ScriptRunner + ?Sized,
{
    match runner.run_script(package, script, cancel).await {
        Ok(outcome) => outcome,
        Err(err) => {
            error!(package = %package, error = %err, "could not run script");
            ScriptOutcome::Failed(-1)
        }
    }
}

fn status_of(outcome: ScriptOutcome) -> PackageStatus {
    match outcome {
        ScriptOutcome::Success => PackageStatus::Succeeded,
        ScriptOutcome::Failed(code) => PackageStatus::Failed(code),
        ScriptOutcome::Cancelled => PackageStatus::Cancelled,
    }
}
