// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod types;
pub mod workspace;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::resolve_config;
use crate::dag::Origin;
use crate::engine::{
    ExecutionReport, PackageStatus, PlanRequest, ResolvedPlan, resolve_plan, run_sequential,
    run_staggered,
};
use crate::errors::WsrunError;
use crate::exec::{CommandScriptRunner, ScriptRunner};
use crate::fs::RealFileSystem;
use crate::types::{ExecutionMode, PackageName, Propagation};
use crate::workspace::{
    CommandWorkspaceProvider, ManifestReader, ScriptLookup, WorkspaceInfoProvider,
};

/// Execution settings after merging CLI flags over the config file.
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    pub mode: ExecutionMode,
    pub stagger: Duration,
    pub dry_run: bool,
}

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the package manager backed workspace provider and manifest reader
/// - the package manager backed script runner
pub async fn run(args: CliArgs) -> Result<()> {
    let root = match args.cwd.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("resolving current directory")?,
    };

    let cfg = resolve_config(args.config.as_deref(), &root)?;

    // `--stagger` only makes sense in parallel mode, so it implies it.
    let mode = if args.parallel || args.stagger.is_some() {
        ExecutionMode::Parallel
    } else {
        cfg.mode
    };
    let options = RunOptions {
        mode,
        stagger: args.stagger.unwrap_or(cfg.stagger),
        dry_run: args.dry_run,
    };

    let request = PlanRequest {
        script: args.script.clone(),
        filters: args.filters.clone(),
        propagation: Propagation {
            upstream: args.upstream,
            downstream: args.downstream,
        },
    };

    let provider = CommandWorkspaceProvider::new(root.clone(), cfg.workspace.info_command.clone());
    let manifests = ManifestReader::new(Arc::new(RealFileSystem), cfg.workspace.manifest.clone());
    let runner = Arc::new(CommandScriptRunner::new(
        root,
        cfg.workspace.script_command.clone(),
        cfg.prefix_output && mode == ExecutionMode::Parallel,
    ));

    // Scripts run in their own process groups and miss the terminal's
    // Ctrl-C, so it is forwarded through the shutdown token.
    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for Ctrl+C");
                return;
            }
            warn!("interrupted; stopping running scripts");
            shutdown.cancel();
        });
    }

    run_workspace(&provider, &manifests, runner, &request, options, &shutdown).await?;
    Ok(())
}

/// Resolve the plan for `request`, report it, and run it.
///
/// Returns the execution report on success; a failing package surfaces as
/// [`WsrunError::ScriptExecution`] after the report has been printed, and a
/// fired `shutdown` as [`WsrunError::Interrupted`].
pub async fn run_workspace<P, R>(
    provider: &P,
    scripts: &dyn ScriptLookup,
    runner: Arc<R>,
    request: &PlanRequest,
    options: RunOptions,
    shutdown: &CancellationToken,
) -> errors::Result<ExecutionReport>
where
    P: WorkspaceInfoProvider + ?Sized,
    R: ScriptRunner + ?Sized + 'static,
{
    let info = provider.workspace_info()?;
    let resolved = resolve_plan(&info, request, scripts)?;
    print_targets(&resolved);

    let plan = &resolved.plan;
    if plan.is_empty() {
        println!("No selected package defines script '{}'; nothing to run.", plan.script);
        return Ok(ExecutionReport::default());
    }

    if options.dry_run {
        print_dry_run(&resolved, &options);
        return Ok(ExecutionReport::default());
    }

    let names = plan.names();
    info!(
        script = %plan.script,
        packages = names.len(),
        mode = ?options.mode,
        "running script"
    );

    let report = match options.mode {
        ExecutionMode::Sequential => {
            run_sequential(runner.as_ref(), &names, &plan.script, shutdown).await
        }
        ExecutionMode::Parallel => {
            run_staggered(runner, &names, &plan.script, options.stagger, shutdown).await
        }
    };

    print_report(&report);

    let skipped: Vec<PackageName> = report
        .not_completed()
        .into_iter()
        .map(str::to_string)
        .collect();

    match report.first_failure.clone() {
        Some(package) => Err(WsrunError::ScriptExecution {
            package,
            script: plan.script.clone(),
            skipped,
        }),
        None if report.interrupted => Err(WsrunError::Interrupted { skipped }),
        None => Ok(report),
    }
}

/// Print which packages were selected, and which lack the script.
fn print_targets(resolved: &ResolvedPlan) {
    let groups = [
        (Origin::Primary, "Selected packages"),
        (Origin::Upstream, "Added as dependencies"),
        (Origin::Downstream, "Added as dependents"),
    ];

    for (origin, title) in groups {
        let names = resolved.targets_with_origin(origin);
        if !names.is_empty() {
            println!("{title}:");
            for name in names {
                println!("  - {name}");
            }
        }
    }

    for (origin, _) in groups {
        let missing = resolved.plan.missing_with_origin(origin);
        if !missing.is_empty() {
            println!(
                "Skipping {origin} packages without script '{}': {}",
                resolved.plan.script,
                missing.join(", ")
            );
        }
    }
}

fn print_dry_run(resolved: &ResolvedPlan, options: &RunOptions) {
    println!("wsrun dry-run");
    println!("  mode = {:?}", options.mode);
    if options.mode == ExecutionMode::Parallel {
        println!("  stagger = {:?}", options.stagger);
    }
    println!();

    println!("plan ({}):", resolved.plan.packages.len());
    for (position, package) in resolved.plan.packages.iter().enumerate() {
        println!("  {}. {} ({})", position + 1, package.name, package.origin);
    }

    debug!("dry-run complete (no execution)");
}

fn print_report(report: &ExecutionReport) {
    for (name, status) in &report.results {
        match status {
            PackageStatus::Succeeded => println!("ok      {name}"),
            PackageStatus::Failed(code) => println!("FAILED  {name} (exit code {code})"),
            PackageStatus::Cancelled => println!("killed  {name}"),
            PackageStatus::Skipped => println!("skipped {name}"),
        }
    }
}
