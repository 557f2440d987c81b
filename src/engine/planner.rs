// src/engine/planner.rs

//! Pure planning pipeline: workspace snapshot in, execution plan out.
//!
//! No processes and no filesystem access happen here beyond the injected
//! [`ScriptLookup`], which keeps the whole pipeline unit-testable.

use tracing::{debug, info};

use crate::dag::{
    DependencyGraph, Direction, ExecutionPlan, Origin, PackageFilter, TargetSet, closure,
    topological_order,
};
use crate::errors::Result;
use crate::types::{PackageName, Propagation};
use crate::workspace::{ScriptLookup, WorkspaceInfo};

/// What the user asked for.
#[derive(Debug, Clone)]
pub struct PlanRequest {
    pub script: String,
    /// Package name regexes, OR-combined. Empty means every package.
    pub filters: Vec<String>,
    pub propagation: Propagation,
}

/// Everything the driver needs to report and run.
#[derive(Debug, Clone)]
pub struct ResolvedPlan {
    pub targets: TargetSet,
    pub plan: ExecutionPlan,
}

impl ResolvedPlan {
    pub fn targets_with_origin(&self, origin: Origin) -> Vec<&str> {
        self.targets.with_origin(origin)
    }
}

/// Build the graph, select and expand targets, order them and keep the
/// ones defining the script.
///
/// Upstream expansion is merged before downstream expansion, so a package
/// reachable both ways is labelled [`Origin::Upstream`].
pub fn resolve_plan(
    info: &WorkspaceInfo,
    request: &PlanRequest,
    scripts: &dyn ScriptLookup,
) -> Result<ResolvedPlan> {
    let filter = PackageFilter::new(&request.filters)?;
    let graph = DependencyGraph::from_workspace(info);
    debug!(
        packages = graph.len(),
        edges = graph.edges().len(),
        "dependency graph built"
    );

    let primary = filter.select(graph.packages())?;
    let targets = expand_targets(&graph, primary, request.propagation);

    let order = topological_order(&graph)?;

    let plan = ExecutionPlan::build(&order, &targets, &request.script, |name| {
        graph
            .location_of(name)
            .is_some_and(|location| scripts.has_script(location, &request.script))
    });

    info!(
        script = %request.script,
        targets = targets.len(),
        runnable = plan.packages.len(),
        missing_script = plan.missing_script.len(),
        "execution plan resolved"
    );

    Ok(ResolvedPlan { targets, plan })
}

/// Primary packages plus the requested closures, first-seen wins.
pub fn expand_targets(
    graph: &DependencyGraph,
    primary: Vec<PackageName>,
    propagation: Propagation,
) -> TargetSet {
    let mut targets = TargetSet::new();
    targets.extend(primary.iter().cloned(), Origin::Primary);

    if propagation.upstream {
        let upstream = closure(graph, &primary, Direction::Upstream);
        debug!(?upstream, "upstream closure");
        targets.extend(upstream, Origin::Upstream);
    }

    if propagation.downstream {
        let downstream = closure(graph, &primary, Direction::Downstream);
        debug!(?downstream, "downstream closure");
        targets.extend(downstream, Origin::Downstream);
    }

    targets
}
