// src/engine/mod.rs

//! Orchestration engine for wsrun.
//!
//! - [`planner`] is the pure pipeline from workspace info to an ordered
//!   [`ExecutionPlan`](crate::dag::ExecutionPlan).
//! - [`orchestrator`] runs that plan sequentially or staggered-parallel
//!   through a [`ScriptRunner`](crate::exec::ScriptRunner).

pub mod orchestrator;
pub mod planner;

pub use orchestrator::{ExecutionReport, PackageStatus, run_sequential, run_staggered};
pub use planner::{PlanRequest, ResolvedPlan, expand_targets, resolve_plan};
