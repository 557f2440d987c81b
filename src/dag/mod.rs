// src/dag/mod.rs

//! Dependency graph resolution.
//!
//! - [`graph`] builds the package graph and its inverse from workspace info.
//! - [`closure`] expands a seed set upstream or downstream.
//! - [`toposort`] orders packages so dependencies come first.
//! - [`targets`] selects packages by name and derives the execution plan.

pub mod closure;
pub mod graph;
pub mod targets;
pub mod toposort;

pub use closure::{Direction, closure};
pub use graph::{DependencyGraph, Edge};
pub use targets::{ExecutionPlan, Origin, PackageFilter, PlannedPackage, TargetSet};
pub use toposort::topological_order;
