// src/dag/closure.rs

//! Upstream / downstream closure over the dependency graph.

use std::collections::{HashSet, VecDeque};

use crate::dag::graph::DependencyGraph;
use crate::types::PackageName;

/// Which edges a closure follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Declared dependencies (what a package needs).
    Upstream,
    /// Dependents (what needs a package).
    Downstream,
}

/// Packages reachable from `seeds` by repeatedly following `direction`,
/// in breadth-first discovery order, excluding the seeds themselves.
///
/// Every package is reported once, at first discovery, so diamonds and
/// cycles terminate.
pub fn closure(graph: &DependencyGraph, seeds: &[PackageName], direction: Direction) -> Vec<PackageName> {
    let mut visited: HashSet<PackageName> = seeds.iter().cloned().collect();
    let mut frontier: VecDeque<&str> = seeds.iter().map(|s| s.as_str()).collect();
    let mut discovered = Vec::new();

    while let Some(current) = frontier.pop_front() {
        let neighbours = match direction {
            Direction::Upstream => graph.dependencies_of(current),
            Direction::Downstream => graph.dependents_of(current),
        };

        for next in neighbours {
            if visited.insert(next.clone()) {
                discovered.push(next.clone());
                frontier.push_back(next.as_str());
            }
        }
    }

    discovered
}
