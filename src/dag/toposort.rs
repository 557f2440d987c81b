// src/dag/toposort.rs

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::dag::graph::DependencyGraph;
use crate::errors::{Result, WsrunError};
use crate::types::PackageName;

/// Total order over every package (and every name referenced by an edge)
/// such that each dependency precedes its dependents.
///
/// Nodes are inserted in sorted name order and edges in edge-list order, so
/// the same graph always yields the same order.
pub fn topological_order(graph: &DependencyGraph) -> Result<Vec<PackageName>> {
    // Edge direction: dependency -> dependent.
    let mut dag: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in graph.packages() {
        dag.add_node(name);
    }

    for edge in graph.edges() {
        dag.add_edge(edge.upstream.as_str(), edge.downstream.as_str(), ());
    }

    match toposort(&dag, None) {
        Ok(order) => Ok(order.into_iter().map(str::to_string).collect()),
        Err(cycle) => Err(WsrunError::Cycle(format!(
            "dependency cycle involving package '{}'",
            cycle.node_id()
        ))),
    }
}
