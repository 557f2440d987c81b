// src/dag/graph.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::types::PackageName;
use crate::workspace::WorkspaceInfo;

/// `downstream` depends on `upstream`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge {
    pub upstream: PackageName,
    pub downstream: PackageName,
}

/// Internal node structure: stores immediate deps and dependents.
#[derive(Debug, Clone)]
struct PackageNode {
    location: PathBuf,
    /// Declared workspace dependencies (upstream).
    deps: Vec<PackageName>,
    /// Packages declaring a dependency on this one (downstream).
    dependents: Vec<PackageName>,
}

/// Dependency graph of the workspace, keyed by package name.
///
/// Built once per invocation from a single [`WorkspaceInfo`] snapshot and
/// never mutated afterwards.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    nodes: BTreeMap<PackageName, PackageNode>,
    edges: Vec<Edge>,
}

/// Forward edge list: one `(D, P)` edge per declared dependency `D` of `P`.
///
/// Duplicate declarations produce duplicate edges. Dependencies that are not
/// packages of `info` are logged and left out.
pub fn edges_from(info: &WorkspaceInfo) -> Vec<Edge> {
    info.iter()
        .flat_map(|(name, record)| {
            record
                .workspace_dependencies
                .iter()
                .filter(move |dep| {
                    let known = info.contains_key(dep.as_str());
                    if !known {
                        warn!(
                            package = %name,
                            dependency = %dep,
                            "dependency is not a known workspace package; ignoring it"
                        );
                    }
                    known
                })
                .map(move |dep| Edge {
                    upstream: dep.clone(),
                    downstream: name.clone(),
                })
        })
        .collect()
}

/// Inverse adjacency: for every upstream package, the packages depending on
/// it, in edge-list order.
pub fn invert(edges: &[Edge]) -> BTreeMap<PackageName, Vec<PackageName>> {
    let mut dependents: BTreeMap<PackageName, Vec<PackageName>> = BTreeMap::new();
    for edge in edges {
        dependents
            .entry(edge.upstream.clone())
            .or_default()
            .push(edge.downstream.clone());
    }
    dependents
}

impl DependencyGraph {
    pub fn from_workspace(info: &WorkspaceInfo) -> Self {
        let edges = edges_from(info);
        let mut dependents = invert(&edges);

        let mut deps: BTreeMap<PackageName, Vec<PackageName>> = BTreeMap::new();
        for edge in &edges {
            deps.entry(edge.downstream.clone())
                .or_default()
                .push(edge.upstream.clone());
        }

        for (name, record) in info {
            if !record.mismatched_workspace_dependencies.is_empty() {
                debug!(
                    package = %name,
                    mismatched = ?record.mismatched_workspace_dependencies,
                    "version-mismatched workspace dependencies are not linked; not ordering on them"
                );
            }
        }

        let nodes = info
            .iter()
            .map(|(name, record)| {
                let node = PackageNode {
                    location: record.location.clone(),
                    deps: deps.remove(name).unwrap_or_default(),
                    dependents: dependents.remove(name).unwrap_or_default(),
                };
                (name.clone(), node)
            })
            .collect();

        Self { nodes, edges }
    }

    /// All package names, sorted.
    pub fn packages(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn location_of(&self, name: &str) -> Option<&Path> {
        self.nodes.get(name).map(|n| n.location.as_path())
    }

    /// Immediate dependencies of a package.
    pub fn dependencies_of(&self, name: &str) -> &[PackageName] {
        self.nodes
            .get(name)
            .map(|n| n.deps.as_slice())
            .unwrap_or(&[])
    }

    /// Immediate dependents of a package.
    pub fn dependents_of(&self, name: &str) -> &[PackageName] {
        self.nodes
            .get(name)
            .map(|n| n.dependents.as_slice())
            .unwrap_or(&[])
    }
}
