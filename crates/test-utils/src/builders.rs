#![allow(dead_code)]

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use wsrun::engine::PlanRequest;
use wsrun::types::Propagation;
use wsrun::workspace::{PackageRecord, ScriptLookup, WorkspaceInfo};

/// Builder for `WorkspaceInfo` to simplify test setup.
///
/// Every package lives at `/ws/<name>`; scripts are tracked alongside so the
/// built [`WorkspaceFixture`] can also answer manifest lookups.
pub struct WorkspaceBuilder {
    info: WorkspaceInfo,
    scripts: Vec<(PathBuf, String)>,
}

impl WorkspaceBuilder {
    pub fn new() -> Self {
        Self {
            info: WorkspaceInfo::new(),
            scripts: Vec::new(),
        }
    }

    /// Add a package with its dependencies and the scripts it defines.
    pub fn package(mut self, name: &str, deps: &[&str], scripts: &[&str]) -> Self {
        let location = Self::location_of(name);
        for script in scripts {
            self.scripts.push((location.clone(), script.to_string()));
        }
        self.info.insert(
            name.to_string(),
            PackageRecord {
                location,
                workspace_dependencies: deps.iter().map(|d| d.to_string()).collect(),
                mismatched_workspace_dependencies: Vec::new(),
            },
        );
        self
    }

    pub fn location_of(name: &str) -> PathBuf {
        Path::new("/ws").join(name)
    }

    pub fn build(self) -> WorkspaceFixture {
        WorkspaceFixture {
            info: self.info,
            scripts: self.scripts,
        }
    }
}

impl Default for WorkspaceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Workspace info plus an in-memory script table.
#[derive(Debug, Clone)]
pub struct WorkspaceFixture {
    pub info: WorkspaceInfo,
    scripts: Vec<(PathBuf, String)>,
}

impl ScriptLookup for WorkspaceFixture {
    fn scripts_of(&self, location: &Path) -> BTreeSet<String> {
        self.scripts
            .iter()
            .filter(|(loc, _)| loc == location)
            .map(|(_, script)| script.clone())
            .collect()
    }
}

/// Builder for `PlanRequest`.
pub struct PlanRequestBuilder {
    request: PlanRequest,
}

impl PlanRequestBuilder {
    pub fn new(script: &str) -> Self {
        Self {
            request: PlanRequest {
                script: script.to_string(),
                filters: Vec::new(),
                propagation: Propagation::default(),
            },
        }
    }

    pub fn filter(mut self, pattern: &str) -> Self {
        self.request.filters.push(pattern.to_string());
        self
    }

    pub fn upstream(mut self) -> Self {
        self.request.propagation.upstream = true;
        self
    }

    pub fn downstream(mut self) -> Self {
        self.request.propagation.downstream = true;
        self
    }

    pub fn build(self) -> PlanRequest {
        self.request
    }
}
