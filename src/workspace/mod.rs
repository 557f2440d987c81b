// src/workspace/mod.rs

//! Workspace metadata boundary.
//!
//! - [`provider`] asks the package manager which packages exist and how they
//!   depend on each other.
//! - [`manifest`] reads the script names a package defines.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::types::PackageName;

pub mod manifest;
pub mod provider;

pub use manifest::{ManifestReader, ScriptLookup};
pub use provider::{CommandWorkspaceProvider, WorkspaceInfoProvider, parse_workspace_info};

/// One entry of the workspace info mapping.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageRecord {
    /// Package directory. Relative locations are resolved against the
    /// workspace root by the provider.
    pub location: PathBuf,

    /// Names of the workspace packages this one depends on.
    pub workspace_dependencies: Vec<PackageName>,

    #[serde(default)]
    pub mismatched_workspace_dependencies: Vec<PackageName>,
}

/// Snapshot of the workspace: package name to record, sorted by name.
pub type WorkspaceInfo = BTreeMap<PackageName, PackageRecord>;
