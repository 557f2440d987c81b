// src/workspace/provider.rs

use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::Value;
use tracing::{debug, info};

use crate::errors::{Result, WsrunError};
use crate::workspace::WorkspaceInfo;

/// Source of workspace metadata.
///
/// Production code uses [`CommandWorkspaceProvider`]; tests hand in a fixed
/// [`WorkspaceInfo`] instead.
pub trait WorkspaceInfoProvider {
    fn workspace_info(&self) -> Result<WorkspaceInfo>;
}

impl WorkspaceInfoProvider for WorkspaceInfo {
    fn workspace_info(&self) -> Result<WorkspaceInfo> {
        Ok(self.clone())
    }
}

/// Runs the package manager's workspace listing (by default
/// `yarn --silent workspaces info`) in the workspace root.
#[derive(Debug, Clone)]
pub struct CommandWorkspaceProvider {
    root: PathBuf,
    command: Vec<String>,
}

impl CommandWorkspaceProvider {
    pub fn new(root: impl Into<PathBuf>, command: Vec<String>) -> Self {
        Self {
            root: root.into(),
            command,
        }
    }
}

impl WorkspaceInfoProvider for CommandWorkspaceProvider {
    fn workspace_info(&self) -> Result<WorkspaceInfo> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or_else(|| WsrunError::Provider("empty workspace info command".to_string()))?;

        debug!(
            root = %self.root.display(),
            command = ?self.command,
            "querying workspace info"
        );

        let output = Command::new(program)
            .args(args)
            .current_dir(&self.root)
            .output()
            .map_err(|e| WsrunError::Provider(format!("could not run '{program}': {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(WsrunError::Provider(format!(
                "'{}' exited with {}: {}",
                self.command.join(" "),
                output.status,
                stderr.trim()
            )));
        }

        let info = parse_workspace_info(&output.stdout, &self.root)?;
        info!(packages = info.len(), "workspace info loaded");
        Ok(info)
    }
}

/// Parse the workspace info JSON.
///
/// Accepts the bare `{ "<name>": { "location": ..., "workspaceDependencies":
/// [...] } }` object as well as yarn's `--json` envelope, where that object
/// is a string under `data` of a `{"type": "log"}` event. Relative
/// locations are joined onto `root`.
pub fn parse_workspace_info(bytes: &[u8], root: &Path) -> Result<WorkspaceInfo> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| WsrunError::Metadata(format!("output is not JSON: {e}")))?;

    let value = match unwrap_log_envelope(&value).map(str::to_owned) {
        Some(inner) => serde_json::from_str(&inner)
            .map_err(|e| WsrunError::Metadata(format!("log event data is not JSON: {e}")))?,
        None => value,
    };

    if !value.is_object() {
        return Err(WsrunError::Metadata(
            "expected an object keyed by package name".to_string(),
        ));
    }

    let mut info: WorkspaceInfo = serde_json::from_value(value)
        .map_err(|e| WsrunError::Metadata(e.to_string()))?;

    for record in info.values_mut() {
        if record.location.is_relative() {
            record.location = root.join(&record.location);
        }
    }

    Ok(info)
}

fn unwrap_log_envelope(value: &Value) -> Option<&str> {
    let obj = value.as_object()?;
    if obj.get("type")?.as_str()? != "log" {
        return None;
    }
    obj.get("data")?.as_str()
}
