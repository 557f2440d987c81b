// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

use crate::types::ExecutionMode;

/// Placeholder replaced by the package name in `script_command`.
pub const PACKAGE_PLACEHOLDER: &str = "{package}";
/// Placeholder replaced by the script name in `script_command`.
pub const SCRIPT_PLACEHOLDER: &str = "{script}";

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [workspace]
/// info_command = ["yarn", "--silent", "workspaces", "info"]
/// script_command = ["yarn", "--silent", "workspace", "{package}", "run", "{script}"]
/// manifest = "package.json"
///
/// [run]
/// mode = "parallel"
/// stagger = "2s"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub workspace: WorkspaceSection,

    #[serde(default)]
    pub run: RunSection,
}

/// `[workspace]` section: how to talk to the package manager.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkspaceSection {
    /// Command printing the workspace info JSON on stdout.
    #[serde(default = "default_info_command")]
    pub info_command: Vec<String>,

    /// Command running one script of one package. `{package}` and
    /// `{script}` are substituted per invocation.
    #[serde(default = "default_script_command")]
    pub script_command: Vec<String>,

    /// Manifest file name, relative to each package location.
    #[serde(default = "default_manifest")]
    pub manifest: String,
}

fn default_info_command() -> Vec<String> {
    ["yarn", "--silent", "workspaces", "info"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_script_command() -> Vec<String> {
    [
        "yarn",
        "--silent",
        "workspace",
        PACKAGE_PLACEHOLDER,
        "run",
        SCRIPT_PLACEHOLDER,
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_manifest() -> String {
    "package.json".to_string()
}

impl Default for WorkspaceSection {
    fn default() -> Self {
        Self {
            info_command: default_info_command(),
            script_command: default_script_command(),
            manifest: default_manifest(),
        }
    }
}

/// `[run]` section: execution defaults, overridable from the CLI.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunSection {
    #[serde(default)]
    pub mode: ExecutionMode,

    /// Delay between consecutive starts in parallel mode (e.g. `"2s"`).
    #[serde(default = "default_stagger")]
    pub stagger: String,

    /// Prefix each output line with the package name in parallel mode.
    #[serde(default = "default_prefix_output")]
    pub prefix_output: bool,
}

fn default_stagger() -> String {
    "0ms".to_string()
}

fn default_prefix_output() -> bool {
    true
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::default(),
            stagger: default_stagger(),
            prefix_output: default_prefix_output(),
        }
    }
}

/// Validated configuration.
///
/// Only obtainable through `TryFrom<RawConfigFile>` (see `validate.rs`) so
/// the rest of the crate can rely on non-empty commands and a parsed stagger.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub workspace: WorkspaceSection,
    pub mode: ExecutionMode,
    pub stagger: Duration,
    pub prefix_output: bool,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        workspace: WorkspaceSection,
        mode: ExecutionMode,
        stagger: Duration,
        prefix_output: bool,
    ) -> Self {
        Self {
            workspace,
            mode,
            stagger,
            prefix_output,
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(
            WorkspaceSection::default(),
            ExecutionMode::default(),
            Duration::ZERO,
            default_prefix_output(),
        )
    }
}
