// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

use crate::types::PackageName;

#[derive(Error, Debug)]
pub enum WsrunError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The workspace info provider could not be invoked (or exited non-zero).
    #[error("Workspace info provider failed: {0}")]
    Provider(String),

    /// The provider ran but its output is not the expected structure.
    #[error("Malformed workspace metadata: {0}")]
    Metadata(String),

    #[error("Invalid package filter '{pattern}': {source}")]
    InvalidFilter {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error(
        "No package matches {filters:?}; known packages are: {}",
        candidates.join(", ")
    )]
    NoMatch {
        filters: Vec<String>,
        candidates: Vec<PackageName>,
    },

    #[error("Could not process dependency structure: {0}")]
    Cycle(String),

    #[error("Script '{script}' failed in package '{package}'")]
    ScriptExecution {
        package: PackageName,
        script: String,
        /// Packages of the plan that never ran to completion.
        skipped: Vec<PackageName>,
    },

    #[error("Interrupted; {} package(s) did not complete", skipped.len())]
    Interrupted {
        /// Packages of the plan that never ran to completion.
        skipped: Vec<PackageName>,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, WsrunError>;
