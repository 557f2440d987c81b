// src/exec/mod.rs

//! Script execution layer.
//!
//! - [`backend`] defines the `ScriptRunner` seam the orchestrator talks to,
//!   so tests can swap in a fake runner.
//! - [`task_runner`] is the production runner: it spawns the package
//!   manager with `tokio::process::Command` and kills it on cancellation.

pub mod backend;
pub mod task_runner;

pub use backend::ScriptRunner;
pub use task_runner::CommandScriptRunner;

/// Result of one script invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptOutcome {
    Success,
    /// Non-zero exit; `-1` when no exit code is available.
    Failed(i32),
    /// Stopped through the cancellation token before it finished.
    Cancelled,
}
