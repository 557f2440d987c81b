// src/exec/backend.rs

//! Pluggable script runner abstraction.
//!
//! The orchestrator talks to a `ScriptRunner` instead of spawning processes
//! itself. Production code uses [`CommandScriptRunner`]; tests provide a
//! runner that records invocations and simulates outcomes.
//!
//! [`CommandScriptRunner`]: super::CommandScriptRunner

use std::future::Future;
use std::pin::Pin;

use tokio_util::sync::CancellationToken;

use crate::errors::Result;

use super::ScriptOutcome;

/// Trait abstracting how one package script is executed.
pub trait ScriptRunner: Send + Sync {
    /// Run `script` in the context of `package` and wait for it.
    ///
    /// Implementations must stop promptly and return
    /// [`ScriptOutcome::Cancelled`] once `cancel` fires. An `Err` means the
    /// script could not be started at all; the orchestrator treats it as a
    /// failure.
    fn run_script(
        &self,
        package: &str,
        script: &str,
        cancel: CancellationToken,
    ) -> Pin<Box<dyn Future<Output = Result<ScriptOutcome>> + Send + '_>>;
}
