use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use wsrun::errors::Result;
use wsrun::exec::{ScriptOutcome, ScriptRunner};

/// How a fake script behaves.
#[derive(Debug, Clone, Copy)]
pub struct FakeBehaviour {
    pub duration: Duration,
    /// `None` means success, `Some(code)` a non-zero exit.
    pub exit_code: Option<i32>,
}

impl Default for FakeBehaviour {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(10),
            exit_code: None,
        }
    }
}

/// Something the fake runner observed.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub package: String,
    pub script: String,
    pub started_at: Instant,
    pub outcome: Option<ScriptOutcome>,
}

/// A fake runner that:
/// - records every invocation with its start time
/// - "runs" for the configured duration, then succeeds or fails
/// - returns `Cancelled` if the token fires first.
#[derive(Clone)]
pub struct FakeScriptRunner {
    epoch: Instant,
    behaviours: Arc<HashMap<String, FakeBehaviour>>,
    invocations: Arc<Mutex<Vec<Invocation>>>,
}

impl FakeScriptRunner {
    pub fn new() -> Self {
        Self::with_behaviours(HashMap::new())
    }

    pub fn with_behaviours(behaviours: HashMap<String, FakeBehaviour>) -> Self {
        Self {
            epoch: Instant::now(),
            behaviours: Arc::new(behaviours),
            invocations: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Instant the runner was created; start offsets are measured from it.
    pub fn epoch(&self) -> Instant {
        self.epoch
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().unwrap().clone()
    }

    /// Packages in the order they were started.
    pub fn started(&self) -> Vec<String> {
        self.invocations().into_iter().map(|i| i.package).collect()
    }

    /// Start offset of `package` relative to [`Self::epoch`].
    pub fn start_offset(&self, package: &str) -> Option<Duration> {
        self.invocations()
            .into_iter()
            .find(|i| i.package == package)
            .map(|i| i.started_at.duration_since(self.epoch))
    }

    pub fn outcome_of(&self, package: &str) -> Option<ScriptOutcome> {
        self.invocations()
            .into_iter()
            .find(|i| i.package == package)
            .and_then(|i| i.outcome)
    }
}

impl Default for FakeScriptRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptRunner for FakeScriptRunner {
    fn run_script(
        &self,
        package: &str,
        script: &str,
        cancel: CancellationToken,
    ) -> Pin<Box<dyn Future<Output = Result<ScriptOutcome>> + Send + '_>> {
        let behaviour = self.behaviours.get(package).copied().unwrap_or_default();
        let invocations = Arc::clone(&self.invocations);
        let index = {
            let mut guard = invocations.lock().unwrap();
            guard.push(Invocation {
                package: package.to_string(),
                script: script.to_string(),
                started_at: Instant::now(),
                outcome: None,
            });
            guard.len() - 1
        };

        Box::pin(async move {
            let outcome = tokio::select! {
                _ = cancel.cancelled() => ScriptOutcome::Cancelled,
                _ = tokio::time::sleep(behaviour.duration) => match behaviour.exit_code {
                    None => ScriptOutcome::Success,
                    Some(code) => ScriptOutcome::Failed(code),
                },
            };

            invocations.lock().unwrap()[index].outcome = Some(outcome);
            Ok(outcome)
        })
    }
}
