// src/exec/task_runner.rs

//! Package-manager backed script runner.

use std::future::Future;
use std::io::Write;
use std::path::PathBuf;
use std::pin::Pin;
use std::process::Stdio;
use std::time::Duration;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[cfg(unix)]
use nix::errno::Errno;
#[cfg(unix)]
use nix::sys::signal::{Signal, killpg};
#[cfg(unix)]
use nix::unistd::Pid;

use crate::config::model::{PACKAGE_PLACEHOLDER, SCRIPT_PLACEHOLDER};
use crate::errors::Result;

use super::{ScriptOutcome, ScriptRunner};

/// How long a cancelled script gets to exit after SIGTERM before its whole
/// process group is killed.
const KILL_GRACE: Duration = Duration::from_secs(2);

/// How long to keep forwarding output after the script has exited. Bounds
/// the wait when a background process inherited the pipes.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Runs scripts through a command template such as
/// `yarn --silent workspace {package} run {script}`, from the workspace root.
#[derive(Debug, Clone)]
pub struct CommandScriptRunner {
    root: PathBuf,
    template: Vec<String>,
    prefix_output: bool,
}

impl CommandScriptRunner {
    /// `prefix_output = true` pipes the child's stdout/stderr and prefixes
    /// every line with the package name; otherwise the child inherits them.
    pub fn new(root: impl Into<PathBuf>, template: Vec<String>, prefix_output: bool) -> Self {
        Self {
            root: root.into(),
            template,
            prefix_output,
        }
    }

    /// Argument vector for one invocation, placeholders substituted.
    pub fn command_line(&self, package: &str, script: &str) -> Vec<String> {
        self.template
            .iter()
            .map(|arg| {
                arg.replace(PACKAGE_PLACEHOLDER, package)
                    .replace(SCRIPT_PLACEHOLDER, script)
            })
            .collect()
    }
}

impl ScriptRunner for CommandScriptRunner {
    fn run_script(
        &self,
        package: &str,
        script: &str,
        cancel: CancellationToken,
    ) -> Pin<Box<dyn Future<Output = Result<ScriptOutcome>> + Send + '_>> {
        let argv = self.command_line(package, script);
        let package = package.to_string();

        Box::pin(async move { self.run_inner(package, argv, cancel).await })
    }
}

impl CommandScriptRunner {
    async fn run_inner(
        &self,
        package: String,
        argv: Vec<String>,
        cancel: CancellationToken,
    ) -> Result<ScriptOutcome> {
        let (program, args) = argv
            .split_first()
            .context("script command template is empty")?;

        info!(package = %package, cmd = %argv.join(" "), "starting script");

        let mut cmd = Command::new(program);
        cmd.args(args).current_dir(&self.root).kill_on_drop(true);

        // The package manager runs the script as its own child; a dedicated
        // group lets cancellation reach both.
        #[cfg(unix)]
        cmd.process_group(0);

        if self.prefix_output {
            cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        } else {
            cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        }

        let mut child = cmd
            .spawn()
            .with_context(|| format!("spawning script process for package '{package}'"))?;

        let stdout_task = child
            .stdout
            .take()
            .map(|stdout| forward_lines(package.clone(), stdout, std::io::stdout()));
        let stderr_task = child
            .stderr
            .take()
            .map(|stderr| forward_lines(package.clone(), stderr, std::io::stderr()));

        // Either the process exits on its own, or a sibling failed and the
        // shared token asks us to stop.
        let outcome = tokio::select! {
            status_res = child.wait() => {
                let status = status_res.with_context(|| {
                    format!("waiting for script process of package '{package}'")
                })?;

                let code = status.code().unwrap_or(-1);
                info!(
                    package = %package,
                    exit_code = code,
                    success = status.success(),
                    "script process exited"
                );

                if status.success() {
                    ScriptOutcome::Success
                } else {
                    ScriptOutcome::Failed(code)
                }
            }

            _ = cancel.cancelled() => {
                info!(package = %package, "cancellation requested; stopping script");
                terminate(&mut child, &package).await;
                ScriptOutcome::Cancelled
            }
        };

        drain_output(&package, stdout_task, stderr_task).await;
        Ok(outcome)
    }
}

/// Stop the script process and everything it started.
async fn terminate(child: &mut Child, package: &str) {
    terminate_group(child, package).await;

    if let Ok(None) = child.try_wait() {
        if let Err(e) = child.kill().await {
            warn!(
                package = %package,
                error = %e,
                "failed to kill script process on cancellation"
            );
        }
    }
}

/// SIGTERM the script's process group, give the leader [`KILL_GRACE`] to
/// exit, then SIGKILL whatever is left of the group.
#[cfg(unix)]
async fn terminate_group(child: &mut Child, package: &str) {
    let Some(pgid) = child.id() else {
        return;
    };

    signal_group(pgid, Signal::SIGTERM, package);
    if tokio::time::timeout(KILL_GRACE, child.wait()).await.is_err() {
        debug!(package = %package, "script outlived SIGTERM; killing its process group");
    }
    signal_group(pgid, Signal::SIGKILL, package);
}

#[cfg(not(unix))]
async fn terminate_group(_child: &mut Child, _package: &str) {}

#[cfg(unix)]
fn signal_group(pgid: u32, signal: Signal, package: &str) {
    let Ok(raw) = i32::try_from(pgid) else {
        return;
    };

    match killpg(Pid::from_raw(raw), signal) {
        // ESRCH: the group is already gone.
        Ok(()) | Err(Errno::ESRCH) => {}
        Err(err) => warn!(
            package = %package,
            ?signal,
            error = %err,
            "failed to signal script process group"
        ),
    }
}

/// Copy a child stream into `sink`, one `package: line` at a time, and hand
/// the sink back once the stream closes.
fn forward_lines<R, W>(package: String, stream: R, mut sink: W) -> JoinHandle<W>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: Write + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(stream).lines();

        // Write errors are ignored so the child never blocks on a full pipe.
        while let Ok(Some(line)) = lines.next_line().await {
            let _ = writeln!(sink, "{package}: {line}");
        }
        let _ = sink.flush();

        debug!(package = %package, "output stream closed");
        sink
    })
}

/// Wait for the forwarders to reach the end of their streams.
async fn drain_output<A, B>(
    package: &str,
    stdout_task: Option<JoinHandle<A>>,
    stderr_task: Option<JoinHandle<B>>,
) {
    let drained = async {
        if let Some(task) = stdout_task {
            let _ = task.await;
        }
        if let Some(task) = stderr_task {
            let _ = task.await;
        }
    };

    if tokio::time::timeout(DRAIN_TIMEOUT, drained).await.is_err() {
        debug!(package = %package, "output pipes still open after exit; not waiting further");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner(template: &[&str]) -> CommandScriptRunner {
        CommandScriptRunner::new(
            ".",
            template.iter().map(|s| s.to_string()).collect(),
            true,
        )
    }

    #[test]
    fn placeholders_are_substituted() {
        let r = runner(&["yarn", "workspace", "{package}", "run", "{script}"]);
        assert_eq!(
            r.command_line("@acme/ui", "build"),
            vec!["yarn", "workspace", "@acme/ui", "run", "build"]
        );
    }

    #[test]
    fn placeholders_inside_arguments_are_substituted() {
        let r = runner(&["sh", "-c", "echo {package}:{script}"]);
        assert_eq!(r.command_line("lib", "test")[2], "echo lib:test");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn exit_codes_map_to_outcomes() {
        let ok = runner(&["sh", "-c", "exit 0"]);
        let fail = runner(&["sh", "-c", "exit 3"]);

        let outcome = ok
            .run_script("pkg", "build", CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome, ScriptOutcome::Success);

        let outcome = fail
            .run_script("pkg", "build", CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome, ScriptOutcome::Failed(3));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn cancellation_kills_the_process() {
        let slow = runner(&["sleep", "30"]);
        let token = CancellationToken::new();

        let trigger = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let outcome = tokio::time::timeout(
            Duration::from_secs(5),
            slow.run_script("pkg", "dev", token),
        )
        .await
        .expect("cancelled script should stop promptly")
        .unwrap();

        assert_eq!(outcome, ScriptOutcome::Cancelled);
    }

    #[tokio::test]
    async fn missing_program_is_an_error() {
        let r = runner(&["wsrun-definitely-not-installed", "{script}"]);
        assert!(r
            .run_script("pkg", "build", CancellationToken::new())
            .await
            .is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn output_lines_are_prefixed_with_the_package() {
        let mut child = Command::new("sh")
            .args(["-c", "echo one; echo two >&2"])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap();

        let stdout = forward_lines("pkg".into(), child.stdout.take().unwrap(), Vec::new());
        let stderr = forward_lines("pkg".into(), child.stderr.take().unwrap(), Vec::new());
        assert!(child.wait().await.unwrap().success());

        let stdout = String::from_utf8(stdout.await.unwrap()).unwrap();
        let stderr = String::from_utf8(stderr.await.unwrap()).unwrap();
        assert_eq!(stdout, "pkg: one\n");
        assert_eq!(stderr, "pkg: two\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn cancellation_stops_processes_started_by_the_script() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("survived");
        let script = format!("sh -c 'sleep 1; touch {}' & wait", marker.display());
        let r = runner(&["sh", "-c", &script]);

        let token = CancellationToken::new();
        let trigger = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let outcome = tokio::time::timeout(
            Duration::from_secs(5),
            r.run_script("pkg", "dev", token),
        )
        .await
        .expect("cancelled script should stop promptly")
        .unwrap();
        assert_eq!(outcome, ScriptOutcome::Cancelled);

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!marker.exists(), "background process outlived cancellation");
    }
}
