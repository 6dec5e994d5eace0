// src/exec/shell.rs

//! Process-backed executor.

use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::engine::CancelSignal;
use crate::errors::ExecutionError;
use crate::exec::backend::{ExecFuture, TaskExecutor};
use crate::types::Task;

/// Runs each task as a shell command in a fresh child process.
///
/// - `sh -c <cmd>` on Unix, `cmd /C <cmd>` on Windows.
/// - stdout/stderr are inherited, never captured.
/// - Exit code 0 is success; anything else is [`ExecutionError::ExitCode`].
/// - When the cancel signal fires the child is killed and the task reports
///   [`ExecutionError::Cancelled`].
#[derive(Debug, Clone, Default)]
pub struct ShellExecutor {
    /// Silence child stdout/stderr instead of inheriting them.
    quiet: bool,
}

impl ShellExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard task output. Mostly useful in tests.
    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    fn command_for(&self, task: &Task) -> Command {
        let mut cmd = if cfg!(windows) {
            let mut c = Command::new("cmd");
            c.arg("/C").arg(task.cmd());
            c
        } else {
            let mut c = Command::new("sh");
            c.arg("-c").arg(task.cmd());
            c
        };

        if self.quiet {
            cmd.stdout(Stdio::null()).stderr(Stdio::null());
        } else {
            cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        }
        cmd.stdin(Stdio::null()).kill_on_drop(true);
        cmd
    }

    async fn run(
        &self,
        node: &str,
        task: &Task,
        mut cancel: CancelSignal,
    ) -> Result<(), ExecutionError> {
        if cancel.is_cancelled() {
            return Err(ExecutionError::Cancelled);
        }

        info!(node = %node, cmd = %task, "starting task process");

        let mut child = self.command_for(task).spawn().map_err(|e| {
            warn!(node = %node, error = %e, "failed to spawn task process");
            ExecutionError::Launch(e.to_string())
        })?;

        tokio::select! {
            status_res = child.wait() => {
                let status = status_res.map_err(|e| ExecutionError::Launch(e.to_string()))?;

                info!(
                    node = %node,
                    exit_code = ?status.code(),
                    success = status.success(),
                    "task process exited"
                );

                if status.success() {
                    Ok(())
                } else {
                    match status.code() {
                        Some(code) => Err(ExecutionError::ExitCode(code)),
                        None => Err(ExecutionError::Terminated),
                    }
                }
            }

            _ = cancel.cancelled() => {
                info!(node = %node, "cancellation requested; killing task process");
                if let Err(e) = child.kill().await {
                    warn!(node = %node, error = %e, "failed to kill task process on cancellation");
                } else {
                    debug!(node = %node, "task process killed");
                }
                Err(ExecutionError::Cancelled)
            }
        }
    }
}

impl TaskExecutor for ShellExecutor {
    fn execute<'a>(
        &'a self,
        node: &'a str,
        task: &'a Task,
        cancel: CancelSignal,
    ) -> ExecFuture<'a> {
        Box::pin(self.run(node, task, cancel))
    }
}
