use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use dagrun::ExecutionError;
use dagrun::Task;
use dagrun::engine::CancelSignal;
use dagrun::exec::{ExecFuture, TaskExecutor};

/// One recorded execution.
#[derive(Debug, Clone)]
pub struct Interval {
    pub node: String,
    pub start: Instant,
    pub end: Instant,
    pub success: bool,
}

impl Interval {
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// A fake executor that interprets task commands as a tiny script instead of
/// spawning processes.
///
/// Steps are separated by `;`:
/// - `sleep:<ms>`: wait that long (returns `Cancelled` if the run aborts),
/// - `fail`: fail with exit code 1,
/// - `fail:<code>`: fail with that exit code,
/// - anything else: no-op.
///
/// Every call is recorded: the start order in [`FakeExecutor::started`] and
/// the full interval in [`FakeExecutor::intervals`].
#[derive(Debug, Clone, Default)]
pub struct FakeExecutor {
    started: Arc<Mutex<Vec<String>>>,
    intervals: Arc<Mutex<Vec<Interval>>>,
}

impl FakeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Node names in the order their tasks started.
    pub fn started(&self) -> Vec<String> {
        self.started.lock().unwrap().clone()
    }

    /// Finished executions in completion order.
    pub fn intervals(&self) -> Vec<Interval> {
        self.intervals.lock().unwrap().clone()
    }

    pub fn interval_of(&self, node: &str) -> Option<Interval> {
        self.intervals
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.node == node)
            .cloned()
    }

    async fn run_script(task: &Task, mut cancel: CancelSignal) -> Result<(), ExecutionError> {
        for step in task.cmd().split(';').map(str::trim) {
            if let Some(ms) = step.strip_prefix("sleep:") {
                let ms: u64 = ms.parse().unwrap_or(0);
                tokio::select! {
                    _ = tokio::time::sleep(Duration::from_millis(ms)) => {}
                    _ = cancel.cancelled() => return Err(ExecutionError::Cancelled),
                }
            } else if step == "fail" {
                return Err(ExecutionError::ExitCode(1));
            } else if let Some(code) = step.strip_prefix("fail:") {
                return Err(ExecutionError::ExitCode(code.parse().unwrap_or(1)));
            }
        }
        Ok(())
    }
}

impl TaskExecutor for FakeExecutor {
    fn execute<'a>(
        &'a self,
        node: &'a str,
        task: &'a Task,
        cancel: CancelSignal,
    ) -> ExecFuture<'a> {
        Box::pin(async move {
            self.started.lock().unwrap().push(node.to_string());
            let start = Instant::now();

            let result = Self::run_script(task, cancel).await;

            self.intervals.lock().unwrap().push(Interval {
                node: node.to_string(),
                start,
                end: Instant::now(),
                success: result.is_ok(),
            });
            result
        })
    }
}
