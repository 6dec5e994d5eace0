// src/dag/node.rs

//! A single unit of work and its state machine.

use std::collections::BTreeSet;
use std::time::Instant;

use tracing::{debug, warn};

use crate::engine::CancelSignal;
use crate::errors::{DagrunError, ExecutionError, Result};
use crate::exec::TaskExecutor;
use crate::types::{NodeName, NodeStatus, Task};

/// A named task with its own dependency set and status.
///
/// Transitions: `Init -> Ready -> Running -> {Done | Error}`. Every transition
/// method checks the current status and refuses (without mutating) when the
/// move is not allowed.
#[derive(Debug, Clone)]
pub struct Node {
    name: NodeName,
    task: Task,
    /// Names this node waits on. Owned by the node; never shared.
    dependencies: BTreeSet<NodeName>,
    status: NodeStatus,
    started_at: Option<Instant>,
    finished_at: Option<Instant>,
    error: Option<ExecutionError>,
}

impl Node {
    pub fn new<I, S>(name: impl Into<NodeName>, task: impl Into<Task>, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<NodeName>,
    {
        Self {
            name: name.into(),
            task: task.into(),
            dependencies: dependencies.into_iter().map(Into::into).collect(),
            status: NodeStatus::Init,
            started_at: None,
            finished_at: None,
            error: None,
        }
    }

    /// Add a dependency before the node is handed to a graph. Adding a name
    /// twice has no effect.
    pub fn add_dependency(&mut self, dependency: impl Into<NodeName>) {
        self.dependencies.insert(dependency.into());
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn dependencies(&self) -> &BTreeSet<NodeName> {
        &self.dependencies
    }

    pub fn status(&self) -> NodeStatus {
        self.status
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<Instant> {
        self.finished_at
    }

    /// Why the task failed, if the node ended in `Error`.
    pub fn error(&self) -> Option<&ExecutionError> {
        self.error.as_ref()
    }

    /// `Init -> Ready`.
    pub fn mark_ready(&mut self) -> Result<()> {
        if self.status != NodeStatus::Init {
            return Err(self.invalid_transition(NodeStatus::Ready));
        }
        self.status = NodeStatus::Ready;
        debug!(node = %self.name, "marked ready");
        Ok(())
    }

    /// `Ready -> Running`. Returns the task to execute.
    ///
    /// Fails with [`DagrunError::NotReady`] when the node is in any other
    /// state; the status is left untouched.
    pub fn start(&mut self) -> Result<Task> {
        if self.status != NodeStatus::Ready {
            return Err(DagrunError::NotReady {
                node: self.name.clone(),
                status: self.status,
            });
        }
        self.status = NodeStatus::Running;
        self.started_at = Some(Instant::now());
        debug!(node = %self.name, "marked running");
        Ok(self.task.clone())
    }

    /// `Running -> Done` on success, `Running -> Error` on failure.
    pub fn complete(
        &mut self,
        outcome: std::result::Result<(), ExecutionError>,
    ) -> Result<NodeStatus> {
        let target = if outcome.is_ok() {
            NodeStatus::Done
        } else {
            NodeStatus::Error
        };

        if self.status != NodeStatus::Running {
            return Err(self.invalid_transition(target));
        }

        self.status = target;
        self.finished_at = Some(Instant::now());

        match outcome {
            Ok(()) => debug!(node = %self.name, "task completed successfully"),
            Err(err) => {
                warn!(node = %self.name, error = %err, "task failed");
                self.error = Some(err);
            }
        }

        Ok(self.status)
    }

    /// Run the task: claim the node, execute the task through `executor`
    /// (the caller waits for it to finish), then record the outcome.
    ///
    /// A failing task is not an `Err` here; it yields `Ok(NodeStatus::Error)`.
    /// `Err` means the node was not `Ready`.
    pub async fn run<E>(&mut self, executor: &E, cancel: CancelSignal) -> Result<NodeStatus>
    where
        E: TaskExecutor + ?Sized,
    {
        let task = self.start()?;
        let outcome = executor.execute(&self.name, &task, cancel).await;
        self.complete(outcome)
    }

    fn invalid_transition(&self, to: NodeStatus) -> DagrunError {
        DagrunError::InvalidTransition {
            node: self.name.clone(),
            from: self.status,
            to,
        }
    }
}
