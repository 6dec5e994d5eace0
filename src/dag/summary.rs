// src/dag/summary.rs

//! Read-only views over a graph: per-node snapshots and the end-of-run
//! summary.

use std::fmt;
use std::time::{Duration, Instant};

use crate::errors::ExecutionError;
use crate::types::{NodeName, NodeStatus, Task};

/// Point-in-time copy of one node, taken under the graph lock.
#[derive(Debug, Clone)]
pub struct NodeSnapshot {
    pub name: NodeName,
    pub status: NodeStatus,
    pub task: Task,
    pub started_at: Option<Instant>,
    pub finished_at: Option<Instant>,
    pub error: Option<ExecutionError>,
}

impl NodeSnapshot {
    /// Wall time spent running, if the node has finished.
    pub fn duration(&self) -> Option<Duration> {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => Some(end.saturating_duration_since(start)),
            _ => None,
        }
    }
}

/// Outcome of a scheduler run.
///
/// - `done`: nodes whose task succeeded.
/// - `error`: nodes whose task failed.
/// - `unreachable`: nodes left in `Init` because an ancestor failed.
/// - `skipped`: nodes that never ran, or were cancelled mid-task, because the
///   run was aborted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub graph: String,
    pub done: usize,
    pub error: usize,
    pub unreachable: usize,
    pub skipped: usize,
    pub failed_nodes: Vec<NodeName>,
    pub unreachable_nodes: Vec<NodeName>,
    pub skipped_nodes: Vec<NodeName>,
    pub aborted: bool,
    pub elapsed: Duration,
}

impl RunSummary {
    /// Total number of nodes accounted for.
    pub fn total(&self) -> usize {
        self.done + self.error + self.unreachable + self.skipped
    }

    /// `true` when every node finished successfully.
    pub fn is_success(&self) -> bool {
        !self.aborted && self.error == 0 && self.unreachable == 0 && self.skipped == 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} done, {} error, {} unreachable, {} skipped in {:.2?}",
            self.graph, self.done, self.error, self.unreachable, self.skipped, self.elapsed
        )?;
        if self.aborted {
            write!(f, " (aborted)")?;
        }
        if !self.failed_nodes.is_empty() {
            write!(f, "\n  failed: {}", self.failed_nodes.join(", "))?;
        }
        if !self.unreachable_nodes.is_empty() {
            write!(f, "\n  unreachable: {}", self.unreachable_nodes.join(", "))?;
        }
        if !self.skipped_nodes.is_empty() {
            write!(f, "\n  skipped: {}", self.skipped_nodes.join(", "))?;
        }
        Ok(())
    }
}
