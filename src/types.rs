use std::fmt;

/// Canonical node name type used throughout the crate.
pub type NodeName = String;

/// Lifecycle of a node within a single run.
///
/// `Init -> Ready -> Running -> {Done | Error}`. `Done` and `Error` are
/// terminal: nothing ever leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum NodeStatus {
    /// Waiting on dependencies (or blocked forever by a failed one).
    #[default]
    Init,
    /// All dependencies are done; queued for a worker.
    Ready,
    /// Claimed by a worker; the task is executing.
    Running,
    /// Task finished successfully.
    Done,
    /// Task failed.
    Error,
}

impl NodeStatus {
    pub const ALL: [NodeStatus; 5] = [
        NodeStatus::Init,
        NodeStatus::Ready,
        NodeStatus::Running,
        NodeStatus::Done,
        NodeStatus::Error,
    ];

    pub fn is_terminal(self) -> bool {
        matches!(self, NodeStatus::Done | NodeStatus::Error)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeStatus::Init => "init",
            NodeStatus::Ready => "ready",
            NodeStatus::Running => "running",
            NodeStatus::Done => "done",
            NodeStatus::Error => "error",
        }
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Opaque task payload owned by a node.
///
/// The scheduler never looks inside; a [`TaskExecutor`](crate::exec::TaskExecutor)
/// decides what the command means (the shell executor hands it to `sh -c`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    cmd: String,
}

impl Task {
    pub fn new(cmd: impl Into<String>) -> Self {
        Self { cmd: cmd.into() }
    }

    pub fn cmd(&self) -> &str {
        &self.cmd
    }
}

impl From<&str> for Task {
    fn from(cmd: &str) -> Self {
        Task::new(cmd)
    }
}

impl From<String> for Task {
    fn from(cmd: String) -> Self {
        Task::new(cmd)
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cmd)
    }
}
