// src/errors.rs

//! Crate-wide error types.

use thiserror::Error;

use crate::types::NodeStatus;

#[derive(Error, Debug)]
pub enum DagrunError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Duplicate node name: {0}")]
    DuplicateName(String),

    #[error("Invalid graph: node '{node}' depends on unknown node '{dependency}'")]
    InvalidGraph { node: String, dependency: String },

    #[error("Cycle detected in graph: {0}")]
    CyclicGraph(String),

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Node '{node}' is not ready (status: {status})")]
    NotReady { node: String, status: NodeStatus },

    #[error("Node '{node}' cannot move from {from} to {to}")]
    InvalidTransition {
        node: String,
        from: NodeStatus,
        to: NodeStatus,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Failure reported by a [`TaskExecutor`](crate::exec::TaskExecutor).
///
/// Recorded on the node that ran the task; never aborts the rest of a run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("failed to launch task: {0}")]
    Launch(String),

    #[error("task exited with code {0}")]
    ExitCode(i32),

    #[error("task was terminated by a signal")]
    Terminated,

    #[error("task was cancelled")]
    Cancelled,

    #[error("executor panicked: {0}")]
    Panicked(String),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, DagrunError>;
