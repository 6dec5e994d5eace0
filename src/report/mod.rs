// src/report/mod.rs

//! Status reporting.
//!
//! The scheduler hands a [`StatusReporter`] a consistent, sorted snapshot of
//! every node once per dispatch iteration and once more when the run ends.
//! Reporters only ever see copies; they cannot touch graph state.
//!
//! - [`console`] renders a coloured table, one row per node.
//! - [`TracingReporter`] emits one `tracing` event per node.
//! - [`NoopReporter`] discards everything.

pub mod console;

use tracing::debug;

use crate::dag::NodeSnapshot;

pub use console::ConsoleReporter;

/// Consumer of point-in-time node snapshots.
///
/// May be called from the dispatch loop while workers are changing node
/// states; the snapshot it receives is already detached from the graph.
pub trait StatusReporter: Send + Sync {
    fn report(&self, graph: &str, nodes: &[NodeSnapshot]);
}

/// Reporter that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReporter;

impl StatusReporter for NoopReporter {
    fn report(&self, _graph: &str, _nodes: &[NodeSnapshot]) {}
}

/// Reporter that logs each node's status at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl StatusReporter for TracingReporter {
    fn report(&self, graph: &str, nodes: &[NodeSnapshot]) {
        for node in nodes {
            debug!(
                graph = %graph,
                node = %node.name,
                status = %node.status,
                task = %node.task,
                "node status"
            );
        }
    }
}
