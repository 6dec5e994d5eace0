// src/engine/mod.rs

//! Execution engine for dagrun.
//!
//! This module ties together:
//! - the work queue feeding ready nodes to workers ([`queue`]),
//! - the worker pool that runs nodes and reports back ([`worker`]),
//! - the dispatch loop that recomputes readiness on every completion
//!   ([`scheduler`]),
//! - run-wide abort signalling ([`abort`]).

use crate::types::{NodeName, NodeStatus};

/// Events flowing from workers back to the dispatch loop.
///
/// Every node a worker dequeues yields exactly one event.
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    /// The node ran; `status` is `Done` or `Error`.
    Finished { node: NodeName, status: NodeStatus },
    /// The worker could not claim the node (it was not `Ready`).
    Rejected { node: NodeName, reason: String },
    /// The run was aborted before the node started.
    Skipped { node: NodeName },
}

pub mod abort;
pub mod queue;
pub mod scheduler;
pub(crate) mod worker;

pub use abort::{AbortHandle, CancelSignal};
pub use queue::{WorkReceiver, WorkSender, work_queue};
pub use scheduler::Scheduler;
