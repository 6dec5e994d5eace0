// src/engine/worker.rs

//! Worker loop: dequeue a node, run it, report back.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinError;
use tracing::{debug, info, warn};

use crate::dag::Graph;
use crate::engine::queue::WorkReceiver;
use crate::engine::{CancelSignal, WorkerEvent};
use crate::errors::ExecutionError;
use crate::exec::TaskExecutor;
use crate::types::NodeName;

/// Everything a worker needs; one per pool slot.
pub(crate) struct Worker<E: TaskExecutor + 'static> {
    pub id: usize,
    pub graph: Arc<Graph>,
    pub executor: Arc<E>,
    pub queue: WorkReceiver,
    pub events: mpsc::Sender<WorkerEvent>,
    pub cancel: CancelSignal,
    pub pacing: Duration,
}

impl<E: TaskExecutor + 'static> Worker<E> {
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Loop until the queue is closed and drained.
    ///
    /// Every dequeued node produces exactly one [`WorkerEvent`], so the
    /// dispatch loop can count in-flight work precisely.
    async fn run(self) {
        debug!(worker = self.id, "worker started");

        while let Some(node) = self.queue.dequeue().await {
            let event = if self.cancel.is_cancelled() {
                debug!(worker = self.id, node = %node, "run aborted; skipping queued node");
                WorkerEvent::Skipped { node }
            } else {
                self.run_one(node).await
            };

            if self.events.send(event).await.is_err() {
                debug!(worker = self.id, "event channel closed; worker stopping");
                break;
            }

            if !self.pacing.is_zero() {
                tokio::time::sleep(self.pacing).await;
            }
        }

        debug!(worker = self.id, "worker finished (queue closed)");
    }

    /// Run one node on its own task so a panicking executor fails the node
    /// instead of taking the worker down with it.
    async fn run_one(&self, node: NodeName) -> WorkerEvent {
        let graph = Arc::clone(&self.graph);
        let executor = Arc::clone(&self.executor);
        let cancel = self.cancel.clone();
        let name = node.clone();

        let joined = tokio::spawn(async move {
            graph.run_node(&name, executor.as_ref(), cancel).await
        })
        .await;

        match joined {
            Ok(Ok(status)) => {
                info!(worker = self.id, node = %node, %status, "node finished");
                WorkerEvent::Finished { node, status }
            }
            Ok(Err(err)) => {
                // Only reachable if something other than the dispatch loop
                // enqueued or claimed the node.
                warn!(worker = self.id, node = %node, error = %err, "node rejected by worker");
                WorkerEvent::Rejected {
                    node,
                    reason: err.to_string(),
                }
            }
            Err(join_err) => {
                let reason = panic_message(join_err);
                warn!(worker = self.id, node = %node, %reason, "node execution panicked");
                match self
                    .graph
                    .fail_running(&node, ExecutionError::Panicked(reason.clone()))
                {
                    Ok(status) => WorkerEvent::Finished { node, status },
                    Err(err) => WorkerEvent::Rejected {
                        node,
                        reason: format!("{reason}; {err}"),
                    },
                }
            }
        }
    }
}

fn panic_message(err: JoinError) -> String {
    if !err.is_panic() {
        return err.to_string();
    }
    let payload = err.into_panic();
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
