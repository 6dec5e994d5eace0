// src/engine/scheduler.rs

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::dag::{Graph, RunSummary};
use crate::engine::abort::AbortHandle;
use crate::engine::queue::{WorkSender, work_queue};
use crate::engine::worker::Worker;
use crate::engine::WorkerEvent;
use crate::errors::Result;
use crate::exec::TaskExecutor;
use crate::report::{NoopReporter, StatusReporter};

/// Drives a [`Graph`] to completion with a fixed pool of workers.
///
/// The dispatch loop runs on the caller's task:
/// 1. validate the graph (missing dependencies, cycles) before anything runs,
/// 2. spawn the workers,
/// 3. readiness pass, enqueue whatever it promoted, wait for a completion
///    event, repeat,
/// 4. stop once nothing is queued or running and no node became ready,
/// 5. close the queue, join the workers and summarise.
///
/// There is no polling: the loop only wakes up when a worker reports a
/// finished node or an abort is requested.
pub struct Scheduler<E: TaskExecutor + 'static> {
    executor: Arc<E>,
    threads: Option<usize>,
    pacing: Duration,
    reporter: Arc<dyn StatusReporter>,
    abort: AbortHandle,
}

impl<E: TaskExecutor + 'static> fmt::Debug for Scheduler<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("threads", &self.threads)
            .field("pacing", &self.pacing)
            .field("aborted", &self.abort.is_aborted())
            .finish_non_exhaustive()
    }
}

impl<E: TaskExecutor + 'static> Scheduler<E> {
    pub fn new(executor: E) -> Self {
        Self::from_arc(Arc::new(executor))
    }

    /// Share an executor the caller keeps a handle to (e.g. to inspect it
    /// after the run).
    pub fn from_arc(executor: Arc<E>) -> Self {
        Self {
            executor,
            threads: None,
            pacing: Duration::ZERO,
            reporter: Arc::new(NoopReporter),
            abort: AbortHandle::new(),
        }
    }

    /// Override the graph's worker count. Clamped to at least 1.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads.max(1));
        self
    }

    /// Delay each worker waits after finishing a node. Zero (the default)
    /// means workers pick up the next node immediately.
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn StatusReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Handle that stops the run: nothing new is enqueued, queued nodes are
    /// skipped and running tasks see their cancel signal fire.
    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    /// Run every node of `graph` whose dependencies succeed, and return the
    /// summary once no node is queued or running.
    ///
    /// Fails before executing anything if the graph references an unknown
    /// node or contains a cycle. Task failures do not fail the run; they are
    /// reported in the summary.
    pub async fn run(&self, graph: Arc<Graph>) -> Result<RunSummary> {
        graph.validate()?;

        let threads = self.threads.unwrap_or(graph.threads()).max(1);
        let started = Instant::now();

        info!(
            graph = %graph.name(),
            nodes = graph.len(),
            threads,
            "starting run"
        );

        let (queue_tx, queue_rx) = work_queue();
        let (event_tx, mut event_rx) = mpsc::channel::<WorkerEvent>(threads * 4);

        let workers: Vec<_> = (0..threads)
            .map(|id| {
                Worker {
                    id,
                    graph: Arc::clone(&graph),
                    executor: Arc::clone(&self.executor),
                    queue: queue_rx.clone(),
                    events: event_tx.clone(),
                    cancel: self.abort.signal(),
                    pacing: self.pacing,
                }
                .spawn()
            })
            .collect();

        // Workers hold the only event senders now; if they all exit, `recv`
        // returns `None` instead of hanging.
        drop(event_tx);
        drop(queue_rx);

        let aborted = self.dispatch(&graph, &queue_tx, &mut event_rx).await?;

        // Closing the queue lets idle workers exit.
        drop(queue_tx);
        for handle in workers {
            if let Err(e) = handle.await {
                warn!(graph = %graph.name(), error = %e, "worker task failed");
            }
        }

        self.reporter.report(graph.name(), &graph.snapshot());

        let summary = graph.summary(aborted, started.elapsed());
        info!(
            graph = %summary.graph,
            done = summary.done,
            error = summary.error,
            unreachable = summary.unreachable,
            skipped = summary.skipped,
            aborted = summary.aborted,
            "run finished"
        );
        if summary.unreachable > 0 {
            warn!(
                graph = %summary.graph,
                nodes = ?summary.unreachable_nodes,
                "nodes unreachable because an upstream node failed"
            );
        }

        Ok(summary)
    }

    /// The dispatch loop. Returns whether the run was aborted.
    async fn dispatch(
        &self,
        graph: &Graph,
        queue: &WorkSender,
        events: &mut mpsc::Receiver<WorkerEvent>,
    ) -> Result<bool> {
        let mut cancel = self.abort.signal();
        let mut aborted = cancel.is_cancelled();
        // Enqueued but not yet reported back by a worker.
        let mut in_flight: usize = 0;

        loop {
            self.reporter.report(graph.name(), &graph.snapshot());

            if !aborted {
                for node in graph.refresh_readiness() {
                    debug!(graph = %graph.name(), node = %node, "enqueuing ready node");
                    queue.enqueue(node)?;
                    in_flight += 1;
                }
            }

            if in_flight == 0 {
                debug!(graph = %graph.name(), "nothing queued or running; graph exhausted");
                break;
            }

            let event = tokio::select! {
                event = events.recv() => event,
                _ = cancel.cancelled(), if !aborted => {
                    warn!(graph = %graph.name(), in_flight, "run aborted; waiting for in-flight nodes");
                    aborted = true;
                    continue;
                }
            };

            let Some(event) = event else {
                warn!(graph = %graph.name(), in_flight, "all workers exited with work outstanding");
                break;
            };
            in_flight = in_flight.saturating_sub(1);
            log_event(graph.name(), &event);

            // Fold in everything else that already finished before the next
            // readiness pass.
            while let Ok(event) = events.try_recv() {
                in_flight = in_flight.saturating_sub(1);
                log_event(graph.name(), &event);
            }
        }

        Ok(aborted)
    }
}

fn log_event(graph: &str, event: &WorkerEvent) {
    match event {
        WorkerEvent::Finished { node, status } => {
            debug!(graph = %graph, node = %node, %status, "worker reported completion");
        }
        WorkerEvent::Rejected { node, reason } => {
            warn!(graph = %graph, node = %node, reason = %reason, "worker rejected node");
        }
        WorkerEvent::Skipped { node } => {
            debug!(graph = %graph, node = %node, "worker skipped node");
        }
    }
}
