// src/dag/graph.rs

use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::model::{ConfigFile, TaskConfig};
use crate::dag::node::Node;
use crate::dag::summary::{NodeSnapshot, RunSummary};
use crate::dag::validate::{topological_order, validate_nodes};
use crate::engine::CancelSignal;
use crate::errors::{DagrunError, ExecutionError, Result};
use crate::exec::TaskExecutor;
use crate::types::{NodeName, NodeStatus, Task};

/// A named set of nodes keyed by name.
///
/// All node state lives behind a single mutex: every status read or write,
/// readiness pass and snapshot happens in one critical section, so workers
/// and the dispatch loop never see a torn view. Task execution itself
/// happens outside the lock.
///
/// Nodes are added through `&mut self` before a run; a run shares the graph
/// as `Arc<Graph>`, which rules out insertion while it is active.
#[derive(Debug)]
pub struct Graph {
    name: String,
    threads: usize,
    nodes: Mutex<BTreeMap<NodeName, Node>>,
}

impl Graph {
    /// Create an empty graph. `threads` is the default worker-pool size for
    /// runs of this graph and is clamped to at least 1.
    pub fn new(name: impl Into<String>, threads: usize) -> Self {
        Self {
            name: name.into(),
            threads: threads.max(1),
            nodes: Mutex::new(BTreeMap::new()),
        }
    }

    /// Build a graph from a validated [`ConfigFile`].
    pub fn from_config(cfg: &ConfigFile) -> Result<Self> {
        Self::from_tasks(&cfg.config.name, cfg.config.threads, &cfg.task)
    }

    pub(crate) fn from_tasks(
        name: &str,
        threads: usize,
        tasks: &BTreeMap<String, TaskConfig>,
    ) -> Result<Self> {
        let mut graph = Graph::new(name, threads);
        for (task_name, task) in tasks.iter() {
            graph.add_task(task_name.as_str(), task.cmd.as_str(), task.after.iter().cloned())?;
        }
        Ok(graph)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Register a node. Dependencies are not checked here (they may name
    /// nodes added later); see [`Graph::validate`].
    pub fn add_node(&mut self, node: Node) -> Result<()> {
        let nodes = self.nodes.get_mut().unwrap_or_else(PoisonError::into_inner);
        if nodes.contains_key(node.name()) {
            return Err(DagrunError::DuplicateName(node.name().to_string()));
        }
        debug!(graph = %self.name, node = %node.name(), "node added");
        nodes.insert(node.name().to_string(), node);
        Ok(())
    }

    /// Shortcut for `add_node(Node::new(name, task, dependencies))`.
    pub fn add_task<I, S>(
        &mut self,
        name: impl Into<NodeName>,
        task: impl Into<Task>,
        dependencies: I,
    ) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<NodeName>,
    {
        self.add_node(Node::new(name, task, dependencies))
    }

    /// Check that every dependency exists ([`DagrunError::InvalidGraph`]) and
    /// that there is no cycle ([`DagrunError::CyclicGraph`]).
    pub fn validate(&self) -> Result<()> {
        validate_nodes(&self.lock())
    }

    /// Node names with every dependency before its dependents.
    pub fn topological_order(&self) -> Result<Vec<NodeName>> {
        let nodes = self.lock();
        validate_nodes(&nodes)?;
        topological_order(&nodes)
    }

    pub fn status_of(&self, name: &str) -> Option<NodeStatus> {
        self.lock().get(name).map(Node::status)
    }

    pub fn dependencies_of(&self, name: &str) -> Option<Vec<NodeName>> {
        self.lock()
            .get(name)
            .map(|node| node.dependencies().iter().cloned().collect())
    }

    /// Copy of a single node, including its timestamps and error.
    pub fn node(&self, name: &str) -> Option<Node> {
        self.lock().get(name).cloned()
    }

    /// Names of nodes currently in `status`, sorted by name.
    pub fn nodes_with_status(&self, status: NodeStatus) -> Vec<NodeName> {
        self.lock()
            .values()
            .filter(|node| node.status() == status)
            .map(|node| node.name().to_string())
            .collect()
    }

    /// Number of nodes in each status.
    pub fn status_counts(&self) -> BTreeMap<NodeStatus, usize> {
        let nodes = self.lock();
        NodeStatus::ALL
            .into_iter()
            .map(|status| {
                let count = nodes.values().filter(|n| n.status() == status).count();
                (status, count)
            })
            .collect()
    }

    /// Promote every `Init` node whose dependencies are all `Done` to `Ready`
    /// and return the promoted names, sorted.
    ///
    /// Idempotent. A dependency that is missing or ended in `Error` keeps the
    /// node in `Init`.
    pub fn refresh_readiness(&self) -> Vec<NodeName> {
        let mut nodes = self.lock();

        // Decide first, then mutate.
        let candidates: Vec<NodeName> = nodes
            .values()
            .filter(|node| node.status() == NodeStatus::Init)
            .filter(|node| {
                node.dependencies().iter().all(|dep| {
                    nodes
                        .get(dep)
                        .is_some_and(|d| d.status() == NodeStatus::Done)
                })
            })
            .map(|node| node.name().to_string())
            .collect();

        let mut promoted = Vec::with_capacity(candidates.len());
        for name in candidates {
            if let Some(node) = nodes.get_mut(&name) {
                match node.mark_ready() {
                    Ok(()) => promoted.push(name),
                    Err(err) => warn!(graph = %self.name, error = %err, "readiness pass skipped node"),
                }
            }
        }

        if !promoted.is_empty() {
            debug!(graph = %self.name, ?promoted, "nodes became ready");
        }
        promoted
    }

    /// Claim node `name` (`Ready -> Running`), execute its task through
    /// `executor`, and record `Done` or `Error`.
    ///
    /// The claim and the final write are each a single critical section, so
    /// two workers can never both run the same node. Returns
    /// [`DagrunError::NotReady`] if the node was not `Ready` at claim time.
    pub async fn run_node<E>(
        &self,
        name: &str,
        executor: &E,
        cancel: CancelSignal,
    ) -> Result<NodeStatus>
    where
        E: TaskExecutor + ?Sized,
    {
        let task = {
            let mut nodes = self.lock();
            let node = nodes
                .get_mut(name)
                .ok_or_else(|| DagrunError::NodeNotFound(name.to_string()))?;
            node.start()?
        };

        let outcome = executor.execute(name, &task, cancel).await;

        let mut nodes = self.lock();
        let node = nodes
            .get_mut(name)
            .ok_or_else(|| DagrunError::NodeNotFound(name.to_string()))?;
        node.complete(outcome)
    }

    /// Record `error` on a node whose execution never reported back, e.g.
    /// because the executor panicked. A node that already reached a terminal
    /// status is left as it is.
    pub(crate) fn fail_running(&self, name: &str, error: ExecutionError) -> Result<NodeStatus> {
        let mut nodes = self.lock();
        let node = nodes
            .get_mut(name)
            .ok_or_else(|| DagrunError::NodeNotFound(name.to_string()))?;
        if node.status().is_terminal() {
            return Ok(node.status());
        }
        node.complete(Err(error))
    }

    /// Consistent copy of every node, sorted by name.
    pub fn snapshot(&self) -> Vec<NodeSnapshot> {
        self.lock()
            .values()
            .map(|node| NodeSnapshot {
                name: node.name().to_string(),
                status: node.status(),
                task: node.task().clone(),
                started_at: node.started_at(),
                finished_at: node.finished_at(),
                error: node.error().cloned(),
            })
            .collect()
    }

    /// Classify every node for the end-of-run summary.
    ///
    /// When `aborted` is set, nodes whose task was cancelled count as
    /// skipped rather than failed, and so do the nodes waiting on them.
    pub fn summary(&self, aborted: bool, elapsed: Duration) -> RunSummary {
        let nodes = self.lock();
        let mut summary = RunSummary {
            graph: self.name.clone(),
            aborted,
            elapsed,
            ..RunSummary::default()
        };

        for (name, node) in nodes.iter() {
            match node.status() {
                NodeStatus::Done => summary.done += 1,
                NodeStatus::Error if is_failure(node, aborted) => {
                    summary.error += 1;
                    summary.failed_nodes.push(name.clone());
                }
                NodeStatus::Init if has_failed_ancestor(&nodes, node, aborted) => {
                    summary.unreachable += 1;
                    summary.unreachable_nodes.push(name.clone());
                }
                status => {
                    if status == NodeStatus::Running {
                        warn!(graph = %self.name, node = %name, "node still running at summary time");
                    }
                    summary.skipped += 1;
                    summary.skipped_nodes.push(name.clone());
                }
            }
        }

        summary
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<NodeName, Node>> {
        self.nodes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Whether `node` ended in `Error` for a reason other than an abort.
fn is_failure(node: &Node, aborted: bool) -> bool {
    node.status() == NodeStatus::Error
        && !(aborted && node.error() == Some(&ExecutionError::Cancelled))
}

/// Whether any transitive dependency of `node` failed.
fn has_failed_ancestor(nodes: &BTreeMap<NodeName, Node>, node: &Node, aborted: bool) -> bool {
    let mut stack: Vec<&str> = node.dependencies().iter().map(String::as_str).collect();
    let mut visited: HashSet<&str> = HashSet::new();

    while let Some(name) = stack.pop() {
        if !visited.insert(name) {
            continue;
        }
        if let Some(dep) = nodes.get(name) {
            if is_failure(dep, aborted) {
                return true;
            }
            stack.extend(dep.dependencies().iter().map(String::as_str));
        }
    }

    false
}
