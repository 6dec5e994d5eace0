// tests/scheduler_property.rs

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use proptest::prelude::*;
use dagrun::dag::Graph;
use dagrun::engine::Scheduler;
use dagrun::NodeStatus;
use dagrun_test_utils::fake_executor::FakeExecutor;

/// One generated node: its dependencies (indices of earlier nodes), whether
/// its task fails and how long it sleeps.
#[derive(Debug, Clone)]
struct NodePlan {
    deps: BTreeSet<usize>,
    fails: bool,
    sleep_ms: u64,
}

// Acyclic by construction: node N may only depend on nodes 0..N-1.
fn dag_strategy(max_nodes: usize) -> impl Strategy<Value = Vec<NodePlan>> {
    (1..=max_nodes).prop_flat_map(|count| {
        proptest::collection::vec(
            (
                proptest::collection::vec(any::<usize>(), 0..4),
                proptest::bool::weighted(0.15),
                0..4u64,
            ),
            count,
        )
        .prop_map(|raw| {
            raw.into_iter()
                .enumerate()
                .map(|(i, (deps, fails, sleep_ms))| NodePlan {
                    deps: if i == 0 {
                        BTreeSet::new()
                    } else {
                        deps.into_iter().map(|d| d % i).collect()
                    },
                    fails,
                    sleep_ms,
                })
                .collect()
        })
    })
}

fn node_name(i: usize) -> String {
    format!("n{i:02}")
}

fn build_graph(plans: &[NodePlan], threads: usize) -> Graph {
    let mut graph = Graph::new("prop", threads);
    // Insert in reverse so dependencies are usually added after dependents.
    for (i, plan) in plans.iter().enumerate().rev() {
        let mut cmd = format!("sleep:{}", plan.sleep_ms);
        if plan.fails {
            cmd.push_str(";fail");
        }
        graph
            .add_task(node_name(i), cmd, plan.deps.iter().map(|&d| node_name(d)))
            .unwrap();
    }
    graph
}

/// Expected outcome: a node runs iff none of its ancestors failed.
fn expected_statuses(plans: &[NodePlan]) -> Vec<NodeStatus> {
    let mut out: Vec<NodeStatus> = Vec::with_capacity(plans.len());
    for plan in plans {
        let blocked = plan.deps.iter().any(|&d| out[d] != NodeStatus::Done);
        out.push(if blocked {
            NodeStatus::Init
        } else if plan.fails {
            NodeStatus::Error
        } else {
            NodeStatus::Done
        });
    }
    out
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn random_dags_run_to_a_predictable_fixpoint(
        plans in dag_strategy(14),
        threads in 1..5usize,
    ) {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .unwrap();

        let executor = Arc::new(FakeExecutor::new());
        let graph = Arc::new(build_graph(&plans, threads));
        let summary = runtime
            .block_on(Scheduler::from_arc(Arc::clone(&executor)).run(Arc::clone(&graph)))
            .unwrap();

        // Liveness: nothing left queued or running.
        prop_assert!(graph.nodes_with_status(NodeStatus::Ready).is_empty());
        prop_assert!(graph.nodes_with_status(NodeStatus::Running).is_empty());

        // Final state matches the failure-propagation rule.
        let expected = expected_statuses(&plans);
        for (i, want) in expected.iter().enumerate() {
            prop_assert_eq!(graph.status_of(&node_name(i)), Some(*want), "node {}", i);
        }

        // At most once, and only nodes whose dependencies all succeeded.
        let started = executor.started();
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for name in &started {
            *counts.entry(name.as_str()).or_default() += 1;
        }
        prop_assert!(counts.values().all(|&c| c == 1));
        let ran = expected.iter().filter(|s| **s != NodeStatus::Init).count();
        prop_assert_eq!(started.len(), ran);

        // Causal order: every dependency finished before its dependent started.
        let intervals: HashMap<String, _> = executor
            .intervals()
            .into_iter()
            .map(|i| (i.node.clone(), i))
            .collect();
        for (i, plan) in plans.iter().enumerate() {
            let Some(me) = intervals.get(&node_name(i)) else { continue };
            for &d in &plan.deps {
                let dep = &intervals[&node_name(d)];
                prop_assert!(dep.success);
                prop_assert!(dep.end <= me.start, "{} started before {} ended", i, d);
            }
        }

        // Summary accounts for every node.
        prop_assert_eq!(summary.total(), plans.len());
        prop_assert_eq!(summary.skipped, 0);
        prop_assert_eq!(summary.done, expected.iter().filter(|s| **s == NodeStatus::Done).count());
        prop_assert_eq!(summary.error, expected.iter().filter(|s| **s == NodeStatus::Error).count());
        prop_assert_eq!(summary.is_success(), expected.iter().all(|s| *s == NodeStatus::Done));
    }
}
