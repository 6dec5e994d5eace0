// tests/graph_readiness.rs

use dagrun::dag::Graph;
use dagrun::engine::CancelSignal;
use dagrun::errors::DagrunError;
use dagrun::{Node, NodeStatus};
use dagrun_test_utils::builders::{GraphBuilder, bedtime_graph};
use dagrun_test_utils::fake_executor::FakeExecutor;
use dagrun_test_utils::init_tracing;

#[test]
fn duplicate_names_are_rejected() {
    let mut graph = Graph::new("g", 1);
    graph.add_task("a", "ok", Vec::<String>::new()).unwrap();

    match graph.add_node(Node::new("a", "other", Vec::<String>::new())) {
        Err(DagrunError::DuplicateName(name)) => assert_eq!(name, "a"),
        other => panic!("expected DuplicateName, got {:?}", other),
    }
    assert_eq!(graph.len(), 1);
}

#[test]
fn dependencies_may_be_added_before_their_targets() {
    let graph = GraphBuilder::new("g", 1)
        .node("b", "ok", &["a"])
        .node("a", "ok", &[])
        .build();

    graph.validate().unwrap();
    assert_eq!(graph.topological_order().unwrap(), vec!["a", "b"]);
}

#[test]
fn missing_dependency_is_invalid_graph() {
    let graph = GraphBuilder::new("g", 1)
        .node("a", "ok", &[])
        .node("b", "ok", &["a", "ghost"])
        .build();

    match graph.validate() {
        Err(DagrunError::InvalidGraph { node, dependency }) => {
            assert_eq!(node, "b");
            assert_eq!(dependency, "ghost");
        }
        other => panic!("expected InvalidGraph, got {:?}", other),
    }
}

#[test]
fn two_node_cycle_is_cyclic_graph() {
    let graph = GraphBuilder::new("g", 1)
        .node("a", "ok", &["b"])
        .node("b", "ok", &["a"])
        .node("c", "ok", &[])
        .build();

    match graph.validate() {
        Err(DagrunError::CyclicGraph(msg)) => {
            assert!(msg.contains("cycle detected"), "{msg}");
            assert!(msg.contains('a') && msg.contains('b'), "{msg}");
            assert!(!msg.contains("c,"), "{msg}");
        }
        other => panic!("expected CyclicGraph, got {:?}", other),
    }
}

#[test]
fn self_dependency_is_cyclic_graph() {
    let graph = GraphBuilder::new("g", 1).node("a", "ok", &["a"]).build();
    assert!(matches!(graph.validate(), Err(DagrunError::CyclicGraph(_))));
}

#[test]
fn longer_cycle_is_detected() {
    let graph = GraphBuilder::new("g", 1)
        .node("root", "ok", &[])
        .node("x", "ok", &["root", "z"])
        .node("y", "ok", &["x"])
        .node("z", "ok", &["y"])
        .build();

    match graph.validate() {
        Err(DagrunError::CyclicGraph(msg)) => {
            assert!(msg.contains("x, y, z"), "{msg}");
        }
        other => panic!("expected CyclicGraph, got {:?}", other),
    }
}

#[test]
fn empty_dependency_nodes_become_ready_immediately() {
    let graph = bedtime_graph(2, [10, 10, 10]);

    let promoted = graph.refresh_readiness();
    assert_eq!(promoted, vec!["hello"]);
    assert_eq!(graph.status_of("hello"), Some(NodeStatus::Ready));
    assert_eq!(graph.status_of("eat"), Some(NodeStatus::Init));
}

#[test]
fn refresh_readiness_is_idempotent() {
    let graph = GraphBuilder::new("g", 1)
        .node("b", "ok", &[])
        .node("a", "ok", &[])
        .node("c", "ok", &["a"])
        .build();

    assert_eq!(graph.refresh_readiness(), vec!["a", "b"]);
    assert!(graph.refresh_readiness().is_empty());
    assert_eq!(graph.nodes_with_status(NodeStatus::Ready), vec!["a", "b"]);
    assert_eq!(graph.nodes_with_status(NodeStatus::Init), vec!["c"]);
}

#[test]
fn snapshot_is_sorted_by_name() {
    let graph = GraphBuilder::new("g", 1)
        .node("zeta", "ok", &[])
        .node("alpha", "ok", &["zeta"])
        .node("mid", "ok", &[])
        .build();

    let names: Vec<_> = graph.snapshot().into_iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["alpha", "mid", "zeta"]);

    let counts = graph.status_counts();
    assert_eq!(counts[&NodeStatus::Init], 3);
    assert_eq!(counts[&NodeStatus::Done], 0);
}

#[tokio::test]
async fn run_node_promotes_dependents_only_after_done() {
    init_tracing();
    let executor = FakeExecutor::new();
    let graph = GraphBuilder::new("g", 1)
        .node("a", "ok", &[])
        .node("b", "ok", &["a"])
        .build();

    assert_eq!(graph.refresh_readiness(), vec!["a"]);

    // Not ready yet: rejected without side effects.
    assert!(matches!(
        graph.run_node("b", &executor, CancelSignal::never()).await,
        Err(DagrunError::NotReady { .. })
    ));
    assert_eq!(graph.status_of("b"), Some(NodeStatus::Init));

    let status = graph.run_node("a", &executor, CancelSignal::never()).await.unwrap();
    assert_eq!(status, NodeStatus::Done);
    assert_eq!(graph.refresh_readiness(), vec!["b"]);

    assert!(matches!(
        graph.run_node("missing", &executor, CancelSignal::never()).await,
        Err(DagrunError::NodeNotFound(_))
    ));
}

#[tokio::test]
async fn failed_dependency_blocks_promotion_forever() {
    init_tracing();
    let executor = FakeExecutor::new();
    let graph = GraphBuilder::new("g", 1)
        .node("a", "fail", &[])
        .node("b", "ok", &["a"])
        .node("c", "ok", &["b"])
        .build();

    graph.refresh_readiness();
    let status = graph.run_node("a", &executor, CancelSignal::never()).await.unwrap();
    assert_eq!(status, NodeStatus::Error);

    for _ in 0..3 {
        assert!(graph.refresh_readiness().is_empty());
    }
    assert_eq!(graph.status_of("b"), Some(NodeStatus::Init));

    let summary = graph.summary(false, std::time::Duration::ZERO);
    assert_eq!(summary.error, 1);
    assert_eq!(summary.unreachable, 2);
    assert_eq!(summary.unreachable_nodes, vec!["b", "c"]);
    assert_eq!(summary.done, 0);
}
