// tests/node_state_machine.rs

use dagrun::engine::CancelSignal;
use dagrun::errors::DagrunError;
use dagrun::{ExecutionError, Node, NodeStatus};
use dagrun_test_utils::fake_executor::FakeExecutor;
use dagrun_test_utils::init_tracing;

#[test]
fn new_node_starts_in_init_with_its_own_dependencies() {
    let mut a = Node::new("a", "ok", Vec::<String>::new());
    let b = Node::new("b", "ok", Vec::<String>::new());

    a.add_dependency("x");
    a.add_dependency("x");

    assert_eq!(a.status(), NodeStatus::Init);
    assert_eq!(a.dependencies().len(), 1);
    assert!(b.dependencies().is_empty(), "dependency sets must not be shared");
}

#[test]
fn mark_ready_only_from_init() {
    let mut node = Node::new("a", "ok", ["b"]);
    node.mark_ready().unwrap();
    assert_eq!(node.status(), NodeStatus::Ready);

    match node.mark_ready() {
        Err(DagrunError::InvalidTransition { from, to, .. }) => {
            assert_eq!(from, NodeStatus::Ready);
            assert_eq!(to, NodeStatus::Ready);
        }
        other => panic!("expected InvalidTransition, got {:?}", other),
    }
    assert_eq!(node.status(), NodeStatus::Ready);
}

#[test]
fn start_requires_ready_and_does_not_mutate_on_rejection() {
    let mut node = Node::new("a", "echo a", Vec::<String>::new());

    match node.start() {
        Err(DagrunError::NotReady { node: name, status }) => {
            assert_eq!(name, "a");
            assert_eq!(status, NodeStatus::Init);
        }
        other => panic!("expected NotReady, got {:?}", other),
    }
    assert_eq!(node.status(), NodeStatus::Init);
    assert!(node.started_at().is_none());

    node.mark_ready().unwrap();
    let task = node.start().unwrap();
    assert_eq!(task.cmd(), "echo a");
    assert_eq!(node.status(), NodeStatus::Running);
    assert!(node.started_at().is_some());
}

#[test]
fn complete_records_terminal_state_and_error() {
    let mut ok = Node::new("ok", "ok", Vec::<String>::new());
    ok.mark_ready().unwrap();
    ok.start().unwrap();
    assert_eq!(ok.complete(Ok(())).unwrap(), NodeStatus::Done);
    assert!(ok.error().is_none());
    assert!(ok.finished_at().is_some());

    let mut bad = Node::new("bad", "fail", Vec::<String>::new());
    bad.mark_ready().unwrap();
    bad.start().unwrap();
    assert_eq!(
        bad.complete(Err(ExecutionError::ExitCode(3))).unwrap(),
        NodeStatus::Error
    );
    assert_eq!(bad.error(), Some(&ExecutionError::ExitCode(3)));

    // Terminal states are final.
    assert!(bad.mark_ready().is_err());
    assert!(bad.start().is_err());
    assert!(bad.complete(Ok(())).is_err());
    assert_eq!(bad.status(), NodeStatus::Error);
}

#[tokio::test]
async fn run_executes_task_once_and_records_outcome() {
    init_tracing();
    let executor = FakeExecutor::new();

    let mut node = Node::new("hello", "sleep:5", Vec::<String>::new());
    node.mark_ready().unwrap();
    let status = node.run(&executor, CancelSignal::never()).await.unwrap();
    assert_eq!(status, NodeStatus::Done);

    // Second run is rejected and does not execute the task again.
    assert!(matches!(
        node.run(&executor, CancelSignal::never()).await,
        Err(DagrunError::NotReady { .. })
    ));
    assert_eq!(executor.started(), vec!["hello".to_string()]);
    assert_eq!(node.status(), NodeStatus::Done);
}

#[tokio::test]
async fn run_failure_is_a_status_not_an_error() {
    init_tracing();
    let executor = FakeExecutor::new();

    let mut node = Node::new("boom", "fail:7", Vec::<String>::new());
    node.mark_ready().unwrap();

    let status = node.run(&executor, CancelSignal::never()).await.unwrap();
    assert_eq!(status, NodeStatus::Error);
    assert_eq!(node.error(), Some(&ExecutionError::ExitCode(7)));
}

#[tokio::test]
async fn run_on_init_node_is_rejected_without_executing() {
    init_tracing();
    let executor = FakeExecutor::new();

    let mut node = Node::new("early", "ok", Vec::<String>::new());
    let result = node.run(&executor, CancelSignal::never()).await;

    assert!(matches!(result, Err(DagrunError::NotReady { .. })));
    assert_eq!(node.status(), NodeStatus::Init);
    assert!(executor.started().is_empty());
}
