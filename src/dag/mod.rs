// src/dag/mod.rs

//! Graph representation and node state.
//!
//! - [`node`] holds a single task and its `Init -> Ready -> Running ->
//!   Done | Error` state machine.
//! - [`graph`] owns the node set behind one lock and computes readiness.
//! - [`validate`] checks dependency existence and acyclicity.
//! - [`summary`] provides node snapshots and the end-of-run summary.

pub mod graph;
pub mod node;
pub mod summary;
mod validate;

pub use graph::Graph;
pub use node::Node;
pub use summary::{NodeSnapshot, RunSummary};
