// src/dag/validate.rs

//! Well-formedness checks run before any readiness pass.

use std::collections::BTreeMap;

use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graphmap::DiGraphMap;

use crate::dag::node::Node;
use crate::errors::{DagrunError, Result};
use crate::types::NodeName;

/// Check that every dependency names an existing node and that the
/// dependency relation is acyclic.
///
/// Nodes and dependencies are visited in name order so the reported error is
/// deterministic.
pub(crate) fn validate_nodes(nodes: &BTreeMap<NodeName, Node>) -> Result<()> {
    validate_dependencies(nodes)?;
    topological_order(nodes).map(|_| ())
}

fn validate_dependencies(nodes: &BTreeMap<NodeName, Node>) -> Result<()> {
    for (name, node) in nodes.iter() {
        for dep in node.dependencies() {
            if dep == name {
                return Err(DagrunError::CyclicGraph(format!(
                    "node '{}' depends on itself",
                    name
                )));
            }
            if !nodes.contains_key(dep) {
                return Err(DagrunError::InvalidGraph {
                    node: name.clone(),
                    dependency: dep.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Topological order of the node names (dependencies first).
///
/// Assumes every dependency exists; unknown names are added as bare graph
/// nodes and do not change the cycle verdict.
pub(crate) fn topological_order(nodes: &BTreeMap<NodeName, Node>) -> Result<Vec<NodeName>> {
    // Edge direction: dep -> node. For `eat` depending on `hello` we add
    // hello -> eat.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in nodes.keys() {
        graph.add_node(name.as_str());
    }

    for (name, node) in nodes.iter() {
        for dep in node.dependencies() {
            graph.add_edge(dep.as_str(), name.as_str(), ());
        }
    }

    match toposort(&graph, None) {
        Ok(order) => Ok(order.into_iter().map(str::to_string).collect()),
        Err(cycle) => {
            let sccs: Vec<Vec<&str>> = tarjan_scc(&graph)
                .into_iter()
                .filter(|scc| scc.len() > 1)
                .collect();
            let members = sccs
                .iter()
                .find(|scc| scc.contains(&cycle.node_id()))
                .or_else(|| sccs.first())
                .map(|scc| {
                    let mut scc = scc.clone();
                    scc.sort_unstable();
                    scc.join(", ")
                })
                .unwrap_or_else(|| cycle.node_id().to_string());

            Err(DagrunError::CyclicGraph(format!(
                "cycle detected involving node '{}' (members: {})",
                cycle.node_id(),
                members
            )))
        }
    }
}
