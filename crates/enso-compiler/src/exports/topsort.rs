//! Topological ordering of the export graph
//!
//! Orders nodes so that every exportee precedes each of its exporters.

use std::collections::VecDeque;

use super::graph::{ExportGraph, NodeId};
use crate::bindings::ImportTarget;

/// Order nodes exportee-before-exporter.
///
/// A node's degree is the number of its outgoing export edges, plus one for
/// a type, constructor or method node that waits for the node of its module
/// (see [`entity_owners`]). Starting from the first zero-degree node in
/// creation order, nodes are drained through a FIFO queue; processing a node
/// decrements each exporter referencing it and each entity waiting for it,
/// and enqueues those that reach zero. The result is stable for a fixed
/// creation order.
///
/// The graph should be acyclic. Nodes on or behind a cycle never reach zero
/// and are appended at the end in creation order.
pub fn topological_order(graph: &ExportGraph) -> Vec<NodeId> {
    let owners = entity_owners(graph);
    let mut waiting: Vec<Vec<NodeId>> = vec![Vec::new(); graph.len()];
    for id in graph.node_ids() {
        if let Some(owner) = owners[id.index()] {
            waiting[owner.index()].push(id);
        }
    }

    let mut degrees: Vec<Option<usize>> = graph
        .node_ids()
        .map(|id| Some(graph.node(id).exports.len() + usize::from(owners[id.index()].is_some())))
        .collect();
    let mut result = Vec::with_capacity(graph.len());
    let mut queue = VecDeque::new();

    for start in graph.node_ids() {
        if degrees[start.index()] != Some(0) {
            continue;
        }
        degrees[start.index()] = None;
        queue.push_back(start);

        while let Some(item) = queue.pop_front() {
            result.push(item);
            let exporters = graph
                .node(item)
                .exported_by
                .iter()
                .map(|edge| graph.edge(*edge).exporter);
            for dependent in exporters.chain(waiting[item.index()].iter().copied()) {
                if let Some(degree) = degrees[dependent.index()].as_mut() {
                    *degree -= 1;
                    if *degree == 0 {
                        degrees[dependent.index()] = None;
                        queue.push_back(dependent);
                    }
                }
            }
        }
    }

    if result.len() < graph.len() {
        tracing::warn!(
            unordered = graph.len() - result.len(),
            "export graph is cyclic; appending unordered nodes"
        );
        result.extend(graph.node_ids().filter(|id| degrees[id.index()].is_some()));
    }

    result
}

/// Module node each entity node waits for.
///
/// A type, constructor or method node is ordered after the node of its
/// module when the graph has one. The wait is skipped when the module already
/// reaches the entity through exports (a module exporting its own type, or a
/// re-export coming back to it), which would otherwise close a loop.
pub fn entity_owners(graph: &ExportGraph) -> Vec<Option<NodeId>> {
    let mut owners: Vec<Option<NodeId>> = vec![None; graph.len()];
    for id in graph.node_ids() {
        let target = &graph.node(id).target;
        if matches!(target, ImportTarget::Module(_)) {
            continue;
        }
        let Some(owner) = graph.find(&ImportTarget::Module(target.module().clone())) else {
            continue;
        };
        if !reaches(graph, &owners, owner, id) {
            owners[id.index()] = Some(owner);
        }
    }
    owners
}

/// Whether `to` is reachable from `from` through exports and accepted waits
fn reaches(graph: &ExportGraph, owners: &[Option<NodeId>], from: NodeId, to: NodeId) -> bool {
    let mut visited = vec![false; graph.len()];
    let mut stack = vec![from];
    while let Some(node) = stack.pop() {
        if node == to {
            return true;
        }
        if std::mem::replace(&mut visited[node.index()], true) {
            continue;
        }
        stack.extend(graph.exportees(node));
        stack.extend(owners[node.index()]);
    }
    false
}
