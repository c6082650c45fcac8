//! Export cycle detection
//!
//! Depth-first search over export edges. A cycle is reported once the search
//! unwinds back to the node that closes it; every disjoint cycle reachable
//! from some root is collected.

use rustc_hash::FxHashSet;

use super::graph::{ExportGraph, NodeId};

/// Find export cycles.
///
/// Each cycle lists its nodes in export order, starting at the node where
/// the search entered it. An empty result means the graph is acyclic.
pub fn find_cycles(graph: &ExportGraph) -> Vec<Vec<NodeId>> {
    let mut search = CycleSearch {
        graph,
        visited: FxHashSet::default(),
        in_progress: FxHashSet::default(),
        found: Vec::new(),
    };

    for node in graph.node_ids() {
        search.visit(node);
    }

    search.found
}

struct CycleSearch<'g> {
    graph: &'g ExportGraph,
    visited: FxHashSet<NodeId>,
    in_progress: FxHashSet<NodeId>,
    found: Vec<Vec<NodeId>>,
}

impl CycleSearch<'_> {
    /// Returns the node closing an open cycle and the path walked since it
    fn visit(&mut self, node: NodeId) -> Option<(NodeId, Vec<NodeId>)> {
        if self.in_progress.contains(&node) {
            return Some((node, Vec::new()));
        }
        if self.visited.contains(&node) {
            return None;
        }

        self.in_progress.insert(node);
        let graph = self.graph;
        let mut first = None;
        for child in graph.exportees(node) {
            let result = self.visit(child);
            if first.is_none() {
                first = result;
            }
        }
        self.in_progress.remove(&node);
        self.visited.insert(node);

        let (closing, mut path) = first?;
        path.insert(0, node);
        if closing == node {
            self.found.push(path);
            None
        } else {
            Some((closing, path))
        }
    }
}
