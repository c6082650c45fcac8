//! Privacy rules for exports
//!
//! A private module may not export anything, and nothing may export a
//! private module or its members. Offending edges stay in the graph, so they
//! still count for ordering and cycle detection, but are suppressed and
//! contribute no symbols.

use super::graph::ExportGraph;
use crate::context::CompilerContext;
use crate::diagnostic::{DiagnosticSink, ExportDiagnostic};

/// Suppress edges that violate privacy and report each offending declaration
pub fn enforce(graph: &mut ExportGraph, ctx: &CompilerContext, sink: &mut DiagnosticSink) {
    let edges: Vec<_> = graph.edge_ids().collect();
    let mut suppressed = 0usize;

    for id in edges {
        let edge = graph.edge(id);
        let exporter = graph.node(edge.exporter).target.module().clone();
        let exportee = graph.node(edge.exportee).target.module().clone();

        let violation = |span| {
            if ctx.is_private(&exporter) {
                Some(ExportDiagnostic::ExportFromPrivateModule {
                    module: exporter.clone(),
                    span,
                })
            } else if exportee != exporter && ctx.is_private(&exportee) {
                Some(ExportDiagnostic::ExportPrivateModule {
                    module: exportee.clone(),
                    span,
                })
            } else {
                None
            }
        };

        let reports: Vec<_> = edge.origins.iter().filter_map(|span| violation(*span)).collect();
        if reports.is_empty() {
            continue;
        }

        for report in reports {
            sink.report(&exporter, report);
        }
        graph.edge_mut(id).suppressed = true;
        suppressed += 1;
    }

    if suppressed > 0 {
        tracing::debug!(suppressed, "privacy rules suppressed export edges");
    }
}
