//! Fatal errors of export resolution

use thiserror::Error;

use crate::name::QualifiedName;

/// Export declarations form a cycle.
///
/// This is the only failure that aborts a resolution run; the listed modules
/// cannot be compiled until the cycle is broken.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Export statements form a cycle: {}", format_cycle(.modules))]
pub struct ExportCycleError {
    /// Modules along the cycle, in export order
    pub modules: Vec<QualifiedName>,
}

fn format_cycle(cycle: &[QualifiedName]) -> String {
    let mut parts: Vec<&str> = cycle.iter().map(QualifiedName::as_str).collect();
    if let Some(first) = cycle.first() {
        parts.push(first.as_str());
    }
    parts.join(" -> ")
}
