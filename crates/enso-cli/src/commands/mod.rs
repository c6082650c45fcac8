//! Subcommands and the project loading they share

pub mod check;
pub mod order;
pub mod resolve;

use anyhow::Context;
use enso_compiler::{CompilerContext, ExportsResolution, ProjectManifest, QualifiedName};
use std::path::Path;
use tracing::{info, warn};

/// A loaded project: its manifest and the compiler context built from it
pub struct Project {
    pub manifest: ProjectManifest,
    pub context: CompilerContext,
}

impl Project {
    /// Load a manifest; module sources are relative to its directory
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let manifest = ProjectManifest::from_path(path)
            .with_context(|| format!("Failed to load project manifest {}", path.display()))?;
        let root = path.parent().unwrap_or_else(|| Path::new("."));
        let context = manifest.to_context(root);

        info!(
            project = %manifest.project.name,
            modules = context.len(),
            "loaded project"
        );
        Ok(Self { manifest, context })
    }

    /// Resolve library modules, then the project batch.
    ///
    /// Returns the compilation order of the project batch.
    pub fn resolve(&mut self) -> anyhow::Result<Vec<QualifiedName>> {
        let options = self.manifest.resolution;

        let libraries = self.manifest.external_batch();
        if !libraries.is_empty() {
            ExportsResolution::with_options(&mut self.context, options)
                .run(&libraries)
                .context("Failed to resolve library modules")?;
        }

        let order = ExportsResolution::with_options(&mut self.context, options)
            .run(&self.manifest.batch())
            .context("Failed to resolve project modules")?;

        for module in self.context.invalidated() {
            warn!(module = %module, "module has no bindings and needs re-analysis");
        }
        Ok(order)
    }

    /// Order the project batch without resolving it
    pub fn sort(&mut self) -> Vec<QualifiedName> {
        ExportsResolution::with_options(&mut self.context, self.manifest.resolution)
            .run_sort(&self.manifest.batch())
    }

    /// Number of diagnostics attached to project modules
    pub fn diagnostic_count(&self) -> usize {
        self.manifest
            .modules
            .iter()
            .map(|m| self.context.diagnostics(&m.name).len())
            .sum()
    }
}
