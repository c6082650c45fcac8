//! `ensoc check`: resolve exports and report diagnostics.

use codespan_reporting::files::SimpleFiles;
use enso_compiler::{Diagnostic, Module};
use std::path::Path;
use tracing::warn;

use super::Project;
use crate::output::StyledOutput;

pub fn execute(manifest: &Path, out: &mut StyledOutput) -> anyhow::Result<()> {
    let mut project = Project::load(manifest)?;
    project.resolve()?;

    let mut files = SimpleFiles::new();
    let mut errors = 0usize;

    for entry in &project.manifest.modules {
        let Some(module) = project.context.get(&entry.name) else {
            continue;
        };
        if module.diagnostics.is_empty() {
            continue;
        }

        let file_id = add_source(&mut files, module);
        for diagnostic in &module.diagnostics {
            Diagnostic::from_export_diagnostic(diagnostic, file_id)
                .with_note(format!("in module '{}'", module.name))
                .emit(&files, out.color_choice())?;
            errors += 1;
        }
    }

    if errors > 0 {
        out.error("error");
        out.plain(&format!(": {} export error(s) in project '{}'", errors, project.manifest.project.name));
        out.newline();
        anyhow::bail!("export check failed");
    }

    out.success("ok");
    out.plain(&format!(": {} module(s) checked", project.manifest.batch().len()));
    out.newline();
    Ok(())
}

/// Register the module source for snippets; `None` if it cannot be read
fn add_source(files: &mut SimpleFiles<String, String>, module: &Module) -> Option<usize> {
    let path = module.source.as_ref()?;
    match std::fs::read_to_string(path) {
        Ok(source) => Some(files.add(path.display().to_string(), source)),
        Err(err) => {
            warn!(module = %module.name, path = %path.display(), "cannot read module source: {}", err);
            None
        }
    }
}
