//! `ensoc resolve`: print resolved exports and exported symbols.

use enso_compiler::{BindingsMap, ExportedModule};
use serde_json::json;
use std::path::Path;

use super::Project;
use crate::output::StyledOutput;

pub fn execute(manifest: &Path, format: &str, out: &mut StyledOutput) -> anyhow::Result<()> {
    let mut project = Project::load(manifest)?;
    let order = project.resolve()?;

    if format == "json" {
        let modules: Vec<_> = order
            .iter()
            .filter_map(|name| project.context.get(name))
            .map(|module| {
                let bindings = module.bindings.as_ref();
                json!({
                    "name": module.name,
                    "resolved_exports": bindings.map(|b| &b.resolved_exports),
                    "exported_symbols": bindings.map(|b| &b.exported_symbols),
                    "diagnostics": module.diagnostics,
                })
            })
            .collect();
        let report = json!({
            "project": project.manifest.project.name,
            "order": order,
            "modules": modules,
        });
        out.plain(&serde_json::to_string_pretty(&report)?);
        out.newline();
        return Ok(());
    }

    for name in &order {
        let Some(module) = project.context.get(name) else {
            continue;
        };
        out.bold(name.as_str());
        out.newline();
        match &module.bindings {
            Some(bindings) => print_bindings(bindings, out),
            None => {
                out.warning("  bindings not computed");
                out.newline();
            }
        }
        if !module.diagnostics.is_empty() {
            out.error(&format!("  {} diagnostic(s)", module.diagnostics.len()));
            out.newline();
        }
    }
    Ok(())
}

fn print_bindings(bindings: &BindingsMap, out: &mut StyledOutput) {
    if bindings.resolved_exports.is_empty() && bindings.exported_symbols.is_empty() {
        out.dim("  (exports nothing)");
        out.newline();
        return;
    }

    for export in &bindings.resolved_exports {
        out.plain("  export ");
        out.info(&describe(export));
        out.newline();
    }
    for (symbol, targets) in &bindings.exported_symbols {
        let targets: Vec<String> = targets.iter().map(ToString::to_string).collect();
        out.plain(&format!("  {} ", symbol));
        out.dim("->");
        out.plain(&format!(" {}", targets.join(", ")));
        out.newline();
    }
}

fn describe(export: &ExportedModule) -> String {
    let mut text = export.target.to_string();
    if let Some(alias) = &export.exported_as {
        text.push_str(" as ");
        text.push_str(alias);
    }
    if !export.symbols.is_empty() {
        text.push_str(&format!(" {{{}}}", export.symbols.join(", ")));
    }
    text
}
