//! `ensoc order`: print the compilation order.

use std::path::Path;

use super::Project;
use crate::output::StyledOutput;

pub fn execute(manifest: &Path, fast: bool, out: &mut StyledOutput) -> anyhow::Result<()> {
    let mut project = Project::load(manifest)?;
    let order = if fast { project.sort() } else { project.resolve()? };

    for (index, module) in order.iter().enumerate() {
        out.dim(&format!("{:>4}  ", index + 1));
        out.plain(module.as_str());
        out.newline();
    }

    if !fast && project.diagnostic_count() > 0 {
        out.warning("warning");
        out.plain(&format!(
            ": {} export diagnostic(s); run `ensoc check` for details",
            project.diagnostic_count()
        ));
        out.newline();
    }
    Ok(())
}
