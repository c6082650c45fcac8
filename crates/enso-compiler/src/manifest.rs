//! Project manifest parsing
//!
//! A project manifest describes the modules of a project together with the
//! bindings maps upstream analysis would produce for them. It is read from
//! TOML or, by extension, JSON.
//!
//! ```toml
//! [project]
//! name = "demo"
//!
//! [resolution]
//! report_ambiguity = false
//!
//! [[modules]]
//! name = "Lib.Data"
//! source = "src/Data.enso"
//! entities = [
//!     { name = "Maybe", kind = "type" },
//!     { name = "Some", kind = "constructor", of_type = "Maybe" },
//! ]
//! exports = [{ path = "Lib.Util", form = "all", hiding = ["debug"] }]
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::bindings::{BindingsMap, DefinedEntity, ExportDecl};
use crate::context::{CompilerContext, Module};
use crate::name::QualifiedName;
use crate::options::ResolutionOptions;

/// Errors that can occur while loading a manifest
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Failed to read the manifest file
    #[error("Failed to read manifest '{}': {source}", path.display())]
    Io {
        /// Manifest path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse manifest: {0}")]
    Toml(#[from] toml::de::Error),

    /// Failed to parse JSON
    #[error("Failed to parse manifest: {0}")]
    Json(#[from] serde_json::Error),

    /// Two modules share a name
    #[error("Module '{0}' is declared more than once")]
    DuplicateModule(QualifiedName),

    /// Validation error
    #[error("Invalid manifest: {0}")]
    Invalid(String),

    /// Extension is neither `.toml` nor `.json`
    #[error("Unsupported manifest format '{0}'")]
    UnsupportedFormat(String),
}

/// Project manifest
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectManifest {
    /// Project metadata
    pub project: ProjectInfo,

    /// Resolution options
    #[serde(default)]
    pub resolution: ResolutionOptions,

    /// Modules in compilation batch order
    #[serde(default)]
    pub modules: Vec<ModuleManifest>,
}

/// Project information
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectInfo {
    /// Project name
    pub name: String,
}

/// One module of the project
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModuleManifest {
    /// Qualified module name
    pub name: QualifiedName,

    /// Module declared `private`
    #[serde(default)]
    pub private: bool,

    /// Source file, relative to the manifest
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,

    /// Bindings not computed yet
    #[serde(default)]
    pub pending: bool,

    /// Already compiled library module; resolved before the project batch
    #[serde(default)]
    pub external: bool,

    /// Module-level definitions
    #[serde(default)]
    pub entities: Vec<DefinedEntity>,

    /// Export declarations in source order
    #[serde(default)]
    pub exports: Vec<ExportDecl>,
}

impl ModuleManifest {
    fn to_module(&self, root: &Path) -> Module {
        let module = if self.pending {
            Module::pending(self.name.clone())
        } else {
            Module::new(
                self.name.clone(),
                BindingsMap {
                    private: self.private,
                    defined_entities: self.entities.clone(),
                    exports: self.exports.clone(),
                    ..BindingsMap::default()
                },
            )
        };

        match &self.source {
            Some(source) => module.with_source(root.join(source)),
            None => module,
        }
    }
}

impl ProjectManifest {
    /// Parse a manifest from a file; the format follows the extension
    pub fn from_path(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            Some("json") => Self::from_json_str(&content),
            Some(other) => Err(ManifestError::UnsupportedFormat(other.to_string())),
            None => Err(ManifestError::UnsupportedFormat(String::new())),
        }
    }

    /// Parse a TOML manifest
    pub fn from_toml_str(content: &str) -> Result<Self, ManifestError> {
        let manifest: ProjectManifest = toml::from_str(content)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Parse a JSON manifest
    pub fn from_json_str(content: &str) -> Result<Self, ManifestError> {
        let manifest: ProjectManifest = serde_json::from_str(content)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Validate the manifest
    pub fn validate(&self) -> Result<(), ManifestError> {
        if self.project.name.is_empty() {
            return Err(ManifestError::Invalid("project name cannot be empty".to_string()));
        }

        let mut seen = rustc_hash::FxHashSet::default();
        for module in &self.modules {
            if module.name.as_str().is_empty() {
                return Err(ManifestError::Invalid("module name cannot be empty".to_string()));
            }
            if !seen.insert(&module.name) {
                return Err(ManifestError::DuplicateModule(module.name.clone()));
            }
        }

        Ok(())
    }

    /// Build a compiler context; source paths are resolved against `root`
    pub fn to_context(&self, root: &Path) -> CompilerContext {
        let mut ctx = CompilerContext::new();
        for module in &self.modules {
            ctx.add(module.to_module(root));
        }
        ctx
    }

    /// Project modules, in declaration order
    pub fn batch(&self) -> Vec<QualifiedName> {
        self.modules
            .iter()
            .filter(|m| !m.external)
            .map(|m| m.name.clone())
            .collect()
    }

    /// Library modules, in declaration order
    pub fn external_batch(&self) -> Vec<QualifiedName> {
        self.modules
            .iter()
            .filter(|m| m.external)
            .map(|m| m.name.clone())
            .collect()
    }
}
