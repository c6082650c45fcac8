//! Enso Compiler Core
//!
//! Export resolution for Enso modules:
//! - **Bindings**: what each module defines and declares to export (`bindings`)
//! - **Context**: the registry of modules taking part in a compilation (`context`)
//! - **Exports**: export graph, cycle detection, ordering and symbol resolution (`exports`)
//! - **Manifest**: project descriptions loaded from TOML or JSON (`manifest`)
//!
//! # Example
//!
//! ```rust,ignore
//! use enso_compiler::{BindingsMap, CompilerContext, DefinedEntity, ExportDecl, ExportsResolution, Module};
//!
//! let mut ctx = CompilerContext::new()
//!     .with(Module::new("Lib.Data", BindingsMap::new().define(DefinedEntity::ty("Maybe"))))
//!     .with(Module::new("Lib.Main", BindingsMap::new().export(ExportDecl::module("Lib.Data"))));
//!
//! let order = ExportsResolution::new(&mut ctx).run(&["Lib.Main".into(), "Lib.Data".into()])?;
//! assert_eq!(order, vec!["Lib.Data".into(), "Lib.Main".into()]);
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

/// Per-module bindings maps
pub mod bindings;

/// Module registry
pub mod context;

/// Export diagnostics and their rendering
pub mod diagnostic;

/// Fatal resolution errors
pub mod error;

/// Export resolution
pub mod exports;

/// Project manifests
pub mod manifest;

/// Qualified names
pub mod name;

/// Resolution options
pub mod options;

/// Source locations
pub mod span;

pub use bindings::{
    BindingsMap, DefinedEntity, EntityKind, ExportDecl, ExportKind, ExportedModule, ExportedSymbols,
    ImportTarget,
};
pub use context::{CompilerContext, Module};
pub use diagnostic::{Diagnostic, DiagnosticSink, ErrorCode, ExportDiagnostic};
pub use error::ExportCycleError;
pub use exports::ExportsResolution;
pub use manifest::{ManifestError, ProjectManifest};
pub use name::QualifiedName;
pub use options::ResolutionOptions;
pub use span::Span;
