//! Compiler context
//!
//! Registry of every module a compilation knows about: the batch being
//! resolved as well as already-compiled dependency modules. Export
//! resolution reads bindings maps from here and writes its results back.

use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxBuildHasher;
use std::path::PathBuf;

use crate::bindings::{BindingsMap, EntityKind, ImportTarget};
use crate::diagnostic::{DiagnosticSink, ExportDiagnostic};
use crate::name::QualifiedName;

type FxIndexMap<K, V> = IndexMap<K, V, FxBuildHasher>;
type FxIndexSet<T> = IndexSet<T, FxBuildHasher>;

/// A module known to the compiler
#[derive(Debug, Clone)]
pub struct Module {
    /// Qualified name
    pub name: QualifiedName,
    /// Bindings map; `None` until upstream analysis has run
    pub bindings: Option<BindingsMap>,
    /// Diagnostics attached by export resolution
    pub diagnostics: Vec<ExportDiagnostic>,
    /// Source file, when known
    pub source: Option<PathBuf>,
}

impl Module {
    /// Create a module with computed bindings
    pub fn new(name: impl Into<QualifiedName>, bindings: BindingsMap) -> Self {
        Self {
            name: name.into(),
            bindings: Some(bindings),
            diagnostics: Vec::new(),
            source: None,
        }
    }

    /// Create a module whose bindings have not been computed yet
    pub fn pending(name: impl Into<QualifiedName>) -> Self {
        Self {
            name: name.into(),
            bindings: None,
            diagnostics: Vec::new(),
            source: None,
        }
    }

    /// Attach a source path
    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Whether the module is declared private
    pub fn is_private(&self) -> bool {
        self.bindings.as_ref().is_some_and(|b| b.private)
    }
}

/// All modules of a compilation, in registration order
#[derive(Debug, Default)]
pub struct CompilerContext {
    modules: FxIndexMap<QualifiedName, Module>,
    invalidated: FxIndexSet<QualifiedName>,
}

impl CompilerContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module, returning the module it replaced
    pub fn add(&mut self, module: Module) -> Option<Module> {
        self.modules.insert(module.name.clone(), module)
    }

    /// Register a module (builder form)
    pub fn with(mut self, module: Module) -> Self {
        self.add(module);
        self
    }

    /// Get a module
    pub fn get(&self, name: &QualifiedName) -> Option<&Module> {
        self.modules.get(name)
    }

    /// Get a module mutably
    pub fn get_mut(&mut self, name: &QualifiedName) -> Option<&mut Module> {
        self.modules.get_mut(name)
    }

    /// Bindings of a module, if registered and computed
    pub fn bindings(&self, name: &QualifiedName) -> Option<&BindingsMap> {
        self.modules.get(name).and_then(|m| m.bindings.as_ref())
    }

    /// Mutable bindings of a module
    pub fn bindings_mut(&mut self, name: &QualifiedName) -> Option<&mut BindingsMap> {
        self.modules.get_mut(name).and_then(|m| m.bindings.as_mut())
    }

    /// All modules in registration order
    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.modules.values()
    }

    /// Number of registered modules
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Check if the context is empty
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Whether the module is declared private
    pub fn is_private(&self, name: &QualifiedName) -> bool {
        self.modules.get(name).is_some_and(Module::is_private)
    }

    /// Schedule a module for re-analysis
    pub fn invalidate(&mut self, name: &QualifiedName) {
        if self.invalidated.insert(name.clone()) {
            tracing::warn!(module = %name, "bindings map missing; module scheduled for re-analysis");
        }
    }

    /// Modules scheduled for re-analysis
    pub fn invalidated(&self) -> impl Iterator<Item = &QualifiedName> {
        self.invalidated.iter()
    }

    /// Drain the re-analysis queue
    pub fn take_invalidated(&mut self) -> Vec<QualifiedName> {
        self.invalidated.drain(..).collect()
    }

    /// Diagnostics attached to a module
    pub fn diagnostics(&self, name: &QualifiedName) -> &[ExportDiagnostic] {
        self.modules
            .get(name)
            .map(|m| m.diagnostics.as_slice())
            .unwrap_or(&[])
    }

    pub(crate) fn clear_diagnostics(&mut self, name: &QualifiedName) {
        if let Some(module) = self.modules.get_mut(name) {
            module.diagnostics.clear();
        }
    }

    /// Attach collected diagnostics to their modules
    pub fn absorb(&mut self, sink: DiagnosticSink) {
        for (name, diagnostic) in sink {
            if let Some(module) = self.modules.get_mut(&name) {
                module.diagnostics.push(diagnostic);
            }
        }
    }

    /// Resolve a declared export path to the entity it names.
    ///
    /// Tries, in order: a module with that exact name, a type or public
    /// module method of the parent module, and a constructor `Module.Type.Ctor`.
    pub fn resolve_path(&self, path: &QualifiedName) -> Option<ImportTarget> {
        if self.modules.contains_key(path) {
            return Some(ImportTarget::Module(path.clone()));
        }

        let parent = path.parent()?;
        let item = path.item();
        if let Some(bindings) = self.bindings(&parent) {
            if bindings.type_named(item).is_some() {
                return Some(ImportTarget::Type {
                    module: parent,
                    name: item.to_string(),
                });
            }
            if bindings.module_method(item).is_some() {
                return Some(ImportTarget::ModuleMethod {
                    module: parent,
                    name: item.to_string(),
                });
            }
        }

        let type_name = parent.item().to_string();
        let module = parent.parent()?;
        let bindings = self.bindings(&module)?;
        bindings
            .entities_named(item)
            .find(|e| matches!(&e.kind, EntityKind::Constructor { of_type } if *of_type == type_name))
            .map(|_| ImportTarget::Constructor {
                module,
                type_name,
                name: item.to_string(),
            })
    }
}
