//! Per-module bindings maps
//!
//! A bindings map is produced by upstream name resolution. It lists what a
//! module defines and what it declares to export. Export resolution fills in
//! the two derived tables, [`BindingsMap::resolved_exports`] and
//! [`BindingsMap::exported_symbols`].

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::name::QualifiedName;
use crate::span::Span;

/// Kind of a module-level definition
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntityKind {
    /// `type T`
    Type,
    /// Atom constructor of a type
    Constructor {
        /// Type the constructor belongs to
        of_type: String,
    },
    /// Method; `on_type = None` for module-level methods
    Method {
        /// Type the method is defined on
        #[serde(default)]
        on_type: Option<String>,
    },
    /// `T.from (that:U)` conversion
    Conversion,
}

/// An entity defined in a module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinedEntity {
    /// Simple name
    pub name: String,
    /// What the entity is
    #[serde(flatten)]
    pub kind: EntityKind,
    /// Declared `private`
    #[serde(default)]
    pub private: bool,
    /// Location of the definition
    #[serde(default)]
    pub span: Span,
}

impl DefinedEntity {
    fn new(name: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            name: name.into(),
            kind,
            private: false,
            span: Span::default(),
        }
    }

    /// A type definition
    pub fn ty(name: impl Into<String>) -> Self {
        Self::new(name, EntityKind::Type)
    }

    /// A constructor of `of_type`
    pub fn constructor(of_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(
            name,
            EntityKind::Constructor {
                of_type: of_type.into(),
            },
        )
    }

    /// A module-level method
    pub fn module_method(name: impl Into<String>) -> Self {
        Self::new(name, EntityKind::Method { on_type: None })
    }

    /// A method defined on a type
    pub fn type_method(on_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(
            name,
            EntityKind::Method {
                on_type: Some(on_type.into()),
            },
        )
    }

    /// A conversion method
    pub fn conversion(name: impl Into<String>) -> Self {
        Self::new(name, EntityKind::Conversion)
    }

    /// Mark the entity private
    pub fn private(mut self) -> Self {
        self.private = true;
        self
    }

    /// Attach a source location
    pub fn at(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Exported by default: public types and constructors.
    pub fn can_export(&self) -> bool {
        !self.private
            && matches!(
                self.kind,
                EntityKind::Type | EntityKind::Constructor { .. }
            )
    }

    /// Public module-level method, exportable only when named explicitly
    pub fn is_exportable_method(&self) -> bool {
        !self.private && matches!(self.kind, EntityKind::Method { on_type: None })
    }

    /// The import target denoting this entity, if it has one
    pub fn target_in(&self, module: &QualifiedName) -> Option<ImportTarget> {
        match &self.kind {
            EntityKind::Type => Some(ImportTarget::Type {
                module: module.clone(),
                name: self.name.clone(),
            }),
            EntityKind::Constructor { of_type } => Some(ImportTarget::Constructor {
                module: module.clone(),
                type_name: of_type.clone(),
                name: self.name.clone(),
            }),
            EntityKind::Method { on_type: None } => Some(ImportTarget::ModuleMethod {
                module: module.clone(),
                name: self.name.clone(),
            }),
            EntityKind::Method { on_type: Some(_) } | EntityKind::Conversion => None,
        }
    }
}

/// Shape of an export declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "form", rename_all = "snake_case")]
pub enum ExportKind {
    /// `export A.B [as X]`
    Module {
        /// Name the target is exported under
        #[serde(default)]
        alias: Option<String>,
    },
    /// `from A.B export x, y`
    Symbols {
        /// Exported names
        names: Vec<String>,
    },
    /// `from A.B export all [hiding x, y]`
    All {
        /// Names excluded from the export
        #[serde(default)]
        hiding: Vec<String>,
    },
}

/// An export declaration as written in a module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportDecl {
    /// Path of the exported module or entity
    pub path: QualifiedName,
    /// Declaration form
    #[serde(flatten)]
    pub kind: ExportKind,
    /// Location of the declaration
    #[serde(default)]
    pub span: Span,
}

impl ExportDecl {
    fn new(path: impl Into<QualifiedName>, kind: ExportKind) -> Self {
        Self {
            path: path.into(),
            kind,
            span: Span::default(),
        }
    }

    /// `export path`
    pub fn module(path: impl Into<QualifiedName>) -> Self {
        Self::new(path, ExportKind::Module { alias: None })
    }

    /// `export path as alias`
    pub fn module_as(path: impl Into<QualifiedName>, alias: impl Into<String>) -> Self {
        Self::new(
            path,
            ExportKind::Module {
                alias: Some(alias.into()),
            },
        )
    }

    /// `from path export names`
    pub fn symbols<I, S>(path: impl Into<QualifiedName>, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            path,
            ExportKind::Symbols {
                names: names.into_iter().map(Into::into).collect(),
            },
        )
    }

    /// `from path export all`
    pub fn all(path: impl Into<QualifiedName>) -> Self {
        Self::new(path, ExportKind::All { hiding: Vec::new() })
    }

    /// `from path export all hiding names`
    pub fn all_hiding<I, S>(path: impl Into<QualifiedName>, hiding: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            path,
            ExportKind::All {
                hiding: hiding.into_iter().map(Into::into).collect(),
            },
        )
    }

    /// Attach a source location
    pub fn at(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}

/// Something that can be imported or exported
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportTarget {
    /// A module
    Module(QualifiedName),
    /// A type defined in `module`
    Type {
        /// Defining module
        module: QualifiedName,
        /// Type name
        name: String,
    },
    /// A constructor of `type_name`
    Constructor {
        /// Defining module
        module: QualifiedName,
        /// Owning type
        type_name: String,
        /// Constructor name
        name: String,
    },
    /// A module-level method
    ModuleMethod {
        /// Defining module
        module: QualifiedName,
        /// Method name
        name: String,
    },
}

impl ImportTarget {
    /// Module that owns the target
    pub fn module(&self) -> &QualifiedName {
        match self {
            ImportTarget::Module(module)
            | ImportTarget::Type { module, .. }
            | ImportTarget::Constructor { module, .. }
            | ImportTarget::ModuleMethod { module, .. } => module,
        }
    }

    /// Simple name the target is known by
    pub fn name(&self) -> &str {
        match self {
            ImportTarget::Module(module) => module.item(),
            ImportTarget::Type { name, .. }
            | ImportTarget::Constructor { name, .. }
            | ImportTarget::ModuleMethod { name, .. } => name,
        }
    }
}

impl fmt::Display for ImportTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportTarget::Module(module) => write!(f, "{}", module),
            ImportTarget::Type { module, name } | ImportTarget::ModuleMethod { module, name } => {
                write!(f, "{}.{}", module, name)
            }
            ImportTarget::Constructor {
                module,
                type_name,
                name,
            } => write!(f, "{}.{}.{}", module, type_name, name),
        }
    }
}

/// A resolved export record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedModule {
    /// What is exported
    pub target: ImportTarget,
    /// Name the target itself is exported under
    pub exported_as: Option<String>,
    /// Symbols of the target made visible
    pub symbols: Vec<String>,
}

impl ExportedModule {
    /// Create a record
    pub fn new(target: ImportTarget, exported_as: Option<String>, symbols: Vec<String>) -> Self {
        Self {
            target,
            exported_as,
            symbols,
        }
    }
}

/// Visible name → entities it denotes
pub type ExportedSymbols = IndexMap<String, Vec<ImportTarget>>;

/// Bindings of one module
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BindingsMap {
    /// Module declared `private`
    #[serde(default)]
    pub private: bool,
    /// Module-level definitions
    #[serde(default)]
    pub defined_entities: Vec<DefinedEntity>,
    /// Export declarations in source order
    #[serde(default)]
    pub exports: Vec<ExportDecl>,
    /// Resolved exports, filled by export resolution
    #[serde(default)]
    pub resolved_exports: Vec<ExportedModule>,
    /// Exported symbol table, filled by export resolution
    #[serde(default)]
    pub exported_symbols: ExportedSymbols,
}

impl BindingsMap {
    /// Create an empty bindings map
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the module private
    pub fn private(mut self) -> Self {
        self.private = true;
        self
    }

    /// Add a definition
    pub fn define(mut self, entity: DefinedEntity) -> Self {
        self.defined_entities.push(entity);
        self
    }

    /// Add an export declaration
    pub fn export(mut self, decl: ExportDecl) -> Self {
        self.exports.push(decl);
        self
    }

    /// Entities exported without being named
    pub fn exportable_entities(&self) -> impl Iterator<Item = &DefinedEntity> {
        self.defined_entities.iter().filter(|e| e.can_export())
    }

    /// All definitions with the given name
    pub fn entities_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a DefinedEntity> {
        self.defined_entities.iter().filter(move |e| e.name == name)
    }

    /// Type definition by name
    pub fn type_named(&self, name: &str) -> Option<&DefinedEntity> {
        self.defined_entities
            .iter()
            .find(|e| e.name == name && matches!(e.kind, EntityKind::Type))
    }

    /// Public module-level method by name
    pub fn module_method(&self, name: &str) -> Option<&DefinedEntity> {
        self.defined_entities
            .iter()
            .find(|e| e.name == name && e.is_exportable_method())
    }

    /// Constructors of a type, public and private
    pub fn constructors_of<'a>(
        &'a self,
        type_name: &'a str,
    ) -> impl Iterator<Item = &'a DefinedEntity> {
        self.defined_entities.iter().filter(move |e| {
            matches!(&e.kind, EntityKind::Constructor { of_type } if of_type == type_name)
        })
    }
}
