//! Export diagnostics
//!
//! Everything except an export cycle is reported as a diagnostic attached to
//! the module that wrote the offending declaration; resolution of unrelated
//! declarations carries on. Diagnostics render through `codespan-reporting`.

use codespan_reporting::diagnostic::{Diagnostic as CsDiagnostic, Label, Severity};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use serde::Serialize;
use thiserror::Error;

use crate::name::QualifiedName;
use crate::span::Span;

/// Problems found while resolving export declarations
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExportDiagnostic {
    /// Exported path names no known module or entity
    #[error("The module '{path}' does not exist")]
    ModuleDoesNotExist {
        /// Declared path
        path: QualifiedName,
        /// Declaration location
        span: Span,
    },

    /// Named symbol is not visible in the exported target
    #[error("The symbol '{symbol}' (exported from '{target}') does not exist")]
    SymbolDoesNotExist {
        /// Missing name
        symbol: String,
        /// Target it was looked up in
        target: String,
        /// Declaration location
        span: Span,
    },

    /// Named symbol exists but is neither a constructor nor a module method
    #[error("No such constructor or module method '{name}' in '{owner}'")]
    NoSuchConstructorOrMethod {
        /// Offending name
        name: String,
        /// Module or type it was looked up in
        owner: String,
        /// Declaration location
        span: Span,
    },

    /// A private module or one of its members is exported
    #[error("Cannot export private module '{module}'")]
    ExportPrivateModule {
        /// The private module
        module: QualifiedName,
        /// Declaration location
        span: Span,
    },

    /// A private module declares exports
    #[error("Private module '{module}' cannot export anything")]
    ExportFromPrivateModule {
        /// The private exporter
        module: QualifiedName,
        /// Declaration location
        span: Span,
    },

    /// A private entity is exported by name
    #[error("Cannot export private entity '{symbol}' from '{module}'")]
    ExportPrivateSymbol {
        /// Entity name
        symbol: String,
        /// Defining module
        module: QualifiedName,
        /// Declaration location
        span: Span,
    },

    /// A visible name denotes more than one entity
    #[error("Ambiguous export of '{symbol}': resolves to both '{first}' and '{second}'")]
    AmbiguousExport {
        /// The ambiguous name
        symbol: String,
        /// Entity introduced first
        first: String,
        /// Conflicting entity
        second: String,
        /// Location of the conflicting declaration
        span: Span,
    },
}

impl ExportDiagnostic {
    /// Location the diagnostic points at
    pub fn span(&self) -> Span {
        use ExportDiagnostic::*;

        match self {
            ModuleDoesNotExist { span, .. }
            | SymbolDoesNotExist { span, .. }
            | NoSuchConstructorOrMethod { span, .. }
            | ExportPrivateModule { span, .. }
            | ExportFromPrivateModule { span, .. }
            | ExportPrivateSymbol { span, .. }
            | AmbiguousExport { span, .. } => *span,
        }
    }

    /// Stable error code
    pub fn code(&self) -> ErrorCode {
        use ExportDiagnostic::*;

        match self {
            ModuleDoesNotExist { .. } => ErrorCode("E3001"),
            SymbolDoesNotExist { .. } => ErrorCode("E3002"),
            NoSuchConstructorOrMethod { .. } => ErrorCode("E3003"),
            ExportPrivateModule { .. } => ErrorCode("E3004"),
            ExportFromPrivateModule { .. } => ErrorCode("E3005"),
            ExportPrivateSymbol { .. } => ErrorCode("E3006"),
            AmbiguousExport { .. } => ErrorCode("E3007"),
        }
    }
}

/// Diagnostics collected during one resolution run, keyed by module
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    reports: Vec<(QualifiedName, ExportDiagnostic)>,
}

impl DiagnosticSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic against `module`
    pub fn report(&mut self, module: &QualifiedName, diagnostic: ExportDiagnostic) {
        tracing::debug!(module = %module, code = diagnostic.code().as_str(), "{}", diagnostic);
        self.reports.push((module.clone(), diagnostic));
    }

    /// Number of collected diagnostics
    pub fn len(&self) -> usize {
        self.reports.len()
    }

    /// Whether nothing was reported
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Diagnostics reported against `module`
    pub fn for_module<'a>(
        &'a self,
        module: &'a QualifiedName,
    ) -> impl Iterator<Item = &'a ExportDiagnostic> {
        self.reports
            .iter()
            .filter(move |(m, _)| m == module)
            .map(|(_, d)| d)
    }
}

impl IntoIterator for DiagnosticSink {
    type Item = (QualifiedName, ExportDiagnostic);
    type IntoIter = std::vec::IntoIter<(QualifiedName, ExportDiagnostic)>;

    fn into_iter(self) -> Self::IntoIter {
        self.reports.into_iter()
    }
}

/// Error code for a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorCode(pub &'static str);

impl ErrorCode {
    /// The code as text
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

/// A renderable diagnostic with source code context
pub struct Diagnostic {
    inner: CsDiagnostic<usize>,
    code: Option<ErrorCode>,
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Diagnostic {
            inner: CsDiagnostic::new(severity).with_message(message),
            code: None,
        }
    }

    /// Create an error diagnostic
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Set the error code
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self.inner = self.inner.with_code(code.0);
        self
    }

    /// Add a primary label
    pub fn with_primary_label(mut self, file_id: usize, span: Span, message: impl Into<String>) -> Self {
        self.inner
            .labels
            .push(Label::primary(file_id, span.range()).with_message(message));
        self
    }

    /// Add a note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.inner.notes.push(note.into());
        self
    }

    /// Add a help suggestion
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.inner.notes.push(format!("help: {}", help.into()));
        self
    }

    /// Create a diagnostic from an export diagnostic.
    ///
    /// `file_id` is `None` when the module source is not available; the
    /// diagnostic is then rendered without a snippet.
    pub fn from_export_diagnostic(error: &ExportDiagnostic, file_id: Option<usize>) -> Self {
        use ExportDiagnostic::*;

        let (label, diag) = match error {
            ModuleDoesNotExist { path, .. } => (
                "unknown module",
                Diagnostic::error(format!("Cannot find module '{}'", path)),
            ),
            SymbolDoesNotExist { .. } => ("symbol not found", Diagnostic::error(error.to_string())),
            NoSuchConstructorOrMethod { owner, .. } => (
                "not a constructor or module method",
                Diagnostic::error(error.to_string())
                    .with_note(format!("only constructors and module methods of '{}' can be exported by name", owner)),
            ),
            ExportPrivateModule { .. } | ExportPrivateSymbol { .. } => (
                "private",
                Diagnostic::error(error.to_string())
                    .with_help("remove the export or make the definition public"),
            ),
            ExportFromPrivateModule { .. } => (
                "export in a private module",
                Diagnostic::error(error.to_string()),
            ),
            AmbiguousExport { first, .. } => (
                "conflicting export",
                Diagnostic::error(error.to_string())
                    .with_note(format!("'{}' was exported first", first)),
            ),
        };

        let diag = diag.with_code(error.code());
        match file_id {
            Some(file_id) => diag.with_primary_label(file_id, error.span(), label),
            None => diag,
        }
    }

    /// Emit the diagnostic to stderr
    pub fn emit(
        &self,
        files: &SimpleFiles<String, String>,
        color: ColorChoice,
    ) -> Result<(), codespan_reporting::files::Error> {
        let mut writer = StandardStream::stderr(color);
        let config = term::Config::default();
        term::emit(&mut writer, &config, files, &self.inner)
    }

    /// Error code, if set
    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    /// The underlying codespan diagnostic
    pub fn inner(&self) -> &CsDiagnostic<usize> {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_distinct() {
        let span = Span::new(0, 4);
        let module = QualifiedName::new("A");
        let all = vec![
            ExportDiagnostic::ModuleDoesNotExist { path: module.clone(), span },
            ExportDiagnostic::SymbolDoesNotExist { symbol: "x".into(), target: "A".into(), span },
            ExportDiagnostic::NoSuchConstructorOrMethod { name: "m".into(), owner: "A".into(), span },
            ExportDiagnostic::ExportPrivateModule { module: module.clone(), span },
            ExportDiagnostic::ExportFromPrivateModule { module: module.clone(), span },
            ExportDiagnostic::ExportPrivateSymbol { symbol: "x".into(), module: module.clone(), span },
            ExportDiagnostic::AmbiguousExport {
                symbol: "x".into(),
                first: "A.x".into(),
                second: "B.x".into(),
                span,
            },
        ];

        let mut codes: Vec<_> = all.iter().map(|d| d.code().as_str()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), all.len());
        assert!(all.iter().all(|d| d.span() == span));
    }

    #[test]
    fn test_codespan_conversion() {
        let error = ExportDiagnostic::ExportPrivateModule {
            module: QualifiedName::new("Lib.Internal"),
            span: Span::new(10, 30),
        };

        let diag = Diagnostic::from_export_diagnostic(&error, Some(0));
        assert_eq!(diag.code(), Some(ErrorCode("E3004")));
        assert_eq!(diag.inner().message, "Cannot export private module 'Lib.Internal'");
        assert_eq!(diag.inner().labels.len(), 1);
        assert_eq!(diag.inner().labels[0].range, 10..30);

        let detached = Diagnostic::from_export_diagnostic(&error, None);
        assert!(detached.inner().labels.is_empty());
    }

    #[test]
    fn test_sink_filters_by_module() {
        let a = QualifiedName::new("A");
        let b = QualifiedName::new("B");
        let mut sink = DiagnosticSink::new();
        sink.report(&a, ExportDiagnostic::ModuleDoesNotExist { path: "X".into(), span: Span::default() });
        sink.report(&b, ExportDiagnostic::ModuleDoesNotExist { path: "Y".into(), span: Span::default() });

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.for_module(&a).count(), 1);
    }
}
