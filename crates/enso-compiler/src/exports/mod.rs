//! Export resolution
//!
//! Resolves the `export` declarations of a batch of modules:
//!
//! - [`graph`]: builds the export graph from bindings maps
//! - [`cycles`]: rejects cyclic exports
//! - [`topsort`]: orders modules exportee-before-exporter
//! - [`privacy`]: suppresses exports that break module privacy
//! - [`resolve`]: computes resolved exports and exported-symbol tables
//! - [`ambiguity`]: reports names bound to several entities
//!
//! [`ExportsResolution`] runs the phases in order against a
//! [`CompilerContext`].

pub mod ambiguity;
pub mod cycles;
pub mod graph;
pub mod privacy;
pub mod resolve;
pub mod topsort;

pub use ambiguity::report_ambiguous;
pub use cycles::find_cycles;
pub use graph::{Edge, EdgeId, ExportGraph, Node, NodeId, SymbolSet};
pub use resolve::{resolve_exported_symbols, resolve_exports, ResolvedExports, SymbolOrigins};
pub use topsort::topological_order;

use rustc_hash::FxHashSet;
use tracing::{debug, instrument, warn};

use crate::bindings::ImportTarget;
use crate::context::CompilerContext;
use crate::diagnostic::DiagnosticSink;
use crate::error::ExportCycleError;
use crate::name::QualifiedName;
use crate::options::ResolutionOptions;

/// Export resolution over a compiler context.
///
/// Holds the context mutably for the duration of a run; results are
/// written into the bindings maps of the batch modules.
pub struct ExportsResolution<'a> {
    context: &'a mut CompilerContext,
    options: ResolutionOptions,
}

impl<'a> ExportsResolution<'a> {
    /// Create a resolution with default options
    pub fn new(context: &'a mut CompilerContext) -> Self {
        Self::with_options(context, ResolutionOptions::default())
    }

    /// Create a resolution with the given options
    pub fn with_options(context: &'a mut CompilerContext, options: ResolutionOptions) -> Self {
        Self { context, options }
    }

    /// Toggle privacy enforcement
    pub fn enforce_privacy(mut self, enabled: bool) -> Self {
        self.options.enforce_privacy = enabled;
        self
    }

    /// Toggle ambiguity reporting
    pub fn report_ambiguity(mut self, enabled: bool) -> Self {
        self.options.report_ambiguity = enabled;
        self
    }

    /// Resolve exports of `modules` and return them in compilation order.
    ///
    /// The order lists every module before the modules exporting it. It also
    /// includes modules outside the batch that are exported by it.
    /// Per-declaration problems are attached to the modules as diagnostics;
    /// only an export cycle fails the run, in which case no tables are
    /// written.
    #[instrument(skip_all, fields(modules = modules.len()))]
    pub fn run(&mut self, modules: &[QualifiedName]) -> Result<Vec<QualifiedName>, ExportCycleError> {
        for name in modules {
            self.context.clear_diagnostics(name);
        }

        let mut sink = DiagnosticSink::new();
        let mut graph = ExportGraph::build(self.context, modules, &mut sink);
        for name in graph.missing_bindings() {
            self.context.invalidate(name);
        }

        if self.options.enforce_privacy {
            privacy::enforce(&mut graph, self.context, &mut sink);
        }

        if let Some(cycle) = find_cycles(&graph).into_iter().next() {
            let modules: Vec<QualifiedName> = cycle
                .iter()
                .map(|id| graph.node(*id).target.module().clone())
                .collect();
            warn!(length = modules.len(), "export cycle detected");
            self.context.absorb(sink);
            return Err(ExportCycleError { modules });
        }

        let order = topological_order(&graph);
        let resolved = resolve_exports(&graph, &order, self.context, &mut sink);
        resolved.store(&graph, self.context);

        let origins = resolve_exported_symbols(&graph, &order, &resolved, self.context);
        if self.options.report_ambiguity {
            report_ambiguous(&origins, &mut sink);
        }

        debug!(diagnostics = sink.len(), "export resolution finished");
        self.context.absorb(sink);
        Ok(module_order(&graph, &order))
    }

    /// Order `modules` without resolving anything.
    ///
    /// Skips cycle detection: on cyclic input the modules that cannot be
    /// ordered are appended instead of failing. Diagnostics are discarded.
    #[instrument(skip_all, fields(modules = modules.len()))]
    pub fn run_sort(&mut self, modules: &[QualifiedName]) -> Vec<QualifiedName> {
        let mut sink = DiagnosticSink::new();
        let graph = ExportGraph::build(self.context, modules, &mut sink);
        for name in graph.missing_bindings() {
            self.context.invalidate(name);
        }
        if !sink.is_empty() {
            debug!(discarded = sink.len(), "diagnostics discarded by sort-only run");
        }

        module_order(&graph, &topological_order(&graph))
    }
}

/// Owning module of each node, keeping the last occurrence of duplicates.
///
/// An entity node whose module has a node of its own is placed by that node.
fn module_order(graph: &ExportGraph, order: &[NodeId]) -> Vec<QualifiedName> {
    let mut seen = FxHashSet::default();
    let mut names: Vec<QualifiedName> = order
        .iter()
        .rev()
        .map(|id| &graph.node(*id).target)
        .filter(|target| match target {
            ImportTarget::Module(_) => true,
            entity => graph.find(&ImportTarget::Module(entity.module().clone())).is_none(),
        })
        .map(|target| target.module())
        .filter(|name| seen.insert(*name))
        .cloned()
        .collect();
    names.reverse();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::{BindingsMap, DefinedEntity, ExportDecl};
    use crate::context::Module;
    use crate::diagnostic::ExportDiagnostic;

    fn names(list: &[&str]) -> Vec<QualifiedName> {
        list.iter().map(|n| QualifiedName::new(*n)).collect()
    }

    #[test]
    fn test_entity_nodes_collapse_into_their_module() {
        let mut ctx = CompilerContext::new()
            .with(Module::new(
                "A",
                BindingsMap::new()
                    .define(DefinedEntity::ty("T"))
                    .define(DefinedEntity::constructor("T", "Mk")),
            ))
            .with(Module::new(
                "B",
                BindingsMap::new()
                    .export(ExportDecl::module("A.T"))
                    .export(ExportDecl::module("A.T.Mk")),
            ));

        let order = ExportsResolution::new(&mut ctx).run(&names(&["B", "A"])).unwrap();
        assert_eq!(order, names(&["A", "B"]));
    }

    #[test]
    fn test_module_precedes_exporters_of_its_entities() {
        let build = || {
            CompilerContext::new()
                .with(Module::new("B", BindingsMap::new().export(ExportDecl::module("A.T"))))
                .with(Module::new(
                    "A",
                    BindingsMap::new()
                        .define(DefinedEntity::ty("T"))
                        .export(ExportDecl::module("D.U")),
                ))
                .with(Module::new("D", BindingsMap::new().define(DefinedEntity::ty("U"))))
        };
        let batch = names(&["B", "A", "D"]);

        let mut ctx = build();
        assert_eq!(ExportsResolution::new(&mut ctx).run(&batch).unwrap(), names(&["D", "A", "B"]));
        let b = ctx.bindings(&"B".into()).unwrap();
        assert_eq!(
            b.exported_symbols["T"],
            vec![ImportTarget::Type {
                module: "A".into(),
                name: "T".into()
            }]
        );

        let mut ctx = build();
        assert_eq!(ExportsResolution::new(&mut ctx).run_sort(&batch), names(&["D", "A", "B"]));
    }

    #[test]
    fn test_module_and_entity_exporters_both_follow_module() {
        let mut ctx = CompilerContext::new()
            .with(Module::new("A", BindingsMap::new().define(DefinedEntity::ty("T"))))
            .with(Module::new("B", BindingsMap::new().export(ExportDecl::module("A"))))
            .with(Module::new("C", BindingsMap::new().export(ExportDecl::module("A.T"))));

        let order = ExportsResolution::new(&mut ctx).run(&names(&["A", "B", "C"])).unwrap();
        assert_eq!(order, names(&["A", "B", "C"]));
    }

    #[test]
    fn test_privacy_can_be_disabled() {
        let build = || {
            CompilerContext::new()
                .with(Module::new(
                    "Internal",
                    BindingsMap::new().private().define(DefinedEntity::ty("T")),
                ))
                .with(Module::new("Api", BindingsMap::new().export(ExportDecl::module("Internal"))))
        };
        let batch = names(&["Internal", "Api"]);

        let mut ctx = build();
        ExportsResolution::new(&mut ctx).run(&batch).unwrap();
        assert_eq!(ctx.diagnostics(&"Api".into()).len(), 1);
        assert!(ctx.bindings(&"Api".into()).unwrap().resolved_exports.is_empty());

        let mut ctx = build();
        ExportsResolution::new(&mut ctx)
            .enforce_privacy(false)
            .run(&batch)
            .unwrap();
        assert!(ctx.diagnostics(&"Api".into()).is_empty());
        assert_eq!(ctx.bindings(&"Api".into()).unwrap().resolved_exports.len(), 1);
    }

    #[test]
    fn test_ambiguity_reporting_toggle() {
        let build = || {
            CompilerContext::new()
                .with(Module::new("A", BindingsMap::new().define(DefinedEntity::ty("T"))))
                .with(Module::new("B", BindingsMap::new().define(DefinedEntity::ty("T"))))
                .with(Module::new(
                    "C",
                    BindingsMap::new()
                        .export(ExportDecl::symbols("A", ["T"]))
                        .export(ExportDecl::symbols("B", ["T"]).at(crate::span::Span::new(20, 37))),
                ))
        };
        let batch = names(&["A", "B", "C"]);

        let mut ctx = build();
        ExportsResolution::new(&mut ctx).run(&batch).unwrap();
        assert_eq!(
            ctx.diagnostics(&"C".into()),
            &[ExportDiagnostic::AmbiguousExport {
                symbol: "T".into(),
                first: "A.T".into(),
                second: "B.T".into(),
                span: crate::span::Span::new(20, 37),
            }]
        );
        let table = &ctx.bindings(&"C".into()).unwrap().exported_symbols;
        assert_eq!(table["T"].len(), 2);

        let mut ctx = build();
        ExportsResolution::new(&mut ctx)
            .report_ambiguity(false)
            .run(&batch)
            .unwrap();
        assert!(ctx.diagnostics(&"C".into()).is_empty());
    }

    #[test]
    fn test_rerun_replaces_diagnostics() {
        let mut ctx = CompilerContext::new().with(Module::new(
            "App",
            BindingsMap::new().export(ExportDecl::module("Missing")),
        ));
        let batch = names(&["App"]);

        ExportsResolution::new(&mut ctx).run(&batch).unwrap();
        ExportsResolution::new(&mut ctx).run(&batch).unwrap();
        assert_eq!(ctx.diagnostics(&"App".into()).len(), 1);
    }

    #[test]
    fn test_module_method_exported_by_name() {
        let mut ctx = CompilerContext::new()
            .with(Module::new(
                "Util",
                BindingsMap::new()
                    .define(DefinedEntity::module_method("helper"))
                    .define(DefinedEntity::ty("Box")),
            ))
            .with(Module::new("App", BindingsMap::new().export(ExportDecl::symbols("Util", ["helper"]))));

        ExportsResolution::new(&mut ctx).run(&names(&["Util", "App"])).unwrap();

        let app = ctx.bindings(&"App".into()).unwrap();
        assert_eq!(
            app.exported_symbols["helper"],
            vec![ImportTarget::ModuleMethod {
                module: "Util".into(),
                name: "helper".into()
            }]
        );
        assert!(!app.exported_symbols.contains_key("Box"));
    }
}
