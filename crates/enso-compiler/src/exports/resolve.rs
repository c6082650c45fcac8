//! Export resolution
//!
//! Two phases over the topologically ordered graph:
//!
//! 1. [`resolve_exports`] computes each node's resolved exports from its own
//!    edges plus the already-resolved exports of everything it exports.
//! 2. [`resolve_exported_symbols`] turns resolved exports into the
//!    name → entities table of every batch module.

use indexmap::map::Entry;
use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use super::graph::{names_module, Edge, ExportGraph, NodeId, SymbolSet};
use crate::bindings::{ExportedModule, ExportedSymbols, ImportTarget};
use crate::context::CompilerContext;
use crate::diagnostic::{DiagnosticSink, ExportDiagnostic};
use crate::name::QualifiedName;
use crate::span::Span;

/// A resolved export together with the declaration that introduced it
#[derive(Debug, Clone)]
pub struct ResolvedRecord {
    /// The record
    pub export: ExportedModule,
    /// First declaration contributing to it
    pub origin: Span,
}

/// Resolved exports of every node of a graph
#[derive(Debug)]
pub struct ResolvedExports {
    records: Vec<Vec<ResolvedRecord>>,
}

impl ResolvedExports {
    /// Records of a node
    pub fn records(&self, node: NodeId) -> &[ResolvedRecord] {
        &self.records[node.index()]
    }

    /// Resolved exports of a node
    pub fn of(&self, node: NodeId) -> impl Iterator<Item = &ExportedModule> {
        self.records[node.index()].iter().map(|r| &r.export)
    }

    /// Write resolved exports back onto batch modules
    pub fn store(&self, graph: &ExportGraph, ctx: &mut CompilerContext) {
        for id in graph.node_ids() {
            let node = graph.node(id);
            if !node.in_batch {
                continue;
            }
            let ImportTarget::Module(module) = &node.target else {
                continue;
            };
            if let Some(bindings) = ctx.bindings_mut(module) {
                bindings.resolved_exports = self.of(id).cloned().collect();
            }
        }
    }
}

/// Compute resolved exports for every node in `order`.
///
/// `order` must list exportees before their exporters. Nodes outside the
/// batch are not recomputed; module nodes among them reuse the resolved
/// exports stored on their bindings map.
pub fn resolve_exports(
    graph: &ExportGraph,
    order: &[NodeId],
    ctx: &CompilerContext,
    sink: &mut DiagnosticSink,
) -> ResolvedExports {
    let mut resolver = ExportResolver {
        graph,
        ctx,
        records: vec![Vec::new(); graph.len()],
    };

    for node in order {
        resolver.resolve_node(*node, sink);
    }

    debug!(nodes = order.len(), "resolved exports");
    ResolvedExports {
        records: resolver.records,
    }
}

enum Lookup {
    Found,
    Missing(ExportDiagnostic),
    /// Target bindings unknown; nothing to check against
    Unavailable,
}

struct ExportResolver<'a> {
    graph: &'a ExportGraph,
    ctx: &'a CompilerContext,
    records: Vec<Vec<ResolvedRecord>>,
}

impl ExportResolver<'_> {
    fn resolve_node(&mut self, id: NodeId, sink: &mut DiagnosticSink) {
        let graph = self.graph;
        let node = graph.node(id);

        if !node.in_batch {
            if let ImportTarget::Module(module) = &node.target {
                if let Some(bindings) = self.ctx.bindings(module) {
                    self.records[id.index()] = bindings
                        .resolved_exports
                        .iter()
                        .map(|export| ResolvedRecord {
                            export: export.clone(),
                            origin: Span::default(),
                        })
                        .collect();
                }
            }
            return;
        }

        let module = node.target.module();
        let mut explicit = Vec::new();
        let mut transitive = Vec::new();

        for edge_id in &node.exports {
            let edge = graph.edge(*edge_id);
            if edge.suppressed {
                continue;
            }

            let symbols = self.effective_symbols(module, edge, sink);
            for parent in &self.records[edge.exportee.index()] {
                let shared: Vec<String> = parent
                    .export
                    .symbols
                    .iter()
                    .filter(|s| symbols.contains(s))
                    .cloned()
                    .collect();
                if !shared.is_empty() {
                    transitive.push(ResolvedRecord {
                        export: ExportedModule::new(parent.export.target.clone(), None, shared),
                        origin: edge.origin(),
                    });
                }
            }

            explicit.push(ResolvedRecord {
                export: ExportedModule::new(
                    graph.node(edge.exportee).target.clone(),
                    edge.rename_as.clone(),
                    symbols,
                ),
                origin: edge.origin(),
            });
        }

        self.records[id.index()] = merge(explicit.into_iter().chain(transitive));
    }

    /// Symbols an edge actually exports; invalid names are reported and dropped
    fn effective_symbols(
        &self,
        exporter: &QualifiedName,
        edge: &Edge,
        sink: &mut DiagnosticSink,
    ) -> Vec<String> {
        let known = self.known_symbols(edge.exportee);
        match &edge.symbols {
            SymbolSet::All { hiding } => known.into_iter().filter(|s| !hiding.contains(s)).collect(),
            SymbolSet::Only(names) => {
                let mut symbols = Vec::new();
                for name in names {
                    match self.lookup(edge.exportee, &known, name, edge.origin()) {
                        Lookup::Found => {
                            if !symbols.contains(name) {
                                symbols.push(name.clone());
                            }
                        }
                        Lookup::Missing(diagnostic) => sink.report(exporter, diagnostic),
                        Lookup::Unavailable => {}
                    }
                }
                symbols
            }
        }
    }

    /// Names a target exposes to an unrestricted export
    fn known_symbols(&self, id: NodeId) -> Vec<String> {
        match &self.graph.node(id).target {
            ImportTarget::Module(module) => {
                let Some(bindings) = self.ctx.bindings(module) else {
                    return Vec::new();
                };
                let mut names: IndexSet<String> = bindings
                    .defined_entities
                    .iter()
                    .filter(|e| e.can_export() || e.is_exportable_method())
                    .map(|e| e.name.clone())
                    .collect();
                for record in &self.records[id.index()] {
                    names.extend(record.export.exported_as.iter().cloned());
                    names.extend(record.export.symbols.iter().cloned());
                }
                names.into_iter().collect()
            }
            ImportTarget::Type { module, name } => self
                .ctx
                .bindings(module)
                .map(|b| {
                    b.constructors_of(name)
                        .filter(|c| !c.private)
                        .map(|c| c.name.clone())
                        .collect()
                })
                .unwrap_or_default(),
            ImportTarget::Constructor { name, .. } | ImportTarget::ModuleMethod { name, .. } => {
                vec![name.clone()]
            }
        }
    }

    fn lookup(&self, id: NodeId, known: &[String], name: &str, span: Span) -> Lookup {
        let target = &self.graph.node(id).target;
        match target {
            ImportTarget::Module(module) => {
                if known.iter().any(|k| k == name) || names_module(self.ctx, module, name) {
                    return Lookup::Found;
                }
                let Some(bindings) = self.ctx.bindings(module) else {
                    return Lookup::Unavailable;
                };
                if bindings.module_method(name).is_some() {
                    return Lookup::Found;
                }
                if bindings.entities_named(name).any(|e| e.private) {
                    return Lookup::Missing(ExportDiagnostic::ExportPrivateSymbol {
                        symbol: name.to_string(),
                        module: module.clone(),
                        span,
                    });
                }
                if bindings.entities_named(name).next().is_some() {
                    return Lookup::Missing(ExportDiagnostic::NoSuchConstructorOrMethod {
                        name: name.to_string(),
                        owner: module.to_string(),
                        span,
                    });
                }
                Lookup::Missing(ExportDiagnostic::SymbolDoesNotExist {
                    symbol: name.to_string(),
                    target: module.to_string(),
                    span,
                })
            }
            ImportTarget::Type { module, .. } => {
                let Some(bindings) = self.ctx.bindings(module) else {
                    return Lookup::Unavailable;
                };
                if known.iter().any(|k| k == name) {
                    return Lookup::Found;
                }
                if bindings.entities_named(name).any(|e| e.private) {
                    return Lookup::Missing(ExportDiagnostic::ExportPrivateSymbol {
                        symbol: name.to_string(),
                        module: module.clone(),
                        span,
                    });
                }
                Lookup::Missing(ExportDiagnostic::NoSuchConstructorOrMethod {
                    name: name.to_string(),
                    owner: target.to_string(),
                    span,
                })
            }
            ImportTarget::Constructor { .. } | ImportTarget::ModuleMethod { .. } => {
                if target.name() == name {
                    Lookup::Found
                } else {
                    Lookup::Missing(ExportDiagnostic::SymbolDoesNotExist {
                        symbol: name.to_string(),
                        target: target.to_string(),
                        span,
                    })
                }
            }
        }
    }
}

/// Group records by target: symbols are unioned, the first alias wins
fn merge(records: impl Iterator<Item = ResolvedRecord>) -> Vec<ResolvedRecord> {
    let mut grouped: IndexMap<ImportTarget, ResolvedRecord> = IndexMap::new();

    for record in records {
        match grouped.entry(record.export.target.clone()) {
            Entry::Vacant(slot) => {
                let mut record = record;
                let mut seen = IndexSet::new();
                record.export.symbols.retain(|s| seen.insert(s.clone()));
                slot.insert(record);
            }
            Entry::Occupied(mut slot) => {
                let merged = &mut slot.get_mut().export;
                if merged.exported_as.is_none() {
                    merged.exported_as = record.export.exported_as;
                }
                for symbol in record.export.symbols {
                    if !merged.symbols.contains(&symbol) {
                        merged.symbols.push(symbol);
                    }
                }
            }
        }
    }

    grouped.into_values().collect()
}

/// Exported-symbol table entries with the span that introduced each entity
pub type OriginTable = IndexMap<String, Vec<(ImportTarget, Span)>>;

/// Per-module origin tables produced alongside the exported-symbol tables
#[derive(Debug, Default)]
pub struct SymbolOrigins {
    tables: Vec<(QualifiedName, OriginTable)>,
}

impl SymbolOrigins {
    /// Tables in resolution order
    pub fn iter(&self) -> impl Iterator<Item = (&QualifiedName, &OriginTable)> {
        self.tables.iter().map(|(m, t)| (m, t))
    }
}

/// Build and store the exported-symbol table of every batch module.
///
/// Runs after [`ResolvedExports::store`]. Modules are visited in `order`, so
/// every re-exported batch module already carries its table.
pub fn resolve_exported_symbols(
    graph: &ExportGraph,
    order: &[NodeId],
    resolved: &ResolvedExports,
    ctx: &mut CompilerContext,
) -> SymbolOrigins {
    let mut origins = SymbolOrigins::default();

    for id in order {
        let node = graph.node(*id);
        if !node.in_batch {
            continue;
        }
        let ImportTarget::Module(module) = &node.target else {
            continue;
        };
        let Some(table) = symbol_table(ctx, module, resolved.records(*id)) else {
            continue;
        };

        let exported: ExportedSymbols = table
            .iter()
            .map(|(name, entries)| {
                (
                    name.clone(),
                    entries.iter().map(|(target, _)| target.clone()).collect(),
                )
            })
            .collect();
        if let Some(bindings) = ctx.bindings_mut(module) {
            bindings.exported_symbols = exported;
        }
        origins.tables.push((module.clone(), table));
    }

    origins
}

fn symbol_table(
    ctx: &CompilerContext,
    module: &QualifiedName,
    records: &[ResolvedRecord],
) -> Option<OriginTable> {
    let bindings = ctx.bindings(module)?;
    let mut table = OriginTable::new();

    for entity in bindings.exportable_entities() {
        if let Some(target) = entity.target_in(module) {
            add_entry(&mut table, &entity.name, target, entity.span);
        }
    }

    for record in records {
        let export = &record.export;

        if let Some(alias) = &export.exported_as {
            let shadowed = export.symbols.contains(alias)
                && !visible_entities(ctx, &export.target, alias).is_empty();
            if !shadowed && export.target != ImportTarget::Module(module.clone()) {
                add_entry(&mut table, alias, export.target.clone(), record.origin);
            }
        }

        for symbol in &export.symbols {
            let entities = visible_entities(ctx, &export.target, symbol);
            if entities.is_empty() && names_exported_module(&export.target, symbol) {
                add_entry(&mut table, symbol, export.target.clone(), record.origin);
            }
            for entity in entities {
                add_entry(&mut table, symbol, entity, record.origin);
            }
        }
    }

    Some(table)
}

fn add_entry(table: &mut OriginTable, name: &str, target: ImportTarget, origin: Span) {
    let entries = table.entry(name.to_string()).or_default();
    if !entries.iter().any(|(existing, _)| *existing == target) {
        entries.push((target, origin));
    }
}

/// A symbol naming the exported module itself, rather than anything inside it
fn names_exported_module(target: &ImportTarget, symbol: &str) -> bool {
    matches!(target, ImportTarget::Module(module) if module.item() == symbol)
}

/// Entities `symbol` denotes when looked up through `target`
fn visible_entities(ctx: &CompilerContext, target: &ImportTarget, symbol: &str) -> Vec<ImportTarget> {
    match target {
        ImportTarget::Module(module) => {
            let Some(bindings) = ctx.bindings(module) else {
                return Vec::new();
            };
            let mut found = bindings
                .exported_symbols
                .get(symbol)
                .cloned()
                .unwrap_or_default();
            // Modules outside the batch may carry no table of their own
            for entity in bindings.exportable_entities().filter(|e| e.name == symbol) {
                if let Some(own) = entity.target_in(module) {
                    if !found.contains(&own) {
                        found.push(own);
                    }
                }
            }
            if bindings.module_method(symbol).is_some() {
                let method = ImportTarget::ModuleMethod {
                    module: module.clone(),
                    name: symbol.to_string(),
                };
                if !found.contains(&method) {
                    found.push(method);
                }
            }
            found
        }
        ImportTarget::Type { module, name } => ctx
            .bindings(module)
            .map(|b| {
                b.constructors_of(name)
                    .filter(|c| !c.private && c.name == symbol)
                    .map(|c| ImportTarget::Constructor {
                        module: module.clone(),
                        type_name: name.clone(),
                        name: c.name.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default(),
        ImportTarget::Constructor { .. } | ImportTarget::ModuleMethod { .. } => {
            if target.name() == symbol {
                vec![target.clone()]
            } else {
                Vec::new()
            }
        }
    }
}
