//! Export graph
//!
//! Nodes are import targets, edges are export declarations: an edge from
//! `exporter` to `exportee` means "`exporter` makes (some of) `exportee`'s
//! symbols visible". Nodes and edges live in arenas and refer to each other
//! by index; `exported_by` is derived while edges are added.

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::bindings::{ExportDecl, ExportKind, ImportTarget};
use crate::context::CompilerContext;
use crate::diagnostic::{DiagnosticSink, ExportDiagnostic};
use crate::name::QualifiedName;
use crate::span::Span;

/// Index of a node in the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Position in the node arena
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of an edge in the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(u32);

impl EdgeId {
    /// Position in the edge arena
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Symbols an edge makes visible
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolSet {
    /// Everything the exportee exposes, except `hiding`
    All {
        /// Excluded names
        hiding: Vec<String>,
    },
    /// Exactly these names
    Only(Vec<String>),
}

impl SymbolSet {
    /// Every symbol, nothing hidden
    pub fn everything() -> Self {
        SymbolSet::All { hiding: Vec::new() }
    }

    /// Union with another restriction from a duplicate declaration
    pub fn union(&mut self, other: SymbolSet) {
        *self = match (std::mem::replace(self, SymbolSet::Only(Vec::new())), other) {
            (SymbolSet::Only(mut names), SymbolSet::Only(more)) => {
                for name in more {
                    if !names.contains(&name) {
                        names.push(name);
                    }
                }
                SymbolSet::Only(names)
            }
            (SymbolSet::All { hiding }, SymbolSet::All { hiding: other }) => SymbolSet::All {
                hiding: hiding.into_iter().filter(|h| other.contains(h)).collect(),
            },
            (SymbolSet::All { hiding }, SymbolSet::Only(names))
            | (SymbolSet::Only(names), SymbolSet::All { hiding }) => SymbolSet::All {
                hiding: hiding.into_iter().filter(|h| !names.contains(h)).collect(),
            },
        };
    }
}

/// An export relationship
#[derive(Debug, Clone)]
pub struct Edge {
    /// Exporting node
    pub exporter: NodeId,
    /// Symbols made visible
    pub symbols: SymbolSet,
    /// Name the exportee itself is exported under
    pub rename_as: Option<String>,
    /// Exported node
    pub exportee: NodeId,
    /// Declarations merged into this edge
    pub origins: Vec<Span>,
    /// Blocked by the privacy rules; contributes nothing
    pub suppressed: bool,
}

impl Edge {
    /// Location of the first declaration behind the edge
    pub fn origin(&self) -> Span {
        self.origins.first().copied().unwrap_or_default()
    }
}

/// A node wrapping one import target
#[derive(Debug, Clone)]
pub struct Node {
    /// The wrapped target
    pub target: ImportTarget,
    /// Module is part of the batch being resolved
    pub in_batch: bool,
    /// Outgoing edges, in declaration order
    pub exports: Vec<EdgeId>,
    /// Incoming edges
    pub exported_by: Vec<EdgeId>,
}

impl Node {
    fn new(target: ImportTarget) -> Self {
        Self {
            target,
            in_batch: false,
            exports: Vec::new(),
            exported_by: Vec::new(),
        }
    }
}

/// Export graph of one resolution run
#[derive(Debug, Default)]
pub struct ExportGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    index: FxHashMap<ImportTarget, NodeId>,
    missing_bindings: Vec<QualifiedName>,
}

impl ExportGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph for a batch of modules.
    ///
    /// Every batch module gets a node, in batch order. Export declarations are
    /// resolved against the context; targets outside the batch get nodes
    /// created on first reference but their own exports are not expanded.
    /// Declarations naming nothing known are reported and skipped.
    pub fn build(ctx: &CompilerContext, modules: &[QualifiedName], sink: &mut DiagnosticSink) -> Self {
        let mut graph = ExportGraph::new();

        for name in modules {
            let id = graph.node_for(ImportTarget::Module(name.clone()));
            graph.nodes[id.index()].in_batch = true;
        }

        for name in modules {
            let exporter = graph.node_for(ImportTarget::Module(name.clone()));
            let Some(bindings) = ctx.bindings(name) else {
                if !graph.missing_bindings.contains(name) {
                    graph.missing_bindings.push(name.clone());
                }
                continue;
            };

            for decl in &bindings.exports {
                let Some(target) = ctx.resolve_path(&decl.path) else {
                    sink.report(
                        name,
                        ExportDiagnostic::ModuleDoesNotExist {
                            path: decl.path.clone(),
                            span: decl.span,
                        },
                    );
                    continue;
                };

                let (symbols, rename_as) = edge_shape(ctx, decl, &target);
                let exportee = graph.node_for(target);
                graph.add_edge(exporter, exportee, symbols, rename_as, decl.span);
            }
        }

        debug!(
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            "built export graph"
        );
        graph
    }

    /// Node for a target, created on first use
    pub fn node_for(&mut self, target: ImportTarget) -> NodeId {
        if let Some(id) = self.index.get(&target) {
            return *id;
        }
        let id = NodeId(self.nodes.len() as u32);
        self.index.insert(target.clone(), id);
        self.nodes.push(Node::new(target));
        id
    }

    /// Add an export edge.
    ///
    /// An existing edge with the same exporter, exportee and rename absorbs
    /// the new declaration instead: symbol sets are unioned and the origin is
    /// recorded.
    pub fn add_edge(
        &mut self,
        exporter: NodeId,
        exportee: NodeId,
        symbols: SymbolSet,
        rename_as: Option<String>,
        origin: Span,
    ) -> EdgeId {
        let existing = self.nodes[exporter.index()].exports.iter().copied().find(|id| {
            let edge = &self.edges[id.index()];
            edge.exportee == exportee && edge.rename_as == rename_as
        });

        if let Some(id) = existing {
            let edge = &mut self.edges[id.index()];
            edge.symbols.union(symbols);
            edge.origins.push(origin);
            return id;
        }

        let id = EdgeId(self.edges.len() as u32);
        self.edges.push(Edge {
            exporter,
            symbols,
            rename_as,
            exportee,
            origins: vec![origin],
            suppressed: false,
        });
        self.nodes[exporter.index()].exports.push(id);
        self.nodes[exportee.index()].exported_by.push(id);
        id
    }

    /// Look up a node
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Look up an edge
    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.index()]
    }

    pub(crate) fn edge_mut(&mut self, id: EdgeId) -> &mut Edge {
        &mut self.edges[id.index()]
    }

    /// Node wrapping `target`, if any
    pub fn find(&self, target: &ImportTarget) -> Option<NodeId> {
        self.index.get(target).copied()
    }

    /// All node ids in creation order
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    /// All edge ids in creation order
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> {
        (0..self.edges.len() as u32).map(EdgeId)
    }

    /// Nodes exported by `id`, following edge order
    pub fn exportees(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes[id.index()]
            .exports
            .iter()
            .map(move |edge| self.edges[edge.index()].exportee)
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Batch modules whose bindings map was not available
    pub fn missing_bindings(&self) -> &[QualifiedName] {
        &self.missing_bindings
    }
}

/// Symbol restriction and rename of the edge a declaration produces
fn edge_shape(
    ctx: &CompilerContext,
    decl: &ExportDecl,
    target: &ImportTarget,
) -> (SymbolSet, Option<String>) {
    match (&decl.kind, target) {
        (ExportKind::Module { alias }, ImportTarget::Module(module)) => (
            SymbolSet::everything(),
            Some(alias.clone().unwrap_or_else(|| module.item().to_string())),
        ),
        (ExportKind::Module { alias }, other) => (
            SymbolSet::Only(Vec::new()),
            Some(alias.clone().unwrap_or_else(|| other.name().to_string())),
        ),
        (ExportKind::Symbols { names }, ImportTarget::Module(module))
            if matches!(names.as_slice(), [name] if names_module(ctx, module, name)) =>
        {
            (SymbolSet::Only(names.clone()), Some(module.item().to_string()))
        }
        (ExportKind::Symbols { names }, _) => (SymbolSet::Only(names.clone()), None),
        (ExportKind::All { hiding }, _) => (
            SymbolSet::All {
                hiding: hiding.clone(),
            },
            None,
        ),
    }
}

/// `name` is the module's own last segment and the module defines nothing
/// under it, so `from A.B export B` denotes the module `A.B` itself
pub(crate) fn names_module(ctx: &CompilerContext, module: &QualifiedName, name: &str) -> bool {
    name == module.item()
        && ctx
            .bindings(module)
            .map_or(true, |b| b.entities_named(name).next().is_none())
}
