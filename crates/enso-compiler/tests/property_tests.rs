//! Property-based tests for export resolution.
//!
//! Module sets are generated as random export graphs: module `M{i}` defines
//! type `T{i}` and may export any module with a smaller index, or its type,
//! which keeps the graph acyclic. Cycle properties add a back edge on top.

use enso_compiler::{
    BindingsMap, CompilerContext, DefinedEntity, ExportDecl, ExportsResolution, ImportTarget, Module,
    QualifiedName,
};
use proptest::prelude::*;

/// How module `from` exports module `to`
#[derive(Debug, Clone, Copy)]
enum Form {
    Module,
    Alias,
    Symbols,
    All,
    /// `export M{to}.T{to}`
    Entity,
    /// `from M{to} export M{to}`
    ModuleName,
}

impl Form {
    fn targets_module(self) -> bool {
        !matches!(self, Form::Entity)
    }
}

fn form_strategy() -> impl Strategy<Value = Form> {
    prop_oneof![
        Just(Form::Module),
        Just(Form::Alias),
        Just(Form::Symbols),
        Just(Form::All),
        Just(Form::Entity),
        Just(Form::ModuleName),
    ]
}

/// Module count and `(from, to, form)` edges with `to < from`
fn dag_strategy() -> impl Strategy<Value = (usize, Vec<(usize, usize, Form)>)> {
    (2usize..=8).prop_flat_map(|count| {
        let edge = (1..count)
            .prop_flat_map(|from| (Just(from), 0..from, form_strategy()));
        (Just(count), prop::collection::vec(edge, 0..=16))
    })
}

fn module_name(i: usize) -> QualifiedName {
    QualifiedName::new(format!("Proj.M{}", i))
}

fn declaration(to: usize, form: Form) -> ExportDecl {
    let path = module_name(to);
    match form {
        Form::Module => ExportDecl::module(path),
        Form::Alias => ExportDecl::module_as(path, format!("Alias{}", to)),
        Form::Symbols => ExportDecl::symbols(path, [format!("T{}", to)]),
        Form::All => ExportDecl::all(path),
        Form::Entity => ExportDecl::module(format!("{}.T{}", path, to)),
        Form::ModuleName => ExportDecl::symbols(path, [format!("M{}", to)]),
    }
}

fn build(count: usize, edges: &[(usize, usize, Form)]) -> CompilerContext {
    let mut ctx = CompilerContext::new();
    for i in 0..count {
        let mut bindings = BindingsMap::new().define(DefinedEntity::ty(format!("T{}", i)));
        for (from, to, form) in edges {
            if *from == i {
                bindings = bindings.export(declaration(*to, *form));
            }
        }
        ctx.add(Module::new(module_name(i), bindings));
    }
    ctx
}

/// Batch in reverse declaration order so sorting has work to do
fn batch(count: usize) -> Vec<QualifiedName> {
    (0..count).rev().map(module_name).collect()
}

fn snapshot(ctx: &CompilerContext) -> Vec<String> {
    ctx.modules()
        .map(|m| serde_json::to_string(&m.bindings).unwrap())
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Property: every exportee precedes each of its exporters
    #[test]
    fn prop_acyclic_run_orders_exportees_first((count, edges) in dag_strategy()) {
        let mut ctx = build(count, &edges);
        let order = ExportsResolution::new(&mut ctx).run(&batch(count));
        prop_assert!(order.is_ok(), "acyclic graph rejected: {:?}", order);
        let order = order.unwrap();

        prop_assert_eq!(order.len(), count);
        let position = |i: usize| order.iter().position(|m| *m == module_name(i)).unwrap();
        for (from, to, _) in &edges {
            prop_assert!(
                position(*to) < position(*from),
                "{} ordered after its exporter {}",
                module_name(*to),
                module_name(*from)
            );
        }
    }

    /// Property: an exported module name denotes the module, never its contents
    #[test]
    fn prop_module_name_export_surfaces_only_the_module((count, edges) in dag_strategy()) {
        let mut ctx = build(count, &edges);
        ExportsResolution::new(&mut ctx).run(&batch(count)).unwrap();

        for (from, to, form) in &edges {
            if !matches!(form, Form::ModuleName) {
                continue;
            }
            let symbols = &ctx.bindings(&module_name(*from)).unwrap().exported_symbols;
            let name = format!("M{}", to);
            prop_assert_eq!(
                &symbols[&name],
                &vec![ImportTarget::Module(module_name(*to))]
            );
        }
    }

    /// Property: resolution is a pure function of the module set
    #[test]
    fn prop_run_is_deterministic((count, edges) in dag_strategy()) {
        let mut first = build(count, &edges);
        let mut second = build(count, &edges);

        let order_first = ExportsResolution::new(&mut first).run(&batch(count)).unwrap();
        let order_second = ExportsResolution::new(&mut second).run(&batch(count)).unwrap();
        prop_assert_eq!(&order_first, &order_second);
        prop_assert_eq!(snapshot(&first), snapshot(&second));

        let again = ExportsResolution::new(&mut first).run(&batch(count)).unwrap();
        prop_assert_eq!(&again, &order_first);
        prop_assert_eq!(snapshot(&first), snapshot(&second));
    }

    /// Property: sort-only runs agree with full runs on acyclic input
    #[test]
    fn prop_run_sort_matches_run((count, edges) in dag_strategy()) {
        let mut ctx = build(count, &edges);
        let sorted = ExportsResolution::new(&mut ctx).run_sort(&batch(count));
        let resolved = ExportsResolution::new(&mut ctx).run(&batch(count)).unwrap();
        prop_assert_eq!(sorted, resolved);
    }

    /// Property: resolved symbols of an export never exceed what the exportee offers
    #[test]
    fn prop_resolved_symbols_are_known((count, edges) in dag_strategy()) {
        let mut ctx = build(count, &edges);
        ExportsResolution::new(&mut ctx).run(&batch(count)).unwrap();

        for i in 0..count {
            let bindings = ctx.bindings(&module_name(i)).unwrap();
            for export in &bindings.resolved_exports {
                let target = ctx.bindings(export.target.module()).unwrap();
                for symbol in &export.symbols {
                    let names_module = symbol.as_str() == export.target.module().item();
                    prop_assert!(
                        target.exported_symbols.contains_key(symbol) || names_module,
                        "{} re-exports '{}' which {} does not export",
                        module_name(i),
                        symbol,
                        export.target
                    );
                }
            }
        }
    }

    /// Property: a back edge makes the run fail with a genuine cycle
    #[test]
    fn prop_cycle_is_reported(
        (count, mut edges) in dag_strategy(),
        back in any::<prop::sample::Index>(),
    ) {
        prop_assume!(!edges.is_empty());
        let (from, to, form) = edges[back.index(edges.len())];
        prop_assume!(form.targets_module());
        edges.push((to, from, Form::Module));

        let mut ctx = build(count, &edges);
        let error = ExportsResolution::new(&mut ctx).run(&batch(count)).unwrap_err();

        let cycle = &error.modules;
        prop_assert!(!cycle.is_empty());
        for (i, exporter) in cycle.iter().enumerate() {
            let exportee = &cycle[(i + 1) % cycle.len()];
            let declared = ctx
                .bindings(exporter)
                .unwrap()
                .exports
                .iter()
                .any(|d| d.path == *exportee);
            prop_assert!(declared, "{} does not export {}", exporter, exportee);
        }

        // Sort-only runs still terminate with every module listed
        let order = ExportsResolution::new(&mut ctx).run_sort(&batch(count));
        prop_assert_eq!(order.len(), count);
    }
}
