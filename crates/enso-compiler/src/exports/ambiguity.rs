//! Ambiguous export detection

use super::resolve::SymbolOrigins;
use crate::bindings::ImportTarget;
use crate::diagnostic::{DiagnosticSink, ExportDiagnostic};

/// Report every exported name that denotes more than one entity.
///
/// The first entity under a name is kept as the reference; each later one is
/// reported at the declaration that introduced it. A type and its own
/// constructor of the same name do not conflict. Tables are left as they
/// are.
pub fn report_ambiguous(origins: &SymbolOrigins, sink: &mut DiagnosticSink) {
    for (module, table) in origins.iter() {
        for (symbol, entries) in table {
            let [(first, _), rest @ ..] = entries.as_slice() else {
                continue;
            };
            for (second, span) in rest {
                if is_own_constructor(first, second) || is_own_constructor(second, first) {
                    continue;
                }
                sink.report(
                    module,
                    ExportDiagnostic::AmbiguousExport {
                        symbol: symbol.clone(),
                        first: first.to_string(),
                        second: second.to_string(),
                        span: *span,
                    },
                );
            }
        }
    }
}

fn is_own_constructor(ty: &ImportTarget, ctor: &ImportTarget) -> bool {
    match (ty, ctor) {
        (
            ImportTarget::Type { module, name },
            ImportTarget::Constructor {
                module: ctor_module,
                type_name,
                ..
            },
        ) => module == ctor_module && name == type_name,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::{BindingsMap, DefinedEntity, ExportDecl};
    use crate::context::{CompilerContext, Module};
    use crate::exports::ExportsResolution;
    use crate::name::QualifiedName;

    #[test]
    fn test_type_with_same_named_constructor_is_not_ambiguous() {
        let mut ctx = CompilerContext::new()
            .with(Module::new(
                "Shapes.Circle",
                BindingsMap::new()
                    .define(DefinedEntity::ty("Circle"))
                    .define(DefinedEntity::constructor("Circle", "Circle")),
            ))
            .with(Module::new("Shapes", BindingsMap::new().export(ExportDecl::module("Shapes.Circle"))));
        let batch: Vec<QualifiedName> = vec!["Shapes.Circle".into(), "Shapes".into()];

        ExportsResolution::new(&mut ctx).run(&batch).unwrap();

        assert!(ctx.diagnostics(&"Shapes.Circle".into()).is_empty());
        assert!(ctx.diagnostics(&"Shapes".into()).is_empty());
        let shapes = ctx.bindings(&"Shapes".into()).unwrap();
        assert_eq!(shapes.exported_symbols.len(), 1);
        assert_eq!(shapes.exported_symbols["Circle"].len(), 2);
    }

    #[test]
    fn test_every_later_entity_is_reported() {
        let mut ctx = CompilerContext::new()
            .with(Module::new("A", BindingsMap::new().define(DefinedEntity::ty("T"))))
            .with(Module::new("B", BindingsMap::new().define(DefinedEntity::ty("T"))))
            .with(Module::new("C", BindingsMap::new().define(DefinedEntity::module_method("T"))))
            .with(Module::new(
                "D",
                BindingsMap::new()
                    .export(ExportDecl::all("A"))
                    .export(ExportDecl::all("B"))
                    .export(ExportDecl::symbols("C", ["T"])),
            ));
        let batch: Vec<QualifiedName> = vec!["A".into(), "B".into(), "C".into(), "D".into()];

        ExportsResolution::new(&mut ctx).run(&batch).unwrap();

        let seconds: Vec<_> = ctx
            .diagnostics(&"D".into())
            .iter()
            .map(|d| match d {
                ExportDiagnostic::AmbiguousExport { first, second, .. } => (first.as_str(), second.as_str()),
                other => panic!("unexpected diagnostic {:?}", other),
            })
            .collect();
        assert_eq!(seconds, vec![("A.T", "B.T"), ("A.T", "C.T")]);
    }
}
