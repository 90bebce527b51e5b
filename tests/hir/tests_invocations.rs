//! Binding invocations through the symbol-facts capability.

use rstest::rstest;
use runcheck::hir::{SemanticModel, SymbolFacts};
use runcheck::parser::{AstNode, CallExpr, parse};

use crate::helpers::hir_helpers::index_from_sources;
use crate::helpers::source_fixtures::SPECIFIC_INTERFACE;

const TYPES: &str = "namespace SpecificNamespace
{
    public class Impl : ISpecificInterface { public void Process() { } public Impl Next() { return this; } }
    public class Unrelated { public void Process() { } }
    public static class Factory { public static ISpecificInterface Create() { return null; } }
}
";

/// Declaring type of every `Process` call in `body`, by qualified name.
fn process_owners(body: &str) -> Vec<Option<String>> {
    let host = format!(
        "namespace SpecificNamespace\n{{\n    class Host\n    {{\n        ISpecificInterface field;\n        void Run(ISpecificInterface p, Impl impl, Unrelated other)\n        {{\n{body}\n        }}\n    }}\n}}\n"
    );
    let index = index_from_sources(&[SPECIFIC_INTERFACE, TYPES, &host]);
    let model = SemanticModel::new(&index);
    let parsed = parse(&host);
    parsed
        .syntax()
        .descendants()
        .filter_map(CallExpr::cast)
        .filter(|call| call.method_name().as_deref() == Some("Process"))
        .map(|call| {
            model
                .resolve_invocation(&call)
                .and_then(|m| index.get(m.containing_type))
                .map(|t| t.qualified_name.to_string())
        })
        .collect()
}

#[rstest]
#[case::parameter("p.Process();", "SpecificNamespace.ISpecificInterface")]
#[case::implementer("impl.Process();", "SpecificNamespace.Impl")]
#[case::unrelated("other.Process();", "SpecificNamespace.Unrelated")]
#[case::field("field.Process();", "SpecificNamespace.ISpecificInterface")]
#[case::this_field("this.field.Process();", "SpecificNamespace.ISpecificInterface")]
#[case::local("var x = new Impl(); x.Process();", "SpecificNamespace.Impl")]
#[case::typed_local("ISpecificInterface y = impl; y.Process();", "SpecificNamespace.ISpecificInterface")]
#[case::call_chain("impl.Next().Process();", "SpecificNamespace.Impl")]
#[case::static_factory("Factory.Create().Process();", "SpecificNamespace.ISpecificInterface")]
#[case::cast("((ISpecificInterface)other).Process();", "SpecificNamespace.ISpecificInterface")]
#[case::lambda_typed("Action<Impl> f = (Impl i) => i.Process();", "SpecificNamespace.Impl")]
fn test_receiver_binding(#[case] body: &str, #[case] owner: &str) {
    assert_eq!(process_owners(body), vec![Some(owner.to_string())]);
}

#[rstest]
#[case::unknown_receiver("missing.Process();")]
#[case::untyped_lambda("Action<Impl> f = i => i.Process();")]
#[case::free_call("Process();")]
fn test_unresolvable_invocations(#[case] body: &str) {
    assert_eq!(process_owners(body), vec![None]);
}

#[test]
fn test_interface_closure_via_facts() {
    let index = index_from_sources(&[SPECIFIC_INTERFACE, TYPES]);
    let model = SemanticModel::new(&index);
    let target = model
        .type_by_qualified_name("SpecificNamespace.ISpecificInterface")
        .unwrap();
    let implementer = model.type_by_qualified_name("SpecificNamespace.Impl").unwrap();
    let unrelated = model
        .type_by_qualified_name("SpecificNamespace.Unrelated")
        .unwrap();
    assert!(model.all_interfaces(implementer).unwrap().contains(&target));
    assert!(model.all_interfaces(unrelated).unwrap().is_empty());
}
