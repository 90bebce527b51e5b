//! Type resolution and inheritance across files.

use rstest::rstest;
use runcheck::hir::{SymbolIndex, TypeIdx, TypeKind};

use crate::helpers::hir_helpers::index_from_sources;
use crate::helpers::source_fixtures::SPECIFIC_INTERFACE;

fn idx(index: &SymbolIndex, name: &str) -> TypeIdx {
    index
        .type_by_qualified_name(name)
        .unwrap_or_else(|| panic!("type '{name}' should be indexed"))
}

#[test]
fn test_interface_found_by_qualified_name() {
    let index = index_from_sources(&[SPECIFIC_INTERFACE]);
    let interface = idx(&index, "SpecificNamespace.ISpecificInterface");
    let info = index.get(interface).unwrap();
    assert_eq!(info.kind, TypeKind::Interface);
    assert_eq!(info.name, "ISpecificInterface");
    assert!(index.type_by_qualified_name("ISpecificInterface").is_none());
}

#[test]
fn test_multi_level_inheritance_across_files() {
    let index = index_from_sources(&[
        SPECIFIC_INTERFACE,
        "namespace Lib { using SpecificNamespace; public interface IMiddle : ISpecificInterface { } }",
        "using Lib;\nnamespace App { class Base : IMiddle { public void Process() { } } class Derived : Base { } }",
    ]);
    let target = idx(&index, "SpecificNamespace.ISpecificInterface");
    let middle = idx(&index, "Lib.IMiddle");
    let base = idx(&index, "App.Base");
    let derived = idx(&index, "App.Derived");

    assert!(index.all_interfaces(middle).unwrap().contains(&target));
    assert!(index.all_interfaces(base).unwrap().contains(&target));
    assert!(index.all_interfaces(derived).unwrap().contains(&middle));
    assert!(index.all_interfaces(derived).unwrap().contains(&target));
    assert!(!index.all_interfaces(target).unwrap().contains(&target));
    assert_eq!(index.base_classes(derived).collect::<Vec<_>>(), vec![base]);
}

#[test]
fn test_inherited_method_lookup() {
    let index = index_from_sources(&[
        SPECIFIC_INTERFACE,
        "namespace SpecificNamespace { class Base : ISpecificInterface { public void Process() { } } class Derived : Base { } }",
    ]);
    let base = idx(&index, "SpecificNamespace.Base");
    let derived = idx(&index, "SpecificNamespace.Derived");
    let (owner, method) = index.find_method(derived, "Process", 0).unwrap();
    assert_eq!(owner, base);
    assert_eq!(method.arity, 0);
}

#[test]
fn test_interface_cycle_terminates() {
    let index = index_from_sources(&["namespace N { interface IA : IB { } interface IB : IA { } }"]);
    let a = idx(&index, "N.IA");
    let b = idx(&index, "N.IB");
    assert!(index.all_interfaces(a).unwrap().contains(&b));
    assert!(!index.all_interfaces(a).unwrap().contains(&a));
}

#[rstest]
#[case::same_namespace("namespace SpecificNamespace { class C : ISpecificInterface { } }")]
#[case::using_directive("using SpecificNamespace;\nnamespace App { class C : ISpecificInterface { } }")]
#[case::alias("using Spec = SpecificNamespace.ISpecificInterface;\nnamespace App { class C : Spec { } }")]
#[case::qualified("namespace App { class C : SpecificNamespace.ISpecificInterface { } }")]
#[case::nested_namespace("namespace SpecificNamespace.Jobs { class C : ISpecificInterface { } }")]
fn test_base_list_resolution(#[case] source: &str) {
    let index = index_from_sources(&[SPECIFIC_INTERFACE, source]);
    let target = idx(&index, "SpecificNamespace.ISpecificInterface");
    let class = index.types_named("C")[0];
    assert_eq!(index.get(class).unwrap().interfaces, vec![target]);
}

#[test]
fn test_unrelated_same_name_interface_is_distinct() {
    let index = index_from_sources(&[
        SPECIFIC_INTERFACE,
        "namespace Other { public interface ISpecificInterface { void Process(); } class C : ISpecificInterface { } }",
    ]);
    let target = idx(&index, "SpecificNamespace.ISpecificInterface");
    let other = idx(&index, "Other.ISpecificInterface");
    assert_ne!(target, other);
    let class = idx(&index, "Other.C");
    assert!(!index.all_interfaces(class).unwrap().contains(&target));
    assert_eq!(index.types_named("ISpecificInterface").len(), 2);
}

#[test]
fn test_partial_declarations_merge() {
    let index = index_from_sources(&[
        SPECIFIC_INTERFACE,
        "namespace App { partial class Job { void Run() { } } }",
        "using SpecificNamespace;\nnamespace App { partial class Job : ISpecificInterface { public void Process() { } } }",
    ]);
    let job = idx(&index, "App.Job");
    let info = index.get(job).unwrap();
    assert_eq!(info.files.len(), 2);
    assert_eq!(info.methods.len(), 2);
    assert_eq!(info.interfaces.len(), 1);
}
