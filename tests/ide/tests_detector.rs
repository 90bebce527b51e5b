//! Which methods are reported.

use rstest::rstest;
use runcheck::ide::NAMESPACE_RULE;

use crate::helpers::diagnostic_helpers::*;
use crate::helpers::hir_helpers::*;
use crate::helpers::source_fixtures::*;

#[test]
fn test_original_example_diagnostic() {
    let (mut host, file) = analysis_from_source(ORIGINAL_BEFORE, "Class1.cs");
    let analysis = host.analysis();
    let diagnostics = analysis.diagnostics(file).unwrap();
    assert_eq!(diagnostics.len(), 1);

    let diag = &diagnostics[0];
    assert_eq!(diag.code.as_deref(), Some("NamespaceAnalyzer"));
    assert_eq!(diag.severity, NAMESPACE_RULE.default_severity);
    // Line 5, columns 17-20 in 1-based terms
    assert_eq!((diag.start_line, diag.start_col), (4, 16));
    assert_eq!((diag.end_line, diag.end_col), (4, 19));
    let arguments: Vec<&str> = diag.arguments.iter().map(|a| &**a).collect();
    assert_eq!(arguments, ["Run", "SpecificNamespace"]);
    assert_eq!(
        &*diag.message,
        "Method 'Run' in namespace 'SpecificNamespace' must call a Process method on a type implementing ISpecificInterface"
    );
}

#[rstest]
#[case::interface_parameter(
    "        public void Run(ISpecificInterface s)\n        {\n            s.Process();\n        }"
)]
#[case::implementer_field(
    "        Impl impl;\n        public void Run()\n        {\n            impl.Process();\n        }"
)]
#[case::local_implementer(
    "        public void Run()\n        {\n            var x = new Impl();\n            x.Process();\n        }"
)]
#[case::nested_in_lambda(
    "        public void Run(ISpecificInterface s)\n        {\n            Action a = () => s.Process();\n        }"
)]
#[case::expression_body("        public void Run(ISpecificInterface s) => s.Process();")]
#[case::through_this(
    "        ISpecificInterface s;\n        public void Run()\n        {\n            this.s.Process();\n        }"
)]
fn test_satisfied_methods_not_reported(#[case] members: &str) {
    let impl_source = "namespace SpecificNamespace { class Impl : ISpecificInterface { public void Process() { } } }";
    let mut host = analysis_from_sources(&[
        ("ISpecificInterface.cs", SPECIFIC_INTERFACE),
        ("Impl.cs", impl_source),
        ("Worker.cs", &worker_with(members)),
    ]);
    assert!(all_findings(&mut host).is_empty());
}

#[rstest]
#[case::empty("        public void Run()\n        {\n        }")]
#[case::other_call("        public void Run(ISpecificInterface s)\n        {\n            s.ToString();\n        }")]
#[case::unrelated_process(
    "        public void Run(Unrelated u)\n        {\n            u.Process();\n        }"
)]
#[case::unresolved_receiver("        public void Run()\n        {\n            missing.Process();\n        }")]
#[case::abstract_method("        public abstract void Run();")]
#[case::no_fitting_overload(
    "        public void Run(ISpecificInterface s)\n        {\n            s.Process(1);\n        }"
)]
fn test_violations_reported(#[case] members: &str) {
    let unrelated = "namespace SpecificNamespace { class Unrelated { public void Process() { } } }";
    let mut host = analysis_from_sources(&[
        ("ISpecificInterface.cs", SPECIFIC_INTERFACE),
        ("Unrelated.cs", unrelated),
        ("Worker.cs", &worker_with(members)),
    ]);
    let worker = host.get_file_id("Worker.cs").unwrap();
    assert_eq!(
        reported(&mut host, worker),
        vec![("Run".to_string(), "SpecificNamespace".to_string())]
    );
}

#[test]
fn test_same_simple_name_in_other_namespace_does_not_count() {
    let other = "namespace Other { public interface ISpecificInterface { void Process(); } }";
    let worker = "using Other;\nnamespace SpecificNamespace.Jobs\n{\n    class Worker\n    {\n        void Run(Other.ISpecificInterface s)\n        {\n            s.Process();\n        }\n    }\n}\n";
    let mut host = analysis_from_sources(&[
        ("ISpecificInterface.cs", SPECIFIC_INTERFACE),
        ("Other.cs", other),
        ("Worker.cs", worker),
    ]);
    let file = host.get_file_id("Worker.cs").unwrap();
    assert_eq!(
        reported(&mut host, file),
        vec![("Run".to_string(), "SpecificNamespace.Jobs".to_string())]
    );
}

#[test]
fn test_multi_level_inheritance_satisfies() {
    let lib = "namespace Lib\n{\n    using SpecificNamespace;\n    public interface IMiddle : ISpecificInterface { }\n    public class Base : IMiddle { public void Process() { } }\n    public class Derived : Base { }\n}\n";
    let worker = "using Lib;\nnamespace SpecificNamespace\n{\n    class Worker\n    {\n        void Run(Derived d)\n        {\n            d.Process();\n        }\n    }\n}\n";
    let mut host = analysis_from_sources(&[
        ("ISpecificInterface.cs", SPECIFIC_INTERFACE),
        ("Lib.cs", lib),
        ("Worker.cs", worker),
    ]);
    assert!(all_findings(&mut host).is_empty());
}

#[rstest]
#[case::global("class Worker { void Run() { } }")]
#[case::other_namespace("namespace App { class Worker { void Run() { } } }")]
#[case::prefix_not_innermost("namespace SpecificNamespace { namespace Inner { class Worker { void Run() { } } } }")]
#[case::different_method("namespace SpecificNamespace { class Worker { void Start() { } } }")]
#[case::case_sensitive("namespace SpecificNamespace { class Worker { void run() { } } }")]
fn test_out_of_scope_methods_ignored(#[case] source: &str) {
    let mut host = analysis_from_sources(&[
        ("ISpecificInterface.cs", SPECIFIC_INTERFACE),
        ("Worker.cs", source),
    ]);
    assert!(all_findings(&mut host).is_empty());
}

#[rstest]
#[case::dotted("namespace SpecificNamespace.Jobs { class Worker { void Run() { } } }", "SpecificNamespace.Jobs")]
#[case::raw_prefix("namespace SpecificNamespaceTools { class Worker { void Run() { } } }", "SpecificNamespaceTools")]
#[case::nested_written_name(
    "namespace Outer { namespace SpecificNamespace.X { class Worker { void Run() { } } } }",
    "SpecificNamespace.X"
)]
fn test_namespace_argument_is_written_name(#[case] source: &str, #[case] namespace: &str) {
    let mut host = analysis_from_sources(&[
        ("ISpecificInterface.cs", SPECIFIC_INTERFACE),
        ("Worker.cs", source),
    ]);
    let file = host.get_file_id("Worker.cs").unwrap();
    assert_eq!(
        reported(&mut host, file),
        vec![("Run".to_string(), namespace.to_string())]
    );
}

#[test]
fn test_missing_interface_reports_nothing() {
    let mut host = analysis_from_sources(&[(
        "Worker.cs",
        "namespace SpecificNamespace { class Worker { void Run() { } } }",
    )]);
    assert!(all_findings(&mut host).is_empty());
}

#[test]
fn test_each_overload_reported_once() {
    let source = worker_with(
        "        void Run() { }\n        void Run(int a) { }\n        void Run(string s) { }",
    );
    let mut host = analysis_from_sources(&[
        ("ISpecificInterface.cs", SPECIFIC_INTERFACE),
        ("Worker.cs", &source),
    ]);
    let findings = all_findings(&mut host);
    assert_eq!(findings.len(), 3);
    let mut ranges: Vec<_> = findings.iter().map(|f| f.range).collect();
    ranges.dedup();
    assert_eq!(ranges.len(), 3);
}
