//! The CST must reproduce its input byte for byte.

use rstest::rstest;
use runcheck::parser::{AstNode, MethodDecl, SyntaxKind, TypeDecl, parse};

use crate::helpers::source_fixtures::*;

#[rstest]
#[case::original(ORIGINAL_BEFORE)]
#[case::fixed(ORIGINAL_AFTER)]
#[case::interface(SPECIFIC_INTERFACE)]
#[case::crlf("namespace A\r\n{\r\n    class C\r\n    {\r\n        void Run() { }\r\n    }\r\n}\r\n")]
#[case::comments("/* header */\nnamespace A { // trailing\n  /// doc\n  class C { void Run() { /* inner */ } } }")]
fn test_parse_is_lossless(#[case] source: &str) {
    let parsed = parse(source);
    assert!(parsed.ok(), "errors: {:?}", parsed.errors);
    assert_eq!(parsed.syntax().text().to_string(), source);
}

#[test]
fn test_original_example_shape() {
    let parsed = parse(ORIGINAL_BEFORE);
    let root = parsed.source_file();
    let ns = root.namespaces().next().unwrap();
    assert!(ns.is_file_scoped());
    assert_eq!(ns.name_text().as_deref(), Some("SpecificNamespace"));

    let types: Vec<TypeDecl> = ns.types().collect();
    assert_eq!(types.len(), 2);
    let run = types[0].methods().next().unwrap();
    assert_eq!(run.name().and_then(|n| n.text()).as_deref(), Some("Run"));
    let body = run.body().unwrap();
    assert_eq!(body.statements().count(), 0);
    // The comment stays inside the block
    assert!(
        body.syntax()
            .children_with_tokens()
            .any(|e| e.kind() == SyntaxKind::LINE_COMMENT)
    );
    assert!(types[1].methods().next().unwrap().body().is_none());
}

#[test]
fn test_statement_forms_in_bodies() {
    let source = worker_with(
        "        public void Run(IWorker w)\n        {\n            var x = w.Create();\n            foreach (var item in items) { item.Process(); }\n            Action a = () => w.Process();\n            if (x != null) { ((IWorker)x).Process(); } else { return; }\n        }",
    );
    let parsed = parse(&source);
    assert!(parsed.ok(), "errors: {:?}", parsed.errors);
    let method = parsed
        .source_file()
        .descendants::<MethodDecl>()
        .next()
        .unwrap();
    let calls: Vec<_> = method
        .syntax()
        .descendants()
        .filter(|n| n.kind() == SyntaxKind::CALL_EXPR)
        .collect();
    assert_eq!(calls.len(), 4);
    assert_eq!(parsed.syntax().text().to_string(), source);
}
