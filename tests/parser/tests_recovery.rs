//! Broken input still yields a complete tree and reports errors.

use rstest::rstest;
use runcheck::parser::{AstNode, parse};

#[rstest]
#[case::unclosed_class("namespace A { class C { void Run() { }")]
#[case::missing_name("class { }")]
#[case::bad_statement("class C { void Run() { var = ; } }")]
#[case::stray_brace("} class C { }")]
#[case::unclosed_params("class C { void Run(int a { } }")]
fn test_errors_are_reported_and_text_kept(#[case] source: &str) {
    let parsed = parse(source);
    assert!(!parsed.ok());
    assert_eq!(parsed.syntax().text().to_string(), source);
    for error in &parsed.errors {
        assert!(u32::from(error.range.end()) as usize <= source.len());
    }
}

#[test]
fn test_valid_members_survive_errors() {
    let parsed = parse("namespace A { class C { void Run() { } int = ; void Stop() { } } }");
    assert!(!parsed.ok());
    let names: Vec<_> = parsed
        .source_file()
        .descendants::<runcheck::parser::MethodDecl>()
        .filter_map(|m| m.name().and_then(|n| n.text()))
        .collect();
    assert!(names.iter().any(|n| n == "Run"));
    assert!(names.iter().any(|n| n == "Stop"));
}
