//! Fixes: the produced text, idempotence and batch behaviour.

use runcheck::ide::{FixError, UnresolvedReason, apply};
use runcheck::parse;

use crate::helpers::diagnostic_helpers::*;
use crate::helpers::hir_helpers::*;
use crate::helpers::source_fixtures::*;

#[test]
fn test_original_example_fix() {
    let (mut host, file) = analysis_from_source(ORIGINAL_BEFORE, "Class1.cs");
    {
        let analysis = host.analysis();
        let actions = analysis.code_actions(file).unwrap();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].title, "Add call to Process method");
        assert_eq!(actions[0].equivalence_key, "Add call to Process method");
        assert_eq!(actions[0].edit.parameter.name, "specificInterface");
    }
    assert_eq!(fix_everything(&mut host), 1);
    assert_eq!(text_of(&mut host, file), ORIGINAL_AFTER);
}

#[test]
fn test_fix_is_idempotent() {
    let (mut host, file) = analysis_from_source(ORIGINAL_BEFORE, "Class1.cs");
    fix_everything(&mut host);
    assert!(all_findings(&mut host).is_empty());
    assert_eq!(fix_everything(&mut host), 0);
    assert_eq!(text_of(&mut host, file), ORIGINAL_AFTER);
}

#[test]
fn test_fix_only_touches_the_method() {
    let members = "        // before\n        public int Count;\n\n        public void Run(int a)\n        {\n            a++;\n        }\n\n        public void Stop() { }";
    let source = worker_with(members);
    let mut host = analysis_from_sources(&[
        ("ISpecificInterface.cs", SPECIFIC_INTERFACE),
        ("Worker.cs", &source),
    ]);
    let file = host.get_file_id("Worker.cs").unwrap();
    fix_everything(&mut host);
    let expected = source.replace(
        "public void Run(int a)\n        {\n            a++;\n        }",
        "public void Run(int a, SpecificNamespace.ISpecificInterface specificInterface)\n        {\n            a++;\n            specificInterface.Process();\n        }",
    );
    assert_eq!(text_of(&mut host, file), expected);
    let interface = host.get_file_id("ISpecificInterface.cs").unwrap();
    assert_eq!(text_of(&mut host, interface), SPECIFIC_INTERFACE);
}

#[test]
fn test_batch_equals_sequential() {
    let members = "        void Run() { }\n        void Run(int a)\n        {\n            a++;\n        }\n        void Run(string specificInterface)\n        {\n        }";
    let source = worker_with(members);
    let files = [
        ("ISpecificInterface.cs", SPECIFIC_INTERFACE),
        ("Worker.cs", source.as_str()),
    ];

    let mut batch = analysis_from_sources(&files);
    let file = batch.get_file_id("Worker.cs").unwrap();
    assert_eq!(fix_everything(&mut batch), 3);
    let batched = text_of(&mut batch, file);

    // Apply the first remaining fix, recompute, repeat
    let mut sequential = analysis_from_sources(&files);
    loop {
        let next = {
            let analysis = sequential.analysis();
            let actions = analysis.code_actions(file).unwrap();
            match actions.into_iter().next() {
                Some(action) => {
                    let root = parse(analysis.file_text(file).unwrap()).green;
                    Some(apply(&root, [action.edit]).text())
                }
                None => None,
            }
        };
        match next {
            Some(text) => {
                sequential.set_file_content("Worker.cs", &text);
            }
            None => break,
        }
    }
    assert_eq!(text_of(&mut sequential, file), batched);
    assert!(batched.contains("void Run(string specificInterface, SpecificNamespace.ISpecificInterface specificInterface1)"));
    assert!(batched.contains("specificInterface1.Process();"));
}

#[test]
fn test_parameter_name_collisions() {
    let members = "        void Run(int specificInterface)\n        {\n            var specificInterface1 = 0;\n            foreach (var specificInterface2 in items) { }\n        }";
    let mut host = analysis_from_sources(&[
        ("ISpecificInterface.cs", SPECIFIC_INTERFACE),
        ("Worker.cs", &worker_with(members)),
    ]);
    let file = host.get_file_id("Worker.cs").unwrap();
    fix_everything(&mut host);
    let text = text_of(&mut host, file);
    assert!(text.contains("SpecificNamespace.ISpecificInterface specificInterface3)"));
    assert!(text.contains("            specificInterface3.Process();\n"));
    assert!(all_findings(&mut host).is_empty());
}

#[test]
fn test_parameter_does_not_shadow_a_used_field() {
    let members = "        Other specificInterface;\n        void Run()\n        {\n            specificInterface.Log();\n        }";
    let mut host = analysis_from_sources(&[
        ("ISpecificInterface.cs", SPECIFIC_INTERFACE),
        ("Worker.cs", &worker_with(members)),
    ]);
    let file = host.get_file_id("Worker.cs").unwrap();
    assert_eq!(fix_everything(&mut host), 1);
    let text = text_of(&mut host, file);
    assert!(text.contains("void Run(SpecificNamespace.ISpecificInterface specificInterface1)"));
    assert!(text.contains("            specificInterface.Log();\n            specificInterface1.Process();\n"));
    assert!(all_findings(&mut host).is_empty());
}

#[test]
fn test_end_of_line_comment_stays_on_its_line() {
    let members = "        void Run(int a)\n        {\n            a++; // keep me here\n        }";
    let mut host = analysis_from_sources(&[
        ("ISpecificInterface.cs", SPECIFIC_INTERFACE),
        ("Worker.cs", &worker_with(members)),
    ]);
    let file = host.get_file_id("Worker.cs").unwrap();
    fix_everything(&mut host);
    let text = text_of(&mut host, file);
    assert!(text.contains("            a++; // keep me here\n            specificInterface.Process();\n        }"));
}

#[test]
fn test_bodiless_methods_reported_but_not_fixed() {
    let members = "        public abstract void Run();\n        public void Run(int a) => Go(a);";
    let mut host = analysis_from_sources(&[
        ("ISpecificInterface.cs", SPECIFIC_INTERFACE),
        ("Worker.cs", &worker_with(members)),
    ]);
    let file = host.get_file_id("Worker.cs").unwrap();
    let analysis = host.analysis();
    let findings = analysis.findings(file).unwrap();
    assert_eq!(findings.len(), 2);
    for finding in findings.iter() {
        assert_eq!(analysis.fix(finding), Err(FixError::NoBody));
    }
    assert!(analysis.code_actions(file).unwrap().is_empty());
    assert!(analysis.fix_all().unwrap().is_empty());
}

#[test]
fn test_stale_fix_is_not_applied() {
    let (mut host, file) = analysis_from_source(ORIGINAL_BEFORE, "Class1.cs");
    let action = host.analysis().code_actions(file).unwrap().remove(0);

    let edited = ORIGINAL_BEFORE.replace("public void Run()", "public void Run(int a)");
    let outcome = apply(&parse(&edited).green, [action.edit]);
    assert_eq!(outcome.applied, 0);
    assert_eq!(outcome.unresolved.len(), 1);
    assert_eq!(outcome.unresolved[0].reason, UnresolvedReason::Stale);
    assert_eq!(outcome.text(), edited);
}

#[test]
fn test_fix_all_across_files() {
    let a = "namespace SpecificNamespace.A { class Worker { void Run() { } } }";
    let b = "namespace SpecificNamespace.B { class Worker { void Run() { } } }";
    let c = "namespace Elsewhere { class Worker { void Run() { } } }";
    let mut host = analysis_from_sources(&[
        ("ISpecificInterface.cs", SPECIFIC_INTERFACE),
        ("A.cs", a),
        ("B.cs", b),
        ("C.cs", c),
    ]);
    let outcomes = host.analysis().fix_all().unwrap();
    let fixed: Vec<_> = outcomes.keys().copied().collect();
    assert_eq!(
        fixed,
        vec![
            host.get_file_id("A.cs").unwrap(),
            host.get_file_id("B.cs").unwrap()
        ]
    );
    assert!(outcomes.values().all(|o| o.is_complete() && o.applied == 1));

    fix_everything(&mut host);
    assert!(all_findings(&mut host).is_empty());
    let c_file = host.get_file_id("C.cs").unwrap();
    assert_eq!(text_of(&mut host, c_file), c);
}
