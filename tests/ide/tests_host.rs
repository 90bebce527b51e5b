//! AnalysisHost behaviour around configuration, edits and cancellation.

use runcheck::CancellationToken;
use runcheck::hir::SemanticModel;
use runcheck::ide::{AnalysisHost, Cancelled, Detector, RuleConfig};

use crate::helpers::diagnostic_helpers::*;
use crate::helpers::hir_helpers::*;
use crate::helpers::source_fixtures::*;

const STEP: &str = "namespace App.Pipeline\n{\n    public interface IStep\n    {\n        void Handle();\n    }\n}\n";
const JOB: &str = "namespace App.Jobs\n{\n    public class Nightly\n    {\n        public void Execute()\n        {\n        }\n    }\n}\n";

fn custom_config() -> RuleConfig {
    RuleConfig::new()
        .with_method_name("Execute")
        .with_namespace_prefix("App.Jobs")
        .with_interface_name("App.Pipeline.IStep")
        .with_member_name("Handle")
        .with_parameter_name("step")
}

#[test]
fn test_custom_convention_end_to_end() {
    let mut host = AnalysisHost::with_config(custom_config()).unwrap();
    host.set_file_content("IStep.cs", STEP);
    let job = host.set_file_content("Nightly.cs", JOB);

    {
        let analysis = host.analysis();
        let diagnostics = analysis.diagnostics(job).unwrap();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            &*diagnostics[0].message,
            "Method 'Execute' in namespace 'App.Jobs' must call a Handle method on a type implementing IStep"
        );
    }

    fix_everything(&mut host);
    let text = text_of(&mut host, job);
    assert!(text.contains("public void Execute(App.Pipeline.IStep step)"));
    assert!(text.contains("            step.Handle();\n"));
    assert!(all_findings(&mut host).is_empty());
}

#[test]
fn test_removing_interface_file_silences_rule() {
    let mut host = analysis_from_sources(&[
        ("ISpecificInterface.cs", SPECIFIC_INTERFACE),
        ("Worker.cs", &worker_with("        void Run() { }")),
    ]);
    assert_eq!(all_findings(&mut host).len(), 1);
    host.remove_file("ISpecificInterface.cs");
    assert!(all_findings(&mut host).is_empty());
}

#[test]
fn test_updates_invalidate_findings() {
    let mut host = analysis_from_sources(&[
        ("ISpecificInterface.cs", SPECIFIC_INTERFACE),
        ("Worker.cs", &worker_with("        void Run() { }")),
    ]);
    let file = host.get_file_id("Worker.cs").unwrap();
    assert_eq!(reported(&mut host, file).len(), 1);
    host.set_file_content(
        "Worker.cs",
        &worker_with("        void Run(ISpecificInterface s) { s.Process(); }"),
    );
    assert!(reported(&mut host, file).is_empty());
}

#[test]
fn test_host_cancellation() {
    let mut host = analysis_from_sources(&[
        ("ISpecificInterface.cs", SPECIFIC_INTERFACE),
        ("Worker.cs", &worker_with("        void Run() { }")),
    ]);
    let token = host.cancellation_token();
    let analysis = host.analysis();
    token.cancel();
    assert_eq!(analysis.all_findings(), Err(Cancelled));
    assert!(analysis.fix_all().is_err());
}

#[test]
fn test_detector_over_many_files() {
    let sources: Vec<String> = (0..16)
        .map(|i| format!("namespace SpecificNamespace.N{i} {{ class W{i} {{ void Run() {{ }} }} }}"))
        .collect();
    let mut all: Vec<&str> = vec![SPECIFIC_INTERFACE];
    all.extend(sources.iter().map(String::as_str));
    let index = index_from_sources(&all);
    let model = SemanticModel::new(&index);
    let config = RuleConfig::default();

    let files: Vec<_> = all
        .iter()
        .enumerate()
        .map(|(i, source)| (runcheck::FileId::new(i as u32), runcheck::parse(source).green))
        .collect();
    let detector = Detector::new(&model, &config);
    let findings = detector.detect_all(&files).unwrap();
    assert_eq!(findings.len(), 16);
    // Input order is kept
    let namespaces: Vec<_> = findings.iter().map(|f| f.namespace.to_string()).collect();
    let expected: Vec<_> = (0..16).map(|i| format!("SpecificNamespace.N{i}")).collect();
    assert_eq!(namespaces, expected);

    let cancelled = CancellationToken::new();
    cancelled.cancel();
    let detector = Detector::new(&model, &config).with_cancellation(cancelled);
    assert_eq!(detector.detect_all(&files), Err(Cancelled));
}
