//! Helpers for checking findings and fixes.

use runcheck::base::FileId;
use runcheck::ide::{AnalysisHost, Finding};

/// Findings in every file of the host.
pub fn all_findings(host: &mut AnalysisHost) -> Vec<Finding> {
    host.analysis()
        .all_findings()
        .expect("analysis was not cancelled")
}

/// Names of the methods reported in one file, as `(method, namespace)`.
pub fn reported(host: &mut AnalysisHost, file: FileId) -> Vec<(String, String)> {
    host.analysis()
        .findings(file)
        .expect("analysis was not cancelled")
        .iter()
        .map(|f| {
            let [method, namespace] = f.arguments();
            (method.to_string(), namespace.to_string())
        })
        .collect()
}

/// Apply every fix in the host and store the results back into it.
/// Returns the number of edits applied.
pub fn fix_everything(host: &mut AnalysisHost) -> usize {
    let outcomes = host.analysis().fix_all().expect("analysis was not cancelled");
    let mut updates = Vec::new();
    let mut applied = 0;
    {
        let analysis = host.analysis();
        for (file, outcome) in &outcomes {
            applied += outcome.applied;
            let path = analysis.file_path(*file).expect("fixed file exists");
            updates.push((path.to_string(), outcome.text()));
        }
    }
    for (path, text) in updates {
        host.set_file_content(&path, &text);
    }
    applied
}

/// Current text of a file.
pub fn text_of(host: &mut AnalysisHost, file: FileId) -> String {
    host.analysis()
        .file_text(file)
        .expect("file exists")
        .to_string()
}
