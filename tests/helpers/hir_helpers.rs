//! Test helpers for setting up analysis hosts and symbol indexes.

use runcheck::base::FileId;
use runcheck::hir::{SymbolIndex, extract_types};
use runcheck::ide::AnalysisHost;
use runcheck::parse;

/// Creates an AnalysisHost with a single file.
pub fn analysis_from_source(source: &str, filename: &str) -> (AnalysisHost, FileId) {
    let mut host = AnalysisHost::new();
    let file_id = host.set_file_content(filename, source);
    let analysis = host.analysis();
    let errors = analysis.syntax_errors(file_id);
    assert!(
        errors.is_empty(),
        "Parse errors in '{}': {:?}",
        filename,
        errors
    );
    (host, file_id)
}

/// Creates an AnalysisHost with multiple files, asserting they all parse.
pub fn analysis_from_sources(files: &[(&str, &str)]) -> AnalysisHost {
    let mut host = AnalysisHost::new();
    for (path, content) in files {
        host.set_file_content(path, content);
    }
    {
        let analysis = host.analysis();
        for (path, _) in files {
            let file = analysis.file_id(path).expect("file was just added");
            let errors = analysis.syntax_errors(file);
            assert!(errors.is_empty(), "Parse errors in '{}': {:?}", path, errors);
        }
    }
    host
}

/// Build a symbol index directly from sources, one FileId per source.
pub fn index_from_sources(sources: &[&str]) -> SymbolIndex {
    SymbolIndex::build(sources.iter().enumerate().map(|(i, source)| {
        let parse = parse(source);
        assert!(parse.ok(), "Parse errors: {:?}", parse.errors);
        extract_types(FileId::new(i as u32), &parse.source_file())
    }))
}
