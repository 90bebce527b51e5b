//! AnalysisHost and Analysis: state management for checking and fixing.
//!
//! The `AnalysisHost` owns the documents, the rule configuration and the
//! symbol index, and hands out `Analysis` snapshots for querying. Findings are
//! memoized per file for the lifetime of the index.
//!
//! ## Usage
//!
//! ```ignore
//! let mut host = AnalysisHost::new();
//! let file = host.set_file_content("Worker.cs", source);
//!
//! let analysis = host.analysis();
//! let diagnostics = analysis.diagnostics(file)?;
//! let fixed = analysis.fix_all()?;
//! ```

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use tokio_util::sync::CancellationToken;

use crate::base::{FileId, LineIndex};
use crate::hir::{Diagnostic, DiagnosticCollector, SemanticModel, SymbolIndex, extract_types};
use crate::parser::{AstNode, MethodDecl, Parse, SyntaxError, SyntaxNode, parse};

use super::apply::{ApplyOutcome, FileEdits, apply, apply_all};
use super::config::{ConfigError, RuleConfig};
use super::detector::{Cancelled, Detector, Finding};
use super::fix::{CodeAction, FixError, synthesize};
use super::rule::NAMESPACE_RULE;

/// One document known to the host.
struct FileData {
    path: Arc<str>,
    text: Arc<str>,
    parse: Parse,
    line_index: LineIndex,
}

type FindingsMemo = RwLock<FxHashMap<FileId, Arc<[Finding]>>>;

/// Owns all mutable state.
///
/// Apply changes via `set_file_content()` and `remove_file()`,
/// then get a consistent snapshot via `analysis()`.
pub struct AnalysisHost {
    files: IndexMap<FileId, FileData>,
    /// Map from file path to FileId
    file_ids: FxHashMap<Arc<str>, FileId>,
    next_file_id: u32,
    config: RuleConfig,
    symbol_index: SymbolIndex,
    /// Whether the index needs rebuilding
    index_dirty: bool,
    findings: FindingsMemo,
    cancel: CancellationToken,
}

impl Default for AnalysisHost {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisHost {
    /// Create a new empty host with the default rule configuration.
    pub fn new() -> Self {
        Self {
            files: IndexMap::new(),
            file_ids: FxHashMap::default(),
            next_file_id: 0,
            config: RuleConfig::default(),
            symbol_index: SymbolIndex::new(),
            index_dirty: false,
            findings: RwLock::new(FxHashMap::default()),
            cancel: CancellationToken::new(),
        }
    }

    /// Create a host enforcing `config`.
    pub fn with_config(config: RuleConfig) -> Result<Self, ConfigError> {
        let mut host = Self::new();
        host.set_config(config)?;
        Ok(host)
    }

    pub fn config(&self) -> &RuleConfig {
        &self.config
    }

    /// Replace the rule configuration. Invalid configurations are rejected
    /// and the current one is kept.
    pub fn set_config(&mut self, config: RuleConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        self.findings.get_mut().clear();
        Ok(())
    }

    /// Set the content of a file, parsing it and storing the result.
    ///
    /// A path keeps its FileId across updates.
    pub fn set_file_content(&mut self, path: &str, content: &str) -> FileId {
        let file = match self.file_ids.get(path) {
            Some(&file) => file,
            None => {
                let file = FileId::new(self.next_file_id);
                self.next_file_id += 1;
                self.file_ids.insert(Arc::from(path), file);
                file
            }
        };
        let parse = parse(content);
        if !parse.ok() {
            tracing::debug!(path, errors = parse.errors.len(), "file has syntax errors");
        }
        self.files.insert(
            file,
            FileData {
                path: Arc::from(path),
                text: Arc::from(content),
                parse,
                line_index: LineIndex::new(content),
            },
        );
        self.mark_dirty();
        file
    }

    /// Remove a file from storage.
    pub fn remove_file(&mut self, path: &str) {
        if let Some(file) = self.file_ids.remove(path) {
            self.files.shift_remove(&file);
            self.mark_dirty();
        }
    }

    /// Check if a file exists in storage.
    pub fn has_file(&self, path: &str) -> bool {
        self.file_ids.contains_key(path)
    }

    /// Get the number of files loaded.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Get the FileId for a path, if it exists.
    pub fn get_file_id(&self, path: &str) -> Option<FileId> {
        self.file_ids.get(path).copied()
    }

    /// Token that cancels queries on snapshots taken before the next
    /// `analysis()` call.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Cancel running queries on existing snapshots.
    pub fn request_cancellation(&self) {
        self.cancel.cancel();
    }

    fn mark_dirty(&mut self) {
        self.index_dirty = true;
        self.findings.get_mut().clear();
    }

    /// Rebuild the symbol index from the current files.
    ///
    /// This is called automatically by `analysis()` if the index is dirty.
    pub fn rebuild_index(&mut self) {
        let results: Vec<_> = self
            .files
            .par_iter()
            .map(|(file, data)| extract_types(*file, &data.parse.source_file()))
            .collect();
        self.symbol_index = SymbolIndex::build(results);
        self.findings.get_mut().clear();
        self.index_dirty = false;
        tracing::debug!(
            files = self.files.len(),
            types = self.symbol_index.len(),
            "rebuilt symbol index"
        );
    }

    /// Get a consistent snapshot for querying.
    ///
    /// If the index is dirty, it will be rebuilt first.
    pub fn analysis(&mut self) -> Analysis<'_> {
        if self.index_dirty {
            self.rebuild_index();
        }
        if self.cancel.is_cancelled() {
            self.cancel = CancellationToken::new();
        }
        Analysis {
            files: &self.files,
            file_ids: &self.file_ids,
            config: &self.config,
            symbol_index: &self.symbol_index,
            findings: &self.findings,
            cancel: self.cancel.clone(),
        }
    }
}

/// Read-only snapshot of the host.
pub struct Analysis<'a> {
    files: &'a IndexMap<FileId, FileData>,
    file_ids: &'a FxHashMap<Arc<str>, FileId>,
    config: &'a RuleConfig,
    symbol_index: &'a SymbolIndex,
    findings: &'a FindingsMemo,
    cancel: CancellationToken,
}

impl<'a> Analysis<'a> {
    pub fn symbol_index(&self) -> &'a SymbolIndex {
        self.symbol_index
    }

    pub fn config(&self) -> &'a RuleConfig {
        self.config
    }

    pub fn file_id(&self, path: &str) -> Option<FileId> {
        self.file_ids.get(path).copied()
    }

    pub fn file_path(&self, file: FileId) -> Option<&'a str> {
        self.files.get(&file).map(|data| &*data.path)
    }

    pub fn file_text(&self, file: FileId) -> Option<&'a str> {
        self.files.get(&file).map(|data| &*data.text)
    }

    pub fn syntax(&self, file: FileId) -> Option<SyntaxNode> {
        self.files.get(&file).map(|data| data.parse.syntax())
    }

    pub fn syntax_errors(&self, file: FileId) -> &'a [SyntaxError] {
        self.files
            .get(&file)
            .map(|data| data.parse.errors.as_slice())
            .unwrap_or_default()
    }

    /// Rule violations in one file. Unknown files have none.
    pub fn findings(&self, file: FileId) -> Result<Arc<[Finding]>, Cancelled> {
        if let Some(cached) = self.findings.read().get(&file) {
            return Ok(cached.clone());
        }
        let Some(data) = self.files.get(&file) else {
            return Ok(Arc::from([]));
        };
        let model = SemanticModel::new(self.symbol_index);
        let detector = Detector::new(&model, self.config).with_cancellation(self.cancel.clone());
        let found: Arc<[Finding]> = detector.detect(file, &data.parse.green)?.into();
        self.findings.write().insert(file, found.clone());
        Ok(found)
    }

    /// Rule violations in every file, in file order.
    pub fn all_findings(&self) -> Result<Vec<Finding>, Cancelled> {
        let per_file = self
            .files
            .par_iter()
            .map(|(file, _)| self.findings(*file))
            .collect::<Result<Vec<_>, Cancelled>>()?;
        Ok(per_file.iter().flat_map(|f| f.iter().cloned()).collect())
    }

    /// Syntax errors and rule violations of one file.
    pub fn diagnostics(&self, file: FileId) -> Result<Vec<Diagnostic>, Cancelled> {
        let Some(data) = self.files.get(&file) else {
            return Ok(Vec::new());
        };
        let mut collector = DiagnosticCollector::new();
        for error in &data.parse.errors {
            collector.syntax_error(file, &data.line_index, error);
        }
        for finding in self.findings(file)?.iter() {
            collector.add(self.to_diagnostic(finding, &data.line_index));
        }
        Ok(collector.take())
    }

    fn to_diagnostic(&self, finding: &Finding, line_index: &LineIndex) -> Diagnostic {
        let [method, namespace] = finding.arguments();
        Diagnostic::new(
            finding.file,
            line_index,
            finding.range,
            NAMESPACE_RULE.default_severity,
            NAMESPACE_RULE.message(self.config, method, namespace),
        )
        .with_code(finding.rule_id)
        .with_arguments(finding.arguments())
    }

    /// The fix for one finding, computed on this snapshot.
    pub fn fix(&self, finding: &Finding) -> Result<CodeAction, FixError> {
        let root = self.syntax(finding.file).ok_or(FixError::TargetNotFound)?;
        let method = finding
            .method
            .try_to_node(&root)
            .and_then(MethodDecl::cast)
            .ok_or(FixError::TargetNotFound)?;
        let edit = synthesize(&method, self.config)?;
        Ok(CodeAction::for_finding(finding, edit, self.config))
    }

    /// Fixes for every fixable finding in one file.
    pub fn code_actions(&self, file: FileId) -> Result<Vec<CodeAction>, Cancelled> {
        let mut actions = Vec::new();
        for finding in self.findings(file)?.iter() {
            match self.fix(finding) {
                Ok(action) => actions.push(action),
                Err(error) => {
                    tracing::debug!(range = ?finding.range, %error, "no fix offered");
                }
            }
        }
        Ok(actions)
    }

    /// Apply every fix in one file as a single batch.
    pub fn fix_all_in_file(&self, file: FileId) -> Result<Option<ApplyOutcome>, Cancelled> {
        let Some(data) = self.files.get(&file) else {
            return Ok(None);
        };
        let edits = self.code_actions(file)?.into_iter().map(|a| a.edit);
        Ok(Some(apply(&data.parse.green, edits)))
    }

    /// Apply every fix in every file. Files without fixes are left out.
    pub fn fix_all(&self) -> Result<IndexMap<FileId, ApplyOutcome>, Cancelled> {
        let batches = self
            .files
            .par_iter()
            .map(|(file, data)| {
                let edits: Vec<_> = self.code_actions(*file)?.into_iter().map(|a| a.edit).collect();
                Ok(FileEdits {
                    file: *file,
                    root: data.parse.green.clone(),
                    edits,
                })
            })
            .collect::<Result<Vec<_>, Cancelled>>()?;
        let batches = batches.into_iter().filter(|b| !b.edits.is_empty()).collect();
        Ok(apply_all(batches))
    }
}
