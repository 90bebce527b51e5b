//! Diagnostic records and the collector that gathers them.
//!
//! Syntax errors and rule findings end up in the same list, so a caller
//! sees one ordered report per file.

use std::sync::Arc;

use crate::base::{FileId, LineIndex, TextRange};
use crate::parser::SyntaxError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

/// A located, rendered report.
///
/// Lines and columns are zero-based and computed once at construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub file: FileId,
    pub range: TextRange,
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
    pub severity: Severity,
    /// Rule id, or one of [`codes`] for errors that have no rule
    pub code: Option<Arc<str>>,
    pub message: Arc<str>,
    /// Template arguments in placeholder order
    pub arguments: Vec<Arc<str>>,
}

impl Diagnostic {
    pub fn new(
        file: FileId,
        line_index: &LineIndex,
        range: TextRange,
        severity: Severity,
        message: impl Into<Arc<str>>,
    ) -> Self {
        let start = line_index.line_col(range.start());
        let end = line_index.line_col(range.end());
        Self {
            file,
            range,
            start_line: start.line,
            start_col: start.col,
            end_line: end.line,
            end_col: end.col,
            severity,
            code: None,
            message: message.into(),
            arguments: Vec::new(),
        }
    }

    pub fn with_code(self, code: impl Into<Arc<str>>) -> Self {
        Self {
            code: Some(code.into()),
            ..self
        }
    }

    pub fn with_arguments<I, S>(self, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<str>>,
    {
        Self {
            arguments: arguments.into_iter().map(Into::into).collect(),
            ..self
        }
    }
}

/// Codes for diagnostics that are not produced by a rule.
pub mod codes {
    pub const SYNTAX_ERROR: &str = "E0001";
}

/// Accumulates diagnostics in the order they are reported.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticCollector {
    reported: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.reported.push(diagnostic);
    }

    pub fn syntax_error(&mut self, file: FileId, line_index: &LineIndex, error: &SyntaxError) {
        let diagnostic = Diagnostic::new(
            file,
            line_index,
            error.range,
            Severity::Error,
            error.message.as_str(),
        );
        self.add(diagnostic.with_code(codes::SYNTAX_ERROR));
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.reported
    }

    pub fn len(&self) -> usize {
        self.reported.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reported.is_empty()
    }

    /// Hand out everything reported so far and start over.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.reported)
    }
}
