//! # runcheck-base
//!
//! Convention analyzer and code fix for C#-like sources: every `Run` method
//! in the configured namespaces must call `Process` on a type implementing
//! the configured interface.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! ide       → Detector, fix synthesis, batch edit application, AnalysisHost
//!   ↓
//! hir       → Symbol index, scopes, semantic model, diagnostics
//!   ↓
//! parser    → Logos lexer, recursive-descent parser, rowan CST, typed AST
//!   ↓
//! base      → Primitives (FileId, LineIndex, TextRange)
//! ```

// ============================================================================
// MODULES (dependency order: base → parser → hir → ide)
// ============================================================================

/// Foundation types: FileId, LineIndex, TextRange
pub mod base;

/// Parser: Logos lexer, recursive-descent parser, typed AST
pub mod parser;

/// High-level IR: symbol index and semantic model
pub mod hir;

/// Rule engine: detection, fixes, edit application
pub mod ide;

// Re-export foundation types
pub use base::{FileId, LineCol, LineIndex, TextRange, TextSize};

// Re-export the main entry points
pub use hir::{Diagnostic, Severity, SemanticModel, SymbolFacts, SymbolIndex};
pub use ide::{Analysis, AnalysisHost, CodeAction, Finding, RuleConfig};
pub use parser::{Parse, parse};

pub use tokio_util::sync::CancellationToken;
