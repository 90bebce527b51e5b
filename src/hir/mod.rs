//! High-level IR (HIR): the semantic model over parsed files.
//!
//! This module turns syntax trees into facts about types: what each type is
//! called, what it inherits, which interfaces it implements transitively, and
//! which method an invocation binds to.
//!
//! ## Key Types
//!
//! - [`HirType`]: A type declaration extracted from one file
//! - [`SymbolIndex`]: Workspace-wide type index with interface closures
//! - [`SemanticModel`]: Invocation binding and receiver type inference
//! - [`SymbolFacts`]: The narrow capability rules depend on
//! - [`Diagnostic`]: A located message produced by analysis
//!
//! ## Layers
//!
//! ```text
//! parse(file)               ← Lossless syntax tree (per-file)
//!     │
//!     ▼
//! extract_types(file)       ← Type declarations with written names (per-file)
//!     │
//!     ▼
//! SymbolIndex::build        ← Resolved bases, members, interface closure
//!     │
//!     ▼
//! SemanticModel             ← Invocation → MethodRef
//! ```

mod diagnostics;
mod facts;
mod resolve;
mod scope;
mod semantic;
mod symbols;

pub use diagnostics::{Diagnostic, DiagnosticCollector, Severity, codes};
pub use facts::{MethodRef, SymbolFacts};
pub use resolve::{MemberInfo, MethodInfo, SymbolIndex, TypeIdx, TypeInfo};
pub use scope::{Scope, type_key};
pub use semantic::SemanticModel;
pub use symbols::{
    ExtractionResult, HirMember, HirMethod, HirType, TypeKind, WrittenType, extract_types,
};
