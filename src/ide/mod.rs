//! Rule engine: detecting violations and fixing them.
//!
//! This module sits on top of the semantic model (HIR). It finds methods
//! that break the Run/Process convention, synthesizes the fix for each one,
//! and applies fixes to documents in batches.
//!
//! ## Design Principles
//!
//! 1. **Snapshots**: queries run on an immutable `Analysis`; only the
//!    `AnalysisHost` mutates state
//! 2. **Pure fixes**: a fix is an `EditDescriptor`, applying it is separate
//! 3. **Parallel by default**: candidates and files are checked with rayon
//!
//! ## Usage
//!
//! ```ignore
//! use runcheck::ide::AnalysisHost;
//!
//! let mut host = AnalysisHost::new();
//! let file = host.set_file_content("Worker.cs", source);
//!
//! let analysis = host.analysis();
//! for diagnostic in analysis.diagnostics(file)? {
//!     println!("{}", diagnostic.message);
//! }
//! ```

mod analysis;
mod apply;
mod config;
mod detector;
mod fix;
mod rule;

pub use analysis::{Analysis, AnalysisHost};
pub use apply::{ApplyOutcome, FileEdits, UnresolvedEdit, UnresolvedReason, apply, apply_all};
pub use config::{ConfigError, RuleConfig};
pub use detector::{Cancelled, Detector, Finding};
pub use fix::{CodeAction, EditDescriptor, FixError, NewParameter, synthesize};
pub use rule::{FixDescriptor, NAMESPACE_RULE, RULE_ID, RuleCategory, RuleDescriptor};
