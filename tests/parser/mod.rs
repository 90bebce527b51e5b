//! Parser tests
//!
//! Tests for:
//! - Lossless concrete syntax trees
//! - Error recovery on broken input
//! - Typed AST accessors over realistic files

pub mod tests_lossless;
pub mod tests_recovery;
