//! HIR layer tests
//!
//! Tests for the semantic model:
//! - Type resolution across files, usings and aliases
//! - Transitive interface sets
//! - Binding invocations to their declaring types

pub mod tests_invocations;
pub mod tests_name_resolution;
