//! Rule engine tests
//!
//! Tests for:
//! - Detection scenarios across namespaces, files and inheritance
//! - Fix synthesis and batch application
//! - Host behaviour: configuration, cancellation, memoized findings

pub mod tests_detector;
pub mod tests_fix;
pub mod tests_host;
