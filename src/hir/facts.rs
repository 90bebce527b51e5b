//! The symbol-facts capability the rule engine depends on.
//!
//! Detection only needs three questions answered about a compilation, so it
//! depends on this trait rather than on the concrete index and model.

use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use super::resolve::TypeIdx;
use crate::parser::CallExpr;

/// The method an invocation resolved to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MethodRef {
    pub name: SmolStr,
    /// The type declaring the method
    pub containing_type: TypeIdx,
}

/// Read-only symbol queries over one compilation.
///
/// Implementations must be safe to query from several threads at once.
pub trait SymbolFacts: Sync {
    /// Look up a type by its qualified name, e.g.
    /// `SpecificNamespace.ISpecificInterface`.
    fn type_by_qualified_name(&self, name: &str) -> Option<TypeIdx>;

    /// Resolve the method an invocation calls, `None` when it cannot be bound.
    fn resolve_invocation(&self, call: &CallExpr) -> Option<MethodRef>;

    /// Every interface a type implements, directly or through base classes
    /// and interface inheritance. Does not include the type itself.
    fn all_interfaces(&self, ty: TypeIdx) -> Option<&FxHashSet<TypeIdx>>;
}
