//! Violation detection.
//!
//! A method violates the convention when all of the following hold:
//!
//! - its name is the configured method name,
//! - its innermost enclosing namespace is written with the configured prefix,
//! - its body contains no invocation of the configured member on a type that
//!   is, or implements, the configured interface.
//!
//! Candidates are gathered with a single walk over the declarations, then
//! checked in parallel. Each check runs on its own view of the (immutable)
//! green tree, so the only shared state is the symbol facts and the cached
//! interface lookup.

use std::sync::{Arc, OnceLock};

use rayon::prelude::*;
use smol_str::SmolStr;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::base::{FileId, TextRange};
use crate::hir::{SymbolFacts, TypeIdx};
use crate::parser::{
    AstNode, CallExpr, GreenNode, MethodDecl, NamespaceDecl, SyntaxKind, SyntaxNode,
    SyntaxNodePtr,
};

use super::config::RuleConfig;
use super::rule::RULE_ID;

/// The run was cancelled before it finished. Partial results are discarded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("analysis was cancelled")]
pub struct Cancelled;

/// One method violating the convention.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Finding {
    pub rule_id: &'static str,
    pub file: FileId,
    /// Range of the method's name token
    pub range: TextRange,
    /// The offending method declaration
    pub method: SyntaxNodePtr,
    pub method_name: SmolStr,
    /// Written name of the innermost enclosing namespace
    pub namespace: Arc<str>,
}

impl Finding {
    /// Message arguments, in template order.
    pub fn arguments(&self) -> [&str; 2] {
        [self.method_name.as_str(), &self.namespace]
    }
}

/// A method whose name and namespace match; its body still needs checking.
#[derive(Clone, Debug)]
struct Candidate {
    method: SyntaxNodePtr,
    name_range: TextRange,
    name: SmolStr,
    namespace: Arc<str>,
}

/// Checks files against one [`RuleConfig`] using one set of symbol facts.
pub struct Detector<'a, F: SymbolFacts + ?Sized> {
    facts: &'a F,
    config: &'a RuleConfig,
    /// Resolved once per run; `None` means the interface is not in the
    /// compilation and the rule stays silent.
    interface: OnceLock<Option<TypeIdx>>,
    cancel: CancellationToken,
}

impl<'a, F: SymbolFacts + ?Sized> Detector<'a, F> {
    pub fn new(facts: &'a F, config: &'a RuleConfig) -> Self {
        Self {
            facts,
            config,
            interface: OnceLock::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Stop checking candidates once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// The configured interface, looked up on first use.
    pub fn target_interface(&self) -> Option<TypeIdx> {
        *self.interface.get_or_init(|| {
            let found = self
                .facts
                .type_by_qualified_name(&self.config.interface_name);
            if found.is_none() {
                tracing::debug!(
                    interface = %self.config.interface_name,
                    "interface not found in compilation, rule disabled"
                );
            }
            found
        })
    }

    /// Check every candidate method in one file.
    pub fn detect(&self, file: FileId, green: &GreenNode) -> Result<Vec<Finding>, Cancelled> {
        let Some(interface) = self.target_interface() else {
            return Ok(Vec::new());
        };

        let root = SyntaxNode::new_root(green.clone());
        let mut candidates = Vec::new();
        self.collect_candidates(&root, None, &mut candidates);
        tracing::debug!(?file, candidates = candidates.len(), "checking methods");

        let checked = candidates
            .par_iter()
            .map(|candidate| {
                if self.cancel.is_cancelled() {
                    return Err(Cancelled);
                }
                // Syntax nodes are thread-local views; each task builds its own
                let root = SyntaxNode::new_root(green.clone());
                let satisfied = candidate
                    .method
                    .try_to_node(&root)
                    .and_then(MethodDecl::cast)
                    .is_some_and(|method| self.calls_member(&method, interface));
                tracing::trace!(
                    method = %candidate.name,
                    namespace = %candidate.namespace,
                    satisfied,
                    "checked method"
                );
                Ok((!satisfied).then(|| Finding {
                    rule_id: RULE_ID,
                    file,
                    range: candidate.name_range,
                    method: candidate.method,
                    method_name: candidate.name.clone(),
                    namespace: candidate.namespace.clone(),
                }))
            })
            .collect::<Result<Vec<_>, Cancelled>>()?;

        Ok(checked.into_iter().flatten().collect())
    }

    /// Check several files in parallel. Findings keep the input file order.
    pub fn detect_all(&self, files: &[(FileId, GreenNode)]) -> Result<Vec<Finding>, Cancelled> {
        let per_file = files
            .par_iter()
            .map(|(file, green)| self.detect(*file, green))
            .collect::<Result<Vec<_>, Cancelled>>()?;
        Ok(per_file.into_iter().flatten().collect())
    }

    /// Walk declarations, carrying the innermost namespace name down.
    fn collect_candidates(
        &self,
        node: &SyntaxNode,
        namespace: Option<&Arc<str>>,
        out: &mut Vec<Candidate>,
    ) {
        for child in node.children() {
            match child.kind() {
                SyntaxKind::NAMESPACE_DECL => {
                    let name = NamespaceDecl::cast(child.clone())
                        .and_then(|ns| ns.name_text())
                        .map(Arc::<str>::from);
                    self.collect_candidates(&child, name.as_ref().or(namespace), out);
                }
                SyntaxKind::MEMBER_LIST => self.collect_candidates(&child, namespace, out),
                kind if kind.is_type_decl() => self.collect_candidates(&child, namespace, out),
                SyntaxKind::METHOD_DECL => {
                    if let Some(candidate) = self.candidate(&child, namespace) {
                        out.push(candidate);
                    }
                }
                _ => {}
            }
        }
    }

    fn candidate(&self, node: &SyntaxNode, namespace: Option<&Arc<str>>) -> Option<Candidate> {
        let namespace = namespace?;
        if !namespace.starts_with(self.config.namespace_prefix.as_str()) {
            return None;
        }
        let method = MethodDecl::cast(node.clone())?;
        let name = method.name()?;
        let text = name.text()?;
        if text != self.config.method_name.as_str() {
            return None;
        }
        let name_range = name.ident()?.text_range();
        Some(Candidate {
            method: SyntaxNodePtr::new(node),
            name_range,
            name: text,
            namespace: namespace.clone(),
        })
    }

    /// Does the method body call the member on the interface or an implementer?
    fn calls_member(&self, method: &MethodDecl, interface: TypeIdx) -> bool {
        let body = match (method.body(), method.expr_body()) {
            (Some(block), _) => block.syntax().clone(),
            (None, Some(expr_body)) => expr_body.syntax().clone(),
            (None, None) => return false,
        };
        body.descendants()
            .filter_map(CallExpr::cast)
            .filter(|call| call.method_name().as_deref() == Some(self.config.member_name.as_str()))
            .filter_map(|call| self.facts.resolve_invocation(&call))
            .any(|target| {
                target.name == self.config.member_name.as_str()
                    && (target.containing_type == interface
                        || self
                            .facts
                            .all_interfaces(target.containing_type)
                            .is_some_and(|set| set.contains(&interface)))
            })
    }
}
