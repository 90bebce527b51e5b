//! Lexical scopes for type-name lookup.
//!
//! A [`Scope`] captures everything needed to turn a written type name into a
//! qualified name: the enclosing types and namespaces and the `using`
//! directives in effect at a position.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::parser::{AstNode, NamespaceDecl, SourceFile, SyntaxNode, TypeDecl, UsingDirective};

/// Index key of a type: its dotted qualified name, with a `` `N `` suffix for
/// generic arity (`Outer.Repo`1`).
pub fn type_key(path: &str, arity: usize) -> String {
    if arity == 0 {
        path.to_string()
    } else {
        format!("{path}`{arity}")
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Scope {
    /// Enclosing types and namespaces as qualified keys, innermost first.
    /// The global namespace is implicit.
    containers: Vec<Arc<str>>,
    /// Imported namespaces, innermost directive list first.
    usings: Vec<Arc<str>>,
    aliases: FxHashMap<SmolStr, Arc<str>>,
    /// Full name of the innermost namespace, empty for the global one.
    namespace: Arc<str>,
}

impl Scope {
    /// The scope visible inside `node`.
    ///
    /// When `node` is itself a namespace or type declaration, its members are
    /// part of the scope.
    pub fn of(node: &SyntaxNode) -> Self {
        let mut chain: Vec<SyntaxNode> = node.ancestors().collect();
        chain.reverse();

        let mut scope = Scope::default();
        let mut current = String::new();
        let mut containers = Vec::new();
        let mut using_levels: Vec<Vec<UsingDirective>> = Vec::new();

        for ancestor in chain {
            if let Some(file) = SourceFile::cast(ancestor.clone()) {
                using_levels.push(file.usings().collect());
            } else if let Some(ns) = NamespaceDecl::cast(ancestor.clone()) {
                if let Some(name) = ns.name() {
                    for segment in name.segments() {
                        current = join(&current, &segment);
                        containers.push(Arc::<str>::from(current.as_str()));
                    }
                    scope.namespace = Arc::from(current.as_str());
                }
                using_levels.push(ns.usings().collect());
            } else if let Some(ty) = TypeDecl::cast(ancestor.clone()) {
                let Some(name) = ty.name().and_then(|n| n.text()) else {
                    continue;
                };
                current = join(&current, &type_key(&name, ty.arity()));
                containers.push(Arc::from(current.as_str()));
            }
        }

        containers.reverse();
        scope.containers = containers;
        for directives in using_levels.into_iter().rev() {
            for using in directives {
                let Some(target) = using.target().map(|t| t.text()) else {
                    continue;
                };
                match using.alias().and_then(|a| a.text()) {
                    Some(alias) => {
                        scope.aliases.entry(alias).or_insert_with(|| Arc::from(target));
                    }
                    None if !using.is_static() => scope.usings.push(Arc::from(target)),
                    None => {}
                }
            }
        }
        scope
    }

    /// Qualified key of the innermost container (the declaration itself for
    /// [`Scope::of`] on a type).
    pub fn innermost(&self) -> Option<&Arc<str>> {
        self.containers.first()
    }

    /// Full name of the innermost enclosing namespace
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Candidate qualified keys for a written type name, in lookup order.
    pub fn candidates(&self, path: &str, arity: usize) -> Vec<String> {
        let key = type_key(path, arity);
        let mut candidates: Vec<String> = self
            .containers
            .iter()
            .map(|container| join(container, &key))
            .collect();
        candidates.push(key.clone());

        let (head, rest) = match path.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (path, None),
        };
        if let Some(target) = self.aliases.get(head) {
            let aliased = match rest {
                Some(rest) => type_key(&join(target, rest), arity),
                None => type_key(target, arity),
            };
            candidates.push(aliased);
        }
        candidates.extend(self.usings.iter().map(|using| join(using, &key)));
        candidates
    }
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}
