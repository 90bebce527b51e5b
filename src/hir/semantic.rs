//! Semantic model: binding invocations to the methods they call.
//!
//! The model answers questions about expressions inside method bodies by
//! inferring the static type of receivers. Inference is intentionally local:
//! it follows declarations, members and return types, and gives up (`None`)
//! on anything it cannot see.

use rowan::TextSize;
use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use super::facts::{MethodRef, SymbolFacts};
use super::resolve::{MethodInfo, SymbolIndex, TypeIdx};
use super::scope::Scope;
use super::symbols::WrittenType;
use crate::parser::{
    AstNode, CallExpr, Expr, ForeachStmt, LocalDecl, MemberAccess, Param, SyntaxKind, SyntaxNode,
    TypeDecl, TypeRef, significant_text,
};

/// Read-only view over a [`SymbolIndex`] for queries on syntax nodes.
#[derive(Clone, Copy, Debug)]
pub struct SemanticModel<'a> {
    index: &'a SymbolIndex,
}

impl<'a> SemanticModel<'a> {
    pub fn new(index: &'a SymbolIndex) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &'a SymbolIndex {
        self.index
    }
}

impl SymbolFacts for SemanticModel<'_> {
    fn type_by_qualified_name(&self, name: &str) -> Option<TypeIdx> {
        self.index.type_by_qualified_name(name)
    }

    fn resolve_invocation(&self, call: &CallExpr) -> Option<MethodRef> {
        let (owner, method) = Inference::new(self.index, call.syntax()).resolve_call(call)?;
        Some(MethodRef {
            name: method.name.clone(),
            containing_type: owner,
        })
    }

    fn all_interfaces(&self, ty: TypeIdx) -> Option<&FxHashSet<TypeIdx>> {
        self.index.all_interfaces(ty)
    }
}

// ============================================================================
// INFERENCE
// ============================================================================

/// What a simple name is bound to inside a method body.
enum Binding {
    Declared(TypeRef),
    /// `var x = <expr>`
    Inferred(Expr),
    /// Bound, but to something whose type is not written (untyped lambda
    /// parameter, `var` without initializer)
    Unknown,
}

/// Inference state for one query site.
struct Inference<'a> {
    index: &'a SymbolIndex,
    scope: Scope,
    containing: Option<TypeIdx>,
}

impl<'a> Inference<'a> {
    fn new(index: &'a SymbolIndex, site: &SyntaxNode) -> Self {
        let scope = Scope::of(site);
        let containing = if site.ancestors().any(|n| TypeDecl::can_cast(n.kind())) {
            scope
                .innermost()
                .and_then(|key| index.type_by_qualified_name(key))
        } else {
            None
        };
        Self {
            index,
            scope,
            containing,
        }
    }

    fn resolve_call(&self, call: &CallExpr) -> Option<(TypeIdx, &'a MethodInfo)> {
        let arity = call.arg_list().map(|args| args.len()).unwrap_or(0);
        match call.callee()? {
            Expr::NameRef(name) => {
                let name = name.text()?;
                // A local delegate shadows methods of the same name
                if self.lookup_local(call.syntax(), &name).is_some() {
                    return None;
                }
                self.index.find_method(self.containing?, &name, arity)
            }
            Expr::MemberAccess(access) => {
                let name = access.member()?.text()?;
                let receiver = self.type_of_receiver(&access)?;
                self.index.find_method(receiver, &name, arity)
            }
            _ => None,
        }
    }

    fn type_of(&self, expr: &Expr) -> Option<TypeIdx> {
        match expr {
            Expr::NameRef(name) => {
                let text = name.text()?;
                if let Some(binding) = self.lookup_local(name.syntax(), &text) {
                    return self.type_of_binding(binding);
                }
                if let Some(containing) = self.containing {
                    if let Some((_, member)) = self.index.find_member(containing, &text) {
                        return member.ty;
                    }
                }
                self.type_named(&text)
            }
            Expr::This(_) => self.containing,
            Expr::Base(_) => self.index.get(self.containing?)?.base_class,
            Expr::MemberAccess(access) => {
                let member = access.member()?.text()?;
                let receiver = self.type_of_receiver(access)?;
                match self.index.find_member(receiver, &member) {
                    Some((_, info)) => info.ty,
                    // `Outer.Inner` names a nested type
                    None => self.type_named(&significant_text(access.syntax())),
                }
            }
            Expr::Call(call) => self.resolve_call(call)?.1.return_type,
            Expr::New(new) => self.type_of_ref(&new.ty()?),
            Expr::Paren(paren) => self.type_of(&paren.expr()?),
            Expr::Cast(cast) => self.type_of_ref(&cast.ty()?),
            Expr::Literal(_) | Expr::Lambda(_) | Expr::Other(_) => None,
        }
    }

    /// Type of the receiver of `a.b`, falling back to reading `a` as a
    /// (possibly namespace-qualified) type name for static access.
    fn type_of_receiver(&self, access: &MemberAccess) -> Option<TypeIdx> {
        let receiver = access.receiver()?;
        self.type_of(&receiver)
            .or_else(|| self.type_named(&significant_text(receiver.syntax())))
    }

    fn type_of_binding(&self, binding: Binding) -> Option<TypeIdx> {
        match binding {
            Binding::Declared(ty) => self.type_of_ref(&ty),
            Binding::Inferred(expr) => self.type_of(&expr),
            Binding::Unknown => None,
        }
    }

    fn type_of_ref(&self, ty: &TypeRef) -> Option<TypeIdx> {
        let written = WrittenType::from_ast(ty)?;
        self.index
            .resolve_type(&self.scope, &written.path, written.arity)
    }

    fn type_named(&self, path: &str) -> Option<TypeIdx> {
        if path.is_empty() {
            return None;
        }
        self.index.resolve_type(&self.scope, path, 0)
    }

    /// Find the innermost declaration of `name` visible at `site`.
    ///
    /// Walks outwards through blocks (declarations that end before the site),
    /// loop headers and lambda parameters, stopping at the method's parameters.
    fn lookup_local(&self, site: &SyntaxNode, name: &SmolStr) -> Option<Binding> {
        let position = site.text_range().start();
        for ancestor in site.ancestors().skip(1) {
            match ancestor.kind() {
                SyntaxKind::BLOCK => {
                    let earlier: Vec<_> = ancestor
                        .children()
                        .filter(|stmt| stmt.text_range().end() <= position)
                        .collect();
                    for stmt in earlier.iter().rev() {
                        if let Some(binding) = declared_in_statement(stmt, name) {
                            return Some(binding);
                        }
                    }
                }
                SyntaxKind::FOR_STMT => {
                    let binding = ancestor
                        .children()
                        .filter_map(LocalDecl::cast)
                        .find_map(|decl| declared_in_local(&decl, name, position));
                    if binding.is_some() {
                        return binding;
                    }
                }
                SyntaxKind::FOREACH_STMT => {
                    let Some(foreach) = ForeachStmt::cast(ancestor.clone()) else {
                        continue;
                    };
                    if foreach.name().and_then(|n| n.text()).as_ref() == Some(name) {
                        return Some(match foreach.ty() {
                            Some(ty) if !ty.is_var() => Binding::Declared(ty),
                            _ => Binding::Unknown,
                        });
                    }
                }
                SyntaxKind::LAMBDA_EXPR => {
                    let params = ancestor
                        .children()
                        .filter(|n| n.kind() == SyntaxKind::LAMBDA_PARAM_LIST)
                        .flat_map(|list| list.children());
                    for param in params {
                        let Some(param) = crate::parser::LambdaParam::cast(param) else {
                            continue;
                        };
                        if param.name().and_then(|n| n.text()).as_ref() == Some(name) {
                            return Some(param.ty().map_or(Binding::Unknown, Binding::Declared));
                        }
                    }
                }
                SyntaxKind::METHOD_DECL | SyntaxKind::CONSTRUCTOR_DECL => {
                    let param = ancestor
                        .children()
                        .filter(|n| n.kind() == SyntaxKind::PARAM_LIST)
                        .flat_map(|list| list.children())
                        .filter_map(Param::cast)
                        .find(|p| p.name().and_then(|n| n.text()).as_ref() == Some(name))?;
                    return Some(param.ty().map_or(Binding::Unknown, Binding::Declared));
                }
                kind if kind.is_type_decl() => return None,
                _ => {}
            }
        }
        None
    }
}

/// A declaration of `name` made by a statement: a local declaration, or an
/// `out var` declaration inside it.
fn declared_in_statement(stmt: &SyntaxNode, name: &SmolStr) -> Option<Binding> {
    let end = stmt.text_range().end();
    if let Some(decl) = LocalDecl::cast(stmt.clone()) {
        return declared_in_local(&decl, name, end);
    }
    stmt.descendants()
        .filter(|n| n.parent().map(|p| p.kind()) == Some(SyntaxKind::ARG_LIST))
        .filter_map(LocalDecl::cast)
        .find_map(|decl| declared_in_local(&decl, name, end))
}

fn declared_in_local(decl: &LocalDecl, name: &SmolStr, position: TextSize) -> Option<Binding> {
    let ty = decl.ty()?;
    let (_, init) = decl
        .declarators()
        .into_iter()
        .filter(|(n, _)| n.syntax().text_range().end() <= position)
        .rfind(|(n, _)| n.text().as_ref() == Some(name))?;
    Some(if !ty.is_var() {
        Binding::Declared(ty)
    } else {
        init.map_or(Binding::Unknown, Binding::Inferred)
    })
}
