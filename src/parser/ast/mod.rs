//! Typed views over the lossless syntax tree.
//!
//! Every view is a newtype around a [`SyntaxNode`] of one kind. Accessors
//! are thin: they look at children and never allocate a new tree.

use super::syntax_kind::SyntaxKind;
use super::{SyntaxNode, SyntaxToken};

/// Direct child tokens of `node`, trivia included.
fn child_tokens(node: &SyntaxNode) -> impl Iterator<Item = SyntaxToken> {
    node.children_with_tokens().filter_map(rowan::NodeOrToken::into_token)
}

#[inline]
fn has_token(node: &SyntaxNode, kind: SyntaxKind) -> bool {
    child_tokens(node).any(|token| token.kind() == kind)
}

#[inline]
fn find_token(node: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxToken> {
    child_tokens(node).find(|token| token.kind() == kind)
}

/// Text of a subtree with whitespace and comments dropped.
///
/// `SpecificNamespace . Inner` and `SpecificNamespace.Inner` both yield
/// `SpecificNamespace.Inner`.
pub fn significant_text(node: &SyntaxNode) -> String {
    let mut text = String::new();
    for token in node
        .descendants_with_tokens()
        .filter_map(rowan::NodeOrToken::into_token)
    {
        if !token.kind().is_trivia() {
            text.push_str(token.text());
        }
    }
    text
}

/// Identifier text without the `@` verbatim prefix.
pub fn ident_text(token: &SyntaxToken) -> &str {
    token.text().strip_prefix('@').unwrap_or(token.text())
}

/// `pub fn is_x(&self) -> bool` for a modifier keyword.
macro_rules! has_token_method {
    ($method:ident, $token_kind:ident) => {
        #[doc = concat!("Whether a `", stringify!($token_kind), "` modifier is present.")]
        pub fn $method(&self) -> bool {
            has_token(&self.0, SyntaxKind::$token_kind)
        }
    };
}

/// `pub fn x(&self) -> Option<T>` returning the first child view of type `T`.
macro_rules! first_child_method {
    ($method:ident, $view:ident) => {
        pub fn $method(&self) -> Option<$view> {
            self.0.children().find_map($view::cast)
        }
    };
}

/// `pub fn xs(&self) -> impl Iterator<Item = T>` over direct child views.
macro_rules! children_method {
    ($method:ident, $view:ident) => {
        pub fn $method(&self) -> impl Iterator<Item = $view> + '_ {
            self.0.children().filter_map($view::cast)
        }
    };
}

/// Like `children_method!`, but searching the whole subtree.
macro_rules! descendants_method {
    ($method:ident, $view:ident, $doc:literal) => {
        #[doc = $doc]
        pub fn $method(&self) -> impl Iterator<Item = $view> + '_ {
            self.0.descendants().filter_map($view::cast)
        }
    };
}

/// First child view of type `T` that follows a given token.
macro_rules! child_after_token_method {
    ($method:ident, $view:ident, $token_kind:ident, $doc:literal) => {
        #[doc = $doc]
        pub fn $method(&self) -> Option<$view> {
            self.0
                .children_with_tokens()
                .skip_while(|element| element.kind() != SyntaxKind::$token_kind)
                .filter_map(rowan::NodeOrToken::into_node)
                .find_map($view::cast)
        }
    };
}

/// A typed view of one syntax node kind.
pub trait AstNode: Sized {
    fn can_cast(kind: SyntaxKind) -> bool;
    fn cast(node: SyntaxNode) -> Option<Self>;
    fn syntax(&self) -> &SyntaxNode;

    /// Views of type `T` anywhere below this node.
    fn descendants<T: AstNode>(&self) -> impl Iterator<Item = T> {
        self.syntax().descendants().filter_map(T::cast)
    }
}

macro_rules! ast_node {
    ($view:ident, $kind:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $view(pub(crate) SyntaxNode);

        impl AstNode for $view {
            fn can_cast(kind: SyntaxKind) -> bool {
                kind == SyntaxKind::$kind
            }

            fn cast(node: SyntaxNode) -> Option<Self> {
                Self::can_cast(node.kind()).then_some(Self(node))
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.0
            }
        }
    };
}

// Declared after the macros so they are in scope
mod expressions;
mod items;
mod statements;

pub use self::expressions::*;
pub use self::items::*;
pub use self::statements::*;
