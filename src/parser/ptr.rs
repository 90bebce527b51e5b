//! Stable pointers to syntax nodes.
//!
//! A [`SyntaxNodePtr`] identifies a node inside one tree snapshot by its kind
//! and text range. Pointers are cheap to copy and send across threads, and are
//! resolved back into a live node with [`SyntaxNodePtr::try_to_node`].

use super::{SyntaxKind, SyntaxNode};
use rowan::TextRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SyntaxNodePtr {
    kind: SyntaxKind,
    range: TextRange,
}

impl SyntaxNodePtr {
    pub fn new(node: &SyntaxNode) -> Self {
        Self {
            kind: node.kind(),
            range: node.text_range(),
        }
    }

    pub fn kind(&self) -> SyntaxKind {
        self.kind
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    /// Find the node this pointer was created from, if `root` still has it.
    ///
    /// Returns the outermost node with a matching kind and range.
    pub fn try_to_node(&self, root: &SyntaxNode) -> Option<SyntaxNode> {
        if !root.text_range().contains_range(self.range) {
            return None;
        }
        let mut node = match root.covering_element(self.range) {
            rowan::NodeOrToken::Node(node) => node,
            rowan::NodeOrToken::Token(token) => token.parent()?,
        };
        // The covering element is the innermost; walk up to the outermost match
        let mut found = None;
        loop {
            if node.text_range() != self.range {
                break;
            }
            if node.kind() == self.kind {
                found = Some(node.clone());
            }
            match node.parent() {
                Some(parent) => node = parent,
                None => break,
            }
        }
        found
    }
}
