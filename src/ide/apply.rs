//! Applying edits to a document.
//!
//! All edits for one document are applied against the tree they were computed
//! on, in a single rebuild. Each edit names its target by a
//! [`SyntaxNodePtr`] and carries the target's original green node, so an edit
//! whose target changed or disappeared is reported instead of applied.
//! Untouched subtrees are shared with the input tree.

use indexmap::IndexMap;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::base::{FileId, TextRange, TextSize};
use crate::parser::{GreenNode, NodeOrToken, SyntaxNode, SyntaxNodePtr};

use super::fix::{EditDescriptor, green_of};

/// Why an edit was not applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum UnresolvedReason {
    #[error("target is missing or changed in the document")]
    Stale,

    #[error("target overlaps the target of another edit")]
    Overlapped,

    #[error("a later edit replaced the same target")]
    Superseded,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnresolvedEdit {
    pub target: SyntaxNodePtr,
    pub reason: UnresolvedReason,
}

/// Result of applying a batch of edits to one document.
#[derive(Clone, Debug)]
pub struct ApplyOutcome {
    pub green: GreenNode,
    pub applied: usize,
    pub unresolved: Vec<UnresolvedEdit>,
    /// Inserted text in the new document, for a formatter
    pub format_ranges: Vec<TextRange>,
}

impl ApplyOutcome {
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    pub fn text(&self) -> String {
        self.syntax().text().to_string()
    }

    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// The edits for one document, as handed to [`apply_all`].
#[derive(Clone, Debug)]
pub struct FileEdits {
    pub file: FileId,
    pub root: GreenNode,
    pub edits: Vec<EditDescriptor>,
}

/// Apply `edits` to the document rooted at `root`.
///
/// When two edits target the same node the later one wins.
pub fn apply(root: &GreenNode, edits: impl IntoIterator<Item = EditDescriptor>) -> ApplyOutcome {
    let tree = SyntaxNode::new_root(root.clone());
    let mut unresolved = Vec::new();
    let mut by_target: IndexMap<SyntaxNodePtr, EditDescriptor> = IndexMap::new();

    for edit in edits {
        let current = edit.target.try_to_node(&tree);
        let fresh = current.is_some_and(|node| node.green().into_owned() == edit.original);
        if !fresh {
            tracing::debug!(target_range = ?edit.target.range(), "skipping stale edit");
            unresolved.push(UnresolvedEdit {
                target: edit.target,
                reason: UnresolvedReason::Stale,
            });
            continue;
        }
        if let Some(previous) = by_target.shift_remove(&edit.target) {
            tracing::warn!(
                target_range = ?previous.target.range(),
                "two edits target the same node, keeping the later one"
            );
            unresolved.push(UnresolvedEdit {
                target: previous.target,
                reason: UnresolvedReason::Superseded,
            });
        }
        by_target.insert(edit.target, edit);
    }

    // Outer targets win over targets nested in or overlapping them
    let mut accepted: Vec<EditDescriptor> = Vec::with_capacity(by_target.len());
    let mut ordered: Vec<EditDescriptor> = by_target.into_values().collect();
    ordered.sort_by_key(|edit| {
        let range = edit.target.range();
        (range.start(), std::cmp::Reverse(range.end()))
    });
    for edit in ordered {
        let range = edit.target.range();
        let overlaps = accepted
            .last()
            .is_some_and(|kept| kept.target.range().end() > range.start());
        if overlaps {
            unresolved.push(UnresolvedEdit {
                target: edit.target,
                reason: UnresolvedReason::Overlapped,
            });
        } else {
            accepted.push(edit);
        }
    }

    let replacements: FxHashMap<SyntaxNodePtr, &EditDescriptor> =
        accepted.iter().map(|edit| (edit.target, edit)).collect();
    let mut rebuild = Rebuild {
        replacements: &replacements,
        offset: TextSize::new(0),
        format_ranges: Vec::new(),
    };
    let green = rebuild.node(&tree);

    ApplyOutcome {
        green,
        applied: accepted.len(),
        unresolved,
        format_ranges: rebuild.format_ranges,
    }
}

/// Apply per-document batches in parallel. The result keeps input order.
pub fn apply_all(batches: Vec<FileEdits>) -> IndexMap<FileId, ApplyOutcome> {
    batches
        .into_par_iter()
        .map(|batch| {
            let outcome = apply(&batch.root, batch.edits);
            tracing::debug!(
                file = ?batch.file,
                applied = outcome.applied,
                unresolved = outcome.unresolved.len(),
                "applied edits"
            );
            (batch.file, outcome)
        })
        .collect::<Vec<_>>()
        .into_iter()
        .collect()
}

/// One pass over the tree, replacing targets and tracking the offset in the
/// new document.
struct Rebuild<'a> {
    replacements: &'a FxHashMap<SyntaxNodePtr, &'a EditDescriptor>,
    offset: TextSize,
    format_ranges: Vec<TextRange>,
}

impl Rebuild<'_> {
    fn node(&mut self, node: &SyntaxNode) -> GreenNode {
        let range = node.text_range();
        if let Some(edit) = self.replacements.get(&SyntaxNodePtr::new(node)) {
            let start = self.offset;
            self.format_ranges
                .extend(edit.format_ranges.iter().map(|r| *r + start));
            self.offset += edit.replacement.text_len();
            return edit.replacement.clone();
        }
        let touched = self
            .replacements
            .keys()
            .any(|ptr| range.contains_range(ptr.range()));
        if !touched {
            self.offset += range.len();
            return node.green().into_owned();
        }

        let mut children = Vec::new();
        for element in node.children_with_tokens() {
            match element {
                NodeOrToken::Node(child) => children.push(NodeOrToken::Node(self.node(&child))),
                NodeOrToken::Token(token) => {
                    self.offset += token.text_range().len();
                    children.push(green_of(&NodeOrToken::Token(token)));
                }
            }
        }
        GreenNode::new(node.kind().into(), children)
    }
}
