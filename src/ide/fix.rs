//! Fix synthesis.
//!
//! The fix for a finding adds a parameter of the interface type to the
//! method and appends a call of the member on that parameter to the body.
//! Synthesis is pure: it reads the method's syntax and produces a
//! replacement green node plus the bookkeeping the applier needs. Nothing is
//! written back here.

use std::ops::Range;

use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use thiserror::Error;

use crate::base::{FileId, TextRange, TextSize};
use crate::parser::{
    AstNode, Block, GreenNode, GreenToken, MethodDecl, Name, NameRef, NodeOrToken,
    SyntaxElement, SyntaxKind, SyntaxNode, SyntaxNodePtr, parse,
};

use super::config::RuleConfig;
use super::detector::Finding;
use super::rule::NAMESPACE_RULE;

type GreenElement = NodeOrToken<GreenNode, GreenToken>;

/// Why no fix could be produced.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FixError {
    #[error("method has no block body to insert into")]
    NoBody,

    #[error("method has no parameter list")]
    NoParamList,

    #[error("finding does not point at a method in the current document")]
    TargetNotFound,

    #[error("generated code did not parse: {0}")]
    Template(String),
}

/// The parameter a fix introduces.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewParameter {
    pub name: SmolStr,
    pub type_name: String,
}

/// A replacement of one method declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditDescriptor {
    /// The method being replaced
    pub target: SyntaxNodePtr,
    /// The method as it was when the edit was made; a target that no longer
    /// matches is stale.
    pub original: GreenNode,
    pub replacement: GreenNode,
    pub parameter: NewParameter,
    /// Text of the inserted statement
    pub statement: String,
    /// Inserted text to hand to a formatter, relative to the start of the
    /// replacement
    pub format_ranges: Vec<TextRange>,
}

/// A fix offered for one finding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodeAction {
    pub title: String,
    /// Actions with the same key can be applied together
    pub equivalence_key: String,
    pub file: FileId,
    pub edit: EditDescriptor,
}

impl CodeAction {
    pub fn for_finding(finding: &Finding, edit: EditDescriptor, config: &RuleConfig) -> Self {
        let title = NAMESPACE_RULE.fix.title(config);
        Self {
            equivalence_key: title.clone(),
            title,
            file: finding.file,
            edit,
        }
    }
}

/// Build the edit that makes `method` satisfy the convention.
pub fn synthesize(method: &MethodDecl, config: &RuleConfig) -> Result<EditDescriptor, FixError> {
    let block = method.body().ok_or(FixError::NoBody)?;
    let params = method.param_list().ok_or(FixError::NoParamList)?;

    let name = fresh_name(method, &config.parameter_name);
    let statement = format!("{name}.{}();", config.member_name);
    let (param_green, stmt_green) = template(&config.interface_name, &name, &statement)?;

    let method_start = method.syntax().text_range().start();

    // `(T x` or `, T x` after the last parameter
    let param_elements: Vec<SyntaxElement> = params.syntax().children_with_tokens().collect();
    let last_param = param_elements
        .iter()
        .rposition(|e| e.kind() == SyntaxKind::PARAM);
    let (position, inserted) = match last_param {
        Some(i) => (
            i + 1,
            vec![
                NodeOrToken::Token(GreenToken::new(SyntaxKind::COMMA.into(), ",")),
                NodeOrToken::Token(GreenToken::new(SyntaxKind::WHITESPACE.into(), " ")),
                NodeOrToken::Node(param_green),
            ],
        ),
        None => (
            after_token(&param_elements, SyntaxKind::L_PAREN),
            vec![NodeOrToken::Node(param_green)],
        ),
    };
    let param_added: TextSize = inserted.iter().map(element_len).sum();
    let (new_params, param_at) = splice(params.syntax(), position..position, inserted);
    let param_range = TextRange::at(
        params.syntax().text_range().start() - method_start + param_at,
        param_added,
    );

    let newline = if method.syntax().text().contains_char('\r') {
        "\r\n"
    } else {
        "\n"
    };
    let indent = statement_indent(method, &block);
    let stmt_len = stmt_green.text_len();
    let insertion = statement_insertion(&block, newline, &indent, stmt_green);
    let (new_block, stmt_at) = splice(block.syntax(), insertion.replaced, insertion.elements);
    // The block follows the parameter list, so it moved by the parameter text
    let stmt_range = TextRange::at(
        block.syntax().text_range().start() - method_start + param_added + stmt_at + insertion.lead,
        insertion.line_break + stmt_len,
    );

    let children: Vec<GreenElement> = method
        .syntax()
        .children_with_tokens()
        .map(|element| match &element {
            NodeOrToken::Node(node) if node == params.syntax() => {
                NodeOrToken::Node(new_params.clone())
            }
            NodeOrToken::Node(node) if node == block.syntax() => {
                NodeOrToken::Node(new_block.clone())
            }
            _ => green_of(&element),
        })
        .collect();
    let replacement = GreenNode::new(SyntaxKind::METHOD_DECL.into(), children);

    Ok(EditDescriptor {
        target: SyntaxNodePtr::new(method.syntax()),
        original: method.syntax().green().into_owned(),
        replacement,
        parameter: NewParameter {
            name,
            type_name: config.interface_name.clone(),
        },
        statement,
        format_ranges: vec![param_range, stmt_range],
    })
}

/// Where the new statement goes in a block, and what is spliced in.
struct StatementInsertion {
    /// Block children replaced by `elements`
    replaced: Range<usize>,
    elements: Vec<GreenElement>,
    /// Kept text at the start of `elements` before the inserted line break
    lead: TextSize,
    /// Length of the line break and indentation before the statement
    line_break: TextSize,
}

/// Put the statement on its own line after the last statement, or after
/// `{`. Trivia on the anchor's line stays with the anchor: the statement
/// goes after the first line break that follows it.
fn statement_insertion(
    block: &Block,
    newline: &str,
    indent: &str,
    statement: GreenNode,
) -> StatementInsertion {
    let elements: Vec<SyntaxElement> = block.syntax().children_with_tokens().collect();
    let anchor = match elements.iter().rposition(|e| e.as_node().is_some()) {
        Some(i) => i + 1,
        None => after_token(&elements, SyntaxKind::L_BRACE),
    };
    let line_end = elements[anchor..]
        .iter()
        .take_while(|e| e.kind().is_trivia())
        .enumerate()
        .find_map(|(offset, e)| {
            let token = e.as_token()?;
            (token.kind() == SyntaxKind::WHITESPACE && token.text().contains('\n'))
                .then(|| (anchor + offset, token.text().to_string()))
        });

    let whitespace = |text: &str| -> GreenElement {
        NodeOrToken::Token(GreenToken::new(SyntaxKind::WHITESPACE.into(), text))
    };
    let line_break = TextSize::of(newline) + TextSize::of(indent);
    match line_end {
        Some((i, text)) => {
            // Split the whitespace after its first line break
            let break_end = text.find('\n').map_or(text.len(), |at| at + 1);
            let break_start = if text[..break_end].ends_with("\r\n") {
                break_end - 2
            } else {
                break_end - 1
            };
            let (head, tail) = text.split_at(break_end);
            StatementInsertion {
                replaced: i..i + 1,
                elements: vec![
                    whitespace(&format!("{head}{indent}")),
                    NodeOrToken::Node(statement),
                    whitespace(&format!("{newline}{tail}")),
                ],
                lead: TextSize::of(&text[..break_start]),
                line_break: TextSize::of(&text[break_start..break_end]) + TextSize::of(indent),
            }
        }
        None => StatementInsertion {
            replaced: anchor..anchor,
            elements: vec![
                whitespace(&format!("{newline}{indent}")),
                NodeOrToken::Node(statement),
            ],
            lead: TextSize::new(0),
            line_break,
        },
    }
}

/// `base`, or `base` with the smallest numeric suffix that is neither
/// declared nor referenced in the method.
fn fresh_name(method: &MethodDecl, base: &str) -> SmolStr {
    let own_name = method.name();
    let declared = method
        .syntax()
        .descendants()
        .filter_map(Name::cast)
        .filter(|name| Some(name) != own_name.as_ref())
        .filter_map(|name| name.text());
    // Fields and properties used by the body would be shadowed
    let referenced = method
        .syntax()
        .descendants()
        .filter_map(NameRef::cast)
        .filter_map(|name| name.text());
    let taken: FxHashSet<SmolStr> = declared.chain(referenced).collect();
    if !taken.contains(base) {
        return SmolStr::new(base);
    }
    (1u32..)
        .map(|i| SmolStr::new(format!("{base}{i}")))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| SmolStr::new(base))
}

/// Indentation for a new statement: that of the first statement, else one
/// level deeper than the method.
fn statement_indent(method: &MethodDecl, block: &Block) -> String {
    if let Some(indent) = block.statements().next().and_then(|s| line_indent(&s)) {
        return indent;
    }
    let base = line_indent(method.syntax()).unwrap_or_default();
    format!("{base}    ")
}

/// Whitespace between the last line break before `node` and `node` itself.
fn line_indent(node: &SyntaxNode) -> Option<String> {
    let ws = node.first_token()?.prev_token()?;
    if ws.kind() != SyntaxKind::WHITESPACE {
        return None;
    }
    let (_, indent) = ws.text().rsplit_once('\n')?;
    Some(indent.to_string())
}

/// Parse the generated parameter and statement in a throwaway method so
/// they get exactly the shape the parser gives them.
fn template(type_name: &str, name: &str, statement: &str) -> Result<(GreenNode, GreenNode), FixError> {
    let text = format!("class T {{ void M({type_name} {name}) {{ {statement} }} }}");
    let parsed = parse(&text);
    if !parsed.ok() {
        return Err(FixError::Template(text));
    }
    let root = parsed.syntax();
    let find = |kind: SyntaxKind| {
        root.descendants()
            .find(|n| n.kind() == kind)
            .map(|n| n.green().into_owned())
    };
    match (find(SyntaxKind::PARAM), find(SyntaxKind::EXPR_STMT)) {
        (Some(param), Some(stmt)) => Ok((param, stmt)),
        _ => Err(FixError::Template(text)),
    }
}

fn after_token(elements: &[SyntaxElement], kind: SyntaxKind) -> usize {
    elements
        .iter()
        .position(|e| e.kind() == kind)
        .map_or(0, |i| i + 1)
}

/// Rebuild `node` with the children in `replaced` swapped for `inserted`.
/// Also returns where the change starts, relative to the node.
fn splice(
    node: &SyntaxNode,
    replaced: Range<usize>,
    inserted: Vec<GreenElement>,
) -> (GreenNode, TextSize) {
    let mut children: Vec<GreenElement> = node
        .children_with_tokens()
        .map(|element| green_of(&element))
        .collect();
    let at = children[..replaced.start].iter().map(element_len).sum();
    children.splice(replaced, inserted);
    (GreenNode::new(node.kind().into(), children), at)
}

pub(crate) fn green_of(element: &SyntaxElement) -> GreenElement {
    match element {
        NodeOrToken::Node(node) => NodeOrToken::Node(node.green().into_owned()),
        NodeOrToken::Token(token) => NodeOrToken::Token(token.green().to_owned()),
    }
}

fn element_len(element: &GreenElement) -> TextSize {
    match element {
        NodeOrToken::Node(node) => node.text_len(),
        NodeOrToken::Token(token) => token.text_len(),
    }
}
