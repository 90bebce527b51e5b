//! Recursive descent parser for the C#-like source language
//!
//! Builds a rowan GreenNode tree from tokens.
//! Supports error recovery and produces a lossless CST.
//!
//! Trivia is attached lazily: it is only bumped right before the next
//! significant token (or before a node is started), so nodes never end with
//! trailing whitespace or comments. A comment at the end of a block therefore
//! belongs to the block, not to the last statement in it.

use super::ast::{AstNode, SourceFile};
use super::lexer::{Lexer, Token};
use super::syntax_kind::SyntaxKind;
use rowan::{Checkpoint, GreenNode, GreenNodeBuilder, TextRange, TextSize};

/// Parse result containing the green tree and any errors
#[derive(Debug, Clone)]
pub struct Parse {
    pub green: GreenNode,
    pub errors: Vec<SyntaxError>,
}

impl Parse {
    /// Get the root syntax node
    pub fn syntax(&self) -> super::SyntaxNode {
        super::SyntaxNode::new_root(self.green.clone())
    }

    /// Get the typed root
    pub fn source_file(&self) -> SourceFile {
        SourceFile::cast(self.syntax()).expect("parser always produces a SOURCE_FILE root")
    }

    /// Check if parsing succeeded without errors
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A syntax error with location and message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub range: TextRange,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, range: TextRange) -> Self {
        Self {
            message: message.into(),
            range,
        }
    }
}

/// Parse source code into a CST
pub fn parse(input: &str) -> Parse {
    let tokens: Vec<_> = Lexer::new(input).collect();
    let mut parser = Parser::new(&tokens);
    parser.parse_source_file();
    parser.finish()
}

/// The parser state
struct Parser<'a> {
    tokens: &'a [Token<'a>],
    pos: usize,
    builder: GreenNodeBuilder<'static>,
    errors: Vec<SyntaxError>,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token<'a>]) -> Self {
        Self {
            tokens,
            pos: 0,
            builder: GreenNodeBuilder::new(),
            errors: Vec::new(),
        }
    }

    fn finish(self) -> Parse {
        Parse {
            green: self.builder.finish(),
            errors: self.errors,
        }
    }

    // =========================================================================
    // Token inspection (all lookahead skips trivia)
    // =========================================================================

    /// Raw index of the n-th significant token from the cursor
    fn nth_index(&self, n: usize) -> Option<usize> {
        let mut count = 0;
        let mut idx = self.pos;
        while idx < self.tokens.len() {
            if !self.tokens[idx].kind.is_trivia() {
                if count == n {
                    return Some(idx);
                }
                count += 1;
            }
            idx += 1;
        }
        None
    }

    fn nth(&self, n: usize) -> SyntaxKind {
        self.nth_index(n)
            .map(|idx| self.tokens[idx].kind)
            .unwrap_or(SyntaxKind::ERROR)
    }

    fn nth_text(&self, n: usize) -> &str {
        self.nth_index(n).map(|idx| self.tokens[idx].text).unwrap_or("")
    }

    fn peek(&self) -> SyntaxKind {
        self.nth(0)
    }

    fn at(&self, kind: SyntaxKind) -> bool {
        !self.at_eof() && self.peek() == kind
    }

    fn at_any(&self, kinds: &[SyntaxKind]) -> bool {
        !self.at_eof() && kinds.contains(&self.peek())
    }

    fn at_eof(&self) -> bool {
        self.nth_index(0).is_none()
    }

    fn at_contextual(&self, text: &str) -> bool {
        self.at(SyntaxKind::IDENT) && self.nth_text(0) == text
    }

    // =========================================================================
    // Token consumption
    // =========================================================================

    /// Bump the next significant token, attaching any trivia before it
    fn bump(&mut self) {
        self.skip_trivia();
        if let Some(token) = self.tokens.get(self.pos) {
            self.builder.token(token.kind.into(), token.text);
            self.pos += 1;
        }
    }

    fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: SyntaxKind) -> bool {
        if self.eat(kind) {
            true
        } else {
            self.error(format!("expected {:?}", kind));
            false
        }
    }

    fn skip_trivia(&mut self) {
        while let Some(token) = self.tokens.get(self.pos) {
            if !token.kind.is_trivia() {
                break;
            }
            self.builder.token(token.kind.into(), token.text);
            self.pos += 1;
        }
    }

    // =========================================================================
    // Error handling
    // =========================================================================

    fn error(&mut self, message: impl Into<String>) {
        let range = match self.nth_index(0) {
            Some(idx) => {
                let token = &self.tokens[idx];
                TextRange::at(token.offset, TextSize::of(token.text))
            }
            None => {
                let end = self
                    .tokens
                    .last()
                    .map(|t| t.offset + TextSize::of(t.text))
                    .unwrap_or_default();
                TextRange::empty(end)
            }
        };
        self.errors.push(SyntaxError::new(message, range));
    }

    fn error_recover(&mut self, message: impl Into<String>, recovery: &[SyntaxKind]) {
        self.error(message);
        self.skip_trivia();
        self.builder.start_node(SyntaxKind::ERROR.into());
        // Always consume at least one token to make progress
        let mut consumed = false;
        while !self.at_eof() && !self.at_any(recovery) {
            self.bump();
            consumed = true;
        }
        if !consumed && !self.at_eof() {
            self.bump();
        }
        self.builder.finish_node();
    }

    // =========================================================================
    // Node building helpers
    // =========================================================================

    /// Start a node; leading trivia stays in the parent
    fn start_node(&mut self, kind: SyntaxKind) {
        self.skip_trivia();
        self.builder.start_node(kind.into());
    }

    fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    /// Checkpoint positioned after any pending trivia
    fn checkpoint(&mut self) -> Checkpoint {
        self.skip_trivia();
        self.builder.checkpoint()
    }

    fn start_node_at(&mut self, checkpoint: Checkpoint, kind: SyntaxKind) {
        self.builder.start_node_at(checkpoint, kind.into());
    }

    // =========================================================================
    // Speculative scanning
    // =========================================================================

    /// Scan a type starting at significant offset `n`, returning the offset after it
    fn scan_type(&self, mut n: usize) -> Option<usize> {
        match self.nth(n) {
            SyntaxKind::PREDEFINED_TYPE | SyntaxKind::VAR_KW | SyntaxKind::VOID_KW => n += 1,
            SyntaxKind::IDENT => {
                n += 1;
                loop {
                    if self.nth(n) == SyntaxKind::LT {
                        n = self.scan_type_args(n)?;
                    }
                    if self.nth(n) == SyntaxKind::DOT && self.nth(n + 1) == SyntaxKind::IDENT {
                        n += 2;
                        continue;
                    }
                    break;
                }
            }
            _ => return None,
        }
        if self.nth(n) == SyntaxKind::QUESTION {
            n += 1;
        }
        while self.nth(n) == SyntaxKind::L_BRACKET {
            n += 1;
            while self.nth(n) == SyntaxKind::COMMA {
                n += 1;
            }
            if self.nth(n) != SyntaxKind::R_BRACKET {
                return None;
            }
            n += 1;
        }
        Some(n)
    }

    fn scan_type_args(&self, mut n: usize) -> Option<usize> {
        debug_assert_eq!(self.nth(n), SyntaxKind::LT);
        n += 1;
        loop {
            n = self.scan_type(n)?;
            match self.nth(n) {
                SyntaxKind::COMMA => n += 1,
                SyntaxKind::GT => return Some(n + 1),
                _ => return None,
            }
        }
    }

    /// `T x =`, `T x;`, `T x,` or `var x ...`
    fn at_local_decl(&self) -> bool {
        match self.scan_type(0) {
            Some(end) => {
                self.nth(end) == SyntaxKind::IDENT
                    && matches!(
                        self.nth(end + 1),
                        SyntaxKind::EQ | SyntaxKind::SEMICOLON | SyntaxKind::COMMA
                    )
            }
            None => false,
        }
    }

    fn at_lambda(&self) -> bool {
        let start = usize::from(self.peek() == SyntaxKind::ASYNC_KW);
        match self.nth(start) {
            SyntaxKind::IDENT => self.nth(start + 1) == SyntaxKind::FAT_ARROW,
            SyntaxKind::L_PAREN => {
                let mut depth = 0usize;
                let mut n = start;
                loop {
                    match self.nth(n) {
                        SyntaxKind::L_PAREN => depth += 1,
                        SyntaxKind::R_PAREN => {
                            depth -= 1;
                            if depth == 0 {
                                return self.nth(n + 1) == SyntaxKind::FAT_ARROW;
                            }
                        }
                        SyntaxKind::SEMICOLON | SyntaxKind::L_BRACE | SyntaxKind::R_BRACE => {
                            return false;
                        }
                        _ if self.nth_index(n).is_none() => return false,
                        _ => {}
                    }
                    n += 1;
                }
            }
            _ => false,
        }
    }

    fn at_cast(&self) -> bool {
        if self.peek() != SyntaxKind::L_PAREN {
            return false;
        }
        match self.scan_type(1) {
            Some(end) if self.nth(end) == SyntaxKind::R_PAREN => {
                let next = self.nth(end + 1);
                matches!(
                    next,
                    SyntaxKind::IDENT
                        | SyntaxKind::THIS_KW
                        | SyntaxKind::BASE_KW
                        | SyntaxKind::NEW_KW
                        | SyntaxKind::L_PAREN
                ) || next.is_literal()
            }
            _ => false,
        }
    }

    fn at_expr_start(&self) -> bool {
        let kind = self.peek();
        !self.at_eof()
            && (kind.is_literal()
                || matches!(
                    kind,
                    SyntaxKind::IDENT
                        | SyntaxKind::THIS_KW
                        | SyntaxKind::BASE_KW
                        | SyntaxKind::NEW_KW
                        | SyntaxKind::L_PAREN
                        | SyntaxKind::PREDEFINED_TYPE
                        | SyntaxKind::ASYNC_KW
                        | SyntaxKind::MINUS
                        | SyntaxKind::PLUS
                        | SyntaxKind::BANG
                        | SyntaxKind::TILDE
                        | SyntaxKind::PLUS_PLUS
                        | SyntaxKind::MINUS_MINUS
                ))
    }

    // =========================================================================
    // Grammar rules: declarations
    // =========================================================================

    /// SourceFile = (UsingDirective | NamespaceDecl | Member)*
    fn parse_source_file(&mut self) {
        self.builder.start_node(SyntaxKind::SOURCE_FILE.into());
        self.parse_namespace_items(false);
        self.skip_trivia();
        self.finish_node();
    }

    /// Items of a namespace body (or the file). Stops at `}` when braced.
    fn parse_namespace_items(&mut self, braced: bool) {
        while !self.at_eof() {
            if braced && self.at(SyntaxKind::R_BRACE) {
                break;
            }
            let pos_before = self.pos;
            match self.peek() {
                SyntaxKind::USING_KW => self.parse_using(),
                SyntaxKind::NAMESPACE_KW => self.parse_namespace(),
                SyntaxKind::R_BRACE => {
                    self.error_recover(
                        "unexpected '}'",
                        &[
                            SyntaxKind::NAMESPACE_KW,
                            SyntaxKind::USING_KW,
                            SyntaxKind::CLASS_KW,
                            SyntaxKind::STRUCT_KW,
                            SyntaxKind::INTERFACE_KW,
                            SyntaxKind::PUBLIC_KW,
                            SyntaxKind::INTERNAL_KW,
                        ],
                    );
                }
                _ => self.parse_member(),
            }
            // Safety: if we didn't make progress, force-skip a token
            if self.pos == pos_before && !self.at_eof() {
                self.error(format!("stuck on token: {:?}", self.peek()));
                self.bump();
            }
        }
    }

    /// UsingDirective = 'using' 'static'? (Name '=')? QualifiedName ';'
    fn parse_using(&mut self) {
        self.start_node(SyntaxKind::USING_DIRECTIVE);
        self.bump();
        self.eat(SyntaxKind::STATIC_KW);
        if self.at(SyntaxKind::IDENT) && self.nth(1) == SyntaxKind::EQ {
            self.parse_name();
            self.bump();
        }
        self.parse_qualified_name();
        self.expect(SyntaxKind::SEMICOLON);
        self.finish_node();
    }

    /// NamespaceDecl = 'namespace' QualifiedName ('{' Items '}' | ';' Items)
    fn parse_namespace(&mut self) {
        self.start_node(SyntaxKind::NAMESPACE_DECL);
        self.bump();
        self.parse_qualified_name();
        if self.eat(SyntaxKind::SEMICOLON) {
            // File-scoped: the namespace owns everything that follows
            self.parse_namespace_items(false);
        } else if self.expect(SyntaxKind::L_BRACE) {
            self.parse_namespace_items(true);
            self.expect(SyntaxKind::R_BRACE);
        }
        self.finish_node();
    }

    /// QualifiedName = Ident ('.' Ident)*
    fn parse_qualified_name(&mut self) {
        self.start_node(SyntaxKind::QUALIFIED_NAME);
        self.expect(SyntaxKind::IDENT);
        while self.at(SyntaxKind::DOT) && self.nth(1) == SyntaxKind::IDENT {
            self.bump();
            self.bump();
        }
        self.finish_node();
    }

    /// Name = Ident
    fn parse_name(&mut self) {
        if self.at(SyntaxKind::IDENT) {
            self.start_node(SyntaxKind::NAME);
            self.bump();
            self.finish_node();
        } else {
            self.error("expected identifier");
        }
    }

    /// AttributeList = '[' ... ']' (contents are kept as tokens)
    fn parse_attribute_list(&mut self) {
        self.start_node(SyntaxKind::ATTRIBUTE_LIST);
        self.bump();
        let mut depth = 1usize;
        while !self.at_eof() {
            match self.peek() {
                SyntaxKind::L_BRACKET => depth += 1,
                SyntaxKind::R_BRACKET => {
                    depth -= 1;
                    if depth == 0 {
                        self.bump();
                        break;
                    }
                }
                _ => {}
            }
            self.bump();
        }
        self.finish_node();
    }

    /// Member = Attributes Modifiers (TypeDecl | Constructor | Method | Property | Field)
    fn parse_member(&mut self) {
        let checkpoint = self.checkpoint();
        while self.at(SyntaxKind::L_BRACKET) {
            self.parse_attribute_list();
        }
        while self.peek().is_modifier() && !self.at_eof() {
            self.bump();
        }

        let kind = self.peek();
        if kind.is_type_keyword() {
            self.parse_type_decl(checkpoint);
            return;
        }

        if kind == SyntaxKind::IDENT && self.nth(1) == SyntaxKind::L_PAREN {
            self.parse_constructor(checkpoint);
            return;
        }

        if self.scan_type(0).is_none() {
            self.start_node_at(checkpoint, SyntaxKind::ERROR);
            self.error("expected member declaration");
            while !self.at_eof() && !self.at_any(&[SyntaxKind::SEMICOLON, SyntaxKind::R_BRACE]) {
                self.bump();
            }
            self.eat(SyntaxKind::SEMICOLON);
            self.finish_node();
            return;
        }

        self.parse_type_ref();
        let node_kind = match (self.peek(), self.nth(1)) {
            (SyntaxKind::IDENT, SyntaxKind::L_PAREN | SyntaxKind::LT) => SyntaxKind::METHOD_DECL,
            (SyntaxKind::IDENT, SyntaxKind::L_BRACE | SyntaxKind::FAT_ARROW) => {
                SyntaxKind::PROPERTY_DECL
            }
            (SyntaxKind::IDENT, _) => SyntaxKind::FIELD_DECL,
            _ => SyntaxKind::ERROR,
        };
        self.start_node_at(checkpoint, node_kind);
        match node_kind {
            SyntaxKind::METHOD_DECL => {
                self.parse_name();
                if self.at(SyntaxKind::LT) {
                    self.parse_type_param_list();
                }
                self.parse_param_list();
                self.skip_constraint_clauses();
                self.parse_method_body();
            }
            SyntaxKind::PROPERTY_DECL => {
                self.parse_name();
                if self.at(SyntaxKind::L_BRACE) {
                    self.parse_accessor_list();
                    if self.eat(SyntaxKind::EQ) {
                        self.parse_expr();
                        self.expect(SyntaxKind::SEMICOLON);
                    }
                } else {
                    self.parse_expr_body();
                    self.expect(SyntaxKind::SEMICOLON);
                }
            }
            SyntaxKind::FIELD_DECL => {
                self.parse_name();
                if self.eat(SyntaxKind::EQ) {
                    self.parse_expr();
                }
                while self.eat(SyntaxKind::COMMA) {
                    self.parse_name();
                    if self.eat(SyntaxKind::EQ) {
                        self.parse_expr();
                    }
                }
                self.expect(SyntaxKind::SEMICOLON);
            }
            _ => {
                self.error("expected member name");
                while !self.at_eof()
                    && !self.at_any(&[SyntaxKind::SEMICOLON, SyntaxKind::R_BRACE])
                {
                    self.bump();
                }
                self.eat(SyntaxKind::SEMICOLON);
            }
        }
        self.finish_node();
    }

    /// TypeDecl = ('class' | 'struct' | 'interface' | 'record') Name TypeParams?
    ///            ParamList? BaseList? Constraints? (MemberList | ';')
    fn parse_type_decl(&mut self, checkpoint: Checkpoint) {
        let node_kind = match self.peek() {
            SyntaxKind::STRUCT_KW => SyntaxKind::STRUCT_DECL,
            SyntaxKind::INTERFACE_KW => SyntaxKind::INTERFACE_DECL,
            SyntaxKind::RECORD_KW => SyntaxKind::RECORD_DECL,
            _ => SyntaxKind::CLASS_DECL,
        };
        self.start_node_at(checkpoint, node_kind);
        self.bump();
        // `record class` / `record struct`
        if node_kind == SyntaxKind::RECORD_DECL {
            if !self.eat(SyntaxKind::CLASS_KW) {
                self.eat(SyntaxKind::STRUCT_KW);
            }
        }
        self.parse_name();
        if self.at(SyntaxKind::LT) {
            self.parse_type_param_list();
        }
        if self.at(SyntaxKind::L_PAREN) {
            self.parse_param_list();
        }
        if self.at(SyntaxKind::COLON) {
            self.parse_base_list();
        }
        self.skip_constraint_clauses();
        if self.at(SyntaxKind::L_BRACE) {
            self.parse_member_list();
            self.eat(SyntaxKind::SEMICOLON);
        } else {
            self.expect(SyntaxKind::SEMICOLON);
        }
        self.finish_node();
    }

    /// TypeParamList = '<' ('in' | 'out')? Ident (',' ...)* '>'
    fn parse_type_param_list(&mut self) {
        self.start_node(SyntaxKind::TYPE_PARAM_LIST);
        self.bump();
        loop {
            if !self.eat(SyntaxKind::IN_KW) {
                self.eat(SyntaxKind::OUT_KW);
            }
            self.parse_name();
            if !self.eat(SyntaxKind::COMMA) {
                break;
            }
        }
        self.expect(SyntaxKind::GT);
        self.finish_node();
    }

    /// BaseList = ':' TypeRef (',' TypeRef)*
    fn parse_base_list(&mut self) {
        self.start_node(SyntaxKind::BASE_LIST);
        self.bump();
        self.parse_type_ref();
        // record primary constructor forwarding: `: Base(x)`
        if self.at(SyntaxKind::L_PAREN) {
            self.parse_arg_list();
        }
        while self.eat(SyntaxKind::COMMA) {
            self.parse_type_ref();
        }
        self.finish_node();
    }

    /// Generic constraints are kept as tokens in the enclosing declaration
    fn skip_constraint_clauses(&mut self) {
        while self.at_contextual("where") {
            while !self.at_eof()
                && !self.at_any(&[
                    SyntaxKind::L_BRACE,
                    SyntaxKind::SEMICOLON,
                    SyntaxKind::FAT_ARROW,
                ])
            {
                self.bump();
            }
        }
    }

    /// MemberList = '{' Member* '}'
    fn parse_member_list(&mut self) {
        self.start_node(SyntaxKind::MEMBER_LIST);
        self.bump();
        while !self.at_eof() && !self.at(SyntaxKind::R_BRACE) {
            let pos_before = self.pos;
            self.parse_member();
            if self.pos == pos_before && !self.at_eof() {
                self.error(format!("stuck on token: {:?}", self.peek()));
                self.bump();
            }
        }
        self.expect(SyntaxKind::R_BRACE);
        self.finish_node();
    }

    /// Constructor = Name ParamList (':' ('base' | 'this') ArgList)? Body
    fn parse_constructor(&mut self, checkpoint: Checkpoint) {
        self.start_node_at(checkpoint, SyntaxKind::CONSTRUCTOR_DECL);
        self.parse_name();
        self.parse_param_list();
        if self.eat(SyntaxKind::COLON) {
            if !self.eat(SyntaxKind::BASE_KW) {
                self.expect(SyntaxKind::THIS_KW);
            }
            self.parse_arg_list();
        }
        self.parse_method_body();
        self.finish_node();
    }

    /// MethodBody = Block | ExprBody ';' | ';'
    fn parse_method_body(&mut self) {
        match self.peek() {
            SyntaxKind::L_BRACE if !self.at_eof() => self.parse_block(),
            SyntaxKind::FAT_ARROW if !self.at_eof() => {
                self.parse_expr_body();
                self.expect(SyntaxKind::SEMICOLON);
            }
            _ => {
                self.expect(SyntaxKind::SEMICOLON);
            }
        }
    }

    /// ExprBody = '=>' Expr
    fn parse_expr_body(&mut self) {
        self.start_node(SyntaxKind::EXPR_BODY);
        self.expect(SyntaxKind::FAT_ARROW);
        self.parse_expr();
        self.finish_node();
    }

    /// AccessorList = '{' (Attributes Modifiers Ident (Block | ExprBody ';' | ';'))* '}'
    fn parse_accessor_list(&mut self) {
        self.start_node(SyntaxKind::ACCESSOR_LIST);
        self.bump();
        while !self.at_eof() && !self.at(SyntaxKind::R_BRACE) {
            let pos_before = self.pos;
            self.start_node(SyntaxKind::ACCESSOR);
            while self.at(SyntaxKind::L_BRACKET) {
                self.parse_attribute_list();
            }
            while self.peek().is_modifier() && !self.at_eof() {
                self.bump();
            }
            self.expect(SyntaxKind::IDENT);
            self.parse_method_body();
            self.finish_node();
            if self.pos == pos_before && !self.at_eof() {
                self.error(format!("stuck on token: {:?}", self.peek()));
                self.bump();
            }
        }
        self.expect(SyntaxKind::R_BRACE);
        self.finish_node();
    }

    /// ParamList = '(' (Param (',' Param)*)? ')'
    fn parse_param_list(&mut self) {
        self.start_node(SyntaxKind::PARAM_LIST);
        self.expect(SyntaxKind::L_PAREN);
        if !self.at(SyntaxKind::R_PAREN) {
            loop {
                let pos_before = self.pos;
                self.parse_param();
                if self.pos == pos_before {
                    self.error_recover(
                        "expected parameter",
                        &[SyntaxKind::COMMA, SyntaxKind::R_PAREN, SyntaxKind::L_BRACE],
                    );
                }
                if !self.eat(SyntaxKind::COMMA) {
                    break;
                }
            }
        }
        self.expect(SyntaxKind::R_PAREN);
        self.finish_node();
    }

    /// Param = Attributes ('ref' | 'out' | 'in' | 'params' | 'this')* TypeRef Name ('=' Expr)?
    fn parse_param(&mut self) {
        if self.scan_type(0).is_none()
            && !self.at_any(&[
                SyntaxKind::L_BRACKET,
                SyntaxKind::REF_KW,
                SyntaxKind::OUT_KW,
                SyntaxKind::IN_KW,
                SyntaxKind::PARAMS_KW,
                SyntaxKind::THIS_KW,
            ])
        {
            return;
        }
        self.start_node(SyntaxKind::PARAM);
        while self.at(SyntaxKind::L_BRACKET) {
            self.parse_attribute_list();
        }
        while self.at_any(&[
            SyntaxKind::REF_KW,
            SyntaxKind::OUT_KW,
            SyntaxKind::IN_KW,
            SyntaxKind::PARAMS_KW,
            SyntaxKind::THIS_KW,
        ]) {
            self.bump();
        }
        self.parse_type_ref();
        self.parse_name();
        if self.eat(SyntaxKind::EQ) {
            self.parse_expr();
        }
        self.finish_node();
    }

    /// TypeRef = (PredefinedType | 'void' | 'var' | Ident TypeArgs? ('.' Ident TypeArgs?)*) '?'? ('[' ','* ']')*
    fn parse_type_ref(&mut self) {
        self.start_node(SyntaxKind::TYPE_REF);
        match self.peek() {
            SyntaxKind::PREDEFINED_TYPE | SyntaxKind::VOID_KW | SyntaxKind::VAR_KW
                if !self.at_eof() =>
            {
                self.bump();
            }
            SyntaxKind::IDENT if !self.at_eof() => {
                self.bump();
                loop {
                    if self.at(SyntaxKind::LT) && self.scan_type_args(0).is_some() {
                        self.parse_type_arg_list();
                    }
                    if self.at(SyntaxKind::DOT) && self.nth(1) == SyntaxKind::IDENT {
                        self.bump();
                        self.bump();
                        continue;
                    }
                    break;
                }
            }
            _ => self.error("expected type"),
        }
        if self.at(SyntaxKind::QUESTION)
            && matches!(
                self.nth(1),
                SyntaxKind::IDENT
                    | SyntaxKind::GT
                    | SyntaxKind::COMMA
                    | SyntaxKind::R_PAREN
                    | SyntaxKind::L_BRACKET
            )
        {
            self.bump();
        }
        while self.at(SyntaxKind::L_BRACKET)
            && matches!(self.nth(1), SyntaxKind::R_BRACKET | SyntaxKind::COMMA)
        {
            self.bump();
            while self.eat(SyntaxKind::COMMA) {}
            self.expect(SyntaxKind::R_BRACKET);
        }
        self.finish_node();
    }

    /// TypeArgList = '<' TypeRef (',' TypeRef)* '>'
    fn parse_type_arg_list(&mut self) {
        self.start_node(SyntaxKind::TYPE_ARG_LIST);
        self.bump();
        self.parse_type_ref();
        while self.eat(SyntaxKind::COMMA) {
            self.parse_type_ref();
        }
        self.expect(SyntaxKind::GT);
        self.finish_node();
    }

    // =========================================================================
    // Grammar rules: statements
    // =========================================================================

    /// Block = '{' Statement* '}'
    fn parse_block(&mut self) {
        self.start_node(SyntaxKind::BLOCK);
        self.expect(SyntaxKind::L_BRACE);
        while !self.at_eof() && !self.at(SyntaxKind::R_BRACE) {
            let pos_before = self.pos;
            self.parse_statement();
            if self.pos == pos_before && !self.at_eof() {
                self.error(format!("stuck on token: {:?}", self.peek()));
                self.bump();
            }
        }
        self.expect(SyntaxKind::R_BRACE);
        self.finish_node();
    }

    fn parse_statement(&mut self) {
        match self.peek() {
            SyntaxKind::L_BRACE => self.parse_block(),
            SyntaxKind::SEMICOLON => {
                self.start_node(SyntaxKind::EMPTY_STMT);
                self.bump();
                self.finish_node();
            }
            SyntaxKind::RETURN_KW => {
                self.start_node(SyntaxKind::RETURN_STMT);
                self.bump();
                if !self.at(SyntaxKind::SEMICOLON) {
                    self.parse_expr();
                }
                self.expect(SyntaxKind::SEMICOLON);
                self.finish_node();
            }
            SyntaxKind::IF_KW => self.parse_if(),
            SyntaxKind::WHILE_KW => {
                self.start_node(SyntaxKind::WHILE_STMT);
                self.bump();
                self.parse_condition();
                self.parse_statement();
                self.finish_node();
            }
            SyntaxKind::FOR_KW => self.parse_for(),
            SyntaxKind::FOREACH_KW => self.parse_foreach(),
            _ if self.at_local_decl() => {
                self.start_node(SyntaxKind::LOCAL_DECL);
                self.parse_local_declarators();
                self.expect(SyntaxKind::SEMICOLON);
                self.finish_node();
            }
            _ if self.at_expr_start() => {
                self.start_node(SyntaxKind::EXPR_STMT);
                self.parse_expr();
                self.expect(SyntaxKind::SEMICOLON);
                self.finish_node();
            }
            _ => {
                self.error_recover(
                    "expected statement",
                    &[SyntaxKind::SEMICOLON, SyntaxKind::R_BRACE],
                );
                self.eat(SyntaxKind::SEMICOLON);
            }
        }
    }

    /// `TypeRef Name ('=' Expr)? (',' Name ('=' Expr)?)*`, inside an open LOCAL_DECL
    fn parse_local_declarators(&mut self) {
        self.parse_type_ref();
        self.parse_name();
        if self.eat(SyntaxKind::EQ) {
            self.parse_expr();
        }
        while self.eat(SyntaxKind::COMMA) {
            self.parse_name();
            if self.eat(SyntaxKind::EQ) {
                self.parse_expr();
            }
        }
    }

    /// `'(' Expr ')'`
    fn parse_condition(&mut self) {
        self.expect(SyntaxKind::L_PAREN);
        self.parse_expr();
        self.expect(SyntaxKind::R_PAREN);
    }

    fn parse_if(&mut self) {
        self.start_node(SyntaxKind::IF_STMT);
        self.bump();
        self.parse_condition();
        self.parse_statement();
        if self.at(SyntaxKind::ELSE_KW) {
            self.start_node(SyntaxKind::ELSE_CLAUSE);
            self.bump();
            self.parse_statement();
            self.finish_node();
        }
        self.finish_node();
    }

    /// For = 'for' '(' (LocalDecl | Expr,*)? ';' Expr? ';' Expr,* ')' Statement
    fn parse_for(&mut self) {
        self.start_node(SyntaxKind::FOR_STMT);
        self.bump();
        self.expect(SyntaxKind::L_PAREN);
        if self.at_local_decl() {
            self.start_node(SyntaxKind::LOCAL_DECL);
            self.parse_local_declarators();
            self.finish_node();
        } else if !self.at(SyntaxKind::SEMICOLON) {
            self.parse_expr_list();
        }
        self.expect(SyntaxKind::SEMICOLON);
        if !self.at(SyntaxKind::SEMICOLON) {
            self.parse_expr();
        }
        self.expect(SyntaxKind::SEMICOLON);
        if !self.at(SyntaxKind::R_PAREN) {
            self.parse_expr_list();
        }
        self.expect(SyntaxKind::R_PAREN);
        self.parse_statement();
        self.finish_node();
    }

    /// Foreach = 'foreach' '(' TypeRef Name 'in' Expr ')' Statement
    fn parse_foreach(&mut self) {
        self.start_node(SyntaxKind::FOREACH_STMT);
        self.bump();
        self.expect(SyntaxKind::L_PAREN);
        self.parse_type_ref();
        self.parse_name();
        self.expect(SyntaxKind::IN_KW);
        self.parse_expr();
        self.expect(SyntaxKind::R_PAREN);
        self.parse_statement();
        self.finish_node();
    }

    fn parse_expr_list(&mut self) {
        self.parse_expr();
        while self.eat(SyntaxKind::COMMA) {
            self.parse_expr();
        }
    }

    // =========================================================================
    // Grammar rules: expressions
    // =========================================================================

    fn parse_expr(&mut self) {
        if !self.at_expr_start() {
            self.error("expected expression");
            return;
        }
        if self.at_lambda() {
            self.parse_lambda();
            return;
        }
        let checkpoint = self.checkpoint();
        self.parse_binary(0);
        if self.at(SyntaxKind::QUESTION) {
            // Conditional `a ? b : c`
            self.start_node_at(checkpoint, SyntaxKind::BIN_EXPR);
            self.bump();
            self.parse_expr();
            self.expect(SyntaxKind::COLON);
            self.parse_expr();
            self.finish_node();
        } else if self.peek().is_assignment() && !self.at_eof() {
            self.start_node_at(checkpoint, SyntaxKind::ASSIGN_EXPR);
            self.bump();
            self.parse_expr();
            self.finish_node();
        }
    }

    /// Precedence climbing over binary operators (left associative)
    fn parse_binary(&mut self, min_precedence: u8) {
        let checkpoint = self.checkpoint();
        self.parse_unary();
        loop {
            let precedence = match self.peek().binary_precedence() {
                Some(p) if p > min_precedence && !self.at_eof() => p,
                _ => break,
            };
            self.start_node_at(checkpoint, SyntaxKind::BIN_EXPR);
            self.bump();
            self.parse_binary(precedence);
            self.finish_node();
        }
    }

    fn parse_unary(&mut self) {
        if self.at_any(&[
            SyntaxKind::MINUS,
            SyntaxKind::PLUS,
            SyntaxKind::BANG,
            SyntaxKind::TILDE,
            SyntaxKind::PLUS_PLUS,
            SyntaxKind::MINUS_MINUS,
        ]) {
            self.start_node(SyntaxKind::PREFIX_EXPR);
            self.bump();
            self.parse_unary();
            self.finish_node();
        } else if self.at_cast() {
            self.start_node(SyntaxKind::CAST_EXPR);
            self.bump();
            self.parse_type_ref();
            self.expect(SyntaxKind::R_PAREN);
            self.parse_unary();
            self.finish_node();
        } else {
            self.parse_postfix();
        }
    }

    fn parse_postfix(&mut self) {
        let checkpoint = self.checkpoint();
        if !self.parse_primary() {
            return;
        }
        loop {
            match self.peek() {
                _ if self.at_eof() => break,
                SyntaxKind::DOT => {
                    self.start_node_at(checkpoint, SyntaxKind::MEMBER_ACCESS);
                    self.bump();
                    self.parse_name_ref();
                    self.finish_node();
                }
                SyntaxKind::QUESTION if self.nth(1) == SyntaxKind::DOT => {
                    self.start_node_at(checkpoint, SyntaxKind::MEMBER_ACCESS);
                    self.bump();
                    self.bump();
                    self.parse_name_ref();
                    self.finish_node();
                }
                SyntaxKind::L_PAREN => {
                    self.start_node_at(checkpoint, SyntaxKind::CALL_EXPR);
                    self.parse_arg_list();
                    self.finish_node();
                }
                SyntaxKind::L_BRACKET => {
                    self.start_node_at(checkpoint, SyntaxKind::INDEX_EXPR);
                    self.bump();
                    self.parse_expr_list();
                    self.expect(SyntaxKind::R_BRACKET);
                    self.finish_node();
                }
                SyntaxKind::PLUS_PLUS | SyntaxKind::MINUS_MINUS | SyntaxKind::BANG => {
                    self.start_node_at(checkpoint, SyntaxKind::POSTFIX_EXPR);
                    self.bump();
                    self.finish_node();
                }
                _ => break,
            }
        }
    }

    fn parse_name_ref(&mut self) {
        if self.at(SyntaxKind::IDENT) {
            self.start_node(SyntaxKind::NAME_REF);
            self.bump();
            self.finish_node();
        } else {
            self.error("expected member name");
        }
    }

    /// Returns false when no primary expression could be parsed
    fn parse_primary(&mut self) -> bool {
        let kind = self.peek();
        if self.at_eof() {
            self.error("expected expression");
            return false;
        }
        match kind {
            SyntaxKind::IDENT | SyntaxKind::PREDEFINED_TYPE => {
                self.start_node(SyntaxKind::NAME_REF);
                self.bump();
                self.finish_node();
            }
            SyntaxKind::THIS_KW => {
                self.start_node(SyntaxKind::THIS_EXPR);
                self.bump();
                self.finish_node();
            }
            SyntaxKind::BASE_KW => {
                self.start_node(SyntaxKind::BASE_EXPR);
                self.bump();
                self.finish_node();
            }
            SyntaxKind::NEW_KW => self.parse_new(),
            SyntaxKind::L_PAREN => {
                self.start_node(SyntaxKind::PAREN_EXPR);
                self.bump();
                self.parse_expr();
                self.expect(SyntaxKind::R_PAREN);
                self.finish_node();
            }
            _ if kind.is_literal() => {
                self.start_node(SyntaxKind::LITERAL);
                self.bump();
                self.finish_node();
            }
            _ => {
                self.error("expected expression");
                return false;
            }
        }
        true
    }

    /// New = 'new' (TypeRef ArgList? Initializer? | ArgList)
    fn parse_new(&mut self) {
        self.start_node(SyntaxKind::NEW_EXPR);
        self.bump();
        if self.at(SyntaxKind::L_PAREN) {
            self.parse_arg_list();
        } else {
            self.parse_type_ref();
            if self.at(SyntaxKind::L_PAREN) {
                self.parse_arg_list();
            }
        }
        if self.at(SyntaxKind::L_BRACE) {
            self.start_node(SyntaxKind::INITIALIZER);
            self.bump();
            while !self.at_eof() && !self.at(SyntaxKind::R_BRACE) {
                let pos_before = self.pos;
                self.parse_expr();
                if self.pos == pos_before || !self.eat(SyntaxKind::COMMA) {
                    break;
                }
            }
            self.expect(SyntaxKind::R_BRACE);
            self.finish_node();
        }
        self.finish_node();
    }

    /// ArgList = '(' (Arg (',' Arg)*)? ')'
    fn parse_arg_list(&mut self) {
        self.start_node(SyntaxKind::ARG_LIST);
        self.expect(SyntaxKind::L_PAREN);
        if !self.at(SyntaxKind::R_PAREN) {
            loop {
                let pos_before = self.pos;
                self.parse_arg();
                if self.pos == pos_before {
                    self.error_recover(
                        "expected argument",
                        &[SyntaxKind::COMMA, SyntaxKind::R_PAREN, SyntaxKind::SEMICOLON],
                    );
                }
                if !self.eat(SyntaxKind::COMMA) {
                    break;
                }
            }
        }
        self.expect(SyntaxKind::R_PAREN);
        self.finish_node();
    }

    /// Arg = (Ident ':')? ('ref' | 'out' | 'in')? (TypeRef Name | Expr)
    fn parse_arg(&mut self) {
        if self.at(SyntaxKind::IDENT) && self.nth(1) == SyntaxKind::COLON {
            self.bump();
            self.bump();
        }
        if self.at_any(&[SyntaxKind::REF_KW, SyntaxKind::OUT_KW, SyntaxKind::IN_KW]) {
            let is_out = self.at(SyntaxKind::OUT_KW);
            self.bump();
            // `out var x` / `out T x` declares a local
            if is_out {
                if let Some(end) = self.scan_type(0) {
                    if self.nth(end) == SyntaxKind::IDENT {
                        self.start_node(SyntaxKind::LOCAL_DECL);
                        self.parse_type_ref();
                        self.parse_name();
                        self.finish_node();
                        return;
                    }
                }
            }
        }
        self.parse_expr();
    }

    /// Lambda = 'async'? (Ident | '(' LambdaParam,* ')') '=>' (Block | Expr)
    fn parse_lambda(&mut self) {
        self.start_node(SyntaxKind::LAMBDA_EXPR);
        self.eat(SyntaxKind::ASYNC_KW);
        self.start_node(SyntaxKind::LAMBDA_PARAM_LIST);
        if self.at(SyntaxKind::IDENT) {
            self.start_node(SyntaxKind::LAMBDA_PARAM);
            self.parse_name();
            self.finish_node();
        } else {
            self.expect(SyntaxKind::L_PAREN);
            while !self.at_eof() && !self.at(SyntaxKind::R_PAREN) {
                let pos_before = self.pos;
                self.start_node(SyntaxKind::LAMBDA_PARAM);
                let typed = self
                    .scan_type(0)
                    .map(|end| self.nth(end) == SyntaxKind::IDENT)
                    .unwrap_or(false);
                if typed {
                    self.parse_type_ref();
                }
                self.parse_name();
                self.finish_node();
                if !self.eat(SyntaxKind::COMMA) {
                    if self.pos == pos_before {
                        self.error_recover("expected lambda parameter", &[SyntaxKind::R_PAREN]);
                    }
                    break;
                }
            }
            self.expect(SyntaxKind::R_PAREN);
        }
        self.finish_node();
        self.expect(SyntaxKind::FAT_ARROW);
        if self.at(SyntaxKind::L_BRACE) {
            self.parse_block();
        } else {
            self.parse_expr();
        }
        self.finish_node();
    }
}
