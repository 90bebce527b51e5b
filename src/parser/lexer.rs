//! Logos-based lexer for the C#-like source language
//!
//! Fast tokenization using the logos crate. Every byte of input ends up in
//! exactly one token; unknown input becomes an `ERROR` token.

use super::syntax_kind::SyntaxKind;
use logos::Logos;
use rowan::TextSize;

/// A token with its kind, text, and position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: SyntaxKind,
    pub text: &'a str,
    pub offset: TextSize,
}

/// Lexer wrapping the logos-generated tokenizer
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, LogosToken>,
    offset: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: LogosToken::lexer(input),
            offset: 0,
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let logos_token = self.inner.next()?;
        let text = self.inner.slice();
        let offset = TextSize::new(self.offset);
        self.offset += text.len() as u32;

        let kind = match logos_token {
            Ok(t) => t.into(),
            Err(()) => SyntaxKind::ERROR,
        };

        Some(Token { kind, text, offset })
    }
}

/// Tokenize an entire string into a Vec
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}

/// Logos token enum - maps to SyntaxKind
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
pub enum LogosToken {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,

    #[regex(r"//[^\n]*", allow_greedy = true)]
    LineComment,

    #[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
    BlockComment,

    // =========================================================================
    // LITERALS
    // =========================================================================
    #[regex(r"@?[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    #[regex(r"[0-9]+[uUlL]*")]
    #[regex(r"0[xX][0-9a-fA-F]+[uUlL]*")]
    Integer,

    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?[fFdDmM]?")]
    Real,

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    #[regex(r#"\$"([^"\\\n]|\\.)*""#)]
    #[regex(r#"@"([^"]|"")*""#)]
    String,

    #[regex(r"'([^'\\\n]|\\.)+'")]
    Char,

    // =========================================================================
    // KEYWORDS
    // =========================================================================
    #[token("using")]
    Using,
    #[token("namespace")]
    Namespace,
    #[token("class")]
    Class,
    #[token("struct")]
    Struct,
    #[token("interface")]
    Interface,
    #[token("record")]
    Record,
    #[token("public")]
    Public,
    #[token("private")]
    Private,
    #[token("protected")]
    Protected,
    #[token("internal")]
    Internal,
    #[token("static")]
    Static,
    #[token("abstract")]
    Abstract,
    #[token("virtual")]
    Virtual,
    #[token("override")]
    Override,
    #[token("sealed")]
    Sealed,
    #[token("partial")]
    Partial,
    #[token("readonly")]
    Readonly,
    #[token("async")]
    Async,
    #[token("extern")]
    Extern,
    #[token("new")]
    New,
    #[token("this")]
    This,
    #[token("base")]
    Base,
    #[token("return")]
    Return,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("for")]
    For,
    #[token("foreach")]
    Foreach,
    #[token("in")]
    In,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,
    #[token("ref")]
    Ref,
    #[token("out")]
    Out,
    #[token("params")]
    Params,
    #[token("void")]
    Void,
    #[token("var")]
    Var,

    #[token("bool")]
    #[token("byte")]
    #[token("sbyte")]
    #[token("char")]
    #[token("decimal")]
    #[token("double")]
    #[token("float")]
    #[token("int")]
    #[token("uint")]
    #[token("long")]
    #[token("ulong")]
    #[token("short")]
    #[token("ushort")]
    #[token("object")]
    #[token("string")]
    PredefinedType,

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("=")]
    Eq,
    #[token("==")]
    EqEq,
    #[token("!=")]
    BangEq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("=>")]
    FatArrow,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("!")]
    Bang,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("~")]
    Tilde,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("?")]
    Question,
    #[token("??")]
    QuestionQuestion,
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
}

impl From<LogosToken> for SyntaxKind {
    fn from(token: LogosToken) -> Self {
        match token {
            LogosToken::Whitespace => SyntaxKind::WHITESPACE,
            LogosToken::LineComment => SyntaxKind::LINE_COMMENT,
            LogosToken::BlockComment => SyntaxKind::BLOCK_COMMENT,
            LogosToken::Ident => SyntaxKind::IDENT,
            LogosToken::Integer => SyntaxKind::INTEGER,
            LogosToken::Real => SyntaxKind::REAL,
            LogosToken::String => SyntaxKind::STRING,
            LogosToken::Char => SyntaxKind::CHAR,

            LogosToken::Using => SyntaxKind::USING_KW,
            LogosToken::Namespace => SyntaxKind::NAMESPACE_KW,
            LogosToken::Class => SyntaxKind::CLASS_KW,
            LogosToken::Struct => SyntaxKind::STRUCT_KW,
            LogosToken::Interface => SyntaxKind::INTERFACE_KW,
            LogosToken::Record => SyntaxKind::RECORD_KW,
            LogosToken::Public => SyntaxKind::PUBLIC_KW,
            LogosToken::Private => SyntaxKind::PRIVATE_KW,
            LogosToken::Protected => SyntaxKind::PROTECTED_KW,
            LogosToken::Internal => SyntaxKind::INTERNAL_KW,
            LogosToken::Static => SyntaxKind::STATIC_KW,
            LogosToken::Abstract => SyntaxKind::ABSTRACT_KW,
            LogosToken::Virtual => SyntaxKind::VIRTUAL_KW,
            LogosToken::Override => SyntaxKind::OVERRIDE_KW,
            LogosToken::Sealed => SyntaxKind::SEALED_KW,
            LogosToken::Partial => SyntaxKind::PARTIAL_KW,
            LogosToken::Readonly => SyntaxKind::READONLY_KW,
            LogosToken::Async => SyntaxKind::ASYNC_KW,
            LogosToken::Extern => SyntaxKind::EXTERN_KW,
            LogosToken::New => SyntaxKind::NEW_KW,
            LogosToken::This => SyntaxKind::THIS_KW,
            LogosToken::Base => SyntaxKind::BASE_KW,
            LogosToken::Return => SyntaxKind::RETURN_KW,
            LogosToken::If => SyntaxKind::IF_KW,
            LogosToken::Else => SyntaxKind::ELSE_KW,
            LogosToken::While => SyntaxKind::WHILE_KW,
            LogosToken::For => SyntaxKind::FOR_KW,
            LogosToken::Foreach => SyntaxKind::FOREACH_KW,
            LogosToken::In => SyntaxKind::IN_KW,
            LogosToken::True => SyntaxKind::TRUE_KW,
            LogosToken::False => SyntaxKind::FALSE_KW,
            LogosToken::Null => SyntaxKind::NULL_KW,
            LogosToken::Ref => SyntaxKind::REF_KW,
            LogosToken::Out => SyntaxKind::OUT_KW,
            LogosToken::Params => SyntaxKind::PARAMS_KW,
            LogosToken::Void => SyntaxKind::VOID_KW,
            LogosToken::Var => SyntaxKind::VAR_KW,
            LogosToken::PredefinedType => SyntaxKind::PREDEFINED_TYPE,

            LogosToken::LBrace => SyntaxKind::L_BRACE,
            LogosToken::RBrace => SyntaxKind::R_BRACE,
            LogosToken::LBracket => SyntaxKind::L_BRACKET,
            LogosToken::RBracket => SyntaxKind::R_BRACKET,
            LogosToken::LParen => SyntaxKind::L_PAREN,
            LogosToken::RParen => SyntaxKind::R_PAREN,
            LogosToken::Semicolon => SyntaxKind::SEMICOLON,
            LogosToken::Colon => SyntaxKind::COLON,
            LogosToken::Comma => SyntaxKind::COMMA,
            LogosToken::Dot => SyntaxKind::DOT,
            LogosToken::Eq => SyntaxKind::EQ,
            LogosToken::EqEq => SyntaxKind::EQ_EQ,
            LogosToken::BangEq => SyntaxKind::BANG_EQ,
            LogosToken::Lt => SyntaxKind::LT,
            LogosToken::Gt => SyntaxKind::GT,
            LogosToken::LtEq => SyntaxKind::LT_EQ,
            LogosToken::GtEq => SyntaxKind::GT_EQ,
            LogosToken::FatArrow => SyntaxKind::FAT_ARROW,
            LogosToken::Plus => SyntaxKind::PLUS,
            LogosToken::Minus => SyntaxKind::MINUS,
            LogosToken::Star => SyntaxKind::STAR,
            LogosToken::Slash => SyntaxKind::SLASH,
            LogosToken::Percent => SyntaxKind::PERCENT,
            LogosToken::Bang => SyntaxKind::BANG,
            LogosToken::Amp => SyntaxKind::AMP,
            LogosToken::Pipe => SyntaxKind::PIPE,
            LogosToken::Caret => SyntaxKind::CARET,
            LogosToken::Tilde => SyntaxKind::TILDE,
            LogosToken::AmpAmp => SyntaxKind::AMP_AMP,
            LogosToken::PipePipe => SyntaxKind::PIPE_PIPE,
            LogosToken::Question => SyntaxKind::QUESTION,
            LogosToken::QuestionQuestion => SyntaxKind::QUESTION_QUESTION,
            LogosToken::PlusPlus => SyntaxKind::PLUS_PLUS,
            LogosToken::MinusMinus => SyntaxKind::MINUS_MINUS,
            LogosToken::PlusEq => SyntaxKind::PLUS_EQ,
            LogosToken::MinusEq => SyntaxKind::MINUS_EQ,
            LogosToken::StarEq => SyntaxKind::STAR_EQ,
            LogosToken::SlashEq => SyntaxKind::SLASH_EQ,
        }
    }
}
