//! Syntax kinds for the Rowan-based CST
//!
//! This enum defines all possible node and token kinds in the syntax tree
//! of the C#-like source language the analyzer runs on.

/// All syntax kinds (tokens and nodes)
///
/// Tokens are leaf nodes (identifiers, keywords, punctuation).
/// Nodes are composite (namespaces, type declarations, methods, expressions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // =========================================================================
    // TRIVIA (whitespace and comments - preserved but not semantically meaningful)
    // =========================================================================
    WHITESPACE = 0,
    LINE_COMMENT,
    BLOCK_COMMENT,

    // =========================================================================
    // LITERALS
    // =========================================================================
    IDENT,              // identifier or @verbatim
    INTEGER,            // 42
    REAL,               // 3.14
    STRING,             // "hello"
    CHAR,               // 'c'

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    L_BRACE,            // {
    R_BRACE,            // }
    L_BRACKET,          // [
    R_BRACKET,          // ]
    L_PAREN,            // (
    R_PAREN,            // )
    SEMICOLON,          // ;
    COLON,              // :
    COMMA,              // ,
    DOT,                // .
    EQ,                 // =
    EQ_EQ,              // ==
    BANG_EQ,            // !=
    LT,                 // <
    GT,                 // >
    LT_EQ,              // <=
    GT_EQ,              // >=
    FAT_ARROW,          // =>
    PLUS,               // +
    MINUS,              // -
    STAR,               // *
    SLASH,              // /
    PERCENT,            // %
    BANG,               // !
    AMP,                // &
    PIPE,               // |
    CARET,              // ^
    TILDE,              // ~
    AMP_AMP,            // &&
    PIPE_PIPE,          // ||
    QUESTION,           // ?
    QUESTION_QUESTION,  // ??
    PLUS_PLUS,          // ++
    MINUS_MINUS,        // --
    PLUS_EQ,            // +=
    MINUS_EQ,           // -=
    STAR_EQ,            // *=
    SLASH_EQ,           // /=

    // =========================================================================
    // KEYWORDS
    // =========================================================================
    USING_KW,
    NAMESPACE_KW,
    CLASS_KW,
    STRUCT_KW,
    INTERFACE_KW,
    RECORD_KW,
    PUBLIC_KW,
    PRIVATE_KW,
    PROTECTED_KW,
    INTERNAL_KW,
    STATIC_KW,
    ABSTRACT_KW,
    VIRTUAL_KW,
    OVERRIDE_KW,
    SEALED_KW,
    PARTIAL_KW,
    READONLY_KW,
    ASYNC_KW,
    EXTERN_KW,
    NEW_KW,
    THIS_KW,
    BASE_KW,
    RETURN_KW,
    IF_KW,
    ELSE_KW,
    WHILE_KW,
    FOR_KW,
    FOREACH_KW,
    IN_KW,
    TRUE_KW,
    FALSE_KW,
    NULL_KW,
    REF_KW,
    OUT_KW,
    PARAMS_KW,
    VOID_KW,
    VAR_KW,
    /// `int`, `string`, `bool`, `object`, ...
    PREDEFINED_TYPE,

    // =========================================================================
    // NODES
    // =========================================================================
    SOURCE_FILE,
    USING_DIRECTIVE,
    NAMESPACE_DECL,
    CLASS_DECL,
    STRUCT_DECL,
    INTERFACE_DECL,
    RECORD_DECL,
    ATTRIBUTE_LIST,
    TYPE_PARAM_LIST,
    BASE_LIST,
    MEMBER_LIST,
    METHOD_DECL,
    CONSTRUCTOR_DECL,
    FIELD_DECL,
    PROPERTY_DECL,
    ACCESSOR_LIST,
    ACCESSOR,
    PARAM_LIST,
    PARAM,
    NAME,
    QUALIFIED_NAME,
    TYPE_REF,
    TYPE_ARG_LIST,

    // Statements
    BLOCK,
    EXPR_BODY,
    LOCAL_DECL,
    EXPR_STMT,
    RETURN_STMT,
    IF_STMT,
    ELSE_CLAUSE,
    WHILE_STMT,
    FOR_STMT,
    FOREACH_STMT,
    EMPTY_STMT,

    // Expressions
    LITERAL,
    NAME_REF,
    THIS_EXPR,
    BASE_EXPR,
    MEMBER_ACCESS,
    CALL_EXPR,
    ARG_LIST,
    NEW_EXPR,
    INITIALIZER,
    PAREN_EXPR,
    CAST_EXPR,
    INDEX_EXPR,
    PREFIX_EXPR,
    POSTFIX_EXPR,
    BIN_EXPR,
    ASSIGN_EXPR,
    LAMBDA_EXPR,
    LAMBDA_PARAM_LIST,
    LAMBDA_PARAM,

    /// Error recovery node (and error token kind for unknown input)
    ERROR,
    __LAST,
}

impl SyntaxKind {
    /// Check if this is a trivia token (whitespace or comment)
    pub fn is_trivia(self) -> bool {
        matches!(self, Self::WHITESPACE | Self::LINE_COMMENT | Self::BLOCK_COMMENT)
    }

    /// Check if this is a keyword
    pub fn is_keyword(self) -> bool {
        (self as u16) >= (Self::USING_KW as u16) && (self as u16) <= (Self::PREDEFINED_TYPE as u16)
    }

    /// Check if this is a declaration modifier
    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            Self::PUBLIC_KW
                | Self::PRIVATE_KW
                | Self::PROTECTED_KW
                | Self::INTERNAL_KW
                | Self::STATIC_KW
                | Self::ABSTRACT_KW
                | Self::VIRTUAL_KW
                | Self::OVERRIDE_KW
                | Self::SEALED_KW
                | Self::PARTIAL_KW
                | Self::READONLY_KW
                | Self::ASYNC_KW
                | Self::EXTERN_KW
                | Self::NEW_KW
        )
    }

    /// Check if this keyword opens a type declaration
    pub fn is_type_keyword(self) -> bool {
        matches!(
            self,
            Self::CLASS_KW | Self::STRUCT_KW | Self::INTERFACE_KW | Self::RECORD_KW
        )
    }

    /// Check if this is a type declaration node
    pub fn is_type_decl(self) -> bool {
        matches!(
            self,
            Self::CLASS_DECL | Self::STRUCT_DECL | Self::INTERFACE_DECL | Self::RECORD_DECL
        )
    }

    /// Check if this is a literal
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            Self::INTEGER
                | Self::REAL
                | Self::STRING
                | Self::CHAR
                | Self::TRUE_KW
                | Self::FALSE_KW
                | Self::NULL_KW
        )
    }

    /// Binary operator precedence (higher binds tighter), `None` for non-operators
    pub fn binary_precedence(self) -> Option<u8> {
        let precedence = match self {
            Self::QUESTION_QUESTION => 1,
            Self::PIPE_PIPE => 2,
            Self::AMP_AMP => 3,
            Self::PIPE => 4,
            Self::CARET => 5,
            Self::AMP => 6,
            Self::EQ_EQ | Self::BANG_EQ => 7,
            Self::LT | Self::GT | Self::LT_EQ | Self::GT_EQ => 8,
            Self::PLUS | Self::MINUS => 9,
            Self::STAR | Self::SLASH | Self::PERCENT => 10,
            _ => return None,
        };
        Some(precedence)
    }

    /// Check if this is an assignment operator
    pub fn is_assignment(self) -> bool {
        matches!(
            self,
            Self::EQ | Self::PLUS_EQ | Self::MINUS_EQ | Self::STAR_EQ | Self::SLASH_EQ
        )
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

impl From<rowan::SyntaxKind> for SyntaxKind {
    fn from(raw: rowan::SyntaxKind) -> Self {
        assert!(raw.0 < SyntaxKind::__LAST as u16);
        // Safety: we control all syntax kinds and check bounds above
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }
}

/// Language definition for Rowan
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CSharpLanguage {}

impl rowan::Language for CSharpLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        raw.into()
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type aliases for convenience
pub type SyntaxNode = rowan::SyntaxNode<CSharpLanguage>;
pub type SyntaxToken = rowan::SyntaxToken<CSharpLanguage>;
pub type SyntaxElement = rowan::SyntaxElement<CSharpLanguage>;
