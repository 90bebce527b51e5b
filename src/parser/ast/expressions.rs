use smol_str::SmolStr;

use super::*;

// ============================================================================
// Expression enum
// ============================================================================

/// Any expression node
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Literal(SyntaxNode),
    NameRef(NameRef),
    This(SyntaxNode),
    Base(SyntaxNode),
    MemberAccess(MemberAccess),
    Call(CallExpr),
    New(NewExpr),
    Paren(ParenExpr),
    Cast(CastExpr),
    Lambda(LambdaExpr),
    /// Operators, indexing and assignments: nothing is inferred through them
    Other(SyntaxNode),
}

impl AstNode for Expr {
    fn can_cast(kind: SyntaxKind) -> bool {
        matches!(
            kind,
            SyntaxKind::LITERAL
                | SyntaxKind::NAME_REF
                | SyntaxKind::THIS_EXPR
                | SyntaxKind::BASE_EXPR
                | SyntaxKind::MEMBER_ACCESS
                | SyntaxKind::CALL_EXPR
                | SyntaxKind::NEW_EXPR
                | SyntaxKind::PAREN_EXPR
                | SyntaxKind::CAST_EXPR
                | SyntaxKind::INDEX_EXPR
                | SyntaxKind::PREFIX_EXPR
                | SyntaxKind::POSTFIX_EXPR
                | SyntaxKind::BIN_EXPR
                | SyntaxKind::ASSIGN_EXPR
                | SyntaxKind::LAMBDA_EXPR
        )
    }

    fn cast(node: SyntaxNode) -> Option<Self> {
        let expr = match node.kind() {
            SyntaxKind::LITERAL => Expr::Literal(node),
            SyntaxKind::NAME_REF => Expr::NameRef(NameRef(node)),
            SyntaxKind::THIS_EXPR => Expr::This(node),
            SyntaxKind::BASE_EXPR => Expr::Base(node),
            SyntaxKind::MEMBER_ACCESS => Expr::MemberAccess(MemberAccess(node)),
            SyntaxKind::CALL_EXPR => Expr::Call(CallExpr(node)),
            SyntaxKind::NEW_EXPR => Expr::New(NewExpr(node)),
            SyntaxKind::PAREN_EXPR => Expr::Paren(ParenExpr(node)),
            SyntaxKind::CAST_EXPR => Expr::Cast(CastExpr(node)),
            SyntaxKind::LAMBDA_EXPR => Expr::Lambda(LambdaExpr(node)),
            kind if Self::can_cast(kind) => Expr::Other(node),
            _ => return None,
        };
        Some(expr)
    }

    fn syntax(&self) -> &SyntaxNode {
        match self {
            Expr::Literal(n) | Expr::This(n) | Expr::Base(n) | Expr::Other(n) => n,
            Expr::NameRef(n) => n.syntax(),
            Expr::MemberAccess(n) => n.syntax(),
            Expr::Call(n) => n.syntax(),
            Expr::New(n) => n.syntax(),
            Expr::Paren(n) => n.syntax(),
            Expr::Cast(n) => n.syntax(),
            Expr::Lambda(n) => n.syntax(),
        }
    }
}

// ============================================================================
// Expression wrappers
// ============================================================================

ast_node!(NameRef, NAME_REF);

impl NameRef {
    /// The identifier (or predefined type keyword) being referenced
    pub fn token(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| matches!(t.kind(), SyntaxKind::IDENT | SyntaxKind::PREDEFINED_TYPE))
    }

    pub fn text(&self) -> Option<SmolStr> {
        self.token().map(|t| SmolStr::new(ident_text(&t)))
    }
}

ast_node!(MemberAccess, MEMBER_ACCESS);

impl MemberAccess {
    first_child_method!(receiver, Expr);
    child_after_token_method!(
        member,
        NameRef,
        DOT,
        "The member name after the `.` (or `?.`)."
    );
}

ast_node!(CallExpr, CALL_EXPR);

impl CallExpr {
    first_child_method!(callee, Expr);
    first_child_method!(arg_list, ArgList);

    /// Name of the invoked method, for both `M()` and `x.M()`
    pub fn method_name(&self) -> Option<SmolStr> {
        match self.callee()? {
            Expr::NameRef(name) => name.text(),
            Expr::MemberAccess(access) => access.member()?.text(),
            _ => None,
        }
    }
}

ast_node!(ArgList, ARG_LIST);

impl ArgList {
    children_method!(args, Expr);

    /// Number of arguments, including `out var x` declarations
    pub fn len(&self) -> usize {
        self.0.children().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

ast_node!(NewExpr, NEW_EXPR);

impl NewExpr {
    first_child_method!(ty, TypeRef);
}

ast_node!(ParenExpr, PAREN_EXPR);

impl ParenExpr {
    first_child_method!(expr, Expr);
}

ast_node!(CastExpr, CAST_EXPR);

impl CastExpr {
    first_child_method!(ty, TypeRef);
    first_child_method!(expr, Expr);
}

ast_node!(LambdaExpr, LAMBDA_EXPR);

impl LambdaExpr {
    descendants_method!(
        params,
        LambdaParam,
        "Parameters of this lambda and of any lambda nested inside it."
    );
}

ast_node!(LambdaParam, LAMBDA_PARAM);

impl LambdaParam {
    first_child_method!(ty, TypeRef);
    first_child_method!(name, Name);
}
