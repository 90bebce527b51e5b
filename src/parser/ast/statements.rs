use rowan::NodeOrToken;

use super::*;

ast_node!(Block, BLOCK);

impl Block {
    /// Statement nodes directly inside the braces
    pub fn statements(&self) -> impl Iterator<Item = SyntaxNode> + '_ {
        self.0.children()
    }

    pub fn l_brace(&self) -> Option<SyntaxToken> {
        find_token(&self.0, SyntaxKind::L_BRACE)
    }

    pub fn r_brace(&self) -> Option<SyntaxToken> {
        find_token(&self.0, SyntaxKind::R_BRACE)
    }
}

ast_node!(ExprBody, EXPR_BODY);

impl ExprBody {
    first_child_method!(expr, Expr);
}

ast_node!(ExprStmt, EXPR_STMT);

impl ExprStmt {
    first_child_method!(expr, Expr);
}

ast_node!(LocalDecl, LOCAL_DECL);

impl LocalDecl {
    first_child_method!(ty, TypeRef);

    /// `(name, initializer)` pairs in declaration order
    pub fn declarators(&self) -> Vec<(Name, Option<Expr>)> {
        let mut declarators: Vec<(Name, Option<Expr>)> = Vec::new();
        let mut after_eq = false;
        for element in self.0.children_with_tokens() {
            match element {
                NodeOrToken::Token(t) if t.kind() == SyntaxKind::EQ => after_eq = true,
                NodeOrToken::Token(t) if t.kind() == SyntaxKind::COMMA => after_eq = false,
                NodeOrToken::Node(n) => {
                    if let Some(name) = Name::cast(n.clone()) {
                        declarators.push((name, None));
                    } else if after_eq {
                        if let (Some(last), Some(expr)) = (declarators.last_mut(), Expr::cast(n)) {
                            last.1 = Some(expr);
                        }
                        after_eq = false;
                    }
                }
                _ => {}
            }
        }
        declarators
    }
}

ast_node!(ForeachStmt, FOREACH_STMT);

impl ForeachStmt {
    first_child_method!(ty, TypeRef);
    first_child_method!(name, Name);
    child_after_token_method!(
        iterable,
        Expr,
        IN_KW,
        "The collection expression after `in`."
    );
}

ast_node!(ReturnStmt, RETURN_STMT);

impl ReturnStmt {
    first_child_method!(expr, Expr);
}
