use rowan::NodeOrToken;
use smol_str::SmolStr;

use super::*;

// ============================================================================
// Root and namespaces
// ============================================================================

ast_node!(SourceFile, SOURCE_FILE);

impl SourceFile {
    children_method!(usings, UsingDirective);
    children_method!(namespaces, NamespaceDecl);
    children_method!(types, TypeDecl);
}

ast_node!(UsingDirective, USING_DIRECTIVE);

impl UsingDirective {
    has_token_method!(is_static, STATIC_KW);

    /// `using Alias = Target;`
    pub fn alias(&self) -> Option<Name> {
        self.0.children().find_map(Name::cast)
    }

    pub fn target(&self) -> Option<QualifiedName> {
        self.0.children().find_map(QualifiedName::cast)
    }
}

ast_node!(NamespaceDecl, NAMESPACE_DECL);

impl NamespaceDecl {
    first_child_method!(name, QualifiedName);
    children_method!(usings, UsingDirective);
    children_method!(namespaces, NamespaceDecl);
    children_method!(types, TypeDecl);

    /// Written name of the namespace, e.g. `SpecificNamespace.Inner`
    pub fn name_text(&self) -> Option<String> {
        self.name().map(|n| n.text())
    }

    /// `namespace A.B;` rather than `namespace A.B { ... }`
    pub fn is_file_scoped(&self) -> bool {
        for element in self.0.children_with_tokens() {
            match element.kind() {
                SyntaxKind::SEMICOLON => return true,
                SyntaxKind::L_BRACE => return false,
                _ => {}
            }
        }
        false
    }
}

ast_node!(QualifiedName, QUALIFIED_NAME);

impl QualifiedName {
    pub fn segments(&self) -> Vec<SmolStr> {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .filter(|t| t.kind() == SyntaxKind::IDENT)
            .map(|t| SmolStr::new(ident_text(&t)))
            .collect()
    }

    pub fn text(&self) -> String {
        self.segments().join(".")
    }
}

// ============================================================================
// Type declarations
// ============================================================================

/// What kind of type a [`TypeDecl`] declares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeDeclKind {
    Class,
    Struct,
    Interface,
    Record,
}

/// A class, struct, interface or record declaration
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeDecl(pub(crate) SyntaxNode);

impl AstNode for TypeDecl {
    fn can_cast(kind: SyntaxKind) -> bool {
        kind.is_type_decl()
    }

    fn cast(node: SyntaxNode) -> Option<Self> {
        if Self::can_cast(node.kind()) {
            Some(Self(node))
        } else {
            None
        }
    }

    fn syntax(&self) -> &SyntaxNode {
        &self.0
    }
}

impl TypeDecl {
    first_child_method!(name, Name);
    first_child_method!(base_list, BaseList);
    first_child_method!(member_list, MemberList);
    first_child_method!(type_params, TypeParamList);

    pub fn kind(&self) -> TypeDeclKind {
        match self.0.kind() {
            SyntaxKind::STRUCT_DECL => TypeDeclKind::Struct,
            SyntaxKind::INTERFACE_DECL => TypeDeclKind::Interface,
            SyntaxKind::RECORD_DECL => TypeDeclKind::Record,
            _ => TypeDeclKind::Class,
        }
    }

    /// Number of generic type parameters
    pub fn arity(&self) -> usize {
        self.type_params().map(|p| p.names().count()).unwrap_or(0)
    }

    pub fn methods(&self) -> impl Iterator<Item = MethodDecl> + '_ {
        self.member_nodes().filter_map(MethodDecl::cast)
    }

    pub fn constructors(&self) -> impl Iterator<Item = ConstructorDecl> + '_ {
        self.member_nodes().filter_map(ConstructorDecl::cast)
    }

    pub fn fields(&self) -> impl Iterator<Item = FieldDecl> + '_ {
        self.member_nodes().filter_map(FieldDecl::cast)
    }

    pub fn properties(&self) -> impl Iterator<Item = PropertyDecl> + '_ {
        self.member_nodes().filter_map(PropertyDecl::cast)
    }

    pub fn nested_types(&self) -> impl Iterator<Item = TypeDecl> + '_ {
        self.member_nodes().filter_map(TypeDecl::cast)
    }

    fn member_nodes(&self) -> impl Iterator<Item = SyntaxNode> + '_ {
        self.member_list().into_iter().flat_map(|list| list.0.children())
    }
}

ast_node!(TypeParamList, TYPE_PARAM_LIST);

impl TypeParamList {
    children_method!(names, Name);
}

ast_node!(BaseList, BASE_LIST);

impl BaseList {
    children_method!(types, TypeRef);
}

ast_node!(MemberList, MEMBER_LIST);

// ============================================================================
// Members
// ============================================================================

ast_node!(MethodDecl, METHOD_DECL);

impl MethodDecl {
    first_child_method!(name, Name);
    first_child_method!(return_type, TypeRef);
    first_child_method!(param_list, ParamList);
    first_child_method!(body, Block);
    first_child_method!(expr_body, ExprBody);
    has_token_method!(is_static, STATIC_KW);
    has_token_method!(is_abstract, ABSTRACT_KW);

    pub fn has_modifier(&self, kind: SyntaxKind) -> bool {
        has_token(&self.0, kind)
    }

    /// Number of declared parameters
    pub fn arity(&self) -> usize {
        self.param_list().map(|p| p.params().count()).unwrap_or(0)
    }

    /// Parameters a caller must always pass: no default, not `params`.
    pub fn required_arity(&self) -> usize {
        self.param_list()
            .map(|p| p.params().filter(|param| !param.has_default() && !param.is_params()).count())
            .unwrap_or(0)
    }

    /// Whether the last parameter is a `params` array.
    pub fn is_variadic(&self) -> bool {
        self.param_list()
            .and_then(|p| p.params().last())
            .is_some_and(|param| param.is_params())
    }
}

ast_node!(ConstructorDecl, CONSTRUCTOR_DECL);

impl ConstructorDecl {
    first_child_method!(name, Name);
    first_child_method!(param_list, ParamList);
    first_child_method!(body, Block);
}

ast_node!(FieldDecl, FIELD_DECL);

impl FieldDecl {
    first_child_method!(ty, TypeRef);
    children_method!(names, Name);
    has_token_method!(is_static, STATIC_KW);
}

ast_node!(PropertyDecl, PROPERTY_DECL);

impl PropertyDecl {
    first_child_method!(ty, TypeRef);
    first_child_method!(name, Name);
    has_token_method!(is_static, STATIC_KW);
}

ast_node!(ParamList, PARAM_LIST);

impl ParamList {
    children_method!(params, Param);

    pub fn l_paren(&self) -> Option<SyntaxToken> {
        find_token(&self.0, SyntaxKind::L_PAREN)
    }

    pub fn r_paren(&self) -> Option<SyntaxToken> {
        find_token(&self.0, SyntaxKind::R_PAREN)
    }
}

ast_node!(Param, PARAM);

impl Param {
    first_child_method!(ty, TypeRef);
    first_child_method!(name, Name);
    has_token_method!(is_params, PARAMS_KW);
    has_token_method!(has_default, EQ);
}

ast_node!(Name, NAME);

impl Name {
    pub fn ident(&self) -> Option<SyntaxToken> {
        find_token(&self.0, SyntaxKind::IDENT)
    }

    pub fn text(&self) -> Option<SmolStr> {
        self.ident().map(|t| SmolStr::new(ident_text(&t)))
    }
}

// ============================================================================
// Type references
// ============================================================================

ast_node!(TypeRef, TYPE_REF);

impl TypeRef {
    first_child_method!(type_args, TypeArgList);

    /// Dotted path of the type without generic arguments or modifiers.
    ///
    /// `System.Collections.Generic.List<int>?` yields
    /// `System.Collections.Generic.List`.
    pub fn path(&self) -> String {
        let mut path = String::new();
        for element in self.0.children_with_tokens() {
            if let NodeOrToken::Token(token) = element {
                match token.kind() {
                    SyntaxKind::IDENT => path.push_str(ident_text(&token)),
                    SyntaxKind::PREDEFINED_TYPE | SyntaxKind::VOID_KW | SyntaxKind::VAR_KW => {
                        path.push_str(token.text())
                    }
                    SyntaxKind::DOT => path.push('.'),
                    _ => {}
                }
            }
        }
        path
    }

    /// Number of generic arguments on the last segment
    pub fn arity(&self) -> usize {
        self.0
            .children()
            .filter_map(TypeArgList::cast)
            .last()
            .map(|args| args.types().count())
            .unwrap_or(0)
    }

    pub fn is_var(&self) -> bool {
        self.first_significant() == Some(SyntaxKind::VAR_KW)
    }

    pub fn is_void(&self) -> bool {
        self.first_significant() == Some(SyntaxKind::VOID_KW)
    }

    pub fn is_predefined(&self) -> bool {
        self.first_significant() == Some(SyntaxKind::PREDEFINED_TYPE)
    }

    /// `T[]`
    pub fn is_array(&self) -> bool {
        has_token(&self.0, SyntaxKind::L_BRACKET)
    }

    fn first_significant(&self) -> Option<SyntaxKind> {
        self.0
            .children_with_tokens()
            .map(|e| e.kind())
            .find(|k| !k.is_trivia())
    }
}

ast_node!(TypeArgList, TYPE_ARG_LIST);

impl TypeArgList {
    children_method!(types, TypeRef);
}
