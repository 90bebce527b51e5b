//! Symbol extraction from AST: pure functions that return symbols.
//!
//! Extraction walks one parsed file and returns every type declaration with
//! the names written in it. Names are resolved later, once the
//! [`SymbolIndex`](super::SymbolIndex) knows every type in the workspace.

use std::sync::Arc;

use smol_str::SmolStr;
use text_size::TextRange;

use super::scope::Scope;
use crate::base::FileId;
use crate::parser::{AstNode, SourceFile, TypeDecl, TypeDeclKind, TypeRef};

/// The kind of a type symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Class,
    Struct,
    Interface,
    Record,
}

impl TypeKind {
    pub fn display(&self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Struct => "struct",
            TypeKind::Interface => "interface",
            TypeKind::Record => "record",
        }
    }
}

impl From<TypeDeclKind> for TypeKind {
    fn from(kind: TypeDeclKind) -> Self {
        match kind {
            TypeDeclKind::Class => TypeKind::Class,
            TypeDeclKind::Struct => TypeKind::Struct,
            TypeDeclKind::Interface => TypeKind::Interface,
            TypeDeclKind::Record => TypeKind::Record,
        }
    }
}

/// A type name as written in source, before resolution.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct WrittenType {
    /// Dotted path without generic arguments
    pub path: Arc<str>,
    pub arity: usize,
}

impl WrittenType {
    /// `None` for `void`, `var`, predefined types and arrays, which never
    /// name a declared type.
    pub fn from_ast(ty: &TypeRef) -> Option<Self> {
        if ty.is_void() || ty.is_var() || ty.is_predefined() || ty.is_array() {
            return None;
        }
        let path = ty.path();
        if path.is_empty() {
            return None;
        }
        Some(Self {
            path: Arc::from(path),
            arity: ty.arity(),
        })
    }
}

/// A method declared on a type
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HirMethod {
    pub name: SmolStr,
    pub arity: usize,
    /// Parameters without a default value
    pub required: usize,
    pub variadic: bool,
    pub return_type: Option<WrittenType>,
    pub is_static: bool,
}

/// A field or property declared on a type
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HirMember {
    pub name: SmolStr,
    pub ty: Option<WrittenType>,
    pub is_static: bool,
}

/// A type declaration extracted from one file.
///
/// Partial types produce one `HirType` per declaration; the index merges them.
#[derive(Clone, Debug)]
pub struct HirType {
    /// The simple name
    pub name: SmolStr,
    /// Qualified index key, e.g. `SpecificNamespace.Worker` or `Lib.Repo`1`
    pub qualified_name: Arc<str>,
    pub kind: TypeKind,
    pub file: FileId,
    /// Range of the name token
    pub name_range: TextRange,
    /// Scope the names written in this declaration resolve in
    pub scope: Arc<Scope>,
    pub bases: Vec<WrittenType>,
    pub methods: Vec<HirMethod>,
    pub members: Vec<HirMember>,
}

/// Result of extracting one file.
#[derive(Clone, Debug, Default)]
pub struct ExtractionResult {
    pub types: Vec<HirType>,
}

/// Extract every type declaration (including nested ones) from a file.
pub fn extract_types(file: FileId, root: &SourceFile) -> ExtractionResult {
    let types = root
        .syntax()
        .descendants()
        .filter_map(TypeDecl::cast)
        .filter_map(|decl| extract_type(file, &decl))
        .collect();
    ExtractionResult { types }
}

fn extract_type(file: FileId, decl: &TypeDecl) -> Option<HirType> {
    let name_node = decl.name()?;
    let name = name_node.text()?;
    let scope = Scope::of(decl.syntax());
    let qualified_name = scope.innermost()?.clone();

    let bases = decl
        .base_list()
        .map(|list| list.types().filter_map(|t| WrittenType::from_ast(&t)).collect())
        .unwrap_or_default();

    let methods = decl
        .methods()
        .filter_map(|method| {
            Some(HirMethod {
                name: method.name()?.text()?,
                arity: method.arity(),
                required: method.required_arity(),
                variadic: method.is_variadic(),
                return_type: method.return_type().and_then(|t| WrittenType::from_ast(&t)),
                is_static: method.is_static(),
            })
        })
        .collect();

    let mut members = Vec::new();
    for field in decl.fields() {
        let ty = field.ty().and_then(|t| WrittenType::from_ast(&t));
        for name in field.names().filter_map(|n| n.text()) {
            members.push(HirMember {
                name,
                ty: ty.clone(),
                is_static: field.is_static(),
            });
        }
    }
    for property in decl.properties() {
        if let Some(name) = property.name().and_then(|n| n.text()) {
            members.push(HirMember {
                name,
                ty: property.ty().and_then(|t| WrittenType::from_ast(&t)),
                is_static: property.is_static(),
            });
        }
    }

    Some(HirType {
        name,
        qualified_name,
        kind: decl.kind().into(),
        file,
        name_range: name_node.syntax().text_range(),
        scope: Arc::new(scope),
        bases,
        methods,
        members,
    })
}
