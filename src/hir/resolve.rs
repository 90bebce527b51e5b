//! Name resolution: the workspace-wide type index.
//!
//! The [`SymbolIndex`] is built from the extraction results of every file in
//! one compilation. Building happens in two passes:
//!
//! 1. **Registration** - every declared type gets a [`TypeIdx`]; partial
//!    declarations with the same qualified name share one.
//! 2. **Resolution** - written base types, member types and return types are
//!    resolved through each declaration's [`Scope`], and the transitive
//!    interface closure of every type is precomputed.
//!
//! After building, the index is immutable and cheap to share across threads.

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;
use std::sync::Arc;

use super::scope::Scope;
use super::symbols::{ExtractionResult, HirType, TypeKind, WrittenType};
use crate::base::FileId;

/// Index of a type in the [`SymbolIndex`].
pub type TypeIdx = usize;

/// A resolved method declaration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodInfo {
    pub name: SmolStr,
    pub arity: usize,
    pub required: usize,
    pub variadic: bool,
    pub return_type: Option<TypeIdx>,
    pub is_static: bool,
}

impl MethodInfo {
    /// Whether a call with `args` arguments can bind to this method.
    pub fn accepts(&self, args: usize) -> bool {
        args >= self.required && (args <= self.arity || self.variadic)
    }
}

/// A resolved field or property
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberInfo {
    pub ty: Option<TypeIdx>,
    pub is_static: bool,
}

/// A type with all of its declarations merged and resolved.
#[derive(Clone, Debug)]
pub struct TypeInfo {
    pub name: SmolStr,
    pub qualified_name: Arc<str>,
    pub kind: TypeKind,
    /// Files declaring (part of) this type
    pub files: Vec<FileId>,
    /// The base class, for classes and records
    pub base_class: Option<TypeIdx>,
    /// Directly implemented or extended interfaces
    pub interfaces: Vec<TypeIdx>,
    pub methods: Vec<MethodInfo>,
    pub members: IndexMap<SmolStr, MemberInfo>,
}

/// Workspace-wide index of every declared type.
#[derive(Clone, Debug, Default)]
pub struct SymbolIndex {
    types: Vec<TypeInfo>,
    /// Index by qualified name -> type index (IndexMap preserves insertion order).
    by_qualified_name: IndexMap<Arc<str>, TypeIdx>,
    /// Index by simple name -> type indices (may have multiple).
    by_simple_name: FxHashMap<SmolStr, Vec<TypeIdx>>,
    /// Index by file -> type indices.
    by_file: FxHashMap<FileId, Vec<TypeIdx>>,
    /// Transitive interface set of every type, excluding the type itself.
    all_interfaces: Vec<FxHashSet<TypeIdx>>,
}

impl SymbolIndex {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the index from the extraction results of every file.
    pub fn build(results: impl IntoIterator<Item = ExtractionResult>) -> Self {
        let mut index = Self::new();
        let mut parts: Vec<Vec<HirType>> = Vec::new();

        // Pass 1: registration
        for result in results {
            for ty in result.types {
                let idx = match index.by_qualified_name.get(&ty.qualified_name) {
                    Some(&idx) => idx,
                    None => {
                        let idx = index.types.len();
                        index.by_qualified_name.insert(ty.qualified_name.clone(), idx);
                        index
                            .by_simple_name
                            .entry(ty.name.clone())
                            .or_default()
                            .push(idx);
                        index.types.push(TypeInfo {
                            name: ty.name.clone(),
                            qualified_name: ty.qualified_name.clone(),
                            kind: ty.kind,
                            files: Vec::new(),
                            base_class: None,
                            interfaces: Vec::new(),
                            methods: Vec::new(),
                            members: IndexMap::new(),
                        });
                        parts.push(Vec::new());
                        idx
                    }
                };
                let files = &mut index.types[idx].files;
                if !files.contains(&ty.file) {
                    files.push(ty.file);
                    index.by_file.entry(ty.file).or_default().push(idx);
                }
                parts[idx].push(ty);
            }
        }

        // Pass 2: resolution
        for (idx, declarations) in parts.iter().enumerate() {
            for decl in declarations {
                index.resolve_declaration(idx, decl);
            }
        }

        index.all_interfaces = (0..index.types.len())
            .map(|idx| index.compute_all_interfaces(idx))
            .collect();

        tracing::debug!(types = index.types.len(), "built symbol index");
        index
    }

    fn resolve_declaration(&mut self, idx: TypeIdx, decl: &HirType) {
        let scope = &decl.scope;
        for base in &decl.bases {
            let Some(base_idx) = self.resolve_written(scope, base) else {
                tracing::trace!(
                    ty = %decl.qualified_name,
                    base = %base.path,
                    "unresolved base type"
                );
                continue;
            };
            if base_idx == idx {
                continue;
            }
            let is_interface = self.types[base_idx].kind == TypeKind::Interface;
            let info = &mut self.types[idx];
            if is_interface {
                if !info.interfaces.contains(&base_idx) {
                    info.interfaces.push(base_idx);
                }
            } else if info.base_class.is_none()
                && matches!(info.kind, TypeKind::Class | TypeKind::Record)
            {
                info.base_class = Some(base_idx);
            }
        }

        for method in &decl.methods {
            let return_type = method
                .return_type
                .as_ref()
                .and_then(|t| self.resolve_written(scope, t));
            self.types[idx].methods.push(MethodInfo {
                name: method.name.clone(),
                arity: method.arity,
                required: method.required,
                variadic: method.variadic,
                return_type,
                is_static: method.is_static,
            });
        }

        for member in &decl.members {
            let ty = member.ty.as_ref().and_then(|t| self.resolve_written(scope, t));
            self.types[idx].members.insert(
                member.name.clone(),
                MemberInfo {
                    ty,
                    is_static: member.is_static,
                },
            );
        }
    }

    /// Transitive closure over base classes and interfaces; cycles terminate
    /// through the visited set.
    fn compute_all_interfaces(&self, idx: TypeIdx) -> FxHashSet<TypeIdx> {
        let mut result = FxHashSet::default();
        let mut visited = FxHashSet::default();
        visited.insert(idx);
        let mut stack = self.direct_bases(idx);
        while let Some(next) = stack.pop() {
            if !visited.insert(next) {
                continue;
            }
            if self.types[next].kind == TypeKind::Interface {
                result.insert(next);
            }
            stack.extend(self.direct_bases(next));
        }
        result
    }

    fn direct_bases(&self, idx: TypeIdx) -> Vec<TypeIdx> {
        let info = &self.types[idx];
        info.base_class
            .iter()
            .chain(info.interfaces.iter())
            .copied()
            .collect()
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Look up a type by its qualified index key.
    pub fn type_by_qualified_name(&self, name: &str) -> Option<TypeIdx> {
        self.by_qualified_name.get(name).copied()
    }

    /// Resolve a written type name from within `scope`.
    pub fn resolve_type(&self, scope: &Scope, path: &str, arity: usize) -> Option<TypeIdx> {
        scope
            .candidates(path, arity)
            .iter()
            .find_map(|candidate| self.type_by_qualified_name(candidate))
    }

    fn resolve_written(&self, scope: &Scope, ty: &WrittenType) -> Option<TypeIdx> {
        self.resolve_type(scope, &ty.path, ty.arity)
    }

    pub fn get(&self, idx: TypeIdx) -> Option<&TypeInfo> {
        self.types.get(idx)
    }

    /// All types with the given simple name.
    pub fn types_named(&self, name: &str) -> &[TypeIdx] {
        self.by_simple_name
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Types declared (at least partly) in a file.
    pub fn types_in_file(&self, file: FileId) -> &[TypeIdx] {
        self.by_file.get(&file).map(Vec::as_slice).unwrap_or_default()
    }

    /// Transitive interface set of a type, excluding the type itself.
    pub fn all_interfaces(&self, idx: TypeIdx) -> Option<&FxHashSet<TypeIdx>> {
        self.all_interfaces.get(idx)
    }

    /// Base classes from the immediate one outwards.
    pub fn base_classes(&self, idx: TypeIdx) -> impl Iterator<Item = TypeIdx> + '_ {
        let mut seen = FxHashSet::default();
        seen.insert(idx);
        std::iter::successors(self.types.get(idx).and_then(|t| t.base_class), move |&b| {
            self.types.get(b).and_then(|t| t.base_class)
        })
        .take_while(move |b| seen.insert(*b))
    }

    /// Find a method by name on a type, its base classes, then its interfaces.
    ///
    /// Only an overload that accepts `args` arguments is returned; a call
    /// that fits no overload does not bind.
    pub fn find_method(
        &self,
        idx: TypeIdx,
        name: &str,
        args: usize,
    ) -> Option<(TypeIdx, &MethodInfo)> {
        self.lookup_chain(idx).into_iter().find_map(|owner| {
            self.types[owner]
                .methods
                .iter()
                .find(|m| m.name == name && m.accepts(args))
                .map(|m| (owner, m))
        })
    }

    /// Find a field or property by name on a type and its bases.
    pub fn find_member(&self, idx: TypeIdx, name: &str) -> Option<(TypeIdx, &MemberInfo)> {
        self.lookup_chain(idx)
            .into_iter()
            .find_map(|owner| self.types[owner].members.get(name).map(|m| (owner, m)))
    }

    /// The type itself, its base classes, then its interfaces in index order.
    fn lookup_chain(&self, idx: TypeIdx) -> Vec<TypeIdx> {
        if idx >= self.types.len() {
            return Vec::new();
        }
        let mut chain = vec![idx];
        chain.extend(self.base_classes(idx));
        if let Some(interfaces) = self.all_interfaces.get(idx) {
            let mut interfaces: Vec<_> = interfaces.iter().copied().collect();
            interfaces.sort_unstable();
            chain.extend(interfaces);
        }
        chain
    }

    /// Number of types in the index.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::symbols::extract_types;
    use crate::parser::parse;

    fn build(sources: &[&str]) -> SymbolIndex {
        SymbolIndex::build(sources.iter().enumerate().map(|(i, source)| {
            let parsed = parse(source);
            assert!(parsed.ok(), "errors: {:?}", parsed.errors);
            extract_types(FileId::new(i as u32), &parsed.source_file())
        }))
    }

    fn idx(index: &SymbolIndex, name: &str) -> TypeIdx {
        index.type_by_qualified_name(name).unwrap()
    }

    #[test]
    fn test_interface_closure_is_transitive() {
        let index = build(&[
            "namespace N; interface IRoot { void Process(); } interface IMid : IRoot { } class Base : IMid { } class Derived : Base { }",
        ]);
        let derived = idx(&index, "N.Derived");
        let closure = index.all_interfaces(derived).unwrap();
        assert!(closure.contains(&idx(&index, "N.IRoot")));
        assert!(closure.contains(&idx(&index, "N.IMid")));
        assert!(!closure.contains(&idx(&index, "N.Base")));
        assert!(!closure.contains(&derived));
    }

    #[test]
    fn test_interface_cycle_terminates() {
        let index = build(&["interface IA : IB { } interface IB : IA { }"]);
        let a = idx(&index, "IA");
        let b = idx(&index, "IB");
        let closure = index.all_interfaces(a).unwrap();
        assert!(closure.contains(&b));
        assert!(!closure.contains(&a));
    }

    #[test]
    fn test_cross_file_resolution_through_usings() {
        let index = build(&[
            "namespace Lib { public interface IWorker { void Process(); } }",
            "using Lib;\nnamespace App { class Worker : IWorker { public void Process() { } } }",
        ]);
        let worker = idx(&index, "App.Worker");
        assert_eq!(index.get(worker).unwrap().interfaces, vec![idx(&index, "Lib.IWorker")]);
        assert_eq!(index.types_in_file(FileId::new(1)), &[worker]);
        assert_eq!(index.types_named("IWorker"), &[idx(&index, "Lib.IWorker")]);
    }

    #[test]
    fn test_partial_declarations_merge() {
        let index = build(&[
            "namespace N { interface I { } partial class P { void A() { } } }",
            "namespace N { partial class P : I { void B() { } } }",
        ]);
        let p = idx(&index, "N.P");
        let info = index.get(p).unwrap();
        assert_eq!(info.methods.len(), 2);
        assert_eq!(info.files.len(), 2);
        assert!(index.all_interfaces(p).unwrap().contains(&idx(&index, "N.I")));
    }

    #[test]
    fn test_find_method_walks_bases_then_interfaces() {
        let index = build(&[
            "interface I { void Process(); } class Base { public void Run(int a) { } } class Impl : Base, I { }",
        ]);
        let imp = idx(&index, "Impl");
        let (owner, _) = index.find_method(imp, "Process", 0).unwrap();
        assert_eq!(owner, idx(&index, "I"));
        let (owner, method) = index.find_method(imp, "Run", 1).unwrap();
        assert_eq!(owner, idx(&index, "Base"));
        assert_eq!(method.arity, 1);
        assert!(index.find_method(imp, "Missing", 0).is_none());
    }

    #[test]
    fn test_find_method_requires_a_fitting_overload() {
        let index = build(&[
            "class C { void Process() { } void Log(string m, int level = 0) { } void Emit(int a, params int[] rest) { } }",
        ]);
        let c = idx(&index, "C");
        assert!(index.find_method(c, "Process", 0).is_some());
        assert!(index.find_method(c, "Process", 1).is_none());
        assert!(index.find_method(c, "Log", 0).is_none());
        assert!(index.find_method(c, "Log", 1).is_some());
        assert!(index.find_method(c, "Log", 2).is_some());
        assert!(index.find_method(c, "Log", 3).is_none());
        assert!(index.find_method(c, "Emit", 1).is_some());
        assert!(index.find_method(c, "Emit", 4).is_some());
    }

    #[test]
    fn test_find_member_resolves_types() {
        let index = build(&["class W { } class Base { protected W worker; } class C : Base { W Other { get; } }"]);
        let c = idx(&index, "C");
        let w = idx(&index, "W");
        assert_eq!(index.find_member(c, "worker").unwrap().1.ty, Some(w));
        assert_eq!(index.find_member(c, "Other").unwrap().1.ty, Some(w));
    }
}
