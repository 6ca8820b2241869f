//! Binder state - owns the type universe, the namespace tree and every scope.
//!
//! Declarations are registered here in file-parse order. Name resolution
//! lives in `state_resolution.rs`.

use crate::namespace::{NamespaceId, NamespaceTree};
use crate::scope::{ScopeArena, ScopeId, ScopeKind};
use crate::types::{
    AssemblyId, MemberDecl, MemberId, ModuleId, TypeArena, TypeDecl, TypeId, TypeOrigin,
};
use rustc_hash::FxHashMap;
use sharpc_common::{Location, Report};
use tracing::debug;

/// An assembly named by a `/reference` option.
#[derive(Clone, Debug)]
pub struct ReferencedAssembly {
    pub name: String,
    /// `extern alias` under which the assembly is visible; `None` merges it
    /// into the global namespace.
    pub alias: Option<String>,
    pub types: Vec<TypeId>,
}

/// A module merged into the assembly being compiled.
#[derive(Clone, Debug)]
pub struct AddedModule {
    pub name: String,
    pub types: Vec<TypeId>,
}

#[derive(Debug)]
pub struct BinderState {
    /// Every type and member, whatever its origin
    pub types: TypeArena,
    /// Global and extern-alias namespace roots
    pub namespaces: NamespaceTree,
    /// File, block, implicit and doppelganger scopes
    pub scopes: ScopeArena,
    pub assemblies: Vec<ReferencedAssembly>,
    pub modules: Vec<AddedModule>,
    /// Scope each source type was declared in; member signatures and constant
    /// initializers of the type resolve names from here.
    pub type_scopes: FxHashMap<TypeId, ScopeId>,
    /// Root scope per source file index.
    file_scopes: FxHashMap<u32, ScopeId>,
}

impl Default for BinderState {
    fn default() -> Self {
        Self::new()
    }
}

impl BinderState {
    pub fn new() -> Self {
        BinderState {
            types: TypeArena::new(),
            namespaces: NamespaceTree::new(),
            scopes: ScopeArena::new(),
            assemblies: Vec::new(),
            modules: Vec::new(),
            type_scopes: FxHashMap::default(),
            file_scopes: FxHashMap::default(),
        }
    }

    /// Drop every table. Types, namespaces, scopes and their caches are
    /// only ever reset together.
    pub fn reset(&mut self) {
        self.types.clear();
        self.namespaces.reset();
        self.scopes.clear();
        self.assemblies.clear();
        self.modules.clear();
        self.type_scopes.clear();
        self.file_scopes.clear();
    }

    // =========================================================================
    // References
    // =========================================================================

    /// Register a referenced assembly whose types are already in the arena.
    /// The assembly is swept into its root immediately.
    pub fn add_assembly_reference(
        &mut self,
        name: &str,
        alias: Option<&str>,
        types: Vec<TypeId>,
    ) -> AssemblyId {
        let id = AssemblyId(self.assemblies.len() as u32);
        for &ty in &types {
            if let Some(decl) = self.types.get_mut(ty) {
                decl.origin = TypeOrigin::Assembly(id);
            }
        }
        let root = match alias {
            Some(alias) => self.namespaces.extern_alias_root(alias),
            None => NamespaceTree::GLOBAL_ROOT,
        };
        debug!(assembly = name, alias, types = types.len(), "adding assembly reference");
        self.namespaces.add_assembly(root, id, &types, &self.types);
        self.assemblies.push(ReferencedAssembly {
            name: name.to_string(),
            alias: alias.map(str::to_string),
            types,
        });
        id
    }

    pub fn add_module(&mut self, name: &str, types: Vec<TypeId>) -> ModuleId {
        let id = ModuleId(self.modules.len() as u32);
        for &ty in &types {
            if let Some(decl) = self.types.get_mut(ty) {
                decl.origin = TypeOrigin::Module(id);
            }
        }
        debug!(module = name, types = types.len(), "adding module");
        self.namespaces.add_module(id, &types, &self.types);
        self.modules.push(AddedModule {
            name: name.to_string(),
            types,
        });
        id
    }

    // =========================================================================
    // Source declarations
    // =========================================================================

    /// Root scope of a source file, bound to the global namespace.
    pub fn file_scope(&mut self, file: u32) -> ScopeId {
        if let Some(&scope) = self.file_scopes.get(&file) {
            return scope;
        }
        let global = self.namespaces.global();
        let scope = self.scopes.create(ScopeKind::File, global, None, file);
        self.file_scopes.insert(file, scope);
        scope
    }

    /// Open a `namespace A.B.C { }` block inside `parent`.
    ///
    /// `A` and `A.B` get implicit scopes so lookups from inside the block
    /// visit the enclosing namespaces; the returned block scope is bound to
    /// `A.B.C`. Declaring a namespace closes `parent` for further directives.
    pub fn open_namespace(&mut self, parent: ScopeId, dotted: &str) -> ScopeId {
        self.scopes.get_mut(parent).close();
        let file = self.scopes.get(parent).file;
        let mut scope = parent;
        let mut ns = self.scopes.get(parent).namespace;
        let segments: Vec<&str> = dotted.split('.').filter(|s| !s.is_empty()).collect();
        for (index, segment) in segments.iter().enumerate() {
            ns = self.namespaces.get_or_create_child(ns, segment);
            let kind = if index + 1 == segments.len() {
                ScopeKind::Block
            } else {
                ScopeKind::Implicit
            };
            scope = self.scopes.create(kind, ns, Some(scope), file);
        }
        scope
    }

    pub fn scope_namespace(&self, scope: ScopeId) -> NamespaceId {
        self.scopes.get(scope).namespace
    }

    /// Declare a top-level source type inside `scope`'s namespace.
    ///
    /// The type is allocated even when its name clashes (CS0101) so its
    /// members can still be checked.
    pub fn declare_source_type(
        &mut self,
        scope: ScopeId,
        mut decl: TypeDecl,
        report: &mut Report,
    ) -> TypeId {
        self.scopes.get_mut(scope).close();
        let ns = self.scopes.get(scope).namespace;
        decl.namespace = self.namespaces.node(ns).full_name.clone();
        decl.origin = TypeOrigin::Source;
        decl.declaring_type = None;
        let id = self.types.alloc(decl);
        self.namespaces.declare_type(ns, id, &self.types, report);
        self.type_scopes.insert(id, scope);
        id
    }

    /// Declare a type nested in `outer`.
    pub fn declare_nested_type(&mut self, outer: TypeId, mut decl: TypeDecl) -> TypeId {
        decl.namespace = self.types[outer].namespace.clone();
        decl.declaring_type = Some(outer);
        decl.origin = self.types[outer].origin;
        let id = self.types.alloc(decl);
        if let Some(&scope) = self.type_scopes.get(&outer) {
            self.type_scopes.insert(id, scope);
        }
        id
    }

    pub fn add_member(&mut self, member: MemberDecl) -> MemberId {
        self.types.add_member(member)
    }

    // =========================================================================
    // Directives
    // =========================================================================

    pub fn add_using(
        &mut self,
        scope: ScopeId,
        name: &str,
        loc: Location,
        report: &mut Report,
    ) -> bool {
        self.scopes.get_mut(scope).add_using(name, loc, report)
    }

    pub fn add_alias(
        &mut self,
        scope: ScopeId,
        alias: &str,
        target: &str,
        loc: Location,
        report: &mut Report,
    ) -> bool {
        self.scopes.get_mut(scope).add_alias(alias, target, loc, report)
    }

    pub fn add_extern_alias(
        &mut self,
        scope: ScopeId,
        alias: &str,
        loc: Location,
        report: &mut Report,
    ) -> bool {
        self.scopes.get_mut(scope).add_extern_alias(alias, loc, report)
    }
}
