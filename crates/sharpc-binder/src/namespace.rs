//! Namespace Tree - hierarchical registry of namespaces and the types they contain.
//!
//! There is one node per fully qualified dotted path within a root. The
//! global root merges source declarations, added modules and every referenced
//! assembly without an alias; each `extern alias` gets a root of its own that
//! only sees the assemblies referenced under that alias.
//!
//! Referenced assemblies and modules are swept once, when they are added:
//! their namespaces become nodes and their types are indexed by
//! (namespace, simple name). Type lookups are memoized per node.

use crate::types::{AssemblyId, ModuleId, TypeArena, TypeId};
use rustc_hash::FxHashMap;
use sharpc_common::{
    InternalError, Location, Report, diagnostic_codes, diagnostic_messages, format_message,
};
use smallvec::SmallVec;
use tracing::{debug, trace};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NamespaceId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct RootId(pub u32);

/// What a (possibly dotted) name resolved to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NameTarget {
    Namespace(NamespaceId),
    Type(TypeId),
}

#[derive(Debug)]
pub struct NamespaceNode {
    /// Last segment; empty for a root.
    pub name: String,
    pub full_name: String,
    pub parent: Option<NamespaceId>,
    children: FxHashMap<String, NamespaceId>,
    /// Types declared in source inside this namespace.
    declared_types: FxHashMap<String, TypeId>,
    /// Memoized type lookups, including misses.
    type_cache: FxHashMap<String, Option<TypeId>>,
}

impl NamespaceNode {
    fn new(name: String, full_name: String, parent: Option<NamespaceId>) -> Self {
        NamespaceNode {
            name,
            full_name,
            parent,
            children: FxHashMap::default(),
            declared_types: FxHashMap::default(),
            type_cache: FxHashMap::default(),
        }
    }

    pub fn child(&self, name: &str) -> Option<NamespaceId> {
        self.children.get(name).copied()
    }

    pub fn declared_type(&self, name: &str) -> Option<TypeId> {
        self.declared_types.get(name).copied()
    }

    /// Whether a nested namespace or a source type with this name exists.
    pub fn has_member(&self, name: &str) -> bool {
        self.children.contains_key(name) || self.declared_types.contains_key(name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RootKind {
    Global,
    ExternAlias(String),
}

type TypeIndex = FxHashMap<(NamespaceId, String), SmallVec<[TypeId; 1]>>;

#[derive(Debug)]
pub struct RootNamespace {
    pub kind: RootKind,
    pub node: NamespaceId,
    assemblies: Vec<AssemblyId>,
    modules: Vec<ModuleId>,
    assembly_types: TypeIndex,
    module_types: TypeIndex,
}

impl RootNamespace {
    fn new(kind: RootKind, node: NamespaceId) -> Self {
        RootNamespace {
            kind,
            node,
            assemblies: Vec::new(),
            modules: Vec::new(),
            assembly_types: FxHashMap::default(),
            module_types: FxHashMap::default(),
        }
    }

    pub fn assemblies(&self) -> &[AssemblyId] {
        &self.assemblies
    }

    pub fn modules(&self) -> &[ModuleId] {
        &self.modules
    }
}

#[derive(Debug)]
pub struct NamespaceTree {
    nodes: Vec<NamespaceNode>,
    roots: Vec<RootNamespace>,
    extern_aliases: FxHashMap<String, RootId>,
}

impl Default for NamespaceTree {
    fn default() -> Self {
        Self::new()
    }
}

impl NamespaceTree {
    pub const GLOBAL_ROOT: RootId = RootId(0);

    pub fn new() -> Self {
        let mut tree = NamespaceTree {
            nodes: Vec::new(),
            roots: Vec::new(),
            extern_aliases: FxHashMap::default(),
        };
        tree.add_root(RootKind::Global);
        tree
    }

    fn add_root(&mut self, kind: RootKind) -> RootId {
        let root = RootId(self.roots.len() as u32);
        let node = NamespaceId(self.nodes.len() as u32);
        self.nodes
            .push(NamespaceNode::new(String::new(), String::new(), None));
        self.roots.push(RootNamespace::new(kind, node));
        root
    }

    /// The global namespace node.
    pub fn global(&self) -> NamespaceId {
        self.roots[Self::GLOBAL_ROOT.0 as usize].node
    }

    pub fn node(&self, id: NamespaceId) -> &NamespaceNode {
        &self.nodes[id.0 as usize]
    }

    fn node_mut(&mut self, id: NamespaceId) -> &mut NamespaceNode {
        &mut self.nodes[id.0 as usize]
    }

    pub fn root(&self, id: RootId) -> &RootNamespace {
        &self.roots[id.0 as usize]
    }

    pub fn roots(&self) -> &[RootNamespace] {
        &self.roots
    }

    /// The root whose top node `ns` descends from.
    pub fn root_of(&self, ns: NamespaceId) -> Result<RootId, InternalError> {
        let mut top = ns;
        while let Some(parent) = self.node(top).parent {
            top = parent;
        }
        self.roots
            .iter()
            .position(|root| root.node == top)
            .map(|index| RootId(index as u32))
            .ok_or_else(|| InternalError::OrphanNamespace(self.node(ns).full_name.clone()))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Root used by assemblies referenced under `alias`, created on first use.
    pub fn extern_alias_root(&mut self, alias: &str) -> RootId {
        if let Some(&root) = self.extern_aliases.get(alias) {
            return root;
        }
        let root = self.add_root(RootKind::ExternAlias(alias.to_string()));
        self.extern_aliases.insert(alias.to_string(), root);
        root
    }

    pub fn extern_alias(&self, alias: &str) -> Option<RootId> {
        self.extern_aliases.get(alias).copied()
    }

    /// Return the child named `name`, creating it if needed. Dotted names
    /// create every intermediate namespace. An empty name is `parent` itself.
    pub fn get_or_create_child(&mut self, parent: NamespaceId, name: &str) -> NamespaceId {
        if name.is_empty() {
            return parent;
        }
        let (first, rest) = match name.split_once('.') {
            Some((first, rest)) => (first, Some(rest)),
            None => (name, None),
        };
        let child = match self.node(parent).child(first) {
            Some(child) => child,
            None => {
                let parent_node = self.node(parent);
                let full_name = if parent_node.full_name.is_empty() {
                    first.to_string()
                } else {
                    format!("{}.{}", parent_node.full_name, first)
                };
                let id = NamespaceId(self.nodes.len() as u32);
                trace!(namespace = %full_name, "creating namespace");
                self.nodes.push(NamespaceNode::new(
                    first.to_string(),
                    full_name,
                    Some(parent),
                ));
                self.node_mut(parent).children.insert(first.to_string(), id);
                id
            }
        };
        match rest {
            Some(rest) => self.get_or_create_child(child, rest),
            None => child,
        }
    }

    /// Find an existing (possibly dotted) namespace below `from`.
    pub fn find_namespace(&self, from: NamespaceId, dotted: &str) -> Option<NamespaceId> {
        if dotted.is_empty() {
            return Some(from);
        }
        dotted
            .split('.')
            .try_fold(from, |ns, segment| self.node(ns).child(segment))
    }

    /// Register a source-declared type. Reports CS0101 on a clash.
    pub fn declare_type(
        &mut self,
        ns: NamespaceId,
        id: TypeId,
        types: &TypeArena,
        report: &mut Report,
    ) -> bool {
        let decl = &types[id];
        let node = self.node(ns);
        let existing = node.declared_type(&decl.name);
        if existing.is_some() || node.child(&decl.name).is_some() {
            if let Some(existing) = existing {
                report.symbol_related_to_previous_error(
                    types[existing].location,
                    types.full_name(existing),
                );
            }
            let namespace = if node.full_name.is_empty() {
                "<global namespace>"
            } else {
                node.full_name.as_str()
            };
            report.error(
                diagnostic_codes::NAMESPACE_ALREADY_CONTAINS_DEFINITION,
                decl.location,
                format_message(
                    diagnostic_messages::NAMESPACE_ALREADY_CONTAINS_DEFINITION,
                    &[namespace, &decl.name],
                ),
            );
            return false;
        }
        let node = self.node_mut(ns);
        node.declared_types.insert(decl.name.clone(), id);
        node.type_cache.remove(&decl.name);
        true
    }

    /// Index the exported types of a referenced assembly under `root`.
    pub fn add_assembly(
        &mut self,
        root: RootId,
        assembly: AssemblyId,
        exported: &[TypeId],
        types: &TypeArena,
    ) {
        let indexed = self.sweep(root, exported, types, true);
        self.roots[root.0 as usize].assemblies.push(assembly);
        debug!(?assembly, ?root, indexed, "swept referenced assembly");
    }

    /// Index the types of an added module. Modules always merge into the
    /// global root and contribute non-public types as well.
    pub fn add_module(&mut self, module: ModuleId, defined: &[TypeId], types: &TypeArena) {
        let indexed = self.sweep(Self::GLOBAL_ROOT, defined, types, false);
        self.roots[Self::GLOBAL_ROOT.0 as usize].modules.push(module);
        debug!(?module, indexed, "swept added module");
    }

    fn sweep(
        &mut self,
        root: RootId,
        ids: &[TypeId],
        types: &TypeArena,
        from_assembly: bool,
    ) -> usize {
        let root_node = self.roots[root.0 as usize].node;
        let mut indexed = 0;
        for &id in ids {
            let decl = &types[id];
            if decl.declaring_type.is_some() || (from_assembly && !decl.is_public()) {
                continue;
            }
            let ns = self.get_or_create_child(root_node, &decl.namespace);
            let index = if from_assembly {
                &mut self.roots[root.0 as usize].assembly_types
            } else {
                &mut self.roots[root.0 as usize].module_types
            };
            index
                .entry((ns, decl.name.clone()))
                .or_default()
                .push(id);
            self.node_mut(ns).type_cache.remove(&decl.name);
            indexed += 1;
        }
        indexed
    }

    /// Look up `name` directly inside `ns`: a nested namespace first, then a type.
    pub fn lookup(
        &mut self,
        ns: NamespaceId,
        name: &str,
        loc: Location,
        types: &TypeArena,
        report: &mut Report,
    ) -> Result<Option<NameTarget>, InternalError> {
        if let Some(child) = self.node(ns).child(name) {
            return Ok(Some(NameTarget::Namespace(child)));
        }
        Ok(self
            .lookup_type(ns, name, loc, types, report)?
            .map(NameTarget::Type))
    }

    /// Memoized type lookup inside `ns`.
    pub fn lookup_type(
        &mut self,
        ns: NamespaceId,
        name: &str,
        loc: Location,
        types: &TypeArena,
        report: &mut Report,
    ) -> Result<Option<TypeId>, InternalError> {
        if let Some(&cached) = self.node(ns).type_cache.get(name) {
            return Ok(cached);
        }
        let found = self.find_type(ns, name, loc, types, report)?;
        self.node_mut(ns)
            .type_cache
            .insert(name.to_string(), found);
        Ok(found)
    }

    fn find_type(
        &self,
        ns: NamespaceId,
        name: &str,
        loc: Location,
        types: &TypeArena,
        report: &mut Report,
    ) -> Result<Option<TypeId>, InternalError> {
        if let Some(declared) = self.node(ns).declared_type(name) {
            return Ok(Some(declared));
        }
        let root = &self.roots[self.root_of(ns)?.0 as usize];
        let key = (ns, name.to_string());
        let mut found = None;

        if let Some(candidates) = root.assembly_types.get(&key) {
            found = candidates.first().copied();
            if candidates.len() > 1 {
                for &candidate in candidates.iter() {
                    report.symbol_related_to_previous_error(
                        types[candidate].location,
                        types.full_name(candidate),
                    );
                }
                report.error(
                    diagnostic_codes::IMPORTED_TYPE_DEFINED_MULTIPLE_TIMES,
                    loc,
                    format_message(
                        diagnostic_messages::IMPORTED_TYPE_DEFINED_MULTIPLE_TIMES,
                        &[&types.full_name(candidates[0])],
                    ),
                );
            }
        }

        // Module merging is best-effort: keep the first definition and warn.
        if let Some(candidates) = root.module_types.get(&key) {
            for &candidate in candidates.iter() {
                let Some(first) = found else {
                    found = Some(candidate);
                    continue;
                };
                report.symbol_related_to_previous_error(
                    types[candidate].location,
                    types.full_name(candidate),
                );
                report.symbol_related_to_previous_error(
                    types[first].location,
                    types.full_name(first),
                );
                report.warning(
                    diagnostic_codes::IGNORING_IMPORTED_TYPE,
                    2,
                    loc,
                    format_message(
                        diagnostic_messages::IGNORING_IMPORTED_TYPE,
                        &[&types.full_name(candidate)],
                    ),
                );
            }
        }
        Ok(found)
    }

    pub fn reset(&mut self) {
        *self = NamespaceTree::new();
    }
}

#[cfg(test)]
#[path = "../tests/namespace_tests.rs"]
mod tests;
