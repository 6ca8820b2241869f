//! Namespace-block scopes and the using/alias directives they record.
//!
//! Every source file has a root scope bound to the global namespace. Each
//! `namespace A.B { }` block opens a block scope, with implicit scopes for the
//! enclosing namespaces that have no block of their own. Directives are
//! recorded unresolved while declarations are registered; they resolve lazily
//! (see `state_resolution.rs`) through the scope's doppelganger.

use crate::lazy::LazyCell;
use crate::namespace::{NameTarget, NamespaceId};
use indexmap::IndexMap;
use sharpc_common::{Location, Report, diagnostic_codes, diagnostic_messages, format_message};
use tracing::trace;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ScopeKind {
    /// Compilation-unit scope of a source file.
    File,
    /// An explicit `namespace X { }` block.
    Block,
    /// An enclosing namespace with no block of its own.
    Implicit,
    /// Shadow of a scope used to resolve that scope's own directives.
    Doppelganger,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ScopeState {
    /// Still accepting using and alias directives.
    Open,
    /// A type or nested namespace has been declared.
    Closed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AliasTarget {
    /// `using A = N.T;`
    Name(String),
    /// `extern alias A;`
    ExternRoot,
}

#[derive(Clone, Debug)]
pub struct AliasDirective {
    pub target: AliasTarget,
    pub location: Location,
    pub resolved: LazyCell<NameTarget>,
}

impl AliasDirective {
    pub const fn is_extern(&self) -> bool {
        matches!(self.target, AliasTarget::ExternRoot)
    }
}

#[derive(Clone, Debug)]
pub struct UsingDirective {
    pub name: String,
    pub location: Location,
    pub resolved: LazyCell<NamespaceId>,
}

#[derive(Clone, Debug)]
pub struct Scope {
    pub kind: ScopeKind,
    pub namespace: NamespaceId,
    pub parent: Option<ScopeId>,
    /// Index of the source file the scope belongs to.
    pub file: u32,
    state: ScopeState,
    pub(crate) aliases: IndexMap<String, AliasDirective>,
    pub(crate) usings: Vec<UsingDirective>,
    doppelganger: Option<ScopeId>,
}

impl Scope {
    fn new(kind: ScopeKind, namespace: NamespaceId, parent: Option<ScopeId>, file: u32) -> Self {
        Scope {
            kind,
            namespace,
            parent,
            file,
            state: ScopeState::Open,
            aliases: IndexMap::new(),
            usings: Vec::new(),
            doppelganger: None,
        }
    }

    pub const fn state(&self) -> ScopeState {
        self.state
    }

    pub fn close(&mut self) {
        self.state = ScopeState::Closed;
    }

    pub fn aliases(&self) -> impl Iterator<Item = (&str, &AliasDirective)> {
        self.aliases.iter().map(|(name, alias)| (name.as_str(), alias))
    }

    pub fn alias(&self, name: &str) -> Option<&AliasDirective> {
        self.aliases.get(name)
    }

    pub fn usings(&self) -> &[UsingDirective] {
        &self.usings
    }

    /// Whether this scope can hold directives at all.
    pub const fn has_directives(&self) -> bool {
        matches!(self.kind, ScopeKind::File | ScopeKind::Block)
    }

    /// Record `extern alias name;`. Invalid directives are reported and dropped.
    pub fn add_extern_alias(&mut self, name: &str, loc: Location, report: &mut Report) -> bool {
        if name == "global" {
            report.error(
                diagnostic_codes::CANNOT_REDEFINE_GLOBAL_ALIAS,
                loc,
                diagnostic_messages::CANNOT_REDEFINE_GLOBAL_ALIAS,
            );
            return false;
        }
        let after_other_elements = self.state == ScopeState::Closed
            || !self.usings.is_empty()
            || self.aliases.values().any(|alias| !alias.is_extern());
        if after_other_elements {
            report.error(
                diagnostic_codes::EXTERN_ALIAS_MUST_PRECEDE,
                loc,
                diagnostic_messages::EXTERN_ALIAS_MUST_PRECEDE,
            );
            return false;
        }
        self.insert_alias(name, AliasTarget::ExternRoot, loc, report)
    }

    /// Record `using name;`. A repeated namespace warns and is dropped.
    pub fn add_using(&mut self, name: &str, loc: Location, report: &mut Report) -> bool {
        if !self.check_open(loc, report) {
            return false;
        }
        if self.usings.iter().any(|using| using.name == name) {
            report.warning(
                diagnostic_codes::DUPLICATE_USING_DIRECTIVE,
                3,
                loc,
                format_message(diagnostic_messages::DUPLICATE_USING_DIRECTIVE, &[name]),
            );
            return false;
        }
        trace!(using = name, "recorded using directive");
        self.usings.push(UsingDirective {
            name: name.to_string(),
            location: loc,
            resolved: LazyCell::new(),
        });
        true
    }

    /// Record `using alias = target;`.
    pub fn add_alias(
        &mut self,
        alias: &str,
        target: &str,
        loc: Location,
        report: &mut Report,
    ) -> bool {
        if !self.check_open(loc, report) {
            return false;
        }
        self.insert_alias(alias, AliasTarget::Name(target.to_string()), loc, report)
    }

    fn check_open(&self, loc: Location, report: &mut Report) -> bool {
        if self.state == ScopeState::Closed {
            report.error(
                diagnostic_codes::USING_MUST_PRECEDE,
                loc,
                diagnostic_messages::USING_MUST_PRECEDE,
            );
            return false;
        }
        true
    }

    fn insert_alias(
        &mut self,
        name: &str,
        target: AliasTarget,
        loc: Location,
        report: &mut Report,
    ) -> bool {
        if let Some(previous) = self.aliases.get(name) {
            report.symbol_related_to_previous_error(previous.location, name);
            report.error(
                diagnostic_codes::DUPLICATE_USING_ALIAS,
                loc,
                format_message(diagnostic_messages::DUPLICATE_USING_ALIAS, &[name]),
            );
            return false;
        }
        trace!(alias = name, ?target, "recorded alias directive");
        self.aliases.insert(
            name.to_string(),
            AliasDirective {
                target,
                location: loc,
                resolved: LazyCell::new(),
            },
        );
        true
    }

    pub(crate) fn reset_resolutions(&mut self) {
        for alias in self.aliases.values_mut() {
            alias.resolved.reset();
        }
        for using in &mut self.usings {
            using.resolved.reset();
        }
    }
}

/// Every scope created during a compilation, in creation order.
#[derive(Debug, Default)]
pub struct ScopeArena {
    scopes: Vec<Scope>,
}

impl ScopeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(
        &mut self,
        kind: ScopeKind,
        namespace: NamespaceId,
        parent: Option<ScopeId>,
        file: u32,
    ) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope::new(kind, namespace, parent, file));
        id
    }

    pub fn get(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = ScopeId> {
        (0..self.scopes.len() as u32).map(ScopeId)
    }

    /// The shadow of `id`: same namespace and lexical parent, but none of
    /// `id`'s own directives. Created on first use.
    pub fn doppelganger(&mut self, id: ScopeId) -> ScopeId {
        let scope = self.get(id);
        if scope.kind == ScopeKind::Doppelganger {
            return id;
        }
        if let Some(existing) = scope.doppelganger {
            return existing;
        }
        let (namespace, parent, file) = (scope.namespace, scope.parent, scope.file);
        let shadow = self.create(ScopeKind::Doppelganger, namespace, parent, file);
        self.get_mut(shadow).close();
        self.get_mut(id).doppelganger = Some(shadow);
        shadow
    }

    /// Forget every cached directive resolution.
    pub fn reset_resolutions(&mut self) {
        for scope in &mut self.scopes {
            scope.reset_resolutions();
        }
    }

    pub fn clear(&mut self) {
        self.scopes.clear();
    }
}

#[cfg(test)]
#[path = "../tests/scope_tests.rs"]
mod tests;
