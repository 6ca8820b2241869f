//! Name resolution over scopes, aliases and using directives.
//!
//! A simple name is looked up scope by scope, walking outward through
//! enclosing (including implicit) scopes. At each scope:
//!
//! 1. the scope's namespace node (nested namespace or type) wins outright;
//! 2. then an alias declared in that scope;
//! 3. then the types imported by the scope's using directives. More than one
//!    distinct import is an ambiguity (CS0104) and stops the walk.
//!
//! Using and alias targets are resolved through the declaring scope's
//! doppelganger, so a directive never sees its siblings.

use crate::lazy::Begin;
use crate::namespace::{NameTarget, NamespaceId};
use crate::scope::{AliasTarget, ScopeId};
use crate::state::BinderState;
use crate::types::TypeId;
use sharpc_common::{
    InternalError, Location, Report, diagnostic_codes, diagnostic_messages, format_message,
};
use smallvec::SmallVec;
use tracing::{debug, trace};

/// Outcome of a name lookup.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    Found(NameTarget),
    /// Several using directives import a type of that name.
    Ambiguous,
    NotFound,
}

impl Resolution {
    pub const fn target(self) -> Option<NameTarget> {
        match self {
            Resolution::Found(target) => Some(target),
            _ => None,
        }
    }

    pub const fn is_found(self) -> bool {
        matches!(self, Resolution::Found(_))
    }
}

/// Namespaces that historically lived in an assembly that is not referenced
/// by default.
const ASSEMBLY_HINTS: &[(&str, &str)] = &[
    ("System.Xml", "System.Xml.dll"),
    ("System.Drawing", "System.Drawing.dll"),
    ("System.Windows.Forms", "System.Windows.Forms.dll"),
    ("System.Web", "System.Web.dll"),
    ("System.Data", "System.Data.dll"),
    ("System.Linq", "System.Core.dll"),
    ("System.Numerics", "System.Numerics.dll"),
    ("System.Net.Http", "System.Net.Http.dll"),
];

fn assembly_hint(dotted: &str) -> Option<&'static str> {
    ASSEMBLY_HINTS.iter().find_map(|&(namespace, assembly)| {
        let matches = dotted == namespace
            || dotted
                .strip_prefix(namespace)
                .is_some_and(|rest| rest.starts_with('.'));
        matches.then_some(assembly)
    })
}

/// Where a qualified walk stopped.
#[derive(Clone, Debug)]
enum Miss {
    /// The first segment of `dotted` was not found anywhere in scope.
    Simple { name: String, dotted: String },
    InNamespace(NamespaceId, String),
    InType(TypeId, String),
    UnknownAlias(String),
    /// A diagnostic was already issued further down.
    Reported,
}

enum Walk {
    Found(NameTarget),
    Ambiguous,
    Missing(Miss),
}

impl BinderState {
    /// Resolve a simple (undotted) name from `scope`.
    ///
    /// `silent` lookups are speculative: ambiguity is not reported.
    pub fn lookup_simple(
        &mut self,
        scope: ScopeId,
        name: &str,
        loc: Location,
        silent: bool,
        report: &mut Report,
    ) -> Result<Resolution, InternalError> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let ns = self.scopes.get(id).namespace;
            if let Some(target) = self
                .namespaces
                .lookup(ns, name, loc, &self.types, report)?
            {
                return Ok(Resolution::Found(target));
            }

            if self.scopes.get(id).alias(name).is_some() {
                return Ok(match self.resolve_alias(id, name, report)? {
                    Some(target) => Resolution::Found(target),
                    None => Resolution::NotFound,
                });
            }

            if let Some(resolution) = self.lookup_in_usings(id, name, loc, silent, report)? {
                return Ok(resolution);
            }
            current = self.scopes.get(id).parent;
        }
        Ok(Resolution::NotFound)
    }

    fn lookup_in_usings(
        &mut self,
        scope: ScopeId,
        name: &str,
        loc: Location,
        silent: bool,
        report: &mut Report,
    ) -> Result<Option<Resolution>, InternalError> {
        let mut matches: SmallVec<[TypeId; 2]> = SmallVec::new();
        for index in 0..self.scopes.get(scope).usings.len() {
            let Some(ns) = self.resolve_using(scope, index, report)? else {
                continue;
            };
            if let Some(ty) = self
                .namespaces
                .lookup_type(ns, name, loc, &self.types, report)?
                && !matches.contains(&ty)
            {
                matches.push(ty);
            }
        }

        match matches.as_slice() {
            [] => Ok(None),
            [ty] => Ok(Some(Resolution::Found(NameTarget::Type(*ty)))),
            [first, second, ..] => {
                if !silent {
                    for &ty in &matches {
                        report.symbol_related_to_previous_error(
                            self.types[ty].location,
                            self.types.full_name(ty),
                        );
                    }
                    report.error(
                        diagnostic_codes::AMBIGUOUS_REFERENCE,
                        loc,
                        format_message(
                            diagnostic_messages::AMBIGUOUS_REFERENCE,
                            &[
                                name,
                                &self.types.full_name(*first),
                                &self.types.full_name(*second),
                            ],
                        ),
                    );
                }
                Ok(Some(Resolution::Ambiguous))
            }
        }
    }

    /// Resolve a possibly dotted or alias-qualified name without reporting
    /// anything when it is missing.
    pub fn lookup_qualified(
        &mut self,
        scope: ScopeId,
        name: &str,
        loc: Location,
        silent: bool,
        report: &mut Report,
    ) -> Result<Resolution, InternalError> {
        Ok(match self.walk(scope, name, loc, silent, report)? {
            Walk::Found(target) => Resolution::Found(target),
            Walk::Ambiguous => Resolution::Ambiguous,
            Walk::Missing(_) => Resolution::NotFound,
        })
    }

    /// Resolve a namespace-or-type name, reporting CS0246, CS0234, CS0426 or
    /// CS0432 when it cannot be found.
    pub fn resolve_namespace_or_type(
        &mut self,
        scope: ScopeId,
        name: &str,
        loc: Location,
        report: &mut Report,
    ) -> Result<Resolution, InternalError> {
        Ok(match self.walk(scope, name, loc, false, report)? {
            Walk::Found(target) => Resolution::Found(target),
            Walk::Ambiguous => Resolution::Ambiguous,
            Walk::Missing(miss) => {
                self.report_not_found(miss, loc, report);
                Resolution::NotFound
            }
        })
    }

    /// Resolve a name that must denote a type.
    pub fn resolve_type_name(
        &mut self,
        scope: ScopeId,
        name: &str,
        loc: Location,
        report: &mut Report,
    ) -> Result<Option<TypeId>, InternalError> {
        match self.resolve_namespace_or_type(scope, name, loc, report)? {
            Resolution::Found(NameTarget::Type(ty)) => Ok(Some(ty)),
            Resolution::Found(NameTarget::Namespace(ns)) => {
                debug!(name, namespace = %self.namespaces.node(ns).full_name, "namespace used as a type");
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    fn walk(
        &mut self,
        scope: ScopeId,
        name: &str,
        loc: Location,
        silent: bool,
        report: &mut Report,
    ) -> Result<Walk, InternalError> {
        let (mut current, rest) = match name.split_once("::") {
            Some((alias, rest)) => {
                let start = if alias == "global" {
                    Some(NameTarget::Namespace(self.namespaces.global()))
                } else {
                    match self.find_alias_scope(scope, alias) {
                        Some(owner) => match self.resolve_alias(owner, alias, report)? {
                            Some(target) => Some(target),
                            None => return Ok(Walk::Missing(Miss::Reported)),
                        },
                        None => None,
                    }
                };
                match start {
                    Some(start) => (start, rest),
                    None => return Ok(Walk::Missing(Miss::UnknownAlias(alias.to_string()))),
                }
            }
            None => {
                let (first, rest) = name.split_once('.').unwrap_or((name, ""));
                match self.lookup_simple(scope, first, loc, silent, report)? {
                    Resolution::Found(target) => (target, rest),
                    Resolution::Ambiguous => return Ok(Walk::Ambiguous),
                    Resolution::NotFound => {
                        return Ok(Walk::Missing(Miss::Simple {
                            name: first.to_string(),
                            dotted: name.to_string(),
                        }));
                    }
                }
            }
        };

        for segment in rest.split('.').filter(|s| !s.is_empty()) {
            current = match current {
                NameTarget::Namespace(ns) => {
                    match self
                        .namespaces
                        .lookup(ns, segment, loc, &self.types, report)?
                    {
                        Some(target) => target,
                        None => {
                            return Ok(Walk::Missing(Miss::InNamespace(ns, segment.to_string())));
                        }
                    }
                }
                NameTarget::Type(ty) => match self.types.nested_type(ty, segment) {
                    Some(nested) => NameTarget::Type(nested),
                    None => return Ok(Walk::Missing(Miss::InType(ty, segment.to_string()))),
                },
            };
        }
        Ok(Walk::Found(current))
    }

    /// The nearest scope, walking outward, that declares alias `name`.
    fn find_alias_scope(&self, scope: ScopeId, name: &str) -> Option<ScopeId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = self.scopes.get(id);
            if scope.alias(name).is_some() {
                return Some(id);
            }
            current = scope.parent;
        }
        None
    }

    fn report_not_found(&self, miss: Miss, loc: Location, report: &mut Report) {
        match miss {
            Miss::Reported => {}
            Miss::UnknownAlias(alias) => report.error(
                diagnostic_codes::ALIAS_NOT_FOUND,
                loc,
                format_message(diagnostic_messages::ALIAS_NOT_FOUND, &[&alias]),
            ),
            Miss::InType(ty, name) => report.error(
                diagnostic_codes::NESTED_TYPE_NOT_FOUND,
                loc,
                format_message(
                    diagnostic_messages::NESTED_TYPE_NOT_FOUND,
                    &[&name, &self.types.full_name(ty)],
                ),
            ),
            Miss::InNamespace(ns, name) => {
                let namespace = &self.namespaces.node(ns).full_name;
                if namespace.is_empty() {
                    report_missing_simple(&name, &name, loc, report);
                    return;
                }
                let dotted = format!("{namespace}.{name}");
                let mut message = format_message(
                    diagnostic_messages::NAMESPACE_DOES_NOT_CONTAIN,
                    &[&name, namespace],
                );
                append_hint(&mut message, &dotted);
                report.error(diagnostic_codes::NAMESPACE_DOES_NOT_CONTAIN, loc, message);
            }
            Miss::Simple { name, dotted } => report_missing_simple(&name, &dotted, loc, report),
        }
    }

    // =========================================================================
    // Directives
    // =========================================================================

    /// Resolve the `index`-th using directive of `scope`. Memoized; failures
    /// are reported once.
    pub fn resolve_using(
        &mut self,
        scope: ScopeId,
        index: usize,
        report: &mut Report,
    ) -> Result<Option<NamespaceId>, InternalError> {
        let using = &mut self.scopes.get_mut(scope).usings[index];
        match using.resolved.begin() {
            Begin::Ready(value) => return Ok(value),
            Begin::Cycle => return Ok(None),
            Begin::Started => {}
        }
        let (name, loc) = (using.name.clone(), using.location);
        trace!(using = %name, ?scope, "resolving using directive");

        let shadow = self.scopes.doppelganger(scope);
        let resolution = self.resolve_namespace_or_type(shadow, &name, loc, report);
        let value = match resolution {
            Ok(Resolution::Found(NameTarget::Namespace(ns))) => Some(ns),
            Ok(Resolution::Found(NameTarget::Type(ty))) => {
                report.symbol_related_to_previous_error(
                    self.types[ty].location,
                    self.types.full_name(ty),
                );
                report.error(
                    diagnostic_codes::USING_NAMESPACE_APPLIED_TO_TYPE,
                    loc,
                    format_message(
                        diagnostic_messages::USING_NAMESPACE_APPLIED_TO_TYPE,
                        &[&self.types.full_name(ty)],
                    ),
                );
                None
            }
            Ok(_) => None,
            Err(err) => {
                self.scopes.get_mut(scope).usings[index].resolved.finish(None);
                return Err(err);
            }
        };
        self.scopes.get_mut(scope).usings[index]
            .resolved
            .finish(value);
        Ok(value)
    }

    /// Resolve alias `name` declared in `scope`. Memoized; failures are
    /// reported once.
    pub fn resolve_alias(
        &mut self,
        scope: ScopeId,
        name: &str,
        report: &mut Report,
    ) -> Result<Option<NameTarget>, InternalError> {
        let Some(alias) = self.scopes.get_mut(scope).aliases.get_mut(name) else {
            return Ok(None);
        };
        match alias.resolved.begin() {
            Begin::Ready(value) => return Ok(value),
            Begin::Cycle => return Ok(None),
            Begin::Started => {}
        }
        let (target, loc) = (alias.target.clone(), alias.location);
        trace!(alias = name, ?target, "resolving alias");

        let value = match target {
            AliasTarget::ExternRoot => match self.namespaces.extern_alias(name) {
                Some(root) => Some(NameTarget::Namespace(self.namespaces.root(root).node)),
                None => {
                    report.error(
                        diagnostic_codes::EXTERN_ALIAS_NOT_SPECIFIED,
                        loc,
                        format_message(diagnostic_messages::EXTERN_ALIAS_NOT_SPECIFIED, &[name]),
                    );
                    None
                }
            },
            AliasTarget::Name(target) => {
                let shadow = self.scopes.doppelganger(scope);
                match self.resolve_namespace_or_type(shadow, &target, loc, report) {
                    Ok(resolution) => resolution.target(),
                    Err(err) => {
                        self.finish_alias(scope, name, None);
                        return Err(err);
                    }
                }
            }
        };
        self.finish_alias(scope, name, value);
        Ok(value)
    }

    fn finish_alias(&mut self, scope: ScopeId, name: &str, value: Option<NameTarget>) {
        if let Some(alias) = self.scopes.get_mut(scope).aliases.get_mut(name) {
            alias.resolved.finish(value);
        }
    }

    /// Resolve every directive of every scope. Runs once all files have been
    /// registered, so a using may name a namespace declared in a later file.
    ///
    /// Also reports aliases that clash with a member of their namespace
    /// (CS0576). Stops early when the report is halted.
    pub fn verify_directives(&mut self, report: &mut Report) -> Result<(), InternalError> {
        let scopes: Vec<ScopeId> = self.scopes.ids().collect();
        for scope in scopes {
            if report.is_halted() {
                debug!("directive verification halted");
                break;
            }
            if !self.scopes.get(scope).has_directives() {
                continue;
            }
            for index in 0..self.scopes.get(scope).usings.len() {
                self.resolve_using(scope, index, report)?;
            }

            let aliases: Vec<(String, bool, Location)> = self
                .scopes
                .get(scope)
                .aliases()
                .map(|(name, alias)| (name.to_string(), alias.is_extern(), alias.location))
                .collect();
            let ns = self.scopes.get(scope).namespace;
            for (name, is_extern, loc) in aliases {
                self.resolve_alias(scope, &name, report)?;
                if !is_extern && self.namespaces.node(ns).has_member(&name) {
                    let namespace = &self.namespaces.node(ns).full_name;
                    report.error(
                        diagnostic_codes::NAMESPACE_CONFLICTS_WITH_ALIAS,
                        loc,
                        format_message(
                            diagnostic_messages::NAMESPACE_CONFLICTS_WITH_ALIAS,
                            &[namespace, &name],
                        ),
                    );
                }
            }
        }
        Ok(())
    }
}

fn report_missing_simple(name: &str, dotted: &str, loc: Location, report: &mut Report) {
    let mut message = format_message(diagnostic_messages::TYPE_OR_NAMESPACE_NOT_FOUND, &[name]);
    append_hint(&mut message, dotted);
    report.error(diagnostic_codes::TYPE_OR_NAMESPACE_NOT_FOUND, loc, message);
}

fn append_hint(message: &mut String, dotted: &str) {
    if let Some(assembly) = assembly_hint(dotted) {
        message.push(' ');
        message.push_str(&format_message(
            diagnostic_messages::CONSIDER_ADDING_ASSEMBLY_REFERENCE,
            &[assembly],
        ));
    }
}
