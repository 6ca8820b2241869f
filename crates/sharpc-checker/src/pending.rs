//! Interface and abstract-member obligations of a type.
//!
//! [`PendingImplementation`] is built once per concrete type. It lists one
//! entry per required interface plus, when the nearest base class is
//! abstract, one entry holding every abstract member still not overridden
//! along the base chain. Declared members then clear slots
//! ([`PendingImplementation::define_member`]) and [`verify_all`] reports what
//! is left, synthesizing forwarding proxies where a base class already has a
//! matching public method.
//!
//! [`verify_all`]: PendingImplementation::verify_all

use crate::proxy::ProxyMember;
use rustc_hash::FxHashSet;
use serde::Serialize;
use sharpc_binder::{
    AccessorKind, MemberDecl, MemberId, MemberKind, MethodSignature, ParamType, TypeArena, TypeId,
    TypeRef,
};
use sharpc_common::{
    InternalError, Location, Report, diagnostic_codes, diagnostic_messages, format_message,
};
use tracing::{debug, trace};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EntryKind {
    Interface(TypeId),
    /// Abstract members inherited through the base chain.
    AbstractBase,
}

/// One method (or accessor) obligation.
#[derive(Clone, Debug)]
pub struct Slot {
    pub signature: MethodSignature,
    /// Interface or abstract member declaring the obligation.
    pub member: MemberId,
    pub declaring_type: TypeId,
    pub accessor: AccessorKind,
    pub is_indexer: bool,
    pub implemented: bool,
    /// Same-signature member rejected as static, non-public or returning the
    /// wrong type.
    pub found: Option<MemberId>,
    /// Indexer whose accessor name differs from the slot's.
    pub needs_proxy: Option<MemberId>,
}

#[derive(Clone, Debug)]
pub struct PendingEntry {
    pub kind: EntryKind,
    /// A base class already implements the interface.
    pub optional: bool,
    pub slots: Vec<Slot>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SlotFilter {
    All,
    Interface(TypeId),
    Interfaces,
    AbstractBase,
}

impl SlotFilter {
    fn accepts(self, kind: EntryKind) -> bool {
        match (self, kind) {
            (SlotFilter::All, _) => true,
            (SlotFilter::Interface(want), EntryKind::Interface(have)) => want == have,
            (SlotFilter::Interfaces, EntryKind::Interface(_)) => true,
            (SlotFilter::AbstractBase, EntryKind::AbstractBase) => true,
            _ => false,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MatchMode {
    /// Report the first match; change nothing.
    Lookup,
    /// Mark the first match implemented.
    ClearOne,
    /// Mark every match implemented.
    ClearAll,
}

/// A member signature offered against the pending slots.
#[derive(Copy, Clone, Debug)]
pub struct SlotQuery<'a> {
    pub signature: &'a MethodSignature,
    pub accessor: AccessorKind,
    pub is_indexer: bool,
    pub member: MemberId,
    /// Public (or explicit) and non-static.
    pub eligible: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SlotRef {
    pub entry: usize,
    pub slot: usize,
}

#[derive(Debug)]
pub struct PendingImplementation {
    pub ty: TypeId,
    pub entries: Vec<PendingEntry>,
    proxies: Vec<ProxyMember>,
}

impl PendingImplementation {
    pub fn new(types: &TypeArena, ty: TypeId) -> Result<Self, InternalError> {
        let decl = types.get(ty).ok_or_else(|| InternalError::unknown("type", ty.0))?;
        let bases = types.base_chain(ty);
        let mut entries = Vec::new();

        for iface in types.interface_closure(ty) {
            let optional = bases.iter().any(|&b| types.implements_interface(b, iface));
            let indexer_name = &types[iface].indexer_name;
            let slots = types
                .members_of(iface)
                .filter(|(_, m)| !m.is_static())
                .flat_map(|(id, m)| slots_of(iface, id, m, indexer_name))
                .collect();
            entries.push(PendingEntry {
                kind: EntryKind::Interface(iface),
                optional,
                slots,
            });
        }

        let nearest_abstract = decl
            .base
            .and_then(|b| types.get(b))
            .is_some_and(|b| b.is_abstract());
        if !decl.is_abstract() && nearest_abstract {
            let slots = abstract_slots(types, &bases);
            if !slots.is_empty() {
                entries.push(PendingEntry {
                    kind: EntryKind::AbstractBase,
                    optional: false,
                    slots,
                });
            }
        }

        debug!(
            ty = %types.full_name(ty),
            entries = entries.len(),
            slots = entries.iter().map(|e| e.slots.len()).sum::<usize>(),
            "pending implementation set"
        );
        Ok(PendingImplementation {
            ty,
            entries,
            proxies: Vec::new(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn slot(&self, at: SlotRef) -> Option<&Slot> {
        self.entries.get(at.entry)?.slots.get(at.slot)
    }

    fn has_interface(&self, iface: TypeId) -> bool {
        self.entries
            .iter()
            .any(|e| e.kind == EntryKind::Interface(iface))
    }

    /// Match `query` against the open slots selected by `filter`.
    ///
    /// With an [`SlotFilter::Interface`] filter the scan stops after that
    /// interface's entry. Same-signature candidates that are ineligible or
    /// return the wrong type are remembered in [`Slot::found`] by the
    /// clearing modes but never match.
    pub fn interface_method(
        &mut self,
        filter: SlotFilter,
        query: &SlotQuery<'_>,
        mode: MatchMode,
    ) -> Option<SlotRef> {
        let mut first = None;
        for (entry_index, entry) in self.entries.iter_mut().enumerate() {
            if !filter.accepts(entry.kind) {
                continue;
            }
            for (slot_index, slot) in entry.slots.iter_mut().enumerate() {
                if slot.implemented || !same_shape(slot, query) {
                    continue;
                }
                let returns = same_return(&slot.signature.return_type, &query.signature.return_type);
                if !query.eligible || !returns {
                    if mode != MatchMode::Lookup {
                        slot.found = Some(query.member);
                    }
                    continue;
                }
                let at = SlotRef {
                    entry: entry_index,
                    slot: slot_index,
                };
                match mode {
                    MatchMode::Lookup => return Some(at),
                    MatchMode::ClearOne | MatchMode::ClearAll => {
                        if slot.is_indexer && slot.signature.name != query.signature.name {
                            trace!(slot = %slot.signature.name, "indexer accessor name differs");
                            slot.needs_proxy = Some(query.member);
                        } else {
                            slot.implemented = true;
                        }
                        if mode == MatchMode::ClearOne {
                            return Some(at);
                        }
                        first.get_or_insert(at);
                    }
                }
            }
            if matches!(filter, SlotFilter::Interface(_)) {
                break;
            }
        }
        first
    }

    /// Offer a member declared on the type to the pending slots.
    ///
    /// Explicit implementations clear one slot of their interface (CS0540 if
    /// the type does not implement it, CS0539 if nothing matches). Overrides
    /// clear abstract slots; every other member, overrides included, clears
    /// each matching interface slot.
    pub fn define_member(&mut self, types: &TypeArena, id: MemberId, report: &mut Report) {
        let member = types.member(id);
        let indexer_name = &types[member.owner].indexer_name;
        let accessors = member.accessors(indexer_name);
        let is_indexer = member.is_indexer();

        if let Some(iface) = member.explicit_interface {
            let display = format!(
                "{}.{}.{}",
                types.full_name(member.owner),
                types.full_name(iface),
                member.name
            );
            if !self.has_interface(iface) {
                report.error(
                    diagnostic_codes::CONTAINING_TYPE_DOES_NOT_IMPLEMENT,
                    member.location,
                    format_message(
                        diagnostic_messages::CONTAINING_TYPE_DOES_NOT_IMPLEMENT,
                        &[&display, &types.full_name(iface)],
                    ),
                );
                return;
            }
            let mut matched = !accessors.is_empty();
            for accessor in &accessors {
                let query = SlotQuery {
                    signature: &accessor.signature,
                    accessor: accessor.kind,
                    is_indexer,
                    member: id,
                    eligible: !member.is_static(),
                };
                matched &= self
                    .interface_method(SlotFilter::Interface(iface), &query, MatchMode::ClearOne)
                    .is_some();
            }
            if !matched {
                report.error(
                    diagnostic_codes::EXPLICIT_MEMBER_NOT_IN_INTERFACE,
                    member.location,
                    format_message(
                        diagnostic_messages::EXPLICIT_MEMBER_NOT_IN_INTERFACE,
                        &[&display],
                    ),
                );
            }
            return;
        }

        let mut passes = Vec::with_capacity(2);
        if member.is_override() {
            passes.push((SlotFilter::AbstractBase, !member.is_static()));
        }
        passes.push((
            SlotFilter::Interfaces,
            member.is_public() && !member.is_static(),
        ));
        for (filter, eligible) in passes {
            for accessor in &accessors {
                let query = SlotQuery {
                    signature: &accessor.signature,
                    accessor: accessor.kind,
                    is_indexer,
                    member: id,
                    eligible,
                };
                self.interface_method(filter, &query, MatchMode::ClearAll);
            }
        }
    }

    /// Report every slot still open. Returns whether an error was reported.
    pub fn verify_all(&mut self, types: &TypeArena, report: &mut Report) -> bool {
        let ty = self.ty;
        let type_name = types.full_name(ty);
        let at = types[ty].location;
        let mut failed = false;
        let mut proxies = Vec::new();

        for entry in &mut self.entries {
            for slot in entry.slots.iter_mut().filter(|s| !s.implemented) {
                let EntryKind::Interface(iface) = entry.kind else {
                    report_slot(
                        types,
                        report,
                        diagnostic_codes::INHERITED_ABSTRACT_NOT_IMPLEMENTED,
                        diagnostic_messages::INHERITED_ABSTRACT_NOT_IMPLEMENTED,
                        &[&type_name, &slot_display(types, slot)],
                        slot,
                        at,
                    );
                    failed = true;
                    continue;
                };

                if let Some(target) = slot.needs_proxy {
                    let target_method = indexer_accessor_name(types, target, slot.accessor)
                        .unwrap_or_else(|| slot.signature.name.clone());
                    proxies.push(ProxyMember::new(
                        types,
                        ty,
                        iface,
                        slot.member,
                        &slot.signature,
                        target,
                        &target_method,
                    ));
                    slot.implemented = true;
                    continue;
                }

                if let Some((base, target)) = base_implementation(types, ty, &slot.signature) {
                    if !types.implements_interface(base, iface) {
                        proxies.push(ProxyMember::new(
                            types,
                            ty,
                            iface,
                            slot.member,
                            &slot.signature,
                            target,
                            &slot.signature.name,
                        ));
                    }
                    slot.implemented = true;
                    continue;
                }

                if entry.optional {
                    continue;
                }

                let display = slot_display(types, slot);
                failed = true;
                match slot.found {
                    Some(found) => report_slot(
                        types,
                        report,
                        diagnostic_codes::INTERFACE_MEMBER_WRONG_CANDIDATE,
                        diagnostic_messages::INTERFACE_MEMBER_WRONG_CANDIDATE,
                        &[&type_name, &display, &types.member_display(found)],
                        slot,
                        at,
                    ),
                    None => report_slot(
                        types,
                        report,
                        diagnostic_codes::INTERFACE_MEMBER_NOT_IMPLEMENTED,
                        diagnostic_messages::INTERFACE_MEMBER_NOT_IMPLEMENTED,
                        &[&type_name, &display],
                        slot,
                        at,
                    ),
                }
            }
        }

        for proxy in &proxies {
            debug!(proxy = %proxy.describe(types), "synthesized forwarding member");
        }
        self.proxies.extend(proxies);
        failed
    }

    pub fn proxies(&self) -> &[ProxyMember] {
        &self.proxies
    }

    pub fn take_proxies(&mut self) -> Vec<ProxyMember> {
        std::mem::take(&mut self.proxies)
    }
}

// =============================================================================
// Per-type check
// =============================================================================

/// Outcome of checking one type's obligations.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImplementationReport {
    pub ty: TypeId,
    pub passed: bool,
    /// Errors reported while checking this type.
    pub errors: usize,
    pub proxies: Vec<ProxyMember>,
}

/// Build the pending set of `ty`, offer it every declared member and verify
/// what remains.
pub fn check_type_implementations(
    types: &TypeArena,
    ty: TypeId,
    report: &mut Report,
) -> Result<ImplementationReport, InternalError> {
    let errors_before = report.error_count();
    let mut pending = PendingImplementation::new(types, ty)?;
    let members: Vec<MemberId> = types[ty].members.clone();
    for member in members {
        pending.define_member(types, member, report);
    }
    pending.verify_all(types, report);
    let errors = report.error_count() - errors_before;
    Ok(ImplementationReport {
        ty,
        passed: errors == 0,
        errors,
        proxies: pending.take_proxies(),
    })
}

// =============================================================================
// Helpers
// =============================================================================

fn slots_of(owner: TypeId, id: MemberId, member: &MemberDecl, indexer_name: &str) -> Vec<Slot> {
    member
        .accessors(indexer_name)
        .into_iter()
        .map(|accessor| Slot {
            signature: accessor.signature,
            member: id,
            declaring_type: owner,
            accessor: accessor.kind,
            is_indexer: member.is_indexer(),
            implemented: false,
            found: None,
            needs_proxy: None,
        })
        .collect()
}

/// Abstract members along `bases` (nearest first) not overridden by a
/// nearer class.
fn abstract_slots(types: &TypeArena, bases: &[TypeId]) -> Vec<Slot> {
    let mut covered: FxHashSet<(String, Vec<ParamType>)> = FxHashSet::default();
    let mut slots = Vec::new();
    for &base in bases {
        let indexer_name = &types[base].indexer_name;
        for (id, member) in types.members_of(base) {
            let keys: Vec<_> = member
                .accessors(indexer_name)
                .into_iter()
                .map(|a| (a.signature.name.clone(), a.signature.parameters.clone()))
                .collect();
            if member.is_abstract() {
                for slot in slots_of(base, id, member, indexer_name) {
                    let key = (slot.signature.name.clone(), slot.signature.parameters.clone());
                    if !covered.contains(&key) {
                        slots.push(slot);
                    }
                }
            }
            if member.is_abstract() || member.is_override() {
                covered.extend(keys);
            }
        }
    }
    slots
}

fn same_shape(slot: &Slot, query: &SlotQuery<'_>) -> bool {
    let name_matches = if slot.is_indexer && query.is_indexer {
        slot.accessor == query.accessor
    } else {
        slot.signature.name == query.signature.name
    };
    name_matches && slot.signature.same_parameters(&query.signature.parameters)
}

fn same_return(expected: &TypeRef, actual: &TypeRef) -> bool {
    expected == actual
        || matches!(
            (expected, actual),
            (TypeRef::Void, TypeRef::Null) | (TypeRef::Null, TypeRef::Void)
        )
}

/// A concrete public instance method with exactly `signature` on a base
/// class of `ty`, with the base that declares it.
fn base_implementation(
    types: &TypeArena,
    ty: TypeId,
    signature: &MethodSignature,
) -> Option<(TypeId, MemberId)> {
    types.base_chain(ty).into_iter().find_map(|base| {
        let indexer_name = &types[base].indexer_name;
        types
            .members_of(base)
            .find(|(_, m)| {
                m.is_public()
                    && !m.is_static()
                    && !m.is_abstract()
                    && m.accessors(indexer_name).iter().any(|a| &a.signature == signature)
            })
            .map(|(id, _)| (base, id))
    })
}

fn indexer_accessor_name(types: &TypeArena, member: MemberId, kind: AccessorKind) -> Option<String> {
    let decl = types.member(member);
    decl.accessors(&types[decl.owner].indexer_name)
        .into_iter()
        .find(|a| a.kind == kind)
        .map(|a| a.signature.name)
}

/// `I.M(int)` for methods, `I.P.get` for accessors.
fn slot_display(types: &TypeArena, slot: &Slot) -> String {
    let suffix = match slot.accessor {
        AccessorKind::Method => return types.signature_display(slot.declaring_type, &slot.signature),
        AccessorKind::Getter => "get",
        AccessorKind::Setter => "set",
        AccessorKind::Adder => "add",
        AccessorKind::Remover => "remove",
    };
    let member = types.member(slot.member);
    let name = match member.kind {
        MemberKind::Indexer { .. } => "this",
        _ => member.name.as_str(),
    };
    format!("{}.{}.{}", types.full_name(slot.declaring_type), name, suffix)
}

fn report_slot(
    types: &TypeArena,
    report: &mut Report,
    code: i32,
    template: &str,
    args: &[&str],
    slot: &Slot,
    at: Location,
) {
    let declared = types.member(slot.member);
    report.symbol_related_to_previous_error(declared.location, slot_display(types, slot));
    report.error(code, at, format_message(template, args));
}

#[cfg(test)]
#[path = "../tests/pending_tests.rs"]
mod tests;
