//! Tests for scopes, directives and name resolution.

use super::*;
use crate::Resolution;
use crate::namespace::NameTarget;
use crate::state::BinderState;
use crate::types::{TypeDecl, TypeId, TypeKind};
use sharpc_common::{Location, Report, diagnostic_codes};

const NULL: Location = Location::NULL;

fn declare_class(
    binder: &mut BinderState,
    scope: ScopeId,
    name: &str,
    report: &mut Report,
) -> TypeId {
    binder.declare_source_type(scope, TypeDecl::new(name, "", TypeKind::Class), report)
}

/// `namespace <ns> { class <name> {} }` in its own file.
fn declare_in_namespace(
    binder: &mut BinderState,
    file: u32,
    ns: &str,
    name: &str,
    report: &mut Report,
) -> TypeId {
    let root = binder.file_scope(file);
    let block = binder.open_namespace(root, ns);
    declare_class(binder, block, name, report)
}

#[test]
fn test_directive_ordering_errors() {
    let mut binder = BinderState::new();
    let mut report = Report::default();
    let scope = binder.file_scope(1);

    assert!(binder.add_extern_alias(scope, "first", NULL, &mut report));
    assert!(binder.add_using(scope, "System", NULL, &mut report));
    assert!(!binder.add_extern_alias(scope, "late", NULL, &mut report));
    assert!(!binder.add_extern_alias(scope, "global", NULL, &mut report));
    assert!(binder.add_alias(scope, "S", "System", NULL, &mut report));
    assert!(!binder.add_alias(scope, "S", "System.IO", NULL, &mut report));

    declare_class(&mut binder, scope, "Program", &mut report);
    assert!(!binder.add_using(scope, "System.IO", NULL, &mut report));

    assert_eq!(
        report.codes(),
        vec![
            diagnostic_codes::EXTERN_ALIAS_MUST_PRECEDE,
            diagnostic_codes::CANNOT_REDEFINE_GLOBAL_ALIAS,
            diagnostic_codes::DUPLICATE_USING_ALIAS,
            diagnostic_codes::USING_MUST_PRECEDE,
        ]
    );
    // Invalid directives are dropped.
    let scope = binder.scopes.get(scope);
    assert_eq!(scope.usings().len(), 1);
    assert_eq!(
        scope.aliases().map(|(name, _)| name).collect::<Vec<_>>(),
        vec!["first", "S"]
    );
    assert_eq!(scope.state(), ScopeState::Closed);
}

#[test]
fn test_duplicate_using_warns_at_level_three() {
    let mut binder = BinderState::new();
    let mut report = Report::default();
    let scope = binder.file_scope(1);
    assert!(binder.add_using(scope, "System", NULL, &mut report));
    assert!(!binder.add_using(scope, "System", NULL, &mut report));
    assert_eq!(report.warning_count(), 1);
    assert_eq!(report.codes(), vec![diagnostic_codes::DUPLICATE_USING_DIRECTIVE]);

    let mut quiet = Report::new(sharpc_common::ReportOptions {
        warning_level: 2,
        ..Default::default()
    });
    assert!(!binder.add_using(scope, "System", NULL, &mut quiet));
    assert!(quiet.diagnostics().is_empty());
}

#[test]
fn test_ambiguous_imports_report_exactly_once() {
    let mut binder = BinderState::new();
    let mut report = Report::default();
    declare_in_namespace(&mut binder, 1, "A", "Foo", &mut report);
    declare_in_namespace(&mut binder, 2, "B", "Foo", &mut report);

    let scope = binder.file_scope(3);
    binder.add_using(scope, "A", NULL, &mut report);
    binder.add_using(scope, "B", NULL, &mut report);

    let resolution = binder.lookup_simple(scope, "Foo", NULL, false, &mut report);
    assert_eq!(resolution, Ok(Resolution::Ambiguous));
    let codes = report.codes();
    assert_eq!(codes, vec![diagnostic_codes::AMBIGUOUS_REFERENCE], "got: {codes:?}");
    assert_eq!(
        report.diagnostics()[0].message_text,
        "'Foo' is an ambiguous reference between 'A.Foo' and 'B.Foo'"
    );
    assert_eq!(report.diagnostics()[0].related_symbols.len(), 2);
}

#[test]
fn test_silent_lookup_suppresses_ambiguity() {
    let mut binder = BinderState::new();
    let mut report = Report::default();
    declare_in_namespace(&mut binder, 1, "A", "Foo", &mut report);
    declare_in_namespace(&mut binder, 2, "B", "Foo", &mut report);
    let scope = binder.file_scope(3);
    binder.add_using(scope, "A", NULL, &mut report);
    binder.add_using(scope, "B", NULL, &mut report);

    let resolution = binder.lookup_simple(scope, "Foo", NULL, true, &mut report);
    assert_eq!(resolution, Ok(Resolution::Ambiguous));
    assert!(report.diagnostics().is_empty());
}

#[test]
fn test_local_namespace_member_wins_over_imports() {
    let mut binder = BinderState::new();
    let mut report = Report::default();
    declare_in_namespace(&mut binder, 1, "A", "Foo", &mut report);
    declare_in_namespace(&mut binder, 1, "B", "Foo", &mut report);

    let root = binder.file_scope(2);
    let block = binder.open_namespace(root, "App");
    binder.add_using(block, "A", NULL, &mut report);
    binder.add_using(block, "B", NULL, &mut report);
    let local = declare_class(&mut binder, block, "Foo", &mut report);

    let resolution = binder.lookup_simple(block, "Foo", NULL, false, &mut report);
    assert_eq!(resolution, Ok(Resolution::Found(NameTarget::Type(local))));
    assert!(report.diagnostics().is_empty());
}

#[test]
fn test_directives_do_not_see_sibling_directives() {
    let mut binder = BinderState::new();
    let mut report = Report::default();
    declare_in_namespace(&mut binder, 1, "Outer.Inner", "Thing", &mut report);

    // A using in the same block cannot use the block's own alias.
    let root = binder.file_scope(2);
    let block = binder.open_namespace(root, "N");
    binder.add_alias(block, "O", "Outer", NULL, &mut report);
    binder.add_using(block, "O.Inner", NULL, &mut report);
    binder.verify_directives(&mut report).unwrap();
    assert_eq!(report.codes(), vec![diagnostic_codes::TYPE_OR_NAMESPACE_NOT_FOUND]);
    assert!(binder.resolve_using(block, 0, &mut report).unwrap().is_none());

    // The same alias declared in the enclosing scope is visible.
    let mut report = Report::default();
    let root = binder.file_scope(3);
    binder.add_alias(root, "O", "Outer", NULL, &mut report);
    let block = binder.open_namespace(root, "M");
    binder.add_using(block, "O.Inner", NULL, &mut report);
    binder.verify_directives(&mut report).unwrap();
    assert!(report.diagnostics().is_empty(), "got: {:?}", report.codes());
    assert!(binder.resolve_using(block, 0, &mut report).unwrap().is_some());
}

#[test]
fn test_using_resolution_ignores_other_usings_of_the_block() {
    let outcome = |with_bar: bool| {
        let mut binder = BinderState::new();
        let mut report = Report::default();
        declare_in_namespace(&mut binder, 1, "Foo", "X", &mut report);
        declare_in_namespace(&mut binder, 1, "Bar.Foo", "Y", &mut report);
        let scope = binder.file_scope(2);
        if with_bar {
            binder.add_using(scope, "Bar", NULL, &mut report);
        }
        binder.add_using(scope, "Foo", NULL, &mut report);
        let index = usize::from(with_bar);
        let ns = binder.resolve_using(scope, index, &mut report).unwrap();
        ns.map(|ns| binder.namespaces.node(ns).full_name.clone())
    };
    assert_eq!(outcome(true), Some("Foo".to_string()));
    assert_eq!(outcome(false), Some("Foo".to_string()));
}

#[test]
fn test_using_of_namespace_declared_in_later_file() {
    let mut binder = BinderState::new();
    let mut report = Report::default();
    let first = binder.file_scope(1);
    binder.add_using(first, "Z", NULL, &mut report);
    declare_class(&mut binder, first, "Program", &mut report);

    let widget = declare_in_namespace(&mut binder, 2, "Z", "Widget", &mut report);

    binder.verify_directives(&mut report).unwrap();
    assert!(report.diagnostics().is_empty(), "got: {:?}", report.codes());
    assert_eq!(
        binder.lookup_simple(first, "Widget", NULL, false, &mut report),
        Ok(Resolution::Found(NameTarget::Type(widget)))
    );
}

#[test]
fn test_implicit_parent_scopes_are_searched() {
    let mut binder = BinderState::new();
    let mut report = Report::default();
    let helper = declare_in_namespace(&mut binder, 1, "Company", "Helper", &mut report);

    let root = binder.file_scope(2);
    let block = binder.open_namespace(root, "Company.Product.Core");
    let implicit = binder.scopes.get(block).parent.unwrap();
    assert_eq!(binder.scopes.get(implicit).kind, ScopeKind::Implicit);

    assert_eq!(
        binder.lookup_simple(block, "Helper", NULL, false, &mut report),
        Ok(Resolution::Found(NameTarget::Type(helper)))
    );
    assert_eq!(
        binder.lookup_simple(block, "Missing", NULL, false, &mut report),
        Ok(Resolution::NotFound)
    );
}

#[test]
fn test_missing_namespace_gets_assembly_hint() {
    let mut binder = BinderState::new();
    let mut report = Report::default();
    declare_in_namespace(&mut binder, 1, "System", "Console", &mut report);
    let scope = binder.file_scope(2);
    binder.add_using(scope, "System.Xml", NULL, &mut report);
    binder.verify_directives(&mut report).unwrap();

    assert_eq!(report.codes(), vec![diagnostic_codes::NAMESPACE_DOES_NOT_CONTAIN]);
    let message = &report.diagnostics()[0].message_text;
    assert!(
        message.starts_with("The type or namespace name 'Xml' does not exist in the namespace 'System'"),
        "{message}"
    );
    assert!(
        message.ends_with("Consider adding a reference to assembly 'System.Xml.dll'"),
        "{message}"
    );
}

#[test]
fn test_unknown_simple_name_reports_cs0246() {
    let mut binder = BinderState::new();
    let mut report = Report::default();
    let scope = binder.file_scope(1);
    let resolution = binder.resolve_type_name(scope, "Nope", NULL, &mut report);
    assert_eq!(resolution, Ok(None));
    assert_eq!(report.codes(), vec![diagnostic_codes::TYPE_OR_NAMESPACE_NOT_FOUND]);
}

#[test]
fn test_global_qualified_lookup() {
    let mut binder = BinderState::new();
    let mut report = Report::default();
    let widget = declare_in_namespace(&mut binder, 1, "App", "Widget", &mut report);
    let root = binder.file_scope(2);
    let block = binder.open_namespace(root, "Other");
    let shadow = declare_class(&mut binder, block, "App", &mut report);

    // Inside `Other`, `App` is the local class, but `global::App` is the namespace.
    assert_eq!(
        binder.lookup_qualified(block, "App", NULL, false, &mut report),
        Ok(Resolution::Found(NameTarget::Type(shadow)))
    );
    assert_eq!(
        binder.lookup_qualified(block, "global::App.Widget", NULL, false, &mut report),
        Ok(Resolution::Found(NameTarget::Type(widget)))
    );
    assert!(report.diagnostics().is_empty());
}

#[test]
fn test_unknown_alias_qualifier_reports_cs0432() {
    let mut binder = BinderState::new();
    let mut report = Report::default();
    let scope = binder.file_scope(1);
    let resolution = binder.resolve_namespace_or_type(scope, "nope::Thing", NULL, &mut report);
    assert_eq!(resolution, Ok(Resolution::NotFound));
    assert_eq!(report.codes(), vec![diagnostic_codes::ALIAS_NOT_FOUND]);
}

#[test]
fn test_using_naming_a_type_reports_cs0138() {
    let mut binder = BinderState::new();
    let mut report = Report::default();
    declare_in_namespace(&mut binder, 1, "System", "Console", &mut report);
    let scope = binder.file_scope(2);
    binder.add_using(scope, "System.Console", NULL, &mut report);
    binder.verify_directives(&mut report).unwrap();
    assert_eq!(
        report.codes(),
        vec![diagnostic_codes::USING_NAMESPACE_APPLIED_TO_TYPE]
    );
}

#[test]
fn test_extern_alias_resolves_to_alias_root() {
    let mut binder = BinderState::new();
    let mut report = Report::default();
    let api = binder
        .types
        .alloc(TypeDecl::new("Api", "Vendor", TypeKind::Class));
    binder.add_assembly_reference("vendor.dll", Some("v1"), vec![api]);

    let scope = binder.file_scope(1);
    binder.add_extern_alias(scope, "v1", NULL, &mut report);
    binder.add_extern_alias(scope, "v2", NULL, &mut report);

    // Aliased assemblies do not merge into the global namespace.
    assert_eq!(
        binder.lookup_qualified(scope, "Vendor.Api", NULL, false, &mut report),
        Ok(Resolution::NotFound)
    );
    assert_eq!(
        binder.lookup_qualified(scope, "v1::Vendor.Api", NULL, false, &mut report),
        Ok(Resolution::Found(NameTarget::Type(api)))
    );

    binder.verify_directives(&mut report).unwrap();
    assert_eq!(report.codes(), vec![diagnostic_codes::EXTERN_ALIAS_NOT_SPECIFIED]);
}

#[test]
fn test_alias_failure_is_reported_once() {
    let mut binder = BinderState::new();
    let mut report = Report::default();
    let scope = binder.file_scope(1);
    binder.add_alias(scope, "Missing", "Does.Not.Exist", NULL, &mut report);

    for _ in 0..3 {
        assert_eq!(
            binder.lookup_simple(scope, "Missing", NULL, false, &mut report),
            Ok(Resolution::NotFound)
        );
    }
    binder.verify_directives(&mut report).unwrap();
    assert_eq!(report.codes(), vec![diagnostic_codes::TYPE_OR_NAMESPACE_NOT_FOUND]);
}

#[test]
fn test_alias_conflicting_with_namespace_member_reports_cs0576() {
    let mut binder = BinderState::new();
    let mut report = Report::default();
    declare_in_namespace(&mut binder, 1, "System", "Console", &mut report);

    let root = binder.file_scope(2);
    let block = binder.open_namespace(root, "App");
    binder.add_alias(block, "Console", "System.Console", NULL, &mut report);
    declare_class(&mut binder, block, "Console", &mut report);
    binder.verify_directives(&mut report).unwrap();

    assert_eq!(
        report.codes(),
        vec![diagnostic_codes::NAMESPACE_CONFLICTS_WITH_ALIAS]
    );
}

#[test]
fn test_nested_type_lookup_and_cs0426() {
    let mut binder = BinderState::new();
    let mut report = Report::default();
    let outer = declare_in_namespace(&mut binder, 1, "App", "Outer", &mut report);
    let inner = binder.declare_nested_type(outer, TypeDecl::new("Inner", "", TypeKind::Class));
    assert_eq!(binder.types.full_name(inner), "App.Outer.Inner");

    let scope = binder.file_scope(2);
    assert_eq!(
        binder.resolve_type_name(scope, "App.Outer.Inner", NULL, &mut report),
        Ok(Some(inner))
    );
    assert_eq!(
        binder.resolve_type_name(scope, "App.Outer.Missing", NULL, &mut report),
        Ok(None)
    );
    assert_eq!(report.codes(), vec![diagnostic_codes::NESTED_TYPE_NOT_FOUND]);
    assert_eq!(
        report.diagnostics()[0].message_text,
        "The type name 'Missing' does not exist in the type 'App.Outer'"
    );
}

#[test]
fn test_verification_stops_when_halted() {
    let mut binder = BinderState::new();
    let mut report = Report::new(sharpc_common::ReportOptions {
        fatal: true,
        ..Default::default()
    });
    let first = binder.file_scope(1);
    binder.add_using(first, "Missing1", NULL, &mut report);
    let second = binder.file_scope(2);
    binder.add_using(second, "Missing2", NULL, &mut report);

    binder.verify_directives(&mut report).unwrap();
    assert_eq!(report.error_count(), 1);
    assert!(report.is_halted());
}

#[test]
fn test_doppelganger_is_created_once_and_has_no_directives() {
    let mut binder = BinderState::new();
    let mut report = Report::default();
    let root = binder.file_scope(1);
    let block = binder.open_namespace(root, "N");
    binder.add_using(block, "System", NULL, &mut report);

    let shadow = binder.scopes.doppelganger(block);
    assert_eq!(binder.scopes.doppelganger(block), shadow);
    assert_eq!(binder.scopes.doppelganger(shadow), shadow);
    let shadow_scope = binder.scopes.get(shadow);
    assert_eq!(shadow_scope.kind, ScopeKind::Doppelganger);
    assert_eq!(shadow_scope.namespace, binder.scopes.get(block).namespace);
    assert_eq!(shadow_scope.parent, binder.scopes.get(block).parent);
    assert!(shadow_scope.usings().is_empty());
}

#[test]
fn test_reset_clears_scopes_and_types() {
    let mut binder = BinderState::new();
    let mut report = Report::default();
    declare_in_namespace(&mut binder, 1, "A", "Foo", &mut report);
    binder.reset();
    assert!(binder.types.is_empty());
    assert!(binder.scopes.is_empty());
    assert_eq!(binder.namespaces.len(), 1);
    assert_eq!(binder.file_scope(1), ScopeId(0));
}
