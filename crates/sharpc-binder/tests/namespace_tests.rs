//! Tests for the namespace tree.

use super::*;
use crate::types::{Modifiers, TypeArena, TypeDecl, TypeKind};
use sharpc_common::diagnostic_codes;

fn class(types: &mut TypeArena, namespace: &str, name: &str) -> TypeId {
    types.alloc(TypeDecl::new(name, namespace, TypeKind::Class))
}

#[test]
fn test_dotted_child_creates_one_node_per_path() {
    let mut tree = NamespaceTree::new();
    let global = tree.global();
    let abc = tree.get_or_create_child(global, "A.B.C");
    let again = tree.get_or_create_child(global, "A.B.C");
    assert_eq!(abc, again);
    assert_eq!(tree.node(abc).full_name, "A.B.C");
    assert_eq!(tree.node(abc).name, "C");

    let ab = tree.find_namespace(global, "A.B").unwrap();
    assert_eq!(tree.node(abc).parent, Some(ab));
    assert_eq!(tree.get_or_create_child(ab, "C"), abc);
    assert_eq!(tree.get_or_create_child(ab, ""), ab);
    // global + A + A.B + A.B.C
    assert_eq!(tree.len(), 4);
}

#[test]
fn test_lookup_finds_child_namespace_and_declared_type() {
    let mut tree = NamespaceTree::new();
    let mut types = TypeArena::new();
    let mut report = Report::default();
    let global = tree.global();
    let system = tree.get_or_create_child(global, "System");
    let collections = tree.get_or_create_child(system, "Collections");
    let console = class(&mut types, "System", "Console");
    assert!(tree.declare_type(system, console, &types, &mut report));

    assert_eq!(
        tree.lookup(system, "Collections", Location::NULL, &types, &mut report),
        Ok(Some(NameTarget::Namespace(collections)))
    );
    assert_eq!(
        tree.lookup(system, "Console", Location::NULL, &types, &mut report),
        Ok(Some(NameTarget::Type(console)))
    );
    assert_eq!(
        tree.lookup(system, "Missing", Location::NULL, &types, &mut report),
        Ok(None)
    );
    assert_eq!(report.error_count(), 0);
}

#[test]
fn test_duplicate_source_type_reports_cs0101() {
    let mut tree = NamespaceTree::new();
    let mut types = TypeArena::new();
    let mut report = Report::default();
    let ns = tree.get_or_create_child(tree.global(), "App");
    let first = class(&mut types, "App", "Widget");
    let second = class(&mut types, "App", "Widget");

    assert!(tree.declare_type(ns, first, &types, &mut report));
    assert!(!tree.declare_type(ns, second, &types, &mut report));
    assert_eq!(
        report.codes(),
        vec![diagnostic_codes::NAMESPACE_ALREADY_CONTAINS_DEFINITION]
    );
    assert_eq!(
        report.diagnostics()[0].message_text,
        "The namespace 'App' already contains a definition for 'Widget'"
    );
    assert_eq!(report.diagnostics()[0].related_symbols.len(), 1);
}

#[test]
fn test_type_clashing_with_namespace_reports_cs0101() {
    let mut tree = NamespaceTree::new();
    let mut types = TypeArena::new();
    let mut report = Report::default();
    let global = tree.global();
    tree.get_or_create_child(global, "Utils");
    let utils = class(&mut types, "", "Utils");
    assert!(!tree.declare_type(global, utils, &types, &mut report));
    assert_eq!(
        report.diagnostics()[0].message_text,
        "The namespace '<global namespace>' already contains a definition for 'Utils'"
    );
}

#[test]
fn test_assembly_sweep_indexes_only_public_top_level_types() {
    let mut tree = NamespaceTree::new();
    let mut types = TypeArena::new();
    let mut report = Report::default();
    let list = class(&mut types, "Lib.Collections", "List");
    let hidden = types.alloc(
        TypeDecl::new("Hidden", "Lib", TypeKind::Class).with_modifiers(Modifiers::INTERNAL),
    );
    let mut inner = TypeDecl::new("Node", "Lib.Collections", TypeKind::Class);
    inner.declaring_type = Some(list);
    let inner = types.alloc(inner);

    tree.add_assembly(
        NamespaceTree::GLOBAL_ROOT,
        AssemblyId(0),
        &[list, hidden, inner],
        &types,
    );

    let lib = tree.find_namespace(tree.global(), "Lib").unwrap();
    let collections = tree.find_namespace(lib, "Collections").unwrap();
    assert_eq!(
        tree.lookup_type(collections, "List", Location::NULL, &types, &mut report),
        Ok(Some(list))
    );
    assert_eq!(
        tree.lookup_type(lib, "Hidden", Location::NULL, &types, &mut report),
        Ok(None)
    );
    assert_eq!(
        tree.lookup_type(collections, "Node", Location::NULL, &types, &mut report),
        Ok(None)
    );
    assert_eq!(tree.root(NamespaceTree::GLOBAL_ROOT).assemblies(), &[AssemblyId(0)]);
}

#[test]
fn test_assembly_conflict_is_an_error_and_keeps_first() {
    let mut tree = NamespaceTree::new();
    let mut types = TypeArena::new();
    let mut report = Report::default();
    let first = class(&mut types, "Shared", "Thing");
    let second = class(&mut types, "Shared", "Thing");
    tree.add_assembly(NamespaceTree::GLOBAL_ROOT, AssemblyId(0), &[first], &types);
    tree.add_assembly(NamespaceTree::GLOBAL_ROOT, AssemblyId(1), &[second], &types);

    let shared = tree.find_namespace(tree.global(), "Shared").unwrap();
    let found = tree.lookup_type(shared, "Thing", Location::NULL, &types, &mut report);
    assert_eq!(found, Ok(Some(first)));
    assert_eq!(
        report.codes(),
        vec![diagnostic_codes::IMPORTED_TYPE_DEFINED_MULTIPLE_TIMES]
    );
    assert_eq!(report.diagnostics()[0].related_symbols.len(), 2);

    // Memoized: the conflict is not reported again.
    let again = tree.lookup_type(shared, "Thing", Location::NULL, &types, &mut report);
    assert_eq!(again, Ok(Some(first)));
    assert_eq!(report.error_count(), 1);
}

#[test]
fn test_module_conflict_is_a_warning_and_keeps_first() {
    let mut tree = NamespaceTree::new();
    let mut types = TypeArena::new();
    let mut report = Report::default();
    let first = class(&mut types, "Shared", "Thing");
    let second = class(&mut types, "Shared", "Thing");
    tree.add_module(ModuleId(0), &[first], &types);
    tree.add_module(ModuleId(1), &[second], &types);

    let shared = tree.find_namespace(tree.global(), "Shared").unwrap();
    let found = tree.lookup_type(shared, "Thing", Location::NULL, &types, &mut report);
    assert_eq!(found, Ok(Some(first)));
    assert_eq!(report.error_count(), 0);
    assert_eq!(report.warning_count(), 1);
    assert_eq!(report.codes(), vec![diagnostic_codes::IGNORING_IMPORTED_TYPE]);
}

#[test]
fn test_module_types_include_internal_types() {
    let mut tree = NamespaceTree::new();
    let mut types = TypeArena::new();
    let mut report = Report::default();
    let internal = types.alloc(
        TypeDecl::new("Helper", "", TypeKind::Class).with_modifiers(Modifiers::INTERNAL),
    );
    tree.add_module(ModuleId(0), &[internal], &types);
    let global = tree.global();
    assert_eq!(
        tree.lookup_type(global, "Helper", Location::NULL, &types, &mut report),
        Ok(Some(internal))
    );
}

#[test]
fn test_declaration_invalidates_negative_cache() {
    let mut tree = NamespaceTree::new();
    let mut types = TypeArena::new();
    let mut report = Report::default();
    let ns = tree.get_or_create_child(tree.global(), "Late");
    assert_eq!(
        tree.lookup_type(ns, "Widget", Location::NULL, &types, &mut report),
        Ok(None)
    );

    let widget = class(&mut types, "Late", "Widget");
    tree.declare_type(ns, widget, &types, &mut report);
    assert_eq!(
        tree.lookup_type(ns, "Widget", Location::NULL, &types, &mut report),
        Ok(Some(widget))
    );

    let gadget = class(&mut types, "Late", "Gadget");
    assert_eq!(
        tree.lookup_type(ns, "Gadget", Location::NULL, &types, &mut report),
        Ok(None)
    );
    tree.add_assembly(NamespaceTree::GLOBAL_ROOT, AssemblyId(0), &[gadget], &types);
    assert_eq!(
        tree.lookup_type(ns, "Gadget", Location::NULL, &types, &mut report),
        Ok(Some(gadget))
    );
}

#[test]
fn test_extern_alias_root_is_isolated_from_global() {
    let mut tree = NamespaceTree::new();
    let mut types = TypeArena::new();
    let mut report = Report::default();
    let legacy = class(&mut types, "Vendor", "Api");
    let root = tree.extern_alias_root("v1");
    assert_eq!(tree.extern_alias_root("v1"), root);
    assert_eq!(tree.extern_alias("v1"), Some(root));
    assert_eq!(tree.root(root).kind, RootKind::ExternAlias("v1".to_string()));
    tree.add_assembly(root, AssemblyId(0), &[legacy], &types);

    assert!(tree.find_namespace(tree.global(), "Vendor").is_none());
    let root_node = tree.root(root).node;
    let vendor = tree.find_namespace(root_node, "Vendor").unwrap();
    assert_eq!(tree.root_of(vendor), Ok(root));
    assert_eq!(
        tree.lookup_type(vendor, "Api", Location::NULL, &types, &mut report),
        Ok(Some(legacy))
    );
}

#[test]
fn test_reset_drops_everything() {
    let mut tree = NamespaceTree::new();
    tree.get_or_create_child(tree.global(), "A.B");
    tree.extern_alias_root("x");
    tree.reset();
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.roots().len(), 1);
    assert!(tree.extern_alias("x").is_none());
    assert_eq!(tree.root_of(tree.global()), Ok(NamespaceTree::GLOBAL_ROOT));
}
