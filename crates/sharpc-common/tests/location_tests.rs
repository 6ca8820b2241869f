//! Tests for the source location table.

use super::*;
use crate::diagnostics::diagnostic_codes;
use crate::report::Report;

fn table_with(files: &[&str]) -> (LocationTable, Report) {
    let mut report = Report::default();
    let mut table = LocationTable::new();
    for file in files {
        table.add_file(file, &mut report);
    }
    (table, report)
}

#[test]
fn test_location_round_trips_file_and_row() {
    let (mut table, _) = table_with(&["a.cs", "b.cs", "c.cs"]);
    table.initialize();

    let loc = table.location(2, 42).unwrap();
    assert!(!loc.is_null());
    assert_eq!(table.row(loc), 42);
    assert_eq!(table.file(loc).map(|f| f.name.as_str()), Some("b.cs"));
    assert_eq!(table.describe(loc).as_deref(), Some("b.cs(42)"));
}

#[test]
fn test_null_location_has_row_one() {
    let (mut table, _) = table_with(&["a.cs"]);
    table.initialize();
    assert_eq!(table.row(Location::NULL), 1);
    assert!(table.file(Location::NULL).is_none());
    assert!(table.describe(Location::NULL).is_none());
}

#[test]
fn test_duplicate_file_warns_and_keeps_index() {
    let (mut table, mut report) = table_with(&["a.cs"]);
    let again = table.add_file("a.cs", &mut report);
    assert_eq!(again, 1);
    assert_eq!(table.files().len(), 1);
    assert_eq!(report.warning_count(), 1);
    assert_eq!(
        report.codes(),
        vec![diagnostic_codes::SOURCE_FILE_SPECIFIED_MULTIPLE_TIMES]
    );
    assert_eq!(report.error_count(), 0);
}

#[test]
fn test_encoding_requires_initialize() {
    let (table, _) = table_with(&["a.cs"]);
    assert_eq!(
        table.location(1, 3),
        Err(crate::InternalError::LocationTableNotInitialized)
    );
}

#[test]
fn test_line_directive_registers_new_file() {
    let (mut table, _) = table_with(&["a.cs"]);
    table.initialize();
    let loc = table.line_directive("generated.cs", 10).unwrap();
    assert_eq!(table.describe(loc).as_deref(), Some("generated.cs(10)"));
    // Known files are reused rather than registered again.
    let loc = table.line_directive("a.cs", 5).unwrap();
    assert_eq!(table.file_index(loc), 1);
}

#[test]
fn test_file_table_exhaustion_degrades_to_unregistered_file() {
    // One file: two index values (0 and 1) need one bit, plus two headroom
    // bits gives room for eight indices, i.e. six files added through #line.
    let (mut table, _) = table_with(&["main.cs"]);
    table.initialize();
    assert_eq!(table.capacity(), 8);

    for i in 0..6 {
        let index = table.lookup_or_register(&format!("line{i}.cs"));
        assert_eq!(index, i + 2);
    }

    let overflow = table.lookup_or_register("one-too-many.cs");
    assert_eq!(overflow, 0);
    let loc = table.location(overflow, 77).unwrap();
    assert!(loc.is_null());
    assert_eq!(table.row(loc), 1);
    assert!(table.describe(loc).is_none());
}

#[test]
fn test_row_saturates_at_encoding_limit() {
    let (mut table, _) = table_with(&["a.cs"]);
    table.initialize();
    let loc = table.location(1, u32::MAX).unwrap();
    assert_eq!(table.row(loc), u32::MAX >> 3);
    assert_eq!(table.file_index(loc), 1);
}

#[test]
fn test_reset_clears_files() {
    let (mut table, _) = table_with(&["a.cs", "b.cs"]);
    table.initialize();
    table.reset();
    assert!(table.files().is_empty());
    assert!(!table.is_initialized());
}
