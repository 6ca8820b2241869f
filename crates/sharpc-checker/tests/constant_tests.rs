//! Tests for constant resolution: caching, cycles, conversions, enums and
//! folding diagnostics.

use super::*;
use crate::decimal::Decimal;
use sharpc_binder::{ScopeId, TypeDecl};
use sharpc_common::ReportOptions;

struct Fixture {
    binder: BinderState,
    constants: ConstantTable,
    report: Report,
    block: ScopeId,
    consts: TypeId,
}

impl Fixture {
    fn new() -> Self {
        Self::with_report(Report::default())
    }

    fn with_report(mut report: Report) -> Self {
        let mut binder = BinderState::new();
        let file = binder.file_scope(1);
        let block = binder.open_namespace(file, "App");
        let consts = binder.declare_source_type(
            block,
            TypeDecl::new("Consts", "", TypeKind::Class),
            &mut report,
        );
        Fixture {
            binder,
            constants: ConstantTable::new(),
            report,
            block,
            consts,
        }
    }

    fn declare_type(&mut self, decl: TypeDecl) -> TypeId {
        self.binder
            .declare_source_type(self.block, decl, &mut self.report)
    }

    fn constant(&mut self, name: &str, ty: PrimitiveType, init: ConstExpr) -> ConstantId {
        self.constants.declare(
            self.consts,
            name,
            TypeRef::Primitive(ty),
            init,
            Location::NULL,
        )
    }

    fn resolve(&mut self, id: ConstantId) -> Option<ConstantValue> {
        self.try_resolve(id).unwrap()
    }

    fn try_resolve(&mut self, id: ConstantId) -> Result<Option<ConstantValue>, InternalError> {
        ConstantResolver::new(&mut self.binder, &mut self.constants, &mut self.report, true)
            .resolve(id)
    }

    fn codes(&self) -> Vec<i32> {
        self.report.codes()
    }

    fn last_message(&self) -> &str {
        &self.report.diagnostics().last().unwrap().message_text
    }
}

fn lit(value: ConstantValue) -> ConstExpr {
    ConstExpr::Literal(value)
}

// =============================================================================
// Caching and cycles
// =============================================================================

#[test]
fn test_resolution_is_cached() {
    let mut fx = Fixture::new();
    let sum = fx.constant(
        "Sum",
        PrimitiveType::Int,
        ConstExpr::binary(BinaryOp::Add, ConstExpr::int(1), ConstExpr::int(2)),
    );
    assert_eq!(fx.resolve(sum), Some(ConstantValue::Int(3)));
    assert_eq!(fx.resolve(sum), Some(ConstantValue::Int(3)));
    assert_eq!(fx.constants.value(sum), Some(&ConstantValue::Int(3)));
    assert!(fx.codes().is_empty(), "got: {:?}", fx.codes());
}

#[test]
fn test_forward_reference_resolves_on_demand() {
    let mut fx = Fixture::new();
    let x = fx.constant(
        "X",
        PrimitiveType::Int,
        ConstExpr::binary(BinaryOp::Mul, ConstExpr::name("Y"), ConstExpr::int(2)),
    );
    let y = fx.constant("Y", PrimitiveType::Int, ConstExpr::int(21));
    assert_eq!(fx.resolve(x), Some(ConstantValue::Int(42)));
    assert_eq!(fx.constants.value(y), Some(&ConstantValue::Int(21)));
}

#[test]
fn test_cycle_is_reported_exactly_once() {
    let mut fx = Fixture::new();
    let a = fx.constant("A", PrimitiveType::Int, ConstExpr::name("B"));
    let b = fx.constant("B", PrimitiveType::Int, ConstExpr::name("A"));

    assert_eq!(fx.resolve(a), None);
    assert_eq!(fx.resolve(b), None);
    let codes = fx.codes();
    assert_eq!(
        codes,
        vec![diagnostic_codes::CIRCULAR_CONSTANT_DEFINITION],
        "got: {codes:?}"
    );
    assert_eq!(
        fx.last_message(),
        "The evaluation of the constant value for 'App.Consts.A' involves a circular definition"
    );
}

#[test]
fn test_self_reference_is_a_cycle() {
    let mut fx = Fixture::new();
    let a = fx.constant(
        "A",
        PrimitiveType::Int,
        ConstExpr::binary(BinaryOp::Add, ConstExpr::name("A"), ConstExpr::int(1)),
    );
    assert_eq!(fx.resolve(a), None);
    assert_eq!(fx.codes(), vec![diagnostic_codes::CIRCULAR_CONSTANT_DEFINITION]);
}

// =============================================================================
// Conversions to the declared type
// =============================================================================

#[test]
fn test_out_of_range_constant_reports_cs0031() {
    let mut fx = Fixture::new();
    let b = fx.constant("B", PrimitiveType::Byte, ConstExpr::int(300));
    assert_eq!(fx.resolve(b), None);
    assert_eq!(fx.codes(), vec![diagnostic_codes::CONSTANT_VALUE_CANNOT_BE_CONVERTED]);
    assert_eq!(fx.last_message(), "Constant value '300' cannot be converted to a 'byte'");
}

#[test]
fn test_narrowing_in_range_succeeds() {
    let mut fx = Fixture::new();
    let s = fx.constant("S", PrimitiveType::Short, ConstExpr::int(-5));
    let l = fx.constant("L", PrimitiveType::Long, ConstExpr::int(7));
    assert_eq!(fx.resolve(s), Some(ConstantValue::Short(-5)));
    assert_eq!(fx.resolve(l), Some(ConstantValue::Long(7)));
}

#[test]
fn test_missing_implicit_conversion() {
    let mut fx = Fixture::new();
    let d = fx.constant("D", PrimitiveType::Int, lit(ConstantValue::Double(1.5)));
    let s = fx.constant("S", PrimitiveType::Int, lit(ConstantValue::String("x".into())));
    assert_eq!(fx.resolve(d), None);
    assert_eq!(
        fx.last_message(),
        "Cannot implicitly convert type 'double' to 'int'. An explicit conversion exists (are you missing a cast?)"
    );
    assert_eq!(fx.resolve(s), None);
    assert_eq!(
        fx.codes(),
        vec![
            diagnostic_codes::EXPLICIT_CONVERSION_EXISTS,
            diagnostic_codes::CANNOT_IMPLICITLY_CONVERT
        ]
    );
}

#[test]
fn test_decimal_constant_is_emitted_as_bits() {
    let mut fx = Fixture::new();
    let price = fx.constant(
        "Price",
        PrimitiveType::Decimal,
        lit(ConstantValue::Decimal(Decimal::parse("1.5").unwrap())),
    );
    let whole = fx.constant("Whole", PrimitiveType::Decimal, ConstExpr::int(3));
    fx.resolve(price);
    fx.resolve(whole);
    assert_eq!(
        fx.constants.emitted(price),
        Some(EmittedConstant::DecimalBits([15, 0, 0, 0x0001_0000]))
    );
    assert_eq!(
        fx.constants.value(whole),
        Some(&ConstantValue::Decimal(Decimal::from_i128(3).unwrap()))
    );
}

#[test]
fn test_struct_type_cannot_be_const() {
    let mut fx = Fixture::new();
    let point = fx.declare_type(TypeDecl::new("Point", "", TypeKind::Struct));
    let p = fx.constants.declare(
        fx.consts,
        "P",
        TypeRef::Named(point),
        ConstExpr::int(0),
        Location::NULL,
    );
    assert_eq!(fx.resolve(p), None);
    assert_eq!(fx.codes(), vec![diagnostic_codes::TYPE_CANNOT_BE_CONST]);
    assert_eq!(fx.last_message(), "The type 'App.Point' cannot be declared const");
}

#[test]
fn test_reference_type_constant_accepts_only_null() {
    let mut fx = Fixture::new();
    let none = fx.constant("None", PrimitiveType::Object, lit(ConstantValue::Null));
    let boxed = fx.constant("Boxed", PrimitiveType::Object, ConstExpr::int(1));
    assert_eq!(fx.resolve(none), Some(ConstantValue::Null));
    assert_eq!(fx.resolve(boxed), None);
    assert_eq!(fx.codes(), vec![diagnostic_codes::EXPRESSION_MUST_BE_CONSTANT]);
}

// =============================================================================
// Enums
// =============================================================================

#[test]
fn test_enum_members_count_up_and_see_siblings_as_underlying() {
    let mut fx = Fixture::new();
    let color = fx.declare_type(TypeDecl::new("Color", "", TypeKind::Enum));
    let red = fx.constants.declare_enum_member(color, "Red", None, Location::NULL);
    let green = fx
        .constants
        .declare_enum_member(color, "Green", Some(ConstExpr::int(5)), Location::NULL);
    let blue = fx.constants.declare_enum_member(color, "Blue", None, Location::NULL);
    let mask = fx.constants.declare_enum_member(
        color,
        "Mask",
        Some(ConstExpr::binary(
            BinaryOp::Or,
            ConstExpr::name("Green"),
            ConstExpr::name("Blue"),
        )),
        Location::NULL,
    );
    let member = |v: i32| ConstantValue::Enum {
        ty: color,
        value: Box::new(ConstantValue::Int(v)),
    };

    assert_eq!(fx.resolve(mask), Some(member(7)));
    assert_eq!(fx.resolve(red), Some(member(0)));
    assert_eq!(fx.resolve(green), Some(member(5)));
    assert_eq!(fx.resolve(blue), Some(member(6)));
    assert!(fx.codes().is_empty(), "got: {:?}", fx.codes());
}

#[test]
fn test_enum_typed_constants_outside_the_enum() {
    let mut fx = Fixture::new();
    let color = fx.declare_type(TypeDecl::new("Color", "", TypeKind::Enum));
    fx.constants.declare_enum_member(color, "Red", None, Location::NULL);
    fx.constants.declare_enum_member(color, "Blue", None, Location::NULL);

    let declare = |fx: &mut Fixture, name: &str, init: ConstExpr| {
        fx.constants
            .declare(fx.consts, name, TypeRef::Named(color), init, Location::NULL)
    };
    let favourite = declare(&mut fx, "Favourite", ConstExpr::member("Color", "Blue"));
    let zero = declare(&mut fx, "Zero", ConstExpr::int(0));
    let one = declare(&mut fx, "One", ConstExpr::int(1));

    assert_eq!(
        fx.resolve(favourite),
        Some(ConstantValue::Enum {
            ty: color,
            value: Box::new(ConstantValue::Int(1)),
        })
    );
    assert_eq!(
        fx.resolve(zero),
        Some(ConstantValue::Enum {
            ty: color,
            value: Box::new(ConstantValue::Int(0)),
        })
    );
    assert_eq!(fx.resolve(one), None);
    assert_eq!(fx.codes(), vec![diagnostic_codes::EXPLICIT_CONVERSION_EXISTS]);
}

#[test]
fn test_enum_member_overflowing_underlying_type() {
    let mut fx = Fixture::new();
    let mut small = TypeDecl::new("Small", "", TypeKind::Enum);
    small.enum_underlying = Some(PrimitiveType::Byte);
    let small = fx.declare_type(small);
    fx.constants
        .declare_enum_member(small, "Last", Some(ConstExpr::int(255)), Location::NULL);
    let next = fx.constants.declare_enum_member(small, "Next", None, Location::NULL);
    assert_eq!(fx.resolve(next), None);
    assert_eq!(fx.codes(), vec![diagnostic_codes::CONSTANT_VALUE_CANNOT_BE_CONVERTED]);
}

// =============================================================================
// Folding and casts
// =============================================================================

#[test]
fn test_checked_overflow_and_unchecked_wrap() {
    let mut fx = Fixture::new();
    let overflow = ConstExpr::binary(BinaryOp::Add, ConstExpr::int(i32::MAX), ConstExpr::int(1));
    let checked = fx.constant("Checked", PrimitiveType::Int, overflow.clone());
    let wrapped = fx.constant(
        "Wrapped",
        PrimitiveType::Int,
        ConstExpr::Unchecked(Box::new(overflow)),
    );
    assert_eq!(fx.resolve(checked), None);
    assert_eq!(fx.resolve(wrapped), Some(ConstantValue::Int(i32::MIN)));
    assert_eq!(fx.codes(), vec![diagnostic_codes::OPERATION_OVERFLOWS_IN_CHECKED_MODE]);
}

#[test]
fn test_cast_out_of_range() {
    let mut fx = Fixture::new();
    let cast = ConstExpr::cast(TypeSyntax::Primitive(PrimitiveType::Byte), ConstExpr::int(300));
    let checked = fx.constant("Checked", PrimitiveType::Byte, cast.clone());
    let unchecked = fx.constant(
        "Unchecked",
        PrimitiveType::Byte,
        ConstExpr::Unchecked(Box::new(cast)),
    );
    assert_eq!(fx.resolve(checked), None);
    assert_eq!(
        fx.last_message(),
        "Constant value '300' cannot be converted to a 'byte' (use 'unchecked' syntax to override)"
    );
    assert_eq!(fx.resolve(unchecked), Some(ConstantValue::Byte(44)));
    assert_eq!(
        fx.codes(),
        vec![diagnostic_codes::CONSTANT_CANNOT_BE_CONVERTED_CHECKED]
    );
}

#[test]
fn test_division_by_zero_and_bad_operands() {
    let mut fx = Fixture::new();
    let div = fx.constant(
        "Div",
        PrimitiveType::Int,
        ConstExpr::binary(BinaryOp::Div, ConstExpr::int(1), ConstExpr::int(0)),
    );
    let bad = fx.constant(
        "Bad",
        PrimitiveType::Int,
        ConstExpr::binary(
            BinaryOp::Sub,
            ConstExpr::int(1),
            lit(ConstantValue::Bool(true)),
        ),
    );
    let neg = fx.constant(
        "Neg",
        PrimitiveType::Bool,
        ConstExpr::unary(crate::expr::UnaryOp::Minus, lit(ConstantValue::Bool(true))),
    );
    fx.resolve(div);
    fx.resolve(bad);
    assert_eq!(
        fx.last_message(),
        "Operator '-' cannot be applied to operands of type 'int' and 'bool'"
    );
    fx.resolve(neg);
    assert_eq!(
        fx.codes(),
        vec![
            diagnostic_codes::DIVISION_BY_CONSTANT_ZERO,
            diagnostic_codes::OPERATOR_CANNOT_BE_APPLIED,
            diagnostic_codes::UNARY_OPERATOR_CANNOT_BE_APPLIED
        ]
    );
}

#[test]
fn test_non_constant_initializers() {
    let mut fx = Fixture::new();
    let call = fx.constant(
        "Call",
        PrimitiveType::Int,
        ConstExpr::NonConstant("Compute()".into()),
    );
    let array = fx.constant("Array", PrimitiveType::Int, ConstExpr::ArrayCreation);
    assert_eq!(fx.resolve(call), None);
    assert_eq!(
        fx.last_message(),
        "The expression being assigned to 'App.Consts.Call' must be constant"
    );
    assert_eq!(fx.resolve(array), None);
    assert_eq!(
        fx.codes(),
        vec![
            diagnostic_codes::EXPRESSION_MUST_BE_CONSTANT,
            diagnostic_codes::EXPRESSION_MUST_BE_CONSTANT
        ]
    );
}

// =============================================================================
// Name lookup
// =============================================================================

#[test]
fn test_unknown_name_and_member() {
    let mut fx = Fixture::new();
    fx.declare_type(TypeDecl::new("Color", "", TypeKind::Enum));
    let missing = fx.constant("Missing", PrimitiveType::Int, ConstExpr::name("Nope"));
    let member = fx.constant(
        "Member",
        PrimitiveType::Int,
        ConstExpr::member("Color", "Purple"),
    );
    assert_eq!(fx.resolve(missing), None);
    assert_eq!(
        fx.last_message(),
        "The name 'Nope' does not exist in the current context"
    );
    assert_eq!(fx.resolve(member), None);
    assert_eq!(
        fx.last_message(),
        "'App.Color' does not contain a definition for 'Purple'"
    );
}

#[test]
fn test_inherited_and_enclosing_constants() {
    let mut fx = Fixture::new();
    let base = fx.declare_type(TypeDecl::new("Base", "", TypeKind::Class));
    fx.constants.declare(
        base,
        "K",
        TypeRef::Primitive(PrimitiveType::Int),
        ConstExpr::int(10),
        Location::NULL,
    );
    let mut derived = TypeDecl::new("Derived", "", TypeKind::Class);
    derived.base = Some(base);
    let derived = fx.declare_type(derived);
    let inner = fx
        .binder
        .declare_nested_type(derived, TypeDecl::new("Inner", "", TypeKind::Class));

    let from_base = fx.constants.declare(
        derived,
        "FromBase",
        TypeRef::Primitive(PrimitiveType::Int),
        ConstExpr::binary(BinaryOp::Add, ConstExpr::name("K"), ConstExpr::int(1)),
        Location::NULL,
    );
    let in_inner = fx.constants.declare(
        inner,
        "InInner",
        TypeRef::Primitive(PrimitiveType::Int),
        ConstExpr::name("FromBase"),
        Location::NULL,
    );
    let via_nested = fx.constants.declare(
        derived,
        "ViaNested",
        TypeRef::Primitive(PrimitiveType::Long),
        ConstExpr::member("Inner", "InInner"),
        Location::NULL,
    );

    assert_eq!(fx.resolve(from_base), Some(ConstantValue::Int(11)));
    assert_eq!(fx.resolve(in_inner), Some(ConstantValue::Int(11)));
    assert_eq!(fx.resolve(via_nested), Some(ConstantValue::Long(11)));
    assert!(fx.codes().is_empty(), "got: {:?}", fx.codes());
}

#[test]
fn test_member_access_with_a_qualified_type_name() {
    let mut fx = Fixture::new();
    let file = fx.binder.file_scope(2);
    let mut report = Report::default();
    let lib_block = fx.binder.open_namespace(file, "Lib");
    let limits = fx
        .binder
        .declare_source_type(lib_block, TypeDecl::new("Limits", "", TypeKind::Class), &mut report);
    fx.constants.declare(
        limits,
        "Max",
        TypeRef::Primitive(PrimitiveType::Int),
        ConstExpr::int(99),
        Location::NULL,
    );
    let max = fx.constant("Max", PrimitiveType::Int, ConstExpr::member("Lib.Limits", "Max"));
    assert_eq!(fx.resolve(max), Some(ConstantValue::Int(99)));
}

// =============================================================================
// Driving all constants
// =============================================================================

#[test]
fn test_resolve_all_stops_when_halted() {
    let mut fx = Fixture::with_report(Report::new(ReportOptions {
        fatal: true,
        ..ReportOptions::default()
    }));
    fx.constant("First", PrimitiveType::Int, ConstExpr::ArrayCreation);
    fx.constant("Second", PrimitiveType::Int, ConstExpr::ArrayCreation);
    let mut resolver =
        ConstantResolver::new(&mut fx.binder, &mut fx.constants, &mut fx.report, true);
    assert_eq!(resolver.resolve_all(), Ok(()));
    assert_eq!(fx.report.error_count(), 1);
    assert!(fx.report.is_halted());
}

#[test]
fn test_type_without_declaration_scope_is_an_internal_error() {
    let mut fx = Fixture::new();
    fx.declare_type(TypeDecl::new("Color", "", TypeKind::Enum));
    let orphan = fx
        .binder
        .types
        .alloc(TypeDecl::new("Orphan", "App", TypeKind::Class));
    let id = fx.constants.declare(
        orphan,
        "X",
        TypeRef::Primitive(PrimitiveType::Int),
        ConstExpr::member("Color", "Red"),
        Location::NULL,
    );
    assert_eq!(
        fx.try_resolve(id),
        Err(InternalError::unknown("type scope", orphan.0))
    );
    // The failure is settled; a second request does not retry.
    assert_eq!(fx.try_resolve(id), Ok(None));
}
