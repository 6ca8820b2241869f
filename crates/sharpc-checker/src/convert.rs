//! Constant conversions.
//!
//! Implicit conversions cover the numeric widening table, the implicit
//! constant-expression conversions (an `int` constant that fits a smaller
//! integral type, a non-negative `long` constant to `ulong`), literal zero to
//! any enum, and `null` to reference types. Explicit conversions (casts) use
//! the per-target value conversion tables, where out-of-range values are an
//! error in a checked context and wrap otherwise.

use crate::decimal::Decimal;
use crate::value::{ConstantValue, Numeric};
use sharpc_binder::{PrimitiveType, TypeArena, TypeKind, TypeRef};
use sharpc_common::InternalError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConversionError {
    /// No implicit conversion. `explicit_exists` selects CS0266 over CS0029.
    NotImplicit { explicit_exists: bool },
    /// The value does not fit the target type.
    OutOfRange,
    /// No conversion at all (CS0030).
    NotConvertible,
    /// The conversion exists but does not produce a constant (boxing).
    NotConstant,
    Internal(InternalError),
}

impl From<InternalError> for ConversionError {
    fn from(err: InternalError) -> Self {
        ConversionError::Internal(err)
    }
}

/// Implicit numeric conversions (widening).
pub fn implicit_numeric(from: PrimitiveType, to: PrimitiveType) -> bool {
    use PrimitiveType::*;
    if from == to {
        return true;
    }
    match from {
        SByte => matches!(to, Short | Int | Long | Float | Double | Decimal),
        Byte => matches!(
            to,
            Short | UShort | Int | UInt | Long | ULong | Float | Double | Decimal
        ),
        Short => matches!(to, Int | Long | Float | Double | Decimal),
        UShort => matches!(to, Int | UInt | Long | ULong | Float | Double | Decimal),
        Char => matches!(
            to,
            UShort | Int | UInt | Long | ULong | Float | Double | Decimal
        ),
        Int => matches!(to, Long | Float | Double | Decimal),
        UInt => matches!(to, Long | ULong | Float | Double | Decimal),
        Long | ULong => matches!(to, Float | Double | Decimal),
        Float => to == Double,
        _ => false,
    }
}

/// Whether an explicit numeric conversion exists between two primitives.
pub fn explicit_numeric(from: PrimitiveType, to: PrimitiveType) -> bool {
    from.is_numeric() && to.is_numeric()
}

/// Inclusive value range of an integral type (or `char`).
pub fn integral_range(ty: PrimitiveType) -> Option<(i128, i128)> {
    Some(match ty {
        PrimitiveType::SByte => (i128::from(i8::MIN), i128::from(i8::MAX)),
        PrimitiveType::Byte => (0, i128::from(u8::MAX)),
        PrimitiveType::Short => (i128::from(i16::MIN), i128::from(i16::MAX)),
        PrimitiveType::UShort | PrimitiveType::Char => (0, i128::from(u16::MAX)),
        PrimitiveType::Int => (i128::from(i32::MIN), i128::from(i32::MAX)),
        PrimitiveType::UInt => (0, i128::from(u32::MAX)),
        PrimitiveType::Long => (i128::from(i64::MIN), i128::from(i64::MAX)),
        PrimitiveType::ULong => (0, i128::from(u64::MAX)),
        _ => return None,
    })
}

/// Build an integral (or `char`) value that is known to be in range.
pub fn make_integral(ty: PrimitiveType, value: i128) -> Result<ConstantValue, InternalError> {
    let in_range = integral_range(ty).is_some_and(|(lo, hi)| (lo..=hi).contains(&value));
    if !in_range {
        return Err(unreachable_conversion(&value.to_string(), ty));
    }
    Ok(match ty {
        PrimitiveType::SByte => ConstantValue::SByte(value as i8),
        PrimitiveType::Byte => ConstantValue::Byte(value as u8),
        PrimitiveType::Short => ConstantValue::Short(value as i16),
        PrimitiveType::UShort => ConstantValue::UShort(value as u16),
        PrimitiveType::Char => ConstantValue::Char(value as u16),
        PrimitiveType::Int => ConstantValue::Int(value as i32),
        PrimitiveType::UInt => ConstantValue::UInt(value as u32),
        PrimitiveType::Long => ConstantValue::Long(value as i64),
        PrimitiveType::ULong => ConstantValue::ULong(value as u64),
        _ => return Err(unreachable_conversion(&value.to_string(), ty)),
    })
}

/// Reduce `value` modulo the width of `ty` and reinterpret it.
pub fn wrap_integral(ty: PrimitiveType, value: i128) -> Result<ConstantValue, InternalError> {
    let wrapped = match ty {
        PrimitiveType::SByte => i128::from(value as i8),
        PrimitiveType::Byte => i128::from(value as u8),
        PrimitiveType::Short => i128::from(value as i16),
        PrimitiveType::UShort | PrimitiveType::Char => i128::from(value as u16),
        PrimitiveType::Int => i128::from(value as i32),
        PrimitiveType::UInt => i128::from(value as u32),
        PrimitiveType::Long => i128::from(value as i64),
        PrimitiveType::ULong => i128::from(value as u64),
        _ => return Err(unreachable_conversion(&value.to_string(), ty)),
    };
    make_integral(ty, wrapped)
}

fn unreachable_conversion(from: &str, to: PrimitiveType) -> InternalError {
    InternalError::UnreachableConversion {
        from: from.to_string(),
        to: to.keyword().to_string(),
    }
}

/// Explicit numeric value conversion to `target`.
///
/// Integral and floating sources that do not fit an integral target are an
/// error when `checked` and wrap otherwise; decimal sources that do not fit
/// are always an error.
pub fn from_numeric(
    value: Numeric,
    target: PrimitiveType,
    checked: bool,
) -> Result<ConstantValue, ConversionError> {
    if let Some((lo, hi)) = integral_range(target) {
        let (whole, always_checked) = match value {
            Numeric::Int(v) => (Some(v), false),
            Numeric::Float(f) if f.is_finite() && f.trunc().abs() < 1e38 => {
                (Some(f.trunc() as i128), false)
            }
            Numeric::Float(_) => (None, false),
            Numeric::Decimal(d) => (Some(d.trunc()), true),
        };
        return match whole {
            Some(v) if (lo..=hi).contains(&v) => Ok(make_integral(target, v)?),
            _ if checked || always_checked => Err(ConversionError::OutOfRange),
            Some(v) => Ok(wrap_integral(target, v)?),
            None => Ok(make_integral(target, 0)?),
        };
    }
    match target {
        PrimitiveType::Double => Ok(ConstantValue::Double(match value {
            Numeric::Int(v) => v as f64,
            Numeric::Float(f) => f,
            Numeric::Decimal(d) => d.to_f64(),
        })),
        PrimitiveType::Float => Ok(ConstantValue::Float(match value {
            Numeric::Int(v) => v as f32,
            Numeric::Float(f) => f as f32,
            Numeric::Decimal(d) => d.to_f64() as f32,
        })),
        PrimitiveType::Decimal => {
            let converted = match value {
                Numeric::Int(v) => Decimal::from_i128(v),
                Numeric::Float(f) => Decimal::from_f64(f),
                Numeric::Decimal(d) => Some(d),
            };
            converted
                .map(ConstantValue::Decimal)
                .ok_or(ConversionError::OutOfRange)
        }
        other => Err(ConversionError::Internal(unreachable_conversion(
            &format!("{value:?}"),
            other,
        ))),
    }
}

fn is_reference(types: &TypeArena, target: &TypeRef) -> bool {
    match target {
        TypeRef::Primitive(PrimitiveType::String | PrimitiveType::Object) => true,
        TypeRef::Named(id) => types.get(*id).is_some_and(|decl| decl.is_reference_type()),
        TypeRef::Array(_) => true,
        _ => false,
    }
}

fn enum_underlying(types: &TypeArena, target: &TypeRef) -> Option<PrimitiveType> {
    let decl = types.get(target.as_named()?)?;
    if decl.kind != TypeKind::Enum {
        return None;
    }
    Some(decl.enum_underlying.unwrap_or(PrimitiveType::Int))
}

/// Standard implicit conversion of a constant to `target`.
pub fn implicit_constant_conversion(
    value: &ConstantValue,
    target: &TypeRef,
    types: &TypeArena,
) -> Result<ConstantValue, ConversionError> {
    if &value.ty() == target {
        return Ok(value.clone());
    }
    if let Some(underlying) = enum_underlying(types, target) {
        if matches!(value, ConstantValue::Enum { .. }) || !value.is_zero_literal() {
            let explicit_exists = value.underlying().numeric().is_some();
            return Err(ConversionError::NotImplicit { explicit_exists });
        }
        let zero = make_integral(underlying, 0)?;
        return Ok(ConstantValue::Enum {
            ty: target.as_named().ok_or_else(|| unreachable_conversion("0", underlying))?,
            value: Box::new(zero),
        });
    }
    if matches!(value, ConstantValue::Null) {
        return if is_reference(types, target) {
            Ok(ConstantValue::Null)
        } else {
            Err(ConversionError::NotImplicit {
                explicit_exists: false,
            })
        };
    }
    let target_primitive = match target {
        TypeRef::Primitive(PrimitiveType::Object) => return Err(ConversionError::NotConstant),
        TypeRef::Primitive(p) => *p,
        _ => {
            return Err(ConversionError::NotImplicit {
                explicit_exists: false,
            });
        }
    };
    let Some(source) = value.primitive() else {
        // Enum to a primitive needs a cast.
        return Err(ConversionError::NotImplicit {
            explicit_exists: target_primitive.is_numeric(),
        });
    };
    let Some(numeric) = value.numeric() else {
        return Err(ConversionError::NotImplicit {
            explicit_exists: false,
        });
    };
    if !target_primitive.is_numeric() {
        return Err(ConversionError::NotImplicit {
            explicit_exists: false,
        });
    }
    if implicit_numeric(source, target_primitive) {
        return from_numeric(numeric, target_primitive, true);
    }
    let constant_narrowing = match source {
        PrimitiveType::Int => matches!(
            target_primitive,
            PrimitiveType::SByte
                | PrimitiveType::Byte
                | PrimitiveType::Short
                | PrimitiveType::UShort
                | PrimitiveType::UInt
                | PrimitiveType::ULong
        ),
        PrimitiveType::Long => target_primitive == PrimitiveType::ULong,
        _ => false,
    };
    if constant_narrowing {
        return from_numeric(numeric, target_primitive, true);
    }
    Err(ConversionError::NotImplicit {
        explicit_exists: explicit_numeric(source, target_primitive),
    })
}

/// Conversion performed by a cast expression.
pub fn explicit_constant_conversion(
    value: &ConstantValue,
    target: &TypeRef,
    types: &TypeArena,
    checked: bool,
) -> Result<ConstantValue, ConversionError> {
    if &value.ty() == target {
        return Ok(value.clone());
    }
    let numeric = value.underlying().numeric();
    if let Some(underlying) = enum_underlying(types, target) {
        let Some(numeric) = numeric else {
            return Err(ConversionError::NotConvertible);
        };
        let converted = from_numeric(numeric, underlying, checked)?;
        return Ok(ConstantValue::Enum {
            ty: target
                .as_named()
                .ok_or_else(|| unreachable_conversion(&converted.to_string(), underlying))?,
            value: Box::new(converted),
        });
    }
    match target {
        TypeRef::Primitive(p) if p.is_numeric() => match numeric {
            Some(numeric) => from_numeric(numeric, *p, checked),
            None => Err(ConversionError::NotConvertible),
        },
        TypeRef::Primitive(PrimitiveType::Object) | TypeRef::Named(_) | TypeRef::Array(_) => {
            match value {
                ConstantValue::Null if is_reference(types, target) => Ok(ConstantValue::Null),
                _ if is_reference(types, target) => Err(ConversionError::NotConstant),
                _ => Err(ConversionError::NotConvertible),
            }
        }
        TypeRef::Primitive(PrimitiveType::String) => match value {
            ConstantValue::Null => Ok(ConstantValue::Null),
            _ => Err(ConversionError::NotConvertible),
        },
        _ => Err(ConversionError::NotConvertible),
    }
}

#[cfg(test)]
#[path = "../tests/convert_tests.rs"]
mod tests;
