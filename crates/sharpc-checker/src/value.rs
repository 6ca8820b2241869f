//! Typed constant values.

use crate::decimal::Decimal;
use serde::Serialize;
use sharpc_binder::{PrimitiveType, TypeId, TypeRef};
use std::fmt;

/// The value of a resolved constant, tagged with its static type.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ConstantValue {
    Bool(bool),
    /// UTF-16 code unit.
    Char(u16),
    SByte(i8),
    Byte(u8),
    Short(i16),
    UShort(u16),
    Int(i32),
    UInt(u32),
    Long(i64),
    ULong(u64),
    Float(f32),
    Double(f64),
    Decimal(Decimal),
    String(String),
    Null,
    /// A value of an enum type, stored as a value of its underlying type.
    Enum { ty: TypeId, value: Box<ConstantValue> },
}

/// Arithmetic view of a numeric constant.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Numeric {
    Int(i128),
    Float(f64),
    Decimal(Decimal),
}

impl ConstantValue {
    pub fn primitive(&self) -> Option<PrimitiveType> {
        Some(match self {
            ConstantValue::Bool(_) => PrimitiveType::Bool,
            ConstantValue::Char(_) => PrimitiveType::Char,
            ConstantValue::SByte(_) => PrimitiveType::SByte,
            ConstantValue::Byte(_) => PrimitiveType::Byte,
            ConstantValue::Short(_) => PrimitiveType::Short,
            ConstantValue::UShort(_) => PrimitiveType::UShort,
            ConstantValue::Int(_) => PrimitiveType::Int,
            ConstantValue::UInt(_) => PrimitiveType::UInt,
            ConstantValue::Long(_) => PrimitiveType::Long,
            ConstantValue::ULong(_) => PrimitiveType::ULong,
            ConstantValue::Float(_) => PrimitiveType::Float,
            ConstantValue::Double(_) => PrimitiveType::Double,
            ConstantValue::Decimal(_) => PrimitiveType::Decimal,
            ConstantValue::String(_) => PrimitiveType::String,
            ConstantValue::Null | ConstantValue::Enum { .. } => return None,
        })
    }

    pub fn ty(&self) -> TypeRef {
        match self {
            ConstantValue::Null => TypeRef::Null,
            ConstantValue::Enum { ty, .. } => TypeRef::Named(*ty),
            other => other
                .primitive()
                .map_or(TypeRef::Null, TypeRef::Primitive),
        }
    }

    /// Integral value, including `char`. Enum values are not unwrapped.
    pub fn as_i128(&self) -> Option<i128> {
        Some(match *self {
            ConstantValue::Char(v) => i128::from(v),
            ConstantValue::SByte(v) => i128::from(v),
            ConstantValue::Byte(v) => i128::from(v),
            ConstantValue::Short(v) => i128::from(v),
            ConstantValue::UShort(v) => i128::from(v),
            ConstantValue::Int(v) => i128::from(v),
            ConstantValue::UInt(v) => i128::from(v),
            ConstantValue::Long(v) => i128::from(v),
            ConstantValue::ULong(v) => i128::from(v),
            _ => return None,
        })
    }

    pub fn numeric(&self) -> Option<Numeric> {
        match self {
            ConstantValue::Float(v) => Some(Numeric::Float(f64::from(*v))),
            ConstantValue::Double(v) => Some(Numeric::Float(*v)),
            ConstantValue::Decimal(v) => Some(Numeric::Decimal(*v)),
            other => other.as_i128().map(Numeric::Int),
        }
    }

    /// A constant integral zero converts implicitly to any enum type.
    pub fn is_zero_literal(&self) -> bool {
        self.as_i128() == Some(0) && !matches!(self, ConstantValue::Char(_))
    }

    /// Strip the enum wrapper, if any.
    pub fn underlying(&self) -> &ConstantValue {
        match self {
            ConstantValue::Enum { value, .. } => value.underlying(),
            other => other,
        }
    }

    /// How the value is stored in metadata.
    pub fn emitted(&self) -> EmittedConstant {
        match self {
            ConstantValue::Decimal(d) => EmittedConstant::DecimalBits(d.bits()),
            other => EmittedConstant::Literal(other.clone()),
        }
    }
}

impl fmt::Display for ConstantValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstantValue::Bool(v) => write!(f, "{v}"),
            ConstantValue::Char(v) => match char::from_u32(u32::from(*v)) {
                Some(c) => write!(f, "{c}"),
                None => write!(f, "\\u{v:04x}"),
            },
            ConstantValue::SByte(v) => write!(f, "{v}"),
            ConstantValue::Byte(v) => write!(f, "{v}"),
            ConstantValue::Short(v) => write!(f, "{v}"),
            ConstantValue::UShort(v) => write!(f, "{v}"),
            ConstantValue::Int(v) => write!(f, "{v}"),
            ConstantValue::UInt(v) => write!(f, "{v}"),
            ConstantValue::Long(v) => write!(f, "{v}"),
            ConstantValue::ULong(v) => write!(f, "{v}"),
            ConstantValue::Float(v) => write!(f, "{v}"),
            ConstantValue::Double(v) => write!(f, "{v}"),
            ConstantValue::Decimal(v) => write!(f, "{v}"),
            ConstantValue::String(v) => write!(f, "{v}"),
            ConstantValue::Null => f.write_str("null"),
            ConstantValue::Enum { value, .. } => write!(f, "{value}"),
        }
    }
}

/// Metadata form of a constant. Decimal constants cannot be stored as a
/// literal and are emitted as their four-word layout instead.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EmittedConstant {
    Literal(ConstantValue),
    DecimalBits([i32; 4]),
}
