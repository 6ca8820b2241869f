//! Constant folding of unary and binary operators.

use crate::convert::{ConversionError, from_numeric, integral_range, make_integral, wrap_integral};
use crate::expr::{BinaryOp, UnaryOp};
use crate::value::{ConstantValue, Numeric};
use sharpc_binder::PrimitiveType;
use sharpc_common::InternalError;
use std::cmp::Ordering;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FoldError {
    /// CS0220
    Overflow,
    /// CS0020
    DivideByZero,
    /// CS0019
    InvalidOperands,
    /// CS0023
    InvalidOperand,
    /// The operator exists but its result is not a constant.
    NotConstant,
    Internal(InternalError),
}

impl From<InternalError> for FoldError {
    fn from(err: InternalError) -> Self {
        FoldError::Internal(err)
    }
}

impl From<ConversionError> for FoldError {
    fn from(err: ConversionError) -> Self {
        match err {
            ConversionError::OutOfRange => FoldError::Overflow,
            ConversionError::Internal(err) => FoldError::Internal(err),
            _ => FoldError::InvalidOperands,
        }
    }
}

type FoldResult = Result<ConstantValue, FoldError>;

// =============================================================================
// Promotion
// =============================================================================

/// Unary numeric promotion: small integral types and `char` become `int`.
fn unary_promotion(ty: PrimitiveType) -> PrimitiveType {
    match ty {
        PrimitiveType::SByte
        | PrimitiveType::Byte
        | PrimitiveType::Short
        | PrimitiveType::UShort
        | PrimitiveType::Char => PrimitiveType::Int,
        other => other,
    }
}

const fn is_signed_integral(ty: PrimitiveType) -> bool {
    matches!(
        ty,
        PrimitiveType::SByte | PrimitiveType::Short | PrimitiveType::Int | PrimitiveType::Long
    )
}

/// Binary numeric promotion of two constant operands.
fn binary_promotion(left: &ConstantValue, right: &ConstantValue) -> Option<PrimitiveType> {
    use PrimitiveType::*;
    let l = left.primitive().filter(|p| p.is_numeric())?;
    let r = right.primitive().filter(|p| p.is_numeric())?;
    let either = |ty| l == ty || r == ty;

    if either(Decimal) {
        return (!either(Float) && !either(Double)).then_some(Decimal);
    }
    if either(Double) {
        return Some(Double);
    }
    if either(Float) {
        return Some(Float);
    }
    // A signed operand converts to the unsigned type only when it is a
    // non-negative constant.
    for unsigned in [ULong, UInt] {
        if !either(unsigned) {
            continue;
        }
        let (other, other_ty) = if l == unsigned { (right, r) } else { (left, l) };
        let negative = is_signed_integral(other_ty) && other.as_i128().is_none_or(|v| v < 0);
        return match (unsigned, negative) {
            (ULong, true) => None,
            (UInt, true) => Some(Long),
            (UInt, false) if either(Long) => Some(Long),
            _ => Some(unsigned),
        };
    }
    if either(Long) {
        return Some(Long);
    }
    Some(Int)
}

fn to_numeric(value: &ConstantValue, ty: PrimitiveType) -> Result<Numeric, FoldError> {
    let converted = from_numeric(
        value.numeric().ok_or(FoldError::InvalidOperands)?,
        ty,
        true,
    )?;
    converted.numeric().ok_or(FoldError::InvalidOperands)
}

/// Store an integral result, overflowing per the checking context.
fn integral_result(ty: PrimitiveType, value: i128, checked: bool) -> FoldResult {
    let fits = integral_range(ty).is_some_and(|(lo, hi)| (lo..=hi).contains(&value));
    if fits {
        Ok(make_integral(ty, value)?)
    } else if checked {
        Err(FoldError::Overflow)
    } else {
        Ok(wrap_integral(ty, value)?)
    }
}

fn float_result(ty: PrimitiveType, value: f64) -> FoldResult {
    Ok(match ty {
        PrimitiveType::Float => ConstantValue::Float(value as f32),
        _ => ConstantValue::Double(value),
    })
}

// =============================================================================
// Unary operators
// =============================================================================

pub fn unary(op: UnaryOp, operand: &ConstantValue, checked: bool) -> FoldResult {
    if let ConstantValue::Enum { ty, value } = operand {
        return match op {
            UnaryOp::BitNot => {
                let inner = value.as_i128().ok_or(FoldError::InvalidOperand)?;
                let underlying = value.primitive().ok_or(FoldError::InvalidOperand)?;
                Ok(ConstantValue::Enum {
                    ty: *ty,
                    value: Box::new(wrap_integral(underlying, !inner)?),
                })
            }
            _ => Err(FoldError::InvalidOperand),
        };
    }
    if op == UnaryOp::Not {
        return match operand {
            ConstantValue::Bool(b) => Ok(ConstantValue::Bool(!b)),
            _ => Err(FoldError::InvalidOperand),
        };
    }

    let ty = operand
        .primitive()
        .filter(|p| p.is_numeric())
        .map(unary_promotion)
        .ok_or(FoldError::InvalidOperand)?;
    let value = to_numeric(operand, ty)?;
    match (op, value) {
        (UnaryOp::Plus, _) => Ok(from_numeric(value, ty, true)?),
        (UnaryOp::Minus, Numeric::Int(v)) => match ty {
            PrimitiveType::ULong => Err(FoldError::InvalidOperand),
            // Negating a uint yields a long.
            PrimitiveType::UInt => integral_result(PrimitiveType::Long, -v, checked),
            _ => integral_result(ty, -v, checked),
        },
        (UnaryOp::Minus, Numeric::Float(f)) => float_result(ty, -f),
        (UnaryOp::Minus, Numeric::Decimal(d)) => Ok(ConstantValue::Decimal(d.negate())),
        (UnaryOp::BitNot, Numeric::Int(v)) => Ok(wrap_integral(ty, !v)?),
        (UnaryOp::BitNot, _) => Err(FoldError::InvalidOperand),
        (UnaryOp::Not, _) => Err(FoldError::InvalidOperand),
    }
}

// =============================================================================
// Binary operators
// =============================================================================

pub fn binary(
    op: BinaryOp,
    left: &ConstantValue,
    right: &ConstantValue,
    checked: bool,
) -> FoldResult {
    match (left, right) {
        (ConstantValue::Enum { .. }, _) | (_, ConstantValue::Enum { .. }) => {
            return enum_binary(op, left, right, checked);
        }
        (ConstantValue::Bool(a), ConstantValue::Bool(b)) => return bool_binary(op, *a, *b),
        (ConstantValue::String(_) | ConstantValue::Null, _)
        | (_, ConstantValue::String(_) | ConstantValue::Null) => {
            return reference_binary(op, left, right);
        }
        _ => {}
    }
    match op {
        BinaryOp::Shl | BinaryOp::Shr => return shift(op, left, right),
        BinaryOp::LogicalAnd | BinaryOp::LogicalOr => return Err(FoldError::InvalidOperands),
        _ => {}
    }

    let ty = binary_promotion(left, right).ok_or(FoldError::InvalidOperands)?;
    let a = to_numeric(left, ty)?;
    let b = to_numeric(right, ty)?;

    if op.is_comparison() {
        let ordering = match (a, b) {
            (Numeric::Int(x), Numeric::Int(y)) => Some(x.cmp(&y)),
            (Numeric::Float(x), Numeric::Float(y)) => x.partial_cmp(&y),
            (Numeric::Decimal(x), Numeric::Decimal(y)) => Some(x.numeric_cmp(y)),
            _ => return Err(FoldError::InvalidOperands),
        };
        return Ok(ConstantValue::Bool(compare(op, ordering)));
    }

    match (a, b) {
        (Numeric::Int(x), Numeric::Int(y)) => integral_binary(op, ty, x, y, checked),
        (Numeric::Float(x), Numeric::Float(y)) => {
            let value = match op {
                BinaryOp::Add => x + y,
                BinaryOp::Sub => x - y,
                BinaryOp::Mul => x * y,
                BinaryOp::Div => x / y,
                BinaryOp::Rem => x % y,
                _ => return Err(FoldError::InvalidOperands),
            };
            float_result(ty, value)
        }
        (Numeric::Decimal(x), Numeric::Decimal(y)) => {
            let value = match op {
                BinaryOp::Add => x.checked_add(y),
                BinaryOp::Sub => x.checked_sub(y),
                BinaryOp::Mul => x.checked_mul(y),
                BinaryOp::Div | BinaryOp::Rem if y.is_zero() => {
                    return Err(FoldError::DivideByZero);
                }
                BinaryOp::Div => x.checked_div(y),
                BinaryOp::Rem => x.checked_rem(y),
                _ => return Err(FoldError::InvalidOperands),
            };
            value.map(ConstantValue::Decimal).ok_or(FoldError::Overflow)
        }
        _ => Err(FoldError::InvalidOperands),
    }
}

fn compare(op: BinaryOp, ordering: Option<Ordering>) -> bool {
    // NaN compares unequal to everything.
    let Some(ordering) = ordering else {
        return op == BinaryOp::Ne;
    };
    match op {
        BinaryOp::Eq => ordering == Ordering::Equal,
        BinaryOp::Ne => ordering != Ordering::Equal,
        BinaryOp::Lt => ordering == Ordering::Less,
        BinaryOp::Gt => ordering == Ordering::Greater,
        BinaryOp::Le => ordering != Ordering::Greater,
        BinaryOp::Ge => ordering != Ordering::Less,
        _ => false,
    }
}

fn integral_binary(op: BinaryOp, ty: PrimitiveType, x: i128, y: i128, checked: bool) -> FoldResult {
    let arithmetic = match op {
        BinaryOp::Add => Some((x.checked_add(y), x.wrapping_add(y))),
        BinaryOp::Sub => Some((x.checked_sub(y), x.wrapping_sub(y))),
        BinaryOp::Mul => Some((x.checked_mul(y), x.wrapping_mul(y))),
        _ => None,
    };
    if let Some((exact, wrapped)) = arithmetic {
        // ulong * ulong can exceed i128; the low 64 bits survive wrapping.
        return match exact {
            Some(value) => integral_result(ty, value, checked),
            None if checked => Err(FoldError::Overflow),
            None => Ok(wrap_integral(ty, wrapped)?),
        };
    }
    let value = match op {
        BinaryOp::Div | BinaryOp::Rem if y == 0 => return Err(FoldError::DivideByZero),
        BinaryOp::Div => x / y,
        BinaryOp::Rem => x % y,
        BinaryOp::And => return Ok(wrap_integral(ty, x & y)?),
        BinaryOp::Or => return Ok(wrap_integral(ty, x | y)?),
        BinaryOp::Xor => return Ok(wrap_integral(ty, x ^ y)?),
        _ => return Err(FoldError::InvalidOperands),
    };
    integral_result(ty, value, checked)
}

fn shift(op: BinaryOp, left: &ConstantValue, right: &ConstantValue) -> FoldResult {
    let ty = left
        .primitive()
        .filter(|p| p.is_integral() || *p == PrimitiveType::Char)
        .map(unary_promotion)
        .ok_or(FoldError::InvalidOperands)?;
    // The count must convert implicitly to int.
    if right.primitive().map(unary_promotion) != Some(PrimitiveType::Int) {
        return Err(FoldError::InvalidOperands);
    }
    let count = right.as_i128().ok_or(FoldError::InvalidOperands)?;
    let value = left.as_i128().ok_or(FoldError::InvalidOperands)?;

    let wide = matches!(ty, PrimitiveType::Long | PrimitiveType::ULong);
    let count = (count & if wide { 63 } else { 31 }) as u32;
    let result = match (op, ty) {
        (BinaryOp::Shl, _) => value << count,
        (BinaryOp::Shr, PrimitiveType::Int) => i128::from((value as i32) >> count),
        (BinaryOp::Shr, PrimitiveType::Long) => i128::from((value as i64) >> count),
        (BinaryOp::Shr, PrimitiveType::UInt) => i128::from((value as u32) >> count),
        (BinaryOp::Shr, _) => i128::from((value as u64) >> count),
        _ => return Err(FoldError::InvalidOperands),
    };
    Ok(wrap_integral(ty, result)?)
}

fn bool_binary(op: BinaryOp, a: bool, b: bool) -> FoldResult {
    Ok(ConstantValue::Bool(match op {
        BinaryOp::LogicalAnd | BinaryOp::And => a && b,
        BinaryOp::LogicalOr | BinaryOp::Or => a || b,
        BinaryOp::Xor | BinaryOp::Ne => a != b,
        BinaryOp::Eq => a == b,
        _ => return Err(FoldError::InvalidOperands),
    }))
}

/// String concatenation and equality on `string`/`null` operands.
fn reference_binary(op: BinaryOp, left: &ConstantValue, right: &ConstantValue) -> FoldResult {
    let text = |v: &ConstantValue| match v {
        ConstantValue::String(s) => Some(Some(s.clone())),
        ConstantValue::Null => Some(None),
        _ => None,
    };
    let (Some(a), Some(b)) = (text(left), text(right)) else {
        // `"x" + 1` is a call to ToString at run time.
        return Err(if op == BinaryOp::Add {
            FoldError::NotConstant
        } else {
            FoldError::InvalidOperands
        });
    };
    match op {
        BinaryOp::Add if a.is_some() || b.is_some() => Ok(ConstantValue::String(
            a.unwrap_or_default() + &b.unwrap_or_default(),
        )),
        BinaryOp::Eq => Ok(ConstantValue::Bool(a == b)),
        BinaryOp::Ne => Ok(ConstantValue::Bool(a != b)),
        _ => Err(FoldError::InvalidOperands),
    }
}

fn enum_binary(op: BinaryOp, left: &ConstantValue, right: &ConstantValue, checked: bool) -> FoldResult {
    let (enum_ty, underlying) = match (left, right) {
        (ConstantValue::Enum { ty, value }, _) | (_, ConstantValue::Enum { ty, value }) => {
            (*ty, value.primitive().ok_or(FoldError::InvalidOperands)?)
        }
        _ => return Err(FoldError::InvalidOperands),
    };
    let same_enum = |v: &ConstantValue| matches!(v, ConstantValue::Enum { ty, .. } if *ty == enum_ty);
    let wrap = |value: ConstantValue| ConstantValue::Enum {
        ty: enum_ty,
        value: Box::new(value),
    };
    let a = left.underlying();
    let b = right.underlying();

    match op {
        _ if op.is_comparison() && same_enum(left) && same_enum(right) => {
            binary(op, a, b, checked)
        }
        BinaryOp::And | BinaryOp::Or | BinaryOp::Xor if same_enum(left) && same_enum(right) => {
            let bits = binary(op, a, b, checked)?;
            Ok(wrap(to_underlying(&bits, underlying, checked)?))
        }
        // E - E is the underlying type.
        BinaryOp::Sub if same_enum(left) && same_enum(right) => {
            let diff = binary(op, a, b, checked)?;
            to_underlying(&diff, underlying, checked)
        }
        // E + U, U + E and E - U stay in the enum.
        BinaryOp::Add | BinaryOp::Sub
            if (same_enum(left) && right.primitive().is_some_and(|p| p.is_integral()))
                || (op == BinaryOp::Add
                    && same_enum(right)
                    && left.primitive().is_some_and(|p| p.is_integral())) =>
        {
            let sum = binary(op, a, b, checked)?;
            Ok(wrap(to_underlying(&sum, underlying, checked)?))
        }
        _ => Err(FoldError::InvalidOperands),
    }
}

fn to_underlying(value: &ConstantValue, underlying: PrimitiveType, checked: bool) -> FoldResult {
    let numeric = value.numeric().ok_or(FoldError::InvalidOperands)?;
    Ok(from_numeric(numeric, underlying, checked)?)
}

#[cfg(test)]
#[path = "../tests/fold_tests.rs"]
mod tests;
