//! 96-bit decimal constants.
//!
//! A decimal is a 96-bit unsigned magnitude, a power-of-ten scale (0-28) and a
//! sign. Arithmetic is exact when the result fits; otherwise digits are
//! dropped from the fractional part (rounding half away from zero) until it
//! does, and `None` signals an overflow of the integral part.

use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

pub const MAX_SCALE: u8 = 28;
const MAX_MANTISSA: u128 = (1 << 96) - 1;
const SIGN_MASK: u32 = 0x8000_0000;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Decimal {
    mantissa: u128,
    scale: u8,
    negative: bool,
}

fn round_div10(value: u128) -> u128 {
    let quotient = value / 10;
    if value % 10 >= 5 { quotient + 1 } else { quotient }
}

impl Decimal {
    pub const ZERO: Decimal = Decimal {
        mantissa: 0,
        scale: 0,
        negative: false,
    };

    pub const MAX: Decimal = Decimal {
        mantissa: MAX_MANTISSA,
        scale: 0,
        negative: false,
    };

    pub fn new(mantissa: u128, scale: u8, negative: bool) -> Option<Self> {
        if mantissa > MAX_MANTISSA || scale > MAX_SCALE {
            return None;
        }
        Some(Decimal {
            mantissa,
            scale,
            negative: negative && mantissa != 0,
        })
    }

    /// Fit an arbitrary (magnitude, scale) pair, dropping fractional digits
    /// as needed.
    fn fit(mut mantissa: u128, mut scale: u32, negative: bool) -> Option<Self> {
        while mantissa > MAX_MANTISSA || scale > u32::from(MAX_SCALE) {
            if scale == 0 {
                return None;
            }
            mantissa = round_div10(mantissa);
            scale -= 1;
        }
        Self::new(mantissa, scale as u8, negative)
    }

    pub fn from_i128(value: i128) -> Option<Self> {
        Self::new(value.unsigned_abs(), 0, value < 0)
    }

    /// Parse `[-]digits[.digits]`. Fractional digits beyond what fits are
    /// rounded away.
    pub fn parse(text: &str) -> Option<Self> {
        let (negative, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };
        let (integral, fraction) = digits.split_once('.').unwrap_or((digits, ""));
        if integral.is_empty() && fraction.is_empty() {
            return None;
        }
        if !integral.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
            return None;
        }

        let mut mantissa: u128 = 0;
        for b in integral.bytes() {
            mantissa = mantissa
                .checked_mul(10)?
                .checked_add(u128::from(b - b'0'))?;
            if mantissa > MAX_MANTISSA {
                return None;
            }
        }
        let mut scale = 0u8;
        for b in fraction.bytes() {
            let digit = u128::from(b - b'0');
            let next = mantissa * 10 + digit;
            if scale == MAX_SCALE || next > MAX_MANTISSA {
                if digit >= 5 {
                    mantissa += 1;
                }
                break;
            }
            mantissa = next;
            scale += 1;
        }
        Self::fit(mantissa, u32::from(scale), negative)
    }

    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        // `Display` for floats never uses exponent notation.
        Self::parse(&format!("{value}"))
    }

    pub fn from_f32(value: f32) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        Self::parse(&format!("{value}"))
    }

    pub const fn mantissa(&self) -> u128 {
        self.mantissa
    }

    pub const fn scale(&self) -> u8 {
        self.scale
    }

    pub const fn is_negative(&self) -> bool {
        self.negative
    }

    pub const fn is_zero(&self) -> bool {
        self.mantissa == 0
    }

    pub fn to_f64(self) -> f64 {
        let magnitude = self.mantissa as f64 / 10f64.powi(i32::from(self.scale));
        if self.negative { -magnitude } else { magnitude }
    }

    /// Integral part, truncated toward zero.
    pub fn trunc(self) -> i128 {
        let magnitude = (self.mantissa / 10u128.pow(u32::from(self.scale))) as i128;
        if self.negative { -magnitude } else { magnitude }
    }

    pub fn negate(self) -> Self {
        Decimal {
            negative: !self.negative && self.mantissa != 0,
            ..self
        }
    }

    fn signed(self) -> i128 {
        let magnitude = self.mantissa as i128;
        if self.negative { -magnitude } else { magnitude }
    }

    /// Bring both operands to a common scale.
    fn align(a: Decimal, b: Decimal) -> (i128, i128, u8) {
        let (mut ma, mut sa) = (a.signed(), a.scale);
        let (mut mb, mut sb) = (b.signed(), b.scale);
        while sa < sb {
            match ma.checked_mul(10) {
                Some(scaled) => {
                    ma = scaled;
                    sa += 1;
                }
                None => {
                    mb = mb.signum() * round_div10(mb.unsigned_abs()) as i128;
                    sb -= 1;
                }
            }
        }
        while sb < sa {
            match mb.checked_mul(10) {
                Some(scaled) => {
                    mb = scaled;
                    sb += 1;
                }
                None => {
                    ma = ma.signum() * round_div10(ma.unsigned_abs()) as i128;
                    sa -= 1;
                }
            }
        }
        (ma, mb, sa)
    }

    pub fn checked_add(self, other: Decimal) -> Option<Decimal> {
        let (a, b, scale) = Self::align(self, other);
        let sum = a.checked_add(b)?;
        Self::fit(sum.unsigned_abs(), u32::from(scale), sum < 0)
    }

    pub fn checked_sub(self, other: Decimal) -> Option<Decimal> {
        self.checked_add(other.negate())
    }

    pub fn checked_mul(self, other: Decimal) -> Option<Decimal> {
        let negative = self.negative != other.negative;
        let (mut ma, mut sa) = (self.mantissa, u32::from(self.scale));
        let (mut mb, mut sb) = (other.mantissa, u32::from(other.scale));
        loop {
            if let Some(product) = ma.checked_mul(mb) {
                return Self::fit(product, sa + sb, negative);
            }
            if sa + sb == 0 {
                return None;
            }
            if sa >= sb {
                ma = round_div10(ma);
                sa -= 1;
            } else {
                mb = round_div10(mb);
                sb -= 1;
            }
        }
    }

    /// `None` on overflow or a zero divisor.
    pub fn checked_div(self, other: Decimal) -> Option<Decimal> {
        if other.is_zero() {
            return None;
        }
        let negative = self.negative != other.negative;
        let mut numerator = self.mantissa;
        let mut scale = i32::from(self.scale) - i32::from(other.scale);
        // One digit beyond the maximum scale is kept for rounding.
        while scale <= i32::from(MAX_SCALE) {
            match numerator.checked_mul(10) {
                Some(scaled) => {
                    numerator = scaled;
                    scale += 1;
                }
                None => break,
            }
        }
        let denominator = other.mantissa;
        let mut quotient = numerator / denominator;
        let remainder = numerator % denominator;
        if remainder >= denominator - remainder {
            quotient += 1;
        }
        if scale < 0 {
            quotient = quotient.checked_mul(10u128.checked_pow(scale.unsigned_abs())?)?;
            scale = 0;
        }
        while scale > 0 && quotient % 10 == 0 {
            quotient /= 10;
            scale -= 1;
        }
        Self::fit(quotient, scale as u32, negative)
    }

    /// `None` on a zero divisor.
    pub fn checked_rem(self, other: Decimal) -> Option<Decimal> {
        if other.is_zero() {
            return None;
        }
        let (a, b, scale) = Self::align(self, other);
        let rem = a.checked_rem(b)?;
        Self::fit(rem.unsigned_abs(), u32::from(scale), rem < 0)
    }

    pub fn numeric_cmp(self, other: Decimal) -> Ordering {
        let (a, b, _) = Self::align(self, other);
        a.cmp(&b)
    }

    /// The `[lo, mid, hi, flags]` layout used to store decimal constants.
    /// `flags` holds the scale in bits 16-23 and the sign in bit 31.
    pub fn bits(&self) -> [i32; 4] {
        let lo = (self.mantissa & 0xFFFF_FFFF) as u32;
        let mid = ((self.mantissa >> 32) & 0xFFFF_FFFF) as u32;
        let hi = ((self.mantissa >> 64) & 0xFFFF_FFFF) as u32;
        let mut flags = u32::from(self.scale) << 16;
        if self.negative {
            flags |= SIGN_MASK;
        }
        [lo as i32, mid as i32, hi as i32, flags as i32]
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.mantissa.to_string();
        let scale = usize::from(self.scale);
        if self.negative {
            f.write_str("-")?;
        }
        if scale == 0 {
            return f.write_str(&digits);
        }
        let padded = format!("{digits:0>width$}", width = scale + 1);
        let (integral, fraction) = padded.split_at(padded.len() - scale);
        write!(f, "{integral}.{fraction}")
    }
}

impl Serialize for Decimal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
#[path = "../tests/decimal_tests.rs"]
mod tests;
