use super::*;

fn dec(text: &str) -> Decimal {
    Decimal::parse(text).unwrap()
}

#[test]
fn test_parse_and_display_keep_scale() {
    assert_eq!(dec("1.5").to_string(), "1.5");
    assert_eq!(dec("1.50").to_string(), "1.50");
    assert_eq!(dec("0.3").to_string(), "0.3");
    assert_eq!(dec("-42").to_string(), "-42");
    assert_eq!(dec("-0").to_string(), "0");
    assert!(!dec("-0").is_negative());
    assert_eq!(dec(".25").to_string(), "0.25");
}

#[test]
fn test_parse_rejects_malformed_text() {
    assert!(Decimal::parse("").is_none());
    assert!(Decimal::parse(".").is_none());
    assert!(Decimal::parse("1e5").is_none());
    assert!(Decimal::parse("abc").is_none());
    // 2^96 does not fit
    assert!(Decimal::parse("79228162514264337593543950336").is_none());
    assert!(Decimal::parse("79228162514264337593543950335").is_some());
}

#[test]
fn test_parse_rounds_excess_fraction_digits() {
    let d = dec("0.12345678901234567890123456789");
    assert_eq!(d.scale(), MAX_SCALE);
    assert_eq!(d.to_string(), "0.1234567890123456789012345679");
}

#[test]
fn test_addition_aligns_scales() {
    assert_eq!(dec("0.1").checked_add(dec("0.2")), Some(dec("0.3")));
    assert_eq!(
        dec("1.10").checked_add(dec("1")).map(|d| d.to_string()),
        Some("2.10".to_string())
    );
    assert_eq!(dec("1").checked_sub(dec("3")), Some(dec("-2")));
}

#[test]
fn test_multiplication_adds_scales() {
    assert_eq!(
        dec("1.5").checked_mul(dec("1.5")).map(|d| d.to_string()),
        Some("2.25".to_string())
    );
    assert_eq!(dec("-2").checked_mul(dec("3")), Some(dec("-6")));
}

#[test]
fn test_division_rounds_to_max_scale_and_strips_zeros() {
    assert_eq!(
        dec("10").checked_div(dec("4")).map(|d| d.to_string()),
        Some("2.5".to_string())
    );
    assert_eq!(
        dec("1").checked_div(dec("3")).map(|d| d.to_string()),
        Some("0.3333333333333333333333333333".to_string())
    );
    assert_eq!(
        dec("2").checked_div(dec("3")).map(|d| d.to_string()),
        Some("0.6666666666666666666666666667".to_string())
    );
    assert_eq!(dec("6").checked_div(dec("2")), Some(dec("3")));
}

#[test]
fn test_overflow_and_zero_divisor_yield_none() {
    let one = dec("1");
    assert!(Decimal::MAX.checked_add(one).is_none());
    assert!(Decimal::MAX.checked_mul(dec("2")).is_none());
    assert!(one.checked_div(Decimal::ZERO).is_none());
    assert!(one.checked_rem(Decimal::ZERO).is_none());
}

#[test]
fn test_remainder_and_truncation() {
    assert_eq!(dec("7.5").checked_rem(dec("2")), Some(dec("1.5")));
    assert_eq!(dec("-7.9").trunc(), -7);
    assert_eq!(dec("12.99").trunc(), 12);
}

#[test]
fn test_numeric_comparison_ignores_scale() {
    use std::cmp::Ordering;
    assert_eq!(dec("1.0").numeric_cmp(dec("1")), Ordering::Equal);
    assert_eq!(dec("-1.5").numeric_cmp(dec("1")), Ordering::Less);
    assert_eq!(dec("2.01").numeric_cmp(dec("2.009")), Ordering::Greater);
}

#[test]
fn test_bits_layout() {
    assert_eq!(dec("-1.5").bits(), [15, 0, 0, 0x8001_0000u32 as i32]);
    assert_eq!(dec("4294967296").bits(), [0, 1, 0, 0]);
    assert_eq!(Decimal::MAX.bits(), [-1, -1, -1, 0]);
}

#[test]
fn test_float_conversions() {
    assert_eq!(Decimal::from_f64(0.5), Some(dec("0.5")));
    assert_eq!(Decimal::from_f32(2.25), Some(dec("2.25")));
    assert!(Decimal::from_f64(f64::NAN).is_none());
    assert!(Decimal::from_f64(1e30).is_none());
    assert_eq!(dec("-2.5").to_f64(), -2.5);
}

#[test]
fn test_serializes_as_string() {
    let json = serde_json::to_string(&dec("3.14")).unwrap();
    assert_eq!(json, "\"3.14\"");
}
