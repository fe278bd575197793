use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive};

/// Converts an arbitrary-precision integer to `f64` for mixed arithmetic.
///
/// Values beyond the `f64` range saturate to the matching infinity, which
/// keeps mixed-mode comparison total.
#[must_use]
pub fn bigint_to_f64(value: &BigInt) -> f64 {
    value.to_f64().unwrap_or_else(|| {
        if value.is_negative() { f64::NEG_INFINITY } else { f64::INFINITY }
    })
}

/// Renders a decimal so it reads back as a decimal literal.
///
/// Whole-number decimals keep one fractional digit (`2.0`, not `2`); other
/// values use the shortest round-tripping form.
#[must_use]
pub fn format_decimal(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// Reads an integer literal, ignoring `_` digit separators.
#[must_use]
pub fn parse_integer_literal(literal: &str) -> Option<BigInt> {
    let digits: String = literal.chars().filter(|c| *c != '_').collect();
    digits.parse().ok()
}

/// Reads a decimal literal, ignoring `_` digit separators.
#[must_use]
pub fn parse_decimal_literal(literal: &str) -> Option<f64> {
    let digits: String = literal.chars().filter(|c| *c != '_').collect();
    digits.parse().ok()
}
