//! Numeric coercion for fixed-width fields.
//!
//! Numbers are digit strings with an optional leading sign and surrounding
//! blanks. Decimal fields carry an implied point: the rightmost `scale` digits
//! are fractional. Values are built from an integer mantissa so nothing ever
//! passes through binary floating point.

use cbk_model::NumericFault;
use rust_decimal::Decimal;

/// Parse a signed number with `scale` implied fractional digits.
pub fn parse_decimal(raw: &str, scale: u32) -> Result<Decimal, NumericFault> {
    let (negative, digits) = split_sign(raw)?;
    let mut mantissa: i128 = 0;
    for digit in significant_digits(digits) {
        mantissa = mantissa
            .checked_mul(10)
            .and_then(|m| m.checked_add(digit))
            .ok_or(NumericFault::Overflow)?;
    }
    if negative {
        mantissa = -mantissa;
    }
    Decimal::try_from_i128_with_scale(mantissa, scale).map_err(|_| NumericFault::Overflow)
}

/// Parse a non-negative whole number. A `+` sign is tolerated, `-` is not.
pub fn parse_unsigned(raw: &str) -> Result<i64, NumericFault> {
    let (negative, digits) = split_sign(raw)?;
    if negative {
        return Err(NumericFault::NegativeUnsigned);
    }
    let mut value: i64 = 0;
    for digit in significant_digits(digits) {
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add(digit as i64))
            .ok_or(NumericFault::Overflow)?;
    }
    Ok(value)
}

/// Returns `(is_negative, digits)` after validating the digit run.
fn split_sign(raw: &str) -> Result<(bool, &str), NumericFault> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(NumericFault::Blank);
    }
    let (negative, digits) = match trimmed.as_bytes()[0] {
        b'-' => (true, &trimmed[1..]),
        b'+' => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    if digits.is_empty() {
        return Err(NumericFault::MissingDigits);
    }
    if let Some(bad) = digits.chars().find(|c| !c.is_ascii_digit()) {
        return Err(NumericFault::NonDigit(bad));
    }
    Ok((negative, digits))
}

// Leading zeros are skipped so wide zero-filled fields do not overflow.
fn significant_digits(digits: &str) -> impl Iterator<Item = i128> + '_ {
    digits
        .trim_start_matches('0')
        .bytes()
        .map(|b| i128::from(b - b'0'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn implied_scale_is_exact() {
        let value = parse_decimal("00012345", 2).unwrap();
        assert_eq!(value, Decimal::new(12345, 2));
        assert_eq!(value.to_string(), "123.45");
    }

    #[test]
    fn scale_is_preserved_for_round_values() {
        assert_eq!(parse_decimal("00012300", 2).unwrap().to_string(), "123.00");
        assert_eq!(parse_decimal("0000", 2).unwrap().to_string(), "0.00");
    }

    #[test]
    fn signs_and_blanks() {
        assert_eq!(parse_decimal("-000012345", 2).unwrap().to_string(), "-123.45");
        assert_eq!(parse_decimal("+12", 0).unwrap().to_string(), "12");
        assert_eq!(parse_decimal("   -5", 1).unwrap().to_string(), "-0.5");
        assert_eq!(parse_decimal("-0000", 2).unwrap().to_string(), "0.00");
        assert_eq!(parse_decimal("    ", 2), Err(NumericFault::Blank));
        assert_eq!(parse_decimal("-", 2), Err(NumericFault::MissingDigits));
        assert_eq!(parse_decimal("12A45", 2), Err(NumericFault::NonDigit('A')));
        assert_eq!(parse_decimal("1 2", 0), Err(NumericFault::NonDigit(' ')));
        assert_eq!(parse_decimal("--12", 0), Err(NumericFault::NonDigit('-')));
    }

    #[test]
    fn wide_zero_filled_fields_fit() {
        let raw = format!("{}{}", "0".repeat(40), "7");
        assert_eq!(parse_decimal(&raw, 0).unwrap(), Decimal::from(7));
        assert_eq!(parse_unsigned(&raw).unwrap(), 7);
    }

    #[test]
    fn overflow_is_reported() {
        let raw = "9".repeat(40);
        assert_eq!(parse_decimal(&raw, 2), Err(NumericFault::Overflow));
        assert_eq!(parse_unsigned("99999999999999999999"), Err(NumericFault::Overflow));
    }

    #[test]
    fn unsigned_rejects_minus() {
        assert_eq!(parse_unsigned("00042").unwrap(), 42);
        assert_eq!(parse_unsigned("+42").unwrap(), 42);
        assert_eq!(parse_unsigned("-42"), Err(NumericFault::NegativeUnsigned));
    }
}
