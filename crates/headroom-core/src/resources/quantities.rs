use super::ResourceDimension;
use crate::error::{CoreError, Result};

/// Milli-units per whole CPU
pub const MILLIS_PER_CORE: i64 = 1000;

/// Bytes per MiB
pub const BYTES_PER_MIB: i64 = 1024 * 1024;

/// Default CPU request for a container that declares none (100m)
pub const DEFAULT_CPU_REQUEST_MILLIS: i64 = 100;

/// Default memory request for a container that declares none (200Mi)
pub const DEFAULT_MEMORY_REQUEST_BYTES: i64 = 200 * BYTES_PER_MIB;

// i128 holds 38 decimal digits; leave room for the suffix multiplier.
const MAX_MANTISSA_DIGITS: usize = 30;

/// Parse a Kubernetes quantity string into the base unit of `dimension`.
///
/// CPU is returned in milli-units, every other dimension in whole base units
/// (bytes for memory and ephemeral storage). Fractional results round up, the
/// same way `MilliValue()` / `Value()` behave for Kubernetes quantities.
/// Values that do not fit in an `i64` saturate.
///
/// Accepted forms: `2`, `0.5`, `-1`, `500m`, `128Mi`, `1Gi`, `1k`, `1M`, `1e3`.
pub fn parse_quantity(text: &str, dimension: &ResourceDimension) -> Result<i64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(CoreError::invalid_quantity(text, "empty quantity"));
    }

    let (number, suffix) = split_number(trimmed);
    let (negative, digits, fraction_len) = parse_mantissa(number)
        .ok_or_else(|| CoreError::invalid_quantity(text, "expected a decimal number"))?;
    let (exp10, exp2) = parse_suffix(suffix).ok_or_else(|| {
        CoreError::invalid_quantity(text, format!("unknown suffix '{}'", suffix))
    })?;

    let milli_shift = if dimension.is_milli_scaled() { 3 } else { 0 };
    let exp10 = i32::try_from(fraction_len)
        .ok()
        .and_then(|fraction| exp10.checked_add(milli_shift)?.checked_sub(fraction))
        .ok_or_else(|| CoreError::invalid_quantity(text, "exponent out of range"))?;

    // Rounding is toward +inf: up for positives, truncated magnitude for negatives
    let magnitude = scale(digits, exp10, exp2, !negative);
    let value = if negative { -magnitude } else { magnitude };

    Ok(value.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
}

/// Round a milli-unit value up to whole units.
pub fn millis_to_whole_ceil(millis: i64) -> i64 {
    let whole = millis / MILLIS_PER_CORE;
    if millis > 0 && millis % MILLIS_PER_CORE != 0 {
        whole + 1
    } else {
        whole
    }
}

fn split_number(s: &str) -> (&str, &str) {
    let end = s
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (i == 0 && (c == '+' || c == '-'))))
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    s.split_at(end)
}

/// Returns (negative, all digits as an integer, number of fractional digits)
fn parse_mantissa(number: &str) -> Option<(bool, i128, usize)> {
    let (negative, unsigned) = match number.as_bytes().first() {
        Some(&b'-') => (true, &number[1..]),
        Some(&b'+') => (false, &number[1..]),
        _ => (false, number),
    };

    let (whole, fraction) = match unsigned.split_once('.') {
        Some((w, f)) => (w, f),
        None => (unsigned, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if fraction.contains('.') {
        return None;
    }

    let all_digits = format!("{}{}", whole, fraction);
    let significant = all_digits.trim_start_matches('0');
    if significant.len() > MAX_MANTISSA_DIGITS {
        return None;
    }

    let digits = if significant.is_empty() {
        0
    } else {
        significant.parse::<i128>().ok()?
    };

    Some((negative, digits, fraction.len()))
}

/// Returns (base-10 exponent, base-2 exponent)
fn parse_suffix(suffix: &str) -> Option<(i32, u32)> {
    let exponents = match suffix {
        "" => (0, 0),
        "n" => (-9, 0),
        "u" => (-6, 0),
        "m" => (-3, 0),
        "k" => (3, 0),
        "M" => (6, 0),
        "G" => (9, 0),
        "T" => (12, 0),
        "P" => (15, 0),
        "E" => (18, 0),
        "Ki" => (0, 10),
        "Mi" => (0, 20),
        "Gi" => (0, 30),
        "Ti" => (0, 40),
        "Pi" => (0, 50),
        "Ei" => (0, 60),
        _ => {
            let exponent = suffix
                .strip_prefix('e')
                .or_else(|| suffix.strip_prefix('E'))?;
            (exponent.parse::<i32>().ok()?, 0)
        }
    };
    Some(exponents)
}

fn scale(digits: i128, exp10: i32, exp2: u32, round_up: bool) -> i128 {
    if digits == 0 {
        return 0;
    }

    let Some(value) = digits.checked_mul(1i128 << exp2) else {
        return i128::MAX;
    };

    if exp10 >= 0 {
        return 10i128
            .checked_pow(exp10 as u32)
            .and_then(|factor| value.checked_mul(factor))
            .unwrap_or(i128::MAX);
    }

    match 10i128.checked_pow(exp10.unsigned_abs()) {
        Some(divisor) => {
            let quotient = value / divisor;
            if round_up && value % divisor != 0 {
                quotient + 1
            } else {
                quotient
            }
        }
        // Smaller than any representable unit
        None => i128::from(round_up),
    }
}
