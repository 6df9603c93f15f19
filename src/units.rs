//! Conversion between raw token amounts and the decimal text users see.
//!
//! Raw amounts are integers in the token's smallest unit (18 fractional
//! digits). Stored and compared values are always raw `u128`; rounding only
//! happens in [`format_rounded`], which is for display.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::ValidationError;

/// Fractional digits of the vault token
pub const TOKEN_DECIMALS: u32 = 18;

/// Raw units in one whole token
pub const ONE_TOKEN: u128 = 1_000_000_000_000_000_000;

/// Exact decimal rendering of a raw amount
///
/// Trailing fractional zeros are dropped, so whole amounts have no dot.
///
/// # Example
///
/// ```
/// use vault_console::units::to_display;
///
/// assert_eq!(to_display(1_500_000_000_000_000_000), "1.5");
/// assert_eq!(to_display(0), "0");
/// ```
pub fn to_display(raw: u128) -> String {
    let whole = raw / ONE_TOKEN;
    let frac = raw % ONE_TOKEN;

    if frac == 0 {
        return whole.to_string();
    }

    let digits = format!("{:0width$}", frac, width = TOKEN_DECIMALS as usize);
    format!("{}.{}", whole, digits.trim_end_matches('0'))
}

/// Parse decimal text into a raw amount without any rounding
///
/// Accepts `digits`, `digits.digits`, `.digits` and `digits.` with
/// surrounding whitespace. Rejects signs, exponents and more than
/// [`TOKEN_DECIMALS`] fractional digits.
///
/// # Example
///
/// ```
/// use vault_console::units::to_raw;
///
/// assert_eq!(to_raw("10").unwrap(), 10_000_000_000_000_000_000);
/// assert_eq!(to_raw("0.000000000000000001").unwrap(), 1);
/// assert!(to_raw("1e5").is_err());
/// ```
pub fn to_raw(text: &str) -> Result<u128, ValidationError> {
    let text = text.trim();

    if text.is_empty() {
        return Err(ValidationError::Empty);
    }

    if let Some(rest) = text.strip_prefix('-') {
        return match to_raw(rest) {
            Ok(_) => Err(ValidationError::Negative),
            Err(_) => Err(ValidationError::NotNumeric(text.to_string())),
        };
    }

    let (whole, frac) = text.split_once('.').unwrap_or((text, ""));

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && frac.is_empty()) || !all_digits(whole) || !all_digits(frac) {
        return Err(ValidationError::NotNumeric(text.to_string()));
    }

    // Zeros past the last significant digit never change the amount
    let frac = frac.trim_end_matches('0');
    if frac.len() > TOKEN_DECIMALS as usize {
        return Err(ValidationError::TooManyDecimals(TOKEN_DECIMALS));
    }

    let whole_units = parse_digits(whole)?
        .checked_mul(ONE_TOKEN)
        .ok_or(ValidationError::Overflow)?;

    // Right-pad the fraction to the full scale: "5" -> 500_000_000_000_000_000
    let pad = 10u128.pow(TOKEN_DECIMALS - frac.len() as u32);
    let frac_units = parse_digits(frac)? * pad;

    whole_units
        .checked_add(frac_units)
        .ok_or(ValidationError::Overflow)
}

/// Human-readable amount rounded to `dp` fractional digits
///
/// Used for balance summaries. Values beyond `Decimal` range are truncated
/// instead of rounded.
pub fn format_rounded(raw: u128, dp: u32) -> String {
    let dp = dp.min(TOKEN_DECIMALS);

    match to_decimal(raw) {
        Some(value) => value
            .round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
            .normalize()
            .to_string(),
        None => truncate(&to_display(raw), dp),
    }
}

/// Raw amount as a whole-token `Decimal`, if it fits in 96 bits
pub fn to_decimal(raw: u128) -> Option<Decimal> {
    let mantissa = i128::try_from(raw).ok()?;
    Decimal::try_from_i128_with_scale(mantissa, TOKEN_DECIMALS).ok()
}

fn parse_digits(digits: &str) -> Result<u128, ValidationError> {
    digits.bytes().try_fold(0u128, |acc, b| {
        acc.checked_mul(10)
            .and_then(|acc| acc.checked_add(u128::from(b - b'0')))
            .ok_or(ValidationError::Overflow)
    })
}

fn truncate(display: &str, dp: u32) -> String {
    match display.split_once('.') {
        Some((whole, frac)) => {
            let kept: String = frac.chars().take(dp as usize).collect();
            let kept = kept.trim_end_matches('0');
            if kept.is_empty() {
                whole.to_string()
            } else {
                format!("{}.{}", whole, kept)
            }
        }
        None => display.to_string(),
    }
}
