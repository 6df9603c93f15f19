use crate::error::ValidationError;
use crate::units::to_raw;

/// Check an amount typed by the user against the balance it will draw on
///
/// Returns the raw amount to send. Fails when the text is empty, not a plain
/// decimal, negative, zero, or larger than `available` once scaled to raw
/// units. Comparison is done on raw integers only.
///
/// # Example
///
/// ```
/// use vault_console::validator::check_amount;
/// use vault_console::units::ONE_TOKEN;
///
/// assert_eq!(check_amount("10", 50 * ONE_TOKEN).unwrap(), 10 * ONE_TOKEN);
/// assert!(check_amount("51", 50 * ONE_TOKEN).is_err());
/// ```
pub fn check_amount(amount_text: &str, available: u128) -> Result<u128, ValidationError> {
    let requested = to_raw(amount_text)?;

    if requested == 0 {
        return Err(ValidationError::Zero);
    }

    if requested > available {
        return Err(ValidationError::ExceedsBalance {
            requested,
            available,
        });
    }

    Ok(requested)
}

/// `true` iff `0 < to_raw(amount_text) <= available`
pub fn validate(amount_text: &str, available: u128) -> bool {
    check_amount(amount_text, available).is_ok()
}
