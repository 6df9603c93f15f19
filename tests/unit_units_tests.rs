use proptest::prelude::*;
use rust_decimal_macros::dec;
use vault_console::error::ValidationError;
use vault_console::units::{format_rounded, to_decimal, to_display, to_raw, ONE_TOKEN};

#[test]
fn test_to_display_whole_amounts() {
    assert_eq!(to_display(0), "0");
    assert_eq!(to_display(ONE_TOKEN), "1");
    assert_eq!(to_display(50 * ONE_TOKEN), "50");
}

#[test]
fn test_to_display_fractional_amounts() {
    assert_eq!(to_display(1), "0.000000000000000001");
    assert_eq!(to_display(ONE_TOKEN / 2), "0.5");
    assert_eq!(to_display(10 * ONE_TOKEN + 250_000_000_000_000_000), "10.25");
}

#[test]
fn test_to_raw_accepts_plain_decimals() {
    assert_eq!(to_raw("10").unwrap(), 10 * ONE_TOKEN);
    assert_eq!(to_raw("0.5").unwrap(), ONE_TOKEN / 2);
    assert_eq!(to_raw(".5").unwrap(), ONE_TOKEN / 2);
    assert_eq!(to_raw("5.").unwrap(), 5 * ONE_TOKEN);
    assert_eq!(to_raw("  7 ").unwrap(), 7 * ONE_TOKEN);
    assert_eq!(to_raw("0.000000000000000001").unwrap(), 1);
}

#[test]
fn test_to_raw_rejects_bad_text() {
    assert_eq!(to_raw(""), Err(ValidationError::Empty));
    assert_eq!(to_raw("   "), Err(ValidationError::Empty));
    assert!(matches!(to_raw("abc"), Err(ValidationError::NotNumeric(_))));
    assert!(matches!(to_raw("1e5"), Err(ValidationError::NotNumeric(_))));
    assert!(matches!(to_raw("1.2.3"), Err(ValidationError::NotNumeric(_))));
    assert!(matches!(to_raw("."), Err(ValidationError::NotNumeric(_))));
    assert!(matches!(to_raw("+1"), Err(ValidationError::NotNumeric(_))));
    assert!(matches!(to_raw("-"), Err(ValidationError::NotNumeric(_))));
}

#[test]
fn test_to_raw_rejects_negative() {
    assert_eq!(to_raw("-5"), Err(ValidationError::Negative));
    assert_eq!(to_raw("-0.1"), Err(ValidationError::Negative));
}

#[test]
fn test_to_raw_rejects_excess_precision() {
    assert_eq!(
        to_raw("0.0000000000000000001"),
        Err(ValidationError::TooManyDecimals(18))
    );
}

#[test]
fn test_to_raw_ignores_trailing_zeros_past_scale() {
    assert_eq!(to_raw("10.0000000000000000000").unwrap(), 10 * ONE_TOKEN);
    assert_eq!(to_raw("0.1000000000000000000000").unwrap(), ONE_TOKEN / 10);
    assert_eq!(to_raw("0.0000000000000000010").unwrap(), 1);
}

#[test]
fn test_to_raw_rejects_overflow() {
    let huge = format!("{}", u128::MAX);
    assert_eq!(to_raw(&huge), Err(ValidationError::Overflow));
}

#[test]
fn test_round_trip_across_range() {
    let samples = [
        0,
        1,
        999,
        ONE_TOKEN - 1,
        ONE_TOKEN,
        ONE_TOKEN + 1,
        123_456_789_012_345_678_901_234,
        u128::MAX / 3,
        u128::MAX - 1,
        u128::MAX,
    ];

    for raw in samples {
        assert_eq!(to_raw(&to_display(raw)).unwrap(), raw, "round trip of {}", raw);
    }
}

#[test]
fn test_to_decimal_matches_display() {
    assert_eq!(to_decimal(ONE_TOKEN / 2), Some(dec!(0.5)));
    assert_eq!(to_decimal(50 * ONE_TOKEN).map(|d| d.normalize()), Some(dec!(50)));
    assert_eq!(to_decimal(u128::MAX), None);
}

#[test]
fn test_format_rounded() {
    assert_eq!(format_rounded(0, 4), "0");
    assert_eq!(format_rounded(50 * ONE_TOKEN, 4), "50");
    assert_eq!(format_rounded(1_234_567_000_000_000_000, 4), "1.2346");
    assert_eq!(format_rounded(1_234_567_000_000_000_000, 2), "1.23");
    assert_eq!(format_rounded(ONE_TOKEN / 2, 0), "1");
}

#[test]
fn test_format_rounded_truncates_beyond_decimal_range() {
    let raw = u128::MAX;
    let exact = to_display(raw);
    let rounded = format_rounded(raw, 2);

    let (whole, _) = exact.split_once('.').unwrap();
    assert!(rounded.starts_with(whole));
    assert!(rounded.len() <= whole.len() + 3);
}

proptest! {
    #[test]
    fn prop_display_round_trips(raw in any::<u128>()) {
        prop_assert_eq!(to_raw(&to_display(raw)), Ok(raw));
    }

    #[test]
    fn prop_round_trip_near_whole_limit(
        whole in (u128::MAX / ONE_TOKEN - 1_000)..=(u128::MAX / ONE_TOKEN),
        frac in 0..ONE_TOKEN,
    ) {
        if let Some(raw) = whole.checked_mul(ONE_TOKEN).and_then(|w| w.checked_add(frac)) {
            prop_assert_eq!(to_raw(&to_display(raw)), Ok(raw));
        }
    }

    #[test]
    fn prop_fraction_digits_scale_exactly(digits in "[0-9]{1,18}") {
        let expected = digits.parse::<u128>().unwrap() * 10u128.pow(18 - digits.len() as u32);
        prop_assert_eq!(to_raw(&format!("0.{}", digits)), Ok(expected));
    }
}
