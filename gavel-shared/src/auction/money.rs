/// Decimal prices
///
/// Prices are stored as `NUMERIC(11, 2)`: at most two decimal places and
/// nine whole digits.

use rust_decimal::Decimal;
use std::str::FromStr;

/// Number of decimal places a price may carry
pub const DECIMAL_PLACES: u32 = 2;

/// Exclusive upper bound of the whole part (nine digits)
const WHOLE_PART_LIMIT: i64 = 1_000_000_000;

/// Why an amount was refused
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    /// Input is not a decimal number
    #[error("'{0}' is not a valid decimal number.")]
    NotANumber(String),

    /// More than two decimal places
    #[error("Ensure that there are no more than 2 decimal places.")]
    TooManyDecimalPlaces,

    /// More than nine digits before the decimal point
    #[error("Ensure that there are no more than 9 digits before the decimal point.")]
    TooManyWholeDigits,

    /// Zero or negative
    #[error("Ensure this value is greater than zero.")]
    NotPositive,
}

/// Parses user input into a decimal without checking bounds
///
/// Surrounding whitespace is ignored. Scientific notation is accepted the way
/// a form field would accept it (`1e3` is 1000).
pub fn parse_decimal(raw: &str) -> Result<Decimal, AmountError> {
    let trimmed = raw.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| AmountError::NotANumber(trimmed.to_string()))
}

/// Checks that a decimal fits a price column and is positive
///
/// Trailing zeros do not count as decimal places (`1.500` is fine).
pub fn check_price(amount: Decimal) -> Result<Decimal, AmountError> {
    let normalized = amount.normalize();

    if normalized.scale() > DECIMAL_PLACES {
        return Err(AmountError::TooManyDecimalPlaces);
    }
    if normalized.abs().trunc() >= Decimal::from(WHOLE_PART_LIMIT) {
        return Err(AmountError::TooManyWholeDigits);
    }
    if normalized <= Decimal::ZERO {
        return Err(AmountError::NotPositive);
    }

    Ok(with_cents(normalized))
}

/// Parses and bounds-checks in one step
pub fn parse_price(raw: &str) -> Result<Decimal, AmountError> {
    check_price(parse_decimal(raw)?)
}

/// Rescales to exactly two decimal places for display and storage
pub fn with_cents(amount: Decimal) -> Decimal {
    let mut scaled = amount;
    scaled.rescale(DECIMAL_PLACES);
    scaled
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_decimal_accepts_plain_and_padded_input() {
        assert_eq!(parse_decimal("100").unwrap(), dec("100"));
        assert_eq!(parse_decimal(" 12.50 ").unwrap(), dec("12.50"));
        assert_eq!(parse_decimal("1e3").unwrap(), dec("1000"));
    }

    #[test]
    fn test_parse_decimal_rejects_garbage() {
        for raw in ["", "abc", "12,50", "1.2.3", "NaN"] {
            assert!(
                matches!(parse_decimal(raw), Err(AmountError::NotANumber(_))),
                "{raw:?} should not parse"
            );
        }
    }

    #[test]
    fn test_check_price_bounds() {
        assert_eq!(check_price(dec("150")).unwrap().to_string(), "150.00");
        assert_eq!(check_price(dec("1.500")).unwrap().to_string(), "1.50");
        assert_eq!(check_price(dec("999999999.99")).unwrap(), dec("999999999.99"));

        assert_eq!(check_price(dec("0.001")), Err(AmountError::TooManyDecimalPlaces));
        assert_eq!(check_price(dec("1000000000")), Err(AmountError::TooManyWholeDigits));
        assert_eq!(check_price(dec("0")), Err(AmountError::NotPositive));
        assert_eq!(check_price(dec("-5")), Err(AmountError::NotPositive));
    }

    #[test]
    fn test_parse_price_messages() {
        assert_eq!(
            parse_price("12.345").unwrap_err().to_string(),
            "Ensure that there are no more than 2 decimal places."
        );
        assert_eq!(
            parse_price("ten").unwrap_err().to_string(),
            "'ten' is not a valid decimal number."
        );
    }
}
