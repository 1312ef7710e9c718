//! Amount type for handling monetary values with optional dollar signs.
//!
//! This module provides the `Amount` type which wraps `Decimal`, parses values that may or may not
//! include a dollar sign and commas, and always displays as currency with two decimal places.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// Represents a dollar amount.
///
/// Parsing accepts surrounding whitespace, an optional dollar sign, thousands separators and
/// scientific notation. Display is always `$` with commas and two decimal places.
///
/// # Examples
///
/// ```
/// # use finance_tracker::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("1234.5").unwrap();
/// assert_eq!(amount.to_string(), "$1,234.50");
///
/// let negative = Amount::from_str("-$12").unwrap();
/// assert_eq!(negative.to_string(), "-$12.00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount {
    value: Decimal,
}

impl Amount {
    pub const ZERO: Amount = Amount::new(Decimal::ZERO);

    pub const fn new(value: Decimal) -> Self {
        Self { value }
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.value.is_sign_positive()
    }

    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.value.is_sign_negative()
    }
}

/// An error that can occur when parsing strings into `Amount` values.
pub enum AmountError {
    Empty,
    Parse(rust_decimal::Error),
}

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AmountError::Empty => f.write_str("Empty"),
            AmountError::Parse(e) => Debug::fmt(e, f),
        }
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AmountError::Empty => f.write_str("no amount was given"),
            AmountError::Parse(e) => Display::fmt(e, f),
        }
    }
}

impl Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AmountError::Empty => None,
            AmountError::Parse(e) => Some(e),
        }
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AmountError::Empty);
        }

        // "-$50.00", "$50.00", "-50.00" and "50.00" are all accepted
        let without_dollar = if let Some(after_minus) = trimmed.strip_prefix('-') {
            match after_minus.strip_prefix('$') {
                Some(after_dollar) => format!("-{after_dollar}"),
                None => trimmed.to_string(),
            }
        } else {
            trimmed.strip_prefix('$').unwrap_or(trimmed).to_string()
        };

        let without_commas = without_dollar.replace(',', "");
        if without_commas.is_empty() || without_commas == "-" {
            return Err(AmountError::Empty);
        }

        let value = match Decimal::from_str(&without_commas) {
            Ok(value) => value,
            Err(e) => {
                if without_commas.contains(['e', 'E']) {
                    Decimal::from_scientific(&without_commas).map_err(AmountError::Parse)?
                } else {
                    return Err(AmountError::Parse(e));
                }
            }
        };
        Ok(Amount::new(value))
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let cents = self
            .value
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let sign = if cents.is_sign_negative() && !cents.is_zero() {
            "-"
        } else {
            ""
        };
        let digits = format!("{:.2}", cents.abs());
        let (whole, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));
        write!(f, "{sign}${}.{fraction}", group_thousands(whole))
    }
}

/// Inserts a comma between every group of three digits, e.g. `1234567` becomes `1,234,567`.
fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (ix, c) in digits.chars().enumerate() {
        if ix > 0 && (digits.len() - ix) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_plain() {
        let amount = Amount::from_str("50.25").unwrap();
        assert_eq!(amount.value(), dec("50.25"));
    }

    #[test]
    fn test_parse_with_dollar_and_commas() {
        let amount = Amount::from_str("$1,234,567.89").unwrap();
        assert_eq!(amount.value(), dec("1234567.89"));
    }

    #[test]
    fn test_parse_negative_with_dollar_sign() {
        let amount = Amount::from_str("-$50.00").unwrap();
        assert_eq!(amount.value(), dec("-50.00"));
        assert!(amount.is_negative());
    }

    #[test]
    fn test_parse_whitespace() {
        let amount = Amount::from_str("  20  ").unwrap();
        assert_eq!(amount.value(), dec("20"));
    }

    #[test]
    fn test_parse_scientific() {
        let amount = Amount::from_str("1e3").unwrap();
        assert_eq!(amount.value(), dec("1000"));
    }

    #[test]
    fn test_parse_empty_is_an_error() {
        assert!(matches!(Amount::from_str(""), Err(AmountError::Empty)));
        assert!(matches!(Amount::from_str("   "), Err(AmountError::Empty)));
        assert!(matches!(Amount::from_str("$"), Err(AmountError::Empty)));
    }

    #[test]
    fn test_parse_garbage_is_an_error() {
        assert!(Amount::from_str("abc").is_err());
        assert!(Amount::from_str("12.3.4").is_err());
        assert!(Amount::from_str("ten dollars").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Amount::new(dec("980")).to_string(), "$980.00");
        assert_eq!(Amount::new(dec("1234.5")).to_string(), "$1,234.50");
        assert_eq!(Amount::new(dec("-12")).to_string(), "-$12.00");
        assert_eq!(Amount::ZERO.to_string(), "$0.00");
    }

    #[test]
    fn test_display_is_exact_for_large_values() {
        assert_eq!(
            Amount::new(Decimal::MAX).to_string(),
            "$79,228,162,514,264,337,593,543,950,335.00"
        );
        assert_eq!(
            Amount::new(dec("999999999999.99")).to_string(),
            "$999,999,999,999.99"
        );
        assert_eq!(Amount::new(dec("100000")).to_string(), "$100,000.00");
    }

    #[test]
    fn test_display_rounds_to_cents() {
        assert_eq!(Amount::new(dec("0.005")).to_string(), "$0.01");
        assert_eq!(Amount::new(dec("2.994")).to_string(), "$2.99");
        assert_eq!(Amount::new(dec("-0.001")).to_string(), "$0.00");
        assert_eq!(Amount::new(dec("-999.999")).to_string(), "-$1,000.00");
    }

    #[test]
    fn test_zero_is_not_positive_or_negative() {
        let zero = Amount::from_str("0.00").unwrap();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());
    }

    #[test]
    fn test_serde() {
        let amount = Amount::new(dec("50"));
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, "\"$50.00\"");
        let back: Amount = serde_json::from_str(&json).unwrap();
        assert_eq!(back.value(), dec("50"));
    }
}
