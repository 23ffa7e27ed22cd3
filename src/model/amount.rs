//! Amount type for handling monetary values.
//!
//! This module provides the `Amount` type which wraps `Decimal`. It parses values that may carry
//! a currency symbol and thousands separators, and it accepts both JSON numbers (as sent by the
//! expense backend) and JSON strings.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// Currency symbols that are stripped when parsing.
const CURRENCY_SYMBOLS: &[char] = &['₹', '$'];

/// Represents a money amount.
///
/// # Examples
///
/// ```
/// # use spendwise::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("₹1,250.5").unwrap();
/// assert_eq!(amount.to_string(), "1250.50");
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

    /// Returns true if the amount is positive.
    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.value.is_sign_positive()
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.value.is_sign_negative()
    }

    /// `self + other`, or `None` if the result does not fit in a `Decimal`.
    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.value.checked_add(other.value).map(Amount::new)
    }

    /// The sum of `amounts`, or `None` if it does not fit in a `Decimal`.
    pub fn checked_sum<I>(amounts: I) -> Option<Amount>
    where
        I: IntoIterator<Item = Amount>,
    {
        amounts
            .into_iter()
            .try_fold(Amount::ZERO, Amount::checked_add)
    }
}

/// An error that can occur when parsing strings into `Amount` values.
pub struct AmountError(rust_decimal::Error);

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Amount::default());
        }

        let (negative, rest) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let digits: String = rest
            .trim_start_matches(CURRENCY_SYMBOLS)
            .chars()
            .filter(|c| *c != ',')
            .collect();

        let value = Decimal::from_str(&digits).map_err(AmountError)?;
        Ok(Amount::new(if negative { -value } else { value }))
    }
}

impl Display for Amount {
    /// Always two decimal places, no currency symbol and no separators.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut rounded = self.value.round_dp(2);
        rounded.rescale(2);
        write!(f, "{rounded}")
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.value.to_f64() {
            Some(f) => serializer.serialize_f64(f),
            None => serializer.serialize_str(&self.value.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(AmountVisitor)
    }
}

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("a number or a string holding a decimal amount")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
        Ok(Amount::new(Decimal::from(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
        Ok(Amount::new(Decimal::from(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Amount, E> {
        // The shortest round-trip representation of the float, e.g. 12.3 and not 12.29999...
        Decimal::from_str(&v.to_string())
            .map(Amount::new)
            .map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
        Amount::from_str(v).map_err(E::custom)
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
        let amount = Amount::from_str("50.00").unwrap();
        assert_eq!(amount.value(), dec("50.00"));
    }

    #[test]
    fn test_parse_currency_symbols() {
        assert_eq!(Amount::from_str("₹120").unwrap().value(), dec("120"));
        assert_eq!(Amount::from_str("$7.25").unwrap().value(), dec("7.25"));
        assert_eq!(Amount::from_str("-₹40").unwrap().value(), dec("-40"));
    }

    #[test]
    fn test_parse_with_commas() {
        let amount = Amount::from_str("₹1,234,567.89").unwrap();
        assert_eq!(amount.value(), dec("1234567.89"));
    }

    #[test]
    fn test_parse_empty_string() {
        let amount = Amount::from_str("  ").unwrap();
        assert!(amount.is_zero());
    }

    #[test]
    fn test_parse_garbage() {
        assert!(Amount::from_str("twelve").is_err());
    }

    #[test]
    fn test_display_two_decimals() {
        assert_eq!(Amount::from_str("5").unwrap().to_string(), "5.00");
        assert_eq!(Amount::from_str("5.5").unwrap().to_string(), "5.50");
        assert_eq!(Amount::from_str("5.555").unwrap().to_string(), "5.56");
        assert_eq!(Amount::from_str("-12.1").unwrap().to_string(), "-12.10");
    }

    #[test]
    fn test_deserialize_number_and_string() {
        let a: Amount = serde_json::from_str("250").unwrap();
        assert_eq!(a.value(), dec("250"));
        let b: Amount = serde_json::from_str("12.3").unwrap();
        assert_eq!(b.value(), dec("12.3"));
        let c: Amount = serde_json::from_str("\"₹99.90\"").unwrap();
        assert_eq!(c.value(), dec("99.90"));
    }

    #[test]
    fn test_serialize_as_number() {
        let amount = Amount::from_str("42.5").unwrap();
        assert_eq!(serde_json::to_string(&amount).unwrap(), "42.5");
    }

    #[test]
    fn test_sign() {
        assert!(Amount::from_str("1").unwrap().is_positive());
        assert!(Amount::from_str("-1").unwrap().is_negative());
        let zero = Amount::ZERO;
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());
    }

    #[test]
    fn test_checked_sum() {
        let total = Amount::checked_sum(
            ["1.50", "2.25", "3"]
                .iter()
                .map(|s| Amount::from_str(s).unwrap()),
        )
        .unwrap();
        assert_eq!(total.value(), dec("6.75"));
        assert_eq!(Amount::checked_sum([]), Some(Amount::ZERO));
    }

    #[test]
    fn test_checked_sum_overflow() {
        let huge: Amount = serde_json::from_str("5e28").unwrap();
        assert!(huge.checked_add(huge).is_none());
        assert!(Amount::checked_sum([Amount::ZERO, huge, huge]).is_none());
        assert_eq!(huge.checked_add(Amount::ZERO), Some(huge));
    }
}
