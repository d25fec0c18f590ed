use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

//--------------------------------------        Cents        ---------------------------------------------------------
/// A monetary amount in hundredths of the store currency.
///
/// Shopify sends prices as decimal strings (`"99.99"`). Parsing them into an integer number of cents keeps all the
/// point arithmetic exact. Digits beyond the second decimal place are truncated toward zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cents(i64);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Value cannot be represented as a currency amount: {0}")]
pub struct CentsConversionError(String);

impl From<i64> for Cents {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl Cents {
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn from_units(units: i64) -> Self {
        Self(units * 100)
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }
}

impl FromStr for Cents {
    type Err = CentsConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = |reason: &str| CentsConversionError(format!("{s}. {reason}"));
        let trimmed = s.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let (whole, fraction) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(err("No digits"));
        }
        if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
            return Err(err("Only digits and a single decimal point are allowed"));
        }
        let whole = if whole.is_empty() { 0 } else { whole.parse::<i64>().map_err(|e| err(&e.to_string()))? };
        let cents = fraction.chars().chain(std::iter::repeat('0')).take(2).collect::<String>();
        let cents = cents.parse::<i64>().map_err(|e| err(&e.to_string()))?;
        let value = whole.checked_mul(100).and_then(|v| v.checked_add(cents)).ok_or_else(|| err("Overflow"))?;
        Ok(Self(if negative { -value } else { value }))
    }
}

impl Display for Cents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

#[cfg(test)]
mod test {
    use super::Cents;

    #[test]
    fn parse_shopify_prices() {
        assert_eq!("99.99".parse::<Cents>().unwrap(), Cents::from(9999));
        assert_eq!("10".parse::<Cents>().unwrap(), Cents::from(1000));
        assert_eq!("10.5".parse::<Cents>().unwrap(), Cents::from(1050));
        assert_eq!("0.05".parse::<Cents>().unwrap(), Cents::from(5));
        assert_eq!(".5".parse::<Cents>().unwrap(), Cents::from(50));
        assert_eq!("9.999".parse::<Cents>().unwrap(), Cents::from(999));
        assert_eq!("-5.00".parse::<Cents>().unwrap(), Cents::from(-500));
        assert_eq!(" 12.30 ".parse::<Cents>().unwrap(), Cents::from(1230));
    }

    #[test]
    fn reject_garbage() {
        assert!("".parse::<Cents>().is_err());
        assert!(".".parse::<Cents>().is_err());
        assert!("1.2.3".parse::<Cents>().is_err());
        assert!("abc".parse::<Cents>().is_err());
        assert!("1e5".parse::<Cents>().is_err());
        assert!("99999999999999999999".parse::<Cents>().is_err());
    }

    #[test]
    fn display() {
        assert_eq!(Cents::from(9999).to_string(), "99.99");
        assert_eq!(Cents::from(5).to_string(), "0.05");
        assert_eq!(Cents::from(-250).to_string(), "-2.50");
        assert_eq!(Cents::from_units(3).to_string(), "3.00");
    }
}
