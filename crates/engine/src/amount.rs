use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Positive monetary amount of a single expense.
///
/// Amounts are plain `f64` values: the settlement works in double precision and
/// never rounds. The constructor only guarantees the value is finite and
/// strictly positive.
///
/// # Examples
///
/// ```rust
/// use engine::Amount;
///
/// let amount = Amount::new(12.5).unwrap();
/// assert_eq!(amount.value(), 12.5);
/// assert_eq!(amount.to_string(), "12.50");
/// ```
///
/// Parsing from user input (accepts `.` or `,` as decimal separator; rejects >
/// 2 decimals):
///
/// ```rust
/// use engine::Amount;
///
/// assert_eq!("10".parse::<Amount>().unwrap().value(), 10.0);
/// assert_eq!("10,5".parse::<Amount>().unwrap().value(), 10.5);
/// assert!("12.345".parse::<Amount>().is_err());
/// assert!("-3".parse::<Amount>().is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Amount(f64);

impl Amount {
    /// Creates a new amount, rejecting zero, negative and non-finite values.
    pub fn new(value: f64) -> Result<Self, EngineError> {
        if !value.is_finite() {
            return Err(EngineError::InvalidAmount(format!(
                "amount must be finite, got {value}"
            )));
        }
        if value <= 0.0 {
            return Err(EngineError::InvalidAmount(format!(
                "amount must be > 0, got {value}"
            )));
        }
        Ok(Self(value))
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl TryFrom<f64> for Amount {
    type Error = EngineError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for f64 {
    fn from(value: Amount) -> Self {
        value.0
    }
}

impl FromStr for Amount {
    type Err = EngineError;

    /// Parses a decimal string.
    ///
    /// Validation rules:
    /// - `.` or `,` as decimal separator, optional leading `+`
    /// - max 2 fractional digits (rejects `12.345`)
    /// - rejects empty, negative and zero amounts
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let empty = || EngineError::InvalidAmount("empty amount".to_string());
        let invalid = || EngineError::InvalidAmount(format!("invalid amount: {s}"));
        let overflow = || EngineError::InvalidAmount("amount too large".to_string());

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(empty());
        }
        if trimmed.starts_with('-') {
            return Err(EngineError::InvalidAmount(format!(
                "amount must be > 0, got {trimmed}"
            )));
        }

        let rest = trimmed.strip_prefix('+').unwrap_or(trimmed).trim();
        if rest.is_empty() {
            return Err(empty());
        }

        let rest = rest.replace(',', ".");
        let mut parts = rest.split('.');
        let units_str = parts.next().ok_or_else(invalid)?;
        let fraction_str = parts.next();

        if parts.next().is_some() {
            return Err(invalid());
        }

        if units_str.is_empty() || !units_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let units: i64 = units_str.parse().map_err(|_| invalid())?;

        let cents: i64 = match fraction_str {
            None | Some("") => 0,
            Some(frac) => {
                if !frac.chars().all(|c| c.is_ascii_digit()) {
                    return Err(invalid());
                }
                match frac.len() {
                    1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
                    2 => frac.parse::<i64>().map_err(|_| invalid())?,
                    _ => return Err(EngineError::InvalidAmount("too many decimals".to_string())),
                }
            }
        };

        let total = units
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .ok_or_else(overflow)?;

        Self::new(total as f64 / 100.0)
    }
}
