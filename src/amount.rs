use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::model::Count;

/// Fixed-point decimal with 4 decimal places, stored as a scaled integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Amount(i64);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("'{0}' is not a decimal amount")]
    Malformed(String),
    #[error("'{0}' has more than 4 decimal places")]
    TooPrecise(String),
    #[error("'{0}' is out of range")]
    Overflow(String),
}

impl Amount {
    const SCALE: i64 = 10_000;
    const PLACES: usize = 4;

    pub fn from_scaled(value: i64) -> Self {
        Amount(value)
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Value of `count` units of `self`.
    pub fn times(self, count: Count) -> Self {
        Amount(self.0.saturating_mul(count))
    }

    /// How many whole `unit`s fit in `self`, truncating toward zero.
    ///
    /// Returns 0 for a non-positive unit.
    pub fn whole_units_of(self, unit: Amount) -> Count {
        if unit.0 <= 0 { 0 } else { self.0 / unit.0 }
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    /// Exact parse of `[-]digits[.digits]`, no float round-trip.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let malformed = || AmountError::Malformed(s.to_string());

        let (negative, unsigned) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        let (whole, frac) = unsigned.split_once('.').unwrap_or((unsigned, ""));

        if whole.is_empty() && frac.is_empty() {
            return Err(malformed());
        }
        if !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
            return Err(malformed());
        }
        if frac.len() > Self::PLACES {
            return Err(AmountError::TooPrecise(s.to_string()));
        }

        let overflow = || AmountError::Overflow(s.to_string());
        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| overflow())?
        };
        let frac: i64 = format!("{frac:0<width$}", width = Self::PLACES)
            .parse()
            .map_err(|_| malformed())?;

        let scaled = whole
            .checked_mul(Self::SCALE)
            .and_then(|w| w.checked_add(frac))
            .ok_or_else(overflow)?;

        Ok(Amount(if negative { -scaled } else { scaled }))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.abs();
        let whole = abs / Self::SCALE;
        let frac = abs % Self::SCALE;
        write!(f, "{sign}{whole}.{frac:04}")
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
