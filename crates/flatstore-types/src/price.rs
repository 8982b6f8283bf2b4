//! Currency-normalized price held as integer cents.

use std::fmt;
use std::str::FromStr;

use flatstore_error::FlatError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Symbols stripped from the front of a price field.
const CURRENCY_SYMBOLS: [char; 4] = ['$', '€', '£', '¥'];

/// Largest price accepted, in whole currency units.
const MAX_UNITS: f64 = 1.0e12;

/// A non-negative price with two-decimal precision.
///
/// Equality is numeric: `"5.0"`, `"5"` and `"$5.00"` are the same price.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price {
    cents: u64,
}

impl Price {
    pub const FREE: Self = Self { cents: 0 };

    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self { cents }
    }

    #[must_use]
    pub const fn cents(self) -> u64 {
        self.cents
    }

    #[must_use]
    pub const fn is_free(self) -> bool {
        self.cents == 0
    }

    /// Lenient decode used for backing-file fields. Never fails: empty and
    /// unparsable input both become [`Price::FREE`].
    #[must_use]
    pub fn normalize(raw: &str) -> Self {
        Self::parse(raw).unwrap_or(Self::FREE)
    }

    /// Strict parse used for user input. `None` for empty or unparsable text.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = strip_currency(raw);
        if trimmed.is_empty() {
            return None;
        }
        let value: f64 = trimmed.parse().ok()?;
        Self::from_units(value)
    }

    /// Like [`parse`](Self::parse) but refuses input that is not already a
    /// whole number of cents: plain digits with at most two significant
    /// decimals. `"4.990"` is accepted, `"4.994"` and `"5e0"` are not.
    #[must_use]
    pub fn parse_exact(raw: &str) -> Option<Self> {
        let text = strip_currency(raw);
        let (whole, fraction) = text.split_once('.').unwrap_or((text, ""));
        let digits_only = whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit());
        if !digits_only || fraction.trim_end_matches('0').len() > 2 {
            return None;
        }
        Self::parse(text)
    }

    fn from_units(value: f64) -> Option<Self> {
        if !value.is_finite() || value < 0.0 || value > MAX_UNITS {
            return None;
        }
        Some(Self {
            cents: (value * 100.0).round() as u64,
        })
    }
}

fn strip_currency(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix(CURRENCY_SYMBOLS)
        .map_or(trimmed, str::trim_start)
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.cents / 100, self.cents % 100)
    }
}

impl FromStr for Price {
    type Err = FlatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| FlatError::invalid_argument("price", s))
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PriceRepr {
    Number(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let parsed = match PriceRepr::deserialize(deserializer)? {
            PriceRepr::Number(value) => Self::from_units(value),
            PriceRepr::Text(text) if text.trim().is_empty() => Some(Self::FREE),
            PriceRepr::Text(text) => Self::parse(&text),
        };
        parsed.ok_or_else(|| serde::de::Error::custom("price must be a non-negative amount"))
    }
}
