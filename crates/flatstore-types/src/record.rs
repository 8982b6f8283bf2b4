//! The shape every cached record type shares.

use std::fmt;

use flatstore_error::Result;

/// Why a single row could not become a record. Rejected rows are dropped and
/// counted, never surfaced as errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {reason} ({value:?})")]
pub struct DecodeReject {
    pub field: &'static str,
    pub reason: &'static str,
    pub value: String,
}

impl DecodeReject {
    pub fn new(field: &'static str, reason: &'static str, value: &str) -> Self {
        Self {
            field,
            reason,
            value: value.to_owned(),
        }
    }
}

/// A record type backed by one delimited file.
pub trait Record: Clone + fmt::Debug + PartialEq + Send + Sync + 'static {
    /// Short lowercase name used in errors and logs.
    const KIND: &'static str;
    /// Column names, in file order.
    const HEADER: &'static [&'static str];
    /// Whether `add` must reject a record whose identity already exists.
    const UNIQUE_IDENTITY: bool;

    /// The field used to match records for delete.
    fn identity(&self) -> &str;

    /// Decode one data row. `fields.len()` equals `HEADER.len()`.
    fn decode(fields: &[String]) -> std::result::Result<Self, DecodeReject>;

    /// Render the record as one data row, in `HEADER` order.
    fn encode(&self) -> Vec<String>;

    /// Check structural bounds before the record is persisted.
    fn validate(&self) -> Result<()>;
}

/// `true` when an identity field is empty or the `nan` sentinel left behind
/// by upstream data exports.
#[must_use]
pub fn is_missing_identity(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan")
}

/// Case-insensitive comparison of whitespace-trimmed text.
#[must_use]
pub fn identity_matches(stored: &str, key: &str) -> bool {
    stored
        .trim()
        .chars()
        .flat_map(char::to_lowercase)
        .eq(key.trim().chars().flat_map(char::to_lowercase))
}

/// Parse a float that must be finite.
pub(crate) fn parse_finite(
    field: &'static str,
    raw: &str,
) -> std::result::Result<f64, DecodeReject> {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(DecodeReject::new(field, "not a finite number", raw)),
    }
}

/// Render a float the way it is stored in the backing file.
pub(crate) fn render_float(value: f64) -> String {
    format!("{value}")
}
