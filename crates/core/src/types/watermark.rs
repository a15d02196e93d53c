//! Fulfillment polling watermark.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Watermark`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum WatermarkError {
    /// The input string is empty.
    #[error("watermark cannot be empty")]
    Empty,
    /// The input is not an RFC 3339 timestamp.
    #[error("watermark must be an RFC 3339 timestamp: {0}")]
    Invalid(#[from] chrono::ParseError),
}

/// The modification time up to which fulfillments have been processed.
///
/// Polls ask for everything modified at or after the watermark. After a
/// batch is handled, the next watermark is one second past the newest
/// record, so a record sitting on the inclusive boundary is not fetched
/// twice.
///
/// ```
/// use erp_bridge_core::Watermark;
///
/// let watermark = Watermark::parse("2024-03-01T10:00:00Z").unwrap();
/// assert_eq!(watermark.to_string(), "2024-03-01T10:00:00Z");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Watermark(DateTime<Utc>);

impl Watermark {
    /// Wrap a timestamp.
    #[must_use]
    pub const fn new(at: DateTime<Utc>) -> Self {
        Self(at)
    }

    /// Parse an RFC 3339 timestamp, normalizing it to UTC.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty or not RFC 3339.
    pub fn parse(s: &str) -> Result<Self, WatermarkError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(WatermarkError::Empty);
        }
        let at = DateTime::parse_from_rfc3339(s)?;
        Ok(Self(at.with_timezone(&Utc)))
    }

    /// The watermark following a record last modified at `last_modified`.
    #[must_use]
    pub fn after(last_modified: DateTime<Utc>) -> Self {
        Self(last_modified + TimeDelta::seconds(1))
    }

    #[must_use]
    pub const fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }
}

impl std::fmt::Display for Watermark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true))
    }
}

impl std::str::FromStr for Watermark {
    type Err = WatermarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
