use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::SyncResult;

/// Format of SODA "floating timestamps", e.g. `2025-01-01T12:30:00.000`.
///
/// The portal serves change timestamps without a timezone; they are treated as
/// naive timestamps end to end so the filter the fetcher sends back compares
/// against exactly what was received.
const SODA_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Format used when rendering a watermark back into a `$where` filter.
///
/// Parsing accepts any fractional precision, but output pins the milliseconds:
/// `%.f` would drop a zero fractional part entirely, while the portal always
/// serves the `.000`-padded form.
const SODA_TIMESTAMP_DISPLAY_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// The change watermark: a single `updated_on` timestamp value.
///
/// A watermark of `w` means "everything with `updated_on <= w` has been
/// ingested". Watermarks are totally ordered and only ever advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Watermark(NaiveDateTime);

impl Watermark {
    /// Parses a watermark from a SODA floating timestamp string.
    pub fn parse(value: &str) -> SyncResult<Self> {
        let inner = NaiveDateTime::parse_from_str(value, SODA_TIMESTAMP_FORMAT)?;

        Ok(Self(inner))
    }

    /// Returns the inner timestamp.
    pub fn into_inner(self) -> NaiveDateTime {
        self.0
    }
}

impl From<NaiveDateTime> for Watermark {
    fn from(value: NaiveDateTime) -> Self {
        Self(value)
    }
}

impl fmt::Display for Watermark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(SODA_TIMESTAMP_DISPLAY_FORMAT))
    }
}

impl Serialize for Watermark {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Watermark {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;

        Watermark::parse(&value).map_err(serde::de::Error::custom)
    }
}
