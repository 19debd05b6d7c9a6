use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::Watermark;

/// One crime incident as served by the source API.
///
/// Only the merge key and the change watermark are modeled explicitly; every
/// other attribute (location, type, coordinates, ...) is carried as an opaque
/// pass-through payload so schema drift at the source never breaks ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Stable unique identifier of the incident, coerced to a string.
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    /// Timestamp of the last change to this record at the source.
    pub updated_on: Watermark,
    /// Remaining domain attributes, passed through untouched.
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

/// Coerces the record id to a string.
///
/// Some portals serve numeric ids; the destination keys on a string id, so
/// numbers are stringified on the way in.
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;

    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "record id must be a string or number, got {other}"
        ))),
    }
}

/// One bounded batch of records returned by a single paginated API call.
///
/// Records are ordered ascending by `updated_on`, which is what lets the
/// watermark advance monotonically page by page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Offset this page was fetched at.
    pub offset: u64,
    /// Records in ascending `updated_on` order.
    pub records: Vec<Record>,
}

impl Page {
    pub fn new(offset: u64, records: Vec<Record>) -> Self {
        Self { offset, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the highest `updated_on` in this page.
    ///
    /// Since pages are sorted ascending this is the last record's timestamp,
    /// but the maximum is computed explicitly to stay correct for hand-built
    /// pages in tests.
    pub fn max_updated_on(&self) -> Option<Watermark> {
        self.records.iter().map(|record| record.updated_on).max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_record_with_opaque_payload() {
        let json = r#"{
            "id": "13289105",
            "updated_on": "2025-02-10T15:40:01.000",
            "case_number": "JH123456",
            "primary_type": "THEFT",
            "latitude": "41.878",
            "arrest": false
        }"#;

        let record: Record = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, "13289105");
        assert_eq!(
            record.updated_on,
            Watermark::parse("2025-02-10T15:40:01.000").unwrap()
        );
        assert_eq!(record.payload.len(), 4);
        assert_eq!(record.payload["primary_type"], "THEFT");
        assert_eq!(record.payload["arrest"], false);
    }

    #[test]
    fn coerces_numeric_id_to_string() {
        let json = r#"{"id": 42, "updated_on": "2025-01-01T00:00:00.000"}"#;
        let record: Record = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, "42");
    }

    #[test]
    fn rejects_record_without_updated_on() {
        let json = r#"{"id": "1", "primary_type": "THEFT"}"#;
        let result: Result<Record, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn page_max_updated_on() {
        let records: Vec<Record> = serde_json::from_str(
            r#"[
                {"id": "1", "updated_on": "2025-01-01T00:00:00.000"},
                {"id": "2", "updated_on": "2025-01-03T00:00:00.000"},
                {"id": "3", "updated_on": "2025-01-02T00:00:00.000"}
            ]"#,
        )
        .unwrap();

        let page = Page::new(0, records);
        assert_eq!(
            page.max_updated_on(),
            Some(Watermark::parse("2025-01-03T00:00:00.000").unwrap())
        );
    }

    #[test]
    fn empty_page_has_no_watermark() {
        let page = Page::new(0, vec![]);
        assert!(page.max_updated_on().is_none());
        assert!(page.is_empty());
    }
}
