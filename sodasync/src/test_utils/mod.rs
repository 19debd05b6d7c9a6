//! Helpers for building records and pipelines in tests.

use chrono::Duration;
use serde_json::{Map, Value};

use sodasync_config::shared::{PipelineConfig, RetryConfig};

use crate::types::{Record, Watermark};

/// Builds a record with an empty payload.
///
/// Panics on a malformed timestamp, which is acceptable in tests.
pub fn record(id: &str, updated_on: &str) -> Record {
    Record {
        id: id.to_owned(),
        updated_on: Watermark::parse(updated_on).unwrap(),
        payload: Map::new(),
    }
}

/// Builds a record with string payload fields.
pub fn record_with(id: &str, updated_on: &str, fields: &[(&str, &str)]) -> Record {
    let mut base = record(id, updated_on);
    for (key, value) in fields {
        base.payload
            .insert((*key).to_owned(), Value::String((*value).to_owned()));
    }

    base
}

/// Builds `count` records with ids `"1"` to `"{count}"` whose `updated_on`
/// timestamps start at `start` and advance by `step_secs` per record.
pub fn record_series(count: usize, start: &str, step_secs: i64) -> Vec<Record> {
    let start = Watermark::parse(start).unwrap().into_inner();

    (0..count)
        .map(|i| Record {
            id: (i + 1).to_string(),
            updated_on: Watermark::from(start + Duration::seconds(step_secs * i as i64)),
            payload: Map::new(),
        })
        .collect()
}

/// Builds a pipeline config with retries disabled, so injected errors fail
/// fast instead of sleeping through backoff.
pub fn pipeline_config(id: u64) -> PipelineConfig {
    PipelineConfig {
        id,
        fetch_retry: RetryConfig::no_retry(),
        load_retry: RetryConfig::no_retry(),
    }
}
