use chrono::Utc;
use serde::Serialize;
use std::fmt;
use std::ops::AddAssign;
use uuid::Uuid;

use crate::types::Watermark;

/// Lineage tag attached to every row written by a single run.
///
/// Distinct from the domain `updated_on` timestamp: it identifies *when and by
/// which run* a row was last loaded, for audit purposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadId(String);

impl LoadId {
    /// Generates a fresh load id from the current UTC time and a random suffix.
    pub fn generate() -> Self {
        let timestamp = Utc::now().format("%Y%m%dT%H%M%SZ");
        let suffix = Uuid::new_v4().simple();

        Self(format!("{timestamp}-{suffix}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LoadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for LoadId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Counters produced by merging one batch of records into the destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    /// Rows that did not exist before the merge.
    pub inserted: u64,
    /// Existing rows whose fields differed and were overwritten.
    pub updated: u64,
}

impl AddAssign for MergeStats {
    fn add_assign(&mut self, other: Self) {
        self.inserted += other.inserted;
        self.updated += other.updated;
    }
}

/// Terminal status of a sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Done,
    Failed,
}

/// Summary of one completed sync run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Terminal status of the run.
    pub status: RunStatus,
    /// Lineage tag attached to every row this run wrote.
    pub load_id: LoadId,
    /// Number of pages fetched from the source.
    pub pages_fetched: u64,
    /// Total records fetched and handed to the merge loader.
    pub records_processed: u64,
    /// Rows newly inserted into the destination.
    pub records_inserted: u64,
    /// Existing rows overwritten with changed fields.
    pub records_updated: u64,
    /// Highest `updated_on` merged by this run, if any records were fetched.
    pub max_updated_on: Option<Watermark>,
    /// Wall-clock duration of the run in milliseconds.
    pub duration_ms: u64,
}
