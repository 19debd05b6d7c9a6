use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::destination::base::Destination;
use crate::error::{SyncError, SyncResult};
use crate::types::{LoadId, MergeStats, Record, Watermark};

#[derive(Debug, Clone)]
struct StoredRow {
    record: Record,
    load_id: String,
}

#[derive(Debug)]
struct Inner {
    rows: HashMap<String, StoredRow>,
    merge_errors: Vec<SyncError>,
}

/// An in-memory [`Destination`] for tests.
///
/// Mirrors the merge semantics of the real destination: rows with an unchanged
/// `(updated_on, payload)` are skipped and keep the load id of the run that
/// last changed them.
#[derive(Debug, Clone)]
pub struct MemoryDestination {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryDestination {
    pub fn new() -> Self {
        let inner = Inner {
            rows: HashMap::new(),
            merge_errors: Vec::new(),
        };

        Self {
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    /// Queues an error to be returned by the next merge.
    pub async fn inject_merge_error(&self, error: SyncError) {
        let mut inner = self.inner.lock().await;
        inner.merge_errors.push(error);
    }

    pub async fn row_count(&self) -> usize {
        let inner = self.inner.lock().await;
        inner.rows.len()
    }

    pub async fn get(&self, id: &str) -> Option<Record> {
        let inner = self.inner.lock().await;
        inner.rows.get(id).map(|row| row.record.clone())
    }

    /// Returns the load id of the run that last changed the given row.
    pub async fn load_id_of(&self, id: &str) -> Option<String> {
        let inner = self.inner.lock().await;
        inner.rows.get(id).map(|row| row.load_id.clone())
    }
}

impl Default for MemoryDestination {
    fn default() -> Self {
        Self::new()
    }
}

impl Destination for MemoryDestination {
    async fn max_updated_on(&self) -> SyncResult<Option<Watermark>> {
        let inner = self.inner.lock().await;
        Ok(inner.rows.values().map(|row| row.record.updated_on).max())
    }

    async fn merge(&self, load_id: &LoadId, records: &[Record]) -> SyncResult<MergeStats> {
        let mut inner = self.inner.lock().await;

        if let Some(error) = inner.merge_errors.pop() {
            return Err(error);
        }

        let mut stats = MergeStats::default();

        for record in records {
            match inner.rows.entry(record.id.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(StoredRow {
                        record: record.clone(),
                        load_id: load_id.as_str().to_owned(),
                    });
                    stats.inserted += 1;
                }
                Entry::Occupied(mut slot) => {
                    let row = slot.get_mut();
                    if row.record.updated_on != record.updated_on
                        || row.record.payload != record.payload
                    {
                        row.record = record.clone();
                        row.load_id = load_id.as_str().to_owned();
                        stats.updated += 1;
                    }
                }
            }
        }

        Ok(stats)
    }
}
