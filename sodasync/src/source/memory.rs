use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::{SyncError, SyncResult};
use crate::source::base::{PageQuery, PageSource};
use crate::types::Record;

#[derive(Debug)]
struct Inner {
    records: Vec<Record>,
    fetch_errors: Vec<SyncError>,
}

/// An in-memory [`PageSource`] for tests.
///
/// Serves pages out of a vector, applying the same filter, ordering and
/// offset semantics as the real API. Errors can be injected to exercise
/// failure paths; each injected error is returned by exactly one fetch.
#[derive(Debug, Clone)]
pub struct MemorySource {
    inner: Arc<Mutex<Inner>>,
}

impl MemorySource {
    pub fn new() -> Self {
        let inner = Inner {
            records: Vec::new(),
            fetch_errors: Vec::new(),
        };

        Self {
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    /// Adds records to the dataset, replacing any with the same id.
    pub async fn upsert(&self, records: impl IntoIterator<Item = Record>) {
        let mut inner = self.inner.lock().await;
        for record in records {
            if let Some(existing) = inner.records.iter_mut().find(|r| r.id == record.id) {
                *existing = record;
            } else {
                inner.records.push(record);
            }
        }
    }

    /// Queues an error to be returned by the next fetch.
    pub async fn inject_fetch_error(&self, error: SyncError) {
        let mut inner = self.inner.lock().await;
        inner.fetch_errors.push(error);
    }
}

impl Default for MemorySource {
    fn default() -> Self {
        Self::new()
    }
}

impl PageSource for MemorySource {
    async fn fetch(&self, query: &PageQuery) -> SyncResult<Vec<Record>> {
        let mut inner = self.inner.lock().await;

        if let Some(error) = inner.fetch_errors.pop() {
            return Err(error);
        }

        let mut matching: Vec<Record> = inner
            .records
            .iter()
            .filter(|record| match query.since {
                Some(since) => record.updated_on > since,
                None => true,
            })
            .cloned()
            .collect();

        // Ties on updated_on are broken by id so that pagination is stable.
        matching.sort_by(|a, b| {
            a.updated_on
                .cmp(&b.updated_on)
                .then_with(|| a.id.cmp(&b.id))
        });

        Ok(matching
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::record;
    use crate::types::Watermark;

    #[tokio::test]
    async fn serves_records_in_updated_on_order() {
        let source = MemorySource::new();
        source
            .upsert(vec![
                record("b", "2025-01-02T00:00:00.000"),
                record("a", "2025-01-01T00:00:00.000"),
            ])
            .await;

        let query = PageQuery {
            since: None,
            limit: 10,
            offset: 0,
        };
        let records = source.fetch(&query).await.unwrap();
        assert_eq!(records[0].id, "a");
        assert_eq!(records[1].id, "b");
    }

    #[tokio::test]
    async fn filters_strictly_after_since() {
        let source = MemorySource::new();
        source
            .upsert(vec![
                record("a", "2025-01-01T00:00:00.000"),
                record("b", "2025-01-02T00:00:00.000"),
            ])
            .await;

        let query = PageQuery {
            since: Some(Watermark::parse("2025-01-01T00:00:00.000").unwrap()),
            limit: 10,
            offset: 0,
        };
        let records = source.fetch(&query).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "b");
    }

    #[tokio::test]
    async fn applies_limit_and_offset() {
        let source = MemorySource::new();
        source
            .upsert(vec![
                record("a", "2025-01-01T00:00:00.000"),
                record("b", "2025-01-02T00:00:00.000"),
                record("c", "2025-01-03T00:00:00.000"),
            ])
            .await;

        let query = PageQuery {
            since: None,
            limit: 1,
            offset: 1,
        };
        let records = source.fetch(&query).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "b");
    }
}
