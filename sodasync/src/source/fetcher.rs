use sodasync_config::shared::RetryConfig;
use tracing::debug;

use crate::error::{SyncError, SyncResult};
use crate::retry::with_retry;
use crate::source::base::{PageQuery, PageSource};
use crate::sync_error;
use crate::types::{Page, Watermark};

/// Walks a source page by page from a fixed watermark.
///
/// The watermark is captured once at construction so that records updated while
/// a run is in flight do not shift page boundaries mid-walk; they are picked up
/// by the next run instead. The walk ends when the source returns a short or
/// empty page.
#[derive(Debug)]
pub struct PageFetcher<'a, P: PageSource> {
    source: &'a P,
    retry: &'a RetryConfig,
    since: Option<Watermark>,
    page_size: usize,
    offset: u64,
    exhausted: bool,
}

impl<'a, P: PageSource> PageFetcher<'a, P> {
    pub fn new(
        source: &'a P,
        retry: &'a RetryConfig,
        since: Option<Watermark>,
        page_size: usize,
    ) -> Self {
        Self {
            source,
            retry,
            since,
            page_size,
            offset: 0,
            exhausted: false,
        }
    }

    /// Restarts the walk at the given offset, keeping the captured watermark.
    pub fn resume_at(&mut self, offset: u64) {
        self.offset = offset;
        self.exhausted = false;
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Fetches the next page, or `None` once the source is exhausted.
    ///
    /// Transient fetch errors are retried per the configured policy; a
    /// non-transient error or an exhausted retry budget surfaces to the caller
    /// with the failing offset in the error detail, so a run can be resumed
    /// without refetching committed pages.
    pub async fn next_page(&mut self) -> SyncResult<Option<Page>> {
        if self.exhausted {
            return Ok(None);
        }

        let query = PageQuery {
            since: self.since,
            limit: self.page_size,
            offset: self.offset,
        };

        let records = with_retry(self.retry, "page fetch", || self.source.fetch(&query))
            .await
            .map_err(|err| {
                sync_error!(
                    err.kind(),
                    "failed to fetch page",
                    format!("offset {}: {err}", self.offset)
                )
            })?;

        if records.is_empty() {
            self.exhausted = true;
            return Ok(None);
        }

        let page = Page::new(self.offset, records);
        debug!(
            offset = page.offset,
            records = page.len(),
            "fetched page from source"
        );

        self.offset += page.len() as u64;
        if page.len() < self.page_size {
            // A short page means the source has no more matching records.
            self.exhausted = true;
        }

        Ok(Some(page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, SyncError};
    use crate::source::memory::MemorySource;
    use crate::test_utils::record_series;

    fn no_retry() -> RetryConfig {
        RetryConfig::no_retry()
    }

    #[tokio::test]
    async fn walks_pages_until_exhausted() {
        let source = MemorySource::new();
        source
            .upsert(record_series(5, "2025-01-01T00:00:00.000", 60))
            .await;

        let retry = no_retry();
        let mut fetcher = PageFetcher::new(&source, &retry, None, 2);

        let first = fetcher.next_page().await.unwrap().unwrap();
        assert_eq!(first.offset, 0);
        assert_eq!(first.len(), 2);

        let second = fetcher.next_page().await.unwrap().unwrap();
        assert_eq!(second.offset, 2);
        assert_eq!(second.len(), 2);

        let third = fetcher.next_page().await.unwrap().unwrap();
        assert_eq!(third.offset, 4);
        assert_eq!(third.len(), 1);

        // Short final page ends the walk without another request.
        assert!(fetcher.next_page().await.unwrap().is_none());
        assert!(fetcher.next_page().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn empty_source_yields_no_pages() {
        let source = MemorySource::new();
        let retry = no_retry();
        let mut fetcher = PageFetcher::new(&source, &retry, None, 100);

        assert!(fetcher.next_page().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn fetch_error_carries_offset() {
        let source = MemorySource::new();
        source
            .upsert(record_series(3, "2025-01-01T00:00:00.000", 60))
            .await;

        let retry = no_retry();
        let mut fetcher = PageFetcher::new(&source, &retry, None, 2);
        fetcher.next_page().await.unwrap();

        source
            .inject_fetch_error(SyncError::from((
                ErrorKind::SourceRequestFailed,
                "connection reset",
            )))
            .await;

        let err = fetcher.next_page().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SourceRequestFailed);
        assert!(err.detail().unwrap().contains("offset 2"));
    }

    #[tokio::test]
    async fn resume_at_continues_from_given_offset() {
        let source = MemorySource::new();
        source
            .upsert(record_series(4, "2025-01-01T00:00:00.000", 60))
            .await;

        let retry = no_retry();
        let mut fetcher = PageFetcher::new(&source, &retry, None, 2);
        fetcher.resume_at(2);

        let page = fetcher.next_page().await.unwrap().unwrap();
        assert_eq!(page.offset, 2);
        assert_eq!(page.len(), 2);
    }
}
