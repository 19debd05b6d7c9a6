use std::time::Instant;
use tracing::info;

use sodasync_config::shared::PipelineConfig;

use crate::bail;
use crate::destination::Destination;
use crate::error::{ErrorKind, SyncError, SyncResult};
use crate::retry::with_retry;
use crate::source::{PageFetcher, PageSource};
use crate::state::store::CursorStore;
use crate::state::WatermarkTracker;
use crate::types::{LoadId, MergeStats, RunStatus, RunSummary};

/// Lifecycle of a [`SyncPipeline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunPhase {
    Idle,
    Running,
    Done,
    Failed,
}

/// Orchestrates one incremental sync run: resolve the watermark, walk the
/// source page by page, merge each page, then commit the advanced cursor.
///
/// A pipeline instance runs once. Pages are merged as they arrive rather than
/// buffered, so memory stays bounded by the page size; the cursor is only
/// written after the final page lands, which keeps a failed run replayable.
#[derive(Debug)]
pub struct SyncPipeline<P, S, D> {
    config: PipelineConfig,
    page_size: usize,
    source: P,
    store: S,
    destination: D,
    phase: RunPhase,
}

impl<P, S, D> SyncPipeline<P, S, D>
where
    P: PageSource,
    S: CursorStore,
    D: Destination,
{
    pub fn new(
        config: PipelineConfig,
        page_size: usize,
        source: P,
        store: S,
        destination: D,
    ) -> Self {
        Self {
            config,
            page_size,
            source,
            store,
            destination,
            phase: RunPhase::Idle,
        }
    }

    pub fn id(&self) -> u64 {
        self.config.id
    }

    /// Runs the pipeline to completion.
    ///
    /// On failure the cursor is left at its pre-run value and the pipeline
    /// transitions to a terminal failed phase; a fresh instance must be built
    /// to try again.
    pub async fn run(&mut self) -> SyncResult<RunSummary> {
        if self.phase != RunPhase::Idle {
            bail!(
                ErrorKind::InvalidState,
                "pipeline already ran",
                format!("pipeline {} cannot be run twice", self.config.id)
            );
        }
        self.phase = RunPhase::Running;

        match self.run_inner().await {
            Ok(summary) => {
                self.phase = RunPhase::Done;
                Ok(summary)
            }
            Err(err) => {
                self.phase = RunPhase::Failed;
                Err(err)
            }
        }
    }

    async fn run_inner(&mut self) -> SyncResult<RunSummary> {
        let started = Instant::now();
        let load_id = LoadId::generate();

        let Self {
            config,
            page_size,
            source,
            store,
            destination,
            ..
        } = self;

        let mut tracker = WatermarkTracker::resolve(config.id, store, destination).await?;

        info!(
            pipeline_id = config.id,
            load_id = %load_id,
            watermark = tracker.current().map(tracing::field::display),
            "starting sync run"
        );

        let mut fetcher =
            PageFetcher::new(source, &config.fetch_retry, tracker.current(), *page_size);

        let mut stats = MergeStats::default();
        let mut pages_fetched: u64 = 0;
        let mut records_processed: u64 = 0;

        while let Some(page) = fetcher.next_page().await? {
            let merged = with_retry(&config.load_retry, "page merge", || {
                destination.merge(&load_id, &page.records)
            })
            .await
            .map_err(|err| {
                SyncError::from((
                    err.kind(),
                    "failed to merge page",
                    format!("offset {}: {err}", page.offset),
                ))
            })?;

            stats += merged;
            pages_fetched += 1;
            records_processed += page.len() as u64;

            if let Some(watermark) = page.max_updated_on() {
                tracker.advance(watermark);
            }
        }

        tracker.persist(config.id, store).await?;

        let summary = RunSummary {
            status: RunStatus::Done,
            load_id,
            pages_fetched,
            records_processed,
            records_inserted: stats.inserted,
            records_updated: stats.updated,
            max_updated_on: tracker.current(),
            duration_ms: started.elapsed().as_millis() as u64,
        };

        info!(
            pipeline_id = config.id,
            load_id = %summary.load_id,
            pages_fetched = summary.pages_fetched,
            records_processed = summary.records_processed,
            records_inserted = summary.records_inserted,
            records_updated = summary.records_updated,
            duration_ms = summary.duration_ms,
            "sync run finished"
        );

        Ok(summary)
    }

    /// Consumes the pipeline, handing back its collaborators.
    pub fn into_parts(self) -> (P, S, D) {
        (self.source, self.store, self.destination)
    }
}
