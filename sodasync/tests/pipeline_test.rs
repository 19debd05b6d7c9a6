#![cfg(feature = "test-utils")]

use sodasync::destination::memory::MemoryDestination;
use sodasync::destination::Destination;
use sodasync::error::{ErrorKind, SyncError};
use sodasync::pipeline::SyncPipeline;
use sodasync::source::memory::MemorySource;
use sodasync::state::store::{CursorStore, MemoryCursorStore};
use sodasync::test_utils::{pipeline_config, record, record_series, record_with};
use sodasync::types::{LoadId, RunStatus, Watermark};
use sodasync_telemetry::tracing::init_test_tracing;

fn create_pipeline(
    pipeline_id: u64,
    page_size: usize,
    source: MemorySource,
    store: MemoryCursorStore,
    destination: MemoryDestination,
) -> SyncPipeline<MemorySource, MemoryCursorStore, MemoryDestination> {
    SyncPipeline::new(
        pipeline_config(pipeline_id),
        page_size,
        source,
        store,
        destination,
    )
}

#[tokio::test(flavor = "multi_thread")]
async fn test_backfill_of_empty_source_does_nothing() {
    init_test_tracing();

    let source = MemorySource::new();
    let store = MemoryCursorStore::new();
    let destination = MemoryDestination::new();

    let mut pipeline = create_pipeline(1, 100, source, store.clone(), destination.clone());
    let summary = pipeline.run().await.unwrap();

    assert_eq!(summary.status, RunStatus::Done);
    assert_eq!(summary.pages_fetched, 0);
    assert_eq!(summary.records_processed, 0);
    assert!(summary.max_updated_on.is_none());
    assert_eq!(destination.row_count().await, 0);
    assert!(store.load_cursor(1).await.unwrap().is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_backfill_paginates_through_whole_dataset() {
    init_test_tracing();

    let source = MemorySource::new();
    source
        .upsert(record_series(1500, "2025-01-01T00:00:00.000", 60))
        .await;

    let store = MemoryCursorStore::new();
    let destination = MemoryDestination::new();

    let mut pipeline = create_pipeline(1, 1000, source, store.clone(), destination.clone());
    let summary = pipeline.run().await.unwrap();

    assert_eq!(summary.pages_fetched, 2);
    assert_eq!(summary.records_processed, 1500);
    assert_eq!(summary.records_inserted, 1500);
    assert_eq!(summary.records_updated, 0);
    assert_eq!(destination.row_count().await, 1500);

    // The committed cursor matches the newest record that was merged.
    let cursor = store.load_cursor(1).await.unwrap();
    assert_eq!(cursor, summary.max_updated_on);
    assert_eq!(cursor, destination.max_updated_on().await.unwrap());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_incremental_run_picks_up_new_and_changed_records() {
    init_test_tracing();

    let source = MemorySource::new();
    source
        .upsert(record_series(1500, "2025-01-01T00:00:00.000", 60))
        .await;

    let store = MemoryCursorStore::new();
    let destination = MemoryDestination::new();

    let mut pipeline = create_pipeline(
        1,
        1000,
        source.clone(),
        store.clone(),
        destination.clone(),
    );
    pipeline.run().await.unwrap();

    // Two existing records change and three new ones appear at the source.
    source
        .upsert(vec![
            record_with("7", "2025-06-01T00:00:00.000", &[("arrest", "true")]),
            record_with("42", "2025-06-01T00:01:00.000", &[("arrest", "true")]),
            record("1501", "2025-06-01T00:02:00.000"),
            record("1502", "2025-06-01T00:03:00.000"),
            record("1503", "2025-06-01T00:04:00.000"),
        ])
        .await;

    let mut second = create_pipeline(1, 1000, source, store.clone(), destination.clone());
    let summary = second.run().await.unwrap();

    assert_eq!(summary.records_processed, 5);
    assert_eq!(summary.records_inserted, 3);
    assert_eq!(summary.records_updated, 2);
    assert_eq!(destination.row_count().await, 1503);

    let changed = destination.get("7").await.unwrap();
    assert_eq!(changed.payload["arrest"], "true");

    assert_eq!(
        store.load_cursor(1).await.unwrap(),
        Some(Watermark::parse("2025-06-01T00:04:00.000").unwrap())
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rerun_without_source_changes_is_a_noop() {
    init_test_tracing();

    let source = MemorySource::new();
    source
        .upsert(record_series(10, "2025-01-01T00:00:00.000", 60))
        .await;

    let store = MemoryCursorStore::new();
    let destination = MemoryDestination::new();

    let mut first = create_pipeline(
        1,
        100,
        source.clone(),
        store.clone(),
        destination.clone(),
    );
    first.run().await.unwrap();
    let cursor = store.load_cursor(1).await.unwrap();

    let mut second = create_pipeline(1, 100, source, store.clone(), destination.clone());
    let summary = second.run().await.unwrap();

    assert_eq!(summary.records_processed, 0);
    assert_eq!(summary.records_inserted, 0);
    assert_eq!(summary.records_updated, 0);
    assert_eq!(destination.row_count().await, 10);
    assert_eq!(store.load_cursor(1).await.unwrap(), cursor);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_replaying_records_does_not_change_rows_or_counters() {
    init_test_tracing();

    let source = MemorySource::new();
    source
        .upsert(record_series(10, "2025-01-01T00:00:00.000", 60))
        .await;

    let store = MemoryCursorStore::new();
    let destination = MemoryDestination::new();

    let mut first = create_pipeline(1, 100, source.clone(), store.clone(), destination.clone());
    first.run().await.unwrap();
    let original_load_id = destination.load_id_of("1").await.unwrap();

    // Rewind the cursor so the next run refetches the whole window; the merge
    // has to absorb the replay without touching rows or counters.
    store
        .store_cursor(1, Watermark::parse("2024-01-01T00:00:00.000").unwrap())
        .await
        .unwrap();

    let mut replay = create_pipeline(1, 100, source, store.clone(), destination.clone());
    let summary = replay.run().await.unwrap();

    assert_eq!(summary.records_processed, 10);
    assert_eq!(summary.records_inserted, 0);
    assert_eq!(summary.records_updated, 0);
    assert_eq!(destination.row_count().await, 10);
    assert_eq!(destination.load_id_of("1").await.unwrap(), original_load_id);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_resumes_from_destination_when_cursor_is_missing() {
    init_test_tracing();

    let source = MemorySource::new();
    source
        .upsert(record_series(10, "2025-01-01T00:00:00.000", 60))
        .await;

    // The destination already holds the first five records from an earlier
    // deployment that had no cursor store.
    let destination = MemoryDestination::new();
    destination
        .merge(
            &LoadId::generate(),
            &record_series(5, "2025-01-01T00:00:00.000", 60),
        )
        .await
        .unwrap();

    let store = MemoryCursorStore::new();
    let mut pipeline = create_pipeline(1, 100, source, store.clone(), destination.clone());
    let summary = pipeline.run().await.unwrap();

    assert_eq!(summary.records_processed, 5);
    assert_eq!(summary.records_inserted, 5);
    assert_eq!(destination.row_count().await, 10);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failed_merge_leaves_cursor_untouched() {
    init_test_tracing();

    let source = MemorySource::new();
    source
        .upsert(record_series(10, "2025-01-01T00:00:00.000", 60))
        .await;

    let store = MemoryCursorStore::new();
    let destination = MemoryDestination::new();
    destination
        .inject_merge_error(SyncError::from((
            ErrorKind::DestinationQueryFailed,
            "relation does not exist",
        )))
        .await;

    let mut pipeline = create_pipeline(
        1,
        100,
        source.clone(),
        store.clone(),
        destination.clone(),
    );
    let err = pipeline.run().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DestinationQueryFailed);
    assert!(store.load_cursor(1).await.unwrap().is_none());

    // A fresh pipeline retries the whole window and lands everything.
    let mut retry = create_pipeline(1, 100, source, store.clone(), destination.clone());
    let summary = retry.run().await.unwrap();

    assert_eq!(summary.records_inserted, 10);
    assert_eq!(destination.row_count().await, 10);
    assert!(store.load_cursor(1).await.unwrap().is_some());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_fetch_error_surfaces_with_offset_detail() {
    init_test_tracing();

    let source = MemorySource::new();
    source
        .upsert(record_series(10, "2025-01-01T00:00:00.000", 60))
        .await;
    source
        .inject_fetch_error(SyncError::from((
            ErrorKind::SourceRejectedRequest,
            "malformed query",
        )))
        .await;

    let store = MemoryCursorStore::new();
    let mut pipeline = create_pipeline(1, 100, source, store.clone(), MemoryDestination::new());

    let err = pipeline.run().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SourceRejectedRequest);
    assert!(err.detail().unwrap().contains("offset 0"));
    assert!(store.load_cursor(1).await.unwrap().is_none());
}
