use std::future::Future;

use crate::error::SyncResult;
use crate::types::{PipelineId, Watermark};

/// Durable storage for per-pipeline watermarks.
///
/// The cursor is written once per successful run, after all pages have been
/// merged. A run that fails part way leaves the cursor untouched, so the next
/// run re-fetches from the last committed watermark and the merge absorbs the
/// overlap.
pub trait CursorStore {
    fn load_cursor(
        &self,
        pipeline_id: PipelineId,
    ) -> impl Future<Output = SyncResult<Option<Watermark>>> + Send;

    fn store_cursor(
        &self,
        pipeline_id: PipelineId,
        watermark: Watermark,
    ) -> impl Future<Output = SyncResult<()>> + Send;
}
