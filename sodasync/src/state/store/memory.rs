use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::SyncResult;
use crate::state::store::base::CursorStore;
use crate::types::{PipelineId, Watermark};

/// An in-memory [`CursorStore`] for tests and one-off runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryCursorStore {
    cursors: Arc<Mutex<HashMap<PipelineId, Watermark>>>,
}

impl MemoryCursorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CursorStore for MemoryCursorStore {
    async fn load_cursor(&self, pipeline_id: PipelineId) -> SyncResult<Option<Watermark>> {
        let cursors = self.cursors.lock().await;

        Ok(cursors.get(&pipeline_id).copied())
    }

    async fn store_cursor(&self, pipeline_id: PipelineId, watermark: Watermark) -> SyncResult<()> {
        let mut cursors = self.cursors.lock().await;
        cursors.insert(pipeline_id, watermark);

        Ok(())
    }
}
