use tracing::{debug, info};

use crate::destination::Destination;
use crate::error::SyncResult;
use crate::state::store::CursorStore;
use crate::types::{PipelineId, Watermark};

/// Tracks the change watermark across one run.
///
/// The starting point is resolved once at the beginning of a run: the stored
/// cursor when one exists, otherwise the highest `updated_on` already in the
/// destination. The destination fallback makes the pipeline pick up where a
/// previous deployment without a cursor store left off instead of refetching
/// the whole dataset.
#[derive(Debug)]
pub struct WatermarkTracker {
    current: Option<Watermark>,
    dirty: bool,
}

impl WatermarkTracker {
    pub async fn resolve<S, D>(
        pipeline_id: PipelineId,
        store: &S,
        destination: &D,
    ) -> SyncResult<Self>
    where
        S: CursorStore,
        D: Destination,
    {
        let current = match store.load_cursor(pipeline_id).await? {
            Some(cursor) => {
                debug!(pipeline_id, watermark = %cursor, "resolved watermark from cursor store");
                Some(cursor)
            }
            None => {
                let fallback = destination.max_updated_on().await?;
                if let Some(watermark) = fallback {
                    info!(
                        pipeline_id,
                        watermark = %watermark,
                        "no stored cursor, resolved watermark from destination"
                    );
                }
                fallback
            }
        };

        Ok(Self {
            current,
            dirty: false,
        })
    }

    /// Starts from a known watermark, used by tests.
    pub fn starting_at(watermark: Option<Watermark>) -> Self {
        Self {
            current: watermark,
            dirty: false,
        }
    }

    pub fn current(&self) -> Option<Watermark> {
        self.current
    }

    /// Advances the watermark to `candidate` if it is ahead of the current
    /// value. The watermark never moves backwards.
    pub fn advance(&mut self, candidate: Watermark) {
        if self.current.is_none_or(|current| candidate > current) {
            self.current = Some(candidate);
            self.dirty = true;
        }
    }

    /// Persists the watermark if it advanced during this run.
    ///
    /// Called only after every fetched page has been merged, so a failed run
    /// never moves the cursor past records it did not load.
    pub async fn persist<S: CursorStore>(
        &mut self,
        pipeline_id: PipelineId,
        store: &S,
    ) -> SyncResult<()> {
        if let (true, Some(watermark)) = (self.dirty, self.current) {
            store.store_cursor(pipeline_id, watermark).await?;
            self.dirty = false;
            info!(pipeline_id, watermark = %watermark, "stored advanced watermark");
        }

        Ok(())
    }
}
