use std::future::Future;

use crate::error::SyncResult;
use crate::types::{LoadId, MergeStats, Record, Watermark};

/// A store that records are merged into.
///
/// Implementations key on the record id, so merging the same batch twice is a
/// no-op and a run can safely be replayed after a partial failure.
pub trait Destination {
    /// Returns the highest `updated_on` across all stored records, or `None`
    /// if the destination is empty.
    fn max_updated_on(&self) -> impl Future<Output = SyncResult<Option<Watermark>>> + Send;

    /// Merges a batch of records, inserting new ids and overwriting changed
    /// ones. Records identical to what is already stored are left untouched
    /// and counted in neither statistic.
    fn merge(
        &self,
        load_id: &LoadId,
        records: &[Record],
    ) -> impl Future<Output = SyncResult<MergeStats>> + Send;
}
