use std::future::Future;

use crate::error::SyncResult;
use crate::types::{Record, Watermark};

/// One bounded range-query against the source dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageQuery {
    /// Lower bound: only records with `updated_on` strictly greater than this
    /// are returned. `None` requests the dataset from the beginning.
    pub since: Option<Watermark>,
    /// Maximum number of records to return.
    pub limit: usize,
    /// Number of matching records to skip, in `updated_on` ascending order.
    pub offset: u64,
}

/// A paginated, timestamp-ordered record source.
///
/// Implementations must return records sorted ascending by `updated_on` and
/// honor the query's filter, limit and offset, so that repeated queries with
/// increasing offsets walk the dataset exactly once.
pub trait PageSource {
    fn fetch(&self, query: &PageQuery) -> impl Future<Output = SyncResult<Vec<Record>>> + Send;
}
