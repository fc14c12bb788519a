//! Page boundary probing.
//!
//! Decides `hasNextPage`/`hasPreviousPage` with existence checks instead
//! of over-fetching rows. Both probes are issued concurrently.

use tracing::trace;

use crate::error::StorageResult;
use crate::models::Message;
use crate::ports::{IdFilter, MessageRepository};

use super::range_query::{RangeQuery, ScanDirection};

/// Result of probing both sides of a fetched page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageBoundaries {
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

/// Existence prober over a message repository.
pub struct BoundaryProber<'a> {
    messages: &'a dyn MessageRepository,
}

impl<'a> BoundaryProber<'a> {
    pub fn new(messages: &'a dyn MessageRepository) -> Self {
        Self { messages }
    }

    /// Probe both boundaries of `rows`, the page returned for `query`.
    pub async fn probe(&self, query: &RangeQuery, rows: &[Message]) -> StorageResult<PageBoundaries> {
        let (has_next_page, has_previous_page) =
            futures::try_join!(self.has_next_page(query, rows), self.has_previous_page(query))?;

        Ok(PageBoundaries {
            has_next_page,
            has_previous_page,
        })
    }

    /// Whether rows exist beyond the far end of the page.
    ///
    /// A short page means the feed is exhausted in that direction and no
    /// probe is issued.
    async fn has_next_page(&self, query: &RangeQuery, rows: &[Message]) -> StorageResult<bool> {
        if rows.len() < query.limit as usize {
            return Ok(false);
        }

        // Rows are newest first: the oldest row is last, the newest first.
        let beyond = match query.direction {
            ScanDirection::Older => rows.last().map(|m| IdFilter::Lt(m.id)),
            ScanDirection::Newer => rows.first().map(|m| IdFilter::Gt(m.id)),
        };

        match beyond {
            Some(filter) => self.exists(query, filter).await,
            None => Ok(false),
        }
    }

    /// Whether rows exist on the other side of the request boundary,
    /// boundary row included. Head pages have no boundary.
    async fn has_previous_page(&self, query: &RangeQuery) -> StorageResult<bool> {
        match query.filter.complement() {
            Some(filter) => self.exists(query, filter).await,
            None => Ok(false),
        }
    }

    async fn exists(&self, query: &RangeQuery, filter: IdFilter) -> StorageResult<bool> {
        metrics::counter!("boundary_probes_total").increment(1);
        let found = self.messages.exists_message(query.group_id, filter).await?;
        trace!(group = %query.group_id, ?filter, found, "Boundary probe");
        Ok(found)
    }
}
