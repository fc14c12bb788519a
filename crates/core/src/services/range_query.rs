//! Range query construction.
//!
//! Turns a [`PaginationRequest`] into a directional id filter, a sort
//! order and a row limit. All validation happens here so a malformed
//! request never reaches the store.

use crate::cursor;
use crate::error::{FeedError, FeedResult};
use crate::models::GroupId;
use crate::ports::{IdFilter, OrderDirection, PaginationRequest};

/// Direction in which a page walks away from its boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanDirection {
    /// From the head or an `after` cursor towards older messages.
    Older,
    /// From a `before` cursor towards newer messages.
    Newer,
}

/// A validated, storage-ready page query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeQuery {
    pub group_id: GroupId,
    pub filter: IdFilter,
    pub order: OrderDirection,
    pub limit: u32,
    pub direction: ScanDirection,
}

impl RangeQuery {
    /// Build the range query for a pagination request.
    ///
    /// - `after`: `id < decode(after)`, limit `first`
    /// - `before`: `id > decode(before)`, limit `last`
    /// - neither: no id filter, limit `first`
    ///
    /// Rows are always sorted newest first. A `before` page must be sized
    /// with `last`, every other page with `first`.
    pub fn build(request: &PaginationRequest) -> FeedResult<Self> {
        let (filter, direction) = match (&request.before, &request.after) {
            (Some(_), Some(_)) => {
                return Err(FeedError::InvalidRequest(
                    "before and after are mutually exclusive".into(),
                ));
            }
            (None, Some(after)) => (IdFilter::Lt(cursor::decode(after)?), ScanDirection::Older),
            (Some(before), None) => (IdFilter::Gt(cursor::decode(before)?), ScanDirection::Newer),
            (None, None) => (IdFilter::All, ScanDirection::Older),
        };
        let limit = page_size(request.first, request.last, direction)?;

        Ok(Self {
            group_id: request.group_id,
            filter,
            order: OrderDirection::Desc,
            limit,
            direction,
        })
    }
}

/// Extract the page size: `first` towards older messages, `last` towards
/// newer ones, strictly positive.
fn page_size(first: Option<i32>, last: Option<i32>, direction: ScanDirection) -> FeedResult<u32> {
    let size = match (direction, first, last) {
        (_, Some(_), Some(_)) => {
            return Err(FeedError::InvalidRequest(
                "first and last are mutually exclusive".into(),
            ));
        }
        (ScanDirection::Older, Some(n), None) | (ScanDirection::Newer, None, Some(n)) => n,
        (ScanDirection::Older, _, _) => {
            return Err(FeedError::InvalidRequest(
                "first is required when paging from the head or after a cursor".into(),
            ));
        }
        (ScanDirection::Newer, _, _) => {
            return Err(FeedError::InvalidRequest(
                "last is required when paging before a cursor".into(),
            ));
        }
    };

    u32::try_from(size)
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| FeedError::InvalidRequest(format!("page size must be positive, got {}", size)))
}
