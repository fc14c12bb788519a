//! Pagination types for feed queries.
//!
//! These types implement Relay-style cursor pagination over a message
//! feed ordered newest first.

use crate::models::GroupId;

/// Opaque cursor for pagination.
///
/// The cursor value is produced by [`crate::cursor::encode`] and should
/// be treated as an opaque token by clients.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cursor {
    pub value: String,
}

impl From<String> for Cursor {
    fn from(value: String) -> Self {
        Self { value }
    }
}

/// Pagination request for a group's message feed.
///
/// `after` walks towards older messages and is bounded by `first`;
/// `before` walks towards newer messages and is bounded by `last`.
/// With neither cursor set the newest `first` messages are returned.
#[derive(Debug, Clone)]
pub struct PaginationRequest {
    /// Group whose feed is paginated.
    pub group_id: GroupId,
    /// Page size when paging from the head or towards older messages.
    pub first: Option<i32>,
    /// Page size when paging towards newer messages.
    pub last: Option<i32>,
    /// Only return messages newer than this cursor.
    pub before: Option<Cursor>,
    /// Only return messages older than this cursor.
    pub after: Option<Cursor>,
}

impl PaginationRequest {
    /// Request the newest `first` messages of a group.
    pub fn head(group_id: GroupId, first: i32) -> Self {
        Self {
            group_id,
            first: Some(first),
            last: None,
            before: None,
            after: None,
        }
    }

    /// Request up to `first` messages older than `after`.
    pub fn older(group_id: GroupId, first: i32, after: Cursor) -> Self {
        Self {
            after: Some(after),
            ..Self::head(group_id, first)
        }
    }

    /// Request up to `last` messages newer than `before`.
    pub fn newer(group_id: GroupId, last: i32, before: Cursor) -> Self {
        Self {
            group_id,
            first: None,
            last: Some(last),
            before: Some(before),
            after: None,
        }
    }
}

/// Paginated result set with edges and page info.
///
/// This is the Relay connection pattern for cursor-based pagination.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection<T> {
    /// List of edges (node + cursor pairs), newest first.
    pub edges: Vec<Edge<T>>,
    /// Information about the current page.
    pub page_info: PageInfo,
}

impl<T> Connection<T> {
    /// A connection with no edges and nothing on either side.
    pub fn empty() -> Self {
        Self {
            edges: Vec::new(),
            page_info: PageInfo::default(),
        }
    }
}

/// A single item in a paginated result.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge<T> {
    /// The actual item.
    pub node: T,
    /// Cursor for this item (used for pagination).
    pub cursor: Cursor,
}

/// Information about the current page in a paginated result.
///
/// Next/previous are relative to the query direction, not to the
/// absolute position in the feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageInfo {
    /// Whether more items exist beyond this page in the query direction.
    pub has_next_page: bool,
    /// Whether items exist on the other side of the request boundary.
    pub has_previous_page: bool,
    /// Cursor of the first item in this page.
    pub start_cursor: Option<Cursor>,
    /// Cursor of the last item in this page.
    pub end_cursor: Option<Cursor>,
}

/// Ordering direction for sorted queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderDirection {
    /// Ascending order (smallest first).
    Asc,
    /// Descending order (largest first).
    #[default]
    Desc,
}
