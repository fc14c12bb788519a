//! Client identity and feed configuration.

use chorus_core::models::UserId;

/// Default number of messages requested per page.
pub const DEFAULT_PAGE_SIZE: i32 = 20;

/// The user acting on a feed.
///
/// Passed explicitly to the controller; every optimistic message and
/// every create mutation is authored by this user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
}

impl Session {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }
}

/// Feed controller configuration.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Messages requested per page (initial load, load older, refresh).
    pub page_size: i32,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}
