//! Port trait for the client's view of the message service.
//!
//! The client feed controller only talks to the server through this
//! trait. Implementations may run the feed service in-process
//! ([`crate::services::LocalGateway`]) or forward requests over a network
//! transport.

use async_trait::async_trait;

use crate::error::FeedResult;
use crate::models::{GroupId, Message, UserId};

use super::pagination::{Connection, PaginationRequest};

/// Remote message service as seen by a client.
#[async_trait]
pub trait MessageGateway: Send + Sync {
    /// Fetch one page of a group's feed.
    async fn fetch_messages(&self, request: PaginationRequest) -> FeedResult<Connection<Message>>;

    /// Create a message and return its authoritative form.
    async fn create_message(
        &self,
        group_id: GroupId,
        author_id: UserId,
        text: String,
    ) -> FeedResult<Message>;
}
