//! GraphQL schema definition.
//!
//! Exposes group feeds as Relay-style connections and the
//! `createMessage` mutation.

use async_graphql::{
    ComplexObject, Context, EmptySubscription, ErrorExtensions, Object, Result, Schema,
    SchemaBuilder,
};
use chrono::{DateTime, Utc};
use tracing::{debug, error};

use chorus_core::error::FeedError;
use chorus_core::models::{GroupId, NewMessage, UserId};
use chorus_core::ports::{Cursor, PaginationRequest};
use chorus_core::services::FeedService;

use crate::types::ChorusSchema;

// -----------------------------------------------------------------------------
// Schema Configuration
// -----------------------------------------------------------------------------

/// Maximum query depth to prevent deeply nested queries (DoS protection).
/// Note: GraphQL introspection requires depth ~13, so we use 15 to allow it.
pub const MAX_QUERY_DEPTH: usize = 15;

/// Maximum query complexity score (DoS protection).
/// Each field has a default complexity of 1, nested objects multiply.
pub const MAX_QUERY_COMPLEXITY: usize = 500;

/// Maximum page size for pagination.
pub const MAX_PAGE_SIZE: i32 = 100;

/// Page size used when neither `first` nor `last` is given.
pub const DEFAULT_PAGE_SIZE: i32 = 20;

/// Maximum length accepted for a cursor argument.
const MAX_CURSOR_LENGTH: usize = 64;

// -----------------------------------------------------------------------------
// Schema Builder
// -----------------------------------------------------------------------------

/// Build the GraphQL schema over a feed service.
///
/// Includes query depth and complexity limits for DoS protection.
pub fn build_schema(service: FeedService) -> ChorusSchema {
    schema_builder(service)
        .limit_depth(MAX_QUERY_DEPTH)
        .limit_complexity(MAX_QUERY_COMPLEXITY)
        .finish()
}

/// Create a schema builder with the feed service attached.
///
/// Remember to call `.limit_depth()` and `.limit_complexity()` before `.finish()`.
pub fn schema_builder(service: FeedService) -> SchemaBuilder<QueryRoot, MutationRoot, EmptySubscription> {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription).data(service)
}

// -----------------------------------------------------------------------------
// Query Root
// -----------------------------------------------------------------------------

/// Query root: groups and their message feeds.
#[derive(Default)]
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Get a group by ID.
    async fn group<'ctx>(&self, ctx: &Context<'ctx>, id: i64) -> Result<Option<Group>> {
        let service = ctx.data::<FeedService>()?;

        let group = service.repositories().groups().get_group(GroupId(id)).await?;
        Ok(group.map(Group::from))
    }

    /// List all groups.
    async fn groups<'ctx>(&self, ctx: &Context<'ctx>) -> Result<Vec<Group>> {
        let service = ctx.data::<FeedService>()?;

        let groups = service.repositories().groups().list_groups().await?;
        Ok(groups.into_iter().map(Group::from).collect())
    }

    /// Page through a group's messages, newest first.
    ///
    /// `first`/`after` walks towards older messages, `last`/`before`
    /// towards newer ones.
    async fn messages<'ctx>(
        &self,
        ctx: &Context<'ctx>,
        group_id: i64,
        first: Option<i32>,
        last: Option<i32>,
        before: Option<String>,
        after: Option<String>,
    ) -> Result<MessageConnection> {
        resolve_messages(ctx, GroupId(group_id), first, last, before, after).await
    }
}

// -----------------------------------------------------------------------------
// Mutation Root
// -----------------------------------------------------------------------------

/// Mutation root.
#[derive(Default)]
pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Post a message to a group.
    async fn create_message<'ctx>(
        &self,
        ctx: &Context<'ctx>,
        group_id: i64,
        user_id: i64,
        text: String,
    ) -> Result<Message> {
        let service = ctx.data::<FeedService>()?;

        let message = service
            .create_message(NewMessage {
                group_id: GroupId(group_id),
                author_id: UserId(user_id),
                text,
            })
            .await
            .map_err(into_graphql_error)?;

        Ok(Message::from(message))
    }
}

// -----------------------------------------------------------------------------
// GraphQL Types
// -----------------------------------------------------------------------------

/// Chat group.
#[derive(async_graphql::SimpleObject)]
#[graphql(complex)]
pub struct Group {
    pub id: i64,
    pub name: String,
}

#[ComplexObject]
impl Group {
    /// Page through this group's messages, newest first.
    async fn messages<'ctx>(
        &self,
        ctx: &Context<'ctx>,
        first: Option<i32>,
        last: Option<i32>,
        before: Option<String>,
        after: Option<String>,
    ) -> Result<MessageConnection> {
        resolve_messages(ctx, GroupId(self.id), first, last, before, after).await
    }
}

impl From<chorus_core::models::Group> for Group {
    fn from(g: chorus_core::models::Group) -> Self {
        Self {
            id: g.id.get(),
            name: g.name,
        }
    }
}

/// Chat message.
#[derive(async_graphql::SimpleObject)]
pub struct Message {
    pub id: i64,
    pub group_id: i64,
    pub author_id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl From<chorus_core::models::Message> for Message {
    fn from(m: chorus_core::models::Message) -> Self {
        Self {
            id: m.id.get(),
            group_id: m.group_id.get(),
            author_id: m.author_id.get(),
            text: m.text,
            created_at: m.created_at,
        }
    }
}

// -----------------------------------------------------------------------------
// Connection Types (Relay-style pagination)
// -----------------------------------------------------------------------------

#[derive(async_graphql::SimpleObject)]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
}

#[derive(async_graphql::SimpleObject)]
pub struct MessageEdge {
    pub node: Message,
    pub cursor: String,
}

#[derive(async_graphql::SimpleObject)]
pub struct MessageConnection {
    pub edges: Vec<MessageEdge>,
    pub page_info: PageInfo,
}

impl From<chorus_core::ports::Connection<chorus_core::models::Message>> for MessageConnection {
    fn from(conn: chorus_core::ports::Connection<chorus_core::models::Message>) -> Self {
        Self {
            edges: conn
                .edges
                .into_iter()
                .map(|e| MessageEdge {
                    node: Message::from(e.node),
                    cursor: e.cursor.value,
                })
                .collect(),
            page_info: PageInfo {
                has_next_page: conn.page_info.has_next_page,
                has_previous_page: conn.page_info.has_previous_page,
                start_cursor: conn.page_info.start_cursor.map(|c| c.value),
                end_cursor: conn.page_info.end_cursor.map(|c| c.value),
            },
        }
    }
}

// -----------------------------------------------------------------------------
// Helpers & Validation
// -----------------------------------------------------------------------------

async fn resolve_messages(
    ctx: &Context<'_>,
    group_id: GroupId,
    first: Option<i32>,
    last: Option<i32>,
    before: Option<String>,
    after: Option<String>,
) -> Result<MessageConnection> {
    validate_cursor_arg(&before, "before")?;
    validate_cursor_arg(&after, "after")?;

    let service = ctx.data::<FeedService>()?;

    let (first, last) = normalize_page_sizes(first, last, before.is_some());
    let request = PaginationRequest {
        group_id,
        first,
        last,
        before: before.map(Cursor::from),
        after: after.map(Cursor::from),
    };

    let connection = service
        .list_messages(request)
        .await
        .map_err(into_graphql_error)?;

    Ok(MessageConnection::from(connection))
}

/// Cap page sizes at [`MAX_PAGE_SIZE`] and default `first` on head/older
/// pages. Non-positive sizes pass through so the service rejects them.
fn normalize_page_sizes(first: Option<i32>, last: Option<i32>, has_before: bool) -> (Option<i32>, Option<i32>) {
    let cap = |n: i32| n.min(MAX_PAGE_SIZE);
    match (first, last) {
        (None, None) if !has_before => (Some(DEFAULT_PAGE_SIZE), None),
        (None, None) => (None, Some(DEFAULT_PAGE_SIZE)),
        (first, last) => (first.map(cap), last.map(cap)),
    }
}

/// Reject oversized cursor arguments before decoding them.
fn validate_cursor_arg(value: &Option<String>, field_name: &str) -> Result<()> {
    if let Some(v) = value {
        if v.len() > MAX_CURSOR_LENGTH {
            return Err(async_graphql::Error::new(format!(
                "{} too long: maximum {} characters allowed",
                field_name, MAX_CURSOR_LENGTH
            ))
            .extend_with(|_, e| e.set("code", "BAD_CURSOR")));
        }
    }
    Ok(())
}

/// Convert a feed error into a GraphQL error with a machine-readable code.
///
/// Server-side failures are logged; caller mistakes only at debug level.
fn into_graphql_error(err: FeedError) -> async_graphql::Error {
    if err.is_client_error() {
        debug!(error = %err, "Request rejected");
    } else {
        error!(error = %err, "Feed operation failed");
    }

    let code = match &err {
        FeedError::BadCursor(_) => "BAD_CURSOR",
        FeedError::InvalidRequest(_) => "INVALID_REQUEST",
        FeedError::Fetch(_) => "FETCH_ERROR",
        FeedError::MutationFailed(_) => "MUTATION_FAILED",
    };
    async_graphql::Error::new(err.to_string()).extend_with(|_, e| e.set("code", code))
}
