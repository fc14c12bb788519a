//! GraphQL API for the Chorus message feed.
//!
//! Serves group feeds as Relay-style connections over HTTP and accepts
//! new messages through the `createMessage` mutation.
//!
//! ```ignore
//! use chorus_graphql::{build_schema, serve_with_shutdown, ServerConfig};
//!
//! let schema = build_schema(FeedService::new(repositories));
//! serve_with_shutdown(schema, ServerConfig::default(), shutdown).await?;
//! ```

mod schema;
mod server;
mod types;

pub use schema::{
    build_schema, schema_builder, MutationRoot, PageInfo, QueryRoot, DEFAULT_PAGE_SIZE,
    MAX_PAGE_SIZE, MAX_QUERY_COMPLEXITY, MAX_QUERY_DEPTH,
};
pub use server::{router, serve_with_shutdown, ServerConfig};
pub use types::ChorusSchema;
