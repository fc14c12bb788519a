//! GraphQL type definitions.

use async_graphql::{EmptySubscription, Schema};

use crate::schema::{MutationRoot, QueryRoot};

/// The Chorus GraphQL schema type.
pub type ChorusSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;
