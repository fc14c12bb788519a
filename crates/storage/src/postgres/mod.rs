//! PostgreSQL storage adapter.
//!
//! This module implements the repository traits defined in `chorus-core`
//! using PostgreSQL as the backing store.
//!
//! # Architecture
//!
//! - [`Database`] - Connection pool and migrations
//! - [`PgRepositories`] - Composite repository implementing `Repositories` trait
//! - Individual repos: `PgMessageRepository`, `PgGroupRepository`
//!
//! # Usage
//!
//! ```ignore
//! let config = DatabaseConfig::for_api(&database_url);
//! let db = Database::connect(&config).await?;
//! db.migrate().await?;
//!
//! let repositories = PgRepositories::new(&db);
//! ```

mod database;
mod group_repo;
mod helpers;
mod message_repo;

pub use database::{Database, DatabaseConfig, PurgeStats};
pub use group_repo::PgGroupRepository;
pub use message_repo::PgMessageRepository;

use chorus_core::ports::{GroupRepository, MessageRepository, Repositories};

// =============================================================================
// Composite Repository
// =============================================================================

/// Aggregated PostgreSQL repositories implementing the `Repositories` trait.
pub struct PgRepositories {
    messages: PgMessageRepository,
    groups: PgGroupRepository,
}

impl PgRepositories {
    /// Create a new repository aggregate sharing the database pool.
    pub fn new(db: &Database) -> Self {
        Self {
            messages: PgMessageRepository::new(db),
            groups: PgGroupRepository::new(db),
        }
    }
}

impl Repositories for PgRepositories {
    fn messages(&self) -> &dyn MessageRepository {
        &self.messages
    }

    fn groups(&self) -> &dyn GroupRepository {
        &self.groups
    }
}
