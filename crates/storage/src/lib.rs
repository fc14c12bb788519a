//! Storage layer for the Chorus message feed.
//!
//! This crate provides implementations of the repository traits defined
//! in `chorus-core`: a PostgreSQL adapter for production and an
//! in-memory adapter for tests and local runs.
//!
//! # Architecture
//!
//! The storage layer follows the repository pattern:
//!
//! - [`postgres::Database`] - Connection pool management
//! - [`postgres::PgRepositories`] - Composite repository for messages and groups
//! - [`memory::MemoryRepositories`] - Ordered-map implementation of the same ports
//!
//! # Usage
//!
//! ```ignore
//! use chorus_storage::{Database, DatabaseConfig, PgRepositories};
//!
//! // Connect to the database
//! let config = DatabaseConfig::for_api(&database_url);
//! let db = Database::connect(&config).await?;
//!
//! // Run migrations
//! db.migrate().await?;
//!
//! // Create repositories
//! let repositories = Arc::new(PgRepositories::new(&db));
//! ```

pub mod memory;
pub mod postgres;

pub use memory::MemoryRepositories;
pub use postgres::{Database, DatabaseConfig, PgRepositories, PurgeStats};
