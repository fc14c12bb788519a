//! Group repository implementation for PostgreSQL.

use async_trait::async_trait;
use sqlx::PgPool;

use chorus_core::error::{StorageError, StorageResult};
use chorus_core::models::{Group, GroupId};
use chorus_core::ports::GroupRepository;

use super::database::Database;

/// PostgreSQL implementation of GroupRepository.
pub struct PgGroupRepository {
    pool: PgPool,
}

impl PgGroupRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }
}

#[async_trait]
impl GroupRepository for PgGroupRepository {
    async fn get_group(&self, id: GroupId) -> StorageResult<Option<Group>> {
        let row = sqlx::query_as::<_, GroupRow>("SELECT id, name FROM groups WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::QueryError(e.to_string()))?;

        Ok(row.map(GroupRow::into_group))
    }

    async fn list_groups(&self) -> StorageResult<Vec<Group>> {
        let rows = sqlx::query_as::<_, GroupRow>("SELECT id, name FROM groups ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::QueryError(e.to_string()))?;

        Ok(rows.into_iter().map(GroupRow::into_group).collect())
    }
}

#[derive(sqlx::FromRow)]
struct GroupRow {
    id: i64,
    name: String,
}

impl GroupRow {
    fn into_group(self) -> Group {
        Group {
            id: GroupId(self.id),
            name: self.name,
        }
    }
}
