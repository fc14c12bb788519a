//! Message repository implementation for PostgreSQL.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use chorus_core::error::{StorageError, StorageResult};
use chorus_core::models::{GroupId, Message, MessageId, NewMessage, UserId};
use chorus_core::ports::{IdFilter, MessageRepository, OrderDirection};

use super::database::Database;
use super::helpers::{id_condition, map_insert_error, order_sql, row_to_message_id};

// =============================================================================
// Repository Implementation
// =============================================================================

/// PostgreSQL implementation of MessageRepository.
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    async fn find_messages(
        &self,
        group_id: GroupId,
        filter: IdFilter,
        order: OrderDirection,
        limit: u32,
    ) -> StorageResult<Vec<Message>> {
        // SAFETY: This dynamic SQL is safe from injection because:
        // 1. The comparison operator comes from `id_condition`, never user strings
        // 2. Order direction comes from enum (ASC/DESC)
        // 3. All VALUES are parameterized via $1, $2, $3 and bound separately
        let condition = id_condition(filter);
        let query = match condition {
            Some((op, _)) => format!(
                r#"
                SELECT id, group_id, author_id, text, created_at
                FROM messages
                WHERE group_id = $1 AND id {} $3
                ORDER BY id {}
                LIMIT $2
                "#,
                op,
                order_sql(order)
            ),
            None => format!(
                r#"
                SELECT id, group_id, author_id, text, created_at
                FROM messages
                WHERE group_id = $1
                ORDER BY id {}
                LIMIT $2
                "#,
                order_sql(order)
            ),
        };

        let mut q = sqlx::query_as::<_, MessageRow>(&query)
            .bind(group_id.get())
            .bind(i64::from(limit));
        if let Some((_, bound)) = condition {
            q = q.bind(bound);
        }

        let rows = q
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::QueryError(e.to_string()))?;

        rows.into_iter().map(MessageRow::into_message).collect()
    }

    async fn exists_message(&self, group_id: GroupId, filter: IdFilter) -> StorageResult<bool> {
        // Same injection guarantees as `find_messages`.
        let condition = id_condition(filter);
        let query = match condition {
            Some((op, _)) => format!(
                "SELECT EXISTS(SELECT 1 FROM messages WHERE group_id = $1 AND id {} $2)",
                op
            ),
            None => "SELECT EXISTS(SELECT 1 FROM messages WHERE group_id = $1)".to_string(),
        };

        let mut q = sqlx::query_as::<_, (bool,)>(&query).bind(group_id.get());
        if let Some((_, bound)) = condition {
            q = q.bind(bound);
        }

        let (exists,) = q
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StorageError::QueryError(e.to_string()))?;

        Ok(exists)
    }

    async fn insert_message(&self, message: NewMessage) -> StorageResult<Message> {
        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            INSERT INTO messages (group_id, author_id, text)
            VALUES ($1, $2, $3)
            RETURNING id, group_id, author_id, text, created_at
            "#,
        )
        .bind(message.group_id.get())
        .bind(message.author_id.get())
        .bind(&message.text)
        .fetch_one(&self.pool)
        .await
        .map_err(map_insert_error)?;

        row.into_message()
    }

    async fn get_message(&self, id: MessageId) -> StorageResult<Option<Message>> {
        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, group_id, author_id, text, created_at
            FROM messages
            WHERE id = $1
            "#,
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::QueryError(e.to_string()))?;

        row.map(MessageRow::into_message).transpose()
    }
}

// =============================================================================
// Row Mapping
// =============================================================================

#[derive(sqlx::FromRow)]
struct MessageRow {
    id: i64,
    group_id: i64,
    author_id: i64,
    text: String,
    created_at: DateTime<Utc>,
}

impl MessageRow {
    fn into_message(self) -> StorageResult<Message> {
        Ok(Message {
            id: row_to_message_id(self.id, "message.id")?,
            group_id: GroupId(self.group_id),
            author_id: UserId(self.author_id),
            text: self.text,
            created_at: self.created_at,
        })
    }
}
