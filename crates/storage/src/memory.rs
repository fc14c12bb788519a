//! In-memory storage adapter.
//!
//! Implements the same ports as the PostgreSQL adapter on top of ordered
//! maps. Used by tests and by `--in-memory` runs of the server.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use chorus_core::error::{StorageError, StorageResult};
use chorus_core::models::{Group, GroupId, Message, MessageId, NewMessage};
use chorus_core::ports::{GroupRepository, IdFilter, MessageRepository, OrderDirection, Repositories};

#[derive(Default)]
struct MemoryState {
    groups: BTreeMap<GroupId, Group>,
    messages: BTreeMap<MessageId, Message>,
    next_message_id: i64,
    next_group_id: i64,
}

/// In-memory repositories.
///
/// Message ids are assigned sequentially from 1 across all groups.
#[derive(Default)]
pub struct MemoryRepositories {
    state: RwLock<MemoryState>,
}

impl MemoryRepositories {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a group and return it.
    pub async fn add_group(&self, name: impl Into<String>) -> Group {
        let mut state = self.state.write().await;
        state.next_group_id += 1;
        let group = Group {
            id: GroupId(state.next_group_id),
            name: name.into(),
        };
        state.groups.insert(group.id, group.clone());
        group
    }

    /// Number of stored messages across all groups.
    pub async fn message_count(&self) -> usize {
        self.state.read().await.messages.len()
    }
}

#[async_trait]
impl MessageRepository for MemoryRepositories {
    async fn find_messages(
        &self,
        group_id: GroupId,
        filter: IdFilter,
        order: OrderDirection,
        limit: u32,
    ) -> StorageResult<Vec<Message>> {
        let state = self.state.read().await;
        let matching = state
            .messages
            .values()
            .filter(|m| m.group_id == group_id && filter.matches(m.id));

        let rows: Vec<Message> = match order {
            OrderDirection::Asc => matching.take(limit as usize).cloned().collect(),
            OrderDirection::Desc => matching.rev().take(limit as usize).cloned().collect(),
        };
        Ok(rows)
    }

    async fn exists_message(&self, group_id: GroupId, filter: IdFilter) -> StorageResult<bool> {
        let state = self.state.read().await;
        Ok(state
            .messages
            .values()
            .any(|m| m.group_id == group_id && filter.matches(m.id)))
    }

    async fn insert_message(&self, message: NewMessage) -> StorageResult<Message> {
        let mut state = self.state.write().await;
        if !state.groups.contains_key(&message.group_id) {
            return Err(StorageError::ConstraintViolation(format!(
                "group {} does not exist",
                message.group_id
            )));
        }

        state.next_message_id += 1;
        let created = Message {
            id: MessageId(state.next_message_id),
            group_id: message.group_id,
            author_id: message.author_id,
            text: message.text,
            created_at: Utc::now(),
        };
        state.messages.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_message(&self, id: MessageId) -> StorageResult<Option<Message>> {
        Ok(self.state.read().await.messages.get(&id).cloned())
    }
}

#[async_trait]
impl GroupRepository for MemoryRepositories {
    async fn get_group(&self, id: GroupId) -> StorageResult<Option<Group>> {
        Ok(self.state.read().await.groups.get(&id).cloned())
    }

    async fn list_groups(&self) -> StorageResult<Vec<Group>> {
        Ok(self.state.read().await.groups.values().cloned().collect())
    }
}

impl Repositories for MemoryRepositories {
    fn messages(&self) -> &dyn MessageRepository {
        self
    }

    fn groups(&self) -> &dyn GroupRepository {
        self
    }
}

#[cfg(test)]
mod tests {
    use chorus_core::models::UserId;

    use super::*;

    async fn seeded(count: usize) -> (MemoryRepositories, GroupId) {
        let repos = MemoryRepositories::new();
        let group = repos.add_group("general").await;
        for i in 0..count {
            repos
                .insert_message(NewMessage {
                    group_id: group.id,
                    author_id: UserId(1),
                    text: format!("message {}", i),
                })
                .await
                .unwrap();
        }
        (repos, group.id)
    }

    #[tokio::test]
    async fn test_ids_increase_monotonically() {
        let (repos, group) = seeded(3).await;
        let rows = repos
            .find_messages(group, IdFilter::All, OrderDirection::Asc, 10)
            .await
            .unwrap();
        let ids: Vec<i64> = rows.iter().map(|m| m.id.get()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_desc_range_with_limit() {
        let (repos, group) = seeded(50).await;
        let rows = repos
            .find_messages(group, IdFilter::Lt(MessageId(41)), OrderDirection::Desc, 10)
            .await
            .unwrap();
        let ids: Vec<i64> = rows.iter().map(|m| m.id.get()).collect();
        assert_eq!(ids, (31..=40).rev().collect::<Vec<_>>());
    }

    // Test critique: les requêtes sont toujours limitées au groupe demandé
    #[tokio::test]
    async fn test_queries_scoped_to_group() {
        let (repos, group) = seeded(5).await;
        let other = repos.add_group("random").await;

        assert!(!repos.exists_message(other.id, IdFilter::All).await.unwrap());
        assert!(repos.exists_message(group, IdFilter::All).await.unwrap());
        assert!(repos
            .find_messages(other.id, IdFilter::All, OrderDirection::Desc, 10)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_insert_into_unknown_group_fails() {
        let repos = MemoryRepositories::new();
        let result = repos
            .insert_message(NewMessage {
                group_id: GroupId(9),
                author_id: UserId(1),
                text: "hi".into(),
            })
            .await;
        assert!(matches!(result, Err(StorageError::ConstraintViolation(_))));
        assert_eq!(repos.message_count().await, 0);
    }
}
