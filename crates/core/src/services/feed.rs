//! Feed service - serves message pages and creates messages.
//!
//! A page request flows through three steps:
//!
//! 1. [`RangeQuery::build`] validates the request and derives the filter
//! 2. The repository returns the rows, then [`BoundaryProber`] checks both edges
//! 3. [`assemble`] turns rows and boundaries into a [`Connection`]

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use crate::error::{FeedError, FeedResult};
use crate::metrics::{PageTimer, record_message_created, record_page_served, record_request_rejected};
use crate::models::{GroupId, Message, NewMessage, UserId};
use crate::ports::{Connection, MessageGateway, PaginationRequest, Repositories};

use super::boundary::BoundaryProber;
use super::connection::assemble;
use super::range_query::{RangeQuery, ScanDirection};

/// Maximum message length in characters.
pub const MAX_MESSAGE_LENGTH: usize = 4096;

/// Message feed service.
///
/// Cheap to clone; all clones share the same repositories.
#[derive(Clone)]
pub struct FeedService {
    repositories: Arc<dyn Repositories>,
}

impl FeedService {
    pub fn new(repositories: Arc<dyn Repositories>) -> Self {
        Self { repositories }
    }

    /// Access the underlying repositories.
    pub fn repositories(&self) -> &Arc<dyn Repositories> {
        &self.repositories
    }

    /// Fetch one page of a group's feed.
    #[instrument(skip_all, fields(group = %request.group_id))]
    pub async fn list_messages(&self, request: PaginationRequest) -> FeedResult<Connection<Message>> {
        let query = RangeQuery::build(&request).inspect_err(|e| {
            warn!(error = %e, "Rejected page request");
            record_request_rejected("page");
        })?;

        let _timer = PageTimer::new();
        let messages = self.repositories.messages();

        let rows = messages
            .find_messages(query.group_id, query.filter, query.order, query.limit)
            .await?;
        let boundaries = BoundaryProber::new(messages).probe(&query, &rows).await?;

        debug!(
            rows = rows.len(),
            limit = query.limit,
            has_next = boundaries.has_next_page,
            has_previous = boundaries.has_previous_page,
            "Page fetched"
        );

        record_page_served(match query.direction {
            ScanDirection::Older => "older",
            ScanDirection::Newer => "newer",
        });

        Ok(assemble(rows, boundaries))
    }

    /// Create a message in a group.
    ///
    /// Input is validated first; storage failures surface as
    /// [`FeedError::MutationFailed`].
    #[instrument(skip_all, fields(group = %message.group_id, author = %message.author_id))]
    pub async fn create_message(&self, message: NewMessage) -> FeedResult<Message> {
        let message = self.validate_new_message(message).await.inspect_err(|e| {
            warn!(error = %e, "Rejected message");
            record_request_rejected("create");
        })?;

        let created = self
            .repositories
            .messages()
            .insert_message(message)
            .await
            .map_err(|e| FeedError::MutationFailed(e.to_string()))?;

        debug!(id = %created.id, "Message created");
        record_message_created();
        Ok(created)
    }

    async fn validate_new_message(&self, mut message: NewMessage) -> FeedResult<NewMessage> {
        let trimmed = message.text.trim();
        if trimmed.is_empty() {
            return Err(FeedError::InvalidRequest("message text cannot be empty".into()));
        }
        if trimmed.chars().count() > MAX_MESSAGE_LENGTH {
            return Err(FeedError::InvalidRequest(format!(
                "message text too long: maximum {} characters allowed",
                MAX_MESSAGE_LENGTH
            )));
        }
        message.text = trimmed.to_string();

        let group = self.repositories.groups().get_group(message.group_id).await?;
        if group.is_none() {
            return Err(FeedError::InvalidRequest(format!(
                "unknown group {}",
                message.group_id
            )));
        }

        Ok(message)
    }
}

// =============================================================================
// In-process Gateway
// =============================================================================

/// [`MessageGateway`] backed by a [`FeedService`] in the same process.
#[derive(Clone)]
pub struct LocalGateway {
    service: FeedService,
}

impl LocalGateway {
    pub fn new(service: FeedService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl MessageGateway for LocalGateway {
    async fn fetch_messages(&self, request: PaginationRequest) -> FeedResult<Connection<Message>> {
        self.service.list_messages(request).await
    }

    async fn create_message(
        &self,
        group_id: GroupId,
        author_id: UserId,
        text: String,
    ) -> FeedResult<Message> {
        self.service
            .create_message(NewMessage {
                group_id,
                author_id,
                text,
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use chrono::Utc;

    use super::*;
    use crate::cursor;
    use crate::error::{StorageError, StorageResult};
    use crate::models::{Group, MessageId};
    use crate::ports::{GroupRepository, IdFilter, MessageRepository, OrderDirection};

    /// Minimal in-memory repositories for service tests.
    #[derive(Default)]
    struct MockRepos {
        rows: Mutex<BTreeMap<i64, Message>>,
        groups: Vec<Group>,
        fail_insert: bool,
    }

    impl MockRepos {
        fn with_ids(ids: impl IntoIterator<Item = i64>) -> Self {
            let repos = Self {
                groups: vec![Group {
                    id: GroupId(1),
                    name: "general".into(),
                }],
                ..Default::default()
            };
            for id in ids {
                repos.rows.lock().unwrap().insert(
                    id,
                    Message {
                        id: MessageId(id),
                        group_id: GroupId(1),
                        author_id: UserId(1),
                        text: format!("message {}", id),
                        created_at: Utc::now(),
                    },
                );
            }
            repos
        }
    }

    #[async_trait]
    impl MessageRepository for MockRepos {
        async fn find_messages(
            &self,
            group_id: GroupId,
            filter: IdFilter,
            order: OrderDirection,
            limit: u32,
        ) -> StorageResult<Vec<Message>> {
            let rows = self.rows.lock().unwrap();
            let matching = rows
                .values()
                .filter(|m| m.group_id == group_id && filter.matches(m.id))
                .cloned();
            let sorted: Vec<Message> = match order {
                OrderDirection::Asc => matching.collect(),
                OrderDirection::Desc => matching.rev().collect(),
            };
            Ok(sorted.into_iter().take(limit as usize).collect())
        }

        async fn exists_message(&self, group_id: GroupId, filter: IdFilter) -> StorageResult<bool> {
            let rows = self.rows.lock().unwrap();
            Ok(rows
                .values()
                .any(|m| m.group_id == group_id && filter.matches(m.id)))
        }

        async fn insert_message(&self, message: NewMessage) -> StorageResult<Message> {
            if self.fail_insert {
                return Err(StorageError::ConstraintViolation("insert rejected".into()));
            }
            let mut rows = self.rows.lock().unwrap();
            let id = rows.keys().next_back().copied().unwrap_or(0) + 1;
            let created = Message {
                id: MessageId(id),
                group_id: message.group_id,
                author_id: message.author_id,
                text: message.text,
                created_at: Utc::now(),
            };
            rows.insert(id, created.clone());
            Ok(created)
        }

        async fn get_message(&self, id: MessageId) -> StorageResult<Option<Message>> {
            Ok(self.rows.lock().unwrap().get(&id.get()).cloned())
        }
    }

    #[async_trait]
    impl GroupRepository for MockRepos {
        async fn get_group(&self, id: GroupId) -> StorageResult<Option<Group>> {
            Ok(self.groups.iter().find(|g| g.id == id).cloned())
        }

        async fn list_groups(&self) -> StorageResult<Vec<Group>> {
            Ok(self.groups.clone())
        }
    }

    impl Repositories for MockRepos {
        fn messages(&self) -> &dyn MessageRepository {
            self
        }

        fn groups(&self) -> &dyn GroupRepository {
            self
        }
    }

    fn service(repos: MockRepos) -> FeedService {
        FeedService::new(Arc::new(repos))
    }

    fn ids(connection: &Connection<Message>) -> Vec<i64> {
        connection.edges.iter().map(|e| e.node.id.get()).collect()
    }

    #[tokio::test]
    async fn test_after_page_with_older_rows_remaining() {
        let svc = service(MockRepos::with_ids(1..=50));
        let request = PaginationRequest::older(GroupId(1), 10, cursor::encode(MessageId(41)));
        let page = svc.list_messages(request).await.unwrap();

        assert_eq!(ids(&page), (31..=40).rev().collect::<Vec<_>>());
        assert!(page.page_info.has_next_page);
        assert!(page.page_info.has_previous_page);
    }

    #[tokio::test]
    async fn test_after_page_at_end_of_feed() {
        let svc = service(MockRepos::with_ids(31..=50));
        let request = PaginationRequest::older(GroupId(1), 10, cursor::encode(MessageId(41)));
        let page = svc.list_messages(request).await.unwrap();

        assert_eq!(ids(&page), (31..=40).rev().collect::<Vec<_>>());
        assert!(!page.page_info.has_next_page);
        assert!(page.page_info.has_previous_page);
    }

    #[tokio::test]
    async fn test_empty_group_initial_page() {
        let svc = service(MockRepos::with_ids([]));
        let page = svc
            .list_messages(PaginationRequest::head(GroupId(1), 10))
            .await
            .unwrap();

        assert!(page.edges.is_empty());
        assert!(!page.page_info.has_next_page);
        assert!(!page.page_info.has_previous_page);
    }

    #[tokio::test]
    async fn test_edges_strictly_descending() {
        let svc = service(MockRepos::with_ids([3, 7, 12, 13, 40, 41]));
        let page = svc
            .list_messages(PaginationRequest::head(GroupId(1), 5))
            .await
            .unwrap();

        let ids = ids(&page);
        assert_eq!(ids, vec![41, 40, 13, 12, 7]);
        assert!(ids.windows(2).all(|w| w[0] > w[1]));
        assert!(page.page_info.has_next_page);
    }

    #[tokio::test]
    async fn test_invalid_request_rejected() {
        let svc = service(MockRepos::with_ids(1..=5));
        let result = svc.list_messages(PaginationRequest::head(GroupId(1), 0)).await;
        assert!(matches!(result, Err(FeedError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_create_message_trims_and_assigns_id() {
        let svc = service(MockRepos::with_ids(1..=3));
        let created = svc
            .create_message(NewMessage {
                group_id: GroupId(1),
                author_id: UserId(7),
                text: "  hello  ".into(),
            })
            .await
            .unwrap();

        assert_eq!(created.id, MessageId(4));
        assert_eq!(created.text, "hello");
        assert_eq!(created.author_id, UserId(7));
    }

    // Test critique: validation des entrées avant l'écriture
    #[tokio::test]
    async fn test_create_message_validation() {
        let svc = service(MockRepos::with_ids([]));
        let new = |group: i64, text: &str| NewMessage {
            group_id: GroupId(group),
            author_id: UserId(1),
            text: text.into(),
        };

        // Texte vide
        assert!(matches!(
            svc.create_message(new(1, "   ")).await,
            Err(FeedError::InvalidRequest(_))
        ));
        // Trop long
        let long = "x".repeat(MAX_MESSAGE_LENGTH + 1);
        assert!(svc.create_message(new(1, &long)).await.is_err());
        // Groupe inconnu
        assert!(matches!(
            svc.create_message(new(99, "hi")).await,
            Err(FeedError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_insert_failure_is_mutation_failure() {
        let mut repos = MockRepos::with_ids([]);
        repos.fail_insert = true;
        let gateway = LocalGateway::new(service(repos));
        let result = gateway
            .create_message(GroupId(1), UserId(1), "hello".into())
            .await;
        assert!(matches!(result, Err(FeedError::MutationFailed(_))));
    }
}
