//! Port traits for data repositories.
//!
//! These traits define the storage interface used by the domain layer.
//! Implementations live in the infrastructure layer (e.g., `chorus-storage`).

use async_trait::async_trait;

use crate::error::StorageResult;
use crate::models::{Group, GroupId, Message, MessageId, NewMessage};

use super::pagination::OrderDirection;

// =============================================================================
// Filter Types
// =============================================================================

/// Identifier range filter applied within a single group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdFilter {
    /// No restriction on the identifier.
    All,
    /// `id < bound`
    Lt(MessageId),
    /// `id <= bound`
    Le(MessageId),
    /// `id > bound`
    Gt(MessageId),
    /// `id >= bound`
    Ge(MessageId),
}

impl IdFilter {
    /// Evaluate the filter against an identifier.
    pub fn matches(&self, id: MessageId) -> bool {
        match *self {
            Self::All => true,
            Self::Lt(bound) => id < bound,
            Self::Le(bound) => id <= bound,
            Self::Gt(bound) => id > bound,
            Self::Ge(bound) => id >= bound,
        }
    }

    /// The complementary filter: every id this filter rejects.
    ///
    /// `All` has no complement and yields `None`.
    pub fn complement(&self) -> Option<Self> {
        match *self {
            Self::All => None,
            Self::Lt(bound) => Some(Self::Ge(bound)),
            Self::Le(bound) => Some(Self::Gt(bound)),
            Self::Gt(bound) => Some(Self::Le(bound)),
            Self::Ge(bound) => Some(Self::Lt(bound)),
        }
    }
}

// =============================================================================
// Repository Traits
// =============================================================================

/// Repository for message data.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Fetch at most `limit` messages of a group matching `filter`, sorted by id.
    async fn find_messages(
        &self,
        group_id: GroupId,
        filter: IdFilter,
        order: OrderDirection,
        limit: u32,
    ) -> StorageResult<Vec<Message>>;

    /// Whether at least one message of the group matches `filter`.
    ///
    /// Implementations must not transfer row contents.
    async fn exists_message(&self, group_id: GroupId, filter: IdFilter) -> StorageResult<bool>;

    /// Persist a new message and return it with its assigned id and timestamp.
    async fn insert_message(&self, message: NewMessage) -> StorageResult<Message>;

    /// Get message by ID.
    async fn get_message(&self, id: MessageId) -> StorageResult<Option<Message>>;
}

/// Repository for group data.
#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// Get group by ID.
    async fn get_group(&self, id: GroupId) -> StorageResult<Option<Group>>;

    /// List all groups, ordered by id.
    async fn list_groups(&self) -> StorageResult<Vec<Group>>;
}

// =============================================================================
// Composite Repository
// =============================================================================

/// Combined repository access for the feed services.
pub trait Repositories: Send + Sync {
    /// Access the message repository.
    fn messages(&self) -> &dyn MessageRepository;

    /// Access the group repository.
    fn groups(&self) -> &dyn GroupRepository;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_bounds_are_strict_or_inclusive() {
        let b = MessageId(41);
        assert!(!IdFilter::Lt(b).matches(b));
        assert!(IdFilter::Le(b).matches(b));
        assert!(!IdFilter::Gt(b).matches(b));
        assert!(IdFilter::Ge(b).matches(b));
        assert!(IdFilter::All.matches(b));
    }

    // Test critique: le complément couvre exactement la valeur exclue par le filtre
    #[test]
    fn test_complement_includes_excluded_boundary() {
        let b = MessageId(41);
        for filter in [IdFilter::Lt(b), IdFilter::Gt(b), IdFilter::Le(b), IdFilter::Ge(b)] {
            let complement = filter.complement().unwrap();
            for raw in 39..=43 {
                let id = MessageId(raw);
                assert_ne!(filter.matches(id), complement.matches(id));
            }
        }
        assert_eq!(IdFilter::All.complement(), None);
    }
}
