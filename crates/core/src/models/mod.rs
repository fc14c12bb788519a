//! Domain models representing groups and their message feeds.
//!
//! These models are storage-agnostic and represent the canonical
//! form of feed data within the domain layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Identifier Types
// =============================================================================

/// Macro to generate integer identifier newtypes with common functionality.
///
/// Generates:
/// - `get()` - Access the raw integer
/// - `Display` trait implementation
/// - `From<i64>` implementation
macro_rules! id_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Get the raw integer value.
            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

id_newtype!(
    /// Message identifier.
    ///
    /// Real identifiers are assigned by the store, strictly positive and
    /// monotonically increasing. The non-positive range is reserved for
    /// provisional messages synthesized on the client before the server
    /// confirms them.
    MessageId
);

id_newtype!(
    /// Chat group identifier.
    GroupId
);

id_newtype!(
    /// User identifier.
    UserId
);

impl MessageId {
    /// Whether this identifier can name a stored message.
    pub fn is_valid(self) -> bool {
        self.0 > 0
    }

    /// Whether this identifier belongs to the reserved provisional subspace.
    pub fn is_provisional(self) -> bool {
        self.0 <= 0
    }

    /// Provisional identifier for the `seq`-th locally sent message.
    ///
    /// Sequence numbers start at zero, so the first provisional id is `0`,
    /// then `-1`, `-2`, ... None of them collide with a stored message.
    pub fn provisional(seq: u32) -> Self {
        Self(-i64::from(seq))
    }
}

// =============================================================================
// Messages
// =============================================================================

/// A chat message posted to a group.
///
/// Messages are immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Store-assigned identifier (or provisional id on the client).
    pub id: MessageId,
    /// Group the message was posted to.
    pub group_id: GroupId,
    /// Author of the message.
    pub author_id: UserId,
    /// Message body.
    pub text: String,
    /// Creation time (server time once confirmed).
    pub created_at: DateTime<Utc>,
}

/// Input for the create-message mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub group_id: GroupId,
    pub author_id: UserId,
    pub text: String,
}

// =============================================================================
// Groups
// =============================================================================

/// A chat group owning a message feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
}

// =============================================================================
// Tests
// =============================================================================
