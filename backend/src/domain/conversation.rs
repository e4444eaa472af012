//! Direct-message conversations between two users.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::ids::{ConversationId, ListingId, MessageId, UserId};

/// Maximum accepted message length in characters.
pub const MESSAGE_MAX: usize = 2000;

/// Raised when message content is unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MessageContentError {
    #[error("message must not be empty")]
    Empty,
    #[error("message must be at most {MESSAGE_MAX} characters")]
    TooLong,
}

/// Non-blank message body of at most [`MESSAGE_MAX`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MessageContent(String);

impl MessageContent {
    pub fn new(raw: impl Into<String>) -> Result<Self, MessageContentError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(MessageContentError::Empty);
        }
        if raw.chars().count() > MESSAGE_MAX {
            return Err(MessageContentError::TooLong);
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// A conversation between two users, optionally about a listing.
///
/// Participants are unordered; `user1_id` is whoever started it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: ConversationId,
    pub user1_id: UserId,
    pub user2_id: UserId,
    pub listing_id: Option<ListingId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Start a conversation from `initiator` to `recipient`.
    pub fn start(
        initiator: UserId,
        recipient: UserId,
        listing_id: Option<ListingId>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ConversationId::random(),
            user1_id: initiator,
            user2_id: recipient,
            listing_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_participant(&self, user: UserId) -> bool {
        self.user1_id == user || self.user2_id == user
    }

    /// Whether this conversation is between `a` and `b` (in either order)
    /// about `listing_id`.
    pub fn is_between(&self, a: UserId, b: UserId, listing_id: Option<ListingId>) -> bool {
        let same_pair = (self.user1_id == a && self.user2_id == b)
            || (self.user1_id == b && self.user2_id == a);
        same_pair && self.listing_id == listing_id
    }
}

/// An immutable message within a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub sender_id: UserId,
    pub content: MessageContent,
    pub created_at: DateTime<Utc>,
}

/// Inbox entry: a conversation with its most recent message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationSummary {
    pub conversation: Conversation,
    pub last_message: Option<Message>,
}
