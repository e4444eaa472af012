//! Driving port for user-to-user messaging.

use async_trait::async_trait;

use crate::domain::{
    Actor, Conversation, ConversationId, ConversationSummary, Error, ListingId, Message, UserId,
};

/// Conversation created or reused by a first contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitiatedConversation {
    pub conversation: Conversation,
    pub message: Message,
}

/// Messaging between participants.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Inbox: Send + Sync {
    /// Contact `recipient`, reusing any existing conversation about `listing`.
    async fn initiate(
        &self,
        actor: Actor,
        recipient: UserId,
        listing: Option<ListingId>,
        content: String,
    ) -> Result<InitiatedConversation, Error>;

    /// The actor's conversations, most recently updated first.
    async fn conversations(&self, actor: Actor) -> Result<Vec<ConversationSummary>, Error>;

    async fn conversation(&self, actor: Actor, id: ConversationId) -> Result<Conversation, Error>;

    /// Messages oldest first.
    async fn messages(&self, actor: Actor, id: ConversationId) -> Result<Vec<Message>, Error>;

    async fn send(
        &self,
        actor: Actor,
        id: ConversationId,
        content: String,
    ) -> Result<Message, Error>;
}
