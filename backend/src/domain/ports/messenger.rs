//! Driven port used by moderation to notify sellers.

use async_trait::async_trait;

use crate::domain::{Conversation, ListingId, Message, MessageContent, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised while delivering a direct message.
    pub enum MessengerError {
        /// The message store could not be reached.
        Unavailable { message: String } => "messenger unavailable: {message}",
        /// Delivery failed for another reason.
        Delivery { message: String } => "message delivery failed: {message}",
    }
}

/// Direct-message delivery.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Return the conversation between `a` and `b` about `listing`, creating
    /// it when missing. Lookup ignores participant order.
    async fn find_or_create_conversation(
        &self,
        a: UserId,
        b: UserId,
        listing: Option<ListingId>,
    ) -> Result<Conversation, MessengerError>;

    /// Append a message and bump the conversation's `updated_at`.
    async fn post_message(
        &self,
        conversation: &Conversation,
        sender: UserId,
        content: MessageContent,
    ) -> Result<Message, MessengerError>;
}
