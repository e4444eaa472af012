//! Direct messaging between users.
//!
//! The service is both the [`Inbox`] driving port and the [`Messenger`]
//! collaborator moderation uses to reach sellers.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::debug;

use crate::domain::ports::{
    Inbox, InitiatedConversation, Messenger, MessengerError, PersistenceError,
    PersistenceGateway, UnitOfWork,
};
use crate::domain::{
    Actor, Conversation, ConversationId, ConversationSummary, Error, ListingId, Message,
    MessageContent, MessageId, UserId,
};

fn content(raw: String) -> Result<MessageContent, Error> {
    MessageContent::new(raw).map_err(|err| Error::invalid_request(err.to_string()))
}

fn messenger_error(error: PersistenceError) -> MessengerError {
    match error {
        PersistenceError::Connection { message } => MessengerError::unavailable(message),
        other => MessengerError::delivery(other.to_string()),
    }
}

async fn participant_conversation(
    uow: &mut dyn UnitOfWork,
    actor: Actor,
    id: ConversationId,
) -> Result<Conversation, Error> {
    let conversation = uow
        .conversation(id)
        .await?
        .ok_or_else(|| Error::not_found(format!("conversation {id} not found")))?;
    if !conversation.has_participant(actor.id) {
        return Err(Error::forbidden("not a participant in this conversation"));
    }
    Ok(conversation)
}

async fn find_or_create(
    uow: &mut dyn UnitOfWork,
    a: UserId,
    b: UserId,
    listing: Option<ListingId>,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<Conversation, PersistenceError> {
    if let Some(existing) = uow.conversation_between(a, b, listing).await? {
        return Ok(existing);
    }
    let conversation = Conversation::start(a, b, listing, now);
    uow.insert_conversation(&conversation).await?;
    debug!(conversation = %conversation.id, "conversation started");
    Ok(conversation)
}

async fn append(
    uow: &mut dyn UnitOfWork,
    conversation: ConversationId,
    sender: UserId,
    content: MessageContent,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<Message, PersistenceError> {
    let message = Message {
        id: MessageId::random(),
        conversation_id: conversation,
        sender_id: sender,
        content,
        created_at: now,
    };
    uow.insert_message(&message).await?;
    uow.touch_conversation(conversation, now).await?;
    Ok(message)
}

/// Messaging service implementing [`Inbox`] and [`Messenger`].
#[derive(Clone)]
pub struct MessagingService<G> {
    gateway: Arc<G>,
    clock: Arc<dyn Clock>,
}

impl<G> MessagingService<G> {
    pub fn new(gateway: Arc<G>, clock: Arc<dyn Clock>) -> Self {
        Self { gateway, clock }
    }
}

#[async_trait]
impl<G> Inbox for MessagingService<G>
where
    G: PersistenceGateway,
{
    async fn initiate(
        &self,
        actor: Actor,
        recipient: UserId,
        listing: Option<ListingId>,
        raw: String,
    ) -> Result<InitiatedConversation, Error> {
        if recipient == actor.id {
            return Err(Error::invalid_request("you cannot message yourself"));
        }
        let content = content(raw)?;

        let mut uow = self.gateway.begin().await?;
        if !uow.user(recipient).await?.is_some_and(|user| user.is_active) {
            return Err(Error::not_found(format!("user {recipient} not found")));
        }
        if let Some(listing_id) = listing {
            if uow.listing(listing_id).await?.is_none() {
                return Err(Error::not_found(format!("listing {listing_id} not found")));
            }
        }

        let now = self.clock.utc();
        let mut conversation = find_or_create(uow.as_mut(), actor.id, recipient, listing, now).await?;
        let message = append(uow.as_mut(), conversation.id, actor.id, content, now).await?;
        uow.commit().await?;

        conversation.updated_at = now;
        Ok(InitiatedConversation {
            conversation,
            message,
        })
    }

    async fn conversations(&self, actor: Actor) -> Result<Vec<ConversationSummary>, Error> {
        let mut uow = self.gateway.begin().await?;
        let conversations = uow.conversations_for(actor.id).await?;
        let mut summaries = Vec::with_capacity(conversations.len());
        for conversation in conversations {
            let last_message = uow.last_message(conversation.id).await?;
            summaries.push(ConversationSummary {
                conversation,
                last_message,
            });
        }
        uow.commit().await?;
        Ok(summaries)
    }

    async fn conversation(&self, actor: Actor, id: ConversationId) -> Result<Conversation, Error> {
        let mut uow = self.gateway.begin().await?;
        let conversation = participant_conversation(uow.as_mut(), actor, id).await?;
        uow.commit().await?;
        Ok(conversation)
    }

    async fn messages(&self, actor: Actor, id: ConversationId) -> Result<Vec<Message>, Error> {
        let mut uow = self.gateway.begin().await?;
        participant_conversation(uow.as_mut(), actor, id).await?;
        let messages = uow.messages(id).await?;
        uow.commit().await?;
        Ok(messages)
    }

    async fn send(
        &self,
        actor: Actor,
        id: ConversationId,
        raw: String,
    ) -> Result<Message, Error> {
        let content = content(raw)?;
        let mut uow = self.gateway.begin().await?;
        participant_conversation(uow.as_mut(), actor, id).await?;
        let message = append(uow.as_mut(), id, actor.id, content, self.clock.utc()).await?;
        uow.commit().await?;
        Ok(message)
    }
}

#[async_trait]
impl<G> Messenger for MessagingService<G>
where
    G: PersistenceGateway,
{
    async fn find_or_create_conversation(
        &self,
        a: UserId,
        b: UserId,
        listing: Option<ListingId>,
    ) -> Result<Conversation, MessengerError> {
        let mut uow = self.gateway.begin().await.map_err(messenger_error)?;
        let conversation = find_or_create(uow.as_mut(), a, b, listing, self.clock.utc())
            .await
            .map_err(messenger_error)?;
        uow.commit().await.map_err(messenger_error)?;
        Ok(conversation)
    }

    async fn post_message(
        &self,
        conversation: &Conversation,
        sender: UserId,
        content: MessageContent,
    ) -> Result<Message, MessengerError> {
        if !conversation.has_participant(sender) {
            return Err(MessengerError::delivery(
                "sender is not a participant in the conversation",
            ));
        }
        let mut uow = self.gateway.begin().await.map_err(messenger_error)?;
        let message = append(uow.as_mut(), conversation.id, sender, content, self.clock.utc())
            .await
            .map_err(messenger_error)?;
        uow.commit().await.map_err(messenger_error)?;
        Ok(message)
    }
}

#[cfg(test)]
#[path = "messaging_service_tests.rs"]
mod tests;
