//! Driven port for transactional persistence.
//!
//! Every domain operation opens one [`UnitOfWork`], reads and writes through
//! it, and finishes with [`UnitOfWork::commit`]. A unit of work dropped
//! without committing is rolled back by its adapter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    Category, CategoryId, Conversation, ConversationId, EmailAddress, Error, ImageId, Listing,
    ListingId, ListingImage, ListingPage, ListingQuery, Message, Review, ReviewId, User, UserId,
    UserSearch, Username,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by persistence adapters.
    pub enum PersistenceError {
        /// The backing store could not be reached.
        Connection { message: String } => "persistence connection failed: {message}",
        /// A query or mutation failed during execution.
        Query { message: String } => "persistence query failed: {message}",
        /// A uniqueness constraint rejected the write.
        Conflict { message: String } => "persistence conflict: {message}",
    }
}

impl PersistenceError {
    /// Translate into a domain error.
    ///
    /// Query failures are logged and redacted; the rest keep their message.
    pub fn into_domain(self) -> Error {
        match self {
            Self::Connection { message } => Error::service_unavailable(message),
            Self::Conflict { message } => Error::conflict(message),
            Self::Query { message } => {
                tracing::error!(%message, "persistence query failed");
                Error::internal("persistence query failed")
            }
        }
    }
}

impl From<PersistenceError> for Error {
    fn from(value: PersistenceError) -> Self {
        value.into_domain()
    }
}

/// Opens units of work.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, PersistenceError>;
}

/// One transactional scope over every marketplace entity.
///
/// Collection reads return rows in the order documented per method.
#[async_trait]
pub trait UnitOfWork: Send {
    async fn user(&mut self, id: UserId) -> Result<Option<User>, PersistenceError>;
    async fn user_by_email(
        &mut self,
        email: &EmailAddress,
    ) -> Result<Option<User>, PersistenceError>;
    async fn user_by_username(
        &mut self,
        username: &Username,
    ) -> Result<Option<User>, PersistenceError>;
    /// Fails with [`PersistenceError::Conflict`] on a duplicate username or email.
    async fn insert_user(&mut self, user: &User) -> Result<(), PersistenceError>;
    /// Active users matching `query`, ordered by username.
    async fn search_users(
        &mut self,
        query: &UserSearch,
        limit: u32,
    ) -> Result<Vec<User>, PersistenceError>;

    /// All categories ordered by display order.
    async fn categories(&mut self) -> Result<Vec<Category>, PersistenceError>;
    async fn category(&mut self, id: CategoryId) -> Result<Option<Category>, PersistenceError>;

    async fn listing(&mut self, id: ListingId) -> Result<Option<Listing>, PersistenceError>;
    async fn insert_listing(&mut self, listing: &Listing) -> Result<(), PersistenceError>;
    /// Overwrite every column; fails when the row is gone.
    async fn update_listing(&mut self, listing: &Listing) -> Result<(), PersistenceError>;
    /// Add one to the view counter and nothing else; fails when the row is gone.
    async fn increment_views(&mut self, id: ListingId) -> Result<(), PersistenceError>;
    /// Delete the listing row; its images must already be gone.
    async fn delete_listing(&mut self, id: ListingId) -> Result<(), PersistenceError>;
    /// Matching listings, title hits first then newest first, windowed.
    async fn search_listings(
        &mut self,
        query: &ListingQuery,
    ) -> Result<ListingPage, PersistenceError>;

    /// Images for a listing ordered by display order.
    async fn images(&mut self, listing: ListingId) -> Result<Vec<ListingImage>, PersistenceError>;
    async fn insert_image(&mut self, image: &ListingImage) -> Result<(), PersistenceError>;
    async fn update_image(&mut self, image: &ListingImage) -> Result<(), PersistenceError>;
    async fn delete_image(&mut self, id: ImageId) -> Result<(), PersistenceError>;

    /// Fails with [`PersistenceError::Conflict`] when the reviewer already
    /// reviewed the listing.
    async fn insert_review(&mut self, review: &Review) -> Result<(), PersistenceError>;
    async fn review(&mut self, id: ReviewId) -> Result<Option<Review>, PersistenceError>;
    async fn review_by(
        &mut self,
        listing: ListingId,
        reviewer: UserId,
    ) -> Result<Option<Review>, PersistenceError>;
    /// Reviews of a listing, newest first.
    async fn reviews_for_listing(
        &mut self,
        listing: ListingId,
    ) -> Result<Vec<Review>, PersistenceError>;
    /// Reviews about a user, newest first.
    async fn reviews_about(&mut self, reviewee: UserId) -> Result<Vec<Review>, PersistenceError>;

    async fn conversation(
        &mut self,
        id: ConversationId,
    ) -> Result<Option<Conversation>, PersistenceError>;
    /// Conversation between `a` and `b` in either order about `listing`.
    async fn conversation_between(
        &mut self,
        a: UserId,
        b: UserId,
        listing: Option<ListingId>,
    ) -> Result<Option<Conversation>, PersistenceError>;
    async fn insert_conversation(
        &mut self,
        conversation: &Conversation,
    ) -> Result<(), PersistenceError>;
    async fn touch_conversation(
        &mut self,
        id: ConversationId,
        at: DateTime<Utc>,
    ) -> Result<(), PersistenceError>;
    /// Conversations the user takes part in, most recently updated first.
    async fn conversations_for(
        &mut self,
        user: UserId,
    ) -> Result<Vec<Conversation>, PersistenceError>;

    async fn insert_message(&mut self, message: &Message) -> Result<(), PersistenceError>;
    /// Messages oldest first.
    async fn messages(
        &mut self,
        conversation: ConversationId,
    ) -> Result<Vec<Message>, PersistenceError>;
    async fn last_message(
        &mut self,
        conversation: ConversationId,
    ) -> Result<Option<Message>, PersistenceError>;

    async fn commit(self: Box<Self>) -> Result<(), PersistenceError>;
    async fn rollback(self: Box<Self>) -> Result<(), PersistenceError>;
}
