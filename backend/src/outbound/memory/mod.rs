//! In-memory persistence gateway.
//!
//! A unit of work holds the store lock from `begin` until it ends, so units
//! run one at a time. Writes land on the store directly and push undo
//! entries; commit forgets them, while rollback or dropping the unit replays
//! them newest first.

mod seed;
mod store;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, MutexGuard, OwnedMutexGuard};

use crate::domain::ports::{PersistenceError, PersistenceGateway, UnitOfWork};
use crate::domain::{
    Category, CategoryId, Conversation, ConversationId, EmailAddress, ImageId, Listing,
    ListingId, ListingImage, ListingPage, ListingQuery, Message, Review, ReviewId, User, UserId,
    UserSearch, Username,
};

pub use seed::default_categories;
use store::{Change, Store, Undo};

/// Shared in-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryGateway {
    store: Arc<Mutex<Store>>,
}

fn try_lock(store: &Mutex<Store>) -> Result<MutexGuard<'_, Store>, PersistenceError> {
    store
        .try_lock()
        .map_err(|_| PersistenceError::connection("in-memory store is held by a unit of work"))
}

impl MemoryGateway {
    /// Empty store without categories.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with the standard campus categories.
    pub fn with_default_categories() -> Self {
        let mut store = Store::default();
        for category in default_categories() {
            store.categories.insert(category.id, category);
        }
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// Insert or replace rows directly, bypassing units of work. Fails while
    /// a unit is open.
    pub fn seed(&self, change: impl Into<SeedRow>) -> Result<(), PersistenceError> {
        let mut store = try_lock(&self.store)?;
        match change.into() {
            SeedRow::User(user) => store.insert_user(user).map(drop),
            SeedRow::Listing(listing) => {
                store.put_listing(listing);
                Ok(())
            }
            SeedRow::Category(category) => {
                store.categories.insert(category.id, category);
                Ok(())
            }
        }
    }

    /// Committed copy of a listing.
    pub fn listing(&self, id: ListingId) -> Option<Listing> {
        try_lock(&self.store).ok()?.listings.get(&id).cloned()
    }

    /// Committed images of a listing by display order.
    pub fn images(&self, id: ListingId) -> Vec<ListingImage> {
        try_lock(&self.store)
            .map(|store| store.images_for(id))
            .unwrap_or_default()
    }

    /// Committed messages across every conversation, oldest first.
    pub fn all_messages(&self) -> Vec<Message> {
        try_lock(&self.store)
            .map(|store| store.messages.clone())
            .unwrap_or_default()
    }
}

/// Row accepted by [`MemoryGateway::seed`].
#[derive(Debug, Clone)]
pub enum SeedRow {
    User(User),
    Listing(Listing),
    Category(Category),
}

impl From<User> for SeedRow {
    fn from(value: User) -> Self {
        Self::User(value)
    }
}

impl From<Listing> for SeedRow {
    fn from(value: Listing) -> Self {
        Self::Listing(value)
    }
}

impl From<Category> for SeedRow {
    fn from(value: Category) -> Self {
        Self::Category(value)
    }
}

#[async_trait]
impl PersistenceGateway for MemoryGateway {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, PersistenceError> {
        let working = Arc::clone(&self.store).lock_owned().await;
        Ok(Box::new(MemoryUnitOfWork {
            working,
            undo: Vec::new(),
        }))
    }
}

struct MemoryUnitOfWork {
    working: OwnedMutexGuard<Store>,
    undo: Vec<Undo>,
}

impl MemoryUnitOfWork {
    fn record(&mut self, change: Change) -> Result<(), PersistenceError> {
        let undo = self.working.apply(change)?;
        self.undo.extend(undo);
        Ok(())
    }

    fn unwind(&mut self) {
        while let Some(entry) = self.undo.pop() {
            self.working.revert(entry);
        }
    }
}

impl Drop for MemoryUnitOfWork {
    fn drop(&mut self) {
        self.unwind();
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn user(&mut self, id: UserId) -> Result<Option<User>, PersistenceError> {
        Ok(self.working.users.get(&id).cloned())
    }

    async fn user_by_email(
        &mut self,
        email: &EmailAddress,
    ) -> Result<Option<User>, PersistenceError> {
        Ok(self
            .working
            .users
            .values()
            .find(|user| &user.email == email)
            .cloned())
    }

    async fn user_by_username(
        &mut self,
        username: &Username,
    ) -> Result<Option<User>, PersistenceError> {
        Ok(self
            .working
            .users
            .values()
            .find(|user| &user.username == username)
            .cloned())
    }

    async fn insert_user(&mut self, user: &User) -> Result<(), PersistenceError> {
        self.record(Change::InsertUser(user.clone()))
    }

    async fn search_users(
        &mut self,
        query: &UserSearch,
        limit: u32,
    ) -> Result<Vec<User>, PersistenceError> {
        Ok(self.working.search_users(query, limit))
    }

    async fn categories(&mut self) -> Result<Vec<Category>, PersistenceError> {
        let mut categories: Vec<_> = self.working.categories.values().cloned().collect();
        categories.sort_by_key(|category| (category.display_order, category.id));
        Ok(categories)
    }

    async fn category(&mut self, id: CategoryId) -> Result<Option<Category>, PersistenceError> {
        Ok(self.working.categories.get(&id).cloned())
    }

    async fn listing(&mut self, id: ListingId) -> Result<Option<Listing>, PersistenceError> {
        Ok(self.working.listings.get(&id).cloned())
    }

    async fn insert_listing(&mut self, listing: &Listing) -> Result<(), PersistenceError> {
        self.record(Change::InsertListing(listing.clone()))
    }

    async fn update_listing(&mut self, listing: &Listing) -> Result<(), PersistenceError> {
        self.record(Change::UpdateListing(listing.clone()))
    }

    async fn increment_views(&mut self, id: ListingId) -> Result<(), PersistenceError> {
        self.record(Change::IncrementViews(id))
    }

    async fn delete_listing(&mut self, id: ListingId) -> Result<(), PersistenceError> {
        self.record(Change::DeleteListing(id))
    }

    async fn search_listings(
        &mut self,
        query: &ListingQuery,
    ) -> Result<ListingPage, PersistenceError> {
        Ok(self.working.search(query))
    }

    async fn images(&mut self, listing: ListingId) -> Result<Vec<ListingImage>, PersistenceError> {
        Ok(self.working.images_for(listing))
    }

    async fn insert_image(&mut self, image: &ListingImage) -> Result<(), PersistenceError> {
        self.record(Change::InsertImage(image.clone()))
    }

    async fn update_image(&mut self, image: &ListingImage) -> Result<(), PersistenceError> {
        self.record(Change::UpdateImage(image.clone()))
    }

    async fn delete_image(&mut self, id: ImageId) -> Result<(), PersistenceError> {
        self.record(Change::DeleteImage(id))
    }

    async fn insert_review(&mut self, review: &Review) -> Result<(), PersistenceError> {
        self.record(Change::InsertReview(review.clone()))
    }

    async fn review(&mut self, id: ReviewId) -> Result<Option<Review>, PersistenceError> {
        Ok(self
            .working
            .reviews
            .iter()
            .find(|review| review.id == id)
            .cloned())
    }

    async fn review_by(
        &mut self,
        listing: ListingId,
        reviewer: UserId,
    ) -> Result<Option<Review>, PersistenceError> {
        Ok(self
            .working
            .reviews
            .iter()
            .find(|review| review.listing_id == listing && review.reviewer_id == reviewer)
            .cloned())
    }

    async fn reviews_for_listing(
        &mut self,
        listing: ListingId,
    ) -> Result<Vec<Review>, PersistenceError> {
        Ok(self
            .working
            .reviews_newest_first(|review| review.listing_id == listing))
    }

    async fn reviews_about(&mut self, reviewee: UserId) -> Result<Vec<Review>, PersistenceError> {
        Ok(self
            .working
            .reviews_newest_first(|review| review.reviewee_id == reviewee))
    }

    async fn conversation(
        &mut self,
        id: ConversationId,
    ) -> Result<Option<Conversation>, PersistenceError> {
        Ok(self.working.conversations.get(&id).cloned())
    }

    async fn conversation_between(
        &mut self,
        a: UserId,
        b: UserId,
        listing: Option<ListingId>,
    ) -> Result<Option<Conversation>, PersistenceError> {
        Ok(self
            .working
            .conversations
            .values()
            .filter(|conversation| conversation.is_between(a, b, listing))
            .min_by_key(|conversation| conversation.created_at)
            .cloned())
    }

    async fn insert_conversation(
        &mut self,
        conversation: &Conversation,
    ) -> Result<(), PersistenceError> {
        self.record(Change::InsertConversation(conversation.clone()))
    }

    async fn touch_conversation(
        &mut self,
        id: ConversationId,
        at: DateTime<Utc>,
    ) -> Result<(), PersistenceError> {
        self.record(Change::TouchConversation(id, at))
    }

    async fn conversations_for(
        &mut self,
        user: UserId,
    ) -> Result<Vec<Conversation>, PersistenceError> {
        let mut conversations: Vec<_> = self
            .working
            .conversations
            .values()
            .filter(|conversation| conversation.has_participant(user))
            .cloned()
            .collect();
        conversations.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(a.id.cmp(&b.id)));
        Ok(conversations)
    }

    async fn insert_message(&mut self, message: &Message) -> Result<(), PersistenceError> {
        self.record(Change::InsertMessage(message.clone()))
    }

    async fn messages(
        &mut self,
        conversation: ConversationId,
    ) -> Result<Vec<Message>, PersistenceError> {
        Ok(self
            .working
            .messages
            .iter()
            .filter(|message| message.conversation_id == conversation)
            .cloned()
            .collect())
    }

    async fn last_message(
        &mut self,
        conversation: ConversationId,
    ) -> Result<Option<Message>, PersistenceError> {
        Ok(self
            .working
            .messages
            .iter()
            .rev()
            .find(|message| message.conversation_id == conversation)
            .cloned())
    }

    async fn commit(self: Box<Self>) -> Result<(), PersistenceError> {
        let mut unit = self;
        unit.undo.clear();
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), PersistenceError> {
        let mut unit = self;
        unit.unwind();
        Ok(())
    }
}

#[cfg(test)]
mod tests;
