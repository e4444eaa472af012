//! Table state and undo log for the in-memory gateway.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use chrono::{DateTime, Utc};

use crate::domain::ports::PersistenceError;
use crate::domain::{
    Category, CategoryId, Conversation, ConversationId, ImageId, Listing, ListingId,
    ListingImage, ListingPage, ListingQuery, Message, Review, User, UserId, UserSearch,
};

/// A single write.
#[derive(Debug, Clone)]
pub(super) enum Change {
    InsertUser(User),
    InsertListing(Listing),
    UpdateListing(Listing),
    IncrementViews(ListingId),
    DeleteListing(ListingId),
    InsertImage(ListingImage),
    UpdateImage(ListingImage),
    DeleteImage(ImageId),
    InsertReview(Review),
    InsertConversation(Conversation),
    TouchConversation(ConversationId, DateTime<Utc>),
    InsertMessage(Message),
}

/// Restores what one applied [`Change`] replaced.
#[derive(Debug)]
pub(super) enum Undo {
    User(UserId, Option<User>),
    Listing(ListingId, Option<Listing>),
    Image(ImageId, Option<ListingImage>),
    Conversation(ConversationId, Option<Conversation>),
    TruncateReviews(usize),
    RestoreReviews(Vec<Review>),
    TruncateMessages(usize),
}

fn restore<K: Eq + Hash, V>(table: &mut HashMap<K, V>, key: K, row: Option<V>) {
    match row {
        Some(row) => {
            table.insert(key, row);
        }
        None => {
            table.remove(&key);
        }
    }
}

fn listing_vanished(id: ListingId) -> PersistenceError {
    PersistenceError::query(format!("listing {id} vanished during update"))
}

#[derive(Debug, Default)]
pub(super) struct Store {
    pub(super) users: HashMap<UserId, User>,
    pub(super) categories: BTreeMap<CategoryId, Category>,
    pub(super) listings: HashMap<ListingId, Listing>,
    pub(super) images: HashMap<ImageId, ListingImage>,
    pub(super) reviews: Vec<Review>,
    pub(super) conversations: HashMap<ConversationId, Conversation>,
    pub(super) messages: Vec<Message>,
}

impl Store {
    /// Apply `change` and return how to reverse it. A failed change leaves
    /// the store untouched.
    pub(super) fn apply(&mut self, change: Change) -> Result<Vec<Undo>, PersistenceError> {
        match change {
            Change::InsertUser(user) => self.insert_user(user),
            Change::InsertListing(listing) => {
                if self.listings.contains_key(&listing.id) {
                    return Err(PersistenceError::conflict(format!(
                        "listing {} already exists",
                        listing.id
                    )));
                }
                Ok(vec![self.put_listing(listing)])
            }
            Change::UpdateListing(listing) => {
                if !self.listings.contains_key(&listing.id) {
                    return Err(listing_vanished(listing.id));
                }
                Ok(vec![self.put_listing(listing)])
            }
            Change::IncrementViews(id) => {
                let listing = self.listings.get_mut(&id).ok_or_else(|| listing_vanished(id))?;
                let before = listing.clone();
                listing.record_view();
                Ok(vec![Undo::Listing(id, Some(before))])
            }
            Change::DeleteListing(id) => Ok(self.delete_listing(id)),
            Change::InsertImage(image) => {
                if !self.listings.contains_key(&image.listing_id) {
                    return Err(PersistenceError::query(format!(
                        "listing {} does not exist",
                        image.listing_id
                    )));
                }
                Ok(vec![Undo::Image(image.id, self.images.insert(image.id, image))])
            }
            Change::UpdateImage(image) => {
                if !self.images.contains_key(&image.id) {
                    return Err(PersistenceError::query(format!(
                        "image {} vanished during update",
                        image.id
                    )));
                }
                Ok(vec![Undo::Image(image.id, self.images.insert(image.id, image))])
            }
            Change::DeleteImage(id) => Ok(vec![Undo::Image(id, self.images.remove(&id))]),
            Change::InsertReview(review) => self.insert_review(review),
            Change::InsertConversation(conversation) => Ok(vec![Undo::Conversation(
                conversation.id,
                self.conversations.insert(conversation.id, conversation),
            )]),
            Change::TouchConversation(id, at) => {
                let conversation = self.conversations.get_mut(&id).ok_or_else(|| {
                    PersistenceError::query(format!("conversation {id} does not exist"))
                })?;
                let before = conversation.clone();
                conversation.updated_at = at;
                Ok(vec![Undo::Conversation(id, Some(before))])
            }
            Change::InsertMessage(message) => {
                if !self.conversations.contains_key(&message.conversation_id) {
                    return Err(PersistenceError::query(format!(
                        "conversation {} does not exist",
                        message.conversation_id
                    )));
                }
                let before = self.messages.len();
                self.messages.push(message);
                Ok(vec![Undo::TruncateMessages(before)])
            }
        }
    }

    pub(super) fn revert(&mut self, undo: Undo) {
        match undo {
            Undo::User(id, row) => restore(&mut self.users, id, row),
            Undo::Listing(id, row) => restore(&mut self.listings, id, row),
            Undo::Image(id, row) => restore(&mut self.images, id, row),
            Undo::Conversation(id, row) => restore(&mut self.conversations, id, row),
            Undo::TruncateReviews(len) => self.reviews.truncate(len),
            Undo::RestoreReviews(rows) => self.reviews.extend(rows),
            Undo::TruncateMessages(len) => self.messages.truncate(len),
        }
    }

    /// Insert or replace a listing without checks.
    pub(super) fn put_listing(&mut self, listing: Listing) -> Undo {
        Undo::Listing(listing.id, self.listings.insert(listing.id, listing))
    }

    pub(super) fn insert_user(&mut self, user: User) -> Result<Vec<Undo>, PersistenceError> {
        let clash = self.users.values().any(|other| {
            other.id != user.id && (other.username == user.username || other.email == user.email)
        });
        if clash {
            return Err(PersistenceError::conflict("username or email already exists"));
        }
        Ok(vec![Undo::User(user.id, self.users.insert(user.id, user))])
    }

    fn insert_review(&mut self, review: Review) -> Result<Vec<Undo>, PersistenceError> {
        let duplicate = self.reviews.iter().any(|other| {
            other.listing_id == review.listing_id && other.reviewer_id == review.reviewer_id
        });
        if duplicate {
            return Err(PersistenceError::conflict(
                "a review for this listing and reviewer already exists",
            ));
        }
        let before = self.reviews.len();
        self.reviews.push(review);
        Ok(vec![Undo::TruncateReviews(before)])
    }

    /// Remove a listing with its images and reviews; conversations about it
    /// lose their listing reference.
    fn delete_listing(&mut self, id: ListingId) -> Vec<Undo> {
        let mut undo = vec![Undo::Listing(id, self.listings.remove(&id))];

        let images: Vec<ImageId> = self
            .images
            .values()
            .filter(|image| image.listing_id == id)
            .map(|image| image.id)
            .collect();
        for image in images {
            undo.push(Undo::Image(image, self.images.remove(&image)));
        }

        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.reviews)
            .into_iter()
            .partition(|review| review.listing_id == id);
        self.reviews = kept;
        if !removed.is_empty() {
            undo.push(Undo::RestoreReviews(removed));
        }

        for conversation in self.conversations.values_mut() {
            if conversation.listing_id == Some(id) {
                undo.push(Undo::Conversation(conversation.id, Some(conversation.clone())));
                conversation.listing_id = None;
            }
        }
        undo
    }

    pub(super) fn images_for(&self, listing: ListingId) -> Vec<ListingImage> {
        let mut images: Vec<_> = self
            .images
            .values()
            .filter(|image| image.listing_id == listing)
            .cloned()
            .collect();
        images.sort_by_key(|image| (image.display_order, image.created_at));
        images
    }

    pub(super) fn reviews_newest_first(&self, keep: impl Fn(&Review) -> bool) -> Vec<Review> {
        let mut reviews: Vec<_> = self.reviews.iter().filter(|r| keep(r)).cloned().collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        reviews
    }

    pub(super) fn search_users(&self, query: &UserSearch, limit: u32) -> Vec<User> {
        let mut hits: Vec<&User> = self
            .users
            .values()
            .filter(|user| user.is_active && query.matches(user))
            .collect();
        hits.sort_by(|a, b| a.username.as_str().cmp(b.username.as_str()));
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        hits.into_iter().take(limit).cloned().collect()
    }

    pub(super) fn search(&self, query: &ListingQuery) -> ListingPage {
        let mut hits: Vec<&Listing> = self
            .listings
            .values()
            .filter(|listing| query.matches(listing))
            .collect();
        hits.sort_by(|a, b| {
            query
                .rank(a)
                .cmp(&query.rank(b))
                .then(b.created_at.cmp(&a.created_at))
                .then(a.id.cmp(&b.id))
        });
        let total = hits.len() as u64;
        let offset = usize::try_from(query.window.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.window.limit).unwrap_or(usize::MAX);
        ListingPage {
            total,
            results: hits.into_iter().skip(offset).take(limit).cloned().collect(),
        }
    }
}
