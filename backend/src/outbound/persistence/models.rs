//! Internal Diesel row structs and their domain conversions.
//!
//! Rows never leave the persistence layer. Loading a row re-validates it
//! through the domain constructors; a row the domain rejects surfaces as a
//! query error rather than a half-built aggregate.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::ports::PersistenceError;
use crate::domain::{
    Amount, Category, CategoryId, Conversation, ConversationId, EmailAddress, ImageId, ImagePath,
    ItemCondition, Listing, ListingId, ListingImage, ListingStatus, Message, MessageContent,
    MessageId, RateType, Rating, Review, ReviewId, User, UserId, Username,
};

use super::error_mapping::corrupt_row;
use super::schema::{categories, conversations, listing_images, listings, messages, reviews, users};

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_active: bool,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        Self {
            id: *user.id.as_uuid(),
            username: user.username.as_str().to_owned(),
            email: user.email.as_str().to_owned(),
            password_hash: user.password_hash.clone(),
            is_active: user.is_active,
            is_admin: user.is_admin,
            created_at: user.created_at,
        }
    }
}

impl TryFrom<UserRow> for User {
    type Error = PersistenceError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: UserId::from_uuid(row.id),
            username: Username::new(&row.username).map_err(|err| corrupt_row("users", err))?,
            email: EmailAddress::new(&row.email).map_err(|err| corrupt_row("users", err))?,
            password_hash: row.password_hash,
            is_active: row.is_active,
            is_admin: row.is_admin,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CategoryRow {
    pub id: i32,
    pub name: String,
    pub parent_id: Option<i32>,
    pub display_order: i32,
    pub is_active: bool,
    pub is_skill_category: bool,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: CategoryId::new(row.id),
            name: row.name,
            parent_id: row.parent_id.map(CategoryId::new),
            display_order: row.display_order,
            is_active: row.is_active,
            is_skill_category: row.is_skill_category,
        }
    }
}

/// Full listing row; also the update changeset, so `None` writes NULL.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = listings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ListingRow {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub title: String,
    pub description: String,
    pub price: Option<f64>,
    pub category_id: i32,
    pub item_condition: String,
    pub is_skill_sharing: bool,
    pub rate: Option<f64>,
    pub rate_type: Option<String>,
    pub availability: Option<String>,
    pub search_keywords: Option<String>,
    pub status: String,
    pub admin_notes: Option<String>,
    pub buyer_id: Option<Uuid>,
    pub sold_at: Option<DateTime<Utc>>,
    pub views_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Listing> for ListingRow {
    fn from(listing: &Listing) -> Self {
        Self {
            id: *listing.id.as_uuid(),
            seller_id: *listing.seller_id.as_uuid(),
            title: listing.title.clone(),
            description: listing.description.clone(),
            price: listing.price.map(Amount::get),
            category_id: listing.category_id.get(),
            item_condition: listing.item_condition.as_str().to_owned(),
            is_skill_sharing: listing.is_skill_sharing,
            rate: listing.rate.map(Amount::get),
            rate_type: listing.rate_type.map(|kind| kind.as_str().to_owned()),
            availability: listing.availability.clone(),
            search_keywords: listing.search_keywords.clone(),
            status: listing.status.as_str().to_owned(),
            admin_notes: listing.admin_notes.clone(),
            buyer_id: listing.buyer_id.map(|id| *id.as_uuid()),
            sold_at: listing.sold_at,
            views_count: listing.views_count,
            created_at: listing.created_at,
            updated_at: listing.updated_at,
        }
    }
}

impl TryFrom<ListingRow> for Listing {
    type Error = PersistenceError;

    fn try_from(row: ListingRow) -> Result<Self, Self::Error> {
        let corrupt = |err| corrupt_row("listings", err);
        Ok(Self {
            id: ListingId::from_uuid(row.id),
            seller_id: UserId::from_uuid(row.seller_id),
            title: row.title,
            description: row.description,
            price: row
                .price
                .map(|value| Amount::new("price", value))
                .transpose()
                .map_err(corrupt)?,
            category_id: CategoryId::new(row.category_id),
            item_condition: row.item_condition.parse::<ItemCondition>().map_err(corrupt)?,
            is_skill_sharing: row.is_skill_sharing,
            rate: row
                .rate
                .map(|value| Amount::new("rate", value))
                .transpose()
                .map_err(corrupt)?,
            rate_type: row
                .rate_type
                .as_deref()
                .map(str::parse::<RateType>)
                .transpose()
                .map_err(corrupt)?,
            availability: row.availability,
            search_keywords: row.search_keywords,
            status: row.status.parse::<ListingStatus>().map_err(corrupt)?,
            admin_notes: row.admin_notes,
            buyer_id: row.buyer_id.map(UserId::from_uuid),
            sold_at: row.sold_at,
            views_count: row.views_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = listing_images)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ListingImageRow {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub image_path: String,
    pub thumbnail_path: Option<String>,
    pub display_order: i32,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&ListingImage> for ListingImageRow {
    fn from(image: &ListingImage) -> Self {
        Self {
            id: *image.id.as_uuid(),
            listing_id: *image.listing_id.as_uuid(),
            image_path: image.image_path.as_str().to_owned(),
            thumbnail_path: image
                .thumbnail_path
                .as_ref()
                .map(|path| path.as_str().to_owned()),
            display_order: image.display_order,
            is_primary: image.is_primary,
            created_at: image.created_at,
        }
    }
}

impl TryFrom<ListingImageRow> for ListingImage {
    type Error = PersistenceError;

    fn try_from(row: ListingImageRow) -> Result<Self, Self::Error> {
        let corrupt = |err| corrupt_row("listing_images", err);
        Ok(Self {
            id: ImageId::from_uuid(row.id),
            listing_id: ListingId::from_uuid(row.listing_id),
            image_path: ImagePath::new(row.image_path).map_err(corrupt)?,
            thumbnail_path: row.thumbnail_path.map(ImagePath::new).transpose().map_err(corrupt)?,
            display_order: row.display_order,
            is_primary: row.is_primary,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = reviews)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ReviewRow {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub reviewer_id: Uuid,
    pub reviewee_id: Uuid,
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Review> for ReviewRow {
    fn from(review: &Review) -> Self {
        Self {
            id: *review.id.as_uuid(),
            listing_id: *review.listing_id.as_uuid(),
            reviewer_id: *review.reviewer_id.as_uuid(),
            reviewee_id: *review.reviewee_id.as_uuid(),
            rating: i16::from(review.rating.get()),
            comment: review.comment.clone(),
            created_at: review.created_at,
        }
    }
}

impl TryFrom<ReviewRow> for Review {
    type Error = PersistenceError;

    fn try_from(row: ReviewRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ReviewId::from_uuid(row.id),
            listing_id: ListingId::from_uuid(row.listing_id),
            reviewer_id: UserId::from_uuid(row.reviewer_id),
            reviewee_id: UserId::from_uuid(row.reviewee_id),
            rating: Rating::new(i64::from(row.rating)).map_err(|err| corrupt_row("reviews", err))?,
            comment: row.comment,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = conversations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ConversationRow {
    pub id: Uuid,
    pub user1_id: Uuid,
    pub user2_id: Uuid,
    pub listing_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Conversation> for ConversationRow {
    fn from(conversation: &Conversation) -> Self {
        Self {
            id: *conversation.id.as_uuid(),
            user1_id: *conversation.user1_id.as_uuid(),
            user2_id: *conversation.user2_id.as_uuid(),
            listing_id: conversation.listing_id.map(|id| *id.as_uuid()),
            created_at: conversation.created_at,
            updated_at: conversation.updated_at,
        }
    }
}

impl From<ConversationRow> for Conversation {
    fn from(row: ConversationRow) -> Self {
        Self {
            id: ConversationId::from_uuid(row.id),
            user1_id: UserId::from_uuid(row.user1_id),
            user2_id: UserId::from_uuid(row.user2_id),
            listing_id: row.listing_id.map(ListingId::from_uuid),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MessageRow {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Message> for MessageRow {
    fn from(message: &Message) -> Self {
        Self {
            id: *message.id.as_uuid(),
            conversation_id: *message.conversation_id.as_uuid(),
            sender_id: *message.sender_id.as_uuid(),
            content: message.content.as_str().to_owned(),
            created_at: message.created_at,
        }
    }
}

impl TryFrom<MessageRow> for Message {
    type Error = PersistenceError;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: MessageId::from_uuid(row.id),
            conversation_id: ConversationId::from_uuid(row.conversation_id),
            sender_id: UserId::from_uuid(row.sender_id),
            content: MessageContent::new(row.content).map_err(|err| corrupt_row("messages", err))?,
            created_at: row.created_at,
        })
    }
}
