//! Response payloads shared by the HTTP handlers.
//!
//! Identifiers are rendered as strings and timestamps as RFC 3339 so the
//! wire format does not depend on the domain's serde derives.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::ports::{InitiatedConversation, ListingDetails};
use crate::domain::{
    Category, Conversation, ConversationSummary, Listing, ListingImage, ListingPage, Message,
    Review, User,
};

/// A registered user. Password material is never included.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    #[schema(example = "gator_dan")]
    pub username: String,
    #[schema(example = "dan@sfsu.edu")]
    pub email: String,
    pub is_active: bool,
    pub is_admin: bool,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.as_str().to_owned(),
            email: user.email.as_str().to_owned(),
            is_active: user.is_active,
            is_admin: user.is_admin,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Search hit: enough to address a user without exposing their email.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserSummaryResponse {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    #[schema(example = "gator_dan")]
    pub username: String,
}

impl From<User> for UserSummaryResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.as_str().to_owned(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Textbooks")]
    pub name: String,
    pub parent_id: Option<i32>,
    pub display_order: i32,
    pub is_active: bool,
    pub is_skill_category: bool,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id.get(),
            name: category.name,
            parent_id: category.parent_id.map(|id| id.get()),
            display_order: category.display_order,
            is_active: category.is_active,
            is_skill_category: category.is_skill_category,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListingResponse {
    pub id: String,
    pub seller_id: String,
    #[schema(example = "Calculus textbook")]
    pub title: String,
    pub description: String,
    #[schema(example = 25.0)]
    pub price: Option<f64>,
    pub category_id: i32,
    #[schema(example = "good")]
    pub item_condition: String,
    pub is_skill_sharing: bool,
    pub rate: Option<f64>,
    #[schema(example = "hourly")]
    pub rate_type: Option<String>,
    pub availability: Option<String>,
    pub search_keywords: Option<String>,
    #[schema(example = "pending_approval")]
    pub status: String,
    pub admin_notes: Option<String>,
    pub buyer_id: Option<String>,
    pub sold_at: Option<String>,
    pub views_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Listing> for ListingResponse {
    fn from(listing: Listing) -> Self {
        Self {
            id: listing.id.to_string(),
            seller_id: listing.seller_id.to_string(),
            title: listing.title,
            description: listing.description,
            price: listing.price.map(|amount| amount.get()),
            category_id: listing.category_id.get(),
            item_condition: listing.item_condition.as_str().to_owned(),
            is_skill_sharing: listing.is_skill_sharing,
            rate: listing.rate.map(|amount| amount.get()),
            rate_type: listing.rate_type.map(|rate_type| rate_type.as_str().to_owned()),
            availability: listing.availability,
            search_keywords: listing.search_keywords,
            status: listing.status.as_str().to_owned(),
            admin_notes: listing.admin_notes,
            buyer_id: listing.buyer_id.map(|id| id.to_string()),
            sold_at: listing.sold_at.map(|at| at.to_rfc3339()),
            views_count: listing.views_count,
            created_at: listing.created_at.to_rfc3339(),
            updated_at: listing.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListingImageResponse {
    pub id: String,
    pub listing_id: String,
    #[schema(example = "listings/5f0c/front.jpg")]
    pub image_path: String,
    pub thumbnail_path: Option<String>,
    pub display_order: i32,
    pub is_primary: bool,
    pub created_at: String,
}

impl From<ListingImage> for ListingImageResponse {
    fn from(image: ListingImage) -> Self {
        Self {
            id: image.id.to_string(),
            listing_id: image.listing_id.to_string(),
            image_path: image.image_path.as_str().to_owned(),
            thumbnail_path: image.thumbnail_path.map(|path| path.as_str().to_owned()),
            display_order: image.display_order,
            is_primary: image.is_primary,
            created_at: image.created_at.to_rfc3339(),
        }
    }
}

/// A listing with its images, as returned by the detail view.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListingDetailsResponse {
    #[serde(flatten)]
    pub listing: ListingResponse,
    pub images: Vec<ListingImageResponse>,
}

impl From<ListingDetails> for ListingDetailsResponse {
    fn from(details: ListingDetails) -> Self {
        Self {
            listing: details.listing.into(),
            images: details.images.into_iter().map(Into::into).collect(),
        }
    }
}

/// One page of listings with the unpaged match count.
#[derive(Debug, Serialize, ToSchema)]
pub struct ListingPageResponse {
    pub total: u64,
    pub results: Vec<ListingResponse>,
}

impl From<ListingPage> for ListingPageResponse {
    fn from(page: ListingPage) -> Self {
        Self {
            total: page.total,
            results: page.results.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub id: String,
    pub listing_id: String,
    pub reviewer_id: String,
    pub reviewee_id: String,
    #[schema(minimum = 1, maximum = 5, example = 5)]
    pub rating: u8,
    pub comment: Option<String>,
    pub created_at: String,
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        Self {
            id: review.id.to_string(),
            listing_id: review.listing_id.to_string(),
            reviewer_id: review.reviewer_id.to_string(),
            reviewee_id: review.reviewee_id.to_string(),
            rating: review.rating.get(),
            comment: review.comment,
            created_at: review.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversationResponse {
    pub id: String,
    pub user1_id: String,
    pub user2_id: String,
    pub listing_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Conversation> for ConversationResponse {
    fn from(conversation: Conversation) -> Self {
        Self {
            id: conversation.id.to_string(),
            user1_id: conversation.user1_id.to_string(),
            user2_id: conversation.user2_id.to_string(),
            listing_id: conversation.listing_id.map(|id| id.to_string()),
            created_at: conversation.created_at.to_rfc3339(),
            updated_at: conversation.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    #[schema(example = "Is this still available?")]
    pub content: String,
    pub created_at: String,
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            id: message.id.to_string(),
            conversation_id: message.conversation_id.to_string(),
            sender_id: message.sender_id.to_string(),
            content: message.content.as_str().to_owned(),
            created_at: message.created_at.to_rfc3339(),
        }
    }
}

/// Inbox row: a conversation and its latest message.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummaryResponse {
    #[serde(flatten)]
    pub conversation: ConversationResponse,
    pub last_message: Option<MessageResponse>,
}

impl From<ConversationSummary> for ConversationSummaryResponse {
    fn from(summary: ConversationSummary) -> Self {
        Self {
            conversation: summary.conversation.into(),
            last_message: summary.last_message.map(Into::into),
        }
    }
}

/// Result of contacting a user: the conversation and the first message.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InitiatedConversationResponse {
    pub conversation: ConversationResponse,
    pub message: MessageResponse,
}

impl From<InitiatedConversation> for InitiatedConversationResponse {
    fn from(initiated: InitiatedConversation) -> Self {
        Self {
            conversation: initiated.conversation.into(),
            message: initiated.message.into(),
        }
    }
}
