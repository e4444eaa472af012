//! Domain primitives, aggregates and services.
//!
//! Purpose: define the marketplace's entities and the three engines that
//! keep them consistent: the listing lifecycle, moderation, and review
//! eligibility. Types here know nothing about HTTP or SQL; adapters reach
//! them through [`ports`].
//!
//! Public surface:
//! - `Error` / `ErrorCode`: transport-agnostic failure payload.
//! - `Listing`, `ListingPatch`, `ModerationDecision`: lifecycle vocabulary.
//! - `Review`, `Rating`: post-sale feedback.
//! - `Conversation`, `Message`: direct messaging.
//! - `User`, `Actor`: identity.
//! - `*Service`: driving port implementations.

pub mod auth;
pub mod category;
pub mod conversation;
pub mod error;
pub mod ids;
pub mod listing;
pub mod listing_image;
pub mod listing_patch;
pub mod listing_search;
pub mod ports;
pub mod review;
pub mod trace_id;
pub mod user;

mod account_service;
mod category_service;
mod listing_service;
mod messaging_service;
mod moderation_service;
mod review_service;

pub use self::account_service::AccountService;
pub use self::auth::{CredentialsValidationError, LoginCredentials, PASSWORD_MIN, Registration};
pub use self::category::{Category, CategoryFilter, CategoryId};
pub use self::category_service::CategoryService;
pub use self::conversation::{
    Conversation, ConversationSummary, MESSAGE_MAX, Message, MessageContent, MessageContentError,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::ids::{
    ConversationId, IdValidationError, ImageId, ListingId, MessageId, ReviewId, UserId,
};
pub use self::listing::{
    ADMIN_NOTES_MAX, Amount, ItemCondition, Listing, ListingDraft, ListingError, ListingStatus, ModerationDecision,
    RateType,
};
pub use self::listing_image::{ImagePath, ImagePathError, ListingImage, NewImage};
pub use self::listing_patch::{FieldUpdate, ListingPatch};
pub use self::listing_search::{
    ListingPage, ListingQuery, PAGE_SIZE_DEFAULT, PAGE_SIZE_MAX, SearchText,
    SearchValidationError, Window,
};
pub use self::listing_service::ListingService;
pub use self::messaging_service::MessagingService;
pub use self::moderation_service::ModerationService;
pub use self::review::{Rating, RatingOutOfRange, Review, ReviewDirection};
pub use self::review_service::ReviewService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    Actor, EmailAddress, USER_SEARCH_MAX, User, UserSearch, UserValidationError, Username,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use marketplace::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;

impl From<ListingError> for Error {
    fn from(value: ListingError) -> Self {
        match value {
            ListingError::NotOwner => Error::forbidden(value.to_string()),
            ListingError::SellerCannotBuy => Error::invalid_transition(value.to_string()),
            _ => Error::invalid_request(value.to_string()),
        }
    }
}
