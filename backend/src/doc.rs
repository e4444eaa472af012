//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] collects every `/api/v1` handler plus the health checks.
//! Response bodies are transport DTOs from [`crate::inbound::http::dto`], so
//! domain types stay free of utoipa derives. The document backs Swagger UI in
//! debug builds and `cargo run --bin openapi-dump`.

use crate::inbound::http::admin::ModerationNotes;
use crate::inbound::http::dto::{
    CategoryResponse, ConversationResponse, ConversationSummaryResponse,
    InitiatedConversationResponse, ListingDetailsResponse, ListingImageResponse,
    ListingPageResponse, ListingResponse, MessageResponse, ReviewResponse, UserResponse,
    UserSummaryResponse,
};
use crate::inbound::http::listings::{
    AddImagesRequest, CreateListingRequest, ImageRequest, UpdateListingRequest,
};
use crate::inbound::http::messages::{SendMessageRequest, StartConversationRequest};
use crate::inbound::http::reviews::{HasReviewedResponse, ReviewRequest};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::users::{LoginRequest, RegisterRequest};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Adds the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Encrypted session cookie issued by POST /api/v1/auth/login.",
            ))),
        );
    }
}

/// OpenAPI document for the marketplace API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Campus marketplace API",
        description = "Listings, moderation, reviews and messaging for a campus marketplace."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::current_user_profile,
        crate::inbound::http::users::search_users,
        crate::inbound::http::users::user_reviews,
        crate::inbound::http::categories::list_categories,
        crate::inbound::http::categories::get_category,
        crate::inbound::http::listings::search_listings,
        crate::inbound::http::listings::create_listing,
        crate::inbound::http::listings::my_listings,
        crate::inbound::http::listings::get_listing,
        crate::inbound::http::listings::update_listing,
        crate::inbound::http::listings::delete_listing,
        crate::inbound::http::listings::add_images,
        crate::inbound::http::listings::remove_image,
        crate::inbound::http::reviews::review_seller,
        crate::inbound::http::reviews::review_buyer,
        crate::inbound::http::reviews::listing_reviews,
        crate::inbound::http::reviews::has_buyer_reviewed,
        crate::inbound::http::reviews::get_review,
        crate::inbound::http::admin::pending_listings,
        crate::inbound::http::admin::all_listings,
        crate::inbound::http::admin::approve_listing,
        crate::inbound::http::admin::reject_listing,
        crate::inbound::http::admin::request_changes,
        crate::inbound::http::messages::start_conversation,
        crate::inbound::http::messages::list_conversations,
        crate::inbound::http::messages::get_conversation,
        crate::inbound::http::messages::list_messages,
        crate::inbound::http::messages::send_message,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        RegisterRequest,
        LoginRequest,
        UserResponse,
        UserSummaryResponse,
        CategoryResponse,
        CreateListingRequest,
        UpdateListingRequest,
        AddImagesRequest,
        ImageRequest,
        ListingResponse,
        ListingImageResponse,
        ListingDetailsResponse,
        ListingPageResponse,
        ModerationNotes,
        ReviewRequest,
        ReviewResponse,
        HasReviewedResponse,
        StartConversationRequest,
        SendMessageRequest,
        ConversationResponse,
        ConversationSummaryResponse,
        InitiatedConversationResponse,
        MessageResponse,
    )),
    tags(
        (name = "auth", description = "Registration and sessions"),
        (name = "users", description = "User profiles and received reviews"),
        (name = "categories", description = "Category reference data"),
        (name = "listings", description = "Listing lifecycle"),
        (name = "reviews", description = "Post-sale reviews"),
        (name = "admin", description = "Moderation"),
        (name = "messages", description = "Direct messaging"),
        (name = "health", description = "Orchestration health checks")
    )
)]
pub struct ApiDoc;
