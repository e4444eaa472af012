//! Post-sale review handlers.
//!
//! ```text
//! POST /api/v1/listings/{listing_id}/reviews        buyer reviews seller
//! POST /api/v1/listings/{listing_id}/review-buyer   seller reviews buyer
//! GET  /api/v1/listings/{listing_id}/reviews
//! GET  /api/v1/listings/{listing_id}/has-buyer-reviewed
//! GET  /api/v1/reviews/{review_id}
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::domain::{ReviewDirection, ReviewId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::current_actor;
use crate::inbound::http::dto::ReviewResponse;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id};

use super::listings_dto::ListingPath;

/// Body shared by both review directions.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ReviewRequest {
    #[schema(minimum = 1, maximum = 5, example = 5)]
    pub rating: i64,
    #[schema(example = "Quick and friendly handover")]
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReviewPath {
    review_id: String,
}

/// Whether the buyer of a listing has reviewed its seller.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HasReviewedResponse {
    pub has_reviewed: bool,
}

async fn submit(
    state: &HttpState,
    session: &SessionContext,
    path: &ListingPath,
    direction: ReviewDirection,
    body: ReviewRequest,
) -> ApiResult<HttpResponse> {
    let listing_id = path.parse()?;
    let actor = current_actor(state, session).await?;
    let review = state
        .reviews
        .submit(actor, listing_id, direction, body.rating, body.comment)
        .await?;
    info!(review_id = %review.id, %listing_id, ?direction, "review recorded");
    Ok(HttpResponse::Created().json(ReviewResponse::from(review)))
}

/// The buyer rates the seller of a sold listing.
#[utoipa::path(
    post,
    path = "/api/v1/listings/{listing_id}/reviews",
    params(("listing_id" = String, Path, description = "Listing identifier")),
    request_body = ReviewRequest,
    responses(
        (status = 201, description = "Review recorded", body = ReviewResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the buyer", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Already reviewed", body = ErrorSchema),
        (status = 422, description = "Listing not sold", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["reviews"],
    operation_id = "reviewSeller"
)]
#[post("/listings/{listing_id}/reviews")]
pub async fn review_seller(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ListingPath>,
    payload: web::Json<ReviewRequest>,
) -> ApiResult<HttpResponse> {
    submit(
        &state,
        &session,
        &path,
        ReviewDirection::BuyerReviewsSeller,
        payload.into_inner(),
    )
    .await
}

/// The seller rates the buyer of a sold listing.
#[utoipa::path(
    post,
    path = "/api/v1/listings/{listing_id}/review-buyer",
    params(("listing_id" = String, Path, description = "Listing identifier")),
    request_body = ReviewRequest,
    responses(
        (status = 201, description = "Review recorded", body = ReviewResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the seller", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Already reviewed", body = ErrorSchema),
        (status = 422, description = "Listing not sold", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["reviews"],
    operation_id = "reviewBuyer"
)]
#[post("/listings/{listing_id}/review-buyer")]
pub async fn review_buyer(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ListingPath>,
    payload: web::Json<ReviewRequest>,
) -> ApiResult<HttpResponse> {
    submit(
        &state,
        &session,
        &path,
        ReviewDirection::SellerReviewsBuyer,
        payload.into_inner(),
    )
    .await
}

/// Reviews left on a listing, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/listings/{listing_id}/reviews",
    params(("listing_id" = String, Path, description = "Listing identifier")),
    responses(
        (status = 200, description = "Reviews", body = [ReviewResponse]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["reviews"],
    operation_id = "listingReviews",
    security([])
)]
#[get("/listings/{listing_id}/reviews")]
pub async fn listing_reviews(
    state: web::Data<HttpState>,
    path: web::Path<ListingPath>,
) -> ApiResult<web::Json<Vec<ReviewResponse>>> {
    let listing_id = path.parse()?;
    let reviews = state.reviews_query.for_listing(listing_id).await?;
    Ok(web::Json(reviews.into_iter().map(Into::into).collect()))
}

/// Lets the seller check whether the buyer has reviewed them.
#[utoipa::path(
    get,
    path = "/api/v1/listings/{listing_id}/has-buyer-reviewed",
    params(("listing_id" = String, Path, description = "Listing identifier")),
    responses(
        (status = 200, description = "Review status", body = HasReviewedResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the seller", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["reviews"],
    operation_id = "hasBuyerReviewed"
)]
#[get("/listings/{listing_id}/has-buyer-reviewed")]
pub async fn has_buyer_reviewed(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ListingPath>,
) -> ApiResult<web::Json<HasReviewedResponse>> {
    let listing_id = path.parse()?;
    let actor = current_actor(&state, &session).await?;
    let has_reviewed = state.reviews.has_buyer_reviewed(actor, listing_id).await?;
    Ok(web::Json(HasReviewedResponse { has_reviewed }))
}

/// A single review.
#[utoipa::path(
    get,
    path = "/api/v1/reviews/{review_id}",
    params(("review_id" = String, Path, description = "Review identifier")),
    responses(
        (status = 200, description = "Review", body = ReviewResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["reviews"],
    operation_id = "getReview",
    security([])
)]
#[get("/reviews/{review_id}")]
pub async fn get_review(
    state: web::Data<HttpState>,
    path: web::Path<ReviewPath>,
) -> ApiResult<web::Json<ReviewResponse>> {
    let review_id: ReviewId = parse_id(&path.review_id, FieldName::new("reviewId"))?;
    let review = state.reviews_query.review(review_id).await?;
    Ok(web::Json(ReviewResponse::from(review)))
}
