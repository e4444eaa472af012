//! Administrator moderation handlers.
//!
//! ```text
//! GET /api/v1/admin/listings/pending?skip=0&limit=20
//! GET /api/v1/admin/listings?status=rejected
//! PUT /api/v1/admin/listings/{listing_id}/approve
//! PUT /api/v1/admin/listings/{listing_id}/reject         {"notes":"..."}
//! PUT /api/v1/admin/listings/{listing_id}/needs-changes  {"notes":"..."}
//! ```
//!
//! Every route requires an administrator session.

use actix_web::{get, put, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::domain::{ListingQuery, ModerationDecision, PAGE_SIZE_DEFAULT};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::current_admin;
use crate::inbound::http::dto::{ListingPageResponse, ListingResponse};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

use super::listings_dto::{ListingPath, ListingSearchParams};

/// Offset paging for the moderation queue.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PendingParams {
    /// Entries to skip.
    pub skip: Option<u64>,
    /// Between 1 and 100; defaults to 20.
    pub limit: Option<u32>,
}

/// Feedback for the seller when rejecting or requesting changes.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ModerationNotes {
    #[schema(example = "Please add a photo of the spine")]
    pub notes: String,
}

async fn moderate(
    state: &HttpState,
    session: &SessionContext,
    path: &ListingPath,
    decision: ModerationDecision,
) -> ApiResult<web::Json<ListingResponse>> {
    let listing_id = path.parse()?;
    let admin = current_admin(state, session).await?;
    let listing = state.moderation.moderate(admin, listing_id, decision).await?;
    info!(%listing_id, admin_id = %admin.id, status = %listing.status, "listing moderated");
    Ok(web::Json(listing.into()))
}

/// Listings awaiting approval, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/admin/listings/pending",
    params(PendingParams),
    responses(
        (status = 200, description = "Moderation queue", body = [ListingResponse]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not an administrator", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "pendingListings"
)]
#[get("/admin/listings/pending")]
pub async fn pending_listings(
    state: web::Data<HttpState>,
    session: SessionContext,
    params: web::Query<PendingParams>,
) -> ApiResult<web::Json<Vec<ListingResponse>>> {
    let admin = current_admin(&state, &session).await?;
    let PendingParams { skip, limit } = params.into_inner();
    let listings = state
        .moderation
        .pending(
            admin,
            skip.unwrap_or_default(),
            limit.unwrap_or(PAGE_SIZE_DEFAULT),
        )
        .await?;
    Ok(web::Json(listings.into_iter().map(Into::into).collect()))
}

/// Listings in any status; `status` narrows the result.
#[utoipa::path(
    get,
    path = "/api/v1/admin/listings",
    params(ListingSearchParams),
    responses(
        (status = 200, description = "One page of listings", body = ListingPageResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not an administrator", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "allListings"
)]
#[get("/admin/listings")]
pub async fn all_listings(
    state: web::Data<HttpState>,
    session: SessionContext,
    params: web::Query<ListingSearchParams>,
) -> ApiResult<web::Json<ListingPageResponse>> {
    let admin = current_admin(&state, &session).await?;
    let query = ListingQuery::try_from(params.into_inner())?;
    let page = state.moderation.all(admin, query).await?;
    Ok(web::Json(page.into()))
}

/// Publish a listing.
#[utoipa::path(
    put,
    path = "/api/v1/admin/listings/{listing_id}/approve",
    params(("listing_id" = String, Path, description = "Listing identifier")),
    responses(
        (status = 200, description = "Approved listing", body = ListingResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not an administrator", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "approveListing"
)]
#[put("/admin/listings/{listing_id}/approve")]
pub async fn approve_listing(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ListingPath>,
) -> ApiResult<web::Json<ListingResponse>> {
    moderate(&state, &session, &path, ModerationDecision::Approve).await
}

/// Reject a listing with notes for the seller.
#[utoipa::path(
    put,
    path = "/api/v1/admin/listings/{listing_id}/reject",
    params(("listing_id" = String, Path, description = "Listing identifier")),
    request_body = ModerationNotes,
    responses(
        (status = 200, description = "Rejected listing", body = ListingResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not an administrator", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "rejectListing"
)]
#[put("/admin/listings/{listing_id}/reject")]
pub async fn reject_listing(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ListingPath>,
    payload: web::Json<ModerationNotes>,
) -> ApiResult<web::Json<ListingResponse>> {
    let notes = payload.into_inner().notes;
    moderate(&state, &session, &path, ModerationDecision::Reject { notes }).await
}

/// Send a listing back to its seller for changes.
#[utoipa::path(
    put,
    path = "/api/v1/admin/listings/{listing_id}/needs-changes",
    params(("listing_id" = String, Path, description = "Listing identifier")),
    request_body = ModerationNotes,
    responses(
        (status = 200, description = "Listing awaiting changes", body = ListingResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not an administrator", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "requestListingChanges"
)]
#[put("/admin/listings/{listing_id}/needs-changes")]
pub async fn request_changes(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ListingPath>,
    payload: web::Json<ModerationNotes>,
) -> ApiResult<web::Json<ListingResponse>> {
    let notes = payload.into_inner().notes;
    moderate(
        &state,
        &session,
        &path,
        ModerationDecision::RequestChanges { notes },
    )
    .await
}
