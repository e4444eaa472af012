//! Listing lifecycle handlers.
//!
//! ```text
//! GET    /api/v1/listings?q=calculus&categoryId=2&page=1
//! POST   /api/v1/listings
//! GET    /api/v1/listings/mine
//! GET    /api/v1/listings/{listing_id}
//! PUT    /api/v1/listings/{listing_id}
//! DELETE /api/v1/listings/{listing_id}
//! POST   /api/v1/listings/{listing_id}/images
//! DELETE /api/v1/listings/{listing_id}/images/{image_id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use tracing::info;

use crate::domain::{ImageId, ListingDraft, ListingPatch, ListingQuery, NewImage};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{current_actor, optional_viewer};
use crate::inbound::http::dto::{
    ListingDetailsResponse, ListingImageResponse, ListingPageResponse, ListingResponse,
};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id};

pub use super::listings_dto::{
    AddImagesRequest, CreateListingRequest, ImageRequest, ListingSearchParams,
    UpdateListingRequest,
};
use super::listings_dto::{ListingImagePath, ListingPath};

/// Publicly visible listings matching the filters.
#[utoipa::path(
    get,
    path = "/api/v1/listings",
    params(ListingSearchParams),
    responses(
        (status = 200, description = "One page of listings", body = ListingPageResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["listings"],
    operation_id = "searchListings",
    security([])
)]
#[get("/listings")]
pub async fn search_listings(
    state: web::Data<HttpState>,
    params: web::Query<ListingSearchParams>,
) -> ApiResult<web::Json<ListingPageResponse>> {
    let query = ListingQuery::try_from(params.into_inner())?;
    let page = state.listings_query.search(query).await?;
    Ok(web::Json(page.into()))
}

/// Post a listing; it waits for moderation before becoming public.
#[utoipa::path(
    post,
    path = "/api/v1/listings",
    request_body = CreateListingRequest,
    responses(
        (status = 201, description = "Listing created", body = ListingResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Unknown category", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["listings"],
    operation_id = "createListing"
)]
#[post("/listings")]
pub async fn create_listing(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateListingRequest>,
) -> ApiResult<HttpResponse> {
    let actor = current_actor(&state, &session).await?;
    let draft = ListingDraft::try_from(payload.into_inner())?;
    let listing = state.listings.create(actor, draft).await?;
    info!(listing_id = %listing.id, seller_id = %actor.id, "listing created");
    Ok(HttpResponse::Created().json(ListingResponse::from(listing)))
}

/// Every listing the caller is selling, in any status.
#[utoipa::path(
    get,
    path = "/api/v1/listings/mine",
    responses(
        (status = 200, description = "Caller's listings", body = [ListingResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["listings"],
    operation_id = "myListings"
)]
#[get("/listings/mine")]
pub async fn my_listings(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<ListingResponse>>> {
    let actor = current_actor(&state, &session).await?;
    let listings = state.listings_query.mine(actor).await?;
    Ok(web::Json(listings.into_iter().map(Into::into).collect()))
}

/// One listing with its images. Counts as a view.
#[utoipa::path(
    get,
    path = "/api/v1/listings/{listing_id}",
    params(("listing_id" = String, Path, description = "Listing identifier")),
    responses(
        (status = 200, description = "Listing", body = ListingDetailsResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["listings"],
    operation_id = "getListing",
    security([])
)]
#[get("/listings/{listing_id}")]
pub async fn get_listing(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ListingPath>,
) -> ApiResult<web::Json<ListingDetailsResponse>> {
    let listing_id = path.parse()?;
    let viewer = optional_viewer(&state, &session).await?;
    let details = state.listings_query.view(viewer, listing_id).await?;
    Ok(web::Json(details.into()))
}

/// Seller edit. Substantive changes to an approved listing send it back to
/// moderation; a `buyerId` marks it sold.
#[utoipa::path(
    put,
    path = "/api/v1/listings/{listing_id}",
    params(("listing_id" = String, Path, description = "Listing identifier")),
    request_body = UpdateListingRequest,
    responses(
        (status = 200, description = "Updated listing", body = ListingResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the seller", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 422, description = "Transition not allowed", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["listings"],
    operation_id = "updateListing"
)]
#[put("/listings/{listing_id}")]
pub async fn update_listing(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ListingPath>,
    payload: web::Json<UpdateListingRequest>,
) -> ApiResult<web::Json<ListingResponse>> {
    let listing_id = path.parse()?;
    let actor = current_actor(&state, &session).await?;
    let patch = ListingPatch::try_from(payload.into_inner())?;
    let listing = state.listings.edit(actor, listing_id, patch).await?;
    Ok(web::Json(listing.into()))
}

/// Delete a listing the caller sells, with its images.
#[utoipa::path(
    delete,
    path = "/api/v1/listings/{listing_id}",
    params(("listing_id" = String, Path, description = "Listing identifier")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["listings"],
    operation_id = "deleteListing"
)]
#[delete("/listings/{listing_id}")]
pub async fn delete_listing(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ListingPath>,
) -> ApiResult<HttpResponse> {
    let listing_id = path.parse()?;
    let actor = current_actor(&state, &session).await?;
    state.listings.delete(actor, listing_id).await?;
    info!(%listing_id, "listing deleted");
    Ok(HttpResponse::NoContent().finish())
}

/// Attach stored images; the first image of a listing becomes primary.
#[utoipa::path(
    post,
    path = "/api/v1/listings/{listing_id}/images",
    params(("listing_id" = String, Path, description = "Listing identifier")),
    request_body = AddImagesRequest,
    responses(
        (status = 201, description = "Images attached", body = [ListingImageResponse]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the seller", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["listings"],
    operation_id = "addListingImages"
)]
#[post("/listings/{listing_id}/images")]
pub async fn add_images(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ListingPath>,
    payload: web::Json<AddImagesRequest>,
) -> ApiResult<HttpResponse> {
    let listing_id = path.parse()?;
    let actor = current_actor(&state, &session).await?;
    let uploads = Vec::<NewImage>::try_from(payload.into_inner())?;
    let images = state.listings.add_images(actor, listing_id, uploads).await?;
    let body: Vec<ListingImageResponse> = images.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Created().json(body))
}

/// Detach one image and delete its files.
#[utoipa::path(
    delete,
    path = "/api/v1/listings/{listing_id}/images/{image_id}",
    params(
        ("listing_id" = String, Path, description = "Listing identifier"),
        ("image_id" = String, Path, description = "Image identifier")
    ),
    responses(
        (status = 204, description = "Removed"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the seller", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["listings"],
    operation_id = "removeListingImage"
)]
#[delete("/listings/{listing_id}/images/{image_id}")]
pub async fn remove_image(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ListingImagePath>,
) -> ApiResult<HttpResponse> {
    let listing_id = parse_id(&path.listing_id, FieldName::new("listingId"))?;
    let image_id: ImageId = parse_id(&path.image_id, FieldName::new("imageId"))?;
    let actor = current_actor(&state, &session).await?;
    state.listings.remove_image(actor, listing_id, image_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "listings_tests.rs"]
mod tests;
