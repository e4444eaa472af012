//! Driving ports for the listing lifecycle.
//!
//! Inbound adapters call these with an explicit [`Actor`]; the services
//! behind them own ownership checks and status transitions.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{
    Actor, Error, ImageId, Listing, ListingDraft, ListingId, ListingImage, ListingPage,
    ListingPatch, ListingQuery, NewImage, UserId,
};

/// A listing together with its images.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingDetails {
    #[serde(flatten)]
    pub listing: Listing,
    pub images: Vec<ListingImage>,
}

/// Seller-side listing mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingCommand: Send + Sync {
    /// Create a listing in `pending_approval` owned by `actor`.
    async fn create(&self, actor: Actor, draft: ListingDraft) -> Result<Listing, Error>;

    /// Apply a seller edit. Non-owners get `forbidden`.
    async fn edit(
        &self,
        actor: Actor,
        id: ListingId,
        patch: ListingPatch,
    ) -> Result<Listing, Error>;

    /// Delete a listing, its image rows and their files. Non-owners get
    /// `not_found`.
    async fn delete(&self, actor: Actor, id: ListingId) -> Result<(), Error>;

    /// Attach images; the first image of a listing without one becomes
    /// primary.
    async fn add_images(
        &self,
        actor: Actor,
        id: ListingId,
        images: Vec<NewImage>,
    ) -> Result<Vec<ListingImage>, Error>;

    /// Remove one image, promoting a successor when it was primary.
    async fn remove_image(
        &self,
        actor: Actor,
        id: ListingId,
        image: ImageId,
    ) -> Result<(), Error>;
}

/// Listing reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingQueries: Send + Sync {
    /// Fetch one listing and count the view. Hidden listings read as
    /// `not_found` for everyone but the seller.
    async fn view(&self, viewer: Option<UserId>, id: ListingId) -> Result<ListingDetails, Error>;

    /// Public search; `status` defaults to approved.
    async fn search(&self, query: ListingQuery) -> Result<ListingPage, Error>;

    /// Every listing the actor sells, newest first.
    async fn mine(&self, actor: Actor) -> Result<Vec<Listing>, Error>;
}
