//! Listing lifecycle service.
//!
//! Implements the seller-facing [`ListingCommand`] and public
//! [`ListingQueries`] ports on top of a [`PersistenceGateway`]. Each call is
//! one unit of work; an early return drops it uncommitted.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::listing_image::{plan_additions, successor_primary};
use crate::domain::ports::{
    ImageStorage, ListingCommand, ListingDetails, ListingQueries, PersistenceGateway, UnitOfWork,
};
use crate::domain::{
    Actor, CategoryId, Error, ImageId, ImagePath, Listing, ListingDraft, ListingError, ListingId,
    ListingImage, ListingPage, ListingPatch, ListingQuery, ListingStatus, NewImage, UserId, Window,
};

/// Statuses anyone may search for.
const PUBLIC_STATUSES: [ListingStatus; 3] = [
    ListingStatus::Approved,
    ListingStatus::Available,
    ListingStatus::Sold,
];

pub(crate) fn listing_not_found(id: ListingId) -> Error {
    Error::not_found(format!("listing {id} not found"))
}

pub(crate) async fn load_listing(
    uow: &mut dyn UnitOfWork,
    id: ListingId,
) -> Result<Listing, Error> {
    uow.listing(id).await?.ok_or_else(|| listing_not_found(id))
}

async fn ensure_category(uow: &mut dyn UnitOfWork, id: CategoryId) -> Result<(), Error> {
    match uow.category(id).await? {
        Some(category) if category.is_active => Ok(()),
        _ => Err(Error::invalid_request(format!("category {id} does not exist"))),
    }
}

/// Listing lifecycle service.
#[derive(Clone)]
pub struct ListingService<G> {
    gateway: Arc<G>,
    storage: Arc<dyn ImageStorage>,
    clock: Arc<dyn Clock>,
}

impl<G> ListingService<G> {
    pub fn new(gateway: Arc<G>, storage: Arc<dyn ImageStorage>, clock: Arc<dyn Clock>) -> Self {
        Self {
            gateway,
            storage,
            clock,
        }
    }

    /// Remove image files after the rows are gone. Failures leave orphaned
    /// files and are only logged.
    async fn discard_files(&self, listing: ListingId, paths: Vec<ImagePath>) {
        if paths.is_empty() {
            return;
        }
        if let Err(error) = self.storage.delete_files(&paths).await {
            warn!(%listing, %error, "failed to delete image files");
        }
    }
}

#[async_trait]
impl<G> ListingCommand for ListingService<G>
where
    G: PersistenceGateway,
{
    async fn create(&self, actor: Actor, draft: ListingDraft) -> Result<Listing, Error> {
        let mut uow = self.gateway.begin().await?;
        ensure_category(uow.as_mut(), draft.category_id).await?;

        let listing = Listing::create(ListingId::random(), actor.id, draft, self.clock.utc())?;
        uow.insert_listing(&listing).await?;
        uow.commit().await?;

        info!(listing = %listing.id, seller = %actor.id, "listing created");
        Ok(listing)
    }

    async fn edit(
        &self,
        actor: Actor,
        id: ListingId,
        patch: ListingPatch,
    ) -> Result<Listing, Error> {
        let mut uow = self.gateway.begin().await?;
        let mut listing = load_listing(uow.as_mut(), id).await?;
        if !listing.is_owned_by(actor.id) {
            return Err(ListingError::NotOwner.into());
        }

        if let Some(category) = patch.new_category() {
            ensure_category(uow.as_mut(), category).await?;
        }
        if let Some(buyer) = patch.buyer_id {
            let active = uow.user(buyer).await?.is_some_and(|user| user.is_active);
            if !active {
                return Err(Error::invalid_request(format!("buyer {buyer} does not exist")));
            }
        }

        let previous = listing.status;
        listing.apply_patch(actor.id, patch, self.clock.utc())?;
        uow.update_listing(&listing).await?;
        uow.commit().await?;

        if previous != listing.status {
            info!(
                listing = %id,
                from = %previous,
                to = %listing.status,
                "listing status changed by seller"
            );
        }
        Ok(listing)
    }

    async fn delete(&self, actor: Actor, id: ListingId) -> Result<(), Error> {
        let mut uow = self.gateway.begin().await?;
        let listing = load_listing(uow.as_mut(), id).await?;
        if !listing.is_owned_by(actor.id) {
            return Err(listing_not_found(id));
        }

        let images = uow.images(id).await?;
        for image in &images {
            uow.delete_image(image.id).await?;
        }
        uow.delete_listing(id).await?;
        uow.commit().await?;

        info!(listing = %id, images = images.len(), "listing deleted");
        let paths = images
            .iter()
            .flat_map(ListingImage::file_paths)
            .cloned()
            .collect();
        self.discard_files(id, paths).await;
        Ok(())
    }

    async fn add_images(
        &self,
        actor: Actor,
        id: ListingId,
        images: Vec<NewImage>,
    ) -> Result<Vec<ListingImage>, Error> {
        if images.is_empty() {
            return Err(Error::invalid_request("at least one image is required"));
        }
        let mut uow = self.gateway.begin().await?;
        let listing = load_listing(uow.as_mut(), id).await?;
        if !listing.is_owned_by(actor.id) {
            return Err(Error::forbidden("only the seller may add images"));
        }

        let existing = uow.images(id).await?;
        let added = plan_additions(id, &existing, images, self.clock.utc());
        for image in &added {
            uow.insert_image(image).await?;
        }
        uow.commit().await?;
        Ok(added)
    }

    async fn remove_image(
        &self,
        actor: Actor,
        id: ListingId,
        image_id: ImageId,
    ) -> Result<(), Error> {
        let mut uow = self.gateway.begin().await?;
        let listing = load_listing(uow.as_mut(), id).await?;
        let images = uow.images(id).await?;
        let image = images
            .iter()
            .find(|image| image.id == image_id)
            .ok_or_else(|| Error::not_found(format!("image {image_id} not found on listing {id}")))?;
        if !listing.is_owned_by(actor.id) {
            return Err(Error::forbidden("only the seller may remove images"));
        }

        uow.delete_image(image.id).await?;
        if let Some(successor) = successor_primary(image, &images) {
            let promoted = ListingImage {
                is_primary: true,
                ..successor.clone()
            };
            uow.update_image(&promoted).await?;
        }
        uow.commit().await?;

        self.discard_files(id, image.file_paths().cloned().collect())
            .await;
        Ok(())
    }
}

#[async_trait]
impl<G> ListingQueries for ListingService<G>
where
    G: PersistenceGateway,
{
    async fn view(&self, viewer: Option<UserId>, id: ListingId) -> Result<ListingDetails, Error> {
        let mut uow = self.gateway.begin().await?;
        let mut listing = load_listing(uow.as_mut(), id).await?;
        if !listing.is_visible_to(viewer) {
            return Err(listing_not_found(id));
        }

        uow.increment_views(id).await?;
        listing.record_view();
        let images = uow.images(id).await?;
        uow.commit().await?;
        Ok(ListingDetails { listing, images })
    }

    async fn search(&self, mut query: ListingQuery) -> Result<ListingPage, Error> {
        let status = *query.status.get_or_insert(ListingStatus::Approved);
        if !PUBLIC_STATUSES.contains(&status) {
            return Err(Error::invalid_request(format!(
                "listings in status {status} are not publicly searchable"
            )));
        }
        query.seller_id = None;

        let mut uow = self.gateway.begin().await?;
        let page = uow.search_listings(&query).await?;
        uow.commit().await?;
        Ok(page)
    }

    async fn mine(&self, actor: Actor) -> Result<Vec<Listing>, Error> {
        let query = ListingQuery {
            seller_id: Some(actor.id),
            window: Window {
                offset: 0,
                limit: u32::MAX,
            },
            ..ListingQuery::default()
        };
        let mut uow = self.gateway.begin().await?;
        let page = uow.search_listings(&query).await?;
        uow.commit().await?;
        Ok(page.results)
    }
}

#[cfg(test)]
#[path = "listing_service_tests.rs"]
mod tests;
