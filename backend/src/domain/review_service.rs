//! Review eligibility engine.
//!
//! Only the two parties of a completed sale may review each other, once
//! each per listing. Checks run in a fixed order so callers see the same
//! error for the same situation regardless of storage.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::listing_service::load_listing;
use crate::domain::ports::{PersistenceGateway, ReviewEligibility, ReviewQueries};
use crate::domain::{
    Actor, Error, Listing, ListingId, ListingStatus, Rating, Review, ReviewDirection, ReviewId,
    UserId,
};

/// Longest accepted review comment.
pub const COMMENT_MAX: usize = 2000;

fn normalise_comment(comment: Option<String>) -> Result<Option<String>, Error> {
    let Some(comment) = comment else {
        return Ok(None);
    };
    let trimmed = comment.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > COMMENT_MAX {
        return Err(Error::invalid_request(format!(
            "comment must be at most {COMMENT_MAX} characters"
        )));
    }
    Ok(Some(trimmed.to_owned()))
}

/// Resolve who is being reviewed, or why the actor may not review.
fn reviewee(listing: &Listing, actor: UserId, direction: ReviewDirection) -> Result<UserId, Error> {
    let sold = listing.status == ListingStatus::Sold;
    match direction {
        ReviewDirection::BuyerReviewsSeller => {
            if !sold {
                return Err(Error::invalid_state("listing has not been sold"));
            }
            if listing.buyer_id != Some(actor) {
                return Err(Error::forbidden("only the buyer may review the seller"));
            }
            if listing.seller_id == actor {
                return Err(Error::invalid_state("seller and buyer are the same user"));
            }
            Ok(listing.seller_id)
        }
        ReviewDirection::SellerReviewsBuyer => {
            if listing.seller_id != actor {
                return Err(Error::forbidden("only the seller may review the buyer"));
            }
            let buyer = match listing.buyer_id {
                Some(buyer) if sold => buyer,
                _ => return Err(Error::invalid_state("listing has no recorded buyer")),
            };
            if buyer == actor {
                return Err(Error::invalid_state("seller and buyer are the same user"));
            }
            Ok(buyer)
        }
    }
}

fn duplicate_review(listing: ListingId) -> Error {
    Error::conflict(format!("you have already reviewed listing {listing}"))
}

/// Review service implementing [`ReviewEligibility`] and [`ReviewQueries`].
#[derive(Clone)]
pub struct ReviewService<G> {
    gateway: Arc<G>,
    clock: Arc<dyn Clock>,
}

impl<G> ReviewService<G> {
    pub fn new(gateway: Arc<G>, clock: Arc<dyn Clock>) -> Self {
        Self { gateway, clock }
    }
}

#[async_trait]
impl<G> ReviewEligibility for ReviewService<G>
where
    G: PersistenceGateway,
{
    async fn submit(
        &self,
        actor: Actor,
        listing_id: ListingId,
        direction: ReviewDirection,
        rating: i64,
        comment: Option<String>,
    ) -> Result<Review, Error> {
        let rating = Rating::new(rating).map_err(|err| Error::invalid_request(err.to_string()))?;
        let comment = normalise_comment(comment)?;

        let mut uow = self.gateway.begin().await?;
        let listing = load_listing(uow.as_mut(), listing_id).await?;
        let reviewee_id = reviewee(&listing, actor.id, direction)?;
        if uow.review_by(listing_id, actor.id).await?.is_some() {
            return Err(duplicate_review(listing_id));
        }

        let review = Review {
            id: ReviewId::random(),
            listing_id,
            reviewer_id: actor.id,
            reviewee_id,
            rating,
            comment,
            created_at: self.clock.utc(),
        };
        uow.insert_review(&review).await?;
        uow.commit().await?;

        info!(
            listing = %listing_id,
            reviewer = %actor.id,
            reviewee = %reviewee_id,
            "review recorded"
        );
        Ok(review)
    }

    async fn has_buyer_reviewed(&self, actor: Actor, listing_id: ListingId) -> Result<bool, Error> {
        let mut uow = self.gateway.begin().await?;
        let listing = load_listing(uow.as_mut(), listing_id).await?;
        if listing.status != ListingStatus::Sold {
            return Ok(false);
        }
        if listing.buyer_id != Some(actor.id) {
            return Err(Error::forbidden("only the buyer may check their review"));
        }
        let existing = uow.review_by(listing_id, actor.id).await?;
        uow.commit().await?;
        Ok(existing.is_some_and(|review| review.reviewee_id == listing.seller_id))
    }
}

#[async_trait]
impl<G> ReviewQueries for ReviewService<G>
where
    G: PersistenceGateway,
{
    async fn for_listing(&self, listing: ListingId) -> Result<Vec<Review>, Error> {
        let mut uow = self.gateway.begin().await?;
        load_listing(uow.as_mut(), listing).await?;
        let reviews = uow.reviews_for_listing(listing).await?;
        uow.commit().await?;
        Ok(reviews)
    }

    async fn about_user(&self, user: UserId) -> Result<Vec<Review>, Error> {
        let mut uow = self.gateway.begin().await?;
        if uow.user(user).await?.is_none() {
            return Err(Error::not_found(format!("user {user} not found")));
        }
        let reviews = uow.reviews_about(user).await?;
        uow.commit().await?;
        Ok(reviews)
    }

    async fn review(&self, id: ReviewId) -> Result<Review, Error> {
        let mut uow = self.gateway.begin().await?;
        let review = uow.review(id).await?;
        uow.commit().await?;
        review.ok_or_else(|| Error::not_found(format!("review {id} not found")))
    }
}

#[cfg(test)]
#[path = "review_service_tests.rs"]
mod tests;
