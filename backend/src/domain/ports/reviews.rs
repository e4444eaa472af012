//! Driving ports for post-sale reviews.

use async_trait::async_trait;

use crate::domain::{Actor, Error, ListingId, Review, ReviewDirection, ReviewId, UserId};

/// Review submission and eligibility.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewEligibility: Send + Sync {
    /// Record a review by one party of a completed sale about the other.
    async fn submit(
        &self,
        actor: Actor,
        listing: ListingId,
        direction: ReviewDirection,
        rating: i64,
        comment: Option<String>,
    ) -> Result<Review, Error>;

    /// Whether the buyer already reviewed the seller of `listing`.
    async fn has_buyer_reviewed(&self, actor: Actor, listing: ListingId) -> Result<bool, Error>;
}

/// Review reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewQueries: Send + Sync {
    /// Reviews of a listing, newest first.
    async fn for_listing(&self, listing: ListingId) -> Result<Vec<Review>, Error>;

    /// Reviews about a user, newest first.
    async fn about_user(&self, user: UserId) -> Result<Vec<Review>, Error>;

    /// One review, or `not_found`.
    async fn review(&self, id: ReviewId) -> Result<Review, Error>;
}
