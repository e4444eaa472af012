//! Driving port for administrator moderation.

use async_trait::async_trait;

use crate::domain::{Actor, Error, Listing, ListingId, ListingPage, ListingQuery, ModerationDecision};

/// Administrator-only listing moderation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModerationWorkflow: Send + Sync {
    /// Apply `decision` and notify the seller once it is committed.
    async fn moderate(
        &self,
        admin: Actor,
        id: ListingId,
        decision: ModerationDecision,
    ) -> Result<Listing, Error>;

    /// Listings awaiting approval, newest first.
    async fn pending(&self, admin: Actor, skip: u64, limit: u32) -> Result<Vec<Listing>, Error>;

    /// Listings in any status matching `query`, newest first.
    async fn all(&self, admin: Actor, query: ListingQuery) -> Result<ListingPage, Error>;
}
