//! Administrator moderation workflow.
//!
//! Transitions commit first; the seller notification runs afterwards and
//! its failure is logged, never propagated.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::listing_service::load_listing;
use crate::domain::ports::{Messenger, ModerationWorkflow, PersistenceGateway};
use crate::domain::{
    ADMIN_NOTES_MAX, Actor, Error, Listing, ListingId, ListingPage, ListingQuery, ListingStatus,
    MessageContent, ModerationDecision, Window,
};

fn require_admin(actor: Actor) -> Result<(), Error> {
    if actor.is_admin {
        Ok(())
    } else {
        Err(Error::forbidden("administrator role required"))
    }
}

fn validate_decision(decision: &ModerationDecision) -> Result<(), Error> {
    match decision {
        ModerationDecision::Approve => Ok(()),
        ModerationDecision::Reject { notes } | ModerationDecision::RequestChanges { notes } => {
            if notes.trim().is_empty() {
                Err(Error::invalid_request("adminNotes must not be empty"))
            } else if notes.chars().count() > ADMIN_NOTES_MAX {
                Err(Error::invalid_request(format!(
                    "adminNotes must be at most {ADMIN_NOTES_MAX} characters"
                )))
            } else {
                Ok(())
            }
        }
    }
}

/// Moderation service implementing [`ModerationWorkflow`].
#[derive(Clone)]
pub struct ModerationService<G> {
    gateway: Arc<G>,
    messenger: Arc<dyn Messenger>,
    clock: Arc<dyn Clock>,
}

impl<G> ModerationService<G> {
    pub fn new(gateway: Arc<G>, messenger: Arc<dyn Messenger>, clock: Arc<dyn Clock>) -> Self {
        Self {
            gateway,
            messenger,
            clock,
        }
    }

    async fn notify_seller(&self, admin: Actor, listing: &Listing, decision: &ModerationDecision) {
        if listing.seller_id == admin.id {
            return;
        }
        let content = match MessageContent::new(decision.notification(listing)) {
            Ok(content) => content,
            Err(error) => {
                warn!(listing = %listing.id, %error, "moderation notification not sendable");
                return;
            }
        };
        let delivery = async {
            let conversation = self
                .messenger
                .find_or_create_conversation(admin.id, listing.seller_id, Some(listing.id))
                .await?;
            self.messenger
                .post_message(&conversation, admin.id, content)
                .await
        };
        if let Err(error) = delivery.await {
            warn!(
                listing = %listing.id,
                seller = %listing.seller_id,
                %error,
                "failed to notify seller of moderation outcome"
            );
        }
    }
}

#[async_trait]
impl<G> ModerationWorkflow for ModerationService<G>
where
    G: PersistenceGateway,
{
    async fn moderate(
        &self,
        admin: Actor,
        id: ListingId,
        decision: ModerationDecision,
    ) -> Result<Listing, Error> {
        require_admin(admin)?;
        validate_decision(&decision)?;

        let mut uow = self.gateway.begin().await?;
        let mut listing = load_listing(uow.as_mut(), id).await?;
        listing.moderate(&decision, self.clock.utc());
        uow.update_listing(&listing).await?;
        uow.commit().await?;

        info!(listing = %id, admin = %admin.id, status = %listing.status, "listing moderated");
        self.notify_seller(admin, &listing, &decision).await;
        Ok(listing)
    }

    async fn pending(&self, admin: Actor, skip: u64, limit: u32) -> Result<Vec<Listing>, Error> {
        require_admin(admin)?;
        let window =
            Window::skip_take(skip, limit).map_err(|err| Error::invalid_request(err.to_string()))?;
        let query = ListingQuery {
            status: Some(ListingStatus::PendingApproval),
            window,
            ..ListingQuery::default()
        };

        let mut uow = self.gateway.begin().await?;
        let page = uow.search_listings(&query).await?;
        uow.commit().await?;
        Ok(page.results)
    }

    async fn all(&self, admin: Actor, query: ListingQuery) -> Result<ListingPage, Error> {
        require_admin(admin)?;
        let mut uow = self.gateway.begin().await?;
        let page = uow.search_listings(&query).await?;
        uow.commit().await?;
        Ok(page)
    }
}

#[cfg(test)]
#[path = "moderation_service_tests.rs"]
mod tests;
