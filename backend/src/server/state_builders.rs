//! Builders wiring domain services over a persistence gateway.

use std::sync::Arc;

use actix_web::web;
use mockable::Clock;

use marketplace::domain::ports::{ImageStorage, PasswordHasher, PersistenceGateway};
use marketplace::domain::{
    AccountService, CategoryService, ListingService, MessagingService, ModerationService,
    ReviewService,
};
use marketplace::inbound::http::state::HttpState;

/// Driven adapters shared by every service.
pub struct Adapters {
    pub storage: Arc<dyn ImageStorage>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub clock: Arc<dyn Clock>,
    pub allowed_domains: Vec<String>,
}

/// Build the account service on its own so `main` can bootstrap the admin
/// before the server starts.
pub fn build_accounts<G>(gateway: &Arc<G>, adapters: &Adapters) -> Arc<AccountService<G>>
where
    G: PersistenceGateway + 'static,
{
    Arc::new(AccountService::new(
        Arc::clone(gateway),
        Arc::clone(&adapters.hasher),
        Arc::clone(&adapters.clock),
        adapters.allowed_domains.clone(),
    ))
}

/// Assemble [`HttpState`] from one gateway.
///
/// The moderation workflow notifies sellers through the same messaging
/// service the inbox uses.
pub fn build_http_state<G>(
    gateway: Arc<G>,
    accounts: Arc<AccountService<G>>,
    adapters: &Adapters,
) -> web::Data<HttpState>
where
    G: PersistenceGateway + 'static,
{
    let clock = &adapters.clock;
    let listings = Arc::new(ListingService::new(
        Arc::clone(&gateway),
        Arc::clone(&adapters.storage),
        Arc::clone(clock),
    ));
    let reviews = Arc::new(ReviewService::new(Arc::clone(&gateway), Arc::clone(clock)));
    let messaging = Arc::new(MessagingService::new(Arc::clone(&gateway), Arc::clone(clock)));
    let moderation = Arc::new(ModerationService::new(
        Arc::clone(&gateway),
        messaging.clone(),
        Arc::clone(clock),
    ));

    web::Data::new(HttpState {
        accounts,
        categories: Arc::new(CategoryService::new(gateway)),
        listings: listings.clone(),
        listings_query: listings,
        moderation,
        reviews: reviews.clone(),
        reviews_query: reviews,
        inbox: messaging,
    })
}
