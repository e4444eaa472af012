//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only see driving ports, so
//! they stay testable with mocks or the in-memory gateway.

use std::sync::Arc;

use crate::domain::ports::{
    Accounts, CategoryQueries, Inbox, ListingCommand, ListingQueries, ModerationWorkflow,
    ReviewEligibility, ReviewQueries,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn Accounts>,
    pub categories: Arc<dyn CategoryQueries>,
    pub listings: Arc<dyn ListingCommand>,
    pub listings_query: Arc<dyn ListingQueries>,
    pub moderation: Arc<dyn ModerationWorkflow>,
    pub reviews: Arc<dyn ReviewEligibility>,
    pub reviews_query: Arc<dyn ReviewQueries>,
    pub inbox: Arc<dyn Inbox>,
}
