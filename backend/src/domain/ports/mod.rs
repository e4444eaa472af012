//! Domain ports for the hexagonal boundary.
//!
//! Driving ports (`Accounts`, `ListingCommand`, `ListingQueries`,
//! `ModerationWorkflow`, `ReviewEligibility`, `ReviewQueries`, `Inbox`,
//! `CategoryQueries`) are implemented by domain services and called by
//! inbound adapters. Driven ports (`PersistenceGateway`, `Messenger`,
//! `ImageStorage`, `PasswordHasher`) are implemented by outbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod accounts;
mod categories;
mod image_storage;
mod inbox;
mod listings;
mod messenger;
mod moderation;
mod password_hasher;
mod persistence_gateway;
mod reviews;

#[cfg(test)]
pub use accounts::MockAccounts;
pub use accounts::{Accounts, USER_SEARCH_LIMIT};
#[cfg(test)]
pub use categories::MockCategoryQueries;
pub use categories::CategoryQueries;
#[cfg(test)]
pub use image_storage::MockImageStorage;
pub use image_storage::{ImageStorage, ImageStorageError, NoopImageStorage};
#[cfg(test)]
pub use inbox::MockInbox;
pub use inbox::{Inbox, InitiatedConversation};
#[cfg(test)]
pub use listings::{MockListingCommand, MockListingQueries};
pub use listings::{ListingCommand, ListingDetails, ListingQueries};
#[cfg(test)]
pub use messenger::MockMessenger;
pub use messenger::{Messenger, MessengerError};
#[cfg(test)]
pub use moderation::MockModerationWorkflow;
pub use moderation::ModerationWorkflow;
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
pub use persistence_gateway::{PersistenceError, PersistenceGateway, UnitOfWork};
#[cfg(test)]
pub use reviews::{MockReviewEligibility, MockReviewQueries};
pub use reviews::{ReviewEligibility, ReviewQueries};
