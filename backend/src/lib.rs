//! Campus marketplace backend.
//!
//! Hexagonal layout: [`domain`] holds the listing lifecycle, moderation and
//! review engines behind ports; [`inbound`] exposes them over HTTP;
//! [`outbound`] implements persistence, storage, hashing and notification.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[doc(hidden)]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
