//! HTTP inbound adapter exposing REST endpoints.

pub mod admin;
pub mod auth;
pub mod categories;
pub mod dto;
pub mod error;
pub mod health;
pub mod listings;
mod listings_dto;
pub mod messages;
pub mod reviews;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;

use actix_web::web;

/// Register every `/api/v1` handler on `cfg`.
///
/// Session middleware and [`state::HttpState`] are supplied by the caller.
pub fn configure(cfg: &mut web::ServiceConfig) {
    error::configure_extractors(cfg);
    cfg.service(users::register)
        .service(users::login)
        .service(users::logout)
        .service(users::current_user_profile)
        .service(users::search_users)
        .service(users::user_reviews)
        .service(categories::list_categories)
        .service(categories::get_category)
        .service(listings::search_listings)
        .service(listings::create_listing)
        // Before `get_listing` so `mine` is not parsed as an id.
        .service(listings::my_listings)
        .service(listings::get_listing)
        .service(listings::update_listing)
        .service(listings::delete_listing)
        .service(listings::add_images)
        .service(listings::remove_image)
        .service(reviews::review_seller)
        .service(reviews::review_buyer)
        .service(reviews::listing_reviews)
        .service(reviews::has_buyer_reviewed)
        .service(reviews::get_review)
        .service(admin::pending_listings)
        .service(admin::all_listings)
        .service(admin::approve_listing)
        .service(admin::reject_listing)
        .service(admin::request_changes)
        .service(messages::start_conversation)
        .service(messages::list_conversations)
        .service(messages::get_conversation)
        .service(messages::list_messages)
        .service(messages::send_message);
}
