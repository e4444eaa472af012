//! Test utilities for the marketplace crate.
//!
//! Shared by unit tests in `src/` and integration tests in `tests/`:
//! a controllable clock plus builders for users and listings that satisfy
//! the domain invariants.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;

use crate::domain::{
    CategoryId, EmailAddress, ItemCondition, Listing, ListingDraft, ListingId, ListingStatus, User,
    UserId, Username,
};

/// Clock frozen at a chosen instant until advanced.
#[derive(Debug)]
pub struct FixtureClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixtureClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Move the clock forward by `step`.
    pub fn advance(&self, step: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += step;
    }
}

impl Default for FixtureClock {
    fn default() -> Self {
        Self::at(fixture_now())
    }
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Instant every fixture starts from.
pub fn fixture_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 2, 10, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// Shared fixture clock as the services expect it.
pub fn fixture_clock() -> Arc<FixtureClock> {
    Arc::new(FixtureClock::default())
}

/// Active, non-admin user `<name>@campus.edu`.
///
/// # Panics
///
/// Panics when `name` is not a valid username.
pub fn user(name: &str) -> User {
    User {
        id: UserId::random(),
        username: Username::new(name).expect("fixture username"),
        email: EmailAddress::new(format!("{name}@campus.edu")).expect("fixture email"),
        password_hash: String::new(),
        is_active: true,
        is_admin: false,
        created_at: fixture_now(),
    }
}

/// Like [`user`] but with administrator rights.
pub fn admin(name: &str) -> User {
    User {
        is_admin: true,
        ..user(name)
    }
}

/// Valid physical-item draft in the Electronics category.
pub fn draft(title: &str) -> ListingDraft {
    ListingDraft {
        title: title.to_owned(),
        description: format!("{title}, lightly used."),
        price: Some(25.0),
        category_id: CategoryId::new(1),
        item_condition: ItemCondition::Good,
        is_skill_sharing: false,
        rate: None,
        rate_type: None,
        availability: None,
        search_keywords: None,
    }
}

/// Listing owned by `seller` in `status`. `Sold` is not accepted; use
/// [`sold_listing`].
///
/// # Panics
///
/// Panics when `status` is `Sold` or the draft is invalid.
pub fn listing(seller: UserId, title: &str, status: ListingStatus) -> Listing {
    assert_ne!(status, ListingStatus::Sold, "use sold_listing");
    let mut listing = Listing::create(ListingId::random(), seller, draft(title), fixture_now())
        .expect("fixture draft is valid");
    listing.set_status(status);
    listing
}

/// Listing sold by `seller` to `buyer`.
///
/// # Panics
///
/// Panics when `seller` and `buyer` are the same user.
pub fn sold_listing(seller: UserId, buyer: UserId, title: &str) -> Listing {
    let mut listing = listing(seller, title, ListingStatus::Available);
    listing
        .mark_sold(buyer, fixture_now())
        .expect("buyer differs from seller");
    listing
}
