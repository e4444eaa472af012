//! Listing aggregate and its lifecycle vocabulary.
//!
//! A listing starts in [`ListingStatus::PendingApproval`]. Administrators
//! move it through moderation; its seller edits, sells, or re-lists it via
//! [`ListingPatch`](super::ListingPatch). Two invariants hold after every
//! transition:
//!
//! - `buyer_id` is set exactly when `status` is [`ListingStatus::Sold`], and
//!   never equals `seller_id`.
//! - `sold_at` is set exactly when `status` is [`ListingStatus::Sold`].

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::category::CategoryId;
use super::ids::{ListingId, UserId};

/// Maximum stored title length.
pub const TITLE_MAX: usize = 200;
/// Maximum administrator notes length; keeps the seller notification
/// within a single message.
pub const ADMIN_NOTES_MAX: usize = 1500;
/// Maximum stored search keyword length.
pub const SEARCH_KEYWORDS_MAX: usize = 255;

/// Errors raised by listing construction and transitions.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ListingError {
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },
    #[error("{field} must be at most {max} characters")]
    FieldTooLong { field: &'static str, max: usize },
    #[error("{field} must be a finite number greater than zero")]
    NonPositiveAmount { field: &'static str },
    #[error("{field} cannot be cleared")]
    RequiredFieldCleared { field: &'static str },
    #[error("unknown {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },
    #[error("only the seller may modify this listing")]
    NotOwner,
    #[error("the seller cannot be recorded as the buyer")]
    SellerCannotBuy,
}

macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident as $kind:literal {
            $( $(#[$variant_meta:meta])* $variant:ident => $text:literal ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $( $(#[$variant_meta])* $variant ),*
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),*];

            /// Stable storage and wire representation.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $text ),*
                }
            }
        }

        impl FromStr for $name {
            type Err = ListingError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $text => Ok(Self::$variant), )*
                    other => Err(ListingError::UnknownVariant {
                        kind: $kind,
                        value: other.to_owned(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum! {
    /// Lifecycle state of a listing.
    pub enum ListingStatus as "listing status" {
        PendingApproval => "pending_approval",
        Approved => "approved",
        Rejected => "rejected",
        NeedsChanges => "needs_changes",
        Available => "available",
        Sold => "sold",
        /// Legacy state kept for stored rows; no transition targets it.
        Pending => "pending",
    }
}

string_enum! {
    /// Physical condition of an item.
    pub enum ItemCondition as "item condition" {
        New => "new",
        LikeNew => "like_new",
        Good => "good",
        Fair => "fair",
        Poor => "poor",
        Used => "used",
    }
}

string_enum! {
    /// How a skill-sharing listing is priced.
    pub enum RateType as "rate type" {
        Hourly => "hourly",
        Fixed => "fixed",
    }
}

/// Strictly positive, finite monetary amount.
///
/// # Examples
/// ```
/// use marketplace::domain::Amount;
///
/// assert!(Amount::new("price", 12.5).is_ok());
/// assert!(Amount::new("price", 0.0).is_err());
/// assert!(Amount::new("rate", f64::NAN).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Amount(f64);

impl Amount {
    /// Validate `value`, naming `field` in the error.
    pub fn new(field: &'static str, value: f64) -> Result<Self, ListingError> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(ListingError::NonPositiveAmount { field })
        }
    }

    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }
}

/// Administrator moderation verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModerationDecision {
    Approve,
    Reject { notes: String },
    RequestChanges { notes: String },
}

impl ModerationDecision {
    /// Status the listing moves to.
    pub fn target_status(&self) -> ListingStatus {
        match self {
            Self::Approve => ListingStatus::Approved,
            Self::Reject { .. } => ListingStatus::Rejected,
            Self::RequestChanges { .. } => ListingStatus::NeedsChanges,
        }
    }

    /// Seller-facing notification body for `listing`.
    pub fn notification(&self, listing: &Listing) -> String {
        let (title, id) = (&listing.title, listing.id);
        match self {
            Self::Approve => format!(
                "Congratulations! Your listing '{title}' (ID: {id}) has been approved by an administrator."
            ),
            Self::Reject { notes } => format!(
                "Your listing '{title}' (ID: {id}) has been rejected by an administrator. Reason: {notes}"
            ),
            Self::RequestChanges { notes } => format!(
                "Your listing '{title}' (ID: {id}) requires changes. Administrator feedback: {notes}"
            ),
        }
    }
}

/// Unvalidated fields supplied when creating a listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingDraft {
    pub title: String,
    pub description: String,
    pub price: Option<f64>,
    pub category_id: CategoryId,
    pub item_condition: ItemCondition,
    pub is_skill_sharing: bool,
    pub rate: Option<f64>,
    pub rate_type: Option<RateType>,
    pub availability: Option<String>,
    pub search_keywords: Option<String>,
}

/// A listing posted by a seller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: ListingId,
    pub seller_id: UserId,
    pub title: String,
    pub description: String,
    pub price: Option<Amount>,
    pub category_id: CategoryId,
    pub item_condition: ItemCondition,
    pub is_skill_sharing: bool,
    pub rate: Option<Amount>,
    pub rate_type: Option<RateType>,
    pub availability: Option<String>,
    pub search_keywords: Option<String>,
    pub status: ListingStatus,
    pub admin_notes: Option<String>,
    pub buyer_id: Option<UserId>,
    pub sold_at: Option<DateTime<Utc>>,
    /// Never decremented.
    pub views_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub(crate) fn validate_title(raw: &str) -> Result<String, ListingError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(ListingError::EmptyField { field: "title" });
    }
    if title.chars().count() > TITLE_MAX {
        return Err(ListingError::FieldTooLong {
            field: "title",
            max: TITLE_MAX,
        });
    }
    Ok(title.to_owned())
}

pub(crate) fn validate_description(raw: &str) -> Result<String, ListingError> {
    if raw.trim().is_empty() {
        return Err(ListingError::EmptyField {
            field: "description",
        });
    }
    Ok(raw.to_owned())
}

pub(crate) fn validate_keywords(raw: String) -> Result<String, ListingError> {
    if raw.chars().count() > SEARCH_KEYWORDS_MAX {
        return Err(ListingError::FieldTooLong {
            field: "searchKeywords",
            max: SEARCH_KEYWORDS_MAX,
        });
    }
    Ok(raw)
}

impl Listing {
    /// Build a fresh listing in [`ListingStatus::PendingApproval`].
    pub fn create(
        id: ListingId,
        seller_id: UserId,
        draft: ListingDraft,
        now: DateTime<Utc>,
    ) -> Result<Self, ListingError> {
        let ListingDraft {
            title,
            description,
            price,
            category_id,
            item_condition,
            is_skill_sharing,
            rate,
            rate_type,
            availability,
            search_keywords,
        } = draft;

        Ok(Self {
            id,
            seller_id,
            title: validate_title(&title)?,
            description: validate_description(&description)?,
            price: price.map(|value| Amount::new("price", value)).transpose()?,
            category_id,
            item_condition,
            is_skill_sharing,
            rate: rate.map(|value| Amount::new("rate", value)).transpose()?,
            rate_type,
            availability,
            search_keywords: search_keywords.map(validate_keywords).transpose()?,
            status: ListingStatus::PendingApproval,
            admin_notes: None,
            buyer_id: None,
            sold_at: None,
            views_count: 0,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.seller_id == user
    }

    /// Whether `viewer` may see this listing. Anonymous viewers only see
    /// approved listings.
    pub fn is_visible_to(&self, viewer: Option<UserId>) -> bool {
        self.status == ListingStatus::Approved || viewer.is_some_and(|id| self.is_owned_by(id))
    }

    /// Count one more view.
    pub fn record_view(&mut self) {
        self.views_count = self.views_count.saturating_add(1);
    }

    /// Apply an administrator verdict.
    pub fn moderate(&mut self, decision: &ModerationDecision, now: DateTime<Utc>) {
        self.set_status(decision.target_status());
        self.admin_notes = match decision {
            ModerationDecision::Approve => None,
            ModerationDecision::Reject { notes } | ModerationDecision::RequestChanges { notes } => {
                Some(notes.clone())
            }
        };
        self.updated_at = now;
    }

    /// Record a sale to `buyer`.
    pub(crate) fn mark_sold(
        &mut self,
        buyer: UserId,
        sold_at: DateTime<Utc>,
    ) -> Result<(), ListingError> {
        if buyer == self.seller_id {
            return Err(ListingError::SellerCannotBuy);
        }
        self.status = ListingStatus::Sold;
        self.buyer_id = Some(buyer);
        self.sold_at = Some(sold_at);
        Ok(())
    }

    /// Move to a non-sold status, clearing sale details.
    pub(crate) fn set_status(&mut self, status: ListingStatus) {
        debug_assert!(status != ListingStatus::Sold, "sales go through mark_sold");
        self.status = status;
        self.buyer_id = None;
        self.sold_at = None;
    }

    /// Whether the buyer and sold-at invariants hold.
    pub fn sale_invariants_hold(&self) -> bool {
        let sold = self.status == ListingStatus::Sold;
        sold == self.buyer_id.is_some()
            && sold == self.sold_at.is_some()
            && self.buyer_id != Some(self.seller_id)
    }
}

#[cfg(test)]
mod tests;
