//! Seller-driven listing edits.
//!
//! A [`ListingPatch`] carries every editable field as an explicit tri-state
//! so "leave alone", "set" and "clear" stay distinguishable. Applying a patch
//! resolves status changes in a fixed priority order:
//!
//! 1. Re-moderation: editing a substantive field of an approved listing sends
//!    it back to [`ListingStatus::PendingApproval`].
//! 2. Sale: a `buyer_id` marks the listing sold and overrides any `status`.
//! 3. Re-listing: `status = available` clears the sale.
//! 4. Any other status is applied as requested, except `sold` without a
//!    recorded buyer, which is ignored.

use chrono::{DateTime, Utc};

use super::category::CategoryId;
use super::ids::UserId;
use super::listing::{
    Amount, ItemCondition, Listing, ListingError, ListingStatus, RateType, validate_description,
    validate_keywords, validate_title,
};

/// Tri-state update for a single field.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FieldUpdate<T> {
    /// Field absent from the patch.
    #[default]
    Unchanged,
    /// Field present with a value.
    Set(T),
    /// Field present as an explicit null.
    Clear,
}

impl<T> FieldUpdate<T> {
    pub fn is_touched(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }

    /// Map `Option<Option<T>>` as produced by a nullable, optional field.
    pub fn from_nullable(value: Option<Option<T>>) -> Self {
        match value {
            None => Self::Unchanged,
            Some(None) => Self::Clear,
            Some(Some(inner)) => Self::Set(inner),
        }
    }

    fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<FieldUpdate<U>, E> {
        Ok(match self {
            Self::Unchanged => FieldUpdate::Unchanged,
            Self::Set(value) => FieldUpdate::Set(f(value)?),
            Self::Clear => FieldUpdate::Clear,
        })
    }
}

/// Edits requested by a listing's seller.
///
/// `id`, `seller_id`, `created_at` and `updated_at` are not representable;
/// the engine owns them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingPatch {
    pub title: FieldUpdate<String>,
    pub description: FieldUpdate<String>,
    pub price: FieldUpdate<f64>,
    pub category_id: FieldUpdate<CategoryId>,
    pub item_condition: FieldUpdate<ItemCondition>,
    pub is_skill_sharing: FieldUpdate<bool>,
    pub rate: FieldUpdate<f64>,
    pub rate_type: FieldUpdate<RateType>,
    pub availability: FieldUpdate<String>,
    pub search_keywords: FieldUpdate<String>,
    pub status: Option<ListingStatus>,
    pub buyer_id: Option<UserId>,
    pub sold_at: Option<DateTime<Utc>>,
}

impl ListingPatch {
    /// Whether any field that triggers re-moderation is present.
    pub fn touches_substantive_fields(&self) -> bool {
        self.title.is_touched()
            || self.description.is_touched()
            || self.price.is_touched()
            || self.category_id.is_touched()
            || self.item_condition.is_touched()
            || self.is_skill_sharing.is_touched()
            || self.rate.is_touched()
            || self.rate_type.is_touched()
            || self.availability.is_touched()
            || self.search_keywords.is_touched()
    }

    /// Category the patch would assign, if any.
    pub fn new_category(&self) -> Option<CategoryId> {
        match self.category_id {
            FieldUpdate::Set(id) => Some(id),
            _ => None,
        }
    }
}

/// Validated scalar assignments, checked before any mutation.
struct Scalars {
    title: FieldUpdate<String>,
    description: FieldUpdate<String>,
    price: FieldUpdate<Amount>,
    category_id: FieldUpdate<CategoryId>,
    item_condition: FieldUpdate<ItemCondition>,
    is_skill_sharing: FieldUpdate<bool>,
    rate: FieldUpdate<Amount>,
    rate_type: FieldUpdate<RateType>,
    availability: FieldUpdate<String>,
    search_keywords: FieldUpdate<String>,
}

fn required<T>(update: &FieldUpdate<T>, field: &'static str) -> Result<(), ListingError> {
    match update {
        FieldUpdate::Clear => Err(ListingError::RequiredFieldCleared { field }),
        _ => Ok(()),
    }
}

impl Scalars {
    fn validate(patch: &ListingPatch) -> Result<Self, ListingError> {
        required(&patch.title, "title")?;
        required(&patch.description, "description")?;
        required(&patch.category_id, "categoryId")?;
        required(&patch.is_skill_sharing, "isSkillSharing")?;

        Ok(Self {
            title: patch.title.clone().try_map(|raw| validate_title(&raw))?,
            description: patch
                .description
                .clone()
                .try_map(|raw| validate_description(&raw))?,
            price: patch
                .price
                .clone()
                .try_map(|value| Amount::new("price", value))?,
            category_id: patch.category_id.clone(),
            item_condition: patch.item_condition.clone(),
            is_skill_sharing: patch.is_skill_sharing.clone(),
            rate: patch
                .rate
                .clone()
                .try_map(|value| Amount::new("rate", value))?,
            rate_type: patch.rate_type.clone(),
            availability: patch.availability.clone(),
            search_keywords: patch.search_keywords.clone().try_map(validate_keywords)?,
        })
    }

    fn apply(self, listing: &mut Listing) {
        fn assign<T>(slot: &mut T, update: FieldUpdate<T>) {
            if let FieldUpdate::Set(value) = update {
                *slot = value;
            }
        }
        fn assign_nullable<T>(slot: &mut Option<T>, update: FieldUpdate<T>) {
            match update {
                FieldUpdate::Unchanged => {}
                FieldUpdate::Set(value) => *slot = Some(value),
                FieldUpdate::Clear => *slot = None,
            }
        }

        assign(&mut listing.title, self.title);
        assign(&mut listing.description, self.description);
        assign(&mut listing.category_id, self.category_id);
        // Clearing the condition is ignored; a listing always has one.
        assign(&mut listing.item_condition, self.item_condition);
        assign(&mut listing.is_skill_sharing, self.is_skill_sharing);
        assign_nullable(&mut listing.price, self.price);
        assign_nullable(&mut listing.rate, self.rate);
        assign_nullable(&mut listing.rate_type, self.rate_type);
        assign_nullable(&mut listing.availability, self.availability);
        assign_nullable(&mut listing.search_keywords, self.search_keywords);
    }
}

impl Listing {
    /// Apply a seller edit.
    ///
    /// The listing is left untouched when an error is returned.
    ///
    /// # Examples
    /// ```
    /// use chrono::Utc;
    /// use marketplace::domain::{
    ///     CategoryId, FieldUpdate, ItemCondition, Listing, ListingDraft, ListingId,
    ///     ListingPatch, ListingStatus, ModerationDecision, UserId,
    /// };
    ///
    /// let seller = UserId::random();
    /// let draft = ListingDraft {
    ///     title: "Desk Lamp".into(),
    ///     description: "LED, adjustable.".into(),
    ///     price: Some(20.0),
    ///     category_id: CategoryId::new(3),
    ///     item_condition: ItemCondition::LikeNew,
    ///     is_skill_sharing: false,
    ///     rate: None,
    ///     rate_type: None,
    ///     availability: None,
    ///     search_keywords: None,
    /// };
    /// let mut listing = Listing::create(ListingId::random(), seller, draft, Utc::now())
    ///     .expect("valid draft");
    /// listing.moderate(&ModerationDecision::Approve, Utc::now());
    ///
    /// let patch = ListingPatch { price: FieldUpdate::Set(15.0), ..ListingPatch::default() };
    /// listing.apply_patch(seller, patch, Utc::now()).expect("owner edit");
    /// assert_eq!(listing.status, ListingStatus::PendingApproval);
    /// ```
    pub fn apply_patch(
        &mut self,
        actor: UserId,
        patch: ListingPatch,
        now: DateTime<Utc>,
    ) -> Result<(), ListingError> {
        if !self.is_owned_by(actor) {
            return Err(ListingError::NotOwner);
        }
        let scalars = Scalars::validate(&patch)?;
        if patch.buyer_id == Some(self.seller_id) {
            return Err(ListingError::SellerCannotBuy);
        }

        let mut requested = patch.status;
        if self.status == ListingStatus::Approved && patch.touches_substantive_fields() {
            self.set_status(ListingStatus::PendingApproval);
            requested = requested
                .filter(|status| matches!(status, ListingStatus::Sold | ListingStatus::Available));
        }

        if let Some(buyer) = patch.buyer_id {
            self.mark_sold(buyer, patch.sold_at.unwrap_or(now))?;
        } else {
            match requested {
                Some(ListingStatus::Sold) => {
                    if self.buyer_id.is_some() {
                        self.status = ListingStatus::Sold;
                    }
                }
                Some(status) => self.set_status(status),
                None => {}
            }
        }

        scalars.apply(self);
        self.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
#[path = "listing_patch_tests.rs"]
mod tests;
