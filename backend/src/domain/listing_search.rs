//! Listing search filters and paging.
//!
//! Filters compose with AND. Text matches are case-insensitive substrings of
//! the title, description or search keywords; title hits rank first, then
//! newer listings.

use serde::Serialize;

use super::category::CategoryId;
use super::ids::UserId;
use super::listing::{ItemCondition, Listing, ListingStatus};

/// Longest accepted free-text query.
pub const SEARCH_TEXT_MAX: usize = 40;
/// Default page size.
pub const PAGE_SIZE_DEFAULT: u32 = 20;
/// Largest page size a caller may request.
pub const PAGE_SIZE_MAX: u32 = 100;

/// Raised when search parameters are out of range.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchValidationError {
    #[error("search text must be at most {SEARCH_TEXT_MAX} letters, digits or spaces")]
    InvalidText,
    #[error("page must be at least 1")]
    InvalidPage,
    #[error("page size must be between 1 and {PAGE_SIZE_MAX}")]
    InvalidPageSize,
    #[error("price bounds must be finite and non-negative")]
    InvalidPriceBound,
}

/// Offset window over an ordered result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub offset: u64,
    pub limit: u32,
}

impl Window {
    /// Window for 1-based `page` of `page_size` entries.
    pub fn page(page: u32, page_size: u32) -> Result<Self, SearchValidationError> {
        if page == 0 {
            return Err(SearchValidationError::InvalidPage);
        }
        Self::skip_take(u64::from(page - 1) * u64::from(page_size), page_size)
    }

    /// Window skipping `offset` entries then taking up to `limit`.
    pub fn skip_take(offset: u64, limit: u32) -> Result<Self, SearchValidationError> {
        if !(1..=PAGE_SIZE_MAX).contains(&limit) {
            return Err(SearchValidationError::InvalidPageSize);
        }
        Ok(Self { offset, limit })
    }
}

impl Default for Window {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: PAGE_SIZE_DEFAULT,
        }
    }
}

/// Validated free-text search term, stored lower-cased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchText(String);

impl SearchText {
    /// Returns `None` for blank input.
    pub fn parse(raw: &str) -> Result<Option<Self>, SearchValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        let valid = trimmed.chars().count() <= SEARCH_TEXT_MAX
            && trimmed
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == ' ');
        if !valid {
            return Err(SearchValidationError::InvalidText);
        }
        Ok(Some(Self(trimmed.to_lowercase())))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Listing filter; unset fields do not constrain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingQuery {
    pub text: Option<SearchText>,
    pub category_id: Option<CategoryId>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub item_condition: Option<ItemCondition>,
    pub is_skill_sharing: Option<bool>,
    pub status: Option<ListingStatus>,
    pub seller_id: Option<UserId>,
    pub window: Window,
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

impl ListingQuery {
    /// Normalise the category filter; `0` means every category.
    pub fn with_category(mut self, raw: Option<i32>) -> Self {
        self.category_id = raw.filter(|id| *id > 0).map(CategoryId::new);
        self
    }

    /// Set price bounds after checking they are usable.
    pub fn with_price_bounds(
        mut self,
        min: Option<f64>,
        max: Option<f64>,
    ) -> Result<Self, SearchValidationError> {
        let valid = |bound: Option<f64>| bound.is_none_or(|v| v.is_finite() && v >= 0.0);
        if !valid(min) || !valid(max) {
            return Err(SearchValidationError::InvalidPriceBound);
        }
        self.min_price = min;
        self.max_price = max;
        Ok(self)
    }

    /// Whether `listing` satisfies every filter.
    ///
    /// A price bound excludes listings without a price.
    pub fn matches(&self, listing: &Listing) -> bool {
        let price = listing.price.map(|amount| amount.get());
        self.text.as_ref().is_none_or(|text| {
            let needle = text.as_str();
            contains(&listing.title, needle)
                || contains(&listing.description, needle)
                || listing
                    .search_keywords
                    .as_deref()
                    .is_some_and(|keywords| contains(keywords, needle))
        }) && self.category_id.is_none_or(|id| listing.category_id == id)
            && self
                .min_price
                .is_none_or(|min| price.is_some_and(|p| p >= min))
            && self
                .max_price
                .is_none_or(|max| price.is_some_and(|p| p <= max))
            && self
                .item_condition
                .is_none_or(|condition| listing.item_condition == condition)
            && self
                .is_skill_sharing
                .is_none_or(|skill| listing.is_skill_sharing == skill)
            && self.status.is_none_or(|status| listing.status == status)
            && self.seller_id.is_none_or(|seller| listing.seller_id == seller)
    }

    /// Sort rank: `0` for title hits, `1` otherwise.
    pub fn rank(&self, listing: &Listing) -> u8 {
        match &self.text {
            Some(text) if contains(&listing.title, text.as_str()) => 0,
            Some(_) => 1,
            None => 0,
        }
    }
}

/// One page of listings plus the unpaged match count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingPage {
    pub total: u64,
    pub results: Vec<Listing>,
}
