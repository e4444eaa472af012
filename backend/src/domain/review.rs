//! Post-transaction reviews.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::ids::{ListingId, ReviewId, UserId};

/// Lowest accepted star rating.
pub const RATING_MIN: u8 = 1;
/// Highest accepted star rating.
pub const RATING_MAX: u8 = 5;

/// Raised when a rating falls outside the star range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("rating must be between {RATING_MIN} and {RATING_MAX}")]
pub struct RatingOutOfRange;

/// Star rating between [`RATING_MIN`] and [`RATING_MAX`] inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Rating(u8);

impl Rating {
    pub fn new(value: i64) -> Result<Self, RatingOutOfRange> {
        u8::try_from(value)
            .ok()
            .filter(|stars| (RATING_MIN..=RATING_MAX).contains(stars))
            .map(Self)
            .ok_or(RatingOutOfRange)
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

/// Which party of a sale is writing the review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDirection {
    BuyerReviewsSeller,
    SellerReviewsBuyer,
}

/// A rating left by one party of a completed sale about the other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub listing_id: ListingId,
    pub reviewer_id: UserId,
    pub reviewee_id: UserId,
    pub rating: Rating,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0)]
    #[case(6)]
    #[case(-1)]
    #[case(256 + 3)]
    fn rating_rejects_out_of_range(#[case] raw: i64) {
        assert_eq!(Rating::new(raw), Err(RatingOutOfRange));
    }

    #[rstest]
    #[case(1)]
    #[case(5)]
    fn rating_accepts_bounds(#[case] raw: i64) {
        let rating = Rating::new(raw).expect("in range");
        assert_eq!(i64::from(rating.get()), raw);
    }
}
