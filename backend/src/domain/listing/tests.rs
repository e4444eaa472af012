//! Tests for listing construction and moderation transitions.

use super::*;
use chrono::TimeZone;
use rstest::{fixture, rstest};

#[fixture]
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

#[fixture]
fn draft() -> ListingDraft {
    ListingDraft {
        title: "  Dell XPS 13  ".to_owned(),
        description: "Good for students.".to_owned(),
        price: Some(899.99),
        category_id: CategoryId::new(1),
        item_condition: ItemCondition::Good,
        is_skill_sharing: false,
        rate: None,
        rate_type: None,
        availability: None,
        search_keywords: Some("laptop, dell".to_owned()),
    }
}

#[rstest]
fn create_starts_pending_approval(draft: ListingDraft, now: DateTime<Utc>) {
    let listing =
        Listing::create(ListingId::random(), UserId::random(), draft, now).expect("valid draft");

    assert_eq!(listing.status, ListingStatus::PendingApproval);
    assert_eq!(listing.title, "Dell XPS 13");
    assert_eq!(listing.views_count, 0);
    assert!(listing.buyer_id.is_none());
    assert!(listing.sold_at.is_none());
    assert!(listing.sale_invariants_hold());
}

#[rstest]
#[case::blank_title(ListingDraft { title: "   ".to_owned(), ..draft() }, ListingError::EmptyField { field: "title" })]
#[case::blank_description(ListingDraft { description: String::new(), ..draft() }, ListingError::EmptyField { field: "description" })]
#[case::zero_price(ListingDraft { price: Some(0.0), ..draft() }, ListingError::NonPositiveAmount { field: "price" })]
#[case::negative_rate(ListingDraft { rate: Some(-5.0), ..draft() }, ListingError::NonPositiveAmount { field: "rate" })]
#[case::long_title(ListingDraft { title: "x".repeat(TITLE_MAX + 1), ..draft() }, ListingError::FieldTooLong { field: "title", max: TITLE_MAX })]
fn create_rejects_invalid_drafts(
    #[case] draft: ListingDraft,
    #[case] expected: ListingError,
    now: DateTime<Utc>,
) {
    let err = Listing::create(ListingId::random(), UserId::random(), draft, now)
        .expect_err("invalid draft must fail");
    assert_eq!(err, expected);
}

#[rstest]
fn skill_listing_may_omit_price(draft: ListingDraft, now: DateTime<Utc>) {
    let draft = ListingDraft {
        price: None,
        is_skill_sharing: true,
        rate: Some(25.0),
        rate_type: Some(RateType::Hourly),
        ..draft
    };
    let listing =
        Listing::create(ListingId::random(), UserId::random(), draft, now).expect("valid draft");
    assert!(listing.price.is_none());
    assert_eq!(listing.rate.map(Amount::get), Some(25.0));
}

#[rstest]
#[case(ListingStatus::Approved, None, true)]
#[case(ListingStatus::PendingApproval, None, false)]
#[case(ListingStatus::Rejected, Some(false), false)]
#[case(ListingStatus::Rejected, Some(true), true)]
#[case(ListingStatus::Sold, Some(false), false)]
fn visibility_rules(
    draft: ListingDraft,
    now: DateTime<Utc>,
    #[case] status: ListingStatus,
    #[case] viewer_is_owner: Option<bool>,
    #[case] expected: bool,
) {
    let seller = UserId::random();
    let mut listing = Listing::create(ListingId::random(), seller, draft, now).expect("listing");
    listing.status = status;
    let viewer = viewer_is_owner.map(|owner| if owner { seller } else { UserId::random() });

    assert_eq!(listing.is_visible_to(viewer), expected);
}

#[rstest]
fn moderation_sets_and_clears_notes(draft: ListingDraft, now: DateTime<Utc>) {
    let mut listing =
        Listing::create(ListingId::random(), UserId::random(), draft, now).expect("listing");

    listing.moderate(
        &ModerationDecision::Reject {
            notes: "price too high".to_owned(),
        },
        now,
    );
    assert_eq!(listing.status, ListingStatus::Rejected);
    assert_eq!(listing.admin_notes.as_deref(), Some("price too high"));

    listing.moderate(&ModerationDecision::Approve, now);
    assert_eq!(listing.status, ListingStatus::Approved);
    assert!(listing.admin_notes.is_none());
}

#[rstest]
fn moderating_a_sold_listing_clears_sale(draft: ListingDraft, now: DateTime<Utc>) {
    let mut listing =
        Listing::create(ListingId::random(), UserId::random(), draft, now).expect("listing");
    listing.mark_sold(UserId::random(), now).expect("sale");

    listing.moderate(
        &ModerationDecision::RequestChanges {
            notes: "add photos".to_owned(),
        },
        now,
    );

    assert_eq!(listing.status, ListingStatus::NeedsChanges);
    assert!(listing.sale_invariants_hold());
}

#[rstest]
fn notifications_quote_title_id_and_notes(draft: ListingDraft, now: DateTime<Utc>) {
    let listing =
        Listing::create(ListingId::random(), UserId::random(), draft, now).expect("listing");
    let id = listing.id;

    assert_eq!(
        ModerationDecision::Approve.notification(&listing),
        format!(
            "Congratulations! Your listing 'Dell XPS 13' (ID: {id}) has been approved by an administrator."
        )
    );
    assert_eq!(
        ModerationDecision::Reject {
            notes: "price too high".to_owned()
        }
        .notification(&listing),
        format!(
            "Your listing 'Dell XPS 13' (ID: {id}) has been rejected by an administrator. Reason: price too high"
        )
    );
    assert_eq!(
        ModerationDecision::RequestChanges {
            notes: "blurry photo".to_owned()
        }
        .notification(&listing),
        format!(
            "Your listing 'Dell XPS 13' (ID: {id}) requires changes. Administrator feedback: blurry photo"
        )
    );
}

#[rstest]
fn mark_sold_rejects_seller_as_buyer(draft: ListingDraft, now: DateTime<Utc>) {
    let seller = UserId::random();
    let mut listing = Listing::create(ListingId::random(), seller, draft, now).expect("listing");
    assert_eq!(
        listing.mark_sold(seller, now),
        Err(ListingError::SellerCannotBuy)
    );
}

#[rstest]
#[case("pending_approval", ListingStatus::PendingApproval)]
#[case("needs_changes", ListingStatus::NeedsChanges)]
#[case("pending", ListingStatus::Pending)]
fn status_parses_storage_text(#[case] raw: &str, #[case] expected: ListingStatus) {
    assert_eq!(raw.parse::<ListingStatus>(), Ok(expected));
    assert_eq!(expected.as_str(), raw);
}

#[rstest]
fn unknown_condition_is_rejected() {
    assert!(matches!(
        "mint".parse::<ItemCondition>(),
        Err(ListingError::UnknownVariant { .. })
    ));
}
