//! Unit-of-work semantics of the in-memory gateway.

use super::*;
use crate::domain::{ListingStatus, Rating, ReviewId};
use crate::test_support::{fixture_now, listing, sold_listing, user};
use rstest::{fixture, rstest};

#[fixture]
fn gateway() -> MemoryGateway {
    MemoryGateway::with_default_categories()
}

fn review(listing: &Listing, reviewer: UserId) -> Review {
    Review {
        id: ReviewId::random(),
        listing_id: listing.id,
        reviewer_id: reviewer,
        reviewee_id: listing.seller_id,
        rating: Rating::new(4).expect("rating"),
        comment: None,
        created_at: fixture_now(),
    }
}

#[rstest]
#[tokio::test]
async fn uncommitted_writes_are_discarded(gateway: MemoryGateway) {
    let seller = user("seller");
    let draft = listing(seller.id, "Desk lamp", ListingStatus::Approved);

    let mut uow = gateway.begin().await.expect("begin");
    uow.insert_listing(&draft).await.expect("insert");
    drop(uow);

    assert!(gateway.listing(draft.id).is_none());
}

#[rstest]
#[tokio::test]
async fn committed_writes_become_visible(gateway: MemoryGateway) {
    let seller = user("seller");
    let draft = listing(seller.id, "Desk lamp", ListingStatus::Approved);

    let mut uow = gateway.begin().await.expect("begin");
    uow.insert_listing(&draft).await.expect("insert");
    assert_eq!(uow.listing(draft.id).await.expect("read"), Some(draft.clone()));
    uow.commit().await.expect("commit");

    assert_eq!(gateway.listing(draft.id), Some(draft));
}

#[rstest]
#[tokio::test]
async fn duplicate_username_conflicts(gateway: MemoryGateway) {
    gateway.seed(user("alice")).expect("seed");

    let mut uow = gateway.begin().await.expect("begin");
    let err = uow.insert_user(&user("alice")).await.expect_err("duplicate");

    assert!(matches!(err, PersistenceError::Conflict { .. }));
}

#[rstest]
#[tokio::test]
async fn duplicate_review_conflicts_after_commit(gateway: MemoryGateway) {
    let (seller, buyer) = (user("seller"), user("buyer"));
    let sold = sold_listing(seller.id, buyer.id, "Bike");
    gateway.seed(sold.clone()).expect("seed");

    let mut first = gateway.begin().await.expect("begin");
    first.insert_review(&review(&sold, buyer.id)).await.expect("first");
    first.commit().await.expect("first commit");

    let mut second = gateway.begin().await.expect("begin");
    let err = second
        .insert_review(&review(&sold, buyer.id))
        .await
        .expect_err("second conflicts");
    drop(second);

    assert!(matches!(err, PersistenceError::Conflict { .. }));
    let mut uow = gateway.begin().await.expect("begin");
    assert_eq!(uow.reviews_for_listing(sold.id).await.expect("reviews").len(), 1);
}

#[rstest]
#[tokio::test]
async fn units_run_one_at_a_time(gateway: MemoryGateway) {
    let first = gateway.begin().await.expect("begin");

    let waiting =
        tokio::time::timeout(std::time::Duration::from_millis(50), gateway.begin()).await;
    assert!(waiting.is_err(), "second unit must wait for the first");
    assert!(gateway.seed(user("late")).is_err());

    first.commit().await.expect("commit");
    let second = gateway.begin().await.expect("begin after commit");
    second.rollback().await.expect("rollback");
}

#[rstest]
#[tokio::test]
async fn rollback_restores_every_touched_row(gateway: MemoryGateway) {
    let (seller, buyer) = (user("seller"), user("buyer"));
    let sold = sold_listing(seller.id, buyer.id, "Bike");
    gateway.seed(sold.clone()).expect("seed");
    let mut uow = gateway.begin().await.expect("begin");
    uow.insert_review(&review(&sold, buyer.id)).await.expect("review");
    uow.commit().await.expect("commit");

    let mut uow = gateway.begin().await.expect("begin");
    uow.increment_views(sold.id).await.expect("view");
    uow.delete_listing(sold.id).await.expect("delete");
    uow.insert_user(&user("ghost")).await.expect("user");
    uow.rollback().await.expect("rollback");

    assert_eq!(gateway.listing(sold.id), Some(sold.clone()));
    let mut uow = gateway.begin().await.expect("begin");
    assert_eq!(uow.reviews_for_listing(sold.id).await.expect("reviews").len(), 1);
    let search = UserSearch::parse("ghost").expect("search");
    assert!(uow.search_users(&search, 10).await.expect("users").is_empty());
}

#[rstest]
#[tokio::test]
async fn updating_a_deleted_listing_fails(gateway: MemoryGateway) {
    let seller = user("seller");
    let stale = listing(seller.id, "Desk lamp", ListingStatus::Approved);
    gateway.seed(stale.clone()).expect("seed");

    let mut uow = gateway.begin().await.expect("begin");
    uow.delete_listing(stale.id).await.expect("delete");
    uow.commit().await.expect("commit");

    let mut uow = gateway.begin().await.expect("begin");
    let update = uow.update_listing(&stale).await.expect_err("update");
    let view = uow.increment_views(stale.id).await.expect_err("view");
    drop(uow);

    assert!(matches!(update, PersistenceError::Query { .. }));
    assert!(matches!(view, PersistenceError::Query { .. }));
    assert!(gateway.listing(stale.id).is_none());
}

#[rstest]
#[tokio::test]
async fn increment_views_touches_only_the_counter(gateway: MemoryGateway) {
    let seller = user("seller");
    let pending = listing(seller.id, "Desk lamp", ListingStatus::PendingApproval);
    gateway.seed(pending.clone()).expect("seed");

    let mut uow = gateway.begin().await.expect("begin");
    uow.increment_views(pending.id).await.expect("view");
    uow.commit().await.expect("commit");

    let stored = gateway.listing(pending.id).expect("stored");
    assert_eq!(stored.views_count, pending.views_count + 1);
    assert_eq!(stored.status, ListingStatus::PendingApproval);
    assert_eq!(stored.updated_at, pending.updated_at);
}

#[rstest]
#[tokio::test]
async fn review_lookup_by_id(gateway: MemoryGateway) {
    let (seller, buyer) = (user("seller"), user("buyer"));
    let sold = sold_listing(seller.id, buyer.id, "Bike");
    gateway.seed(sold.clone()).expect("seed");
    let written = review(&sold, buyer.id);

    let mut uow = gateway.begin().await.expect("begin");
    uow.insert_review(&written).await.expect("review");

    assert_eq!(uow.review(written.id).await.expect("found"), Some(written));
    assert_eq!(uow.review(ReviewId::random()).await.expect("missing"), None);
}

#[rstest]
#[tokio::test]
async fn user_search_skips_inactive_accounts(gateway: MemoryGateway) {
    let mut dormant = user("gator_old");
    dormant.is_active = false;
    for account in [user("gator_b"), user("gator_a"), dormant, user("otter")] {
        gateway.seed(account).expect("seed");
    }

    let search = UserSearch::parse("Gator").expect("search");
    let mut uow = gateway.begin().await.expect("begin");
    let found = uow.search_users(&search, 1).await.expect("users");

    let names: Vec<_> = found.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, vec!["gator_a"]);
}

#[rstest]
#[tokio::test]
async fn deleting_a_listing_detaches_conversations(gateway: MemoryGateway) {
    let (seller, buyer) = (user("seller"), user("buyer"));
    let item = listing(seller.id, "Kettle", ListingStatus::Approved);
    gateway.seed(item.clone()).expect("seed");
    let conversation = Conversation::start(buyer.id, seller.id, Some(item.id), fixture_now());

    let mut uow = gateway.begin().await.expect("begin");
    uow.insert_conversation(&conversation).await.expect("conversation");
    uow.delete_listing(item.id).await.expect("delete");
    let stored = uow.conversation(conversation.id).await.expect("read");

    assert_eq!(stored.and_then(|c| c.listing_id), None);
}

#[rstest]
#[tokio::test]
async fn search_ranks_title_hits_first_then_newest(gateway: MemoryGateway) {
    let seller = user("seller");
    let mut older_title = listing(seller.id, "Calculus notes", ListingStatus::Approved);
    older_title.created_at = fixture_now() - chrono::Duration::days(2);
    let mut newer_body = listing(seller.id, "Binder", ListingStatus::Approved);
    newer_body.description = "Full of calculus worksheets".to_owned();
    let hidden = listing(seller.id, "Calculus text", ListingStatus::PendingApproval);
    for row in [&older_title, &newer_body, &hidden] {
        gateway.seed(row.clone()).expect("seed");
    }

    let query = ListingQuery {
        text: crate::domain::SearchText::parse("calculus").expect("text"),
        status: Some(ListingStatus::Approved),
        ..ListingQuery::default()
    };
    let mut uow = gateway.begin().await.expect("begin");
    let page = uow.search_listings(&query).await.expect("search");

    assert_eq!(page.total, 2);
    let ids: Vec<_> = page.results.iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![older_title.id, newer_body.id]);
}

#[rstest]
fn default_categories_are_ordered_and_active() {
    let categories = default_categories();
    assert_eq!(categories.len(), 10);
    assert!(categories.iter().all(|c| c.is_active && c.parent_id.is_none()));
    assert_eq!(
        categories.iter().filter(|c| c.is_skill_category).count(),
        5
    );
    assert_eq!(categories[1].name, "Textbooks & Notes");
}
