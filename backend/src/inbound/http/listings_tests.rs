//! Tests for listing lifecycle handlers.

use super::*;
use crate::domain::ports::ListingDetails;
use crate::domain::{
    Actor, Error, FieldUpdate, ImagePath, ListingId, ListingImage, ListingPage, ListingStatus,
    UserId,
};
use crate::inbound::http::test_utils::{MockPorts, error_code, sign_in, test_app};
use crate::test_support::{fixture_now, listing, sold_listing, user};
use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{Value, json};

fn create_body() -> Value {
    json!({
        "title": "Calculus textbook",
        "description": "Lightly highlighted",
        "price": 45.0,
        "categoryId": 2,
        "itemCondition": "good"
    })
}

#[rstest]
#[actix_web::test]
async fn create_requires_a_session() {
    let app = actix_test::init_service(test_app(MockPorts::default().into_state())).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/listings")
            .set_json(create_body())
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[rstest]
#[actix_web::test]
async fn create_returns_a_pending_listing() {
    let sam = user("sam_seller");
    let mut ports = MockPorts::default().signed_in_as(&sam);
    let seller = sam.id;
    ports
        .listings
        .expect_create()
        .withf(move |actor: &Actor, draft| {
            actor.id == seller && draft.title == "Calculus textbook" && draft.price == Some(45.0)
        })
        .times(1)
        .returning(move |actor, draft| {
            let mut created = listing(actor.id, &draft.title, ListingStatus::PendingApproval);
            created.description = draft.description;
            Ok(created)
        });
    let app = actix_test::init_service(test_app(ports.into_state())).await;
    let cookie = sign_in(&app, sam.id).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/listings")
            .cookie(cookie)
            .set_json(create_body())
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(
        body.get("status").and_then(Value::as_str),
        Some("pending_approval")
    );
    assert_eq!(
        body.get("sellerId").and_then(Value::as_str),
        Some(sam.id.to_string().as_str())
    );
}

#[rstest]
#[actix_web::test]
async fn create_rejects_unknown_conditions() {
    let sam = user("sam_seller");
    let ports = MockPorts::default().signed_in_as(&sam);
    let app = actix_test::init_service(test_app(ports.into_state())).await;
    let cookie = sign_in(&app, sam.id).await;
    let mut body = create_body();
    body["itemCondition"] = json!("mint");

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/listings")
            .cookie(cookie)
            .set_json(body)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(
        body.pointer("/details/field").and_then(Value::as_str),
        Some("itemCondition")
    );
}

#[rstest]
#[actix_web::test]
async fn search_translates_query_parameters() {
    let mut ports = MockPorts::default();
    ports
        .listings_query
        .expect_search()
        .withf(|query: &ListingQuery| {
            query.text.as_ref().map(|text| text.as_str()) == Some("calculus")
                && query.category_id.is_none()
                && query.max_price == Some(50.0)
                && query.window.offset == 10
                && query.window.limit == 10
        })
        .times(1)
        .returning(|_| {
            Ok(ListingPage {
                total: 11,
                results: vec![listing(
                    UserId::random(),
                    "Calculus textbook",
                    ListingStatus::Approved,
                )],
            })
        });
    let app = actix_test::init_service(test_app(ports.into_state())).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/listings?q=Calculus&categoryId=0&maxPrice=50&page=2&pageSize=10")
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body.get("total").and_then(Value::as_u64), Some(11));
    assert_eq!(
        body.pointer("/results/0/title").and_then(Value::as_str),
        Some("Calculus textbook")
    );
}

#[rstest]
#[case("q=%3Cscript%3E")]
#[case("pageSize=500")]
#[case("condition=mint")]
#[actix_web::test]
async fn search_rejects_bad_parameters(#[case] query: &str) {
    let app = actix_test::init_service(test_app(MockPorts::default().into_state())).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/listings?{query}"))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(error_code(&body), Some("invalid_request"));
}

#[rstest]
#[actix_web::test]
async fn anonymous_view_passes_no_viewer() {
    let sam = user("sam_seller");
    let shown = listing(sam.id, "Desk lamp", ListingStatus::Approved);
    let listing_id = shown.id;
    let mut ports = MockPorts::default();
    ports
        .listings_query
        .expect_view()
        .withf(move |viewer: &Option<UserId>, id: &ListingId| viewer.is_none() && *id == listing_id)
        .returning(move |_, _| {
            Ok(ListingDetails {
                listing: shown.clone(),
                images: vec![ListingImage {
                    id: crate::domain::ImageId::random(),
                    listing_id,
                    image_path: ImagePath::new("listings/lamp.jpg").expect("path"),
                    thumbnail_path: None,
                    display_order: 0,
                    is_primary: true,
                    created_at: fixture_now(),
                }],
            })
        });
    let app = actix_test::init_service(test_app(ports.into_state())).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/listings/{listing_id}"))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body.get("title").and_then(Value::as_str), Some("Desk lamp"));
    assert_eq!(
        body.pointer("/images/0/isPrimary").and_then(Value::as_bool),
        Some(true)
    );
}

#[rstest]
#[actix_web::test]
async fn owner_view_names_the_viewer() {
    let sam = user("sam_seller");
    let draft_listing = listing(sam.id, "Desk lamp", ListingStatus::NeedsChanges);
    let mut ports = MockPorts::default().signed_in_as(&sam);
    let owner = sam.id;
    ports
        .listings_query
        .expect_view()
        .withf(move |viewer: &Option<UserId>, _: &ListingId| *viewer == Some(owner))
        .returning(move |_, _| {
            Ok(ListingDetails {
                listing: draft_listing.clone(),
                images: Vec::new(),
            })
        });
    let app = actix_test::init_service(test_app(ports.into_state())).await;
    let cookie = sign_in(&app, sam.id).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/listings/{}", ListingId::random()))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[rstest]
#[actix_web::test]
async fn mine_is_not_mistaken_for_a_listing_id() {
    let sam = user("sam_seller");
    let mut ports = MockPorts::default().signed_in_as(&sam);
    let owned = vec![
        listing(sam.id, "Desk lamp", ListingStatus::Rejected),
        sold_listing(sam.id, UserId::random(), "Bike"),
    ];
    ports
        .listings_query
        .expect_mine()
        .times(1)
        .returning(move |_| Ok(owned.clone()));
    let app = actix_test::init_service(test_app(ports.into_state())).await;
    let cookie = sign_in(&app, sam.id).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/listings/mine")
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body.as_array().map(Vec::len), Some(2));
}

#[rstest]
#[actix_web::test]
async fn update_forwards_a_tri_state_patch() {
    let sam = user("sam_seller");
    let mut ports = MockPorts::default().signed_in_as(&sam);
    ports
        .listings
        .expect_edit()
        .withf(|_: &Actor, _: &ListingId, patch: &ListingPatch| {
            patch.price == FieldUpdate::Clear
                && patch.title == FieldUpdate::Set("Desk lamp (LED)".to_owned())
                && patch.description == FieldUpdate::Unchanged
        })
        .times(1)
        .returning(|actor, _, _| {
            Ok(listing(
                actor.id,
                "Desk lamp (LED)",
                ListingStatus::PendingApproval,
            ))
        });
    let app = actix_test::init_service(test_app(ports.into_state())).await;
    let cookie = sign_in(&app, sam.id).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri(&format!("/api/v1/listings/{}", ListingId::random()))
            .cookie(cookie)
            .set_json(json!({"title": "Desk lamp (LED)", "price": null}))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[rstest]
#[actix_web::test]
async fn update_rejects_unknown_fields() {
    let sam = user("sam_seller");
    let ports = MockPorts::default();
    let app = actix_test::init_service(test_app(ports.into_state())).await;
    let cookie = sign_in(&app, sam.id).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri(&format!("/api/v1/listings/{}", ListingId::random()))
            .cookie(cookie)
            .set_json(json!({"viewsCount": 1000}))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(error_code(&body), Some("invalid_request"));
}

#[rstest]
#[actix_web::test]
async fn selling_to_yourself_is_unprocessable() {
    let sam = user("sam_seller");
    let mut ports = MockPorts::default().signed_in_as(&sam);
    ports
        .listings
        .expect_edit()
        .returning(|_, _, _| Err(crate::domain::ListingError::SellerCannotBuy.into()));
    let app = actix_test::init_service(test_app(ports.into_state())).await;
    let cookie = sign_in(&app, sam.id).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri(&format!("/api/v1/listings/{}", ListingId::random()))
            .cookie(cookie)
            .set_json(json!({"buyerId": sam.id.to_string()}))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(error_code(&body), Some("invalid_transition"));
}

#[rstest]
#[actix_web::test]
async fn delete_of_a_foreign_listing_is_not_found() {
    let sam = user("sam_seller");
    let mut ports = MockPorts::default().signed_in_as(&sam);
    ports
        .listings
        .expect_delete()
        .returning(|_, _| Err(Error::not_found("listing not found")));
    let app = actix_test::init_service(test_app(ports.into_state())).await;
    let cookie = sign_in(&app, sam.id).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/listings/{}", ListingId::random()))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[rstest]
#[actix_web::test]
async fn delete_returns_no_content() {
    let sam = user("sam_seller");
    let mut ports = MockPorts::default().signed_in_as(&sam);
    ports.listings.expect_delete().times(1).returning(|_, _| Ok(()));
    let app = actix_test::init_service(test_app(ports.into_state())).await;
    let cookie = sign_in(&app, sam.id).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/listings/{}", ListingId::random()))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[rstest]
#[actix_web::test]
async fn add_images_rejects_escaping_paths() {
    let sam = user("sam_seller");
    let ports = MockPorts::default().signed_in_as(&sam);
    let app = actix_test::init_service(test_app(ports.into_state())).await;
    let cookie = sign_in(&app, sam.id).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/listings/{}/images", ListingId::random()))
            .cookie(cookie)
            .set_json(json!({"images": [{"imagePath": "../../etc/passwd"}]}))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(
        body.pointer("/details/field").and_then(Value::as_str),
        Some("imagePath")
    );
}

#[rstest]
#[actix_web::test]
async fn add_images_returns_created_rows() {
    let sam = user("sam_seller");
    let mut ports = MockPorts::default().signed_in_as(&sam);
    ports
        .listings
        .expect_add_images()
        .withf(|_: &Actor, _: &ListingId, uploads: &Vec<NewImage>| uploads.len() == 2)
        .returning(|_, listing_id, uploads| {
            Ok(uploads
                .into_iter()
                .enumerate()
                .map(|(index, upload)| ListingImage {
                    id: crate::domain::ImageId::random(),
                    listing_id,
                    image_path: upload.image_path,
                    thumbnail_path: upload.thumbnail_path,
                    display_order: i32::try_from(index).expect("small index"),
                    is_primary: index == 0,
                    created_at: fixture_now(),
                })
                .collect())
        });
    let app = actix_test::init_service(test_app(ports.into_state())).await;
    let cookie = sign_in(&app, sam.id).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/listings/{}/images", ListingId::random()))
            .cookie(cookie)
            .set_json(json!({"images": [
                {"imagePath": "listings/a.jpg", "thumbnailPath": "listings/a_thumb.jpg"},
                {"imagePath": "listings/b.jpg"}
            ]}))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body.as_array().map(Vec::len), Some(2));
}

#[rstest]
#[actix_web::test]
async fn remove_image_validates_both_ids() {
    let sam = user("sam_seller");
    let app = actix_test::init_service(test_app(MockPorts::default().into_state())).await;
    let cookie = sign_in(&app, sam.id).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/listings/{}/images/first", ListingId::random()))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(
        body.pointer("/details/field").and_then(Value::as_str),
        Some("imageId")
    );
}
