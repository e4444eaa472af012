//! End-to-end marketplace journey over the in-memory gateway.
//!
//! A seller lists a textbook, an administrator approves it, the seller
//! records the sale, both parties review each other, and the buyer messages
//! the seller. Every step goes through the `/api/v1` surface with real
//! session cookies.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::test::{self as actix_test, TestRequest};
use actix_web::{App, web};
use marketplace::Trace;
use marketplace::domain::ports::NoopImageStorage;
use marketplace::domain::{
    AccountService, CategoryService, ListingService, MessagingService, ModerationService,
    Registration, ReviewService,
};
use marketplace::inbound::http;
use marketplace::inbound::http::state::HttpState;
use marketplace::outbound::memory::MemoryGateway;
use marketplace::outbound::security::BcryptPasswordHasher;
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

const PASSWORD: &str = "password123";

struct Marketplace {
    state: web::Data<HttpState>,
    key: Key,
}

#[fixture]
async fn seeded_market() -> Marketplace {
    let gateway = Arc::new(MemoryGateway::with_default_categories());
    let clock = Arc::new(DefaultClock);
    let accounts = Arc::new(AccountService::new(
        Arc::clone(&gateway),
        Arc::new(BcryptPasswordHasher::new(4)),
        clock.clone(),
        ["sfsu.edu".to_owned()],
    ));
    let admin = Registration::try_from_parts("moderator", "mod@sfsu.edu", PASSWORD, true)
        .expect("valid admin");
    accounts.ensure_admin(admin).await.expect("admin bootstrapped");

    let listings = Arc::new(ListingService::new(
        Arc::clone(&gateway),
        Arc::new(NoopImageStorage),
        clock.clone(),
    ));
    let reviews = Arc::new(ReviewService::new(Arc::clone(&gateway), clock.clone()));
    let messaging = Arc::new(MessagingService::new(Arc::clone(&gateway), clock.clone()));
    let moderation = Arc::new(ModerationService::new(
        Arc::clone(&gateway),
        messaging.clone(),
        clock,
    ));

    Marketplace {
        state: web::Data::new(HttpState {
            accounts,
            categories: Arc::new(CategoryService::new(gateway)),
            listings: listings.clone(),
            listings_query: listings,
            moderation,
            reviews: reviews.clone(),
            reviews_query: reviews,
            inbox: messaging,
        }),
        key: Key::generate(),
    }
}

async fn init(
    market: &Marketplace,
) -> impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error> {
    let session = SessionMiddleware::builder(CookieSessionStore::default(), market.key.clone())
        .cookie_name("session".into())
        .cookie_secure(false)
        .build();
    actix_test::init_service(
        App::new()
            .app_data(market.state.clone())
            .wrap(Trace)
            .service(web::scope("/api/v1").wrap(session).configure(http::configure)),
    )
    .await
}

async fn call<S>(
    app: &S,
    request: TestRequest,
    cookie: Option<&Cookie<'static>>,
) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let request = match cookie {
        Some(cookie) => request.cookie(cookie.clone()),
        None => request,
    };
    let response = actix_test::call_service(app, request.to_request()).await;
    let status = response.status();
    let body = actix_test::read_body(response).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("JSON body")
    };
    (status, value)
}

async fn register_and_login<S>(app: &S, username: &str) -> (String, Cookie<'static>)
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let email = format!("{username}@sfsu.edu");
    let (status, user) = call(
        app,
        TestRequest::post().uri("/api/v1/auth/register").set_json(json!({
            "username": username,
            "email": email,
            "password": PASSWORD,
            "termsAccepted": true
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register {username}: {user}");
    let id = user["id"].as_str().expect("user id").to_owned();
    let cookie = login(app, &email).await;
    (id, cookie)
}

async fn login<S>(app: &S, email: &str) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let request = TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({ "email": email, "password": PASSWORD }))
        .to_request();
    let response = actix_test::call_service(app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie")
}

#[rstest]
#[actix_web::test]
async fn listing_moves_from_draft_to_reviewed_sale(#[future] seeded_market: Marketplace) {
    let market = seeded_market.await;
    let app = init(&market).await;
    let (seller_id, seller) = register_and_login(&app, "seller").await;
    let (buyer_id, buyer) = register_and_login(&app, "buyer").await;
    let admin = login(&app, "mod@sfsu.edu").await;

    let (status, listing) = call(
        &app,
        TestRequest::post().uri("/api/v1/listings").set_json(json!({
            "title": "Calculus textbook",
            "description": "Lightly used, no highlighting.",
            "price": 45.0,
            "categoryId": 1,
            "itemCondition": "good"
        })),
        Some(&seller),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{listing}");
    assert_eq!(listing["status"], "pending_approval");
    let listing_id = listing["id"].as_str().expect("listing id").to_owned();

    let (_, hidden) = call(&app, TestRequest::get().uri("/api/v1/listings"), None).await;
    assert_eq!(hidden["total"], 0);

    let (status, _) = call(
        &app,
        TestRequest::get().uri(&format!("/api/v1/listings/{listing_id}")),
        Some(&buyer),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, pending) = call(
        &app,
        TestRequest::get().uri("/api/v1/admin/listings/pending"),
        Some(&admin),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pending.as_array().map(Vec::len), Some(1));

    let (status, approved) = call(
        &app,
        TestRequest::put().uri(&format!("/api/v1/admin/listings/{listing_id}/approve")),
        Some(&admin),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{approved}");
    assert_eq!(approved["status"], "approved");

    let (_, visible) = call(
        &app,
        TestRequest::get().uri("/api/v1/listings?q=calculus"),
        None,
    )
    .await;
    assert_eq!(visible["total"], 1);
    assert_eq!(visible["results"][0]["id"], listing_id.as_str());

    let (_, inbox) = call(
        &app,
        TestRequest::get().uri("/api/v1/messages/conversations"),
        Some(&seller),
    )
    .await;
    assert_eq!(inbox.as_array().map(Vec::len), Some(1), "moderation notice");

    let (status, early) = call(
        &app,
        TestRequest::post()
            .uri(&format!("/api/v1/listings/{listing_id}/reviews"))
            .set_json(json!({ "rating": 5 })),
        Some(&buyer),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{early}");

    let (status, sold) = call(
        &app,
        TestRequest::put()
            .uri(&format!("/api/v1/listings/{listing_id}"))
            .set_json(json!({ "status": "sold", "buyerId": buyer_id })),
        Some(&seller),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{sold}");
    assert_eq!(sold["status"], "sold");
    assert_eq!(sold["buyerId"], buyer_id.as_str());
    assert!(sold["soldAt"].is_string());

    let (status, review) = call(
        &app,
        TestRequest::post()
            .uri(&format!("/api/v1/listings/{listing_id}/reviews"))
            .set_json(json!({ "rating": 5, "comment": "Smooth handoff" })),
        Some(&buyer),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{review}");
    assert_eq!(review["revieweeId"], seller_id.as_str());

    let (status, _) = call(
        &app,
        TestRequest::post()
            .uri(&format!("/api/v1/listings/{listing_id}/reviews"))
            .set_json(json!({ "rating": 4 })),
        Some(&buyer),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = call(
        &app,
        TestRequest::post()
            .uri(&format!("/api/v1/listings/{listing_id}/review-buyer"))
            .set_json(json!({ "rating": 4 })),
        Some(&seller),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, flag) = call(
        &app,
        TestRequest::get().uri(&format!("/api/v1/listings/{listing_id}/has-buyer-reviewed")),
        Some(&buyer),
    )
    .await;
    assert_eq!(flag["hasReviewed"], true);

    let (_, about_seller) = call(
        &app,
        TestRequest::get().uri(&format!("/api/v1/users/{seller_id}/reviews")),
        None,
    )
    .await;
    assert_eq!(about_seller.as_array().map(Vec::len), Some(1));

    let review_id = review["id"].as_str().expect("review id");
    let (status, fetched) = call(
        &app,
        TestRequest::get().uri(&format!("/api/v1/reviews/{review_id}")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["comment"], "Smooth handoff");

    let (status, found) = call(
        &app,
        TestRequest::get().uri("/api/v1/users/search?q=SELL"),
        Some(&buyer),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{found}");
    assert_eq!(found, json!([{ "id": seller_id, "username": "seller" }]));
}

#[rstest]
#[actix_web::test]
async fn buyer_and_seller_exchange_messages(#[future] seeded_market: Marketplace) {
    let market = seeded_market.await;
    let app = init(&market).await;
    let (seller_id, seller) = register_and_login(&app, "seller").await;
    let (_, buyer) = register_and_login(&app, "buyer").await;
    let (_, outsider) = register_and_login(&app, "outsider").await;

    let (status, started) = call(
        &app,
        TestRequest::post()
            .uri("/api/v1/messages/conversations")
            .set_json(json!({ "recipientId": seller_id, "content": "Still available?" })),
        Some(&buyer),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{started}");
    let conversation_id = started["conversation"]["id"]
        .as_str()
        .expect("conversation id")
        .to_owned();
    let messages_uri = format!("/api/v1/messages/conversations/{conversation_id}/messages");

    let (status, _) = call(
        &app,
        TestRequest::post()
            .uri(&messages_uri)
            .set_json(json!({ "content": "Yes, want to meet at the library?" })),
        Some(&seller),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, thread) = call(&app, TestRequest::get().uri(&messages_uri), Some(&buyer)).await;
    let contents: Vec<&str> = thread
        .as_array()
        .expect("message list")
        .iter()
        .filter_map(|message| message["content"].as_str())
        .collect();
    assert_eq!(
        contents,
        ["Still available?", "Yes, want to meet at the library?"]
    );

    let (status, _) = call(&app, TestRequest::get().uri(&messages_uri), Some(&outsider)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[rstest]
#[actix_web::test]
async fn registration_is_limited_to_campus_domains(#[future] seeded_market: Marketplace) {
    let market = seeded_market.await;
    let app = init(&market).await;

    let (status, body) = call(
        &app,
        TestRequest::post().uri("/api/v1/auth/register").set_json(json!({
            "username": "visitor",
            "email": "visitor@gmail.com",
            "password": PASSWORD,
            "termsAccepted": true
        })),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
}
