//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpResponse, test, web};
use serde_json::Value;

use crate::domain::ports::{
    MockAccounts, MockCategoryQueries, MockInbox, MockListingCommand, MockListingQueries,
    MockModerationWorkflow, MockReviewEligibility, MockReviewQueries,
};
use crate::domain::{User, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::middleware::Trace;

/// Session middleware with a fresh key, cookie name `session` and `Secure`
/// disabled for plain-HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// The `session` cookie set by `response`.
pub fn session_cookie<B>(response: &ServiceResponse<B>) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(|cookie| cookie.into_owned())
        .expect("session cookie set")
}

async fn sign_in_route(session: SessionContext, path: web::Path<String>) -> ApiResult<HttpResponse> {
    let id = UserId::new(path.into_inner()).expect("test user id");
    session.persist_user(id)?;
    Ok(HttpResponse::Ok().finish())
}

/// The full `/api/v1` surface over `state`, plus a test-only sign-in route.
pub fn test_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .wrap(test_session_middleware())
        .wrap(Trace)
        .route("/__test/sign-in/{user_id}", web::post().to(sign_in_route))
        .service(web::scope("/api/v1").configure(super::configure))
}

/// Obtain a session cookie naming `user`.
pub async fn sign_in<S, B>(app: &S, user: UserId) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
{
    let request = test::TestRequest::post()
        .uri(&format!("/__test/sign-in/{user}"))
        .to_request();
    let response = test::call_service(app, request).await;
    session_cookie(&response)
}

/// `code` field of a JSON error body.
pub fn error_code(body: &Value) -> Option<&str> {
    body.get("code").and_then(Value::as_str)
}

/// Mocks for every port; tests set expectations before calling
/// [`MockPorts::into_state`].
#[derive(Default)]
pub struct MockPorts {
    pub accounts: MockAccounts,
    pub categories: MockCategoryQueries,
    pub listings: MockListingCommand,
    pub listings_query: MockListingQueries,
    pub moderation: MockModerationWorkflow,
    pub reviews: MockReviewEligibility,
    pub reviews_query: MockReviewQueries,
    pub inbox: MockInbox,
}

impl MockPorts {
    /// Resolve `user` whenever the session names it.
    pub fn signed_in_as(mut self, user: &User) -> Self {
        let resolved = user.clone();
        self.accounts
            .expect_current_user()
            .withf(move |candidate: &UserId| *candidate == resolved.id)
            .returning({
                let user = user.clone();
                move |_| Ok(user.clone())
            });
        self
    }

    pub fn into_state(self) -> HttpState {
        HttpState {
            accounts: Arc::new(self.accounts),
            categories: Arc::new(self.categories),
            listings: Arc::new(self.listings),
            listings_query: Arc::new(self.listings_query),
            moderation: Arc::new(self.moderation),
            reviews: Arc::new(self.reviews),
            reviews_query: Arc::new(self.reviews_query),
            inbox: Arc::new(self.inbox),
        }
    }
}
