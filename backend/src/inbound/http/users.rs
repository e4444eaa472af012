//! Account and user handlers.
//!
//! ```text
//! POST /api/v1/auth/register {"username":"gator_dan","email":"dan@sfsu.edu",...}
//! POST /api/v1/auth/login {"email":"dan@sfsu.edu","password":"..."}
//! POST /api/v1/auth/logout
//! GET  /api/v1/users/me
//! GET  /api/v1/users/search?q=gator
//! GET  /api/v1/users/{user_id}/reviews
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use utoipa::ToSchema;

use crate::domain::{
    CredentialsValidationError, Error, LoginCredentials, Registration, UserId, UserSearch,
    UserValidationError,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{current_actor, current_user};
use crate::inbound::http::dto::{ReviewResponse, UserResponse, UserSummaryResponse};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id};

/// Registration form for `POST /api/v1/auth/register`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[schema(example = "gator_dan")]
    pub username: String,
    #[schema(example = "dan@sfsu.edu")]
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub terms_accepted: bool,
}

impl TryFrom<RegisterRequest> for Registration {
    type Error = CredentialsValidationError;

    fn try_from(value: RegisterRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(
            &value.username,
            &value.email,
            &value.password,
            value.terms_accepted,
        )
    }
}

/// Login request body for `POST /api/v1/auth/login`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[schema(example = "dan@sfsu.edu")]
    pub email: String,
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = CredentialsValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.email, &value.password)
    }
}

/// Query string for `GET /api/v1/users/search`.
#[derive(Debug, Deserialize)]
pub struct UserSearchParams {
    #[serde(default)]
    q: String,
}

#[derive(Debug, Deserialize)]
struct UserPath {
    user_id: String,
}

fn map_credentials_error(err: CredentialsValidationError) -> Error {
    let (field, code) = match &err {
        CredentialsValidationError::User(UserValidationError::UsernameLength { .. }) => {
            ("username", "invalid_username")
        }
        CredentialsValidationError::User(_) => ("email", "invalid_email"),
        CredentialsValidationError::EmptyPassword => ("password", "empty_password"),
        CredentialsValidationError::PasswordTooShort { .. } => ("password", "password_too_short"),
        CredentialsValidationError::TermsNotAccepted => ("termsAccepted", "terms_not_accepted"),
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field, "code": code }))
}

/// Create an account. The caller is not signed in by registering.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Username or email taken", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let registration =
        Registration::try_from(payload.into_inner()).map_err(map_credentials_error)?;
    let user = state.accounts.register(registration).await?;
    info!(user_id = %user.id, "account registered");
    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = UserResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_credentials_error)?;
    let user = state.accounts.authenticate(credentials).await?;
    session.persist_user(user.id)?;
    Ok(web::Json(UserResponse::from(user)))
}

/// End the session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses((status = 204, description = "Signed out")),
    tags = ["auth"],
    operation_id = "logout",
    security([])
)]
#[post("/auth/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.purge();
    HttpResponse::NoContent().finish()
}

/// The signed-in user.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/me")]
pub async fn current_user_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UserResponse>> {
    let user = current_user(&state, &session).await?;
    Ok(web::Json(UserResponse::from(user)))
}

/// Active users whose username or email contains `q`, by username.
#[utoipa::path(
    get,
    path = "/api/v1/users/search",
    params(("q" = String, Query, description = "Text to look for in usernames and emails")),
    responses(
        (status = 200, description = "At most ten matching users", body = [UserSummaryResponse]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "searchUsers"
)]
#[get("/users/search")]
pub async fn search_users(
    state: web::Data<HttpState>,
    session: SessionContext,
    params: web::Query<UserSearchParams>,
) -> ApiResult<web::Json<Vec<UserSummaryResponse>>> {
    current_actor(&state, &session).await?;
    let query = UserSearch::parse(&params.q).map_err(|err| {
        Error::invalid_request(err.to_string())
            .with_details(json!({ "field": "q", "code": "invalid_search" }))
    })?;
    let users = state.accounts.search_users(query).await?;
    Ok(web::Json(users.into_iter().map(Into::into).collect()))
}

/// Reviews written about a user, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/reviews",
    params(("user_id" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Reviews about the user", body = [ReviewResponse]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "userReviews",
    security([])
)]
#[get("/users/{user_id}/reviews")]
pub async fn user_reviews(
    state: web::Data<HttpState>,
    path: web::Path<UserPath>,
) -> ApiResult<web::Json<Vec<ReviewResponse>>> {
    let user_id: UserId = parse_id(&path.user_id, FieldName::new("userId"))?;
    let reviews = state.reviews_query.about_user(user_id).await?;
    Ok(web::Json(reviews.into_iter().map(Into::into).collect()))
}
