//! Tests for account registration and authentication.

use super::*;
use crate::domain::ports::MockPasswordHasher;
use crate::domain::ErrorCode;
use crate::outbound::memory::MemoryGateway;
use crate::test_support::{fixture_clock, user};
use rstest::{fixture, rstest};

const PASSWORD: &str = "correct horse";

/// Hasher that "hashes" by prefixing, so verification is predictable.
fn hasher() -> MockPasswordHasher {
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .returning(|password| Ok(format!("hashed:{password}")));
    hasher
        .expect_verify()
        .returning(|password, digest| digest == format!("hashed:{password}"));
    hasher
}

struct Harness {
    gateway: Arc<MemoryGateway>,
    service: AccountService<MemoryGateway>,
}

#[fixture]
fn harness() -> Harness {
    let gateway = Arc::new(MemoryGateway::new());
    let service = AccountService::new(
        Arc::clone(&gateway),
        Arc::new(hasher()),
        fixture_clock(),
        ["campus.edu".to_owned()],
    );
    Harness { gateway, service }
}

fn registration(username: &str, email: &str) -> Registration {
    Registration::try_from_parts(username, email, PASSWORD, true).expect("valid registration")
}

fn credentials(email: &str, password: &str) -> LoginCredentials {
    LoginCredentials::try_from_parts(email, password).expect("valid credentials")
}

#[rstest]
#[tokio::test]
async fn register_creates_active_non_admin(harness: Harness) {
    let created = harness
        .service
        .register(registration("alice", "Alice@Campus.edu"))
        .await
        .expect("register");

    assert!(created.is_active);
    assert!(!created.is_admin);
    assert_eq!(created.email.as_str(), "alice@campus.edu");
    assert_eq!(created.password_hash, format!("hashed:{PASSWORD}"));
}

#[rstest]
#[tokio::test]
async fn register_rejects_foreign_domains(harness: Harness) {
    let err = harness
        .service
        .register(registration("alice", "alice@gmail.com"))
        .await
        .expect_err("foreign domain");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[case::username("alice", "other@campus.edu")]
#[case::email("someone", "alice@campus.edu")]
#[tokio::test]
async fn register_rejects_duplicates(
    harness: Harness,
    #[case] username: &str,
    #[case] email: &str,
) {
    harness
        .service
        .register(registration("alice", "alice@campus.edu"))
        .await
        .expect("first");

    let err = harness
        .service
        .register(registration(username, email))
        .await
        .expect_err("duplicate");

    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn authenticate_accepts_the_right_password(harness: Harness) {
    let created = harness
        .service
        .register(registration("alice", "alice@campus.edu"))
        .await
        .expect("register");

    let signed_in = harness
        .service
        .authenticate(credentials("ALICE@campus.edu", PASSWORD))
        .await
        .expect("login");

    assert_eq!(signed_in.id, created.id);
}

#[rstest]
#[case::wrong_password("alice@campus.edu", "not the password")]
#[case::unknown_email("nobody@campus.edu", PASSWORD)]
#[tokio::test]
async fn authenticate_hides_which_part_was_wrong(
    harness: Harness,
    #[case] email: &str,
    #[case] password: &str,
) {
    harness
        .service
        .register(registration("alice", "alice@campus.edu"))
        .await
        .expect("register");

    let err = harness
        .service
        .authenticate(credentials(email, password))
        .await
        .expect_err("rejected");

    assert_eq!(err.code(), ErrorCode::Unauthorized);
    assert_eq!(err.message(), "invalid email or password");
}

#[rstest]
#[tokio::test]
async fn inactive_accounts_cannot_sign_in_or_resume(harness: Harness) {
    let mut dormant = user("dormant");
    dormant.password_hash = format!("hashed:{PASSWORD}");
    dormant.is_active = false;
    harness.gateway.seed(dormant.clone()).expect("seed");

    let err = harness
        .service
        .authenticate(credentials("dormant@campus.edu", PASSWORD))
        .await
        .expect_err("inactive");
    assert_eq!(err.message(), "account is inactive");

    let err = harness
        .service
        .current_user(dormant.id)
        .await
        .expect_err("inactive session");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[rstest]
#[tokio::test]
async fn current_user_for_unknown_id_requires_login(harness: Harness) {
    let err = harness
        .service
        .current_user(UserId::random())
        .await
        .expect_err("unknown");

    assert_eq!(err.code(), ErrorCode::Unauthorized);
    assert_eq!(err.message(), "login required");
}

#[rstest]
#[tokio::test]
async fn ensure_admin_is_idempotent(harness: Harness) {
    let bootstrap = registration("root_admin", "admin@campus.edu");

    assert!(harness.service.ensure_admin(bootstrap.clone()).await.expect("first"));
    assert!(!harness.service.ensure_admin(bootstrap).await.expect("second"));

    let admin = harness
        .service
        .authenticate(credentials("admin@campus.edu", PASSWORD))
        .await
        .expect("admin login");
    assert!(admin.is_admin);
}

#[rstest]
#[tokio::test]
async fn hashing_failure_is_internal() {
    let mut failing = MockPasswordHasher::new();
    failing
        .expect_hash()
        .returning(|_| Err(crate::domain::ports::PasswordHashError::hash("rng unavailable")));
    let service = AccountService::new(
        Arc::new(MemoryGateway::new()),
        Arc::new(failing),
        fixture_clock(),
        ["campus.edu".to_owned()],
    );

    let err = service
        .register(registration("alice", "alice@campus.edu"))
        .await
        .expect_err("hash failure");

    assert_eq!(err.code(), ErrorCode::InternalError);
}

#[rstest]
#[tokio::test]
async fn unknown_emails_still_pay_for_a_verification() {
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .times(1)
        .returning(|password| Ok(format!("hashed:{password}")));
    hasher
        .expect_verify()
        .withf(|_, digest| digest.starts_with("hashed:"))
        .times(2)
        .returning(|_, _| false);
    let service = AccountService::new(
        Arc::new(MemoryGateway::new()),
        Arc::new(hasher),
        fixture_clock(),
        ["campus.edu".to_owned()],
    );

    for _ in 0..2 {
        let err = service
            .authenticate(credentials("ghost@campus.edu", PASSWORD))
            .await
            .expect_err("no such account");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }
}

#[rstest]
#[tokio::test]
async fn user_search_matches_active_accounts_by_username(harness: Harness) {
    let mut dormant = user("alfred");
    dormant.is_active = false;
    for account in [user("alice"), user("albert"), user("bob"), dormant] {
        harness.gateway.seed(account).expect("seed");
    }

    let found = harness
        .service
        .search_users(UserSearch::parse("AL").expect("term"))
        .await
        .expect("search");

    let names: Vec<_> = found.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, ["albert", "alice"]);
}

#[rstest]
#[tokio::test]
async fn user_search_is_capped(harness: Harness) {
    for n in 0..15 {
        harness.gateway.seed(user(&format!("gator{n:02}"))).expect("seed");
    }

    let found = harness
        .service
        .search_users(UserSearch::parse("campus.edu").expect("term"))
        .await
        .expect("search");

    assert_eq!(found.len(), USER_SEARCH_LIMIT as usize);
}
