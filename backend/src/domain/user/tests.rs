//! Tests for the user account model.

use super::*;
use rstest::rstest;

#[rstest]
#[case("ab")]
#[case("   ab   ")]
#[case("")]
fn username_rejects_short_values(#[case] raw: &str) {
    assert_eq!(
        Username::new(raw),
        Err(UserValidationError::UsernameLength {
            min: USERNAME_MIN,
            max: USERNAME_MAX
        })
    );
}

#[rstest]
fn username_rejects_long_values() {
    let raw = "g".repeat(USERNAME_MAX + 1);
    assert!(Username::new(raw).is_err());
}

#[rstest]
fn username_is_trimmed() {
    let username = Username::new("  gator  ").expect("valid username");
    assert_eq!(username.as_str(), "gator");
}

#[rstest]
#[case("", UserValidationError::EmptyEmail)]
#[case("   ", UserValidationError::EmptyEmail)]
#[case("gator", UserValidationError::MalformedEmail)]
#[case("@sfsu.edu", UserValidationError::MalformedEmail)]
#[case("gator@", UserValidationError::MalformedEmail)]
#[case("ga tor@sfsu.edu", UserValidationError::MalformedEmail)]
#[case("a@b@sfsu.edu", UserValidationError::MalformedEmail)]
fn email_rejects_malformed_values(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(EmailAddress::new(raw), Err(expected));
}

#[rstest]
#[case("gator@sfsu.edu", true)]
#[case("gator@mail.sfsu.edu", true)]
#[case("gator@evil-sfsu.edu", false)]
#[case("gator@gmail.com", false)]
fn email_domain_membership(#[case] raw: &str, #[case] expected: bool) {
    let email = EmailAddress::new(raw).expect("valid email");
    assert_eq!(email.belongs_to_any(&["sfsu.edu", "MAIL.SFSU.EDU"]), expected);
}

#[rstest]
fn user_serialisation_omits_password_hash() {
    let user = User {
        id: UserId::random(),
        username: Username::new("gator").expect("username"),
        email: EmailAddress::new("gator@sfsu.edu").expect("email"),
        password_hash: "secret-hash".to_owned(),
        is_active: true,
        is_admin: false,
        created_at: Utc::now(),
    };

    let value = serde_json::to_value(&user).expect("serialise user");

    assert!(value.get("passwordHash").is_none());
    assert_eq!(value["username"], "gator");
    assert_eq!(value["isAdmin"], false);
}

#[rstest]
fn actor_reflects_admin_flag() {
    let id = UserId::random();
    assert!(Actor::admin(id).is_admin);
    assert!(!Actor::user(id).is_admin);
}

#[rstest]
#[case("")]
#[case("   ")]
fn user_search_rejects_blank_terms(#[case] raw: &str) {
    assert_eq!(
        UserSearch::parse(raw),
        Err(UserValidationError::SearchLength {
            max: USER_SEARCH_MAX
        })
    );
}

#[rstest]
#[case("GATOR", true)]
#[case("campus.edu", true)]
#[case("r_d", true)]
#[case("gmail", false)]
fn user_search_matches_username_or_email(#[case] raw: &str, #[case] expected: bool) {
    let user = crate::test_support::user("Gator_Dan");
    let search = UserSearch::parse(raw).expect("valid term");

    assert_eq!(search.matches(&user), expected);
}
