//! User account model.

use chrono::{DateTime, Utc};
use serde::Serialize;

pub use super::ids::UserId;

/// Validation errors raised when building user value types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("username must be between {min} and {max} characters")]
    UsernameLength { min: usize, max: usize },
    #[error("email address must not be empty")]
    EmptyEmail,
    #[error("email address is malformed")]
    MalformedEmail,
    #[error("user search must be between 1 and {max} characters")]
    SearchLength { max: usize },
}

/// Minimum allowed username length once trimmed.
pub const USERNAME_MIN: usize = 3;
/// Maximum allowed username length once trimmed.
pub const USERNAME_MAX: usize = 50;

/// Public handle chosen at registration.
///
/// ## Invariants
/// - Trimmed of surrounding whitespace.
/// - Between [`USERNAME_MIN`] and [`USERNAME_MAX`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Trim and validate a username.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        let length = trimmed.chars().count();
        if !(USERNAME_MIN..=USERNAME_MAX).contains(&length) {
            return Err(UserValidationError::UsernameLength {
                min: USERNAME_MIN,
                max: USERNAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for Username {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lower-cased email address.
///
/// # Examples
/// ```
/// use marketplace::domain::EmailAddress;
///
/// let email = EmailAddress::new("  Gator@SFSU.edu ").expect("valid email");
/// assert_eq!(email.as_str(), "gator@sfsu.edu");
/// assert_eq!(email.domain(), "sfsu.edu");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Normalise and validate an email address.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let normalised = raw.as_ref().trim().to_lowercase();
        if normalised.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        let Some((local, domain)) = normalised.split_once('@') else {
            return Err(UserValidationError::MalformedEmail);
        };
        if local.is_empty()
            || domain.is_empty()
            || domain.contains('@')
            || normalised.chars().any(char::is_whitespace)
        {
            return Err(UserValidationError::MalformedEmail);
        }
        Ok(Self(normalised))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Portion after the `@`.
    pub fn domain(&self) -> &str {
        self.0
            .split_once('@')
            .map(|(_, domain)| domain)
            .unwrap_or_default()
    }

    /// Whether the address belongs to one of `allowed` domains.
    ///
    /// Matching is exact on the domain part, compared case-insensitively.
    pub fn belongs_to_any<S: AsRef<str>>(&self, allowed: &[S]) -> bool {
        let domain = self.domain();
        allowed
            .iter()
            .any(|candidate| candidate.as_ref().trim().eq_ignore_ascii_case(domain))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Maximum length of a user search term.
pub const USER_SEARCH_MAX: usize = 100;

/// Case-insensitive fragment of a username or email address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSearch(String);

impl UserSearch {
    /// Trim, lower-case and bound a search term.
    pub fn parse(raw: &str) -> Result<Self, UserValidationError> {
        let trimmed = raw.trim();
        let length = trimmed.chars().count();
        if length == 0 || length > USER_SEARCH_MAX {
            return Err(UserValidationError::SearchLength {
                max: USER_SEARCH_MAX,
            });
        }
        Ok(Self(trimmed.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Whether `user`'s username or email contains the term.
    pub fn matches(&self, user: &User) -> bool {
        user.username.as_str().to_lowercase().contains(&self.0)
            || user.email.as_str().contains(&self.0)
    }
}

/// Registered marketplace user.
///
/// The password hash never leaves the domain; serialisation skips it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub email: EmailAddress,
    #[serde(skip)]
    pub password_hash: String,
    pub is_active: bool,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// The authenticated actor this user acts as.
    pub fn actor(&self) -> Actor {
        Actor {
            id: self.id,
            is_admin: self.is_admin,
        }
    }
}

/// Authenticated caller passed explicitly into domain operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: UserId,
    pub is_admin: bool,
}

impl Actor {
    /// A regular, non-admin user.
    pub fn user(id: UserId) -> Self {
        Self {
            id,
            is_admin: false,
        }
    }

    /// An administrator.
    pub fn admin(id: UserId) -> Self {
        Self { id, is_admin: true }
    }
}

#[cfg(test)]
mod tests;
