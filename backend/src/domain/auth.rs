//! Authentication primitives: login credentials and registration requests.
//!
//! Constructors validate raw strings so handlers can hand the domain typed
//! values. Campus-domain membership is checked by the accounts service
//! because the allowed domains are configuration.

use zeroize::Zeroizing;

use super::user::{EmailAddress, UserValidationError, Username};

/// Minimum accepted password length.
pub const PASSWORD_MIN: usize = 8;

/// Domain error returned when login or registration values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialsValidationError {
    #[error(transparent)]
    User(#[from] UserValidationError),
    #[error("password must not be empty")]
    EmptyPassword,
    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },
    #[error("terms of service must be accepted")]
    TermsNotAccepted,
}

/// Validated login credentials.
///
/// ## Invariants
/// - `email` is trimmed and lower-cased.
/// - `password` is non-empty and keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use marketplace::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("Gator@SFSU.edu", "hunter22")
///     .expect("valid credentials");
/// assert_eq!(creds.email().as_str(), "gator@sfsu.edu");
/// assert_eq!(creds.password(), "hunter22");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialsValidationError> {
        let email = EmailAddress::new(email)?;
        if password.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated self-service registration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    username: Username,
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl Registration {
    /// Validate the registration form.
    pub fn try_from_parts(
        username: &str,
        email: &str,
        password: &str,
        terms_accepted: bool,
    ) -> Result<Self, CredentialsValidationError> {
        let username = Username::new(username)?;
        let email = EmailAddress::new(email)?;
        if password.chars().count() < PASSWORD_MIN {
            return Err(CredentialsValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        if !terms_accepted {
            return Err(CredentialsValidationError::TermsNotAccepted);
        }
        Ok(Self {
            username,
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}
