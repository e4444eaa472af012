//! Driving port for registration, login and identity resolution.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, Registration, User, UserId, UserSearch};

/// Account lifecycle and session identity.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Accounts: Send + Sync {
    /// Create an active, non-admin account.
    async fn register(&self, registration: Registration) -> Result<User, Error>;

    /// Verify credentials; unknown, inactive or mismatched accounts are
    /// `unauthorized`.
    async fn authenticate(&self, credentials: LoginCredentials) -> Result<User, Error>;

    /// Resolve a session identity to an active user, or `unauthorized`.
    async fn current_user(&self, id: UserId) -> Result<User, Error>;

    /// Active users whose username or email contains the term, by username,
    /// at most [`USER_SEARCH_LIMIT`].
    async fn search_users(&self, query: UserSearch) -> Result<Vec<User>, Error>;
}

/// Result cap for [`Accounts::search_users`].
pub const USER_SEARCH_LIMIT: u32 = 10;
