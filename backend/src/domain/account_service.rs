//! Account registration, authentication and session identity.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tokio::sync::OnceCell;
use tracing::info;
use zeroize::Zeroizing;

use crate::domain::ports::{
    Accounts, PasswordHasher, PersistenceGateway, USER_SEARCH_LIMIT, UnitOfWork,
};
use crate::domain::{Error, LoginCredentials, Registration, User, UserId, UserSearch};

/// Verified against when no account matches the email.
const DECOY_PASSWORD: &str = "no account carries this password";

fn invalid_credentials() -> Error {
    Error::unauthorized("invalid email or password")
}

/// Accounts service implementing [`Accounts`].
///
/// Hashing runs on the blocking pool.
#[derive(Clone)]
pub struct AccountService<G> {
    gateway: Arc<G>,
    hasher: Arc<dyn PasswordHasher>,
    clock: Arc<dyn Clock>,
    allowed_domains: Arc<[String]>,
    decoy: Arc<OnceCell<String>>,
}

impl<G> AccountService<G> {
    /// `allowed_domains` lists the email domains accepted at registration.
    pub fn new(
        gateway: Arc<G>,
        hasher: Arc<dyn PasswordHasher>,
        clock: Arc<dyn Clock>,
        allowed_domains: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            gateway,
            hasher,
            clock,
            allowed_domains: allowed_domains.into_iter().collect(),
            decoy: Arc::new(OnceCell::new()),
        }
    }

    async fn run_hasher<T, F>(&self, job: F) -> Result<T, Error>
    where
        T: Send + 'static,
        F: FnOnce(&dyn PasswordHasher) -> T + Send + 'static,
    {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || job(hasher.as_ref()))
            .await
            .map_err(|err| Error::internal(format!("password hashing task failed: {err}")))
    }

    async fn hash_password(&self, password: &str) -> Result<String, Error> {
        let password = Zeroizing::new(password.to_owned());
        self.run_hasher(move |hasher| hasher.hash(&password))
            .await?
            .map_err(|err| Error::internal(err.to_string()))
    }

    async fn verify_password(&self, password: &str, digest: String) -> Result<bool, Error> {
        let password = Zeroizing::new(password.to_owned());
        self.run_hasher(move |hasher| hasher.verify(&password, &digest))
            .await
    }

    async fn decoy_digest(&self) -> Result<String, Error> {
        self.decoy
            .get_or_try_init(|| self.hash_password(DECOY_PASSWORD))
            .await
            .cloned()
    }

    fn build_user(
        &self,
        registration: &Registration,
        password_hash: String,
        is_admin: bool,
    ) -> User {
        User {
            id: UserId::random(),
            username: registration.username().clone(),
            email: registration.email().clone(),
            password_hash,
            is_active: true,
            is_admin,
            created_at: self.clock.utc(),
        }
    }
}

async fn ensure_unique(uow: &mut dyn UnitOfWork, registration: &Registration) -> Result<(), Error> {
    if uow.user_by_username(registration.username()).await?.is_some() {
        return Err(Error::conflict("username is already taken"));
    }
    if uow.user_by_email(registration.email()).await?.is_some() {
        return Err(Error::conflict("email is already registered"));
    }
    Ok(())
}

impl<G> AccountService<G>
where
    G: PersistenceGateway,
{
    /// Create the configured administrator unless the email is already
    /// registered. Returns whether an account was created.
    pub async fn ensure_admin(&self, registration: Registration) -> Result<bool, Error> {
        let mut uow = self.gateway.begin().await?;
        let existing = uow.user_by_email(registration.email()).await?;
        uow.commit().await?;
        if existing.is_some() {
            return Ok(false);
        }

        let password_hash = self.hash_password(registration.password()).await?;
        let admin = self.build_user(&registration, password_hash, true);
        let mut uow = self.gateway.begin().await?;
        ensure_unique(uow.as_mut(), &registration).await?;
        uow.insert_user(&admin).await?;
        uow.commit().await?;
        info!(user = %admin.id, "bootstrap administrator created");
        Ok(true)
    }
}

#[async_trait]
impl<G> Accounts for AccountService<G>
where
    G: PersistenceGateway,
{
    async fn register(&self, registration: Registration) -> Result<User, Error> {
        if !registration.email().belongs_to_any(&self.allowed_domains) {
            return Err(Error::invalid_request(format!(
                "email must belong to one of: {}",
                self.allowed_domains.join(", ")
            )));
        }

        let password_hash = self.hash_password(registration.password()).await?;
        let user = self.build_user(&registration, password_hash, false);
        let mut uow = self.gateway.begin().await?;
        ensure_unique(uow.as_mut(), &registration).await?;
        uow.insert_user(&user).await?;
        uow.commit().await?;

        info!(user = %user.id, "account registered");
        Ok(user)
    }

    async fn authenticate(&self, credentials: LoginCredentials) -> Result<User, Error> {
        let mut uow = self.gateway.begin().await?;
        let user = uow.user_by_email(credentials.email()).await?;
        uow.commit().await?;

        let digest = match &user {
            Some(user) => user.password_hash.clone(),
            None => self.decoy_digest().await?,
        };
        let matches = self.verify_password(credentials.password(), digest).await?;
        let user = user.filter(|_| matches).ok_or_else(invalid_credentials)?;
        if !user.is_active {
            return Err(Error::unauthorized("account is inactive"));
        }
        Ok(user)
    }

    async fn current_user(&self, id: UserId) -> Result<User, Error> {
        let mut uow = self.gateway.begin().await?;
        let user = uow.user(id).await?;
        uow.commit().await?;
        user.filter(|user| user.is_active)
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    async fn search_users(&self, query: UserSearch) -> Result<Vec<User>, Error> {
        let mut uow = self.gateway.begin().await?;
        let users = uow.search_users(&query, USER_SEARCH_LIMIT).await?;
        uow.commit().await?;
        Ok(users)
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
