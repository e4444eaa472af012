//! Marketplace settings loaded via OrthoConfig.
//!
//! Every field may come from the command line, a configuration file or a
//! `MARKETPLACE_*` environment variable. Session cookie settings are read
//! separately by [`marketplace::inbound::http::session_config`].

use std::net::SocketAddr;
use std::path::PathBuf;

use actix_web::cookie::{Key, SameSite};
use marketplace::domain::{CredentialsValidationError, Registration};
use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_POOL_SIZE: u32 = 10;
const DEFAULT_ALLOWED_DOMAINS: &str = "sfsu.edu,mail.sfsu.edu";

/// Process-level configuration for the marketplace server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "MARKETPLACE")]
pub struct MarketplaceSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; the in-memory store is used when absent.
    pub database_url: Option<String>,
    /// Maximum pooled database connections.
    pub pool_size: Option<u32>,
    /// Directory holding uploaded listing images.
    pub image_root: Option<PathBuf>,
    /// Comma-separated email domains accepted at registration.
    pub allowed_domains: Option<String>,
    pub admin_username: Option<String>,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

/// Raised when configured values cannot be used.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address '{value}': {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("bootstrap admin needs username, email and password together")]
    PartialAdmin,
    #[error("bootstrap admin is invalid: {0}")]
    Admin(#[from] CredentialsValidationError),
}

impl MarketplaceSettings {
    /// Parsed listen address, defaulting to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    pub fn pool_size(&self) -> u32 {
        self.pool_size.unwrap_or(DEFAULT_POOL_SIZE)
    }

    /// Lower-cased registration domains with blanks dropped.
    pub fn allowed_domains(&self) -> Vec<String> {
        self.allowed_domains
            .as_deref()
            .unwrap_or(DEFAULT_ALLOWED_DOMAINS)
            .split(',')
            .map(|domain| domain.trim().to_ascii_lowercase())
            .filter(|domain| !domain.is_empty())
            .collect()
    }

    /// The bootstrap administrator, if one is configured.
    ///
    /// Supplying only some of the three admin fields is an error.
    pub fn admin_registration(&self) -> Result<Option<Registration>, SettingsError> {
        match (
            self.admin_username.as_deref(),
            self.admin_email.as_deref(),
            self.admin_password.as_deref(),
        ) {
            (None, None, None) => Ok(None),
            (Some(username), Some(email), Some(password)) => Ok(Some(
                Registration::try_from_parts(username, email, password, true)?,
            )),
            _ => Err(SettingsError::PartialAdmin),
        }
    }
}

/// Everything [`super::create_server`] needs besides the HTTP state.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
}

impl ServerConfig {
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
        }
    }
}
