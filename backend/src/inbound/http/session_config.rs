//! Cookie-session settings read from `SESSION_*` environment variables.
//!
//! | Variable                  | Debug build                 | Release build              |
//! |---------------------------|-----------------------------|----------------------------|
//! | `SESSION_KEY_FILE`        | ephemeral key if unreadable; at least 32 bytes | readable, at least 64 bytes |
//! | `SESSION_COOKIE_SECURE`   | defaults to `1`             | required                   |
//! | `SESSION_SAMESITE`        | defaults to `Lax`           | required; `None` needs `Secure` |
//! | `SESSION_ALLOW_EPHEMERAL` | defaults to `0`             | required, must be `0`      |
//!
//! Debug builds log a warning for every default they apply.

use std::path::PathBuf;

use actix_web::cookie::{Key, SameSite};
use mockable::Env;
use sha2::{Digest, Sha256};
use tracing::warn;
use zeroize::Zeroize;

const KEY_FILE_ENV: &str = "SESSION_KEY_FILE";
const COOKIE_SECURE_ENV: &str = "SESSION_COOKIE_SECURE";
const SAMESITE_ENV: &str = "SESSION_SAMESITE";
const ALLOW_EPHEMERAL_ENV: &str = "SESSION_ALLOW_EPHEMERAL";

const DEFAULT_KEY_PATH: &str = "/run/secrets/marketplace_session_key";
/// Shortest key file accepted by release builds.
pub const SESSION_KEY_MIN_LEN: usize = 64;
/// `Key::derive_from` panics below this length.
const KEY_DERIVE_MIN_LEN: usize = 32;
const FINGERPRINT_BYTES: usize = 8;

const BOOL_EXPECTED: &str = "1|0|true|false|yes|no";
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";

/// How strictly the settings are validated.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    Debug,
    Release,
}

impl BuildMode {
    /// The mode of the running binary.
    #[must_use]
    pub fn current() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn lenient(self) -> bool {
        self == Self::Debug
    }
}

/// Where the signing key came from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum KeySource {
    File(PathBuf),
    /// Generated at startup; sessions do not survive a restart.
    Ephemeral,
}

/// Validated cookie-session settings.
pub struct SessionSettings {
    pub key: Key,
    pub key_source: KeySource,
    pub cookie_secure: bool,
    pub same_site: SameSite,
}

/// Raised when the session environment is unusable.
#[derive(Debug, thiserror::Error)]
pub enum SessionConfigError {
    #[error("{name} must be set")]
    Missing { name: &'static str },
    #[error("{name}='{value}' is not one of {expected}")]
    Invalid {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("cannot read session key {path}: {source}")]
    KeyUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session key {path} has {length} bytes; at least {minimum} are required")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        minimum: usize,
    },
    #[error("SESSION_SAMESITE=None requires SESSION_COOKIE_SECURE=1")]
    InsecureSameSiteNone,
    #[error("SESSION_ALLOW_EPHEMERAL must be 0 in release builds")]
    EphemeralInRelease,
}

impl SessionSettings {
    /// Read and validate the `SESSION_*` variables.
    ///
    /// # Errors
    ///
    /// Release builds fail on any missing or malformed variable; debug builds
    /// fail only when nothing can be defaulted.
    pub fn from_env<E: Env>(env: &E, mode: BuildMode) -> Result<Self, SessionConfigError> {
        let cookie_secure = toggle(env, mode, COOKIE_SECURE_ENV, BOOL_EXPECTED, true, parse_bool)?;
        let same_site = toggle(
            env,
            mode,
            SAMESITE_ENV,
            SAMESITE_EXPECTED,
            SameSite::Lax,
            parse_same_site,
        )?;
        if same_site == SameSite::None && !cookie_secure {
            if !mode.lenient() {
                return Err(SessionConfigError::InsecureSameSiteNone);
            }
            warn!("SameSite=None without Secure; browsers will drop the cookie");
        }
        let allow_ephemeral =
            toggle(env, mode, ALLOW_EPHEMERAL_ENV, BOOL_EXPECTED, false, parse_bool)?;
        if allow_ephemeral && !mode.lenient() {
            return Err(SessionConfigError::EphemeralInRelease);
        }
        let (key, key_source) = load_key(env, mode, allow_ephemeral)?;

        Ok(Self {
            key,
            key_source,
            cookie_secure,
            same_site,
        })
    }

    /// Short hex digest of the signing key, safe to log.
    ///
    /// # Examples
    /// ```
    /// use actix_web::cookie::{Key, SameSite};
    /// use marketplace::inbound::http::session_config::{KeySource, SessionSettings};
    ///
    /// let settings = SessionSettings {
    ///     key: Key::derive_from(&[7; 64]),
    ///     key_source: KeySource::Ephemeral,
    ///     cookie_secure: true,
    ///     same_site: SameSite::Lax,
    /// };
    /// assert_eq!(settings.fingerprint().len(), 16);
    /// ```
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.key.signing());
        hex::encode(digest.iter().take(FINGERPRINT_BYTES).copied().collect::<Vec<u8>>())
    }
}

fn toggle<E: Env, T>(
    env: &E,
    mode: BuildMode,
    name: &'static str,
    expected: &'static str,
    fallback: T,
    parse: fn(&str) -> Option<T>,
) -> Result<T, SessionConfigError> {
    let Some(raw) = env.string(name) else {
        if mode.lenient() {
            warn!(variable = name, "not set; using development default");
            return Ok(fallback);
        }
        return Err(SessionConfigError::Missing { name });
    };
    match parse(raw.trim()) {
        Some(value) => Ok(value),
        None if mode.lenient() => {
            warn!(variable = name, value = %raw, "unrecognised; using development default");
            Ok(fallback)
        }
        None => Err(SessionConfigError::Invalid {
            name,
            value: raw,
            expected,
        }),
    }
}

fn load_key<E: Env>(
    env: &E,
    mode: BuildMode,
    allow_ephemeral: bool,
) -> Result<(Key, KeySource), SessionConfigError> {
    let path = PathBuf::from(
        env.string(KEY_FILE_ENV)
            .unwrap_or_else(|| DEFAULT_KEY_PATH.to_owned()),
    );
    let mut bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(source) if mode.lenient() || allow_ephemeral => {
            warn!(path = %path.display(), error = %source, "session key unreadable; generating an ephemeral key");
            return Ok((Key::generate(), KeySource::Ephemeral));
        }
        Err(source) => return Err(SessionConfigError::KeyUnreadable { path, source }),
    };
    let length = bytes.len();
    let minimum = if mode.lenient() {
        KEY_DERIVE_MIN_LEN
    } else {
        SESSION_KEY_MIN_LEN
    };
    if length < minimum {
        bytes.zeroize();
        return Err(SessionConfigError::KeyTooShort {
            path,
            length,
            minimum,
        });
    }
    let key = Key::derive_from(&bytes);
    bytes.zeroize();
    Ok((key, KeySource::File(path)))
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

fn parse_same_site(raw: &str) -> Option<SameSite> {
    match raw.to_ascii_lowercase().as_str() {
        "strict" => Some(SameSite::Strict),
        "lax" => Some(SameSite::Lax),
        "none" => Some(SameSite::None),
        _ => None,
    }
}
