//! Driven port for password digests.

use super::define_port_error;

define_port_error! {
    /// Errors raised while hashing a password.
    pub enum PasswordHashError {
        /// The digest could not be produced.
        Hash { message: String } => "password hashing failed: {message}",
    }
}

/// One-way password hashing.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Produce a self-describing digest for storage.
    fn hash(&self, password: &str) -> Result<String, PasswordHashError>;

    /// Whether `password` matches `digest`. Malformed digests never match.
    fn verify(&self, password: &str, digest: &str) -> bool;
}
