//! bcrypt password digests.
//!
//! Digests use the modular crypt format (`$2b$<cost>$...`), so the cost
//! travels with each digest and can be raised without invalidating
//! existing accounts.

use crate::domain::ports::{PasswordHashError, PasswordHasher};

/// Lowest cost bcrypt accepts.
pub const MIN_COST: u32 = 4;
/// Highest cost bcrypt accepts.
pub const MAX_COST: u32 = 31;

/// [`PasswordHasher`] backed by the `bcrypt` crate.
#[derive(Debug, Clone, Copy)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl BcryptPasswordHasher {
    /// `cost` is clamped to the range bcrypt accepts.
    pub fn new(cost: u32) -> Self {
        Self {
            cost: cost.clamp(MIN_COST, MAX_COST),
        }
    }
}

impl PasswordHasher for BcryptPasswordHasher {
    fn hash(&self, password: &str) -> Result<String, PasswordHashError> {
        bcrypt::hash(password, self.cost).map_err(|err| PasswordHashError::hash(err.to_string()))
    }

    fn verify(&self, password: &str, digest: &str) -> bool {
        bcrypt::verify(password, digest).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn hasher() -> BcryptPasswordHasher {
        BcryptPasswordHasher::new(MIN_COST)
    }

    #[rstest]
    fn verifies_its_own_digests(hasher: BcryptPasswordHasher) {
        let stored = hasher.hash("correct horse").expect("hash");

        assert!(stored.starts_with("$2b$04$"));
        assert!(hasher.verify("correct horse", &stored));
        assert!(!hasher.verify("wrong horse", &stored));
    }

    #[rstest]
    fn salts_differ_between_digests(hasher: BcryptPasswordHasher) {
        let first = hasher.hash("same").expect("hash");
        let second = hasher.hash("same").expect("hash");

        assert_ne!(first, second);
    }

    #[rstest]
    fn digests_keep_their_cost(hasher: BcryptPasswordHasher) {
        let stored = hasher.hash("portable").expect("hash");

        assert!(BcryptPasswordHasher::new(MIN_COST + 1).verify("portable", &stored));
    }

    #[rstest]
    #[case(0, MIN_COST)]
    #[case(40, MAX_COST)]
    fn cost_is_clamped(#[case] requested: u32, #[case] expected: u32) {
        assert_eq!(BcryptPasswordHasher::new(requested).cost, expected);
    }

    #[rstest]
    #[case::empty("")]
    #[case::foreign_scheme("sha256$1$00$00")]
    #[case::truncated("$2b$04$abc")]
    fn malformed_digests_never_verify(hasher: BcryptPasswordHasher, #[case] stored: &str) {
        assert!(!hasher.verify("anything", stored));
    }
}
