//! Strongly typed UUID identifiers for marketplace entities.

use std::fmt;

/// Validation errors raised when parsing an identifier from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdValidationError {
    /// The input was empty.
    #[error("{kind} must not be empty")]
    Empty { kind: &'static str },
    /// The input was not a canonical UUID.
    #[error("{kind} must be a valid UUID")]
    Invalid { kind: &'static str },
}

macro_rules! define_uuid_id {
    ($(#[$meta:meta])* $name:ident => $kind:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
            serde::Serialize, serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(uuid::Uuid);

        impl $name {
            /// Validate and construct an identifier from text.
            pub fn new(id: impl AsRef<str>) -> Result<Self, IdValidationError> {
                let raw = id.as_ref();
                if raw.is_empty() {
                    return Err(IdValidationError::Empty { kind: $kind });
                }
                if raw.trim() != raw {
                    return Err(IdValidationError::Invalid { kind: $kind });
                }
                uuid::Uuid::parse_str(raw)
                    .map(Self)
                    .map_err(|_| IdValidationError::Invalid { kind: $kind })
            }

            /// Generate a fresh random identifier.
            #[must_use]
            pub fn random() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            #[must_use]
            pub const fn from_uuid(id: uuid::Uuid) -> Self {
                Self(id)
            }

            /// Access the underlying UUID.
            #[must_use]
            pub fn as_uuid(&self) -> &uuid::Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl std::str::FromStr for $name {
            type Err = IdValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl From<uuid::Uuid> for $name {
            fn from(value: uuid::Uuid) -> Self {
                Self(value)
            }
        }
    };
}

define_uuid_id!(
    /// Stable user identifier.
    UserId => "user id"
);
define_uuid_id!(
    /// Stable listing identifier.
    ListingId => "listing id"
);
define_uuid_id!(
    /// Stable listing image identifier.
    ImageId => "image id"
);
define_uuid_id!(
    /// Stable review identifier.
    ReviewId => "review id"
);
define_uuid_id!(
    /// Stable conversation identifier.
    ConversationId => "conversation id"
);
define_uuid_id!(
    /// Stable message identifier.
    MessageId => "message id"
);
