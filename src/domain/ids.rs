//! Type-safe identifiers for domain entities.
//!
//! Each entity gets its own newtype wrapper around [`uuid::Uuid`] (v4)
//! so that, for example, an event identifier can never be passed where a
//! registration identifier is expected. [`ShareId`] is the one non-UUID
//! identifier: an unguessable token granting public read access to a
//! single event.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(uuid::Uuid);

        impl $name {
            /// Creates a new random identifier (UUID v4).
            #[must_use]
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            /// Creates an identifier from an existing [`uuid::Uuid`].
            #[must_use]
            pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner [`uuid::Uuid`].
            #[must_use]
            pub const fn as_uuid(&self) -> &uuid::Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<uuid::Uuid> for $name {
            fn from(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for uuid::Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

uuid_id! {
    /// Unique identifier for an event.
    ///
    /// Generated at creation time and immutable thereafter. Used as the
    /// dictionary key in [`super::EventRegistry`].
    EventId
}

uuid_id! {
    /// Unique identifier for a registration record.
    RegistrationId
}

uuid_id! {
    /// Unique identifier for a user account.
    UserId
}

uuid_id! {
    /// Opaque identifier for a stored binary object.
    ///
    /// A `BlobId` is minted by [`crate::blob::BlobStore::put`] and is the
    /// only handle callers ever hold on uploaded bytes.
    BlobId
}

/// Unguessable public token for unauthenticated event reads.
///
/// Derived from a high-entropy random source (a v4 UUID rendered as 32
/// hex characters), never sequential, generated once at event creation
/// and preserved across updates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShareId(String);

impl ShareId {
    /// Generates a fresh share token.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    /// Returns the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShareId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ShareId {
    fn from(token: String) -> Self {
        Self(token)
    }
}
