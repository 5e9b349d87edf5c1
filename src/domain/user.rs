//! User accounts and roles backing the access guard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::UserId;

/// Caller role resolved from a bearer credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Organizer: may create, mutate, and inspect owned events.
    Admin,
    /// Regular attendee.
    User,
}

impl Role {
    /// Returns `true` for the admin role.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// A stored user account.
///
/// The bcrypt hash never leaves this record; API responses use profile
/// DTOs instead.
#[derive(Debug, Clone)]
pub struct UserRecord {
    /// Unique account identifier.
    pub id: UserId,
    /// Login email, unique across the directory.
    pub email: String,
    /// Bcrypt password hash.
    pub password_hash: String,
    /// Display name.
    pub full_name: String,
    /// Account role.
    pub role: Role,
    /// Account creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// Creates a new account record.
    #[must_use]
    pub fn new(email: String, password_hash: String, full_name: String, role: Role) -> Self {
        Self {
            id: UserId::new(),
            email,
            password_hash,
            full_name,
            role,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn admin_role_is_admin() {
        assert!(Role::Admin.is_admin());
        assert!(!Role::User.is_admin());
    }

    #[test]
    fn role_serializes_snake_case() {
        let json = serde_json::to_value(Role::Admin).ok();
        assert_eq!(json, Some(serde_json::Value::String("admin".to_string())));
    }
}
