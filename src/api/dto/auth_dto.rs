//! Auth-related response DTOs.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{Role, UserId, UserRecord};

/// Public view of an account; the password hash never leaves the
/// domain record.
#[derive(Debug, Serialize)]
pub struct UserProfile {
    /// Account identifier.
    pub id: UserId,
    /// Login email.
    pub email: String,
    /// Display name.
    pub full_name: String,
    /// Account role.
    pub role: Role,
    /// Account creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<UserRecord> for UserProfile {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            email: record.email,
            full_name: record.full_name,
            role: record.role,
            created_at: record.created_at,
        }
    }
}

/// Response for `POST /auth/register` and `POST /auth/login`.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// Signed bearer token.
    pub token: String,
    /// The authenticated account.
    pub user: UserProfile,
}
