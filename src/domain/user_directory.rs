//! User account storage with email uniqueness.

use std::collections::HashMap;

use tokio::sync::RwLock;

use super::UserId;
use super::user::UserRecord;
use crate::error::ApiError;

/// Central store for user accounts.
///
/// Records are small and read-mostly, so unlike the event registry the
/// directory stores plain values and returns clones.
#[derive(Debug)]
pub struct UserDirectory {
    users: RwLock<HashMap<UserId, UserRecord>>,
    email_index: RwLock<HashMap<String, UserId>>,
}

impl UserDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            email_index: RwLock::new(HashMap::new()),
        }
    }

    /// Inserts a new account, enforcing email uniqueness.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Conflict`] when the email is already taken.
    pub async fn insert(&self, record: UserRecord) -> Result<UserId, ApiError> {
        let email = record.email.to_ascii_lowercase();
        let mut index = self.email_index.write().await;
        if index.contains_key(&email) {
            return Err(ApiError::Conflict("user already exists".to_string()));
        }
        let id = record.id;
        index.insert(email, id);
        drop(index);
        self.users.write().await.insert(id, record);
        Ok(id)
    }

    /// Fetches an account by id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::UserNotFound`] if absent.
    pub async fn get(&self, id: UserId) -> Result<UserRecord, ApiError> {
        let map = self.users.read().await;
        map.get(&id)
            .cloned()
            .ok_or_else(|| ApiError::UserNotFound(id.to_string()))
    }

    /// Fetches an account by email (case-insensitive).
    pub async fn find_by_email(&self, email: &str) -> Option<UserRecord> {
        let id = {
            let index = self.email_index.read().await;
            index.get(&email.to_ascii_lowercase()).copied()
        };
        match id {
            Some(id) => self.users.read().await.get(&id).cloned(),
            None => None,
        }
    }

    /// Returns the number of accounts.
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    /// Returns `true` if the directory is empty.
    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

impl Default for UserDirectory {
    fn default() -> Self {
        Self::new()
    }
}
