//! Concurrent registration storage with per-record locking.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::registration::RegistrationRecord;
use super::{EventId, RegistrationId, UserId};
use crate::error::ApiError;

/// Central store for all registration records.
///
/// Same locking shape as [`super::EventRegistry`]: an outer map lock
/// plus per-record locks so independent registrations never contend.
#[derive(Debug)]
pub struct RegistrationLedger {
    records: RwLock<HashMap<RegistrationId, Arc<RwLock<RegistrationRecord>>>>,
}

impl RegistrationLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Inserts a new registration record.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Conflict`] on an ID collision (should never
    /// happen with UUID v4).
    pub async fn insert(&self, record: RegistrationRecord) -> Result<RegistrationId, ApiError> {
        let id = record.id;
        let mut map = self.records.write().await;
        if map.contains_key(&id) {
            return Err(ApiError::Conflict(format!(
                "registration {id} already exists"
            )));
        }
        map.insert(id, Arc::new(RwLock::new(record)));
        Ok(id)
    }

    /// Returns a shared reference to the record behind its lock.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::RegistrationNotFound`] if absent.
    pub async fn get(
        &self,
        id: RegistrationId,
    ) -> Result<Arc<RwLock<RegistrationRecord>>, ApiError> {
        let map = self.records.read().await;
        map.get(&id)
            .cloned()
            .ok_or(ApiError::RegistrationNotFound(id))
    }

    /// Returns snapshots of all registrations made by one user, oldest
    /// first.
    pub async fn list_for_user(&self, user_id: UserId) -> Vec<RegistrationRecord> {
        let mut records = self
            .filtered(|record| record.user_id == user_id)
            .await;
        records.sort_by_key(|r| r.registered_at);
        records
    }

    /// Returns snapshots of all registrations against one event, oldest
    /// first.
    pub async fn list_for_event(&self, event_id: EventId) -> Vec<RegistrationRecord> {
        let mut records = self
            .filtered(|record| record.event_id == event_id)
            .await;
        records.sort_by_key(|r| r.registered_at);
        records
    }

    /// Returns snapshots of every record in the ledger.
    pub async fn list_all(&self) -> Vec<RegistrationRecord> {
        self.filtered(|_| true).await
    }

    async fn filtered<F>(&self, keep: F) -> Vec<RegistrationRecord>
    where
        F: Fn(&RegistrationRecord) -> bool,
    {
        let map = self.records.read().await;
        let mut records = Vec::new();
        for entry_lock in map.values() {
            let record = entry_lock.read().await;
            if keep(&record) {
                records.push(record.clone());
            }
        }
        records
    }

    /// Returns the number of stored registrations.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Returns `true` if the ledger is empty.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl Default for RegistrationLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn make_record(event_id: EventId, user_id: UserId) -> RegistrationRecord {
        RegistrationRecord::new(event_id, user_id, serde_json::json!({}))
    }

    #[tokio::test]
    async fn insert_and_get() {
        let ledger = RegistrationLedger::new();
        let record = make_record(EventId::new(), UserId::new());
        let id = record.id;

        assert!(ledger.insert(record).await.is_ok());
        assert!(ledger.get(id).await.is_ok());
    }

    #[tokio::test]
    async fn get_nonexistent_returns_error() {
        let ledger = RegistrationLedger::new();
        let result = ledger.get(RegistrationId::new()).await;
        assert!(matches!(result, Err(ApiError::RegistrationNotFound(_))));
    }

    #[tokio::test]
    async fn list_for_user_filters_by_user() {
        let ledger = RegistrationLedger::new();
        let alice = UserId::new();
        let bob = UserId::new();
        let event = EventId::new();

        let _ = ledger.insert(make_record(event, alice)).await;
        let _ = ledger.insert(make_record(event, alice)).await;
        let _ = ledger.insert(make_record(event, bob)).await;

        assert_eq!(ledger.list_for_user(alice).await.len(), 2);
        assert_eq!(ledger.list_for_user(bob).await.len(), 1);
    }

    #[tokio::test]
    async fn list_for_event_filters_by_event() {
        let ledger = RegistrationLedger::new();
        let meetup = EventId::new();
        let workshop = EventId::new();

        let _ = ledger.insert(make_record(meetup, UserId::new())).await;
        let _ = ledger.insert(make_record(workshop, UserId::new())).await;
        let _ = ledger.insert(make_record(workshop, UserId::new())).await;

        assert_eq!(ledger.list_for_event(meetup).await.len(), 1);
        assert_eq!(ledger.list_for_event(workshop).await.len(), 2);
    }

    #[tokio::test]
    async fn len_counts_all_records() {
        let ledger = RegistrationLedger::new();
        assert!(ledger.is_empty().await);
        let _ = ledger.insert(make_record(EventId::new(), UserId::new())).await;
        assert_eq!(ledger.len().await, 1);
        assert_eq!(ledger.list_all().await.len(), 1);
    }
}
