//! Concurrent event storage with per-event fine-grained locking.
//!
//! [`EventRegistry`] stores all events in a `HashMap` where each entry
//! is individually protected by a [`tokio::sync::RwLock`]. A secondary
//! index maps share tokens to event ids for public lookups.
//!
//! The registry is the *only* mutation path for the
//! `current_attendees` counter: [`EventRegistry::reserve_slot`] checks
//! and increments inside one per-event write-lock critical section, and
//! [`EventRegistry::release_slot`] is the compensation used when a
//! later step of registration fails.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::EventId;
use super::event::EventRecord;
use crate::error::ApiError;

/// Central store for all events.
///
/// Uses a `RwLock<HashMap<...>>` for the outer map and per-entry
/// `Arc<RwLock<EventRecord>>` for fine-grained per-event locking.
///
/// # Concurrency
///
/// - Multiple tasks may read the same event concurrently.
/// - Writes to different events are concurrent.
/// - Writes to the same event are serialized, which is what makes
///   `reserve_slot` an atomic check-then-increment.
#[derive(Debug)]
pub struct EventRegistry {
    events: RwLock<HashMap<EventId, Arc<RwLock<EventRecord>>>>,
    share_index: RwLock<HashMap<String, EventId>>,
}

impl EventRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: RwLock::new(HashMap::new()),
            share_index: RwLock::new(HashMap::new()),
        }
    }

    /// Inserts a new event, indexing its share token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Conflict`] if an event with the same ID
    /// already exists (should never happen with UUID v4).
    pub async fn insert(&self, record: EventRecord) -> Result<EventId, ApiError> {
        let event_id = record.id;
        let share = record.share_id.as_str().to_string();
        let mut map = self.events.write().await;
        if map.contains_key(&event_id) {
            return Err(ApiError::Conflict(format!(
                "event {event_id} already exists"
            )));
        }
        map.insert(event_id, Arc::new(RwLock::new(record)));
        drop(map);
        self.share_index.write().await.insert(share, event_id);
        Ok(event_id)
    }

    /// Returns a shared reference to the event entry behind its lock.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::EventNotFound`] if no event with the given
    /// ID exists.
    pub async fn get(&self, event_id: EventId) -> Result<Arc<RwLock<EventRecord>>, ApiError> {
        let map = self.events.read().await;
        map.get(&event_id)
            .cloned()
            .ok_or(ApiError::EventNotFound(event_id))
    }

    /// Resolves a share token to the event entry.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ShareNotFound`] when no event carries the
    /// token.
    pub async fn get_by_share_id(
        &self,
        share_id: &str,
    ) -> Result<Arc<RwLock<EventRecord>>, ApiError> {
        let event_id = {
            let index = self.share_index.read().await;
            index.get(share_id).copied()
        };
        match event_id {
            Some(id) => self.get(id).await,
            None => Err(ApiError::ShareNotFound(share_id.to_string())),
        }
    }

    /// Removes an event, returning a snapshot of its final state.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::EventNotFound`] if no event with the given
    /// ID exists.
    pub async fn remove(&self, event_id: EventId) -> Result<EventRecord, ApiError> {
        let arc = {
            let mut map = self.events.write().await;
            map.remove(&event_id)
                .ok_or(ApiError::EventNotFound(event_id))?
        };
        let record = arc.read().await.clone();
        self.share_index
            .write()
            .await
            .remove(record.share_id.as_str());
        Ok(record)
    }

    /// Returns snapshots of all events.
    pub async fn list(&self) -> Vec<EventRecord> {
        let map = self.events.read().await;
        let mut records = Vec::with_capacity(map.len());
        for entry_lock in map.values() {
            records.push(entry_lock.read().await.clone());
        }
        records
    }

    /// Atomically consumes one capacity slot.
    ///
    /// The capacity check and the increment happen under the same
    /// per-event write lock, so under N concurrent reservations against
    /// K free slots exactly K succeed.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::EventNotFound`] if the event is gone and
    /// [`ApiError::Capacity`] when `current_attendees` has reached
    /// `max_attendees`.
    pub async fn reserve_slot(&self, event_id: EventId) -> Result<(), ApiError> {
        let entry = self.get(event_id).await?;
        let mut record = entry.write().await;
        if !record.has_capacity() {
            return Err(ApiError::Capacity(event_id));
        }
        record.current_attendees += 1;
        Ok(())
    }

    /// Returns one previously reserved slot.
    ///
    /// Compensation path for failures after [`Self::reserve_slot`]
    /// (e.g. a screenshot that failed to store). Saturates at zero.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::EventNotFound`] if the event vanished in the
    /// meantime; callers treat that as advisory and log it.
    pub async fn release_slot(&self, event_id: EventId) -> Result<(), ApiError> {
        let entry = self.get(event_id).await?;
        let mut record = entry.write().await;
        record.current_attendees = record.current_attendees.saturating_sub(1);
        Ok(())
    }

    /// Returns the number of stored events.
    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    /// Returns `true` if the registry contains no events.
    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }
}

impl Default for EventRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::event::CreateEventInput;
    use crate::domain::UserId;
    use chrono::Utc;

    fn make_event(max_attendees: u32) -> EventRecord {
        let input = CreateEventInput {
            title: "Capacity Test".to_string(),
            description: None,
            date: Utc::now(),
            time: "10:00".to_string(),
            location: "Hall A".to_string(),
            max_attendees: Some(max_attendees),
            registration_fee: None,
            bank_details: None,
            requires_checkin: None,
            registration_fields: None,
            image_url: None,
            meet_link: None,
        };
        EventRecord::new(UserId::new(), input, None)
    }

    #[tokio::test]
    async fn insert_and_get() {
        let registry = EventRegistry::new();
        let record = make_event(10);
        let id = record.id;

        let result = registry.insert(record).await;
        assert!(result.is_ok());

        let fetched = registry.get(id).await;
        assert!(fetched.is_ok());
    }

    #[tokio::test]
    async fn get_nonexistent_returns_error() {
        let registry = EventRegistry::new();
        let result = registry.get(EventId::new()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn share_token_resolves_to_event() {
        let registry = EventRegistry::new();
        let record = make_event(10);
        let id = record.id;
        let share = record.share_id.as_str().to_string();
        let _ = registry.insert(record).await;

        let entry = registry.get_by_share_id(&share).await;
        let Ok(entry) = entry else {
            panic!("share lookup failed");
        };
        assert_eq!(entry.read().await.id, id);

        assert!(registry.get_by_share_id("bogus-token").await.is_err());
    }

    #[tokio::test]
    async fn remove_clears_share_index() {
        let registry = EventRegistry::new();
        let record = make_event(10);
        let id = record.id;
        let share = record.share_id.as_str().to_string();
        let _ = registry.insert(record).await;

        let removed = registry.remove(id).await;
        assert!(removed.is_ok());
        assert!(registry.get(id).await.is_err());
        assert!(registry.get_by_share_id(&share).await.is_err());
    }

    #[tokio::test]
    async fn reserve_until_full_then_capacity_error() {
        let registry = EventRegistry::new();
        let record = make_event(2);
        let id = record.id;
        let _ = registry.insert(record).await;

        assert!(registry.reserve_slot(id).await.is_ok());
        assert!(registry.reserve_slot(id).await.is_ok());

        let full = registry.reserve_slot(id).await;
        assert!(matches!(full, Err(ApiError::Capacity(_))));

        let entry = registry.get(id).await;
        let Ok(entry) = entry else {
            panic!("event not found");
        };
        let record = entry.read().await;
        assert_eq!(record.current_attendees, record.max_attendees);
    }

    #[tokio::test]
    async fn release_returns_a_slot() {
        let registry = EventRegistry::new();
        let record = make_event(1);
        let id = record.id;
        let _ = registry.insert(record).await;

        assert!(registry.reserve_slot(id).await.is_ok());
        assert!(registry.reserve_slot(id).await.is_err());
        assert!(registry.release_slot(id).await.is_ok());
        assert!(registry.reserve_slot(id).await.is_ok());
    }

    #[tokio::test]
    async fn release_saturates_at_zero() {
        let registry = EventRegistry::new();
        let record = make_event(5);
        let id = record.id;
        let _ = registry.insert(record).await;

        assert!(registry.release_slot(id).await.is_ok());
        let entry = registry.get(id).await;
        let Ok(entry) = entry else {
            panic!("event not found");
        };
        assert_eq!(entry.read().await.current_attendees, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_reservations_never_oversell() {
        let registry = Arc::new(EventRegistry::new());
        let record = make_event(3);
        let id = record.id;
        let _ = registry.insert(record).await;

        let mut handles = Vec::new();
        for _ in 0..10 {
            let registry = Arc::clone(&registry);
            handles.push(tokio::spawn(
                async move { registry.reserve_slot(id).await },
            ));
        }

        let mut succeeded = 0;
        let mut capacity_errors = 0;
        for handle in handles {
            match handle.await {
                Ok(Ok(())) => succeeded += 1,
                Ok(Err(ApiError::Capacity(_))) => capacity_errors += 1,
                other => panic!("unexpected outcome: {other:?}"),
            }
        }
        assert_eq!(succeeded, 3);
        assert_eq!(capacity_errors, 7);

        let entry = registry.get(id).await;
        let Ok(entry) = entry else {
            panic!("event not found");
        };
        let record = entry.read().await;
        assert_eq!(record.current_attendees, 3);
        assert_eq!(record.max_attendees, 3);
    }

    #[tokio::test]
    async fn len_and_is_empty() {
        let registry = EventRegistry::new();
        assert!(registry.is_empty().await);
        assert_eq!(registry.len().await, 0);

        let _ = registry.insert(make_event(10)).await;
        assert!(!registry.is_empty().await);
        assert_eq!(registry.len().await, 1);
    }
}
