//! Registration service: capacity-checked signup, attachment handling,
//! and the check-in flow.

use std::sync::Arc;

use crate::auth::AuthUser;
use crate::blob::{BlobStore, UploadedFile};
use crate::domain::notification::EventDigest;
use crate::domain::registration::embed_screenshot;
use crate::domain::{
    EventId, EventRecord, EventRegistry, Notification, Notifier, RegistrationId,
    RegistrationLedger, RegistrationRecord, UserDirectory,
};
use crate::error::ApiError;

/// A registration annotated with registrant contact details, for the
/// organizer's attendee list.
#[derive(Debug, Clone)]
pub struct Attendee {
    /// The registration record.
    pub registration: RegistrationRecord,
    /// Registrant display name, `"N/A"` if the account is gone.
    pub full_name: String,
    /// Registrant email, `"N/A"` if the account is gone.
    pub email: String,
}

/// Orchestration layer for registration operations.
///
/// `register` is the one flow with real failure-ordering concerns: the
/// capacity slot is reserved atomically first, and any later failure
/// (screenshot storage, record insert) releases it so no partial state
/// survives. The confirmation email is fire-and-forget.
#[derive(Debug, Clone)]
pub struct RegistrationService {
    registry: Arc<EventRegistry>,
    ledger: Arc<RegistrationLedger>,
    users: Arc<UserDirectory>,
    blobs: Arc<BlobStore>,
    notifier: Notifier,
}

impl RegistrationService {
    /// Creates a new `RegistrationService`.
    #[must_use]
    pub fn new(
        registry: Arc<EventRegistry>,
        ledger: Arc<RegistrationLedger>,
        users: Arc<UserDirectory>,
        blobs: Arc<BlobStore>,
        notifier: Notifier,
    ) -> Self {
        Self {
            registry,
            ledger,
            users,
            blobs,
            notifier,
        }
    }

    /// Returns a reference to the inner [`RegistrationLedger`].
    #[must_use]
    pub fn ledger(&self) -> &Arc<RegistrationLedger> {
        &self.ledger
    }

    /// Registers the caller for an event.
    ///
    /// Order matters: reserve a capacity slot (atomic check-and-
    /// increment), store the payment screenshot, then commit the
    /// record. A storage failure after the reservation releases the
    /// slot before surfacing the error.
    ///
    /// # Errors
    ///
    /// [`ApiError::EventNotFound`] when the event is absent,
    /// [`ApiError::Capacity`] when it is full, [`ApiError::Storage`]
    /// when the screenshot cannot be stored.
    pub async fn register(
        &self,
        caller: &AuthUser,
        event_id: EventId,
        mut registration_data: serde_json::Value,
        screenshot: Option<UploadedFile>,
    ) -> Result<RegistrationRecord, ApiError> {
        self.registry.reserve_slot(event_id).await?;

        let screenshot_id = match screenshot {
            Some(file) => {
                match self
                    .blobs
                    .put(file.bytes, &file.content_type, &file.filename)
                    .await
                {
                    Ok(id) => Some(id),
                    Err(err) => {
                        self.release_reserved(event_id).await;
                        return Err(err);
                    }
                }
            }
            None => None,
        };

        embed_screenshot(&mut registration_data, screenshot_id);
        let record = RegistrationRecord::new(event_id, caller.user_id, registration_data);

        if let Err(err) = self.ledger.insert(record.clone()).await {
            if let Some(blob_id) = screenshot_id {
                let _ = self.blobs.delete(blob_id).await;
            }
            self.release_reserved(event_id).await;
            return Err(err);
        }

        self.send_confirmation(caller, event_id).await;
        tracing::info!(registration_id = %record.id, %event_id, "registration created");
        Ok(record)
    }

    async fn release_reserved(&self, event_id: EventId) {
        if let Err(err) = self.registry.release_slot(event_id).await {
            tracing::warn!(%event_id, error = %err, "failed to release reserved slot");
        }
    }

    async fn send_confirmation(&self, caller: &AuthUser, event_id: EventId) {
        let Ok(entry) = self.registry.get(event_id).await else {
            return;
        };
        let digest = EventDigest::from(&*entry.read().await);
        let recipient = match self.users.get(caller.user_id).await {
            Ok(user) => user.email,
            Err(_) => caller.email.clone(),
        };
        self.notifier.publish(Notification::RegistrationConfirmed {
            recipient,
            event: digest,
        });
    }

    /// Returns the caller's registrations, each annotated with the
    /// parent event snapshot, or `None` when the event was deleted.
    pub async fn list_for_user(
        &self,
        caller: &AuthUser,
    ) -> Vec<(RegistrationRecord, Option<EventRecord>)> {
        let registrations = self.ledger.list_for_user(caller.user_id).await;
        let mut annotated = Vec::with_capacity(registrations.len());
        for registration in registrations {
            let event = match self.registry.get(registration.event_id).await {
                Ok(entry) => Some(entry.read().await.clone()),
                Err(_) => None,
            };
            annotated.push((registration, event));
        }
        annotated
    }

    /// Returns all registrations for one event with registrant contact
    /// details. Admin-or-owner only.
    ///
    /// # Errors
    ///
    /// [`ApiError::EventNotFound`] or [`ApiError::Forbidden`].
    pub async fn list_for_event(
        &self,
        caller: &AuthUser,
        event_id: EventId,
    ) -> Result<Vec<Attendee>, ApiError> {
        let entry = self.registry.get(event_id).await?;
        {
            let record = entry.read().await;
            if !caller.is_admin() && record.created_by != caller.user_id {
                return Err(ApiError::Forbidden(
                    "not authorized for this event".to_string(),
                ));
            }
        }

        let registrations = self.ledger.list_for_event(event_id).await;
        let mut attendees = Vec::with_capacity(registrations.len());
        for registration in registrations {
            let (full_name, email) = match self.users.get(registration.user_id).await {
                Ok(user) => (user.full_name, user.email),
                Err(_) => ("N/A".to_string(), "N/A".to_string()),
            };
            attendees.push(Attendee {
                registration,
                full_name,
                email,
            });
        }
        Ok(attendees)
    }

    /// Replaces the caller's signup answers. Capacity and attachments
    /// are never touched.
    ///
    /// # Errors
    ///
    /// [`ApiError::RegistrationNotFound`] when the record is absent
    /// *or* belongs to someone else; the lookup is scoped to the
    /// caller, so foreign records are indistinguishable from missing
    /// ones.
    pub async fn update_answers(
        &self,
        caller: &AuthUser,
        registration_id: RegistrationId,
        registration_data: serde_json::Value,
    ) -> Result<RegistrationRecord, ApiError> {
        let entry = self.ledger.get(registration_id).await?;
        let mut record = entry.write().await;
        if record.user_id != caller.user_id {
            return Err(ApiError::RegistrationNotFound(registration_id));
        }
        record.update_answers(registration_data);
        Ok(record.clone())
    }

    /// Checks an attendee in. Admin-only and idempotent: repeated calls
    /// return the record unchanged with the original check-in time.
    ///
    /// # Errors
    ///
    /// [`ApiError::Forbidden`] for non-admins,
    /// [`ApiError::RegistrationNotFound`] when absent.
    pub async fn check_in(
        &self,
        caller: &AuthUser,
        registration_id: RegistrationId,
    ) -> Result<RegistrationRecord, ApiError> {
        if !caller.is_admin() {
            return Err(ApiError::Forbidden("admin access required".to_string()));
        }
        let entry = self.ledger.get(registration_id).await?;
        let mut record = entry.write().await;
        if record.check_in() {
            tracing::info!(%registration_id, "attendee checked in");
        }
        Ok(record.clone())
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::domain::event::CreateEventInput;
    use crate::domain::{Role, UserRecord};
    use bytes::Bytes;
    use chrono::{Duration, Utc};

    struct Fixture {
        registry: Arc<EventRegistry>,
        blobs: Arc<BlobStore>,
        users: Arc<UserDirectory>,
        notifier: Notifier,
        service: RegistrationService,
    }

    async fn fixture() -> Fixture {
        let registry = Arc::new(EventRegistry::new());
        let ledger = Arc::new(RegistrationLedger::new());
        let users = Arc::new(UserDirectory::new());
        let blobs = Arc::new(BlobStore::new());
        blobs.init().await;
        let notifier = Notifier::new(64);
        let service = RegistrationService::new(
            Arc::clone(&registry),
            Arc::clone(&ledger),
            Arc::clone(&users),
            Arc::clone(&blobs),
            notifier.clone(),
        );
        Fixture {
            registry,
            blobs,
            users,
            notifier,
            service,
        }
    }

    fn auth_user(role: Role) -> AuthUser {
        AuthUser {
            user_id: crate::domain::UserId::new(),
            email: "attendee@example.com".to_string(),
            role,
        }
    }

    async fn seed_event(fixture: &Fixture, max_attendees: u32) -> EventId {
        let input = CreateEventInput {
            title: "Hack Night".to_string(),
            description: None,
            date: Utc::now() + Duration::days(3),
            time: "18:00".to_string(),
            location: "Lab 2".to_string(),
            max_attendees: Some(max_attendees),
            registration_fee: None,
            bank_details: None,
            requires_checkin: None,
            registration_fields: None,
            image_url: None,
            meet_link: None,
        };
        let record = EventRecord::new(crate::domain::UserId::new(), input, None);
        let id = record.id;
        let _ = fixture.registry.insert(record).await;
        id
    }

    fn screenshot() -> UploadedFile {
        UploadedFile {
            bytes: Bytes::from_static(b"payment-proof"),
            content_type: "image/jpeg".to_string(),
            filename: "upi.jpg".to_string(),
        }
    }

    async fn attendee_count(fixture: &Fixture, event_id: EventId) -> u32 {
        let entry = fixture.registry.get(event_id).await;
        let Ok(entry) = entry else {
            panic!("event not found");
        };
        let record = entry.read().await;
        record.current_attendees
    }

    #[tokio::test]
    async fn register_consumes_a_slot_and_stores_record() {
        let fixture = fixture().await;
        let event_id = seed_event(&fixture, 10).await;
        let caller = auth_user(Role::User);

        let result = fixture
            .service
            .register(&caller, event_id, serde_json::json!({"team": "alpha"}), None)
            .await;
        let Ok(record) = result else {
            panic!("registration failed");
        };
        assert_eq!(record.event_id, event_id);
        assert_eq!(attendee_count(&fixture, event_id).await, 1);
        assert!(record.registration_data["payment_details"]["screenshot_file_id"].is_null());
    }

    #[tokio::test]
    async fn register_against_unknown_event_is_not_found() {
        let fixture = fixture().await;
        let result = fixture
            .service
            .register(
                &auth_user(Role::User),
                EventId::new(),
                serde_json::json!({}),
                None,
            )
            .await;
        assert!(matches!(result, Err(ApiError::EventNotFound(_))));
    }

    #[tokio::test]
    async fn full_event_rejects_registration_without_creating_a_record() {
        let fixture = fixture().await;
        let event_id = seed_event(&fixture, 1).await;

        let first = fixture
            .service
            .register(&auth_user(Role::User), event_id, serde_json::json!({}), None)
            .await;
        assert!(first.is_ok());

        let second = fixture
            .service
            .register(&auth_user(Role::User), event_id, serde_json::json!({}), None)
            .await;
        assert!(matches!(second, Err(ApiError::Capacity(_))));
        assert_eq!(fixture.service.ledger().len().await, 1);
        assert_eq!(attendee_count(&fixture, event_id).await, 1);
    }

    #[tokio::test]
    async fn screenshot_is_stored_and_referenced() {
        let fixture = fixture().await;
        let event_id = seed_event(&fixture, 5).await;

        let record = fixture
            .service
            .register(
                &auth_user(Role::User),
                event_id,
                serde_json::json!({"payment_details": {"transaction_ref": "TXN-9"}}),
                Some(screenshot()),
            )
            .await;
        let Ok(record) = record else {
            panic!("registration failed");
        };

        let file_id = record.registration_data["payment_details"]["screenshot_file_id"]
            .as_str()
            .and_then(|s| uuid::Uuid::parse_str(s).ok())
            .map(crate::domain::BlobId::from_uuid);
        let Some(file_id) = file_id else {
            panic!("screenshot id missing from registration data");
        };
        let blob = fixture.blobs.get(file_id).await;
        let Ok(blob) = blob else {
            panic!("screenshot blob missing");
        };
        assert_eq!(blob.bytes, Bytes::from_static(b"payment-proof"));
        assert_eq!(
            record.registration_data["payment_details"]["transaction_ref"],
            "TXN-9"
        );
    }

    #[tokio::test]
    async fn blob_failure_releases_the_reserved_slot() {
        let registry = Arc::new(EventRegistry::new());
        let ledger = Arc::new(RegistrationLedger::new());
        let users = Arc::new(UserDirectory::new());
        // Deliberately uninitialized: every put will fail.
        let blobs = Arc::new(BlobStore::new());
        let service = RegistrationService::new(
            Arc::clone(&registry),
            Arc::clone(&ledger),
            users,
            blobs,
            Notifier::new(8),
        );

        let input = CreateEventInput {
            title: "Storage Outage".to_string(),
            description: None,
            date: Utc::now() + Duration::days(1),
            time: "12:00".to_string(),
            location: "Online".to_string(),
            max_attendees: Some(2),
            registration_fee: None,
            bank_details: None,
            requires_checkin: None,
            registration_fields: None,
            image_url: None,
            meet_link: None,
        };
        let record = EventRecord::new(crate::domain::UserId::new(), input, None);
        let event_id = record.id;
        let _ = registry.insert(record).await;

        let result = service
            .register(
                &auth_user(Role::User),
                event_id,
                serde_json::json!({}),
                Some(screenshot()),
            )
            .await;
        assert!(matches!(result, Err(ApiError::Storage(_))));
        assert!(ledger.is_empty().await);

        let entry = registry.get(event_id).await;
        let Ok(entry) = entry else {
            panic!("event not found");
        };
        assert_eq!(entry.read().await.current_attendees, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_registrations_fill_exactly_to_capacity() {
        let fixture = fixture().await;
        let event_id = seed_event(&fixture, 3).await;
        let service = fixture.service.clone();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let service = service.clone();
            let caller = auth_user(Role::User);
            handles.push(tokio::spawn(async move {
                service
                    .register(&caller, event_id, serde_json::json!({}), None)
                    .await
            }));
        }

        let mut succeeded = 0;
        let mut rejected = 0;
        for handle in handles {
            match handle.await {
                Ok(Ok(_)) => succeeded += 1,
                Ok(Err(ApiError::Capacity(_))) => rejected += 1,
                other => panic!("unexpected outcome: {other:?}"),
            }
        }
        assert_eq!(succeeded, 3);
        assert_eq!(rejected, 5);
        assert_eq!(fixture.service.ledger().len().await, 3);
        assert_eq!(attendee_count(&fixture, event_id).await, 3);
    }

    #[tokio::test]
    async fn registration_publishes_a_confirmation() {
        let fixture = fixture().await;
        let event_id = seed_event(&fixture, 5).await;
        let mut rx = fixture.notifier.subscribe();

        let caller = auth_user(Role::User);
        let user = UserRecord::new(
            caller.email.clone(),
            "$2b$10$hash".to_string(),
            "Attendee".to_string(),
            Role::User,
        );
        let stored_caller = AuthUser {
            user_id: user.id,
            email: user.email.clone(),
            role: Role::User,
        };
        let _ = fixture.users.insert(user).await;

        let result = fixture
            .service
            .register(&stored_caller, event_id, serde_json::json!({}), None)
            .await;
        assert!(result.is_ok());

        let notification = rx.try_recv();
        let Ok(Notification::RegistrationConfirmed { recipient, event }) = notification else {
            panic!("expected a confirmation notification");
        };
        assert_eq!(recipient, "attendee@example.com");
        assert_eq!(event.title, "Hack Night");
    }

    #[tokio::test]
    async fn list_for_user_marks_deleted_events_as_none() {
        let fixture = fixture().await;
        let event_id = seed_event(&fixture, 5).await;
        let caller = auth_user(Role::User);

        let result = fixture
            .service
            .register(&caller, event_id, serde_json::json!({}), None)
            .await;
        assert!(result.is_ok());

        let _ = fixture.registry.remove(event_id).await;

        let listed = fixture.service.list_for_user(&caller).await;
        assert_eq!(listed.len(), 1);
        assert!(listed.first().is_some_and(|(_, event)| event.is_none()));
    }

    #[tokio::test]
    async fn update_answers_is_scoped_to_the_owner() {
        let fixture = fixture().await;
        let event_id = seed_event(&fixture, 5).await;
        let owner = auth_user(Role::User);

        let record = fixture
            .service
            .register(&owner, event_id, serde_json::json!({"shirt": "M"}), None)
            .await;
        let Ok(record) = record else {
            panic!("registration failed");
        };

        let stranger = auth_user(Role::User);
        let denied = fixture
            .service
            .update_answers(&stranger, record.id, serde_json::json!({"shirt": "XL"}))
            .await;
        assert!(matches!(denied, Err(ApiError::RegistrationNotFound(_))));

        let updated = fixture
            .service
            .update_answers(&owner, record.id, serde_json::json!({"shirt": "L"}))
            .await;
        let Ok(updated) = updated else {
            panic!("update failed");
        };
        assert_eq!(updated.registration_data["shirt"], "L");
    }

    #[tokio::test]
    async fn check_in_is_admin_only_and_idempotent() {
        let fixture = fixture().await;
        let event_id = seed_event(&fixture, 5).await;
        let attendee = auth_user(Role::User);

        let record = fixture
            .service
            .register(&attendee, event_id, serde_json::json!({}), None)
            .await;
        let Ok(record) = record else {
            panic!("registration failed");
        };

        let denied = fixture.service.check_in(&attendee, record.id).await;
        assert!(matches!(denied, Err(ApiError::Forbidden(_))));

        let admin = auth_user(Role::Admin);
        let first = fixture.service.check_in(&admin, record.id).await;
        let Ok(first) = first else {
            panic!("check-in failed");
        };
        assert_eq!(first.status, crate::domain::RegistrationStatus::CheckedIn);

        let second = fixture.service.check_in(&admin, record.id).await;
        let Ok(second) = second else {
            panic!("second check-in errored");
        };
        assert_eq!(second.checked_in_at, first.checked_in_at);
    }
}
