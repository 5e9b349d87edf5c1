//! Event service: orchestrates event CRUD, QR attachment consistency,
//! and broadcast notifications.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::auth::AuthUser;
use crate::blob::{BlobStore, UploadedFile};
use crate::domain::event::{BankDetailsInput, CreateEventInput, UpdateEventInput};
use crate::domain::notification::EventDigest;
use crate::domain::{
    EventId, EventRecord, EventRegistry, Notification, Notifier, RegistrationLedger, UserDirectory,
};
use crate::error::ApiError;

/// Admin request body for `POST /events/:id/broadcast`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BroadcastInput {
    /// Subject line.
    pub subject: String,
    /// Message body (HTML allowed).
    pub message: String,
    /// Whether to append date/time/location to the body.
    #[serde(default)]
    pub include_event_details: bool,
}

/// Orchestration layer for event operations.
///
/// Every mutation follows the pattern: authorize → validate → settle
/// attachments with the blob store → commit to the registry → notify.
/// Blob failures before the commit abort with no partial state; blob
/// failures during cleanup are logged and swallowed.
#[derive(Debug, Clone)]
pub struct EventService {
    registry: Arc<EventRegistry>,
    ledger: Arc<RegistrationLedger>,
    users: Arc<UserDirectory>,
    blobs: Arc<BlobStore>,
    notifier: Notifier,
}

impl EventService {
    /// Creates a new `EventService`.
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

    /// Returns a reference to the inner [`EventRegistry`].
    #[must_use]
    pub fn registry(&self) -> &Arc<EventRegistry> {
        &self.registry
    }

    /// Creates a new event owned by the caller.
    ///
    /// A supplied QR image is stored first; a blob failure aborts the
    /// whole creation with nothing committed.
    ///
    /// # Errors
    ///
    /// [`ApiError::Forbidden`] for non-admin callers,
    /// [`ApiError::Validation`] on bad capacity/fee/bank fields,
    /// [`ApiError::Storage`] when the QR image cannot be stored.
    pub async fn create_event(
        &self,
        caller: &AuthUser,
        mut input: CreateEventInput,
        qr_upload: Option<UploadedFile>,
    ) -> Result<EventRecord, ApiError> {
        if !caller.is_admin() {
            return Err(ApiError::Forbidden("admin access required".to_string()));
        }
        input.validate()?;
        let mut bank = input
            .bank_details
            .take()
            .map(BankDetailsInput::validate)
            .transpose()?;

        if let Some(file) = qr_upload {
            if let Some(bank) = bank.as_mut() {
                let blob_id = self
                    .blobs
                    .put(file.bytes, &file.content_type, &file.filename)
                    .await?;
                bank.qr_code_file_id = Some(blob_id);
            } else {
                tracing::warn!("qr code upload ignored: request carries no bank details");
            }
        }

        let record = EventRecord::new(caller.user_id, input, bank);
        let event_id = self.registry.insert(record.clone()).await?;
        tracing::info!(%event_id, title = %record.title, "event created");
        Ok(record)
    }

    /// Updates an event owned by the caller.
    ///
    /// Fee and bank details are full-replace and revalidated. When a
    /// new QR image arrives the old blob is deleted first (best-effort,
    /// logged on failure), then the new one is stored; the record's
    /// file id is swapped only after the store succeeds. The share
    /// token is always preserved.
    ///
    /// # Errors
    ///
    /// [`ApiError::EventNotFound`], [`ApiError::Forbidden`] unless the
    /// caller is the owning admin, [`ApiError::Validation`] on bad
    /// fields, [`ApiError::Storage`] when the new QR cannot be stored
    /// (the record is left unmodified).
    pub async fn update_event(
        &self,
        caller: &AuthUser,
        event_id: EventId,
        mut input: UpdateEventInput,
        qr_upload: Option<UploadedFile>,
    ) -> Result<EventRecord, ApiError> {
        let entry = self.registry.get(event_id).await?;
        let mut record = entry.write().await;
        ensure_owner(caller, &record)?;
        input.validate()?;
        if let Some(max) = input.max_attendees
            && max < record.current_attendees
        {
            return Err(ApiError::Validation(format!(
                "max_attendees cannot drop below the {} existing registrations",
                record.current_attendees
            )));
        }

        let mut bank = input
            .bank_details
            .take()
            .map(BankDetailsInput::validate)
            .transpose()?;
        let previous_qr = record.bank_details.as_ref().and_then(|b| b.qr_code_file_id);

        if let Some(file) = qr_upload {
            if let Some(bank) = bank.as_mut() {
                if let Some(old_id) = previous_qr {
                    if let Err(err) = self.blobs.delete(old_id).await {
                        tracing::warn!(blob_id = %old_id, error = %err,
                            "failed to delete replaced qr code; continuing");
                    }
                }
                let blob_id = self
                    .blobs
                    .put(file.bytes, &file.content_type, &file.filename)
                    .await?;
                bank.qr_code_file_id = Some(blob_id);
            } else {
                tracing::warn!(%event_id, "qr code upload ignored: update clears bank details");
            }
        } else if let Some(bank) = bank.as_mut()
            && bank.qr_code_file_id.is_none()
        {
            // No new image: keep referencing the already-stored one.
            bank.qr_code_file_id = previous_qr;
        }

        if let Some(title) = input.title {
            record.title = title;
        }
        if let Some(description) = input.description {
            record.description = Some(description);
        }
        if let Some(date) = input.date {
            record.date = date;
        }
        if let Some(time) = input.time {
            record.time = time;
        }
        if let Some(location) = input.location {
            record.location = location;
        }
        if let Some(max) = input.max_attendees {
            record.max_attendees = max;
        }
        if let Some(requires_checkin) = input.requires_checkin {
            record.requires_checkin = requires_checkin;
        }
        if let Some(fields) = input.registration_fields {
            record.registration_fields = fields;
        }
        if let Some(image_url) = input.image_url {
            record.image_url = Some(image_url);
        }
        if let Some(meet_link) = input.meet_link {
            record.meet_link = Some(meet_link);
        }
        record.registration_fee = input.registration_fee;
        record.bank_details = bank;
        record.updated_at = Utc::now();

        let updated = record.clone();
        drop(record);
        tracing::info!(%event_id, "event updated");
        Ok(updated)
    }

    /// Deletes an event owned by the caller.
    ///
    /// The associated QR blob is deleted first as advisory cleanup; a
    /// blob failure never blocks the event deletion. Registrations are
    /// not cascaded: their owners still see them, with a vanished
    /// event.
    ///
    /// # Errors
    ///
    /// [`ApiError::EventNotFound`], [`ApiError::Forbidden`] unless the
    /// caller is the owning admin.
    pub async fn delete_event(&self, caller: &AuthUser, event_id: EventId) -> Result<(), ApiError> {
        let entry = self.registry.get(event_id).await?;
        let qr_id = {
            let record = entry.read().await;
            ensure_owner(caller, &record)?;
            record.bank_details.as_ref().and_then(|b| b.qr_code_file_id)
        };
        if let Some(qr_id) = qr_id {
            if let Err(err) = self.blobs.delete(qr_id).await {
                tracing::warn!(blob_id = %qr_id, error = %err,
                    "failed to delete event qr code; continuing");
            }
        }
        let _ = self.registry.remove(event_id).await?;
        tracing::info!(%event_id, "event deleted");
        Ok(())
    }

    /// Fetches one event. Admins may view any event, non-admins only
    /// events they own.
    ///
    /// # Errors
    ///
    /// [`ApiError::EventNotFound`] or [`ApiError::Forbidden`].
    pub async fn get_event(
        &self,
        caller: &AuthUser,
        event_id: EventId,
    ) -> Result<EventRecord, ApiError> {
        let entry = self.registry.get(event_id).await?;
        let record = entry.read().await;
        ensure_viewer(caller, &record)?;
        Ok(record.clone())
    }

    /// Public share-token lookup; no authentication.
    ///
    /// # Errors
    ///
    /// [`ApiError::ShareNotFound`] when no event carries the token.
    pub async fn get_event_by_share_id(&self, share_id: &str) -> Result<EventRecord, ApiError> {
        let entry = self.registry.get_by_share_id(share_id).await?;
        let record = entry.read().await;
        Ok(record.clone())
    }

    /// Lists events scoped by caller role: admins see only events they
    /// created, everyone else sees only future-dated events. `query`
    /// applies a case-insensitive substring match over title and
    /// description. Sorted by date ascending.
    pub async fn list_events(&self, caller: &AuthUser, query: Option<&str>) -> Vec<EventRecord> {
        let now = Utc::now();
        let mut records: Vec<EventRecord> = self
            .registry
            .list()
            .await
            .into_iter()
            .filter(|record| {
                if caller.is_admin() {
                    record.created_by == caller.user_id
                } else {
                    record.date >= now
                }
            })
            .collect();

        if let Some(q) = query {
            let needle = q.to_lowercase();
            records.retain(|record| {
                record.title.to_lowercase().contains(&needle)
                    || record
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            });
        }

        records.sort_by_key(|record| record.date);
        records
    }

    /// Publishes a broadcast notification to every registrant of an
    /// event. Delivery is fire-and-forget; this only fails when the
    /// input is bad, the caller may not broadcast, or nobody is
    /// registered.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] on empty subject/message or zero
    /// recipients, [`ApiError::EventNotFound`], [`ApiError::Forbidden`].
    pub async fn broadcast(
        &self,
        caller: &AuthUser,
        event_id: EventId,
        input: BroadcastInput,
    ) -> Result<usize, ApiError> {
        if input.subject.trim().is_empty() || input.message.trim().is_empty() {
            return Err(ApiError::Validation(
                "subject and message are required".to_string(),
            ));
        }

        let entry = self.registry.get(event_id).await?;
        let digest = {
            let record = entry.read().await;
            ensure_viewer(caller, &record)?;
            EventDigest::from(&*record)
        };

        let mut recipients = Vec::new();
        for registration in self.ledger.list_for_event(event_id).await {
            if let Ok(user) = self.users.get(registration.user_id).await {
                recipients.push(user.email);
            }
        }
        if recipients.is_empty() {
            return Err(ApiError::Validation(
                "no registered users found".to_string(),
            ));
        }

        let count = recipients.len();
        self.notifier.publish(Notification::Broadcast {
            recipients,
            subject: input.subject,
            message: input.message,
            include_event_details: input.include_event_details,
            event: digest,
        });
        tracing::info!(%event_id, recipients = count, "broadcast queued");
        Ok(count)
    }
}

/// Admin-and-owner check used by every mutation.
fn ensure_owner(caller: &AuthUser, record: &EventRecord) -> Result<(), ApiError> {
    if !caller.is_admin() || record.created_by != caller.user_id {
        return Err(ApiError::Forbidden(
            "only the owning admin may modify this event".to_string(),
        ));
    }
    Ok(())
}

/// Admin-or-owner check used by reads and broadcast.
fn ensure_viewer(caller: &AuthUser, record: &EventRecord) -> Result<(), ApiError> {
    if caller.is_admin() || record.created_by == caller.user_id {
        return Ok(());
    }
    Err(ApiError::Forbidden(
        "not authorized for this event".to_string(),
    ))
}
