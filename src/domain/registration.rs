//! Registration records and their one-way check-in state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BlobId, EventId, RegistrationId, UserId};

/// Lifecycle state of a registration.
///
/// The only transition is `Registered -> CheckedIn`; there is no
/// un-check-in operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    /// Attendee has registered but not yet arrived.
    Registered,
    /// Attendee was checked in by an admin. Terminal.
    CheckedIn,
}

/// A user's enrollment record against one event.
///
/// Existence of a record corresponds 1:1 with exactly one consumed
/// capacity slot on its event. `registration_data` is schema-free:
/// whatever the signup form collected, plus a nested `payment_details`
/// object carrying the screenshot blob reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationRecord {
    /// Unique registration identifier.
    pub id: RegistrationId,
    /// Event this registration belongs to.
    pub event_id: EventId,
    /// Registrant.
    pub user_id: UserId,
    /// Free-form signup answers and payment evidence.
    pub registration_data: serde_json::Value,
    /// Current lifecycle state.
    pub status: RegistrationStatus,
    /// When the registration was created.
    pub registered_at: DateTime<Utc>,
    /// When the attendee was checked in, if ever.
    pub checked_in_at: Option<DateTime<Utc>>,
    /// Timestamp of the last mutation.
    pub last_modified_at: DateTime<Utc>,
}

impl RegistrationRecord {
    /// Creates a fresh record in the `Registered` state.
    #[must_use]
    pub fn new(event_id: EventId, user_id: UserId, registration_data: serde_json::Value) -> Self {
        let now = Utc::now();
        Self {
            id: RegistrationId::new(),
            event_id,
            user_id,
            registration_data,
            status: RegistrationStatus::Registered,
            registered_at: now,
            checked_in_at: None,
            last_modified_at: now,
        }
    }

    /// Marks the attendee as checked in.
    ///
    /// Idempotent: repeated calls keep the first `checked_in_at` and
    /// return `false` to signal that nothing changed.
    pub fn check_in(&mut self) -> bool {
        if self.status == RegistrationStatus::CheckedIn {
            return false;
        }
        let now = Utc::now();
        self.status = RegistrationStatus::CheckedIn;
        self.checked_in_at = Some(now);
        self.last_modified_at = now;
        true
    }

    /// Replaces the signup answers, bumping `last_modified_at`.
    ///
    /// Capacity and attachments are never touched here.
    pub fn update_answers(&mut self, registration_data: serde_json::Value) {
        self.registration_data = registration_data;
        self.last_modified_at = Utc::now();
    }
}

/// Injects the screenshot blob reference into the answers document.
///
/// Ensures a `payment_details` object exists and sets its
/// `screenshot_file_id` key (explicit `null` when no screenshot was
/// uploaded), preserving any other payment keys the client sent.
pub fn embed_screenshot(registration_data: &mut serde_json::Value, screenshot: Option<BlobId>) {
    if !registration_data.is_object() {
        *registration_data = serde_json::json!({});
    }
    let Some(root) = registration_data.as_object_mut() else {
        return;
    };
    let details = root
        .entry("payment_details")
        .or_insert_with(|| serde_json::json!({}));
    if !details.is_object() {
        *details = serde_json::json!({});
    }
    if let Some(details) = details.as_object_mut() {
        let value = match screenshot {
            Some(id) => serde_json::Value::String(id.to_string()),
            None => serde_json::Value::Null,
        };
        details.insert("screenshot_file_id".to_string(), value);
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn new_record_is_registered() {
        let record =
            RegistrationRecord::new(EventId::new(), UserId::new(), serde_json::json!({}));
        assert_eq!(record.status, RegistrationStatus::Registered);
        assert!(record.checked_in_at.is_none());
    }

    #[test]
    fn check_in_transitions_once() {
        let mut record =
            RegistrationRecord::new(EventId::new(), UserId::new(), serde_json::json!({}));
        assert!(record.check_in());
        assert_eq!(record.status, RegistrationStatus::CheckedIn);
        let first = record.checked_in_at;
        assert!(first.is_some());

        // Second call is a no-op preserving the original timestamp.
        assert!(!record.check_in());
        assert_eq!(record.checked_in_at, first);
    }

    #[test]
    fn update_answers_bumps_last_modified() {
        let mut record = RegistrationRecord::new(
            EventId::new(),
            UserId::new(),
            serde_json::json!({"dietary": "vegan"}),
        );
        let before = record.last_modified_at;
        record.update_answers(serde_json::json!({"dietary": "none"}));
        assert_eq!(record.registration_data["dietary"], "none");
        assert!(record.last_modified_at >= before);
    }

    #[test]
    fn embed_screenshot_sets_file_id() {
        let mut data = serde_json::json!({"name": "Priya"});
        let blob = BlobId::new();
        embed_screenshot(&mut data, Some(blob));
        assert_eq!(
            data["payment_details"]["screenshot_file_id"],
            serde_json::Value::String(blob.to_string())
        );
        assert_eq!(data["name"], "Priya");
    }

    #[test]
    fn embed_screenshot_without_file_writes_null() {
        let mut data = serde_json::json!({
            "payment_details": {"transaction_ref": "TXN-1"}
        });
        embed_screenshot(&mut data, None);
        assert!(data["payment_details"]["screenshot_file_id"].is_null());
        assert_eq!(data["payment_details"]["transaction_ref"], "TXN-1");
    }

    #[test]
    fn embed_screenshot_tolerates_non_object_data() {
        let mut data = serde_json::Value::String("oops".to_string());
        embed_screenshot(&mut data, None);
        assert!(data["payment_details"]["screenshot_file_id"].is_null());
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_value(RegistrationStatus::CheckedIn).ok();
        assert_eq!(json, Some(serde_json::Value::String("checked_in".to_string())));
    }
}
