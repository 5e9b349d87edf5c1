//! Event records, bank/payment configuration, and input validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BlobId, EventId, ShareId, UserId};
use crate::error::ApiError;

/// Default capacity applied when a create request omits `max_attendees`.
pub const DEFAULT_MAX_ATTENDEES: u32 = 50;

/// Validated bank/payment configuration attached to an event.
///
/// When present, the four account fields are guaranteed non-empty.
/// `qr_code_file_id` references the payment QR image in the blob store
/// and is owned exclusively by this event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankDetails {
    /// Name on the destination account.
    pub account_holder: String,
    /// Destination account number.
    pub account_number: String,
    /// Bank branch IFSC code.
    pub ifsc_code: String,
    /// Bank name.
    pub bank_name: String,
    /// Optional UPI handle.
    pub upi_id: Option<String>,
    /// Blob store reference to the payment QR image, if uploaded.
    pub qr_code_file_id: Option<BlobId>,
}

/// Unvalidated bank details as supplied by the client.
///
/// All fields optional at the wire level so that validation can report
/// every missing required field by name instead of failing on the first.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BankDetailsInput {
    /// Name on the destination account.
    #[serde(default)]
    pub account_holder: Option<String>,
    /// Destination account number.
    #[serde(default)]
    pub account_number: Option<String>,
    /// Bank branch IFSC code.
    #[serde(default)]
    pub ifsc_code: Option<String>,
    /// Bank name.
    #[serde(default)]
    pub bank_name: Option<String>,
    /// Optional UPI handle.
    #[serde(default)]
    pub upi_id: Option<String>,
    /// Existing QR blob reference carried over from a previous read.
    #[serde(default)]
    pub qr_code_file_id: Option<BlobId>,
}

impl BankDetailsInput {
    /// Validates that all required account fields are present and
    /// non-empty, producing a [`BankDetails`].
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] naming every missing field.
    pub fn validate(self) -> Result<BankDetails, ApiError> {
        let mut missing = Vec::new();
        let required = [
            ("account_holder", &self.account_holder),
            ("account_number", &self.account_number),
            ("ifsc_code", &self.ifsc_code),
            ("bank_name", &self.bank_name),
        ];
        for (name, value) in required {
            if value.as_deref().is_none_or(|v| v.trim().is_empty()) {
                missing.push(name);
            }
        }
        if !missing.is_empty() {
            return Err(ApiError::Validation(format!(
                "missing required bank details fields: {}",
                missing.join(", ")
            )));
        }
        Ok(BankDetails {
            account_holder: self.account_holder.unwrap_or_default(),
            account_number: self.account_number.unwrap_or_default(),
            ifsc_code: self.ifsc_code.unwrap_or_default(),
            bank_name: self.bank_name.unwrap_or_default(),
            upi_id: self.upi_id,
            qr_code_file_id: self.qr_code_file_id,
        })
    }
}

/// An organizer-created occasion with finite capacity.
///
/// # Invariant
///
/// `0 <= current_attendees <= max_attendees` at all times. The counter
/// is mutated only through [`super::EventRegistry::reserve_slot`] and
/// [`super::EventRegistry::release_slot`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    /// Unique event identifier (immutable after creation).
    pub id: EventId,
    /// Event title.
    pub title: String,
    /// Free-text description.
    pub description: Option<String>,
    /// Event date.
    pub date: DateTime<Utc>,
    /// Display time string (e.g. `"18:30"`).
    pub time: String,
    /// Venue or meeting place.
    pub location: String,
    /// Capacity ceiling, at least 1.
    pub max_attendees: u32,
    /// Number of capacity slots currently consumed.
    pub current_attendees: u32,
    /// Registration fee; `None` for free events.
    pub registration_fee: Option<f64>,
    /// Payment configuration, if the event collects fees.
    pub bank_details: Option<BankDetails>,
    /// Whether attendees are expected to check in on site.
    pub requires_checkin: bool,
    /// Ordered, schema-free field descriptors shown on the signup form.
    pub registration_fields: Vec<serde_json::Value>,
    /// Owning admin (immutable after creation).
    pub created_by: UserId,
    /// Public share token (immutable after creation).
    pub share_id: ShareId,
    /// Optional cover image URL.
    pub image_url: Option<String>,
    /// Optional online meeting link, included in confirmation emails.
    pub meet_link: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last mutation.
    pub updated_at: DateTime<Utc>,
}

impl EventRecord {
    /// Builds a fresh record from validated inputs with zero attendees
    /// and a newly generated share token.
    #[must_use]
    pub fn new(created_by: UserId, input: CreateEventInput, bank_details: Option<BankDetails>) -> Self {
        let now = Utc::now();
        Self {
            id: EventId::new(),
            title: input.title,
            description: input.description,
            date: input.date,
            time: input.time,
            location: input.location,
            max_attendees: input.max_attendees.unwrap_or(DEFAULT_MAX_ATTENDEES),
            current_attendees: 0,
            registration_fee: input.registration_fee,
            bank_details,
            requires_checkin: input.requires_checkin.unwrap_or(true),
            registration_fields: input.registration_fields.unwrap_or_default(),
            created_by,
            share_id: ShareId::generate(),
            image_url: input.image_url,
            meet_link: input.meet_link,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns `true` while at least one capacity slot remains.
    #[must_use]
    pub const fn has_capacity(&self) -> bool {
        self.current_attendees < self.max_attendees
    }
}

/// Client payload for event creation, parsed from the multipart `data`
/// part.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEventInput {
    /// Event title.
    pub title: String,
    /// Free-text description.
    #[serde(default)]
    pub description: Option<String>,
    /// Event date.
    pub date: DateTime<Utc>,
    /// Display time string.
    pub time: String,
    /// Venue or meeting place.
    pub location: String,
    /// Capacity ceiling; defaults to [`DEFAULT_MAX_ATTENDEES`].
    #[serde(default)]
    pub max_attendees: Option<u32>,
    /// Registration fee; absent or non-negative.
    #[serde(default)]
    pub registration_fee: Option<f64>,
    /// Bank/payment configuration.
    #[serde(default)]
    pub bank_details: Option<BankDetailsInput>,
    /// Whether attendees are expected to check in; defaults to `true`.
    #[serde(default)]
    pub requires_checkin: Option<bool>,
    /// Ordered, schema-free signup form field descriptors.
    #[serde(default)]
    pub registration_fields: Option<Vec<serde_json::Value>>,
    /// Optional cover image URL.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Optional online meeting link.
    #[serde(default)]
    pub meet_link: Option<String>,
}

impl CreateEventInput {
    /// Validates capacity and fee constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] on a zero capacity or a
    /// negative/non-finite fee.
    pub fn validate(&self) -> Result<(), ApiError> {
        validate_max_attendees(self.max_attendees)?;
        validate_fee(self.registration_fee)
    }
}

/// Client payload for event updates.
///
/// Scalar fields are patch-style (absent keeps the stored value);
/// `registration_fee` and `bank_details` are full-replace (absent
/// clears them), matching how the update endpoint has always behaved.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEventInput {
    /// New title, if changing.
    #[serde(default)]
    pub title: Option<String>,
    /// New description, if changing.
    #[serde(default)]
    pub description: Option<String>,
    /// New date, if changing.
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    /// New display time, if changing.
    #[serde(default)]
    pub time: Option<String>,
    /// New location, if changing.
    #[serde(default)]
    pub location: Option<String>,
    /// New capacity ceiling, if changing.
    #[serde(default)]
    pub max_attendees: Option<u32>,
    /// Replacement fee; absent clears the fee.
    #[serde(default)]
    pub registration_fee: Option<f64>,
    /// Replacement bank details; absent clears them.
    #[serde(default)]
    pub bank_details: Option<BankDetailsInput>,
    /// New check-in requirement, if changing.
    #[serde(default)]
    pub requires_checkin: Option<bool>,
    /// Replacement signup form fields, if changing.
    #[serde(default)]
    pub registration_fields: Option<Vec<serde_json::Value>>,
    /// New cover image URL, if changing.
    #[serde(default)]
    pub image_url: Option<String>,
    /// New meeting link, if changing.
    #[serde(default)]
    pub meet_link: Option<String>,
}

impl UpdateEventInput {
    /// Validates capacity and fee constraints on the patch.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] on a zero capacity or a
    /// negative/non-finite fee.
    pub fn validate(&self) -> Result<(), ApiError> {
        validate_max_attendees(self.max_attendees)?;
        validate_fee(self.registration_fee)
    }
}

fn validate_max_attendees(max: Option<u32>) -> Result<(), ApiError> {
    if max == Some(0) {
        return Err(ApiError::Validation(
            "max_attendees must be at least 1".to_string(),
        ));
    }
    Ok(())
}

fn validate_fee(fee: Option<f64>) -> Result<(), ApiError> {
    if let Some(f) = fee
        && (!f.is_finite() || f < 0.0)
    {
        return Err(ApiError::Validation(
            "registration fee must be a non-negative number".to_string(),
        ));
    }
    Ok(())
}
