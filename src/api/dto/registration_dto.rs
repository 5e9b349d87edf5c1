//! Registration-related request and response DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{EventRecord, RegistrationRecord};
use crate::service::registration_service::Attendee;

/// Request body for `PUT /registrations/:id`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRegistrationRequest {
    /// Replacement signup answers.
    pub registration_data: serde_json::Value,
}

/// One of the caller's registrations with its parent event snapshot
/// (`null` when the event has since been deleted).
#[derive(Debug, Serialize)]
pub struct UserRegistrationResponse {
    /// The registration record.
    #[serde(flatten)]
    pub registration: RegistrationRecord,
    /// Parent event snapshot, if the event still exists.
    pub event: Option<EventRecord>,
}

/// A registration annotated with registrant contact details, for the
/// organizer's attendee list.
#[derive(Debug, Serialize)]
pub struct AttendeeResponse {
    /// The registration record.
    #[serde(flatten)]
    pub registration: RegistrationRecord,
    /// Registrant display name, `"N/A"` if the account is gone.
    pub full_name: String,
    /// Registrant email, `"N/A"` if the account is gone.
    pub email: String,
}

impl From<Attendee> for AttendeeResponse {
    fn from(attendee: Attendee) -> Self {
        Self {
            registration: attendee.registration,
            full_name: attendee.full_name,
            email: attendee.email,
        }
    }
}
