//! Event-related response DTOs.
//!
//! Create/update inputs deserialize straight into the domain input
//! types ([`crate::domain::event::CreateEventInput`] and friends), so
//! only response shapes live here.

use serde::Serialize;

use crate::domain::EventRecord;

/// An event as returned by the API: the full record plus the composed
/// shareable link.
#[derive(Debug, Serialize)]
pub struct EventResponse {
    /// The event record.
    #[serde(flatten)]
    pub event: EventRecord,
    /// Public URL built from the share token.
    pub share_url: String,
}

impl EventResponse {
    /// Wraps a record, composing the share URL against the configured
    /// public base.
    #[must_use]
    pub fn new(event: EventRecord, public_base_url: &str) -> Self {
        let share_url = format!(
            "{}/event/{}",
            public_base_url.trim_end_matches('/'),
            event.share_id
        );
        Self { event, share_url }
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::domain::UserId;
    use crate::domain::event::CreateEventInput;
    use chrono::Utc;

    #[test]
    fn share_url_is_composed_from_base_and_token() {
        let input = CreateEventInput {
            title: "T".to_string(),
            description: None,
            date: Utc::now(),
            time: "10:00".to_string(),
            location: "L".to_string(),
            max_attendees: None,
            registration_fee: None,
            bank_details: None,
            requires_checkin: None,
            registration_fields: None,
            image_url: None,
            meet_link: None,
        };
        let record = EventRecord::new(UserId::new(), input, None);
        let token = record.share_id.as_str().to_string();

        let response = EventResponse::new(record, "https://events.example.com/");
        assert_eq!(
            response.share_url,
            format!("https://events.example.com/event/{token}")
        );

        let json = serde_json::to_value(&response).ok();
        let Some(json) = json else {
            panic!("serialization failed");
        };
        // Flattened record fields sit next to the composed URL.
        assert_eq!(json["title"], "T");
        assert!(json["share_url"].as_str().is_some_and(|u| u.contains(&token)));
    }
}
