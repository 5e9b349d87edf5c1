//! Fire-and-forget notification channel.
//!
//! [`Notifier`] wraps a [`tokio::sync::broadcast`] channel. Successful
//! registrations and admin broadcasts publish a [`Notification`]; the
//! mail worker subscribes and delivers best-effort. Publishing never
//! blocks, never fails the triggering operation, and offers no
//! durability: if nothing is listening the notification is dropped.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

use super::event::EventRecord;

/// The slice of an event that notification bodies need.
#[derive(Debug, Clone, Serialize)]
pub struct EventDigest {
    /// Event title.
    pub title: String,
    /// Event date.
    pub date: DateTime<Utc>,
    /// Display time string.
    pub time: String,
    /// Venue or meeting place.
    pub location: String,
    /// Optional online meeting link.
    pub meet_link: Option<String>,
}

impl From<&EventRecord> for EventDigest {
    fn from(record: &EventRecord) -> Self {
        Self {
            title: record.title.clone(),
            date: record.date,
            time: record.time.clone(),
            location: record.location.clone(),
            meet_link: record.meet_link.clone(),
        }
    }
}

/// An outbound notification.
#[derive(Debug, Clone)]
pub enum Notification {
    /// Confirmation sent to a single registrant right after signup.
    RegistrationConfirmed {
        /// Registrant email address.
        recipient: String,
        /// Event the registrant signed up for.
        event: EventDigest,
    },
    /// Admin-initiated broadcast to every registrant of an event.
    Broadcast {
        /// Registrant email addresses.
        recipients: Vec<String>,
        /// Subject line (prefixed with the event title on delivery).
        subject: String,
        /// Message body.
        message: String,
        /// Whether to append date/time/location to the body.
        include_event_details: bool,
        /// Event the broadcast concerns.
        event: EventDigest,
    },
}

/// Broadcast handle for [`Notification`]s.
///
/// Cheap to clone; held by every service that triggers email. When the
/// ring buffer fills, the oldest notifications are dropped for lagging
/// receivers, which a best-effort channel can live with.
#[derive(Debug, Clone)]
pub struct Notifier {
    sender: broadcast::Sender<Notification>,
}

impl Notifier {
    /// Creates a notifier with the given channel capacity (minimum 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes a notification to all subscribers.
    ///
    /// Returns the number of receivers; zero means the notification
    /// was dropped, which is fine since delivery is advisory.
    pub fn publish(&self, notification: Notification) -> usize {
        self.sender.send(notification).unwrap_or(0)
    }

    /// Creates a receiver for future notifications.
    ///
    /// The mail worker calls this once at startup.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    /// Returns the current number of active receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
