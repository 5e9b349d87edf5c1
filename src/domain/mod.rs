//! Domain layer: identifiers, records, registries, and notifications.
//!
//! This module owns the server-side domain model: typed entity ids,
//! the event/registration/user records, the concurrent registries that
//! store them, and the fire-and-forget notification channel. The
//! capacity invariant (`0 <= current_attendees <= max_attendees`) lives
//! here, enforced by [`EventRegistry::reserve_slot`].

pub mod event;
pub mod event_registry;
pub mod ids;
pub mod notification;
pub mod registration;
pub mod registration_ledger;
pub mod user;
pub mod user_directory;

pub use event::{BankDetails, EventRecord};
pub use event_registry::EventRegistry;
pub use ids::{BlobId, EventId, RegistrationId, ShareId, UserId};
pub use notification::{Notification, Notifier};
pub use registration::{RegistrationRecord, RegistrationStatus};
pub use registration_ledger::RegistrationLedger;
pub use user::{Role, UserRecord};
pub use user_directory::UserDirectory;
